//! # Strict JSON decoding of response bodies
//!
//! Every endpoint has one typed record; a body that does not decode into it
//! is a [`ProtocolError`] quoting (a preview of) the offending body.

use scs_types::ProtocolError;
use serde::de::DeserializeOwned;

use crate::diagnostics::redact_sensitive;

const BODY_PREVIEW_LIMIT: usize = 200;

/// Decode `body` into `T`, naming the endpoint as `what` on failure.
///
/// # Example
/// ```rust
/// use scs_types::ServiceInstanceResponse;
/// use scs_util::json::decode_json;
///
/// let parsed: ServiceInstanceResponse =
///     decode_json("service instance", r#"{"credentials":{"uri":"https://svc"}}"#).unwrap();
/// assert_eq!(parsed.credentials.uri, "https://svc");
///
/// let err = decode_json::<ServiceInstanceResponse>("service instance", "<html>").unwrap_err();
/// assert!(err.to_string().contains("'<html>'"));
/// ```
pub fn decode_json<T: DeserializeOwned>(what: &str, body: &str) -> Result<T, ProtocolError> {
    serde_json::from_str::<T>(body).map_err(|error| {
        let preview = redact_sensitive(&truncate_body_preview(body, BODY_PREVIEW_LIMIT));
        ProtocolError::decode(what, error, preview)
    })
}

/// Collapse whitespace and cut `text` to roughly `limit` bytes.
pub fn truncate_body_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}
