//! Access-token extraction from the platform CLI's `oauth-token` output.

use scs_types::AuthError;

const BEARER_PREFIX: &str = "bearer";

/// Strips the `bearer ` prefix (and an optional trailing newline) from the
/// raw token output of the platform.
///
/// The input must split on a single space into exactly two parts, the first
/// being `bearer` and the second non-empty. Anything else is rejected with a
/// message that echoes the input verbatim.
///
/// # Example
/// ```rust
/// use scs_util::token::extract_access_token;
///
/// assert_eq!(extract_access_token("bearer abc\n").unwrap(), "abc");
/// assert!(extract_access_token("bearerabc").is_err());
/// ```
pub fn extract_access_token(raw_output: &str) -> Result<String, AuthError> {
    let trimmed = raw_output.strip_suffix('\n').unwrap_or(raw_output);
    let parts: Vec<&str> = trimmed.split(' ').collect();
    match parts.as_slice() {
        [BEARER_PREFIX, token] if is_usable_token(token) => Ok((*token).to_string()),
        _ => Err(AuthError::invalid_token_output(raw_output)),
    }
}

/// Non-empty and free of whitespace and control characters, so it can be sent
/// as a header value unchanged.
fn is_usable_token(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(|ch| ch.is_whitespace() || ch.is_control())
}
