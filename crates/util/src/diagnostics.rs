//! # Diagnostics
//!
//! Hint synthesis for failures shown to the user, and redaction of
//! credentials in anything that reaches a log line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Printed after the error message when the failure looks like an untrusted
/// TLS certificate.
pub const SKIP_SSL_VALIDATION_HINT: &str = "Hint: try --skip-ssl-validation at your own risk.";

/// Fragments that TLS stacks use when the peer certificate chain is not trusted.
const UNTRUSTED_CERTIFICATE_MARKERS: &[&str] = &[
    "unknown authority",
    "UnknownIssuer",
    "self signed certificate",
    "self-signed certificate",
    "unable to get local issuer certificate",
];

/// Returns the hint to print after `message`, if any.
///
/// # Example
/// ```rust
/// use scs_util::diagnostics::{hint_for, SKIP_SSL_VALIDATION_HINT};
///
/// let message = "Request failed: x509: certificate signed by unknown authority";
/// assert_eq!(hint_for(message), Some(SKIP_SSL_VALIDATION_HINT));
/// assert_eq!(hint_for("connection refused"), None);
/// ```
pub fn hint_for(message: &str) -> Option<&'static str> {
    UNTRUSTED_CERTIFICATE_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
        .then_some(SKIP_SSL_VALIDATION_HINT)
}

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)(authorization:\s*)([^\s,]+)").expect("valid authorization pattern"),
        Regex::new(r"(?i)((?:^|\b)bearer\s+)([A-Za-z0-9\-._~+/]+=*)").expect("valid bearer pattern"),
        Regex::new(r#"(?i)("(?:access_token|refresh_token|secret|password)"\s*:\s*")([^"]*)"#)
            .expect("valid json secret pattern"),
    ]
});

/// Redacts values that look like credentials in a string.
///
/// # Example
/// ```rust
/// use scs_util::diagnostics::redact_sensitive;
///
/// assert_eq!(redact_sensitive("Authorization: abc.def"), "Authorization: [REDACTED]");
/// assert_eq!(redact_sensitive("bearer eyJhbGciOi"), "bearer [REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}[REDACTED]")
            })
            .to_string();
    }
    redacted
}
