use once_cell::sync::Lazy;
use regex::Regex;
use scs_api::{AuthenticatedClient, RequestBody, StatusCode};
use scs_types::{ManagementParameters, OperationError, ScsError, ValidationError};

/// `{appName}/{profile}/{label}/{propertyName}`, each segment non-empty.
static CREDHUB_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._()\[\]:,-]+(/[A-Za-z0-9._()\[\]:,-]+){3}$").expect("credhub path pattern"));

/// Checks that `path` names exactly one CredHub property.
///
/// ```rust
/// use scs_engine::operations::validate_credhub_path;
///
/// assert!(validate_credhub_path("app/default/master/db.password").is_ok());
/// assert!(validate_credhub_path("app/default/master").is_err());
/// ```
pub fn validate_credhub_path(path: &str) -> Result<(), ValidationError> {
    if CREDHUB_PATH.is_match(path) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCredHubPath { path: path.to_string() })
    }
}

pub(super) fn validate_secret(secret: &str) -> Result<(), ValidationError> {
    serde_json::from_str::<serde_json::Value>(secret)
        .map(|_| ())
        .map_err(|error| ValidationError::InvalidSecretJson { reason: error.to_string() })
}

pub(super) async fn add_secret(
    client: &dyn AuthenticatedClient,
    params: &ManagementParameters,
    path: &str,
    secret: &str,
    token: &str,
) -> Result<String, ScsError> {
    let url = format!("{}secrets/{path}", params.url);
    let status = client.put(&url, Some(RequestBody::json(secret)), token).await?;
    if status != StatusCode::OK {
        return Err(OperationError::unexpected_status("failed to add secret to CredHub", status.as_u16()).into());
    }
    Ok(String::new())
}

pub(super) async fn remove_secret(client: &dyn AuthenticatedClient, params: &ManagementParameters, path: &str, token: &str) -> Result<String, ScsError> {
    let url = format!("{}secrets/{path}", params.url);
    let status = client.delete(&url, token).await?;
    if status != StatusCode::OK {
        return Err(OperationError::unexpected_status("failed to remove secret from CredHub", status.as_u16()).into());
    }
    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_segments_are_rejected() {
        let err = validate_credhub_path("a/b/c").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCredHubPath { .. }));
    }

    #[test]
    fn four_segments_are_accepted() {
        assert!(validate_credhub_path("a/b/c/d").is_ok());
        assert!(validate_credhub_path("my-app/cloud,dev/main/spring.datasource[0]:password").is_ok());
    }

    #[test]
    fn empty_segments_and_extra_segments_are_rejected() {
        assert!(validate_credhub_path("a//c/d").is_err());
        assert!(validate_credhub_path("a/b/c/d/e").is_err());
        assert!(validate_credhub_path("/a/b/c").is_err());
        assert!(validate_credhub_path("a/b/c/d e").is_err());
    }

    #[test]
    fn secret_must_be_json() {
        assert!(validate_secret(r#"{"password":"s3cret"}"#).is_ok());
        let err = validate_secret("password=s3cret").unwrap_err();
        assert!(err.to_string().starts_with("Secret must be valid JSON"));
    }
}
