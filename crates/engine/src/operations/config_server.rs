//! Config-server administration: encryption, mirror refresh and git repo
//! removal.

use scs_api::{AuthenticatedClient, StatusCode};
use scs_types::{GitRepoRequest, ManagementParameters, OperationError, ProtocolError, ScsError};
use tracing::info;

const TEXT_PLAIN: &str = "text/plain";
const APPLICATION_JSON: &str = "application/json";

/// `POST <url>encrypt` with the plaintext; returns the ciphertext.
pub(super) async fn encrypt(
    client: &dyn AuthenticatedClient,
    params: &ManagementParameters,
    plaintext: &str,
    token: &str,
) -> Result<String, ScsError> {
    let url = format!("{}encrypt", params.url);
    let response = client.post(&url, TEXT_PLAIN, plaintext.to_string(), token).await?;
    if response.status != StatusCode::OK {
        if !response.body.is_empty() {
            return Err(OperationError::Encryption { body: response.body }.into());
        }
        return Err(OperationError::unexpected_status("failed to encrypt value", response.status.as_u16()).into());
    }
    Ok(response.body)
}

pub(super) async fn refresh_mirrors(client: &dyn AuthenticatedClient, params: &ManagementParameters, token: &str) -> Result<String, ScsError> {
    let url = format!("{}actuator/refreshmirrors", params.url);
    let response = client.post(&url, APPLICATION_JSON, String::new(), token).await?;
    if response.status != StatusCode::OK {
        return Err(OperationError::unexpected_status("failed to refresh mirror", response.status.as_u16()).into());
    }
    Ok(String::new())
}

/// `PATCH <url>` asking the server to drop one git repository.
pub(super) async fn delete_git_repo(
    client: &dyn AuthenticatedClient,
    params: &ManagementParameters,
    repo: &str,
    token: &str,
) -> Result<String, ScsError> {
    let body = serde_json::to_string(&GitRepoRequest {
        operation: "delete".to_string(),
        repo: repo.to_string(),
    })
    .map_err(|error| ProtocolError::encode("delete git repo", error))?;

    info!(repo = %repo, url = %params.url, "deleting git repository");
    let status = client.patch(&params.url, APPLICATION_JSON, body, token).await?;
    if status != StatusCode::OK {
        return Err(OperationError::unexpected_status(format!("Unable to delete git repo {repo}"), status.as_u16()).into());
    }
    Ok(String::new())
}
