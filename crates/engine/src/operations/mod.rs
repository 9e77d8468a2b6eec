//! Typed requests against a resolved service instance.
//!
//! Modules:
//! - `lifecycle`: start, stop, restart and restage
//! - `instance`: view and parameters
//! - `config_server`: encrypt, refresh-mirrors and delete-git-repo
//! - `credhub`: secret add/remove and path validation
//!
//! All operations are siblings of one enum. Each declares the
//! [`EndpointKind`] it needs; the [`crate::OperationRunner`] resolves that
//! endpoint and then calls [`Operation::run`].

mod config_server;
mod credhub;
mod instance;
mod lifecycle;

use scs_api::AuthenticatedClient;
use scs_types::{EndpointKind, ManagementParameters, ScsError, ValidationError};

pub use credhub::validate_credhub_path;
pub use instance::render_view;
pub use lifecycle::LifecycleCommand;

/// A single user-requested action on one service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Lifecycle(LifecycleCommand),
    View,
    Parameters,
    Encrypt { plaintext: String },
    RefreshMirrors,
    AddCredHubSecret { path: String, secret: String },
    RemoveCredHubSecret { path: String },
    DeleteGitRepo { repo: String },
}

impl Operation {
    /// Which administrative URL the operation is sent to.
    pub fn endpoint_kind(&self) -> EndpointKind {
        match self {
            Self::Lifecycle(_) => EndpointKind::Lifecycle,
            Self::View | Self::Parameters | Self::DeleteGitRepo { .. } => EndpointKind::Management,
            Self::Encrypt { .. } | Self::RefreshMirrors | Self::AddCredHubSecret { .. } | Self::RemoveCredHubSecret { .. } => {
                EndpointKind::ServiceInstance
            }
        }
    }

    /// True for operations that mutate the instance's runtime state.
    pub fn is_lifecycle_operation(&self) -> bool {
        self.endpoint_kind() == EndpointKind::Lifecycle
    }

    /// Client-side input checks. Runs before any token or HTTP traffic.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Encrypt { plaintext } if plaintext.is_empty() => Err(ValidationError::InvalidArgument {
                message: "Value to encrypt must not be empty".to_string(),
            }),
            Self::AddCredHubSecret { path, secret } => {
                validate_credhub_path(path)?;
                credhub::validate_secret(secret)
            }
            Self::RemoveCredHubSecret { path } => validate_credhub_path(path),
            Self::DeleteGitRepo { repo } if repo.trim().is_empty() => Err(ValidationError::InvalidArgument {
                message: "Git repository URI must not be empty".to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Send the operation to `params.url` and return its printable output.
    pub async fn run(&self, client: &dyn AuthenticatedClient, params: &ManagementParameters, token: &str) -> Result<String, ScsError> {
        match self {
            Self::Lifecycle(command) => lifecycle::run(*command, client, params, token).await,
            Self::View => instance::view(client, params, token).await,
            Self::Parameters => instance::parameters(client, params, token).await,
            Self::Encrypt { plaintext } => config_server::encrypt(client, params, plaintext, token).await,
            Self::RefreshMirrors => config_server::refresh_mirrors(client, params, token).await,
            Self::AddCredHubSecret { path, secret } => credhub::add_secret(client, params, path, secret, token).await,
            Self::RemoveCredHubSecret { path } => credhub::remove_secret(client, params, path, token).await,
            Self::DeleteGitRepo { repo } => config_server::delete_git_repo(client, params, repo, token).await,
        }
    }
}
