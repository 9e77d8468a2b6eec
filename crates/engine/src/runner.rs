//! Token acquisition, endpoint resolution and dispatch for one operation.

use std::sync::Arc;

use scs_api::AuthenticatedClient;
use scs_types::{AuthError, ScsError};
use scs_util::{PluginConfig, extract_access_token};
use tracing::debug;

use crate::operations::Operation;
use crate::platform::Platform;
use crate::resolver::EndpointResolver;

/// Fetch the platform token and strip its `bearer ` prefix.
pub async fn acquire_access_token(platform: &dyn Platform) -> Result<String, ScsError> {
    let raw = platform.access_token().await.map_err(AuthError::unavailable)?;
    Ok(extract_access_token(&raw)?)
}

/// Runs a single [`Operation`] against a named service instance.
///
/// Side effects happen in a fixed order: validation, token acquisition,
/// endpoint resolution (including any broker probe), then the operation's own
/// request. The first failure ends the run.
pub struct OperationRunner {
    platform: Arc<dyn Platform>,
    client: Arc<dyn AuthenticatedClient>,
    resolver: EndpointResolver,
}

impl OperationRunner {
    pub fn new(platform: Arc<dyn Platform>, client: Arc<dyn AuthenticatedClient>, config: &PluginConfig) -> Self {
        let resolver = EndpointResolver::new(Arc::clone(&platform), Arc::clone(&client), config.broker_host_prefix.clone());
        Self {
            platform,
            client,
            resolver,
        }
    }

    pub async fn run(&self, service_instance_name: &str, operation: &Operation) -> Result<String, ScsError> {
        operation.validate()?;
        let token = acquire_access_token(self.platform.as_ref()).await?;
        let params = self
            .resolver
            .resolve(service_instance_name, &token, operation.endpoint_kind())
            .await?;
        debug!(service = %service_instance_name, url = %params.url, "running operation");
        operation.run(self.client.as_ref(), &params, &token).await
    }
}
