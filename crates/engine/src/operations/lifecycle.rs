use std::fmt;

use scs_api::{AuthenticatedClient, RequestBody};
use scs_types::{LifecycleRequest, ManagementParameters, OperationError, ProtocolError, ScsError};
use tracing::info;

/// Commands that change the runtime state of a service instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCommand {
    Start,
    Stop,
    Restart,
    Restage,
}

impl LifecycleCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Restage => "restage",
        }
    }
}

impl fmt::Display for LifecycleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `PUT <url>/command?<command>=` with the offering and plan in the body.
pub(super) async fn run(
    command: LifecycleCommand,
    client: &dyn AuthenticatedClient,
    params: &ManagementParameters,
    token: &str,
) -> Result<String, ScsError> {
    let url = format!("{}/command?{}=", params.url, command);
    let body = serde_json::to_string(&LifecycleRequest {
        service_offering_name: params.offering_name.clone(),
        plan_name: params.plan_name.clone(),
    })
    .map_err(|error| ProtocolError::encode(command.as_str(), error))?;

    info!(command = %command, url = %url, "sending lifecycle command");
    let status = client.put(&url, Some(RequestBody::json(body)), token).await?;
    if !status.is_success() {
        return Err(OperationError::unexpected_status(format!("failed to {command} service instance"), status.as_u16()).into());
    }
    Ok(String::new())
}
