//! # Administrative endpoint resolution
//!
//! Turns a service-instance name into the URL an operation talks to. The two
//! broker generations disagree on where that URL lives:
//!
//! - **v2** (`p-` offerings) embeds everything at the dashboard origin. The
//!   running service's own URL has to be discovered by probing
//!   `/cli/instance/<guid>`.
//! - **v3** serves the running service at the dashboard origin and the
//!   lifecycle commands from a platform-wide broker whose host is derived
//!   from the platform API endpoint.
//!
//! Resolution runs at most one probe and never retries.

use std::sync::Arc;

use scs_api::{AuthenticatedClient, StatusCode};
use scs_types::{
    BrokerGeneration, EndpointKind, LookupError, ManagementParameters, ResolveError, ScsError, ServiceInstance,
    ServiceInstanceResponse,
};
use scs_util::decode_json;
use tracing::debug;
use url::Url;

use crate::platform::Platform;

const SERVICE_INSTANCE_PROBE_PATH: &str = "/cli/instance";
const MANAGEMENT_PATH: &str = "/cli/instances";
const BROKER_INFO_PATH: &str = "/actuator/info";

/// Resolves [`ManagementParameters`] for a named service instance.
#[derive(Clone)]
pub struct EndpointResolver {
    platform: Arc<dyn Platform>,
    client: Arc<dyn AuthenticatedClient>,
    broker_host_prefix: String,
}

impl EndpointResolver {
    pub fn new(platform: Arc<dyn Platform>, client: Arc<dyn AuthenticatedClient>, broker_host_prefix: impl Into<String>) -> Self {
        Self {
            platform,
            client,
            broker_host_prefix: broker_host_prefix.into(),
        }
    }

    /// Look up `service_instance_name` and derive the URL for `kind`.
    pub async fn resolve(&self, service_instance_name: &str, token: &str, kind: EndpointKind) -> Result<ManagementParameters, ScsError> {
        let service = self
            .platform
            .get_service(service_instance_name)
            .await
            .map_err(|error| LookupError::service_not_found(service_instance_name, error))?;
        let generation = service.broker_generation();

        let url = match (kind, generation) {
            (EndpointKind::ServiceInstance, BrokerGeneration::V2) => self.discover_service_instance_url(&service.dashboard_url, token).await?,
            (EndpointKind::ServiceInstance, BrokerGeneration::V3) => dashboard_root_url(&service.dashboard_url)?,
            (EndpointKind::Management, _) | (EndpointKind::Lifecycle, BrokerGeneration::V2) => management_url(&service.dashboard_url)?,
            (EndpointKind::Lifecycle, BrokerGeneration::V3) => self.lifecycle_url(&service, token).await?,
        };

        debug!(
            service = %service_instance_name,
            generation = ?generation,
            kind = ?kind,
            url = %url,
            "resolved administrative endpoint"
        );

        Ok(ManagementParameters {
            url,
            offering_name: service.offering_name,
            plan_name: service.plan_name,
        })
    }

    /// Ask a v2 broker where the running service lives.
    async fn discover_service_instance_url(&self, dashboard_url: &str, token: &str) -> Result<String, ScsError> {
        let (origin, guid) = dashboard_origin_and_guid(dashboard_url)?;
        let probe_url = format!("{origin}{SERVICE_INSTANCE_PROBE_PATH}/{guid}");

        let response = self.client.get(&probe_url, token).await?;
        match response.status {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(ResolveError::LegacyBrokerUnsupported.into()),
            status => {
                return Err(ResolveError::BrokerProbe {
                    url: probe_url,
                    status: status.as_u16(),
                }
                .into());
            }
        }

        let body = response.require_body(&probe_url)?;
        let parsed: ServiceInstanceResponse = decode_json("service instance", body)?;
        let uri = parsed.credentials.uri.trim_end_matches('/');
        if uri.is_empty() {
            return Err(ResolveError::EmptyServiceUri { url: probe_url }.into());
        }
        Ok(format!("{uri}/"))
    }

    /// Lifecycle commands on v3 go to the central broker when the platform
    /// runs one; a 404 from its info endpoint means only the v2 shape exists.
    async fn lifecycle_url(&self, service: &ServiceInstance, token: &str) -> Result<String, ScsError> {
        let api_endpoint = self.platform.api_endpoint().await?;
        let broker = broker_base_url(&api_endpoint, &self.broker_host_prefix)?;
        let probe_url = format!("{broker}{BROKER_INFO_PATH}");

        let response = self.client.get(&probe_url, token).await?;
        match response.status {
            StatusCode::OK => Ok(format!("{broker}{MANAGEMENT_PATH}/{}", service.guid)),
            StatusCode::NOT_FOUND => {
                debug!(broker = %broker, "no central service broker; using dashboard management endpoint");
                Ok(management_url(&service.dashboard_url)?)
            }
            status => Err(ResolveError::BrokerProbe {
                url: probe_url,
                status: status.as_u16(),
            }
            .into()),
        }
    }
}

fn parse_url(raw: &str) -> Result<Url, ResolveError> {
    Url::parse(raw).map_err(|error| ResolveError::invalid_url(raw, error))
}

/// Split a dashboard URL into its origin and the last non-empty path segment.
pub fn dashboard_origin_and_guid(dashboard_url: &str) -> Result<(String, String), ResolveError> {
    let url = parse_url(dashboard_url)?;
    let guid = url
        .path_segments()
        .and_then(|segments| segments.filter(|segment| !segment.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(|| ResolveError::InvalidDashboardPath {
            url: dashboard_url.to_string(),
        })?;
    Ok((url.origin().ascii_serialization(), guid))
}

/// `<dashboard-origin>/cli/instances/<guid>`, without a trailing slash.
pub fn management_url(dashboard_url: &str) -> Result<String, ResolveError> {
    let (origin, guid) = dashboard_origin_and_guid(dashboard_url)?;
    Ok(format!("{origin}{MANAGEMENT_PATH}/{guid}"))
}

/// The dashboard URL with its path stripped, plus a trailing slash.
pub fn dashboard_root_url(dashboard_url: &str) -> Result<String, ResolveError> {
    let url = parse_url(dashboard_url)?;
    Ok(format!("{}/", url.origin().ascii_serialization()))
}

/// Replace the first label of the API host with `host_prefix`.
///
/// `https://api.sys.example` with prefix `scs-service-broker.` becomes
/// `https://scs-service-broker.sys.example`.
pub fn broker_base_url(api_endpoint: &str, host_prefix: &str) -> Result<String, ResolveError> {
    let url = parse_url(api_endpoint)?;
    let system_domain = url
        .host_str()
        .and_then(|host| host.split_once('.'))
        .map(|(_, rest)| rest)
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| ResolveError::ApiEndpoint {
            endpoint: api_endpoint.to_string(),
        })?;

    let mut base = format!("{}://{host_prefix}{system_domain}", url.scheme());
    if let Some(port) = url.port() {
        base.push_str(&format!(":{port}"));
    }
    Ok(base)
}
