//! # Service registry view
//!
//! [`EurekaView`] reads a registry instance and acts on the registrations of
//! one platform application. Every call resolves the registry's base URL
//! through the same [`EndpointResolver`] the config-server operations use, so
//! v2 and v3 registries are handled alike.
//!
//! Instance operations run strictly one after another in registry order, and
//! the first failing request aborts the rest.

mod join;

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use scs_api::AuthenticatedClient;
use scs_types::{ApplicationsResponse, EndpointKind, EurekaAppRecord, InfoResponse, OperationError, ScsError};
use scs_util::{PluginConfig, decode_json};
use scs_util::display::render_table;
use tracing::{debug, info};

use crate::platform::Platform;
use crate::resolver::EndpointResolver;
use crate::runner::acquire_access_token;

pub use join::filter_records;

const LIST_HEADERS: [&str; 5] = ["eureka app name", "cf app name", "cf instance index", "zone", "status"];
const NO_REGISTERED_APPLICATIONS: &str = "No registered applications found";

/// An action applied to a single registered instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceOperation {
    /// Remove the registration.
    Deregister,
    /// Clear any status override so the instance reports `UP` again.
    Enable,
    /// Override the status to `OUT_OF_SERVICE`.
    Disable,
}

impl InstanceOperation {
    fn progress_line(&self, record: &EurekaAppRecord, service_instance_name: &str) -> String {
        let (verb, preposition) = match self {
            Self::Deregister => ("Deregistering", "from"),
            Self::Enable => ("Enabling", "in"),
            Self::Disable => ("Disabling", "in"),
        };
        format!(
            "{verb} service instance {} with eureka app name {} {preposition} service registry {service_instance_name}",
            record.instance_id, record.eureka_app_name
        )
    }

    async fn apply(
        &self,
        client: &dyn AuthenticatedClient,
        eureka_url: &str,
        eureka_app_name: &str,
        instance_id: &str,
        token: &str,
    ) -> Result<(), ScsError> {
        let instance_url = format!("{eureka_url}eureka/apps/{eureka_app_name}/{instance_id}");
        let status = match self {
            Self::Deregister => client.delete(&instance_url, token).await?,
            Self::Enable => client.delete(&format!("{instance_url}/status?value=UP"), token).await?,
            Self::Disable => client.put(&format!("{instance_url}/status?value=OUT_OF_SERVICE"), None, token).await?,
        };
        if !status.is_success() {
            return Err(OperationError::unexpected_status(format!("failed to {self} service instance {instance_id}"), status.as_u16()).into());
        }
        Ok(())
    }
}

impl fmt::Display for InstanceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deregister => "deregister",
            Self::Enable => "enable",
            Self::Disable => "disable",
        })
    }
}

/// Registry reports and per-instance actions for one registry service.
pub struct EurekaView {
    platform: Arc<dyn Platform>,
    client: Arc<dyn AuthenticatedClient>,
    resolver: EndpointResolver,
}

impl EurekaView {
    pub fn new(platform: Arc<dyn Platform>, client: Arc<dyn AuthenticatedClient>, config: &PluginConfig) -> Self {
        let resolver = EndpointResolver::new(Arc::clone(&platform), Arc::clone(&client), config.broker_host_prefix.clone());
        Self {
            platform,
            client,
            resolver,
        }
    }

    /// Node count and peers of the registry.
    pub async fn info(&self, service_instance_name: &str) -> Result<String, ScsError> {
        let (eureka_url, token) = self.locate(service_instance_name).await?;
        let info_url = format!("{eureka_url}info");
        let response = self.client.get(&info_url, &token).await?;
        if !response.status.is_success() {
            return Err(OperationError::unexpected_status("failed to retrieve service registry info", response.status.as_u16()).into());
        }
        let info: InfoResponse = decode_json("service registry info", response.require_body(&info_url)?)?;
        Ok(render_info(service_instance_name, &eureka_url, &info))
    }

    /// Every registration joined with its platform application.
    pub async fn list(&self, service_instance_name: &str) -> Result<String, ScsError> {
        let (eureka_url, token) = self.locate(service_instance_name).await?;
        let records = self.registered_records(&eureka_url, &token).await?;
        Ok(render_list(service_instance_name, &eureka_url, &records))
    }

    /// Apply `operation` to every registration of `cf_app_name`, or to the
    /// one with `instance_index` when given. One progress line per instance
    /// is written to `progress` before its request is sent.
    pub async fn operate_on_application(
        &self,
        service_instance_name: &str,
        cf_app_name: &str,
        instance_index: Option<u32>,
        operation: InstanceOperation,
        progress: &mut dyn Write,
    ) -> Result<(), ScsError> {
        let (eureka_url, token) = self.locate(service_instance_name).await?;
        let records = self.registered_records(&eureka_url, &token).await?;
        let selected = filter_records(records, cf_app_name, instance_index)?;

        for record in &selected {
            writeln!(progress, "{}", operation.progress_line(record, service_instance_name))
                .map_err(|error| OperationError::Progress { reason: error.to_string() })?;
            info!(
                operation = %operation,
                eureka_app = %record.eureka_app_name,
                instance = %record.instance_id,
                "applying registry operation"
            );
            operation
                .apply(self.client.as_ref(), &eureka_url, &record.eureka_app_name, &record.instance_id, &token)
                .await?;
        }
        Ok(())
    }

    async fn locate(&self, service_instance_name: &str) -> Result<(String, String), ScsError> {
        let token = acquire_access_token(self.platform.as_ref()).await?;
        let params = self
            .resolver
            .resolve(service_instance_name, &token, EndpointKind::ServiceInstance)
            .await?;
        debug!(service = %service_instance_name, eureka = %params.url, "located service registry");
        Ok((params.url, token))
    }

    async fn registered_records(&self, eureka_url: &str, token: &str) -> Result<Vec<EurekaAppRecord>, ScsError> {
        let apps_url = format!("{eureka_url}eureka/apps");
        let response = self.client.get(&apps_url, token).await?;
        if !response.status.is_success() {
            return Err(OperationError::unexpected_status("failed to retrieve registered applications", response.status.as_u16()).into());
        }
        let applications: ApplicationsResponse = decode_json("registered applications", response.require_body(&apps_url)?)?;
        let mut names = join::AppNameCache::seeded(self.platform.as_ref()).await;
        join::join_records(&applications, &mut names).await
    }
}

fn render_info(service_instance_name: &str, eureka_url: &str, info: &InfoResponse) -> String {
    let peers = if info.peers.is_empty() {
        "none".to_string()
    } else {
        info.peers.iter().map(|peer| peer.uri.as_str()).collect::<Vec<_>>().join(", ")
    };
    format!(
        "Service instance: {service_instance_name}\nServer URL: {eureka_url}\nHigh availability count: {}\nPeers: {peers}\n",
        info.node_count
    )
}

fn render_list(service_instance_name: &str, eureka_url: &str, records: &[EurekaAppRecord]) -> String {
    let mut out = format!("Service instance: {service_instance_name}\nServer URL: {eureka_url}\n\n");
    if records.is_empty() {
        out.push_str(NO_REGISTERED_APPLICATIONS);
        out.push('\n');
        return out;
    }
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            vec![
                record.eureka_app_name.clone(),
                record.cf_app_name.clone(),
                record.instance_index.clone(),
                record.zone.clone(),
                record.status.to_string(),
            ]
        })
        .collect();
    out.push_str(&render_table(&LIST_HEADERS, &rows));
    out
}
