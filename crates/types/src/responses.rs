//! Typed response records, one per endpoint.
//!
//! Unknown fields are ignored everywhere. Fields that gate downstream
//! behaviour (`credentials.uri`) are validated by the caller, not here.

use serde::{Deserialize, Serialize};

/// `GET <dashboard-origin>/cli/instance/<guid>` on a v2 broker.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceInstanceResponse {
    #[serde(default)]
    pub credentials: ServiceInstanceCredentials,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceInstanceCredentials {
    #[serde(default)]
    pub uri: String,
}

/// `GET <management-url>` for `service-instance-view`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewInstanceResponse {
    #[serde(default)]
    pub backing_apps: Vec<BackingApp>,
}

/// One platform application backing a service instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackingApp {
    pub name: String,
    #[serde(default)]
    pub buildpack: String,
    #[serde(default)]
    pub stack: String,
    /// Memory limit per instance, in megabytes.
    #[serde(default)]
    pub memory: u64,
    #[serde(default)]
    pub num_instances: u32,
    #[serde(default)]
    pub running_instances: u32,
    #[serde(default)]
    pub requested_state: String,
    #[serde(default)]
    pub routes: Vec<String>,
    /// Unix milliseconds.
    #[serde(default)]
    pub last_uploaded: i64,
    #[serde(default)]
    pub instances: Vec<BackingAppInstance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackingAppInstance {
    pub index: u32,
    #[serde(default)]
    pub state: String,
    /// Unix milliseconds.
    #[serde(default)]
    pub since: i64,
    /// Fraction of one core, `0.0..=1.0` per core.
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub memory_usage: u64,
    #[serde(default)]
    pub memory_quota: u64,
    #[serde(default)]
    pub disk_usage: u64,
    #[serde(default)]
    pub disk_quota: u64,
    #[serde(default)]
    pub details: String,
}

/// `GET /v2/apps/<guid>/summary` through the platform.
///
/// The same endpoint answers with `{ code, description, error_code }` on
/// failure, so every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CfAppSummaryResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub error_code: String,
}

/// Body of a v3 lifecycle command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleRequest {
    pub service_offering_name: String,
    pub plan_name: String,
}

/// Body of `config-server-delete-git-repo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitRepoRequest {
    pub operation: String,
    pub repo: String,
}
