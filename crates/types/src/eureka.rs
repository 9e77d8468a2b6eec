//! Service registry (Eureka) wire records and the joined per-instance row.

use std::fmt;

use serde::Deserialize;

/// Display value used for `cf_app_name` when the registry record carries no
/// platform application GUID.
pub const UNKNOWN_CF_APP_NAME: &str = "?????";
/// Display value used for `cf_instance_index` in the same situation.
pub const UNKNOWN_CF_INSTANCE_INDEX: &str = "?";

/// `GET <eureka>info`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    #[serde(default)]
    pub node_count: u32,
    #[serde(default)]
    pub peers: Vec<RegistryPeer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryPeer {
    pub uri: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub skip_ssl_validation: bool,
}

/// `GET <eureka>eureka/apps`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationsResponse {
    #[serde(default)]
    pub applications: Applications,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Applications {
    #[serde(default)]
    pub application: Vec<Application>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub instance: Vec<RegisteredInstance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredInstance {
    pub app: String,
    pub instance_id: String,
    #[serde(default)]
    pub status: InstanceStatus,
    #[serde(default)]
    pub metadata: InstanceMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceMetadata {
    #[serde(default)]
    pub cf_app_guid: String,
    #[serde(default)]
    pub cf_instance_index: String,
    #[serde(default)]
    pub zone: String,
}

/// Registration status reported by the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Up,
    Down,
    Starting,
    OutOfService,
    #[default]
    #[serde(other)]
    Unknown,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Starting => "STARTING",
            Self::OutOfService => "OUT_OF_SERVICE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the registry joined with platform application names.
///
/// `cf_app_guid` is empty exactly when `cf_app_name` and `instance_index`
/// hold [`UNKNOWN_CF_APP_NAME`] and [`UNKNOWN_CF_INSTANCE_INDEX`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EurekaAppRecord {
    pub cf_app_guid: String,
    pub cf_app_name: String,
    pub eureka_app_name: String,
    pub instance_id: String,
    pub status: InstanceStatus,
    pub zone: String,
    pub instance_index: String,
}

impl EurekaAppRecord {
    /// Builds a row for a registration that is not bound to a platform app.
    pub fn unbound(instance: &RegisteredInstance) -> Self {
        Self {
            cf_app_guid: String::new(),
            cf_app_name: UNKNOWN_CF_APP_NAME.to_string(),
            eureka_app_name: instance.app.clone(),
            instance_id: instance.instance_id.clone(),
            status: instance.status,
            zone: instance.metadata.zone.clone(),
            instance_index: UNKNOWN_CF_INSTANCE_INDEX.to_string(),
        }
    }

    /// Builds a row for a registration bound to the platform app `cf_app_name`.
    pub fn bound(instance: &RegisteredInstance, cf_app_name: impl Into<String>) -> Self {
        Self {
            cf_app_guid: instance.metadata.cf_app_guid.clone(),
            cf_app_name: cf_app_name.into(),
            eureka_app_name: instance.app.clone(),
            instance_id: instance.instance_id.clone(),
            status: instance.status,
            zone: instance.metadata.zone.clone(),
            instance_index: instance.metadata.cf_instance_index.clone(),
        }
    }

    pub fn is_bound(&self) -> bool {
        !self.cf_app_guid.is_empty()
    }
}
