//! Request-scoped entities shared by the resolver, the operations and the
//! registry view.
//!
//! Nothing in here outlives a single command invocation.

use serde::{Deserialize, Serialize};

/// Offering-name prefix that marks a service instance as provisioned by the
/// dashboard-embedded (v2) broker.
pub const V2_OFFERING_PREFIX: &str = "p-";

/// A managed service instance as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstance {
    /// Human name the user typed on the command line.
    pub name: String,
    pub guid: String,
    /// Browser-facing dashboard URL; root of all administrative URL derivation.
    pub dashboard_url: String,
    /// Offering name, e.g. `p-config-server` or `config-server`.
    pub offering_name: String,
    #[serde(default)]
    pub plan_name: String,
}

impl ServiceInstance {
    /// Classifies the broker generation from the offering-name prefix.
    pub fn broker_generation(&self) -> BrokerGeneration {
        BrokerGeneration::from_offering_name(&self.offering_name)
    }
}

/// The two incompatible broker generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerGeneration {
    /// Admin endpoints live at the dashboard origin.
    V2,
    /// Lifecycle endpoints live at a platform-wide broker host.
    V3,
}

impl BrokerGeneration {
    pub fn from_offering_name(offering_name: &str) -> Self {
        if offering_name.starts_with(V2_OFFERING_PREFIX) {
            Self::V2
        } else {
            Self::V3
        }
    }
}

/// Which administrative URL an operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// The URL of the running service itself (config server, registry).
    /// Always carries a trailing slash.
    ServiceInstance,
    /// `/cli/instances/<guid>` at the dashboard origin.
    Management,
    /// Like [`EndpointKind::Management`], but routed to the central broker
    /// for v3 instances.
    Lifecycle,
}

/// Resolved descriptor passed to an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementParameters {
    /// Final administrative base URL.
    pub url: String,
    pub offering_name: String,
    pub plan_name: String,
}

/// A platform application as listed in the current space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSummary {
    pub name: String,
    pub guid: String,
}

/// Display-only identity of the current platform target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetIdentity {
    pub username: String,
    pub org: String,
    pub space: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offering_prefix_selects_generation() {
        assert_eq!(BrokerGeneration::from_offering_name("p-config-server"), BrokerGeneration::V2);
        assert_eq!(BrokerGeneration::from_offering_name("p-service-registry"), BrokerGeneration::V2);
        assert_eq!(BrokerGeneration::from_offering_name("scs-config"), BrokerGeneration::V3);
        assert_eq!(BrokerGeneration::from_offering_name("config-server"), BrokerGeneration::V3);
        assert_eq!(BrokerGeneration::from_offering_name(""), BrokerGeneration::V3);
    }
}
