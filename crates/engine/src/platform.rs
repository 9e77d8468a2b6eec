//! The host platform CLI as seen by the engine.

use async_trait::async_trait;
use scs_types::{AppSummary, PlatformError, ServiceInstance};

/// Read-only view of the platform the user is targeting.
///
/// Implementations usually shell out to the platform CLI, so every call is a
/// suspension point; none of them is cached by the engine.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Look up a service instance in the current space by its human name.
    async fn get_service(&self, name: &str) -> Result<ServiceInstance, PlatformError>;

    /// Applications in the current space.
    async fn get_apps(&self) -> Result<Vec<AppSummary>, PlatformError>;

    /// The platform API endpoint, e.g. `https://api.sys.example.com`.
    async fn api_endpoint(&self) -> Result<String, PlatformError>;

    /// Raw token output in the `bearer <token>` form.
    async fn access_token(&self) -> Result<String, PlatformError>;

    /// Issue an authenticated GET against the platform API and return the body.
    async fn curl(&self, path: &str) -> Result<String, PlatformError>;

    async fn username(&self) -> Result<String, PlatformError>;

    async fn current_org(&self) -> Result<String, PlatformError>;

    async fn current_space(&self) -> Result<String, PlatformError>;
}
