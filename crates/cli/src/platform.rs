//! [`Platform`] backed by the `cf` executable on `PATH`.

use std::time::Instant;

use async_trait::async_trait;
use scs_engine::Platform;
use scs_types::{AppSummary, PlatformError, ServiceInstance};
use scs_util::redact_sensitive;
use serde::Deserialize;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::debug;

const CF: &str = "cf";

/// Shells out to the `cf` CLI, which owns login state and targeting.
///
/// `cf target` runs at most once per platform; later lookups reuse the parsed
/// output.
#[derive(Debug, Default, Clone)]
pub struct CfCliPlatform {
    target: OnceCell<CfTarget>,
}

impl CfCliPlatform {
    async fn cf(&self, args: &[&str]) -> Result<String, PlatformError> {
        let command = args.first().copied().unwrap_or_default();
        let started = Instant::now();
        let output = Command::new(CF)
            .args(args)
            .output()
            .await
            .map_err(|error| PlatformError::command(command, error.to_string()))?;
        debug!(
            command = %command,
            status = ?output.status.code(),
            duration_ms = started.elapsed().as_millis() as u64,
            "cf command finished"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(PlatformError::command(command, redact_sensitive(&message)));
        }
        String::from_utf8(output.stdout).map_err(|error| PlatformError::output(command, error.to_string()))
    }

    async fn target(&self) -> Result<&CfTarget, PlatformError> {
        self.target
            .get_or_try_init(|| async { Ok::<_, PlatformError>(CfTarget::parse(&self.cf(&["target"]).await?)) })
            .await
    }

    async fn target_field(&self, key: &str, pick: fn(&CfTarget) -> Option<&String>) -> Result<String, PlatformError> {
        let target = self.target().await?;
        pick(target)
            .cloned()
            .ok_or_else(|| PlatformError::output("target", format!("no '{key}' in cf target output")))
    }

    async fn curl_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, PlatformError> {
        let body = self.curl(path).await?;
        let errors: CfErrors = serde_json::from_str(&body).unwrap_or_default();
        if let Some(error) = errors.errors.first() {
            return Err(PlatformError::command("curl", format!("{}: {}", error.title, error.detail)));
        }
        serde_json::from_str(&body).map_err(|error| PlatformError::output("curl", format!("{path}: {error}")))
    }
}

#[async_trait]
impl Platform for CfCliPlatform {
    async fn get_service(&self, name: &str) -> Result<ServiceInstance, PlatformError> {
        let guid = self.cf(&["service", name, "--guid"]).await?.trim().to_string();
        let path = format!(
            "/v3/service_instances/{guid}?fields[service_plan]=name,relationships.service_offering&fields[service_plan.service_offering]=name"
        );
        let response: V3ServiceInstance = self.curl_json(&path).await?;
        Ok(response.into_service_instance(name))
    }

    async fn get_apps(&self) -> Result<Vec<AppSummary>, PlatformError> {
        let space = self.current_space().await?;
        let space_guid = self.cf(&["space", &space, "--guid"]).await?.trim().to_string();
        let response: V3Apps = self
            .curl_json(&format!("/v3/apps?space_guids={space_guid}&per_page=5000"))
            .await?;
        Ok(response
            .resources
            .into_iter()
            .map(|app| AppSummary {
                name: app.name,
                guid: app.guid,
            })
            .collect())
    }

    async fn api_endpoint(&self) -> Result<String, PlatformError> {
        self.target_field("API endpoint", |target| target.api_endpoint.as_ref()).await
    }

    async fn access_token(&self) -> Result<String, PlatformError> {
        self.cf(&["oauth-token"]).await
    }

    async fn curl(&self, path: &str) -> Result<String, PlatformError> {
        self.cf(&["curl", path]).await
    }

    async fn username(&self) -> Result<String, PlatformError> {
        self.target_field("user", |target| target.user.as_ref()).await
    }

    async fn current_org(&self) -> Result<String, PlatformError> {
        self.target_field("org", |target| target.org.as_ref()).await
    }

    async fn current_space(&self) -> Result<String, PlatformError> {
        self.target_field("space", |target| target.space.as_ref()).await
    }
}

/// The fields of `cf target` output the plugin reads.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CfTarget {
    api_endpoint: Option<String>,
    user: Option<String>,
    org: Option<String>,
    space: Option<String>,
}

impl CfTarget {
    fn parse(output: &str) -> Self {
        Self {
            api_endpoint: parse_target_field(output, "API endpoint"),
            user: parse_target_field(output, "user"),
            org: parse_target_field(output, "org"),
            space: parse_target_field(output, "space"),
        }
    }
}

/// Value of `key:` in `cf target` output, matched case-insensitively.
fn parse_target_field(output: &str, key: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        let value = value.trim();
        (name.trim().eq_ignore_ascii_case(key) && !value.is_empty()).then(|| value.to_string())
    })
}

#[derive(Debug, Default, Deserialize)]
struct CfErrors {
    #[serde(default)]
    errors: Vec<CfError>,
}

#[derive(Debug, Default, Deserialize)]
struct CfError {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

#[derive(Debug, Deserialize)]
struct V3ServiceInstance {
    guid: String,
    #[serde(default)]
    dashboard_url: Option<String>,
    #[serde(default)]
    included: V3Included,
}

#[derive(Debug, Default, Deserialize)]
struct V3Included {
    #[serde(default)]
    service_plans: Vec<V3Named>,
    #[serde(default)]
    service_offerings: Vec<V3Named>,
}

#[derive(Debug, Deserialize)]
struct V3Named {
    name: String,
}

impl V3ServiceInstance {
    fn into_service_instance(self, name: &str) -> ServiceInstance {
        let first_name = |named: Vec<V3Named>| named.into_iter().next().map(|item| item.name).unwrap_or_default();
        ServiceInstance {
            name: name.to_string(),
            guid: self.guid,
            dashboard_url: self.dashboard_url.unwrap_or_default(),
            offering_name: first_name(self.included.service_offerings),
            plan_name: first_name(self.included.service_plans),
        }
    }
}

#[derive(Debug, Deserialize)]
struct V3Apps {
    #[serde(default)]
    resources: Vec<V3App>,
}

#[derive(Debug, Deserialize)]
struct V3App {
    guid: String,
    name: String,
}
