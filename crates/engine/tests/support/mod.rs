//! In-memory collaborators shared by the engine integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scs_api::{AuthenticatedClient, HttpResponse, RequestBody, StatusCode};
use scs_engine::Platform;
use scs_types::{AppSummary, PlatformError, ServiceInstance, TransportError};

/// Ordered log of every side effect, shared by the fakes of one test.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// One request as seen by [`FakeClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub content_type: Option<String>,
    pub body: Option<String>,
    pub token: String,
}

/// Records requests and replays scripted responses in order.
#[derive(Default)]
pub struct FakeClient {
    replies: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
    journal: Journal,
}

impl FakeClient {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub fn reply(self, status: u16, body: &str) -> Self {
        let status = StatusCode::from_u16(status).expect("valid status code");
        self.replies.lock().expect("replies lock").push_back(HttpResponse::new(status, body));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    fn record(
        &self,
        method: &'static str,
        url: &str,
        content_type: Option<&str>,
        body: Option<String>,
        token: &str,
    ) -> Result<HttpResponse, TransportError> {
        self.journal.lock().expect("journal lock").push(format!("{method} {url}"));
        self.requests.lock().expect("requests lock").push(RecordedRequest {
            method,
            url: url.to_string(),
            content_type: content_type.map(str::to_string),
            body,
            token: token.to_string(),
        });
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .ok_or_else(|| TransportError::failure(url, "no scripted reply"))
    }
}

#[async_trait]
impl AuthenticatedClient for FakeClient {
    async fn get(&self, url: &str, token: &str) -> Result<HttpResponse, TransportError> {
        self.record("GET", url, None, None, token)
    }

    async fn post(&self, url: &str, content_type: &str, body: String, token: &str) -> Result<HttpResponse, TransportError> {
        self.record("POST", url, Some(content_type), Some(body), token)
    }

    async fn put(&self, url: &str, body: Option<RequestBody>, token: &str) -> Result<StatusCode, TransportError> {
        let (content_type, body) = match body {
            Some(body) => (Some(body.content_type), Some(body.body)),
            None => (None, None),
        };
        self.record("PUT", url, content_type.as_deref(), body, token)
            .map(|response| response.status)
    }

    async fn patch(&self, url: &str, content_type: &str, body: String, token: &str) -> Result<StatusCode, TransportError> {
        self.record("PATCH", url, Some(content_type), Some(body), token)
            .map(|response| response.status)
    }

    async fn delete(&self, url: &str, token: &str) -> Result<StatusCode, TransportError> {
        self.record("DELETE", url, None, None, token).map(|response| response.status)
    }
}

/// Scripted platform adapter.
pub struct FakePlatform {
    pub service: Option<ServiceInstance>,
    pub api_endpoint: String,
    pub token_output: String,
    pub apps: Option<Vec<AppSummary>>,
    pub curl_responses: HashMap<String, String>,
    pub journal: Journal,
}

impl FakePlatform {
    pub fn new(journal: Journal) -> Self {
        Self {
            service: None,
            api_endpoint: "https://api.sys.example".to_string(),
            token_output: "bearer tok".to_string(),
            apps: Some(Vec::new()),
            curl_responses: HashMap::new(),
            journal,
        }
    }

    pub fn with_service(mut self, offering_name: &str, dashboard_url: &str) -> Self {
        self.service = Some(ServiceInstance {
            name: "svc".to_string(),
            guid: "g1".to_string(),
            dashboard_url: dashboard_url.to_string(),
            offering_name: offering_name.to_string(),
            plan_name: "standard".to_string(),
        });
        self
    }

    fn note(&self, entry: impl Into<String>) {
        self.journal.lock().expect("journal lock").push(entry.into());
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn get_service(&self, name: &str) -> Result<ServiceInstance, PlatformError> {
        self.note(format!("cf service {name}"));
        self.service
            .clone()
            .ok_or_else(|| PlatformError::command("service", format!("Service instance {name} not found")))
    }

    async fn get_apps(&self) -> Result<Vec<AppSummary>, PlatformError> {
        self.note("cf apps");
        self.apps.clone().ok_or_else(|| PlatformError::command("space", "not targeted"))
    }

    async fn api_endpoint(&self) -> Result<String, PlatformError> {
        Ok(self.api_endpoint.clone())
    }

    async fn access_token(&self) -> Result<String, PlatformError> {
        self.note("cf oauth-token");
        Ok(self.token_output.clone())
    }

    async fn curl(&self, path: &str) -> Result<String, PlatformError> {
        self.note(format!("cf curl {path}"));
        self.curl_responses
            .get(path)
            .cloned()
            .ok_or_else(|| PlatformError::command("curl", format!("no response for {path}")))
    }

    async fn username(&self) -> Result<String, PlatformError> {
        Ok("user".to_string())
    }

    async fn current_org(&self) -> Result<String, PlatformError> {
        Ok("org".to_string())
    }

    async fn current_space(&self) -> Result<String, PlatformError> {
        Ok("space".to_string())
    }
}

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().expect("journal lock").clone()
}
