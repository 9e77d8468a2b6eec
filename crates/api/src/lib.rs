//! Authenticated HTTP transport for the SCS CLI.
//!
//! Every administrative call made by the CLI goes through an
//! [`AuthenticatedClient`]. The trait keeps the operations and the endpoint
//! resolver independent of reqwest so they can be exercised against
//! in-memory fakes; [`ScsHttpClient`] is the production implementation.
//!
//! Contract shared by all implementations:
//!
//! - every request carries `Accept: application/json`
//! - every request carries `Authorization: <token>`, with the token inserted
//!   verbatim (callers pass the bare token; no `Bearer ` prefix is added)
//! - request bodies are sent as-is, never re-encoded
//! - a response with any status is `Ok`; callers decide what a status means
//!
//! # Example
//!
//! ```ignore
//! use scs_api::{AuthenticatedClient, ScsHttpClient, TransportOptions};
//!
//! let client = ScsHttpClient::new(TransportOptions::default())?;
//! let response = client.get("https://config.example/cli/instance/guid", "token").await?;
//! println!("status: {}", response.status);
//! ```

use std::error::Error as StdError;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Url};
use scs_types::TransportError;
use tracing::{debug, warn};

pub use reqwest::StatusCode;

const APPLICATION_JSON: &str = "application/json";

/// A fully-read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns the body, or [`TransportError::MissingBody`] when it is empty.
    pub fn require_body(&self, url: &str) -> Result<&str, TransportError> {
        if self.body.is_empty() {
            return Err(TransportError::MissingBody { url: url.to_string() });
        }
        Ok(&self.body)
    }
}

/// A request payload together with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    pub content_type: String,
    pub body: String,
}

impl RequestBody {
    pub fn new(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    pub fn json(body: impl Into<String>) -> Self {
        Self::new(APPLICATION_JSON, body)
    }
}

/// Authenticated HTTP verbs used by the operations.
#[async_trait]
pub trait AuthenticatedClient: Send + Sync {
    async fn get(&self, url: &str, token: &str) -> Result<HttpResponse, TransportError>;

    async fn post(&self, url: &str, content_type: &str, body: String, token: &str) -> Result<HttpResponse, TransportError>;

    async fn put(&self, url: &str, body: Option<RequestBody>, token: &str) -> Result<StatusCode, TransportError>;

    async fn patch(&self, url: &str, content_type: &str, body: String, token: &str) -> Result<StatusCode, TransportError>;

    async fn delete(&self, url: &str, token: &str) -> Result<StatusCode, TransportError>;
}

/// Construction-time transport settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    /// Accept any server certificate. Set only from `--skip-ssl-validation`.
    pub skip_ssl_validation: bool,
    pub connect_timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            skip_ssl_validation: false,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// reqwest-backed [`AuthenticatedClient`].
///
/// TLS verification is fixed when the client is built and does not change
/// for the lifetime of the command.
#[derive(Debug, Clone)]
pub struct ScsHttpClient {
    http: Client,
    user_agent: String,
}

impl ScsHttpClient {
    pub fn new(options: TransportOptions) -> Result<Self, TransportError> {
        if options.skip_ssl_validation {
            warn!("TLS certificate validation is disabled for this command");
        }
        let http = Client::builder()
            .connect_timeout(options.connect_timeout)
            .danger_accept_invalid_certs(options.skip_ssl_validation)
            .build()
            .map_err(|error| TransportError::invalid_request("<client>", describe_error(&error)))?;

        Ok(Self {
            http,
            user_agent: format!("scs-cli/{}; {}", env!("CARGO_PKG_VERSION"), std::env::consts::OS),
        })
    }

    /// Build an authenticated request for `method` and `url`.
    ///
    /// Fails with [`TransportError::InvalidRequest`] when the URL does not
    /// parse or the token is not a valid header value.
    pub fn request(&self, method: Method, url: &str, token: &str) -> Result<RequestBuilder, TransportError> {
        let parsed_url = Url::parse(url).map_err(|error| TransportError::invalid_request(url, error))?;
        let authorization = HeaderValue::from_str(token).map_err(|error| TransportError::invalid_request(url, error))?;
        debug!(method = %method, url = %parsed_url, "building request");

        Ok(self
            .http
            .request(method, parsed_url)
            .header(header::ACCEPT, APPLICATION_JSON)
            .header(header::AUTHORIZATION, authorization)
            .header(header::USER_AGENT, &self.user_agent))
    }

    async fn send(&self, method: Method, url: &str, builder: RequestBuilder) -> Result<reqwest::Response, TransportError> {
        let start = Instant::now();
        match builder.send().await {
            Ok(response) => {
                debug!(
                    method = %method,
                    url = %url,
                    status = %response.status(),
                    duration_ms = start.elapsed().as_millis(),
                    "http request completed"
                );
                Ok(response)
            }
            Err(error) => {
                let message = describe_error(&error);
                warn!(
                    method = %method,
                    url = %url,
                    error = %message,
                    duration_ms = start.elapsed().as_millis(),
                    "http request failed"
                );
                Err(TransportError::failure(url, message))
            }
        }
    }

    async fn send_for_body(&self, method: Method, url: &str, builder: RequestBuilder) -> Result<HttpResponse, TransportError> {
        let response = self.send(method, url, builder).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| TransportError::body_unreadable(url, describe_error(&error)))?;
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl AuthenticatedClient for ScsHttpClient {
    async fn get(&self, url: &str, token: &str) -> Result<HttpResponse, TransportError> {
        let builder = self.request(Method::GET, url, token)?;
        self.send_for_body(Method::GET, url, builder).await
    }

    async fn post(&self, url: &str, content_type: &str, body: String, token: &str) -> Result<HttpResponse, TransportError> {
        let builder = self
            .request(Method::POST, url, token)?
            .header(header::CONTENT_TYPE, content_type)
            .body(body);
        self.send_for_body(Method::POST, url, builder).await
    }

    async fn put(&self, url: &str, body: Option<RequestBody>, token: &str) -> Result<StatusCode, TransportError> {
        let mut builder = self.request(Method::PUT, url, token)?;
        if let Some(RequestBody { content_type, body }) = body {
            builder = builder.header(header::CONTENT_TYPE, content_type).body(body);
        }
        Ok(self.send(Method::PUT, url, builder).await?.status())
    }

    async fn patch(&self, url: &str, content_type: &str, body: String, token: &str) -> Result<StatusCode, TransportError> {
        let builder = self
            .request(Method::PATCH, url, token)?
            .header(header::CONTENT_TYPE, content_type)
            .body(body);
        Ok(self.send(Method::PATCH, url, builder).await?.status())
    }

    async fn delete(&self, url: &str, token: &str) -> Result<StatusCode, TransportError> {
        let builder = self.request(Method::DELETE, url, token)?;
        Ok(self.send(Method::DELETE, url, builder).await?.status())
    }
}

/// Render an error together with its full source chain.
///
/// reqwest's own message rarely names the root cause; TLS trust failures only
/// show up further down the chain, and hint synthesis needs to see them.
pub fn describe_error(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    fn client() -> ScsHttpClient {
        ScsHttpClient::new(TransportOptions::default()).expect("build client")
    }

    #[test]
    fn requests_carry_accept_and_verbatim_authorization() {
        let request = client()
            .request(Method::GET, "https://config.example/cli/instance/g", "tok")
            .expect("request builder")
            .build()
            .expect("request");

        assert_eq!(request.headers()[header::ACCEPT], "application/json");
        assert_eq!(request.headers()[header::AUTHORIZATION], "tok");
        assert_eq!(request.url().as_str(), "https://config.example/cli/instance/g");
    }

    #[test]
    fn malformed_url_is_an_invalid_request() {
        let err = client().request(Method::GET, "://nope", "tok").unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest { ref url, .. } if url == "://nope"));
    }

    #[test]
    fn token_with_newline_is_an_invalid_request() {
        let err = client().request(Method::GET, "https://x.example", "tok\n").unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest { .. }));
    }

    #[test]
    fn skip_ssl_validation_builds() {
        let options = TransportOptions {
            skip_ssl_validation: true,
            ..TransportOptions::default()
        };
        assert!(ScsHttpClient::new(options).is_ok());
    }

    #[test]
    fn empty_body_is_missing_when_required() {
        let response = HttpResponse::new(StatusCode::OK, "");
        assert!(matches!(response.require_body("https://x"), Err(TransportError::MissingBody { .. })));
        let response = HttpResponse::new(StatusCode::OK, "{}");
        assert_eq!(response.require_body("https://x").expect("body"), "{}");
    }

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.1.as_deref().map(|inner| inner as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn describe_error_walks_the_source_chain() {
        let error = Layer(
            "error sending request",
            Some(Box::new(Layer("invalid peer certificate: UnknownIssuer", None))),
        );
        assert_eq!(describe_error(&error), "error sending request: invalid peer certificate: UnknownIssuer");
    }
}
