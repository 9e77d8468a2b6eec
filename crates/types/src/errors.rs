//! Error taxonomy shared by every SCS crate.
//!
//! Each kind is its own enum; [`ScsError`] wraps them transparently so the
//! command layer prints the upstream message verbatim.

use thiserror::Error;

/// Top-level error surfaced to the command layer.
#[derive(Debug, Error)]
pub enum ScsError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Access token missing or malformed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Access token output invalid: {output}")]
    InvalidTokenOutput { output: String },

    #[error("Access token not available: {cause}")]
    Unavailable { cause: String },
}

/// Service or application not found.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Service instance {name} not found: {cause}")]
    ServiceNotFound { name: String, cause: String },

    #[error("cf app name {name} not found")]
    CfAppNotFound { name: String },

    #[error("No instance found with index {index}")]
    InstanceIndexNotFound { index: u32 },

    #[error("Failed to determine cf app name corresponding to cf app GUID '{guid}': {description}: code {code}, error_code {error_code}")]
    CfAppNameUnresolved {
        guid: String,
        description: String,
        code: i64,
        error_code: String,
    },
}

/// Administrative URL could not be derived.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("path of {url} has no segments")]
    InvalidDashboardPath { url: String },

    #[error("Error parsing URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("The /cli/instance endpoint could not be found.")]
    LegacyBrokerUnsupported,

    #[error("Empty service URI returned by {url}")]
    EmptyServiceUri { url: String },

    #[error("Unexpected status code {status} when probing service broker at {url}")]
    BrokerProbe { url: String, status: u16 },

    #[error("Cannot derive the service broker host from API endpoint '{endpoint}'")]
    ApiEndpoint { endpoint: String },
}

/// Network-level failure or unusable response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request to '{url}' could not be created: {reason}")]
    InvalidRequest { url: String, reason: String },

    #[error("Request to '{url}' failed: {message}")]
    Failure { url: String, message: String },

    #[error("Response from '{url}' has no body")]
    MissingBody { url: String },

    #[error("Response body from '{url}' could not be read: {message}")]
    BodyUnreadable { url: String, message: String },
}

/// Response body did not decode.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Invalid {what} response JSON: {reason}, response body: '{body}'")]
    Decode { what: String, reason: String, body: String },

    #[error("Could not encode {what} request: {reason}")]
    Encode { what: String, reason: String },
}

/// Client-side input check failed before any request was sent.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("CredHub path should just include the required fields: {{appName}}/{{profile}}/{{label}}/{{propertyName}}")]
    InvalidCredHubPath { path: String },

    #[error("Secret must be valid JSON: {reason}")]
    InvalidSecretJson { reason: String },

    #[error("Invalid cf instance index '{value}' in registry metadata: {reason}")]
    InvalidInstanceIndex { value: String, reason: String },

    #[error("{message}")]
    InvalidArgument { message: String },
}

/// Operation-specific semantic failure.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("{action}, status code: {status}")]
    UnexpectedStatus { action: String, status: u16 },

    #[error("Encryption failed: {body}")]
    Encryption { body: String },

    #[error("Failed to report progress: {reason}")]
    Progress { reason: String },
}

/// The host platform CLI could not answer.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("cf {command} failed: {message}")]
    Command { command: String, message: String },

    #[error("Unexpected output from cf {command}: {message}")]
    Output { command: String, message: String },
}

impl AuthError {
    pub fn invalid_token_output(output: impl Into<String>) -> Self {
        Self::InvalidTokenOutput { output: output.into() }
    }

    pub fn unavailable(cause: impl ToString) -> Self {
        Self::Unavailable { cause: cause.to_string() }
    }
}

impl LookupError {
    pub fn service_not_found(name: impl Into<String>, cause: impl ToString) -> Self {
        Self::ServiceNotFound {
            name: name.into(),
            cause: cause.to_string(),
        }
    }

    pub fn cf_app_not_found(name: impl Into<String>) -> Self {
        Self::CfAppNotFound { name: name.into() }
    }
}

impl ResolveError {
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

impl TransportError {
    pub fn invalid_request(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidRequest {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn failure(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn body_unreadable(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BodyUnreadable {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl ProtocolError {
    pub fn decode(what: impl Into<String>, reason: impl ToString, body: impl Into<String>) -> Self {
        Self::Decode {
            what: what.into(),
            reason: reason.to_string(),
            body: body.into(),
        }
    }

    pub fn encode(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::Encode {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}

impl OperationError {
    pub fn unexpected_status(action: impl Into<String>, status: u16) -> Self {
        Self::UnexpectedStatus {
            action: action.into(),
            status,
        }
    }
}

impl PlatformError {
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn output(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Output {
            command: command.into(),
            message: message.into(),
        }
    }
}
