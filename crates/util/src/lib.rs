//! Utility functions shared by the SCS CLI crates.

pub mod config;
pub mod diagnostics;
pub mod display;
pub mod json;
pub mod token;

pub use config::{ConfigError, PluginConfig};
pub use diagnostics::{hint_for, redact_sensitive};
pub use json::decode_json;
pub use token::extract_access_token;
