//! # SCS Engine
//!
//! Resolves the administrative endpoint of a Spring Cloud Services instance
//! and runs typed operations against it.
//!
//! ## Architecture
//!
//! - **`platform`**: the [`Platform`] seam over the host platform CLI
//! - **`resolver`**: service name to administrative URL, for both broker
//!   generations
//! - **`operations`**: the [`Operation`] variants and their requests
//! - **`runner`**: token, resolution and dispatch in a fixed order
//! - **`eureka`**: registry reports and per-instance actions
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use scs_engine::{LifecycleCommand, Operation, OperationRunner};
//!
//! let runner = OperationRunner::new(platform, client, &config);
//! runner.run("my-config-server", &Operation::Lifecycle(LifecycleCommand::Restart)).await?;
//! ```

pub mod eureka;
pub mod operations;
pub mod platform;
pub mod resolver;
pub mod runner;

pub use eureka::{EurekaView, InstanceOperation};
pub use operations::{LifecycleCommand, Operation};
pub use platform::Platform;
pub use resolver::EndpointResolver;
pub use runner::{OperationRunner, acquire_access_token};
