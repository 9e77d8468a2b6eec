//! Shared type definitions for the Spring Cloud Services CLI.
//!
//! - [`model`]: request-scoped entities (service instances, resolved
//!   management parameters, platform apps)
//! - [`responses`]: typed records for the broker and dashboard endpoints
//! - [`eureka`]: service registry records and the joined per-instance row
//! - [`errors`]: the error taxonomy surfaced to the command layer

pub mod errors;
pub mod eureka;
pub mod model;
pub mod responses;

pub use errors::*;
pub use eureka::*;
pub use model::*;
pub use responses::*;
