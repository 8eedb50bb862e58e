//! Infrastructure layer: collaborator implementations, snapshots and DI container
//!
//! This layer implements collaborator traits and wires up services.

pub mod di;
pub mod error;
pub mod snapshot;
pub mod traits;

pub use error::{InfraError, InfraResult};
