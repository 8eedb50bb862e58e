//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, DropPosition};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("cannot drop {dragged} {position} {target}")]
    IllegalMove {
        dragged: String,
        target: String,
        position: DropPosition,
    },

    #[error("root group cannot be dragged: {0}")]
    RootNotDraggable(String),

    #[error("edit left the hierarchy inconsistent: {0}")]
    Inconsistent(#[source] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
