//! Engine error types

use thiserror::Error;

/// Errors produced by the concierge engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// A submitted payload failed validation before any external call was made.
    /// Maps to HTTP 400 at the API boundary.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No order matched the lookup, or the requester is not allowed to see it.
    /// Deliberately opaque: the same variant covers a genuine miss and an
    /// ownership mismatch, so callers cannot distinguish the two.
    #[error("order not found")]
    OrderNotFound,

    /// A backend collaborator call failed (network error, 5xx). The executor
    /// turns this into an apology message; it is never retried internally.
    #[error("{service} unavailable: {message}")]
    Collaborator {
        service: &'static str,
        message: String,
    },
}

impl EngineError {
    /// Tag a collaborator failure with the service that produced it.
    pub fn collaborator(service: &'static str, message: impl Into<String>) -> Self {
        Self::Collaborator {
            service,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
