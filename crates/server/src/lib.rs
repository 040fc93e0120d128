//! Concierge Server
//!
//! HTTP API consumed by the storefront chat widget: session lifecycle,
//! free-text chat turns and structured widget intents.

pub mod auth;
pub mod collaborators;
pub mod http;
pub mod metrics;
pub mod rate_limit;
pub mod session;
pub mod state;

pub use auth::auth_middleware;
pub use collaborators::{
    HttpCatalog, HttpOrderDesk, HttpReturnsDesk, HttpStylistDesk, OwnershipGuard,
};
pub use http::create_router;
pub use metrics::{init_metrics, record_intent, record_turn};
pub use rate_limit::{RateLimitError, RateLimiter};
pub use session::{Session, SessionManager};
pub use state::AppState;

use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session error: {0}")]
    Session(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Session(_) => axum::http::StatusCode::NOT_FOUND,
            ServerError::Auth(_) => axum::http::StatusCode::UNAUTHORIZED,
            ServerError::RateLimit => axum::http::StatusCode::TOO_MANY_REQUESTS,
            ServerError::InvalidRequest(_) => axum::http::StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let status = axum::http::StatusCode::from(self);
        (status, message).into_response()
    }
}

impl From<concierge_core::EngineError> for ServerError {
    fn from(err: concierge_core::EngineError) -> Self {
        match err {
            concierge_core::EngineError::InvalidRequest(msg) => ServerError::InvalidRequest(msg),
            // Ownership misses reach the widget as concierge copy, not an
            // HTTP error; anything arriving here is a bug upstream.
            other => ServerError::Internal(other.to_string()),
        }
    }
}
