//! Configuration for the concierge service
//!
//! Settings load from optional files (`config/default`, then an
//! environment-specific overlay) and environment variables with the
//! `CONCIERGE` prefix and `__` section separator, e.g.
//! `CONCIERGE__SERVER__PORT=8080`.

pub mod settings;

pub use settings::{
    load_settings, AuthConfig, CollaboratorEndpoint, CollaboratorsConfig, ObservabilityConfig,
    RateLimitConfig, RuntimeEnvironment, ServerConfig, SessionConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
