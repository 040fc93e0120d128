//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment, controls validation strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Relaxed validation, warnings only
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Strict validation applies in staging and production.
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Session store configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Backend collaborator endpoints
    #[serde(default)]
    pub collaborators: CollaboratorsConfig,

    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default log level when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON-formatted logs
    #[serde(default)]
    pub log_json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins; empty means allow any (development only)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// Per-session rate limiting for the turn endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting (set to false for development)
    #[serde(default)]
    pub enabled: bool,

    /// Sustained turns per second per session
    #[serde(default = "default_messages_per_second")]
    pub messages_per_second: u32,

    /// Burst allowance as a multiple of the sustained rate
    #[serde(default = "default_burst_multiplier")]
    pub burst_multiplier: f32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            messages_per_second: default_messages_per_second(),
            burst_multiplier: default_burst_multiplier(),
        }
    }
}

fn default_messages_per_second() -> u32 {
    5
}

fn default_burst_multiplier() -> f32 {
    2.0
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            rate_limit: RateLimitConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Enable authentication (set to false for development)
    #[serde(default)]
    pub enabled: bool,

    /// API key, normally set via CONCIERGE__SERVER__AUTH__API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    /// Paths that bypass authentication (health checks, metrics)
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,

    /// Support accounts allowed to view any order
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            public_paths: default_public_paths(),
            admin_emails: Vec::new(),
        }
    }
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle sessions older than this are pruned
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,

    /// How often the prune sweep runs
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// Hard cap on concurrently stored sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_seconds: default_idle_timeout(),
            sweep_interval_seconds: default_sweep_interval(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// One backend collaborator endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorEndpoint {
    pub base_url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_collaborator_timeout_ms")]
    pub timeout_ms: u64,
}

impl CollaboratorEndpoint {
    fn local(port: u16) -> Self {
        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            timeout_ms: default_collaborator_timeout_ms(),
        }
    }
}

/// Endpoints for the storefront services the engine talks to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorsConfig {
    #[serde(default = "default_catalog_endpoint")]
    pub catalog: CollaboratorEndpoint,

    #[serde(default = "default_orders_endpoint")]
    pub orders: CollaboratorEndpoint,

    #[serde(default = "default_returns_endpoint")]
    pub returns: CollaboratorEndpoint,

    #[serde(default = "default_stylists_endpoint")]
    pub stylists: CollaboratorEndpoint,
}

impl Default for CollaboratorsConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog_endpoint(),
            orders: default_orders_endpoint(),
            returns: default_returns_endpoint(),
            stylists: default_stylists_endpoint(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_public_paths() -> Vec<String> {
    vec![
        "/health".to_string(),
        "/ready".to_string(),
        "/metrics".to_string(),
    ]
}

fn default_idle_timeout() -> u64 {
    1800
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_collaborator_timeout_ms() -> u64 {
    3_000
}

fn default_catalog_endpoint() -> CollaboratorEndpoint {
    CollaboratorEndpoint::local(9100)
}

fn default_orders_endpoint() -> CollaboratorEndpoint {
    CollaboratorEndpoint::local(9101)
}

fn default_returns_endpoint() -> CollaboratorEndpoint {
    CollaboratorEndpoint::local(9102)
}

fn default_stylists_endpoint() -> CollaboratorEndpoint {
    CollaboratorEndpoint::local(9103)
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_session()?;
        self.validate_collaborators()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        let rate_limit = &server.rate_limit;
        if rate_limit.enabled {
            if rate_limit.messages_per_second == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "server.rate_limit.messages_per_second".to_string(),
                    message: "Must be at least 1 when rate limiting is enabled".to_string(),
                });
            }

            if rate_limit.burst_multiplier < 1.0 {
                return Err(ConfigError::InvalidValue {
                    field: "server.rate_limit.burst_multiplier".to_string(),
                    message: format!("Must be at least 1.0, got {}", rate_limit.burst_multiplier),
                });
            }
        }

        if self.environment.is_production() && server.auth.enabled && server.auth.api_key.is_none()
        {
            return Err(ConfigError::InvalidValue {
                field: "server.auth.api_key".to_string(),
                message: "API key must be set when auth is enabled in production".to_string(),
            });
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 This may block legitimate storefront requests."
            );
        }

        Ok(())
    }

    fn validate_session(&self) -> Result<(), ConfigError> {
        if self.session.idle_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.idle_timeout_seconds".to_string(),
                message: "Must be at least 1 second".to_string(),
            });
        }

        if self.session.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.max_sessions".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_collaborators(&self) -> Result<(), ConfigError> {
        let endpoints = [
            ("collaborators.catalog", &self.collaborators.catalog),
            ("collaborators.orders", &self.collaborators.orders),
            ("collaborators.returns", &self.collaborators.returns),
            ("collaborators.stylists", &self.collaborators.stylists),
        ];

        for (field, endpoint) in endpoints {
            if endpoint.base_url.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("{field}.base_url"),
                    message: "Base URL cannot be empty".to_string(),
                });
            }

            if !endpoint.base_url.starts_with("http://")
                && !endpoint.base_url.starts_with("https://")
            {
                return Err(ConfigError::InvalidValue {
                    field: format!("{field}.base_url"),
                    message: format!("Expected an http(s) URL, got '{}'", endpoint.base_url),
                });
            }

            if endpoint.timeout_ms == 0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("{field}.timeout_ms"),
                    message: "Must be at least 1 millisecond".to_string(),
                });
            }

            if self.environment.is_strict() && endpoint.base_url.contains("127.0.0.1") {
                tracing::warn!("{}: pointing at localhost in {:?}", field, self.environment);
            }
        }

        Ok(())
    }
}

/// Load settings from files and environment variables.
///
/// Sources, later ones override earlier ones:
/// 1. `config/default.{toml,yaml}` (optional)
/// 2. `config/{env}.{toml,yaml}` when an environment name is given (optional)
/// 3. `CONCIERGE__`-prefixed environment variables
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("CONCIERGE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert!(!settings.server.auth.enabled);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_port_zero_rejected() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_production_auth_requires_key() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        settings.server.auth.enabled = true;
        settings.server.auth.api_key = None;
        assert!(settings.validate().is_err());

        settings.server.auth.api_key = Some("secret".to_string());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_collaborator_url_must_be_http() {
        let mut settings = Settings::default();
        settings.collaborators.orders.base_url = "orders.internal:9101".to_string();
        assert!(settings.validate().is_err());

        settings.collaborators.orders.base_url = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rate_limit_validated_when_enabled() {
        let mut settings = Settings::default();
        settings.server.rate_limit.enabled = true;
        settings.server.rate_limit.messages_per_second = 0;
        assert!(settings.validate().is_err());

        settings.server.rate_limit.messages_per_second = 5;
        settings.server.rate_limit.burst_multiplier = 0.5;
        assert!(settings.validate().is_err());

        settings.server.rate_limit.burst_multiplier = 2.0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_session_limits_validated() {
        let mut settings = Settings::default();
        settings.session.idle_timeout_seconds = 0;
        assert!(settings.validate().is_err());

        settings.session.idle_timeout_seconds = 60;
        settings.session.max_sessions = 0;
        assert!(settings.validate().is_err());
    }
}
