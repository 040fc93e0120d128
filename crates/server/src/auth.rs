//! Authentication Middleware
//!
//! API key authentication for the concierge HTTP API via
//! `Authorization: Bearer <api_key>`. The key comes from configuration
//! (`CONCIERGE__SERVER__AUTH__API_KEY`); health and metrics paths bypass
//! the check.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use concierge_config::Settings;

/// Track if we've warned about auth being disabled (warn once only)
static AUTH_DISABLED_WARNED: AtomicBool = AtomicBool::new(false);

/// Authentication result after checking config
enum AuthCheck {
    /// Authentication disabled, pass through
    Disabled,
    /// Path is public, pass through
    PublicPath,
    /// Config error
    ConfigError(&'static str),
    /// Need to check API key against this expected key
    CheckKey(String),
}

fn check_auth_config(settings: &Settings, path: &str) -> AuthCheck {
    let auth = &settings.server.auth;

    if !auth.enabled {
        if !AUTH_DISABLED_WARNED.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                "API authentication is DISABLED. Set CONCIERGE__SERVER__AUTH__ENABLED=true for production."
            );
        }
        return AuthCheck::Disabled;
    }

    if auth.public_paths.iter().any(|p| path.starts_with(p)) {
        return AuthCheck::PublicPath;
    }

    match &auth.api_key {
        Some(key) if !key.is_empty() => AuthCheck::CheckKey(key.clone()),
        _ => AuthCheck::ConfigError("Auth is enabled but no API key is configured"),
    }
}

/// Authentication middleware that checks for a valid API key.
///
/// Returns 401 Unauthorized when auth is enabled and the key is missing or
/// invalid; 400 for a malformed Authorization header.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let settings = match request.extensions().get::<Arc<Settings>>() {
        Some(settings) => settings.clone(),
        None => {
            tracing::error!("Settings extension not found in request");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error",
            )
                .into_response();
        }
    };

    let path = request.uri().path().to_string();

    match check_auth_config(&settings, &path) {
        AuthCheck::Disabled | AuthCheck::PublicPath => next.run(request).await,
        AuthCheck::ConfigError(msg) => {
            tracing::error!("{}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server authentication not configured",
            )
                .into_response()
        }
        AuthCheck::CheckKey(expected_key) => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());

            match auth_header {
                Some(header) if header.starts_with("Bearer ") => {
                    let provided_key = &header[7..];

                    if constant_time_compare(provided_key.as_bytes(), expected_key.as_bytes()) {
                        next.run(request).await
                    } else {
                        tracing::warn!(
                            "Invalid API key provided from {:?}",
                            request.headers().get("X-Forwarded-For")
                        );
                        (StatusCode::UNAUTHORIZED, "Invalid API key").into_response()
                    }
                }
                Some(_) => (
                    StatusCode::BAD_REQUEST,
                    "Invalid Authorization header format. Expected: Bearer <token>",
                )
                    .into_response(),
                None => {
                    (StatusCode::UNAUTHORIZED, "Missing Authorization header").into_response()
                }
            }
        }
    }
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"secret", b"secret"));
        assert!(!constant_time_compare(b"secret", b"secre"));
        assert!(!constant_time_compare(b"secret", b"secreT"));
        assert!(!constant_time_compare(b"abc", b"xyz"));
    }

    #[test]
    fn test_public_path_bypasses_auth() {
        let mut settings = Settings::default();
        settings.server.auth.enabled = true;
        settings.server.auth.api_key = Some("secret".to_string());

        assert!(matches!(
            check_auth_config(&settings, "/health"),
            AuthCheck::PublicPath
        ));
        assert!(matches!(
            check_auth_config(&settings, "/api/chat/abc"),
            AuthCheck::CheckKey(_)
        ));
    }

    #[test]
    fn test_enabled_without_key_is_config_error() {
        let mut settings = Settings::default();
        settings.server.auth.enabled = true;

        assert!(matches!(
            check_auth_config(&settings, "/api/sessions"),
            AuthCheck::ConfigError(_)
        ));
    }
}
