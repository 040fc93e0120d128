//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use concierge_config::Settings;
use concierge_core::{OrderDesk, ProductCatalog, ReturnsDesk, StylistDesk};
use concierge_engine::ScriptExecutor;

use crate::collaborators::{
    HttpCatalog, HttpOrderDesk, HttpReturnsDesk, HttpStylistDesk, OwnershipGuard,
};
use crate::rate_limit::RateLimiter;
use crate::session::{Session, SessionManager};
use crate::ServerError;

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub sessions: Arc<SessionManager>,
    catalog: Arc<dyn ProductCatalog>,
    orders: Arc<dyn OrderDesk>,
    returns: Arc<dyn ReturnsDesk>,
    stylists: Arc<dyn StylistDesk>,
    admin_emails: Arc<Vec<String>>,
    rate_limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    /// Build state with HTTP collaborator clients from configuration.
    pub fn new(config: Settings) -> Result<Self, ServerError> {
        let endpoints = &config.collaborators;
        let catalog = HttpCatalog::new(&endpoints.catalog)
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        let orders = HttpOrderDesk::new(&endpoints.orders)
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        let returns = HttpReturnsDesk::new(&endpoints.returns)
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        let stylists = HttpStylistDesk::new(&endpoints.stylists)
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        Ok(Self::with_collaborators(
            config,
            Arc::new(catalog),
            Arc::new(orders),
            Arc::new(returns),
            Arc::new(stylists),
        ))
    }

    /// Build state around explicit collaborator implementations.
    pub fn with_collaborators(
        config: Settings,
        catalog: Arc<dyn ProductCatalog>,
        orders: Arc<dyn OrderDesk>,
        returns: Arc<dyn ReturnsDesk>,
        stylists: Arc<dyn StylistDesk>,
    ) -> Self {
        let sessions = Arc::new(SessionManager::with_config(
            config.session.max_sessions,
            Duration::from_secs(config.session.idle_timeout_seconds),
            Duration::from_secs(config.session.sweep_interval_seconds),
        ));
        let admin_emails = Arc::new(config.server.auth.admin_emails.clone());
        let rate_limiter = config
            .server
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiter::new(&config.server.rate_limit)));

        Self {
            config: Arc::new(config),
            sessions,
            catalog,
            orders,
            returns,
            stylists,
            admin_emails,
            rate_limiter,
        }
    }

    /// Take one rate-limit token for the session, when limiting is enabled.
    pub fn check_rate_limit(&self, session_id: &str) -> Result<(), ServerError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter
                .check(session_id)
                .map_err(|_| ServerError::RateLimit)?;
        }
        Ok(())
    }

    /// Executor for one turn of the given session.
    ///
    /// The ownership guard is bound to the session's verified email, so
    /// order lookups are checked against the requester every turn.
    pub fn executor_for(&self, session: &Session) -> ScriptExecutor {
        let guarded_orders = Arc::new(OwnershipGuard::new(
            self.orders.clone(),
            session.auth_email.clone(),
            self.admin_emails.clone(),
        ));

        ScriptExecutor::new(
            self.catalog.clone(),
            guarded_orders,
            self.returns.clone(),
            self.stylists.clone(),
        )
    }
}
