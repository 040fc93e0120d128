//! HTTP collaborator clients
//!
//! Implementations of the engine's collaborator traits over the storefront's
//! internal HTTP services, plus the ownership guard that gates order
//! lookups. Each client owns its [`reqwest::Client`] with the configured
//! per-request timeout; errors collapse into
//! [`EngineError::Collaborator`] for the executor to apologize over.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use concierge_config::CollaboratorEndpoint;
use concierge_core::{
    EngineError, OrderDesk, OrderLookup, OrderTimeline, Product, ProductCatalog, ProductQuery,
    Result, ReturnReceipt, ReturnRequest, ReturnsDesk, StylistDesk, StylistReceipt, StylistRequest,
};

fn build_client(endpoint: &CollaboratorEndpoint, service: &'static str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(endpoint.timeout_ms))
        .build()
        .map_err(|e| EngineError::collaborator(service, e.to_string()))
}

/// Product search over the catalog service.
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(endpoint: &CollaboratorEndpoint) -> Result<Self> {
        Ok(Self {
            client: build_client(endpoint, "catalog")?,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ProductCatalog for HttpCatalog {
    async fn search(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let url = format!("{}/api/products/search", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(query)
            .send()
            .await
            .map_err(|e| EngineError::collaborator("catalog", e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::collaborator(
                "catalog",
                format!("unexpected status {}", response.status()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| EngineError::collaborator("catalog", e.to_string()))
    }
}

/// Order status over the order management service.
pub struct HttpOrderDesk {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrderDesk {
    pub fn new(endpoint: &CollaboratorEndpoint) -> Result<Self> {
        Ok(Self {
            client: build_client(endpoint, "orders")?,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl OrderDesk for HttpOrderDesk {
    async fn status(&self, lookup: &OrderLookup) -> Result<OrderTimeline> {
        let url = format!("{}/api/orders/status", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(lookup)
            .send()
            .await
            .map_err(|e| EngineError::collaborator("orders", e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(EngineError::OrderNotFound),
            status if status.is_success() => response
                .json()
                .await
                .map_err(|e| EngineError::collaborator("orders", e.to_string())),
            status => Err(EngineError::collaborator(
                "orders",
                format!("unexpected status {status}"),
            )),
        }
    }
}

/// Returns, exchanges and care intake service.
pub struct HttpReturnsDesk {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReturnsDesk {
    pub fn new(endpoint: &CollaboratorEndpoint) -> Result<Self> {
        Ok(Self {
            client: build_client(endpoint, "returns")?,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ReturnsDesk for HttpReturnsDesk {
    async fn open_return(&self, request: &ReturnRequest) -> Result<ReturnReceipt> {
        let url = format!("{}/api/returns", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| EngineError::collaborator("returns", e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::collaborator(
                "returns",
                format!("unexpected status {}", response.status()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| EngineError::collaborator("returns", e.to_string()))
    }
}

/// Stylist handoff service.
pub struct HttpStylistDesk {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStylistDesk {
    pub fn new(endpoint: &CollaboratorEndpoint) -> Result<Self> {
        Ok(Self {
            client: build_client(endpoint, "stylists")?,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StylistDesk for HttpStylistDesk {
    async fn request_contact(&self, request: &StylistRequest) -> Result<StylistReceipt> {
        let url = format!("{}/api/stylist-requests", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| EngineError::collaborator("stylists", e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::collaborator(
                "stylists",
                format!("unexpected status {}", response.status()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| EngineError::collaborator("stylists", e.to_string()))
    }
}

/// Order ownership guard, applied per turn.
///
/// Wraps the real [`OrderDesk`] and refuses to hand an order timeline to a
/// requester who neither owns it nor supplied the owning email in the
/// lookup. Refusals surface as [`EngineError::OrderNotFound`], identical to
/// a genuine miss. Fail closed: an order record with no owner email is
/// treated as unauthorized.
pub struct OwnershipGuard {
    inner: Arc<dyn OrderDesk>,
    requester_email: Option<String>,
    admin_emails: Arc<Vec<String>>,
}

impl OwnershipGuard {
    pub fn new(
        inner: Arc<dyn OrderDesk>,
        requester_email: Option<String>,
        admin_emails: Arc<Vec<String>>,
    ) -> Self {
        Self {
            inner,
            requester_email,
            admin_emails,
        }
    }

    fn is_admin(&self) -> bool {
        let Some(requester) = &self.requester_email else {
            return false;
        };
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(requester))
    }

    fn is_allowed(&self, lookup: &OrderLookup, timeline: &OrderTimeline) -> bool {
        if self.is_admin() {
            return true;
        }

        let Some(owner) = timeline.customer_email.as_deref() else {
            tracing::warn!(
                reference = %timeline.reference,
                "order record has no owner email, refusing lookup"
            );
            return false;
        };

        // Knowing the owning email (verified session or the lookup
        // credentials themselves) counts as ownership.
        let requester_matches = self
            .requester_email
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(owner));
        let lookup_matches = lookup
            .email
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(owner));

        requester_matches || lookup_matches
    }
}

#[async_trait]
impl OrderDesk for OwnershipGuard {
    async fn status(&self, lookup: &OrderLookup) -> Result<OrderTimeline> {
        let timeline = self.inner.status(lookup).await?;

        if !self.is_allowed(lookup, &timeline) {
            tracing::info!(reference = %timeline.reference, "order lookup refused");
            return Err(EngineError::OrderNotFound);
        }

        Ok(timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubOrders {
        owner: Option<&'static str>,
    }

    #[async_trait]
    impl OrderDesk for StubOrders {
        async fn status(&self, _lookup: &OrderLookup) -> Result<OrderTimeline> {
            Ok(OrderTimeline {
                reference: "GG-123456".to_string(),
                entries: vec![],
                customer_email: self.owner.map(str::to_string),
            })
        }
    }

    fn guard(
        owner: Option<&'static str>,
        requester: Option<&str>,
        admins: Vec<String>,
    ) -> OwnershipGuard {
        OwnershipGuard::new(
            Arc::new(StubOrders { owner }),
            requester.map(str::to_string),
            Arc::new(admins),
        )
    }

    #[tokio::test]
    async fn test_owner_session_allowed() {
        let guard = guard(Some("client@example.com"), Some("Client@Example.com"), vec![]);
        assert!(guard.status(&OrderLookup::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_lookup_email_counts_as_ownership() {
        let guard = guard(Some("client@example.com"), None, vec![]);
        let lookup = OrderLookup {
            email: Some("client@example.com".to_string()),
            postal_code: Some("10001".to_string()),
            ..Default::default()
        };
        assert!(guard.status(&lookup).await.is_ok());
    }

    #[tokio::test]
    async fn test_stranger_sees_not_found() {
        let guard = guard(Some("client@example.com"), Some("other@example.com"), vec![]);
        let result = guard.status(&OrderLookup::default()).await;
        assert!(matches!(result, Err(EngineError::OrderNotFound)));
    }

    #[tokio::test]
    async fn test_missing_owner_email_fails_closed() {
        let guard = guard(None, Some("client@example.com"), vec![]);
        let result = guard.status(&OrderLookup::default()).await;
        assert!(matches!(result, Err(EngineError::OrderNotFound)));
    }

    #[tokio::test]
    async fn test_admin_bypasses_ownership() {
        let guard = guard(
            Some("client@example.com"),
            Some("support@maisonlumine.com"),
            vec!["support@maisonlumine.com".to_string()],
        );
        assert!(guard.status(&OrderLookup::default()).await.is_ok());
    }
}
