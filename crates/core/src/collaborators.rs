//! Outbound collaborator traits and their wire shapes
//!
//! The engine never owns catalog, order, returns or stylist data. It talks
//! to the rest of the storefront through these traits, which the server
//! implements over HTTP and tests implement in memory. Timeouts and retries
//! live behind the trait boundary, not in the engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A product as returned by the catalog collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub image: String,
    pub ready_to_ship: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
}

/// Lightweight handle kept in the session shortlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: String,
    pub title: String,
}

impl From<&Product> for ProductRef {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
        }
    }
}

/// Query sent to the product-search collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_to_ship: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carat_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carat_max: Option<f64>,
}

/// Order lookup credentials: either an order number, or email + postal code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderLookup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

impl OrderLookup {
    /// At least one complete credential pair is present.
    pub fn has_credentials(&self) -> bool {
        self.order_id.as_deref().is_some_and(|id| !id.trim().is_empty())
            || (self.email.as_deref().is_some_and(|e| !e.trim().is_empty())
                && self
                    .postal_code
                    .as_deref()
                    .is_some_and(|p| !p.trim().is_empty()))
    }
}

/// One step of an order's fulfillment timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub label: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_current: Option<bool>,
}

/// Order status as returned by the order-desk collaborator.
///
/// `customer_email` is the record owner used for the ownership check at the
/// API boundary; it is never forwarded to the widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTimeline {
    pub reference: String,
    pub entries: Vec<TimelineEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

/// Resolution options offered for an existing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnOption {
    Resize,
    Return,
    Care,
}

impl ReturnOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnOption::Resize => "resize",
            ReturnOption::Return => "return",
            ReturnOption::Care => "care",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub order_id: String,
    pub option: ReturnOption,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnReceipt {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylistRequest {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StylistReceipt {
    pub message: String,
}

/// Ready-to-ship product search.
#[async_trait]
pub trait ProductCatalog: Send + Sync + 'static {
    /// Search the catalog. An empty result is a valid, non-error outcome.
    async fn search(&self, query: &ProductQuery) -> Result<Vec<Product>>;
}

/// Order status lookups.
#[async_trait]
pub trait OrderDesk: Send + Sync + 'static {
    /// Resolve an order's fulfillment timeline.
    ///
    /// Returns [`crate::EngineError::OrderNotFound`] for a miss; ownership
    /// enforcement wraps this trait at the API boundary.
    async fn status(&self, lookup: &OrderLookup) -> Result<OrderTimeline>;
}

/// Returns, exchanges and care requests against an existing order.
#[async_trait]
pub trait ReturnsDesk: Send + Sync + 'static {
    async fn open_return(&self, request: &ReturnRequest) -> Result<ReturnReceipt>;
}

/// Human stylist handoff.
#[async_trait]
pub trait StylistDesk: Send + Sync + 'static {
    async fn request_contact(&self, request: &StylistRequest) -> Result<StylistReceipt>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_credentials() {
        assert!(OrderLookup {
            order_id: Some("GG-123456".to_string()),
            ..Default::default()
        }
        .has_credentials());

        assert!(OrderLookup {
            email: Some("a@b.com".to_string()),
            postal_code: Some("10001".to_string()),
            ..Default::default()
        }
        .has_credentials());

        // Email alone is not enough
        assert!(!OrderLookup {
            email: Some("a@b.com".to_string()),
            ..Default::default()
        }
        .has_credentials());

        assert!(!OrderLookup::default().has_credentials());
        assert!(!OrderLookup {
            order_id: Some("   ".to_string()),
            ..Default::default()
        }
        .has_credentials());
    }

    #[test]
    fn test_product_wire_shape() {
        let product = Product {
            id: "p1".to_string(),
            title: "Aurora Ring".to_string(),
            price: 1450.0,
            image: "/img/aurora.jpg".to_string(),
            ready_to_ship: true,
            category: Some("ring".to_string()),
            metal: Some("rose-gold".to_string()),
            base_price: Some(1450.0),
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["readyToShip"], true);
        assert_eq!(json["basePrice"], 1450.0);
    }
}
