//! Widget message contract
//!
//! The fixed vocabulary of messages the concierge produces and the
//! storefront widget renders. The engine only builds values conforming to
//! this contract, never UI code. Additive fields and types are
//! non-breaking; consumers must ignore message types they do not know.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collaborators::{Product, TimelineEntry};
use crate::intent::Intent;

/// Who a message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Concierge,
}

/// Message type + payload, tagged per the widget contract:
/// `{ "type": ..., "payload": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum MessageBody {
    /// Plain concierge copy
    AssistantText { text: String },
    /// A single highlighted product
    ProductCard { product: Product },
    /// Standalone escalation prompt (module wrapper preferred for forms)
    EscalationForm { prompt: String },
    /// Satisfaction rating bar
    CsatBar { prompt: String },
    /// Order fulfillment timeline
    OrderStatus {
        reference: String,
        entries: Vec<TimelineEntry>,
    },
    /// Interactive module wrapper (forms and carousels)
    Module(ModuleBody),
}

/// Interactive module payloads, tagged `{ "module": ..., "data": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "module", content = "data", rename_all = "kebab-case")]
pub enum ModuleBody {
    /// Form prompting the user to narrow a product search
    ProductFilter(ProductFilterForm),
    /// Search results, possibly empty
    ProductCarousel { products: Vec<Product> },
    /// Form requesting order number or email + postal code
    OrderLookup(OrderLookupForm),
    /// Resolution choices for an existing order
    ReturnOptions { options: Vec<ReturnOptionChoice> },
    /// Stylist escalation form
    EscalationForm(EscalationFormSpec),
}

/// Describes the product-filter form: the choices the widget should offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilterForm {
    pub categories: Vec<String>,
    pub metals: Vec<String>,
    /// Suggested price ceilings, ascending
    pub price_caps: Vec<f64>,
}

impl Default for ProductFilterForm {
    fn default() -> Self {
        Self {
            categories: ["ring", "necklace", "bracelet", "earrings", "pendant"]
                .map(str::to_string)
                .to_vec(),
            metals: [
                "yellow-gold",
                "white-gold",
                "rose-gold",
                "platinum",
                "sterling-silver",
            ]
            .map(str::to_string)
            .to_vec(),
            price_caps: vec![500.0, 1000.0, 2500.0, 5000.0],
        }
    }
}

/// Describes the order-lookup form fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLookupForm {
    pub order_id_hint: String,
    pub accepts_email_postal: bool,
}

impl Default for OrderLookupForm {
    fn default() -> Self {
        Self {
            order_id_hint: "GG-123456".to_string(),
            accepts_email_postal: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnOptionChoice {
    pub option: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationFormSpec {
    pub prompt: String,
    pub contact_fields: Vec<String>,
}

impl Default for EscalationFormSpec {
    fn default() -> Self {
        Self {
            prompt: "Share how our stylists can reach you and we will be in touch shortly."
                .to_string(),
            contact_fields: ["email", "phone"].map(str::to_string).to_vec(),
        }
    }
}

/// One widget message: `{ id, role, type, payload, intent?, timestamp }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetMessage {
    pub id: Uuid,
    pub role: MessageRole,
    #[serde(flatten)]
    pub body: MessageBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    pub timestamp: DateTime<Utc>,
}

impl WidgetMessage {
    /// Build a concierge-authored message.
    pub fn concierge(body: MessageBody, intent: Option<Intent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: MessageRole::Concierge,
            body,
            intent,
            timestamp: Utc::now(),
        }
    }

    /// Concierge text message.
    pub fn text(intent: Intent, text: impl Into<String>) -> Self {
        Self::concierge(
            MessageBody::AssistantText { text: text.into() },
            Some(intent),
        )
    }

    /// Concierge module message.
    pub fn module(intent: Intent, module: ModuleBody) -> Self {
        Self::concierge(MessageBody::Module(module), Some(intent))
    }

    /// True when the message wraps the given module name.
    pub fn is_module(&self, name: &str) -> bool {
        match &self.body {
            MessageBody::Module(module) => module.name() == name,
            _ => false,
        }
    }
}

impl ModuleBody {
    pub fn name(&self) -> &'static str {
        match self {
            ModuleBody::ProductFilter(_) => "product-filter",
            ModuleBody::ProductCarousel { .. } => "product-carousel",
            ModuleBody::OrderLookup(_) => "order-lookup",
            ModuleBody::ReturnOptions { .. } => "return-options",
            ModuleBody::EscalationForm(_) => "escalation-form",
        }
    }
}
