//! Core types for the concierge engine
//!
//! This crate provides the foundational types shared across the workspace:
//! - The closed intent enumeration and classification results
//! - Canonical product filters and the filter normalizer
//! - Per-conversation session state (value-threaded, caller-owned)
//! - The widget message contract consumed by the storefront UI
//! - Collaborator traits for backend lookups (products, orders, returns, stylists)
//! - Error types

pub mod collaborators;
pub mod error;
pub mod filters;
pub mod intent;
pub mod message;
pub mod payload;
pub mod session;

pub use collaborators::{
    OrderDesk, OrderLookup, OrderTimeline, Product, ProductCatalog, ProductQuery, ProductRef,
    ReturnOption, ReturnReceipt, ReturnRequest, ReturnsDesk, StylistDesk, StylistReceipt,
    StylistRequest, TimelineEntry,
};
pub use error::{EngineError, Result};
pub use filters::{canonical_metal, normalize_filters, Filters, PriceBand, RawFilters};
pub use intent::{ClassificationResult, Intent, IntentContext};
pub use message::{
    EscalationFormSpec, MessageBody, MessageRole, ModuleBody, OrderLookupForm, ProductFilterForm,
    ReturnOptionChoice, WidgetMessage,
};
pub use payload::{CsatRating, IntentPayload};
pub use session::SessionState;
