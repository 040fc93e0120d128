//! Widget-emitted intent payloads
//!
//! Each intent carries exactly the fields its handler needs, selected by the
//! `action` tag the widget sends. Deserialization does the shape checking,
//! so handlers never inspect loose JSON.

use serde::{Deserialize, Serialize};

use crate::collaborators::{OrderLookup, ReturnOption};
use crate::filters::RawFilters;

/// Payload accompanying an intent, tagged by `action`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum IntentPayload {
    /// No payload: the handler responds with its prompt/form.
    #[default]
    None,
    /// Product-filter form submission
    SubmitProductFilters { filters: RawFilters },
    /// Order-lookup form submission
    SubmitOrderLookup {
        #[serde(flatten)]
        lookup: OrderLookup,
    },
    /// Return-options selection
    SelectReturnOption {
        order_id: String,
        option: ReturnOption,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        notes: Option<String>,
    },
    /// Escalation form submission
    RequestStylist {
        #[serde(default)]
        contact: Option<String>,
    },
    /// Satisfaction rating submission
    SubmitCsat { rating: CsatRating },
}

/// Satisfaction ratings the widget can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsatRating {
    Delighted,
    Satisfied,
    NeedsFollowUp,
}

impl CsatRating {
    /// Negative feedback triggers automatic stylist escalation.
    pub fn is_negative(&self) -> bool {
        matches!(self, CsatRating::NeedsFollowUp)
    }
}
