//! Intent enumeration and classification results

use serde::{Deserialize, Serialize};

use crate::filters::Filters;

/// What the user wants from the concierge. Closed set, never extended at
/// runtime: the script executor dispatches exhaustively over these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Product discovery, optionally with extracted filters
    FindProduct,
    /// Order tracking by order number or email + postal code
    TrackOrder,
    /// Returns and exchanges
    ReturnExchange,
    /// Resizing and repair requests
    SizingRepairs,
    /// Care instructions and warranty questions
    CareWarranty,
    /// Payment plans and financing
    Financing,
    /// Escalation to a human stylist
    StylistContact,
    /// Satisfaction rating submission
    Csat,
    /// Fallback when no rule matches
    Clarify,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::FindProduct => "find_product",
            Intent::TrackOrder => "track_order",
            Intent::ReturnExchange => "return_exchange",
            Intent::SizingRepairs => "sizing_repairs",
            Intent::CareWarranty => "care_warranty",
            Intent::Financing => "financing",
            Intent::StylistContact => "stylist_contact",
            Intent::Csat => "csat",
            Intent::Clarify => "clarify",
        }
    }

    /// Parse an intent name arriving over the widget channel.
    ///
    /// Returns `None` for anything outside the closed set so the caller can
    /// log the anomaly and fall back to [`Intent::Clarify`] instead of
    /// failing the turn.
    pub fn parse_widget(name: &str) -> Option<Self> {
        match name {
            "find_product" => Some(Intent::FindProduct),
            "track_order" => Some(Intent::TrackOrder),
            "return_exchange" => Some(Intent::ReturnExchange),
            "sizing_repairs" => Some(Intent::SizingRepairs),
            "care_warranty" => Some(Intent::CareWarranty),
            "financing" => Some(Intent::Financing),
            "stylist_contact" => Some(Intent::StylistContact),
            "csat" => Some(Intent::Csat),
            "clarify" => Some(Intent::Clarify),
            _ => None,
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of the intent classifier.
///
/// Produced fresh on every call, never mutated. `reason` is a stable
/// diagnostic code (e.g. `order_number_detected`) for logging and tests,
/// not user-facing copy. Confidence values are policy constants expressing
/// "strong match" vs "weak inference", not computed probabilities.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub intent: Intent,
    /// Confidence in [0, 1]
    pub confidence: f32,
    /// Filters extracted from the utterance (product discovery only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
    /// Stable diagnostic code
    pub reason: &'static str,
}

impl ClassificationResult {
    pub fn new(intent: Intent, confidence: f32, reason: &'static str) -> Self {
        Self {
            intent,
            confidence,
            filters: None,
            reason,
        }
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = Some(filters);
        self
    }
}

/// Prior-turn context carried into the classifier.
///
/// Only used to resolve referential continuations ("show me more") back to
/// the previous turn's filters. Must not override an utterance that carries
/// its own explicit filter language.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_intent: Option<Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_filters: Option<Filters>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_round_trip() {
        for name in [
            "find_product",
            "track_order",
            "return_exchange",
            "sizing_repairs",
            "care_warranty",
            "financing",
            "stylist_contact",
            "csat",
            "clarify",
        ] {
            let intent = Intent::parse_widget(name).unwrap();
            assert_eq!(intent.as_str(), name);
        }
    }

    #[test]
    fn test_unknown_intent_rejected() {
        assert!(Intent::parse_widget("buy_now").is_none());
        assert!(Intent::parse_widget("").is_none());
    }

    #[test]
    fn test_intent_serde_matches_widget_names() {
        let json = serde_json::to_string(&Intent::StylistContact).unwrap();
        assert_eq!(json, "\"stylist_contact\"");
    }
}
