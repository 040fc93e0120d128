//! Per-conversation session state
//!
//! Owned by the caller, passed into the engine by value and returned
//! updated. The engine never mutates a state in place and keeps no copy of
//! its own; the caller persists it between turns and discards it when the
//! widget closes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collaborators::ProductRef;
use crate::filters::Filters;
use crate::intent::{Intent, IntentContext};

/// Minimal conversational memory for one widget session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_intent: Option<Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_filters: Option<Filters>,
    /// Products surfaced in the most recent carousel
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shortlist: Vec<ProductRef>,
    /// One-way flag: once CSAT has been offered or recorded it is not
    /// offered again in the same session.
    #[serde(default)]
    pub has_shown_csat: bool,
    pub last_active: DateTime<Utc>,
}

impl SessionState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            last_intent: None,
            last_filters: None,
            shortlist: Vec::new(),
            has_shown_csat: false,
            last_active: Utc::now(),
        }
    }

    /// Copy with a fresh activity timestamp.
    pub fn touched(mut self) -> Self {
        self.last_active = Utc::now();
        self
    }

    /// Classifier context for the next turn.
    pub fn context(&self) -> IntentContext {
        IntentContext {
            last_intent: self.last_intent,
            last_filters: self.last_filters.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_blank() {
        let state = SessionState::new("s-1");
        assert_eq!(state.id, "s-1");
        assert!(state.last_intent.is_none());
        assert!(state.shortlist.is_empty());
        assert!(!state.has_shown_csat);
    }

    #[test]
    fn test_context_carries_filters() {
        let mut state = SessionState::new("s-2");
        state.last_intent = Some(Intent::FindProduct);
        state.last_filters = Some(Filters {
            category: Some("ring".to_string()),
            ..Default::default()
        });

        let context = state.context();
        assert_eq!(context.last_intent, Some(Intent::FindProduct));
        assert_eq!(
            context.last_filters.unwrap().category.as_deref(),
            Some("ring")
        );
    }
}
