//! Static concierge copy
//!
//! The informational intents answer from fixed guidance text; everything
//! here is displayed verbatim by the widget.

use concierge_core::Intent;

/// Guidance copy for the stateless informational intents.
/// Returns `None` for intents that require a handler.
pub fn guidance(intent: Intent) -> Option<&'static str> {
    match intent {
        Intent::CareWarranty => Some(
            "Every piece ships with a lifetime craftsmanship warranty. For day-to-day care, \
             store pieces separately in the pouch provided, keep them away from perfume and \
             chlorine, and polish gently with the enclosed cloth. Complimentary professional \
             cleaning is available at any of our ateliers, or by mail twice a year.",
        ),
        Intent::Financing => Some(
            "We offer interest-free installments over 3, 6 or 12 months at checkout, with \
             extended terms available on bespoke commissions. There is no application fee and \
             paying early never incurs a charge.",
        ),
        Intent::SizingRepairs => Some(
            "Complimentary resizing is included within 60 days of delivery, and our ateliers \
             handle repairs for the lifetime of the piece. Start from your order page or share \
             your order number here and I will arrange a prepaid shipping kit.",
        ),
        _ => None,
    }
}

pub const GREETING_PROMPT: &str =
    "Welcome to Maison Lumine. I can help you browse pieces, check on an order, or arrange \
     anything with our ateliers.";

pub const FILTER_PROMPT: &str =
    "With pleasure. Tell me a little about what you have in mind and I will pull a selection.";

pub const ORDER_LOOKUP_PROMPT: &str =
    "Of course. I can look that up with your order number, or the email and postal code used at \
     checkout.";

pub const RETURN_OPTIONS_PROMPT: &str =
    "I can help with that. How would you like to proceed with your piece?";

pub const ESCALATION_PROMPT: &str =
    "I will connect you with one of our stylists right away.";

pub const CLARIFY_PROMPT: &str =
    "I want to make sure I point you the right way — are you browsing for a piece, checking on \
     an order, or something else?";

pub const APOLOGY_PROMPT: &str =
    "I'm sorry — I couldn't reach that service just now. Would you like me to connect you with \
     a stylist instead?";

pub const ORDER_MISS_PROMPT: &str =
    "I wasn't able to locate an order matching those details. Please double-check them, or a \
     stylist can help directly.";

pub const CAROUSEL_PROMPT: &str = "Here is a selection, all ready to ship.";

pub const CAROUSEL_EMPTY_PROMPT: &str =
    "Nothing ready to ship matches that exact combination. Loosen a filter or two and I will \
     look again.";

pub const CSAT_PROMPT: &str = "Before you go — how was your experience with the concierge today?";

pub const CSAT_THANKS: &str = "Thank you — your feedback goes straight to the atelier team.";

pub const CSAT_FOLLOW_UP: &str =
    "I'm sorry we fell short. Let me put you in touch with a stylist who can make it right.";
