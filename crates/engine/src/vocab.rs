//! Static vocabulary and pattern tables for the classifier
//!
//! Compiled once at first use and shared. Keyword matching is deliberately
//! lightweight substring/word matching, not NLU; the tables are the whole
//! model.

use once_cell::sync::Lazy;
use regex::Regex;

use concierge_core::Intent;

/// Leading-token commands. Exact first-token match, near-certain confidence.
pub const SLASH_COMMANDS: &[(&str, Intent)] = &[
    ("/stylist", Intent::StylistContact),
    ("/track", Intent::TrackOrder),
    ("/returns", Intent::ReturnExchange),
    ("/find", Intent::FindProduct),
];

/// Order reference shape: GG prefix + at least five digits, hyphen optional.
pub static ORDER_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bGG-?\d{5,}\b").unwrap());

pub static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

/// Standalone 5-digit token (US zip shape, optional +4).
pub static POSTAL_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{5}(?:-\d{4})?\b").unwrap());

/// "under $2,000", "below 500 dollars", "up to $350". The amount must be
/// currency-marked so "under 2 carats" never reads as a price.
pub static PRICE_CEILING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:under|below|less than|at most|up to|within)\s+(?:\$\s?(\d[\d,]*(?:\.\d+)?)|(\d[\d,]*(?:\.\d+)?)\s*(?:dollars|usd))",
    )
    .unwrap()
});

/// "over $1,000", "at least 800 dollars", "from $800"
pub static PRICE_FLOOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:over|above|more than|at least|starting at|from)\s+(?:\$\s?(\d[\d,]*(?:\.\d+)?)|(\d[\d,]*(?:\.\d+)?)\s*(?:dollars|usd))",
    )
    .unwrap()
});

/// "2 carat", "1.5ct" - a minimum unless preceded by an under-style qualifier
pub static CARAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:carats?|ct\b)").unwrap());

pub static CARAT_CEILING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:under|below|less than|at most)\s+(\d+(?:\.\d+)?)\s*(?:carats?|ct\b)")
        .unwrap()
});

/// Order-tracking vocabulary.
pub const TRACK_PHRASES: &[&str] = &[
    "where is my order",
    "where's my order",
    "order status",
    "delivery update",
    "shipping update",
    "track",
    "tracking",
    "delivery",
    "shipped",
];

pub const RETURN_PHRASES: &[&str] = &[
    "return",
    "exchange",
    "refund",
    "send it back",
    "send back",
];

pub const SIZING_PHRASES: &[&str] = &[
    "resize",
    "resizing",
    "ring size",
    "sizing",
    "too small",
    "too big",
    "repair",
    "fix my",
    "broken",
];

pub const CARE_PHRASES: &[&str] = &[
    "warranty",
    "care instructions",
    "how do i clean",
    "clean",
    "polish",
    "tarnish",
    "tarnished",
    "maintenance",
];

pub const FINANCING_PHRASES: &[&str] = &[
    "financing",
    "finance",
    "payment plan",
    "installment",
    "installments",
    "pay over time",
    "monthly payments",
    "layaway",
    "klarna",
    "affirm",
];

/// Human-escalation vocabulary.
pub const STYLIST_PHRASES: &[&str] = &[
    "customer service",
    "customer support",
    "speak to a person",
    "talk to someone",
    "real person",
    "human",
    "agent",
    "representative",
    "stylist",
    "concierge team",
];

/// Product-discovery vocabulary (nouns live in `CATEGORY_TERMS`).
pub const PRODUCT_PHRASES: &[&str] = &[
    "looking for",
    "show me",
    "shopping for",
    "browse",
    "recommend",
    "recommendation",
    "suggest",
    "in stock",
    "ready to ship",
    "buy",
];

/// Gift phrasing; combined with a budget it implies product discovery even
/// without product nouns.
pub const GIFT_PHRASES: &[&str] = &[
    "gift",
    "present",
    "anniversary",
    "birthday",
    "for my wife",
    "for my husband",
    "for my partner",
];

/// Short continuation phrases that refer back to the previous turn.
/// Closed set: anything longer is treated as a fresh utterance.
pub const CONTINUATION_PHRASES: &[&str] = &[
    "more",
    "show me more",
    "show more",
    "more options",
    "more like that",
    "more like this",
    "anything else",
    "what else",
    "see more",
    "next",
];

/// Category noun table: surface form to canonical category.
/// Longer phrases first so "engagement ring" resolves before "ring".
pub const CATEGORY_TERMS: &[(&str, &str)] = &[
    ("engagement rings", "ring"),
    ("engagement ring", "ring"),
    ("wedding bands", "ring"),
    ("wedding band", "ring"),
    ("necklaces", "necklace"),
    ("necklace", "necklace"),
    ("pendants", "pendant"),
    ("pendant", "pendant"),
    ("bracelets", "bracelet"),
    ("bracelet", "bracelet"),
    ("bangles", "bracelet"),
    ("bangle", "bracelet"),
    ("earrings", "earrings"),
    ("earring", "earrings"),
    ("studs", "earrings"),
    ("rings", "ring"),
    ("ring", "ring"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_shapes() {
        assert!(ORDER_NUMBER.is_match("GG-123456"));
        assert!(ORDER_NUMBER.is_match("gg123456"));
        assert!(ORDER_NUMBER.is_match("my order GG-987654 please"));
        assert!(!ORDER_NUMBER.is_match("GG-1234")); // too short
        assert!(!ORDER_NUMBER.is_match("AGG-123456"));
    }

    #[test]
    fn test_price_patterns() {
        let caps = PRICE_CEILING.captures("something under $2,500 please").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "2,500");

        let caps = PRICE_FLOOR.captures("at least 800 dollars").unwrap();
        assert_eq!(caps.get(2).unwrap().as_str(), "800");

        // Bare numbers without currency markers are not prices.
        assert!(!PRICE_CEILING.is_match("under 2 carats"));
    }

    #[test]
    fn test_carat_patterns() {
        let caps = CARAT.captures("around 1.5 carat solitaire").unwrap();
        assert_eq!(&caps[1], "1.5");
        assert!(CARAT_CEILING.is_match("under 2 carats"));
    }

    #[test]
    fn test_category_longest_first() {
        // Table order guarantees "engagement ring" resolves before "ring".
        let first = CATEGORY_TERMS
            .iter()
            .find(|(term, _)| "an engagement ring under $5000".contains(term))
            .unwrap();
        assert_eq!(first.1, "ring");
        assert_eq!(first.0, "engagement ring");
    }
}
