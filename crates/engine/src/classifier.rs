//! Rule-based intent classification
//!
//! `decide_intent` walks a fixed priority ladder; the first rule that
//! matches wins, and the ordering is load-bearing. Confidence values are
//! policy constants so downstream code can distinguish a strong match from
//! a weak inference; they are not probabilities. The function is pure:
//! identical `(text, context)` input always produces identical output.

use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

use concierge_core::{
    filters::METAL_SYNONYMS, ClassificationResult, Filters, Intent, IntentContext,
};

use crate::vocab;

const CONF_SLASH: f32 = 0.95;
const CONF_ORDER_NUMBER: f32 = 0.97;
const CONF_ORDER_CREDENTIALS: f32 = 0.9;
const CONF_TRACK_KEYWORDS: f32 = 0.85;
const CONF_ESCALATION_KEYWORDS: f32 = 0.85;
const CONF_FAMILY_KEYWORDS: f32 = 0.8;
const CONF_PRODUCT_WITH_FILTERS: f32 = 0.75;
const CONF_PRODUCT_KEYWORDS: f32 = 0.7;
const CONF_GIFT_BUDGET: f32 = 0.65;
const CONF_CARRY_OVER: f32 = 0.5;
const CONF_CLARIFY: f32 = 0.2;

/// Classify a free-text utterance into an intent.
///
/// Priority order:
/// 1. slash commands
/// 2. order-number token
/// 3. email + postal-code credential pair
/// 4. keyword families (tracking, returns, sizing, care, financing, stylist)
/// 5. continuation phrases resolved against `context`
/// 6. product discovery with filter extraction
/// 7. fallback to `clarify`
///
/// Continuation sits ahead of product discovery so "show me more" reuses the
/// previous filters, while an utterance with its own filter language ("show
/// me necklaces") extracts fresh ones and ignores the context.
pub fn decide_intent(text: &str, context: Option<&IntentContext>) -> ClassificationResult {
    let lower = text.trim().to_lowercase();
    let words: HashSet<&str> = lower.unicode_words().collect();

    // 1. Slash commands bypass all text heuristics.
    if let Some(first) = lower.split_whitespace().next() {
        if let Some((_, intent)) = vocab::SLASH_COMMANDS.iter().find(|(cmd, _)| *cmd == first) {
            return ClassificationResult::new(*intent, CONF_SLASH, "slash_command");
        }
    }

    // 2. A bare order reference is a tracking ask regardless of phrasing.
    if vocab::ORDER_NUMBER.is_match(&lower) {
        return ClassificationResult::new(
            Intent::TrackOrder,
            CONF_ORDER_NUMBER,
            "order_number_detected",
        );
    }

    // 3. Email + postal code is the alternate lookup credential pair.
    if let Some(email) = vocab::EMAIL.find(&lower) {
        let without_email = format!("{}{}", &lower[..email.start()], &lower[email.end()..]);
        if vocab::POSTAL_CODE.is_match(&without_email) {
            return ClassificationResult::new(
                Intent::TrackOrder,
                CONF_ORDER_CREDENTIALS,
                "order_credentials_detected",
            );
        }
    }

    // 4. Keyword families, tracking first.
    if matches_family(&lower, &words, vocab::TRACK_PHRASES) {
        return ClassificationResult::new(Intent::TrackOrder, CONF_TRACK_KEYWORDS, "order_keywords");
    }
    if matches_family(&lower, &words, vocab::RETURN_PHRASES) {
        return ClassificationResult::new(
            Intent::ReturnExchange,
            CONF_FAMILY_KEYWORDS,
            "return_keywords",
        );
    }
    if matches_family(&lower, &words, vocab::SIZING_PHRASES) {
        return ClassificationResult::new(
            Intent::SizingRepairs,
            CONF_FAMILY_KEYWORDS,
            "sizing_keywords",
        );
    }
    if matches_family(&lower, &words, vocab::CARE_PHRASES) {
        return ClassificationResult::new(
            Intent::CareWarranty,
            CONF_FAMILY_KEYWORDS,
            "care_keywords",
        );
    }
    if matches_family(&lower, &words, vocab::FINANCING_PHRASES) {
        return ClassificationResult::new(
            Intent::Financing,
            CONF_FAMILY_KEYWORDS,
            "financing_keywords",
        );
    }
    if matches_family(&lower, &words, vocab::STYLIST_PHRASES) {
        return ClassificationResult::new(
            Intent::StylistContact,
            CONF_ESCALATION_KEYWORDS,
            "escalation_keywords",
        );
    }

    let filters = extract_filters(&lower, &words);

    // 5. Continuation phrases re-emit the previous product search.
    // Explicit filter language in the new utterance always overrides.
    if filters.is_empty() && is_continuation(&lower) {
        if let Some(ctx) = context {
            if ctx.last_intent == Some(Intent::FindProduct) {
                let mut result = ClassificationResult::new(
                    Intent::FindProduct,
                    CONF_CARRY_OVER,
                    "context_carry_over",
                );
                result.filters = ctx.last_filters.clone();
                return result;
            }
        }
    }

    // 6. Product discovery: vocabulary, structured ask, or gift + budget.
    let has_vocab = matches_family(&lower, &words, vocab::PRODUCT_PHRASES);
    let has_structured_ask = filters.category.is_some()
        || filters.metal.is_some()
        || filters.carat_min.is_some()
        || filters.carat_max.is_some();
    let has_budget = filters.price_min.is_some() || filters.price_max.is_some();
    let is_gift = matches_family(&lower, &words, vocab::GIFT_PHRASES);

    if has_vocab || has_structured_ask || (is_gift && has_budget) {
        let (confidence, reason) = if filters.is_empty() {
            (CONF_PRODUCT_KEYWORDS, "product_keywords")
        } else if !has_vocab && !has_structured_ask {
            (CONF_GIFT_BUDGET, "gift_budget_heuristic")
        } else {
            (CONF_PRODUCT_WITH_FILTERS, "product_filters_extracted")
        };
        let mut result = ClassificationResult::new(Intent::FindProduct, confidence, reason);
        if !filters.is_empty() {
            result.filters = Some(filters);
        }
        return result;
    }

    // 7. Nothing matched.
    ClassificationResult::new(Intent::Clarify, CONF_CLARIFY, "no_rule_matched")
}

/// Multi-word phrases match as substrings, single words as whole tokens
/// (so "agent" never fires inside "magenta").
fn matches_family(text: &str, words: &HashSet<&str>, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| {
        if phrase.contains(' ') {
            text.contains(phrase)
        } else {
            words.contains(phrase)
        }
    })
}

fn is_continuation(text: &str) -> bool {
    let trimmed = text.trim_end_matches(['.', '!', '?', ' ']);
    vocab::CONTINUATION_PHRASES.contains(&trimmed)
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok()
}

/// Pull structured product constraints out of the utterance.
fn extract_filters(text: &str, words: &HashSet<&str>) -> Filters {
    let mut filters = Filters::default();

    for (term, category) in vocab::CATEGORY_TERMS {
        let matched = if term.contains(' ') {
            text.contains(term)
        } else {
            words.contains(term)
        };
        if matched {
            filters.category = Some((*category).to_string());
            break;
        }
    }

    for (synonym, code) in METAL_SYNONYMS {
        let matched = if synonym.contains(' ') {
            text.contains(synonym)
        } else {
            words.contains(synonym)
        };
        if matched {
            filters.metal = Some((*code).to_string());
            break;
        }
    }

    if let Some(caps) = vocab::PRICE_CEILING.captures(text) {
        filters.price_max = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| parse_amount(m.as_str()));
    }
    if let Some(caps) = vocab::PRICE_FLOOR.captures(text) {
        filters.price_min = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| parse_amount(m.as_str()));
    }

    if let Some(caps) = vocab::CARAT_CEILING.captures(text) {
        filters.carat_max = caps[1].parse::<f64>().ok();
    } else if let Some(caps) = vocab::CARAT.captures(text) {
        filters.carat_min = caps[1].parse::<f64>().ok();
    }

    if words.contains("ready") && text.contains("ready to ship") {
        filters.ready_to_ship = Some(true);
    }

    filters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_context(category: &str) -> IntentContext {
        IntentContext {
            last_intent: Some(Intent::FindProduct),
            last_filters: Some(Filters {
                category: Some(category.to_string()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_deterministic() {
        let a = decide_intent("where is my order?", None);
        let b = decide_intent("where is my order?", None);
        assert_eq!(a.intent, b.intent);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.reason, b.reason);
    }

    #[test]
    fn test_slash_command_beats_product_vocabulary() {
        let result = decide_intent("/stylist buy me a ring", None);
        assert_eq!(result.intent, Intent::StylistContact);
        assert_eq!(result.reason, "slash_command");
        assert!(result.confidence >= 0.95);
    }

    #[test]
    fn test_bare_order_number() {
        let result = decide_intent("GG-123456", None);
        assert_eq!(result.intent, Intent::TrackOrder);
        assert_eq!(result.reason, "order_number_detected");
    }

    #[test]
    fn test_order_number_beats_surrounding_words() {
        let result = decide_intent("I want to return GG-123456 maybe", None);
        assert_eq!(result.intent, Intent::TrackOrder);
        assert_eq!(result.reason, "order_number_detected");
    }

    #[test]
    fn test_email_and_postal_pair() {
        let result = decide_intent("my email is client@example.com and zip 10001", None);
        assert_eq!(result.intent, Intent::TrackOrder);
        assert_eq!(result.reason, "order_credentials_detected");
    }

    #[test]
    fn test_email_alone_is_not_a_lookup() {
        let result = decide_intent("reach me at client@example.com", None);
        assert_ne!(result.reason, "order_credentials_detected");
    }

    #[test]
    fn test_tracking_vocabulary() {
        let result = decide_intent("can I get a delivery update please", None);
        assert_eq!(result.intent, Intent::TrackOrder);
        assert!(result.confidence > 0.8);
    }

    #[test]
    fn test_keyword_families() {
        assert_eq!(
            decide_intent("I'd like to exchange this", None).intent,
            Intent::ReturnExchange
        );
        assert_eq!(
            decide_intent("my ring is too small, can you resize it", None).intent,
            Intent::SizingRepairs
        );
        assert_eq!(
            decide_intent("how do I clean my necklace", None).intent,
            Intent::CareWarranty
        );
        assert_eq!(
            decide_intent("do you offer a payment plan", None).intent,
            Intent::Financing
        );
        assert_eq!(
            decide_intent("let me talk to a representative", None).intent,
            Intent::StylistContact
        );
    }

    #[test]
    fn test_single_word_keywords_respect_boundaries() {
        // "agent" must not fire inside "magenta"
        let result = decide_intent("do you have magenta stones", None);
        assert_ne!(result.intent, Intent::StylistContact);
    }

    #[test]
    fn test_product_with_extracted_filters() {
        let result = decide_intent("show me rose gold rings under $2,000", None);
        assert_eq!(result.intent, Intent::FindProduct);
        let filters = result.filters.unwrap();
        assert_eq!(filters.category.as_deref(), Some("ring"));
        assert_eq!(filters.metal.as_deref(), Some("rose-gold"));
        assert_eq!(filters.price_max, Some(2000.0));
    }

    #[test]
    fn test_structured_ask_without_verbs() {
        let result = decide_intent("platinum necklaces over $1000", None);
        assert_eq!(result.intent, Intent::FindProduct);
        let filters = result.filters.unwrap();
        assert_eq!(filters.metal.as_deref(), Some("platinum"));
        assert_eq!(filters.category.as_deref(), Some("necklace"));
        assert_eq!(filters.price_min, Some(1000.0));
    }

    #[test]
    fn test_carat_extraction() {
        let filters = decide_intent("looking for a 1.5 carat solitaire", None)
            .filters
            .unwrap();
        assert_eq!(filters.carat_min, Some(1.5));

        let filters = decide_intent("show me stones under 2 carats", None)
            .filters
            .unwrap();
        assert_eq!(filters.carat_max, Some(2.0));
        assert!(filters.carat_min.is_none());
    }

    #[test]
    fn test_gift_budget_heuristic() {
        let result = decide_intent("I need a gift under $300", None);
        assert_eq!(result.intent, Intent::FindProduct);
        assert!(result.confidence > 0.6);
        assert_eq!(result.filters.unwrap().price_max, Some(300.0));
    }

    #[test]
    fn test_context_carry_over() {
        let context = product_context("ring");
        let result = decide_intent("show me more", Some(&context));
        assert_eq!(result.intent, Intent::FindProduct);
        assert_eq!(result.reason, "context_carry_over");
        assert!(result.confidence > 0.4);
        assert!(result.confidence < 0.7);
        assert_eq!(result.filters.unwrap().category.as_deref(), Some("ring"));
    }

    #[test]
    fn test_explicit_filters_override_context() {
        let context = product_context("ring");
        let result = decide_intent("show me necklaces", Some(&context));
        assert_eq!(result.intent, Intent::FindProduct);
        assert_ne!(result.reason, "context_carry_over");
        assert_eq!(
            result.filters.unwrap().category.as_deref(),
            Some("necklace")
        );
    }

    #[test]
    fn test_continuation_without_context_is_not_carry_over() {
        let result = decide_intent("show me more", None);
        assert_ne!(result.reason, "context_carry_over");
    }

    #[test]
    fn test_continuation_after_non_product_turn() {
        let context = IntentContext {
            last_intent: Some(Intent::TrackOrder),
            last_filters: None,
        };
        let result = decide_intent("more", Some(&context));
        assert_ne!(result.reason, "context_carry_over");
    }

    #[test]
    fn test_fallback_clarifies() {
        let result = decide_intent("hmm interesting weather today", None);
        assert_eq!(result.intent, Intent::Clarify);
        assert_eq!(result.reason, "no_rule_matched");
        assert!(result.confidence < 0.5);
    }
}
