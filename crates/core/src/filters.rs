//! Product filter shapes and the filter normalizer
//!
//! The storefront has accumulated several filter dialects over time: the
//! widget sends canonical camelCase keys, older saved searches use
//! `materials`/`gemstones` arrays and a `priceBand` object. Everything is
//! folded into one canonical [`Filters`] shape before it reaches the
//! classifier or the executor. Normalization is pure, total and idempotent.

use serde::{Deserialize, Serialize};

/// Metal synonym table, longest phrase first so "rose gold" wins over "gold".
/// Canonical codes map to themselves, which keeps normalization idempotent.
pub const METAL_SYNONYMS: &[(&str, &str)] = &[
    ("sterling silver", "sterling-silver"),
    ("sterling-silver", "sterling-silver"),
    ("yellow gold", "yellow-gold"),
    ("yellow-gold", "yellow-gold"),
    ("white gold", "white-gold"),
    ("white-gold", "white-gold"),
    ("rose gold", "rose-gold"),
    ("rose-gold", "rose-gold"),
    ("pink gold", "rose-gold"),
    ("platinum", "platinum"),
    ("silver", "sterling-silver"),
    ("gold", "yellow-gold"),
];

/// Map a metal name through the synonym table. Exact (case-insensitive)
/// match only; substring scanning is the classifier's job.
pub fn canonical_metal(name: &str) -> Option<&'static str> {
    let name = name.trim().to_lowercase();
    METAL_SYNONYMS
        .iter()
        .find(|(syn, _)| *syn == name)
        .map(|(_, code)| *code)
}

/// Canonical product-search filters. Serialized camelCase per the widget
/// contract. Once normalized, no legacy key survives: synonyms are folded
/// into these fields and a `stone` value additionally contributes a
/// lowercase hyphenated tag.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Filters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metal: Option<String>,
    /// Preserved verbatim for display; the derived tag is the search key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carat_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carat_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_to_ship: Option<bool>,
    /// Set semantics: lowercase hyphenated, no duplicates
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.metal.is_none()
            && self.stone.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.carat_min.is_none()
            && self.carat_max.is_none()
            && self.ready_to_ship.is_none()
            && self.tags.is_empty()
    }
}

/// Legacy price band shape: `{ "priceBand": { "min": 500, "max": 2000 } }`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceBand {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Raw filter dictionary as it arrives from the widget or a saved search.
/// Accepts every dialect; [`normalize_filters`] produces the canonical shape.
/// Missing or partial input is fine, absent fields are simply omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFilters {
    pub category: Option<String>,
    pub metal: Option<String>,
    pub stone: Option<String>,
    /// Legacy: free-form material list, merged into `metal`/`tags`
    pub materials: Vec<String>,
    /// Legacy: gemstone list, first entry fills `stone` if absent
    pub gemstones: Vec<String>,
    /// Legacy: fills `priceMin`/`priceMax` gaps only, never overrides
    pub price_band: Option<PriceBand>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub carat_min: Option<f64>,
    pub carat_max: Option<f64>,
    pub ready_to_ship: Option<bool>,
    pub tags: Vec<String>,
}

impl From<Filters> for RawFilters {
    fn from(f: Filters) -> Self {
        Self {
            category: f.category,
            metal: f.metal,
            stone: f.stone,
            price_min: f.price_min,
            price_max: f.price_max,
            carat_min: f.carat_min,
            carat_max: f.carat_max,
            ready_to_ship: f.ready_to_ship,
            tags: f.tags,
            ..Default::default()
        }
    }
}

/// Lowercase, whitespace collapsed to single hyphens.
fn slug(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

fn push_tag(tags: &mut Vec<String>, tag: String) {
    if !tag.is_empty() && !tags.iter().any(|t| *t == tag) {
        tags.push(tag);
    }
}

/// Canonicalize a raw filter dictionary.
///
/// Rules, in order:
/// - canonical keys are copied as-is (lowercased where they are names)
/// - `materials` fills a missing `metal` via the synonym table; remaining
///   entries become tags
/// - `stone` stays verbatim and contributes a slug tag; `gemstones` fills a
///   missing `stone`, remaining entries become tags
/// - `priceBand` fills `priceMin`/`priceMax` gaps only
/// - tags are slugged and deduplicated, insertion order preserved
pub fn normalize_filters(raw: RawFilters) -> Filters {
    let mut out = Filters {
        category: raw.category.map(|c| c.trim().to_lowercase()),
        metal: raw
            .metal
            .map(|m| canonical_metal(&m).map(str::to_string).unwrap_or_else(|| slug(&m))),
        price_min: raw.price_min,
        price_max: raw.price_max,
        carat_min: raw.carat_min,
        carat_max: raw.carat_max,
        ready_to_ship: raw.ready_to_ship,
        ..Filters::default()
    };

    for tag in &raw.tags {
        push_tag(&mut out.tags, slug(tag));
    }

    for material in &raw.materials {
        match canonical_metal(material) {
            Some(code) if out.metal.is_none() => out.metal = Some(code.to_string()),
            Some(code) => push_tag(&mut out.tags, code.to_string()),
            None => push_tag(&mut out.tags, slug(material)),
        }
    }

    let mut stone = raw.stone;
    for gemstone in &raw.gemstones {
        if stone.is_none() {
            stone = Some(gemstone.clone());
        } else {
            push_tag(&mut out.tags, slug(gemstone));
        }
    }
    if let Some(stone) = stone {
        push_tag(&mut out.tags, slug(&stone));
        out.stone = Some(stone);
    }

    if let Some(band) = raw.price_band {
        out.price_min = out.price_min.or(band.min);
        out.price_max = out.price_max.or(band.max);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stone_contributes_deduplicated_tag() {
        let filters = normalize_filters(RawFilters {
            stone: Some("Pearl".to_string()),
            tags: vec!["pearl".to_string()],
            ..Default::default()
        });

        assert_eq!(filters.stone.as_deref(), Some("Pearl"));
        assert_eq!(filters.tags, vec!["pearl"]);
    }

    #[test]
    fn test_multiword_stone_slug() {
        let filters = normalize_filters(RawFilters {
            stone: Some("Black Opal".to_string()),
            ..Default::default()
        });

        assert_eq!(filters.stone.as_deref(), Some("Black Opal"));
        assert_eq!(filters.tags, vec!["black-opal"]);
    }

    #[test]
    fn test_price_band_fills_gaps_only() {
        let filters = normalize_filters(RawFilters {
            price_max: Some(2000.0),
            price_band: Some(PriceBand {
                min: Some(500.0),
                max: Some(9999.0),
            }),
            ..Default::default()
        });

        // Explicit priceMax wins, legacy band only fills the missing min.
        assert_eq!(filters.price_min, Some(500.0));
        assert_eq!(filters.price_max, Some(2000.0));
    }

    #[test]
    fn test_materials_fill_metal_gap() {
        let filters = normalize_filters(RawFilters {
            materials: vec!["Rose Gold".to_string(), "Platinum".to_string()],
            ..Default::default()
        });

        assert_eq!(filters.metal.as_deref(), Some("rose-gold"));
        assert_eq!(filters.tags, vec!["platinum"]);
    }

    #[test]
    fn test_explicit_metal_not_overridden() {
        let filters = normalize_filters(RawFilters {
            metal: Some("white gold".to_string()),
            materials: vec!["silver".to_string()],
            ..Default::default()
        });

        assert_eq!(filters.metal.as_deref(), Some("white-gold"));
        assert_eq!(filters.tags, vec!["sterling-silver"]);
    }

    #[test]
    fn test_gemstones_fill_stone_gap() {
        let filters = normalize_filters(RawFilters {
            gemstones: vec!["Sapphire".to_string(), "Emerald".to_string()],
            ..Default::default()
        });

        assert_eq!(filters.stone.as_deref(), Some("Sapphire"));
        assert_eq!(filters.tags, vec!["emerald", "sapphire"]);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let raw = RawFilters {
            category: Some("Rings".to_string()),
            stone: Some("Pearl".to_string()),
            materials: vec!["rose gold".to_string(), "enamel".to_string()],
            price_band: Some(PriceBand {
                min: Some(100.0),
                max: Some(5000.0),
            }),
            tags: vec!["Ready To Ship".to_string()],
            ..Default::default()
        };

        let once = normalize_filters(raw);
        let twice = normalize_filters(RawFilters::from(once.clone()));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input_stays_empty() {
        let filters = normalize_filters(RawFilters::default());
        assert!(filters.is_empty());
    }

    #[test]
    fn test_unknown_metal_kept_as_slug() {
        let filters = normalize_filters(RawFilters {
            metal: Some("Mixed Metals".to_string()),
            ..Default::default()
        });
        assert_eq!(filters.metal.as_deref(), Some("mixed-metals"));
    }

    #[test]
    fn test_canonical_metal_table() {
        assert_eq!(canonical_metal("Rose Gold"), Some("rose-gold"));
        assert_eq!(canonical_metal("gold"), Some("yellow-gold"));
        assert_eq!(canonical_metal("rose-gold"), Some("rose-gold"));
        assert_eq!(canonical_metal("titanium"), None);
    }
}
