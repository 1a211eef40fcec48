use serde::Serialize;

use crate::catalog::CatalogEntry;
use crate::matching::config::MatchingConfig;
use crate::matching::normalize::normalize;

/// Which catalog fields were found in the label text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldMatches {
    pub name: bool,
    pub vintage: bool,
    pub region: bool,
    pub producer: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchScore {
    pub total: u32,
    pub fields: FieldMatches,
}

/// Label text prepared once per request and shared across all entries.
pub struct PreparedText {
    normalized: String,
    folded: String,
}

impl PreparedText {
    pub fn new(raw: &str) -> Self {
        let normalized = normalize(raw);
        let folded = normalized.to_lowercase();
        Self { normalized, folded }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// Sum of independent field contributions for one entry.
pub fn score_entry(entry: &CatalogEntry, text: &PreparedText, config: &MatchingConfig) -> MatchScore {
    let fields = FieldMatches {
        name: contains_folded(&text.folded, &entry.name),
        vintage: contains_literal(&text.normalized, &entry.vintage),
        region: contains_folded(&text.folded, &entry.region),
        producer: contains_folded(&text.folded, &entry.producer),
    };

    let mut total = 0;
    if fields.name {
        total += config.name_weight;
    }
    if fields.vintage {
        total += config.vintage_weight;
    }
    if fields.region {
        total += config.region_weight;
    }
    if fields.producer {
        total += config.producer_weight;
    }

    MatchScore { total, fields }
}

// Catalog fields go through the same normalizer as the label text so that
// "Bordeaux, France" lines up with "Bordeaux France". Empty fields never match.
fn contains_folded(folded_text: &str, field: &str) -> bool {
    let needle = normalize(field).to_lowercase();
    !needle.is_empty() && folded_text.contains(&needle)
}

fn contains_literal(text: &str, field: &str) -> bool {
    let needle = normalize(field);
    !needle.is_empty() && text.contains(&needle)
}
