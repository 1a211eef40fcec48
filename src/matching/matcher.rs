use serde_json::Value;

use crate::catalog::CatalogEntry;
use crate::matching::config::MatchingConfig;
use crate::matching::normalize::normalize_value;
use crate::matching::scoring::{score_entry, MatchScore, PreparedText};

/// Winning entry together with how it scored.
#[derive(Debug, Clone, Copy)]
pub struct MatchOutcome<'a> {
    pub entry: &'a CatalogEntry,
    pub score: MatchScore,
}

#[derive(Debug, Clone, Default)]
pub struct WineMatcher {
    config: MatchingConfig,
}

impl WineMatcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Best-scoring entry at or above the confidence threshold.
    ///
    /// Ties keep the entry that appears first in `entries`. An entry that
    /// scores zero never matches.
    pub fn find_match<'a>(&self, entries: &'a [CatalogEntry], text: &str) -> Option<MatchOutcome<'a>> {
        if text.is_empty() {
            return None;
        }

        let ranked = self.rank_candidates(entries, text);
        for outcome in &ranked {
            let fields = outcome.score.fields;
            log::debug!(
                "match score {} for '{}' (name={}, vintage={}, region={}, producer={})",
                outcome.score.total,
                outcome.entry.identifier,
                fields.name,
                fields.vintage,
                fields.region,
                fields.producer
            );
        }

        let Some(best) = ranked.first().copied() else {
            log::debug!("No catalog field found in {} chars of label text", text.len());
            return None;
        };

        if best.score.total >= self.config.min_score {
            log::info!(
                "Matched '{}' with score {}/{}",
                best.entry.identifier,
                best.score.total,
                self.config.max_score()
            );
            Some(best)
        } else {
            log::debug!(
                "Best candidate '{}' scored {} (< {}), no confident match",
                best.entry.identifier,
                best.score.total,
                self.config.min_score
            );
            None
        }
    }

    /// Same as [`find_match`](Self::find_match) for an untyped OCR payload.
    /// Non-string payloads are logged and yield no match.
    pub fn match_value<'a>(&self, entries: &'a [CatalogEntry], value: &Value) -> Option<MatchOutcome<'a>> {
        match normalize_value(value) {
            Ok(text) => self.find_match(entries, &text),
            Err(err) => {
                log::error!("Cannot match detected text: {err}");
                None
            }
        }
    }

    /// Every entry with a non-zero score, best first. Equal scores stay in
    /// catalog order.
    pub fn rank_candidates<'a>(&self, entries: &'a [CatalogEntry], text: &str) -> Vec<MatchOutcome<'a>> {
        let prepared = PreparedText::new(text);
        if prepared.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<MatchOutcome<'a>> = entries
            .iter()
            .map(|entry| MatchOutcome {
                entry,
                score: score_entry(entry, &prepared, &self.config),
            })
            .filter(|outcome| outcome.score.total > 0)
            .collect();
        ranked.sort_by(|a, b| b.score.total.cmp(&a.score.total));
        ranked
    }
}

/// Match with the default weights and threshold.
pub fn find_best_match<'a>(entries: &'a [CatalogEntry], text: &str) -> Option<&'a CatalogEntry> {
    WineMatcher::default()
        .find_match(entries, text)
        .map(|outcome| outcome.entry)
}
