use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::catalog::{Catalog, CatalogEntry, StoryLibrary};
use crate::consistency::{ConsistencyEvaluator, ConsistencyMap};
use crate::error::WineError;
use crate::history::{EnvironmentHistoryStore, SensorSnapshot};
use crate::matching::{MatchOutcome, WineMatcher};

/// Combined answer for one scanned label.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub matched_entry: Option<CatalogEntry>,
    pub story: Option<String>,
    pub consistency: Option<ConsistencyMap>,
}

impl AnalysisResponse {
    pub fn is_match(&self) -> bool {
        self.matched_entry.is_some()
    }
}

/// Matching, history and consistency wired together for request handlers.
pub struct WineAnalyzer {
    catalog: Arc<Catalog>,
    matcher: WineMatcher,
    stories: StoryLibrary,
    store: EnvironmentHistoryStore,
    evaluator: ConsistencyEvaluator,
}

impl WineAnalyzer {
    pub fn new(
        catalog: Arc<Catalog>,
        matcher: WineMatcher,
        stories: StoryLibrary,
        store: EnvironmentHistoryStore,
        evaluator: ConsistencyEvaluator,
    ) -> Self {
        Self {
            catalog,
            matcher,
            stories,
            store,
            evaluator,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &EnvironmentHistoryStore {
        &self.store
    }

    /// Match the detected text, record the snapshot against the matched wine
    /// and evaluate its history.
    pub fn handle_analysis(
        &self,
        raw_detected_text: Option<&str>,
        snapshot: Option<SensorSnapshot>,
    ) -> AnalysisResponse {
        let Some(text) = raw_detected_text.filter(|t| !t.is_empty()) else {
            log::info!("No text detected; nothing to match");
            return AnalysisResponse::default();
        };

        match self.matcher.find_match(self.catalog.entries(), text) {
            Some(outcome) => self.respond(outcome, snapshot),
            None => {
                log::info!("No matching wine found");
                AnalysisResponse::default()
            }
        }
    }

    /// Like [`handle_analysis`](Self::handle_analysis) for an untyped OCR
    /// payload; anything but a string is treated as no match.
    pub fn handle_detected_value(
        &self,
        detected: &Value,
        snapshot: Option<SensorSnapshot>,
    ) -> AnalysisResponse {
        match self.matcher.match_value(self.catalog.entries(), detected) {
            Some(outcome) => self.respond(outcome, snapshot),
            None => AnalysisResponse::default(),
        }
    }

    fn respond(&self, outcome: MatchOutcome<'_>, snapshot: Option<SensorSnapshot>) -> AnalysisResponse {
        let entry = outcome.entry;
        let id = entry.identifier.as_str();

        match snapshot {
            Some(snapshot) if !snapshot.is_empty() => self.store.append(id, &snapshot),
            Some(_) => log::debug!(
                "{}",
                WineError::MissingData(format!("all sensor readings empty for {id}; not recorded"))
            ),
            None => log::debug!("No sensor snapshot supplied for {id}"),
        }

        let history = self.store.load(id);
        let consistency = self.evaluator.evaluate(&history);
        if consistency.is_none() {
            log::debug!(
                "{}",
                WineError::MissingData(format!("no environment history to evaluate for {id}"))
            );
        }

        AnalysisResponse {
            matched_entry: Some(entry.clone()),
            story: self.stories.story_for(entry),
            consistency,
        }
    }
}
