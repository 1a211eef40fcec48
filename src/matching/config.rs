use serde::{Deserialize, Serialize};

/// Field weights and confidence threshold for label matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub name_weight: u32,
    /// Vintage is compared case-sensitively against the un-folded text.
    pub vintage_weight: u32,
    pub region_weight: u32,
    pub producer_weight: u32,

    /// Minimum total score for a confident match (a name hit alone clears it)
    pub min_score: u32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            name_weight: 3,
            vintage_weight: 2,
            region_weight: 2,
            producer_weight: 2,
            min_score: 3,
        }
    }
}

impl MatchingConfig {
    pub fn max_score(&self) -> u32 {
        self.name_weight + self.vintage_weight + self.region_weight + self.producer_weight
    }
}
