pub mod config;
pub mod matcher;
pub mod normalize;
pub mod scoring;

pub use config::MatchingConfig;
pub use matcher::{find_best_match, MatchOutcome, WineMatcher};
pub use normalize::{normalize, normalize_value};
pub use scoring::{FieldMatches, MatchScore};
