use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ranges::{IdealRange, Parameter};

/// Stability of one parameter over a wine's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// 0–100, one decimal. 100 means no variance at all.
    pub stability_score: f64,
    /// Whether the mean sits inside the ideal band.
    pub in_range: bool,
    /// Share of readings inside the band, 0–100, one decimal.
    pub range_percentage: f64,
    pub ideal_range: IdealRange,
    pub mean: f64,
    pub std_dev: f64,
    pub sample_count: usize,
}

pub type ConsistencyMap = BTreeMap<Parameter, ConsistencyReport>;
