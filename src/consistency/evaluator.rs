use crate::history::EnvironmentRecord;

use super::ranges::{IdealRange, IdealRanges, Parameter};
use super::types::{ConsistencyMap, ConsistencyReport};

/// Scores how steady each parameter has been against its ideal band.
#[derive(Debug, Clone, Default)]
pub struct ConsistencyEvaluator {
    ranges: IdealRanges,
}

impl ConsistencyEvaluator {
    pub fn new(ranges: IdealRanges) -> Self {
        Self { ranges }
    }

    pub fn ranges(&self) -> &IdealRanges {
        &self.ranges
    }

    /// One report per parameter that has at least one reading.
    ///
    /// `None` for an empty history, or when no parameter has any reading.
    pub fn evaluate(&self, history: &[EnvironmentRecord]) -> Option<ConsistencyMap> {
        if history.is_empty() {
            return None;
        }

        let reports: ConsistencyMap = Parameter::ALL
            .iter()
            .filter_map(|&parameter| {
                let readings: Vec<f64> = history
                    .iter()
                    .filter_map(|record| record.value(parameter))
                    .collect();
                evaluate_parameter(&readings, self.ranges.get(parameter))
                    .map(|report| (parameter, report))
            })
            .collect();

        if reports.is_empty() {
            log::debug!("history has {} records but no sensor values", history.len());
            None
        } else {
            Some(reports)
        }
    }
}

/// Evaluate with the default cellar ranges.
pub fn evaluate(history: &[EnvironmentRecord]) -> Option<ConsistencyMap> {
    ConsistencyEvaluator::default().evaluate(history)
}

fn evaluate_parameter(readings: &[f64], range: &IdealRange) -> Option<ConsistencyReport> {
    if readings.is_empty() {
        return None;
    }

    let count = readings.len() as f64;
    let sum = readings.iter().sum::<f64>();
    let mean = if sum.is_finite() {
        sum / count
    } else {
        // Readings near f64::MAX overflow the plain sum; scaled terms cannot.
        readings.iter().map(|v| v / count).sum::<f64>()
    };
    let variance = readings.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    let std_dev = variance.sqrt();

    let in_band = readings.iter().filter(|v| range.contains(**v)).count();

    Some(ConsistencyReport {
        stability_score: round1(stability_score(std_dev, range)),
        in_range: range.contains(mean),
        range_percentage: round1(100.0 * in_band as f64 / count),
        ideal_range: range.clone(),
        mean,
        std_dev,
        sample_count: readings.len(),
    })
}

/// `100 * (1 - std / width)` clamped to 0..=100. A degenerate band only
/// scores 100 with zero spread; a spread too large to represent scores 0.
fn stability_score(std_dev: f64, range: &IdealRange) -> f64 {
    if !std_dev.is_finite() {
        return 0.0;
    }
    let width = range.width();
    if width <= 0.0 {
        return if std_dev == 0.0 { 100.0 } else { 0.0 };
    }
    (100.0 * (1.0 - std_dev / width)).clamp(0.0, 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SensorSnapshot;
    use chrono::Utc;

    fn history(snapshots: &[SensorSnapshot]) -> Vec<EnvironmentRecord> {
        snapshots
            .iter()
            .map(|s| EnvironmentRecord::from_snapshot(s, Utc::now()))
            .collect()
    }

    fn temps(values: &[f64]) -> Vec<EnvironmentRecord> {
        let snapshots: Vec<SensorSnapshot> = values
            .iter()
            .map(|v| SensorSnapshot::new(Some(*v), None, None, None))
            .collect();
        history(&snapshots)
    }

    #[test]
    fn empty_history_has_no_report() {
        assert!(evaluate(&[]).is_none());
    }

    #[test]
    fn reference_temperature_series() {
        let reports = evaluate(&temps(&[10.0, 12.0, 14.0])).unwrap();
        let temperature = &reports[&Parameter::Temperature];

        assert!((temperature.mean - 12.0).abs() < 1e-9);
        assert!((temperature.std_dev - 1.633).abs() < 1e-3);
        assert_eq!(temperature.stability_score, 67.3);
        assert!(temperature.in_range);
        assert_eq!(temperature.range_percentage, 100.0);
        assert_eq!(temperature.sample_count, 3);
        assert_eq!(temperature.ideal_range, IdealRange::new(10.0, 15.0, "°C"));
    }

    #[test]
    fn parameters_without_readings_are_omitted() {
        let records = history(&[
            SensorSnapshot::new(Some(12.0), Some(65.0), Some(5.0), None),
            SensorSnapshot::new(Some(13.0), None, Some(7.0), None),
        ]);
        let reports = evaluate(&records).unwrap();

        assert!(!reports.contains_key(&Parameter::Co2));
        assert_eq!(reports[&Parameter::Humidity].sample_count, 1);
        assert_eq!(reports.len(), 3);
    }

    #[test]
    fn all_null_history_has_no_report() {
        let records = history(&[SensorSnapshot::default(), SensorSnapshot::default()]);
        assert!(evaluate(&records).is_none());
    }

    #[test]
    fn constant_readings_are_perfectly_stable() {
        let reports = evaluate(&temps(&[12.0, 12.0, 12.0, 12.0])).unwrap();
        assert_eq!(reports[&Parameter::Temperature].stability_score, 100.0);
    }

    #[test]
    fn wide_spread_clamps_to_zero() {
        let reports = evaluate(&temps(&[0.0, 30.0])).unwrap();
        let temperature = &reports[&Parameter::Temperature];
        assert_eq!(temperature.stability_score, 0.0);
        assert!(temperature.in_range);
        assert_eq!(temperature.range_percentage, 0.0);
    }

    #[test]
    fn band_edges_are_inclusive() {
        let reports = evaluate(&temps(&[10.0, 15.0, 16.0])).unwrap();
        let temperature = &reports[&Parameter::Temperature];
        assert_eq!(temperature.range_percentage, 66.7);
        assert!(temperature.in_range);
    }

    #[test]
    fn mean_outside_band_is_out_of_range() {
        let records = history(&[
            SensorSnapshot::new(None, None, None, Some(1200.0)),
            SensorSnapshot::new(None, None, None, Some(1300.0)),
        ]);
        let co2 = &evaluate(&records).unwrap()[&Parameter::Co2];
        assert!(!co2.in_range);
        assert_eq!(co2.range_percentage, 0.0);
        // std 50 over a 600 ppm band
        assert_eq!(co2.stability_score, 91.7);
    }

    #[test]
    fn custom_ranges_are_used() {
        let mut ranges = IdealRanges::default();
        ranges.temperature = IdealRange::new(12.0, 12.0, "°C");
        let evaluator = ConsistencyEvaluator::new(ranges);

        let steady = evaluator.evaluate(&temps(&[12.0, 12.0])).unwrap();
        assert_eq!(steady[&Parameter::Temperature].stability_score, 100.0);

        let drifting = evaluator.evaluate(&temps(&[12.0, 13.0])).unwrap();
        assert_eq!(drifting[&Parameter::Temperature].stability_score, 0.0);
    }

    #[test]
    fn extreme_readings_keep_scores_in_bounds() {
        let same = evaluate(&temps(&[f64::MAX, f64::MAX])).unwrap();
        let same = &same[&Parameter::Temperature];
        assert_eq!(same.mean, f64::MAX);
        assert_eq!(same.stability_score, 100.0);
        assert!(!same.in_range);

        let opposite = evaluate(&temps(&[f64::MAX, -f64::MAX])).unwrap();
        let opposite = &opposite[&Parameter::Temperature];
        assert_eq!(opposite.mean, 0.0);
        assert_eq!(opposite.stability_score, 0.0);
        assert_eq!(opposite.range_percentage, 0.0);

        let json = serde_json::to_value(&opposite).unwrap();
        assert_eq!(json["stability_score"], 0.0);
    }

    #[test]
    fn report_serializes_with_parameter_keys() {
        let reports = evaluate(&temps(&[11.0])).unwrap();
        let json = serde_json::to_value(&reports).unwrap();
        assert_eq!(json["temperature"]["stability_score"], 100.0);
        assert_eq!(json["temperature"]["ideal_range"]["unit"], "°C");
    }
}
