//! Environment reading data model.
//!
//! A `SensorSnapshot` is what the hardware collaborator hands us for one
//! request; an `EnvironmentRecord` is that snapshot stamped and stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consistency::Parameter;

/// One reading per parameter. Each sensor can fail on its own, so every
/// field is independently optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub lux: Option<f64>,
    pub co2: Option<f64>,
}

impl SensorSnapshot {
    pub fn new(
        temperature: Option<f64>,
        humidity: Option<f64>,
        lux: Option<f64>,
        co2: Option<f64>,
    ) -> Self {
        Self {
            temperature,
            humidity,
            lux,
            co2,
        }
    }

    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Temperature => self.temperature,
            Parameter::Humidity => self.humidity,
            Parameter::Lux => self.lux,
            Parameter::Co2 => self.co2,
        }
    }

    /// True when no sensor produced a usable value.
    pub fn is_empty(&self) -> bool {
        Parameter::ALL
            .iter()
            .all(|p| finite(self.value(*p)).is_none())
    }
}

/// A stamped snapshot, immutable once appended to a history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub lux: Option<f64>,
    #[serde(default)]
    pub co2: Option<f64>,
}

impl EnvironmentRecord {
    /// NaN and infinite readings are stored as missing.
    pub fn from_snapshot(snapshot: &SensorSnapshot, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            temperature: finite(snapshot.temperature),
            humidity: finite(snapshot.humidity),
            lux: finite(snapshot.lux),
            co2: finite(snapshot.co2),
        }
    }

    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Temperature => self.temperature,
            Parameter::Humidity => self.humidity,
            Parameter::Lux => self.lux,
            Parameter::Co2 => self.co2,
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
