use std::fmt;

use serde::{Deserialize, Serialize};

/// Environmental parameters tracked per wine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Temperature,
    Humidity,
    Lux,
    Co2,
}

impl Parameter {
    pub const ALL: [Parameter; 4] = [
        Parameter::Temperature,
        Parameter::Humidity,
        Parameter::Lux,
        Parameter::Co2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::Temperature => "temperature",
            Parameter::Humidity => "humidity",
            Parameter::Lux => "lux",
            Parameter::Co2 => "co2",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acceptable storage band for one parameter, bounds inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdealRange {
    pub min: f64,
    pub max: f64,
    pub unit: String,
}

impl IdealRange {
    pub fn new(min: f64, max: f64, unit: impl Into<String>) -> Self {
        Self {
            min,
            max,
            unit: unit.into(),
        }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Ideal cellar conditions, one band per parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdealRanges {
    pub temperature: IdealRange,
    pub humidity: IdealRange,
    pub lux: IdealRange,
    pub co2: IdealRange,
}

impl Default for IdealRanges {
    fn default() -> Self {
        Self {
            temperature: IdealRange::new(10.0, 15.0, "°C"),
            humidity: IdealRange::new(60.0, 70.0, "%"),
            lux: IdealRange::new(0.0, 50.0, "lux"),
            co2: IdealRange::new(400.0, 1000.0, "ppm"),
        }
    }
}

impl IdealRanges {
    pub fn get(&self, parameter: Parameter) -> &IdealRange {
        match parameter {
            Parameter::Temperature => &self.temperature,
            Parameter::Humidity => &self.humidity,
            Parameter::Lux => &self.lux,
            Parameter::Co2 => &self.co2,
        }
    }
}
