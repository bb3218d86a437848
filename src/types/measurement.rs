//! Measurement types understood by the Netatmo API and the raw `getmeasure`
//! payload, together with the flattening into timestamped readings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A quantity a Netatmo module can report.
///
/// The string form is the lower-case name used by the API, both in the `type`
/// parameter of `getmeasure` and in the `type` list of public station measures.
///
/// # Examples
///
/// ```
/// use netatmo_export::MeasurementType;
///
/// let pressure: MeasurementType = "pressure".parse().unwrap();
/// assert_eq!(pressure, MeasurementType::Pressure);
/// assert_eq!(MeasurementType::Temperature.to_string(), "temperature");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementType {
    Temperature,
    Humidity,
    Pressure,
    Co2,
    Noise,
    Rain,
    WindStrength,
    GustStrength,
}

impl MeasurementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementType::Temperature => "temperature",
            MeasurementType::Humidity => "humidity",
            MeasurementType::Pressure => "pressure",
            MeasurementType::Co2 => "co2",
            MeasurementType::Noise => "noise",
            MeasurementType::Rain => "rain",
            MeasurementType::WindStrength => "windstrength",
            MeasurementType::GustStrength => "guststrength",
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown measurement type '{0}'")]
pub struct UnknownMeasurementType(pub String);

impl FromStr for MeasurementType {
    type Err = UnknownMeasurementType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "temperature" => Ok(MeasurementType::Temperature),
            "humidity" => Ok(MeasurementType::Humidity),
            "pressure" => Ok(MeasurementType::Pressure),
            "co2" => Ok(MeasurementType::Co2),
            "noise" => Ok(MeasurementType::Noise),
            "rain" => Ok(MeasurementType::Rain),
            "windstrength" => Ok(MeasurementType::WindStrength),
            "guststrength" => Ok(MeasurementType::GustStrength),
            _ => Err(UnknownMeasurementType(s.to_string())),
        }
    }
}

/// One element of an optimized `getmeasure` response body.
///
/// `value` holds one vector per time step; each vector has one entry per
/// requested type. `step_time` is omitted by the API when the chunk has a
/// single step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureChunk {
    pub beg_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_time: Option<i64>,
    #[serde(default)]
    pub value: Vec<Vec<Option<f64>>>,
}

/// A single timestamped reading from a module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Unix timestamp in seconds.
    pub time: i64,
    pub value: Option<f64>,
}

/// Expands measure chunks into one reading per time step.
///
/// Chunks without a `step_time` stamp every value with `beg_time`. Timestamps
/// saturate at the `i64` bounds.
pub fn flatten(chunks: &[MeasureChunk]) -> Vec<Reading> {
    let total = chunks.iter().map(|c| c.value.len()).sum();
    let mut readings = Vec::with_capacity(total);
    for chunk in chunks {
        let step = chunk.step_time.unwrap_or(0);
        for (i, values) in chunk.value.iter().enumerate() {
            readings.push(Reading {
                time: chunk
                    .beg_time
                    .saturating_add(step.saturating_mul(i as i64)),
                value: values.first().copied().flatten(),
            });
        }
    }
    readings
}
