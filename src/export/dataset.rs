//! The in-memory record set written by the exporters.
//!
//! The JSON form maps each station id to its readings, each reading being an
//! object with the unix `time` and the value keyed by the measurement name:
//!
//! ```json
//! {"station A": [{"time": 1700000000, "temperature": 21.5}]}
//! ```

use crate::export::error::OutputError;
use crate::types::measurement::{MeasurementType, Reading};
use log::warn;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Readings of one station together with what is known about where they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationSeries {
    pub module_id: Option<String>,
    /// `[longitude, latitude]`
    pub location: Option<[f64; 2]>,
    pub readings: Vec<Reading>,
}

/// All readings of one measurement type, keyed by station id.
///
/// Stations are kept in key order so repeated exports of the same data are
/// byte-identical.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub measurement: MeasurementType,
    pub stations: BTreeMap<String, StationSeries>,
}

impl Dataset {
    pub fn new(measurement: MeasurementType) -> Self {
        Self {
            measurement,
            stations: BTreeMap::new(),
        }
    }

    /// Adds the series of a station, returning the one it replaced, if any.
    pub fn insert(
        &mut self,
        station_id: impl Into<String>,
        series: StationSeries,
    ) -> Option<StationSeries> {
        let station_id = station_id.into();
        let replaced = self.stations.insert(station_id.clone(), series);
        if let Some(previous) = &replaced {
            warn!(
                "Station {} listed more than once, dropping {} earlier readings",
                station_id,
                previous.readings.len()
            );
        }
        replaced
    }

    /// Total number of readings across all stations.
    pub fn len(&self) -> usize {
        self.stations.values().map(|s| s.readings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of stations with at least one reading, and without any.
    pub fn station_coverage(&self) -> (usize, usize) {
        let with_data = self
            .stations
            .values()
            .filter(|s| !s.readings.is_empty())
            .count();
        (with_data, self.stations.len() - with_data)
    }

    /// Every reading paired with its station id, in output order.
    pub fn records(&self) -> impl Iterator<Item = (&str, &Reading)> + '_ {
        self.stations.iter().flat_map(|(station_id, series)| {
            series
                .readings
                .iter()
                .map(move |reading| (station_id.as_str(), reading))
        })
    }

    /// Parses the JSON form back into a dataset.
    ///
    /// Module ids and locations are not part of the JSON form and come back empty.
    pub fn from_json_str(measurement: MeasurementType, json: &str) -> Result<Self, OutputError> {
        let raw: BTreeMap<String, Vec<serde_json::Map<String, Value>>> =
            serde_json::from_str(json)?;
        let key = measurement.as_str();
        let mut dataset = Dataset::new(measurement);

        for (station_id, records) in raw {
            let invalid = |index: usize, message: &str| OutputError::InvalidRecord {
                station: station_id.clone(),
                index,
                message: message.to_string(),
            };
            let mut readings = Vec::with_capacity(records.len());
            for (index, record) in records.iter().enumerate() {
                let time = record
                    .get("time")
                    .and_then(Value::as_i64)
                    .ok_or_else(|| invalid(index, "missing integer 'time'"))?;
                let value = match record.get(key) {
                    None | Some(Value::Null) => None,
                    Some(v) => Some(
                        v.as_f64()
                            .ok_or_else(|| invalid(index, "measurement is not a number"))?,
                    ),
                };
                readings.push(Reading { time, value });
            }
            dataset.insert(
                station_id,
                StationSeries {
                    readings,
                    ..Default::default()
                },
            );
        }
        Ok(dataset)
    }
}

struct ReadingEntry<'a> {
    key: &'a str,
    reading: &'a Reading,
}

impl Serialize for ReadingEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("time", &self.reading.time)?;
        map.serialize_entry(self.key, &self.reading.value)?;
        map.end()
    }
}

struct SeriesEntries<'a> {
    key: &'a str,
    readings: &'a [Reading],
}

impl Serialize for SeriesEntries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.readings.len()))?;
        for reading in self.readings {
            seq.serialize_element(&ReadingEntry {
                key: self.key,
                reading,
            })?;
        }
        seq.end()
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let key = self.measurement.as_str();
        let mut map = serializer.serialize_map(Some(self.stations.len()))?;
        for (station_id, series) in &self.stations {
            map.serialize_entry(
                station_id,
                &SeriesEntries {
                    key,
                    readings: &series.readings,
                },
            )?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let mut dataset = Dataset::new(MeasurementType::Temperature);
        dataset.insert(
            "station A",
            StationSeries {
                module_id: Some("02:00:00:00:00:01".to_string()),
                location: Some([4.9, 52.4]),
                readings: vec![Reading {
                    time: 1_700_000_000,
                    value: Some(21.5),
                }],
            },
        );
        dataset
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"station A":[{"time":1700000000,"temperature":21.5}]}"#
        );
    }

    #[test]
    fn test_parse_reproduces_records() {
        let original = sample();
        let json = serde_json::to_string(&original).unwrap();
        let parsed = Dataset::from_json_str(MeasurementType::Temperature, &json).unwrap();

        let a: Vec<_> = original.records().collect();
        let b: Vec<_> = parsed.records().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_full_precision_values_read_back_exactly() {
        let values = [
            1.0715660391465826e-75,
            -1.81996730402717e-179,
            0.1 + 0.2,
            1013.2500000000001,
            f64::MIN_POSITIVE,
            f64::MAX,
            -2.2250738585072014e-308,
            5e-324,
            std::f64::consts::PI,
        ];
        let mut dataset = Dataset::new(MeasurementType::Pressure);
        dataset.insert(
            "70:ee:50:00:00:01",
            StationSeries {
                readings: values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| Reading {
                        time: i as i64,
                        value: Some(*v),
                    })
                    .collect(),
                ..Default::default()
            },
        );

        let json = serde_json::to_string_pretty(&dataset).unwrap();
        let parsed = Dataset::from_json_str(MeasurementType::Pressure, &json).unwrap();
        let read_back: Vec<u64> = parsed
            .records()
            .map(|(_, r)| r.value.unwrap().to_bits())
            .collect();
        let expected: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
        assert_eq!(read_back, expected);
    }

    #[test]
    fn test_insert_returns_replaced_series() {
        let mut dataset = sample();
        let replaced = dataset.insert("station A", StationSeries::default());
        assert_eq!(replaced.map(|s| s.readings.len()), Some(1));
        assert_eq!(dataset.len(), 0);
        assert!(dataset.insert("station B", StationSeries::default()).is_none());
    }

    #[test]
    fn test_null_values_survive() {
        let parsed = Dataset::from_json_str(
            MeasurementType::Pressure,
            r#"{"x": [{"time": 1, "pressure": null}, {"time": 2, "pressure": 1000}]}"#,
        )
        .unwrap();
        let values: Vec<Option<f64>> = parsed.records().map(|(_, r)| r.value).collect();
        assert_eq!(values, vec![None, Some(1000.0)]);
    }

    #[test]
    fn test_parse_rejects_missing_time() {
        let err = Dataset::from_json_str(
            MeasurementType::Pressure,
            r#"{"x": [{"pressure": 1000}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, OutputError::InvalidRecord { index: 0, .. }));
    }

    #[test]
    fn test_len_counts_readings() {
        let mut dataset = sample();
        dataset.insert("station B", StationSeries::default());
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.stations.len(), 2);
        assert_eq!(dataset.station_coverage(), (1, 1));
        assert!(!dataset.is_empty());
    }
}
