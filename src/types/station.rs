//! Public weather stations as returned by the Netatmo `getpublicdata` endpoint.

use crate::types::measurement::MeasurementType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A publicly shared Netatmo weather station.
///
/// Only the fields this crate needs are modelled; the API sends more and those
/// are ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// The station MAC address (e.g. "70:ee:50:12:34:56").
    #[serde(rename = "_id")]
    pub id: String,
    pub place: Place,
    /// Latest readings keyed by module id. The station's own id appears here
    /// for the values measured by the base unit (pressure).
    #[serde(default)]
    pub measures: BTreeMap<String, MeasureGroup>,
    /// Ids of the modules attached to the station.
    #[serde(default)]
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// `[longitude, latitude]`, in that order.
    pub location: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Place {
    pub fn longitude(&self) -> f64 {
        self.location[0]
    }

    pub fn latitude(&self) -> f64 {
        self.location[1]
    }
}

/// The latest values a single module published.
///
/// Thermometer and base-station modules list their quantities in `type`. Rain
/// gauges and anemometers omit `type` and use dedicated fields instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureGroup {
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain_60min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_strength: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gust_strength: Option<f64>,
}

impl MeasureGroup {
    pub fn provides(&self, measurement: MeasurementType) -> bool {
        match measurement {
            MeasurementType::Rain => self.rain_60min.is_some() || self.has_type(measurement),
            MeasurementType::WindStrength => {
                self.wind_strength.is_some() || self.has_type(measurement)
            }
            MeasurementType::GustStrength => {
                self.gust_strength.is_some() || self.has_type(measurement)
            }
            _ => self.has_type(measurement),
        }
    }

    fn has_type(&self, measurement: MeasurementType) -> bool {
        self.types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(measurement.as_str()))
    }
}

impl Station {
    /// Returns the id of the first module that reports `measurement`.
    pub fn module_for(&self, measurement: MeasurementType) -> Option<&str> {
        self.measures
            .iter()
            .find(|(_, group)| group.provides(measurement))
            .map(|(module_id, _)| module_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_station() -> Station {
        serde_json::from_str(
            r#"{
                "_id": "70:ee:50:00:00:01",
                "place": {
                    "location": [-73.95, 40.71],
                    "timezone": "America/New_York",
                    "country": "US",
                    "altitude": 12,
                    "city": "Brooklyn",
                    "street": "Bedford Avenue"
                },
                "mark": 10,
                "measures": {
                    "70:ee:50:00:00:01": {"res": {"1642204800": [1013.2]}, "type": ["pressure"]},
                    "02:00:00:00:00:01": {"res": {"1642204800": [-2.5, 81]}, "type": ["temperature", "humidity"]},
                    "05:00:00:00:00:01": {"rain_60min": 0, "rain_24h": 0.2, "rain_live": 0, "rain_timeutc": 1642204800},
                    "06:00:00:00:00:01": {"wind_strength": 4, "wind_angle": 200, "gust_strength": 9, "gust_angle": 210}
                },
                "modules": ["02:00:00:00:00:01", "05:00:00:00:00:01", "06:00:00:00:00:01"],
                "module_types": {"02:00:00:00:00:01": "NAModule1"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_deserialize_public_station() {
        let station = sample_station();
        assert_eq!(station.id, "70:ee:50:00:00:01");
        assert_eq!(station.place.longitude(), -73.95);
        assert_eq!(station.place.latitude(), 40.71);
        assert_eq!(station.place.altitude, Some(12.0));
        assert_eq!(station.measures.len(), 4);
        assert_eq!(station.modules.len(), 3);
    }

    #[test]
    fn test_module_for_typed_measures() {
        let station = sample_station();
        assert_eq!(
            station.module_for(MeasurementType::Pressure),
            Some("70:ee:50:00:00:01")
        );
        assert_eq!(
            station.module_for(MeasurementType::Humidity),
            Some("02:00:00:00:00:01")
        );
    }

    #[test]
    fn test_module_for_rain_and_wind() {
        let station = sample_station();
        assert_eq!(
            station.module_for(MeasurementType::Rain),
            Some("05:00:00:00:00:01")
        );
        assert_eq!(
            station.module_for(MeasurementType::GustStrength),
            Some("06:00:00:00:00:01")
        );
        assert_eq!(station.module_for(MeasurementType::Co2), None);
    }
}
