//! Geographic and temporal bounds of a download.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A latitude/longitude bounding box in decimal degrees.
///
/// Maps directly onto the `lat_ne`, `lon_ne`, `lat_sw` and `lon_sw` parameters
/// of the Netatmo `getpublicdata` endpoint.
///
/// # Examples
///
/// ```
/// use netatmo_export::Area;
///
/// let north_america = Area::new(55.0, -130.0, 15.0, -60.0);
/// assert_eq!(north_america.north, 55.0);
/// assert_eq!(north_america.west, -130.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub north: f64,
    pub west: f64,
    pub south: f64,
    pub east: f64,
}

impl Area {
    pub fn new(north: f64, west: f64, south: f64, east: f64) -> Self {
        Self {
            north,
            west,
            south,
            east,
        }
    }

    /// Query parameters for `getpublicdata`, in the order the API documents them.
    pub(crate) fn query_params(&self) -> [(&'static str, String); 4] {
        [
            ("lat_ne", self.north.to_string()),
            ("lon_ne", self.east.to_string()),
            ("lat_sw", self.south.to_string()),
            ("lon_sw", self.west.to_string()),
        ]
    }
}

#[derive(Debug, Error)]
pub enum TimeRangeError {
    #[error("Invalid RFC 3339 timestamp '{0}'")]
    Parse(String, #[source] chrono::ParseError),

    #[error("Time range start {start} is not before end {end}")]
    Empty {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// A closed UTC time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Parses two RFC 3339 timestamps, e.g. `"2022-01-15T00:00:00Z"`.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeRangeError> {
        let parse = |s: &str| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| TimeRangeError::Parse(s.to_string(), e))
        };
        let (start, end) = (parse(start)?, parse(end)?);
        if start >= end {
            return Err(TimeRangeError::Empty { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn date_begin(&self) -> i64 {
        self.start.timestamp()
    }

    pub fn date_end(&self) -> i64 {
        self.end.timestamp()
    }
}
