//! Per-station CSV files named after the station coordinates, e.g.
//! `Lon-73.95Lat40.71.csv`, with RFC 3339 timestamps. Stations sharing a
//! location get a counter suffix (`Lon-73.95Lat40.71-2.csv`).

use crate::export::dataset::Dataset;
use crate::export::error::OutputError;
use crate::utils::write_atomically;
use chrono::{DateTime, SecondsFormat};
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub fn station_file_name(location: [f64; 2]) -> String {
    format!("Lon{}Lat{}.csv", location[0], location[1])
}

fn unique_file_name(location: [f64; 2], taken: &mut HashSet<String>) -> String {
    let mut name = station_file_name(location);
    let mut n = 1;
    while taken.contains(&name) {
        n += 1;
        name = format!("Lon{}Lat{}-{}.csv", location[0], location[1], n);
    }
    taken.insert(name.clone());
    name
}

fn format_time(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| timestamp.to_string())
}

/// Writes one file per station that has readings and a known location.
///
/// `dir` must already exist. Returns the written paths in station order.
pub fn write_station_csvs(dataset: &Dataset, dir: &Path) -> Result<Vec<PathBuf>, OutputError> {
    let mut written = Vec::new();
    let mut taken = HashSet::new();

    for (station_id, series) in &dataset.stations {
        if series.readings.is_empty() {
            continue;
        }
        let Some(location) = series.location else {
            warn!("Station {} has no location, skipping per-station CSV", station_id);
            continue;
        };

        let file_name = unique_file_name(location, &mut taken);
        if file_name != station_file_name(location) {
            warn!(
                "Station {} shares its location with another station, writing {}",
                station_id, file_name
            );
        }
        let path = dir.join(file_name);
        let csv_err = |e: csv::Error| OutputError::Csv(path.clone(), e);
        write_atomically(&path, |file| {
            let mut wtr = csv::Writer::from_writer(file);
            wtr.write_record(["time", dataset.measurement.as_str()])
                .map_err(csv_err)?;
            for reading in &series.readings {
                let value = reading.value.map_or(String::new(), |v| v.to_string());
                wtr.write_record([format_time(reading.time), value])
                    .map_err(csv_err)?;
            }
            wtr.flush().map_err(|e| OutputError::Write(path.clone(), e))
        })?;
        debug!("Saved {}", path.display());
        written.push(path);
    }

    Ok(written)
}
