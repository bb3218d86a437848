//! Flat CSV export: one row per reading.
//!
//! Column order is fixed: `station_id`, `time`, then the measurement name
//! (e.g. `pressure`). Missing values are written as empty fields.

use crate::export::dataset::Dataset;
use crate::export::error::OutputError;
use crate::utils::write_atomically;
use log::info;
use std::path::Path;

pub fn header(dataset: &Dataset) -> [&str; 3] {
    ["station_id", "time", dataset.measurement.as_str()]
}

pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<usize, OutputError> {
    let csv_err = |e: csv::Error| OutputError::Csv(path.to_path_buf(), e);

    write_atomically(path, |file| {
        let mut wtr = csv::Writer::from_writer(file);
        wtr.write_record(header(dataset)).map_err(csv_err)?;

        for (station_id, reading) in dataset.records() {
            let value = reading.value.map_or(String::new(), |v| v.to_string());
            wtr.write_record([station_id, reading.time.to_string().as_str(), value.as_str()])
                .map_err(csv_err)?;
        }

        wtr.flush()
            .map_err(|e| OutputError::Write(path.to_path_buf(), e))
    })?;

    let rows = dataset.len();
    info!("Wrote {} CSV rows to {}", rows, path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::dataset::StationSeries;
    use crate::types::measurement::{MeasurementType, Reading};

    #[test]
    fn test_one_row_per_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");

        let mut dataset = Dataset::new(MeasurementType::Temperature);
        dataset.insert(
            "station B",
            StationSeries {
                readings: vec![
                    Reading { time: 1_700_000_600, value: None },
                    Reading { time: 1_700_001_200, value: Some(-3.0) },
                ],
                ..Default::default()
            },
        );
        dataset.insert(
            "station A",
            StationSeries {
                readings: vec![Reading { time: 1_700_000_000, value: Some(21.5) }],
                ..Default::default()
            },
        );
        dataset.insert("station C", StationSeries::default());

        let rows = write_csv(&dataset, &path).unwrap();
        assert_eq!(rows, 3);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "station_id,time,temperature\n\
             station A,1700000000,21.5\n\
             station B,1700000600,\n\
             station B,1700001200,-3\n"
        );
    }
}
