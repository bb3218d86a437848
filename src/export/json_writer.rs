use crate::export::dataset::Dataset;
use crate::export::error::OutputError;
use crate::types::measurement::MeasurementType;
use crate::utils::write_atomically;
use log::info;
use std::io::Write;
use std::path::Path;

/// Writes `dataset` as pretty-printed JSON followed by a newline.
pub fn write_json(dataset: &Dataset, path: &Path) -> Result<(), OutputError> {
    write_atomically(path, |file| {
        serde_json::to_writer_pretty(&mut *file, dataset)
            .map_err(|e| OutputError::JsonEncode(path.to_path_buf(), e))?;
        file.write_all(b"\n")
            .map_err(|e| OutputError::Write(path.to_path_buf(), e))
    })?;
    info!(
        "Wrote {} readings from {} stations to {}",
        dataset.len(),
        dataset.stations.len(),
        path.display()
    );
    Ok(())
}

/// Reads a file produced by [`write_json`].
pub fn read_json(measurement: MeasurementType, path: &Path) -> Result<Dataset, OutputError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| OutputError::Read(path.to_path_buf(), e))?;
    Dataset::from_json_str(measurement, &contents)
}
