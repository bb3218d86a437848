pub mod csv_writer;
pub mod dataset;
pub mod error;
pub mod json_writer;
pub mod station_csv;
