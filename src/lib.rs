mod api;
mod auth;
mod error;
mod export;
mod netatmo_export;
mod types;
mod utils;

pub use error::NetatmoExportError;
pub use netatmo_export::*;

pub use api::client::{NetatmoClient, DEFAULT_API_URL};
pub use api::error::ApiError;
pub use auth::client_auth::{ClientAuth, DEFAULT_TOKEN_URL};
pub use auth::credentials::Credentials;
pub use auth::error::{AuthError, CredentialsError};

pub use export::csv_writer::write_csv;
pub use export::dataset::{Dataset, StationSeries};
pub use export::error::OutputError;
pub use export::json_writer::{read_json, write_json};
pub use export::station_csv::write_station_csvs;

pub use types::area::{Area, TimeRange, TimeRangeError};
pub use types::measurement::{flatten, MeasureChunk, MeasurementType, Reading, UnknownMeasurementType};
pub use types::station::{MeasureGroup, Place, Station};
