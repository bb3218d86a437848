//! The download-and-export pipeline.
//!
//! [`NetatmoExport::run`] loads credentials, authorizes, lists the public
//! stations of the configured area, downloads one measurement series per
//! station and writes the result as JSON, as a flat CSV and as one CSV per
//! station.

use crate::api::client::{NetatmoClient, DEFAULT_API_URL};
use crate::auth::client_auth::{ClientAuth, DEFAULT_TOKEN_URL};
use crate::auth::credentials::Credentials;
use crate::error::NetatmoExportError;
use crate::export::csv_writer::write_csv;
use crate::export::dataset::{Dataset, StationSeries};
use crate::export::json_writer::write_json;
use crate::export::station_csv::write_station_csvs;
use crate::types::area::{Area, TimeRange};
use crate::types::measurement::{flatten, MeasurementType};
use crate::types::station::Station;
use crate::utils::ensure_output_dir_exists;
use bon::bon;
use log::{info, warn};
use reqwest::Client;
use std::path::{Path, PathBuf};

const STATION_CSV_DIR: &str = "csv";

/// What to download and where to put it.
///
/// # Examples
///
/// ```
/// use netatmo_export::{Area, ExportConfig, MeasurementType, TimeRange};
///
/// let config = ExportConfig::builder()
///     .area(Area::new(55.0, -130.0, 15.0, -60.0))
///     .range(TimeRange::parse("2022-01-15T00:00:00Z", "2022-01-17T00:00:00Z").unwrap())
///     .measurement(MeasurementType::Pressure)
///     .name("netatmo-2022-01-15-17")
///     .build();
///
/// assert!(config.filter_stations);
/// assert_eq!(config.output_dir().to_str(), Some("./netatmo-2022-01-15-17"));
/// ```
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub area: Area,
    pub range: TimeRange,
    pub measurement: MeasurementType,
    /// Name of the data set. Used for the output directory and file names.
    pub name: String,
    pub output_root: PathBuf,
    pub filter_stations: bool,
    pub api_url: String,
    pub token_url: String,
}

#[bon]
impl ExportConfig {
    /// # Optional Builder Methods
    ///
    /// * `.output_root(PathBuf)`: directory the data set directory is created in. Defaults to `.`.
    /// * `.filter_stations(bool)`: let the API drop unreliable stations. Defaults to `true`.
    /// * `.api_url(String)` / `.token_url(String)`: endpoints, for testing against a mock server.
    #[builder]
    pub fn new(
        area: Area,
        range: TimeRange,
        measurement: MeasurementType,
        #[builder(into)] name: String,
        output_root: Option<PathBuf>,
        filter_stations: Option<bool>,
        api_url: Option<String>,
        token_url: Option<String>,
    ) -> Self {
        Self {
            area,
            range,
            measurement,
            name,
            output_root: output_root.unwrap_or_else(|| PathBuf::from(".")),
            filter_stations: filter_stations.unwrap_or(true),
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token_url: token_url.unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(&self.name)
    }

    pub fn json_path(&self) -> PathBuf {
        self.output_dir().join(format!("{}.json", self.name))
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir().join(format!("{}.csv", self.name))
    }

    pub fn station_csv_dir(&self) -> PathBuf {
        self.output_dir().join(STATION_CSV_DIR)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub stations: usize,
    /// Stations that contributed at least one reading.
    pub stations_with_data: usize,
    pub stations_without_data: usize,
    pub readings: usize,
    pub json_path: PathBuf,
    pub csv_path: PathBuf,
    pub station_csvs: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct NetatmoExport {
    config: ExportConfig,
    http: Client,
}

impl NetatmoExport {
    pub fn new(config: ExportConfig) -> Result<Self, NetatmoExportError> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(NetatmoExportError::HttpClient)?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Runs the whole pipeline with credentials from the environment or the
    /// credentials file.
    ///
    /// # Errors
    ///
    /// Credential and authorization failures are reported before anything is
    /// written to disk. API and I/O failures abort the run as they happen.
    pub async fn run(&self) -> Result<ExportSummary, NetatmoExportError> {
        self.run_with_credential_sources(
            |name| std::env::var(name).ok(),
            Credentials::default_file().as_deref(),
        )
        .await
    }

    pub(crate) async fn run_with_credential_sources(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
        credentials_file: Option<&Path>,
    ) -> Result<ExportSummary, NetatmoExportError> {
        let credentials = Credentials::load_with(lookup, credentials_file)?;
        self.run_with(credentials).await
    }

    pub async fn run_with(
        &self,
        credentials: Credentials,
    ) -> Result<ExportSummary, NetatmoExportError> {
        let client = self.connect(credentials).await?;
        let dataset = self.collect(&client).await?;
        self.write(&dataset).await
    }

    pub async fn connect(
        &self,
        credentials: Credentials,
    ) -> Result<NetatmoClient, NetatmoExportError> {
        let auth =
            ClientAuth::authorize(self.http.clone(), &self.config.token_url, credentials).await?;
        Ok(NetatmoClient::new(
            self.http.clone(),
            &self.config.api_url,
            auth,
        ))
    }

    /// Downloads the station list and the measurements of every station.
    pub async fn collect(&self, client: &NetatmoClient) -> Result<Dataset, NetatmoExportError> {
        let area = &self.config.area;
        info!(
            "Downloading stations for N{} W{} S{} E{}",
            area.north, area.west, area.south, area.east
        );
        let stations = client
            .get_public_data(area, self.config.filter_stations)
            .await?;

        let mut dataset = Dataset::new(self.config.measurement);
        for (i, station) in stations.iter().enumerate() {
            info!(
                "Station {}/{}: {}",
                i + 1,
                stations.len(),
                station.id
            );
            let series = self.fetch_station(client, station).await?;
            dataset.insert(station.id.clone(), series);
        }
        info!(
            "Collected {} readings from {} stations",
            dataset.len(),
            dataset.stations.len()
        );
        Ok(dataset)
    }

    /// Downloads the configured measurement for one station.
    ///
    /// Stations without a module for the measurement yield an empty series.
    pub async fn fetch_station(
        &self,
        client: &NetatmoClient,
        station: &Station,
    ) -> Result<StationSeries, NetatmoExportError> {
        let station_id = station.id.as_str();
        let measurement = self.config.measurement;
        let location = Some(station.place.location);

        let Some(module_id) = station.module_for(measurement) else {
            warn!(
                "Station {} has no module reporting {}, skipping",
                station_id, measurement
            );
            return Ok(StationSeries {
                module_id: None,
                location,
                readings: Vec::new(),
            });
        };

        info!(
            "Downloading data for {} {} {}",
            station_id, module_id, measurement
        );
        let chunks = client
            .get_measure(station_id, module_id, measurement, &self.config.range)
            .await?;
        Ok(StationSeries {
            module_id: Some(module_id.to_string()),
            location,
            readings: flatten(&chunks),
        })
    }

    /// Writes the JSON, flat CSV and per-station CSV outputs.
    pub async fn write(&self, dataset: &Dataset) -> Result<ExportSummary, NetatmoExportError> {
        let station_dir = self.config.station_csv_dir();
        ensure_output_dir_exists(&station_dir).await?;

        let json_path = self.config.json_path();
        let csv_path = self.config.csv_path();
        write_json(dataset, &json_path)?;
        let readings = write_csv(dataset, &csv_path)?;
        let station_csvs = write_station_csvs(dataset, &station_dir)?;
        info!(
            "Saved {} per-station CSV files to {}",
            station_csvs.len(),
            station_dir.display()
        );

        let (stations_with_data, stations_without_data) = dataset.station_coverage();
        info!(
            "Data available from {} stations, no data available from {} stations",
            stations_with_data, stations_without_data
        );

        Ok(ExportSummary {
            stations: dataset.stations.len(),
            stations_with_data,
            stations_without_data,
            readings,
            json_path,
            csv_path,
            station_csvs,
        })
    }
}
