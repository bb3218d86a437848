//! Thin client for the two Netatmo weather endpoints this crate reads from.

use crate::api::error::ApiError;
use crate::auth::client_auth::ClientAuth;
use crate::types::area::{Area, TimeRange};
use crate::types::measurement::{MeasureChunk, MeasurementType};
use crate::types::station::Station;
use log::{debug, info, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://api.netatmo.com";

/// Every Netatmo API answer wraps its payload like this.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    body: T,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    time_server: Option<i64>,
}

#[derive(Debug)]
pub struct NetatmoClient {
    http: Client,
    base_url: String,
    auth: ClientAuth,
}

impl NetatmoClient {
    pub fn new(http: Client, base_url: impl Into<String>, auth: ClientAuth) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        }
    }

    /// Lists the public stations inside `area`.
    ///
    /// With `filter` set the API drops stations whose readings it considers
    /// unreliable.
    pub async fn get_public_data(
        &self,
        area: &Area,
        filter: bool,
    ) -> Result<Vec<Station>, ApiError> {
        let mut query: Vec<(&str, String)> = area.query_params().into_iter().collect();
        query.push(("filter", filter.to_string()));
        let stations: Vec<Station> = self.get("getpublicdata", &query).await?;
        info!("Found {} public stations", stations.len());
        Ok(stations)
    }

    /// Fetches the measurement history of one module over `range` at the
    /// highest resolution (`scale=max`).
    pub async fn get_measure(
        &self,
        device_id: &str,
        module_id: &str,
        measurement: MeasurementType,
        range: &TimeRange,
    ) -> Result<Vec<MeasureChunk>, ApiError> {
        let query = [
            ("device_id", device_id.to_string()),
            ("module_id", module_id.to_string()),
            ("type", measurement.to_string()),
            ("scale", "max".to_string()),
            ("date_begin", range.date_begin().to_string()),
            ("date_end", range.date_end().to_string()),
        ];
        self.get("getmeasure", &query).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}/api/{}", self.base_url, endpoint);
        let token = self.auth.access_token().await?;
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::NetworkRequest(url.clone(), e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Body(url.clone(), e))?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            warn!("HTTP error for {}: {} {}", url, status, body);
            return Err(ApiError::HttpStatus { url, status, body });
        }

        let envelope: Envelope<T> =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(url.clone(), e))?;
        match envelope.status.as_deref() {
            None | Some("ok") => {}
            Some(other) => {
                return Err(ApiError::UnexpectedStatus {
                    url,
                    status: other.to_string(),
                })
            }
        }
        if let Some(time_server) = envelope.time_server {
            debug!("{} answered at server time {}", endpoint, time_server);
        }
        Ok(envelope.body)
    }
}
