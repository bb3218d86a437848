//! OAuth2 authorization against the Netatmo token endpoint.
//!
//! Netatmo no longer accepts the password grant, so a long-lived refresh token
//! is exchanged for a short-lived access token. The access token is refreshed
//! shortly before it expires.

use crate::auth::credentials::Credentials;
use crate::auth::error::AuthError;
use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub const DEFAULT_TOKEN_URL: &str = "https://api.netatmo.com/oauth2/token";

// Refresh this long before the server-side expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: u64,
}

struct TokenState {
    access_token: String,
    refresh_token: String,
    // None when the advertised lifetime does not fit in an Instant; such a
    // token is refreshed on every use.
    expires_at: Option<Instant>,
}

impl TokenState {
    fn from_response(response: TokenResponse, previous_refresh_token: String) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.unwrap_or(previous_refresh_token),
            expires_at: Instant::now().checked_add(Duration::from_secs(response.expires_in)),
        }
    }

    fn is_stale(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now() + EXPIRY_MARGIN >= expires_at,
            None => true,
        }
    }
}

/// An authorized session. Hands out a valid access token on demand.
pub struct ClientAuth {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    state: Mutex<TokenState>,
}

impl fmt::Debug for ClientAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientAuth")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl ClientAuth {
    /// Exchanges the refresh token from `credentials` for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] when the token endpoint refuses the
    /// credentials and [`AuthError::NetworkRequest`] when it cannot be reached.
    pub async fn authorize(
        http: Client,
        token_url: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, AuthError> {
        let token_url = token_url.into();
        info!("Requesting access token from {}", token_url);
        let response = request_token(
            &http,
            &token_url,
            &credentials.client_id,
            &credentials.client_secret,
            &credentials.refresh_token,
        )
        .await?;
        let state = TokenState::from_response(response, credentials.refresh_token);
        if let Some(expires_at) = state.expires_at {
            debug!(
                "Access token valid for {:?}",
                expires_at.saturating_duration_since(Instant::now())
            );
        }

        Ok(Self {
            http,
            token_url,
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            state: Mutex::new(state),
        })
    }

    /// Returns a current access token, refreshing it first if it is about to expire.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let mut state = self.state.lock().await;
        if state.is_stale() {
            warn!("Access token expired, refreshing");
            let response = request_token(
                &self.http,
                &self.token_url,
                &self.client_id,
                &self.client_secret,
                &state.refresh_token,
            )
            .await?;
            let previous = std::mem::take(&mut state.refresh_token);
            *state = TokenState::from_response(response, previous);
        }
        Ok(state.access_token.clone())
    }
}

async fn request_token(
    http: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenResponse, AuthError> {
    let response = http
        .post(token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .send()
        .await
        .map_err(|e| AuthError::NetworkRequest(token_url.to_string(), e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Token request rejected with {}: {}", status, body);
        return Err(AuthError::Rejected {
            url: token_url.to_string(),
            status,
            body,
        });
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| AuthError::Decode(token_url.to_string(), e))
}
