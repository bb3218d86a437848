//! Loading of the OAuth client credentials.
//!
//! Values come from the `CLIENT_ID`, `CLIENT_SECRET` and `REFRESH_TOKEN`
//! environment variables. Anything not set there is taken from a JSON
//! credentials file using the same keys (`~/.netatmo.credentials` by default).

use crate::auth::error::CredentialsError;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "CLIENT_SECRET";
pub const REFRESH_TOKEN_VAR: &str = "REFRESH_TOKEN";
const CREDENTIALS_FILE_NAME: &str = ".netatmo.credentials";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Partially filled credentials, as found in one source.
#[derive(Debug, Default, Deserialize)]
struct PartialCredentials {
    #[serde(rename = "CLIENT_ID")]
    client_id: Option<String>,
    #[serde(rename = "CLIENT_SECRET")]
    client_secret: Option<String>,
    #[serde(rename = "REFRESH_TOKEN")]
    refresh_token: Option<String>,
}

impl PartialCredentials {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            client_id: lookup(CLIENT_ID_VAR),
            client_secret: lookup(CLIENT_SECRET_VAR),
            refresh_token: lookup(REFRESH_TOKEN_VAR),
        }
    }

    fn or(self, fallback: PartialCredentials) -> Self {
        Self {
            client_id: non_empty(self.client_id).or(fallback.client_id),
            client_secret: non_empty(self.client_secret).or(fallback.client_secret),
            refresh_token: non_empty(self.refresh_token).or(fallback.refresh_token),
        }
    }

    fn complete(self) -> Result<Credentials, CredentialsError> {
        Ok(Credentials {
            client_id: require(self.client_id, CLIENT_ID_VAR)?,
            client_secret: require(self.client_secret, CLIENT_SECRET_VAR)?,
            refresh_token: require(self.refresh_token, REFRESH_TOKEN_VAR)?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn require(value: Option<String>, name: &'static str) -> Result<String, CredentialsError> {
    non_empty(value).ok_or(CredentialsError::Missing(name))
}

impl Credentials {
    /// Default location of the credentials file, in the user's home directory.
    pub fn default_file() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CREDENTIALS_FILE_NAME))
    }

    /// Reads credentials from the process environment only.
    pub fn from_env() -> Result<Self, CredentialsError> {
        PartialCredentials::from_lookup(|name| std::env::var(name).ok()).complete()
    }

    /// Reads credentials from a JSON file only.
    pub fn from_file(path: &Path) -> Result<Self, CredentialsError> {
        read_file(path)?.complete()
    }

    /// Environment first, then the default credentials file if it exists.
    pub fn load() -> Result<Self, CredentialsError> {
        Self::load_with(|name| std::env::var(name).ok(), Self::default_file().as_deref())
    }

    pub(crate) fn load_with(
        lookup: impl Fn(&str) -> Option<String>,
        file: Option<&Path>,
    ) -> Result<Self, CredentialsError> {
        let from_env = PartialCredentials::from_lookup(lookup);
        let from_file = match file {
            Some(path) if path.exists() => read_file(path)?,
            _ => PartialCredentials::default(),
        };
        from_env.or(from_file).complete()
    }
}

fn read_file(path: &Path) -> Result<PartialCredentials, CredentialsError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CredentialsError::FileRead(path.to_path_buf(), e))?;
    serde_json::from_str(&contents).map_err(|e| CredentialsError::FileParse(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_only() {
        let creds = Credentials::load_with(
            lookup_from(&[
                ("CLIENT_ID", "id"),
                ("CLIENT_SECRET", "secret"),
                ("REFRESH_TOKEN", "refresh"),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.client_secret, "secret");
        assert_eq!(creds.refresh_token, "refresh");
    }

    #[test]
    fn test_missing_field_is_reported_by_name() {
        let err = Credentials::load_with(
            lookup_from(&[("CLIENT_ID", "id"), ("REFRESH_TOKEN", "refresh")]),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CredentialsError::Missing("CLIENT_SECRET")));
    }

    #[test]
    fn test_empty_env_value_counts_as_missing() {
        let err = Credentials::load_with(
            lookup_from(&[
                ("CLIENT_ID", "  "),
                ("CLIENT_SECRET", "secret"),
                ("REFRESH_TOKEN", "refresh"),
            ]),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CredentialsError::Missing("CLIENT_ID")));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"CLIENT_ID": "file-id", "CLIENT_SECRET": "file-secret", "REFRESH_TOKEN": "file-refresh"}}"#
        )
        .unwrap();

        let creds = Credentials::load_with(
            lookup_from(&[("CLIENT_SECRET", "env-secret")]),
            Some(file.path()),
        )
        .unwrap();
        assert_eq!(creds.client_id, "file-id");
        assert_eq!(creds.client_secret, "env-secret");
        assert_eq!(creds.refresh_token, "file-refresh");
    }

    #[test]
    fn test_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = Credentials::from_file(file.path()).unwrap_err();
        assert!(matches!(err, CredentialsError::FileParse(_, _)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials {
            client_id: "id".to_string(),
            client_secret: "hunter2".to_string(),
            refresh_token: "token".to_string(),
        };
        let printed = format!("{creds:?}");
        assert!(printed.contains("id"));
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("token\""));
    }
}
