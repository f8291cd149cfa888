use std::path::Path;

use serde::Deserialize;

/// Name of the secrets file looked up next to the executable when no
/// credentials are supplied on the command line or via the environment.
pub const SECRETS_FILE_NAME: &'static str = "secrets.json";

/// Credentials for a single Application Insights app.
///
/// Both fields are optional here so that a partially-filled record can be
/// represented; [`crate::Client::new`] is where absence becomes an error.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Secrets {
    /// Static API key sent as the `X-Api-Key` header.
    #[serde(rename = "api-key")]
    pub api_key: Option<String>,

    /// Identifier of the target telemetry app.
    #[serde(rename = "app-id")]
    pub app_id: Option<String>,
}

/// Errors that can occur while loading a secrets file.
#[derive(Debug)]
pub enum LoadSecretsError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file was read but is not a valid JSON secrets record.
    Parse(serde_json::Error),
}

impl From<std::io::Error> for LoadSecretsError {
    fn from(value: std::io::Error) -> Self {
        LoadSecretsError::Io(value)
    }
}

impl From<serde_json::Error> for LoadSecretsError {
    fn from(value: serde_json::Error) -> Self {
        LoadSecretsError::Parse(value)
    }
}

impl Secrets {
    /// Loads a secrets record from the JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, LoadSecretsError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Fills in any field this record is missing from `other`.
    ///
    /// Used to let command-line/environment credentials take precedence over
    /// a secrets file.
    pub fn or(self, other: Secrets) -> Secrets {
        Secrets {
            api_key: self.api_key.or(other.api_key),
            app_id: self.app_id.or(other.app_id),
        }
    }
}
