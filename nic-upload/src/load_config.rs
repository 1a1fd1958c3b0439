/// `load_config` module: Loads the optional YAML config and merges it with defaults and CLI overrides.
///
/// # Responsibilities
/// - Parse the user-supplied YAML file into type-safe structs
/// - Fill every missing section or key with its default
/// - Apply command-line overrides on top
/// - Reject values that cannot work (a zero timeout) with a clear message
///
/// Secrets never live in this file; the access token is read by the credential stores.
///
/// # Errors
/// All errors in this module use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{bail, Result};
use nic_upload_core::submitter::{DEFAULT_FIELD_NAME, DEFAULT_TIMEOUT};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::credentials::DEFAULT_TOKEN_NAME;
use crate::upload::DEFAULT_ENDPOINT;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UploadSection {
    pub endpoint: String,
    pub field_name: String,
    pub timeout_secs: u64,
}

impl Default for UploadSection {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            field_name: DEFAULT_FIELD_NAME.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl UploadSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CredentialSection {
    /// Key looked up in every credential store.
    pub token_name: String,
    /// Optional `key=value` file consulted after the environment.
    pub file: Option<PathBuf>,
}

impl Default for CredentialSection {
    fn default() -> Self {
        Self {
            token_name: DEFAULT_TOKEN_NAME.to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub upload: UploadSection,
    pub credential: CredentialSection,
}

/// Values given on the command line; each one beats the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl CliConfig {
    pub fn apply(mut self, overrides: &ConfigOverrides) -> Result<Self> {
        if let Some(endpoint) = &overrides.endpoint {
            self.upload.endpoint = endpoint.clone();
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.upload.timeout_secs = timeout_secs;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.upload.timeout_secs == 0 {
            error!("upload.timeout_secs must be greater than zero");
            bail!("upload.timeout_secs must be greater than zero");
        }
        if self.upload.endpoint.trim().is_empty() {
            bail!("upload.endpoint must not be empty");
        }
        if self.upload.field_name.trim().is_empty() {
            bail!("upload.field_name must not be empty");
        }
        Ok(())
    }
}

/// Loads a YAML config file. Missing sections and keys fall back to defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty document deserializes to unit, not to a struct.
    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(CliConfig::default());
    }

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    config.validate()?;
    info!(
        endpoint = %config.upload.endpoint,
        timeout_secs = config.upload.timeout_secs,
        token_name = %config.credential.token_name,
        "Config loaded"
    );
    Ok(config)
}
