//! Credential stores: read-only lookups of a named bearer token.
//!
//! Issuing and refreshing tokens belongs to the authentication service; these stores
//! only read what it left behind. A blank value is treated the same as no value.

use std::fs;
use std::path::{Path, PathBuf};

use nic_upload_core::contract::{Credential, CredentialAccessor};
use tracing::{debug, info, warn};

pub const DEFAULT_TOKEN_NAME: &str = "access_token";

fn non_blank(value: &str) -> Option<Credential> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| Credential::new(trimmed))
}

/// Reads the token from the environment variable named after the upper-cased token
/// name, e.g. `access_token` is read from `ACCESS_TOKEN`.
#[derive(Debug, Clone)]
pub struct EnvCredentialStore {
    var_name: String,
}

impl EnvCredentialStore {
    pub fn new(token_name: &str) -> Self {
        Self {
            var_name: token_name.to_uppercase(),
        }
    }

    pub fn var_name(&self) -> &str {
        &self.var_name
    }
}

impl CredentialAccessor for EnvCredentialStore {
    fn get_credential(&self) -> Option<Credential> {
        let found = std::env::var(&self.var_name).ok().as_deref().and_then(non_blank);
        debug!(var = %self.var_name, found = found.is_some(), "Looked up token in environment");
        found
    }
}

/// Reads the token from a `key=value` file, one pair per line.
///
/// Lines starting with `#` and blank lines are skipped. A missing file means no token.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    key: String,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>, key: &str) -> Self {
        Self {
            path: path.into(),
            key: key.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lookup(&self, content: &str) -> Option<Credential> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .find(|(key, _)| key.trim() == self.key)
            .and_then(|(_, value)| non_blank(value))
    }
}

impl CredentialAccessor for FileCredentialStore {
    fn get_credential(&self) -> Option<Credential> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let found = self.lookup(&content);
                debug!(path = ?self.path, key = %self.key, found = found.is_some(), "Looked up token in credential file");
                found
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Credential file could not be read");
                None
            }
        }
    }
}

/// Asks each store in order and returns the first token found.
#[derive(Default)]
pub struct ChainedCredentialStore {
    stores: Vec<Box<dyn CredentialAccessor>>,
}

impl ChainedCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, store: impl CredentialAccessor + 'static) -> Self {
        self.stores.push(Box::new(store));
        self
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl CredentialAccessor for ChainedCredentialStore {
    fn get_credential(&self) -> Option<Credential> {
        let found = self.stores.iter().find_map(|store| store.get_credential());
        info!(stores = self.stores.len(), found = found.is_some(), "Resolved access token");
        found
    }
}
