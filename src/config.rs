//! Configuration file loading and credential resolution.
//!
//! Credentials and the API base URL can come from three places, in
//! precedence order: CLI flags, environment variables (`QUALYS_USERNAME`,
//! `QUALYS_PASSWORD`, `QUALYS_API_URL`, handled by clap's `env` support
//! before values reach this module), and a TOML config file. The file is
//! looked up as:
//!
//! 1. The `--config` path, when given (unreadable is an error).
//! 2. `./qualys-am.toml` (local override).
//! 3. `~/.qualys-am.toml` (per-user defaults).
//!
//! Resolution produces a [`Settings`] value holding the immutable
//! credentials and API base; there is no process-global credential state.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::auth::Credentials;
use crate::client::DEFAULT_API_URL;
use crate::error::{QualysError, Result};

/// Values a config file may supply. Every field is optional; flags and
/// environment variables override whatever is present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Username for basic auth.
    pub username: Option<String>,
    /// Password for basic auth.
    pub password: Option<String>,
    /// API base URL.
    pub api_url: Option<String>,
}

impl FileConfig {
    /// Reads and parses a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| QualysError::Config {
            message: format!("could not read config file {}", path.display()),
            source: Some(Box::new(err)),
        })?;
        Self::parse(&content)
    }

    /// Parses config from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| QualysError::Config {
            message: "could not parse config file".to_string(),
            source: Some(Box::new(err)),
        })
    }

    /// Loads configuration following the lookup cascade.
    ///
    /// An explicit path must exist and parse; that is a user request, not
    /// a default. The cascade locations are optional: a missing file falls
    /// through to the next location, ending at built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = PathBuf::from("qualys-am.toml");
        if local.is_file() {
            return Self::from_file(&local);
        }

        if let Some(home) = dirs::home_dir() {
            let global = home.join(".qualys-am.toml");
            if global.is_file() {
                return Self::from_file(&global);
            }
        }

        Ok(Self::default())
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// The immutable credential pair.
    pub credentials: Credentials,
    /// The API base URL, always ending in a slash.
    pub api_url: String,
}

/// Merges CLI/env values with file config and defaults.
///
/// `username` and `password` are required once all sources are considered;
/// `api_url` falls back to the production default.
pub fn resolve(
    username: Option<String>,
    password: Option<String>,
    api_url: Option<String>,
    file: &FileConfig,
) -> Result<Settings> {
    let username = username
        .or_else(|| file.username.clone())
        .ok_or_else(|| missing("username", "QUALYS_USERNAME"))?;
    let password = password
        .or_else(|| file.password.clone())
        .ok_or_else(|| missing("password", "QUALYS_PASSWORD"))?;
    let api_url = api_url
        .or_else(|| file.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    Ok(Settings {
        credentials: Credentials::new(&username, &password),
        api_url,
    })
}

fn missing(flag: &str, env: &str) -> QualysError {
    QualysError::Config {
        message: format!("{flag} is required: pass --{flag}, set {env}, or add it to the config file"),
        source: None,
    }
}
