//! Obfuscator configuration loaded from a JSON file.
//!
//! A config file is a small JSON document:
//!
//! ```json
//! {
//!     "file_regex": "\\.php$",
//!     "ignore_variables": ["di", "container"]
//! }
//! ```
//!
//! Both fields are optional; unknown fields are rejected so typos fail
//! loudly instead of being silently ignored.

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("could not read config file \"{path}\": {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The file is not valid config JSON.
    #[error("could not parse config file \"{path}\": {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Obfuscation settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Regex deciding which files are obfuscated (default: `\.php$`).
    pub file_regex: Option<String>,
    /// Additional variable names exempt from renaming.
    pub ignore_variables: Vec<String>,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}
