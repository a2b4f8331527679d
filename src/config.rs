//! Configuration file loading.
//!
//! Every key is optional:
//!
//! ```toml
//! references_header = "Sources"
//! include_references = true
//! standalone = false
//! official_domains = ["ndis.gov.au", "dss.gov.au"]
//! log_level = "warn"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Rendering and logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Heading placed above the references list
    pub references_header: String,
    /// Whether to append the references list at all
    pub include_references: bool,
    /// Wrap the output in a complete HTML page
    pub standalone: bool,
    /// Domains whose sources are marked as official
    pub official_domains: Vec<String>,
    /// Log level used when neither `RUST_LOG` nor `--verbose` is given
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            references_header: "Sources".to_string(),
            include_references: true,
            standalone: false,
            official_domains: vec![
                "ndis.gov.au".to_string(),
                "dss.gov.au".to_string(),
                "ndiscommission.gov.au".to_string(),
                "ndia.gov.au".to_string(),
            ],
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Loads a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
