//! Transformer Configuration - Descriptive Contract
//!
//! Every transformer ships one of these. The runner reads the description
//! for its help text and the metadata flag to decide whether `--metadata`
//! is mandatory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read configuration file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Descriptive information about a transformer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub transformer_version: Option<String>,
    #[serde(default)]
    pub transformer_description: Option<String>,
    /// Short name; also the key of transformer specific entries in metadata
    #[serde(default)]
    pub transformer_name: Option<String>,
    #[serde(default)]
    pub transformer_sensor: Option<String>,
    /// e.g. `rgbmask`, `plotclipper`
    #[serde(default)]
    pub transformer_type: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub contributors: Vec<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub metadata_needed: Option<MetadataNeeded>,
}

/// The metadata requirement flag accepts `true` as well as `"true"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataNeeded {
    Flag(bool),
    Text(String),
}

impl MetadataNeeded {
    pub fn is_set(&self) -> bool {
        match self {
            MetadataNeeded::Flag(flag) => *flag,
            MetadataNeeded::Text(text) => text.trim().eq_ignore_ascii_case("true"),
        }
    }
}

impl Configuration {
    /// Load a configuration from a JSON, YAML or TOML file (by extension)
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let configuration = match extension.as_deref() {
            Some("yml") | Some("yaml") => serde_yml::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };

        tracing::debug!(path = %path.display(), "Loaded transformer configuration");
        Ok(configuration)
    }

    /// Whether the runner must be given at least one metadata file
    pub fn metadata_needed(&self) -> bool {
        self.metadata_needed
            .as_ref()
            .map_or(false, MetadataNeeded::is_set)
    }
}
