//! Metadata loading
//!
//! Metadata documents are JSON, or YAML when the file says so by extension.
//! They are kept as untyped `serde_json::Value`s; the environment decides
//! which members it cares about.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::TransformerError;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Unable to load metadata file '{}'", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to load metadata file '{}'", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unable to load metadata file '{}'", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("Invalid JSON/YAML specified in metadata file \"{}\"", .path.display())]
    Empty { path: PathBuf },
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("yml") || e.eq_ignore_ascii_case("yaml"))
}

/// Load a single metadata document
pub fn load_metadata(path: &Path) -> Result<Value, MetadataError> {
    let result = read_document(path);
    if let Err(e) = &result {
        tracing::error!("{}", e);
        if let Some(source) = std::error::Error::source(e) {
            tracing::error!("Exception caught: {}", source);
        }
    }
    result
}

fn read_document(path: &Path) -> Result<Value, MetadataError> {
    let content = fs::read_to_string(path).map_err(|source| MetadataError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let document: Value = if is_yaml(path) {
        serde_yml::from_str(&content).map_err(|source| MetadataError::Yaml {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_json::from_str(&content).map_err(|source| MetadataError::Json {
            path: path.to_path_buf(),
            source,
        })?
    };

    if document.is_null() {
        return Err(MetadataError::Empty { path: path.to_path_buf() });
    }
    Ok(document)
}

/// Load every metadata file, in order, stopping at the first failure
pub fn load_metadata_files(paths: &[PathBuf]) -> Result<Vec<Value>, TransformerError> {
    let mut documents = Vec::with_capacity(paths.len());

    for path in paths {
        if !path.exists() {
            return Err(TransformerError::MetadataNotFound(path.clone()));
        }
        tracing::info!("Loading metadata from file: '{}'", path.display());
        documents.push(load_metadata(path)?);
    }

    Ok(documents)
}
