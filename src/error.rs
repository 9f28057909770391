//! Transformer run errors and their numeric result codes

use std::path::PathBuf;
use thiserror::Error;

use crate::configuration::ConfigError;
use crate::metadata::MetadataError;

/// Code used when an error is reported without one
pub const DEFAULT_ERROR_CODE: i32 = -1;

/// Code for any failure while preparing the algorithm's parameters
pub const PARAMETERS_ERROR_CODE: i32 = -104;

#[derive(Debug, Error)]
pub enum TransformerError {
    #[error("No metadata paths were specified.")]
    MetadataMissing,

    #[error("Unable to access metadata file '{}'", .0.display())]
    MetadataNotFound(PathBuf),

    #[error("{0}")]
    MetadataLoad(#[from] MetadataError),

    #[error("Error while creating working space path \"{}\"", .path.display())]
    WorkingSpace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Parameters { message: String },

    #[error("{message}")]
    Retrieve { code: i32, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TransformerError {
    /// Numeric code reported in the run result
    pub fn code(&self) -> i32 {
        match self {
            TransformerError::MetadataMissing => -1,
            TransformerError::MetadataNotFound(_) => -2,
            TransformerError::MetadataLoad(_) => -3,
            TransformerError::WorkingSpace { .. } => -10,
            TransformerError::Parameters { .. } => PARAMETERS_ERROR_CODE,
            TransformerError::Retrieve { code, .. } => *code,
            TransformerError::Config(_) => DEFAULT_ERROR_CODE,
        }
    }

    pub fn parameters(message: impl Into<String>) -> Self {
        TransformerError::Parameters { message: message.into() }
    }
}
