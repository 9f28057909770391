//! Run results
//!
//! Whatever `perform_process` returns ends up in `result.json` and on
//! stdout. Everything other than the well known members is passed through
//! untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TransformerError, DEFAULT_ERROR_CODE};

/// A file produced by the transformer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFile {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file: Vec<ResultFile>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProcessResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    /// An error result; processing stops once one of these is produced
    pub fn error(code: Option<i32>, message: Option<&str>) -> Self {
        let code = code.unwrap_or_else(|| {
            tracing::warn!("An error has occurred without a return code specified, setting default return code");
            DEFAULT_ERROR_CODE
        });
        let message = match message {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => {
                tracing::warn!("An error has occurred without a message, setting default message");
                format!("An error has occurred with error code ({})", code)
            }
        };

        tracing::error!("{}", message);
        tracing::error!("Stopping processing");

        Self {
            code: Some(code),
            error: Some(message),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_file(mut self, file: ResultFile) -> Self {
        self.file.push(file);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl From<TransformerError> for ProcessResult {
    fn from(err: TransformerError) -> Self {
        ProcessResult::error(Some(err.code()), Some(err.to_string().as_str()))
    }
}
