//! Per-run metadata handed to every `Algorithm` call

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckMd {
    pub timestamp: String,
    pub season: String,
    pub experiment: String,
    pub container_name: Option<String>,
    pub target_container_name: Option<String>,
    pub trigger_name: Option<String>,
    pub context_md: Option<String>,
    pub working_folder: Option<String>,
    pub list_files: Vec<String>,
}

impl CheckMd {
    pub fn list_files(&self) -> &[String] {
        &self.list_files
    }

    pub fn working_folder(&self) -> Option<&str> {
        self.working_folder.as_deref()
    }
}

/// Everything an algorithm receives for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerParams {
    pub check_md: CheckMd,
    /// Entries keyed by this transformer's name in earlier runs' metadata
    pub transformer_md: Vec<Value>,
    /// All loaded metadata documents, unwrapped
    pub full_md: Vec<Value>,
}
