//! Basic transformer - reports the files it was handed
//!
//! Useful for checking a pipeline's wiring: metadata loading, parameter
//! preparation and result reporting all run, nothing is processed.

use std::path::Path;
use std::process::ExitCode;

use agpipeline_core::{
    entrypoint, Algorithm, ContinueStatus, Configuration, Environment, ProcessResult, ResultFile,
    TransformerParams,
};

struct BasicAlgorithm;

impl Algorithm for BasicAlgorithm {
    fn check_continue(&self, _environment: &dyn Environment, params: &TransformerParams) -> ContinueStatus {
        if params.check_md.list_files().is_empty() {
            return ContinueStatus::from((1, "No files were specified"));
        }
        ContinueStatus::Continue
    }

    fn perform_process(&self, environment: &dyn Environment, params: &TransformerParams) -> ProcessResult {
        let transformer_md = serde_json::to_value(environment.generate_transformer_md()).ok();

        let mut result = ProcessResult::success(0)
            .with_message(format!("Found {} file(s)", params.check_md.list_files().len()));
        for file in params.check_md.list_files() {
            let path = Path::new(file);
            if !path.exists() {
                tracing::warn!("Skipping missing file '{}'", file);
                continue;
            }
            result = result.with_file(ResultFile {
                path: file.clone(),
                key: path.extension().map(|e| e.to_string_lossy().to_lowercase()),
                metadata: transformer_md.clone(),
            });
        }
        result
    }
}

fn main() -> ExitCode {
    let configuration = Configuration {
        transformer_name: Some("basic".to_string()),
        transformer_description: Some("Reports the files handed to a transformer".to_string()),
        transformer_version: Some(agpipeline_core::FRAMEWORK_VERSION.to_string()),
        transformer_type: Some("basic".to_string()),
        author_name: Some("AgPipeline".to_string()),
        ..Configuration::default()
    };

    entrypoint(configuration, &BasicAlgorithm)
}
