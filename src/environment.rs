//! Transformer Environment
//!
//! The environment turns the command line and the loaded metadata into the
//! parameters handed to the algorithm. `StandardEnvironment` covers the
//! common case; transformers with special needs implement the trait.

use clap::Command;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::args::RunArgs;
use crate::check_md::{CheckMd, TransformerParams};
use crate::configuration::Configuration;
use crate::error::TransformerError;
use crate::exif;
use crate::timestamp::Timestamp;

pub const UNKNOWN_SEASON: &str = "Season Unknown";
pub const UNKNOWN_EXPERIMENT: &str = "Experiment Unknown";

/// Descriptive metadata about the transformer, attached to its outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerMd {
    pub version: Option<String>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub repository: RepositoryMd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMd {
    #[serde(rename = "repUrl")]
    pub rep_url: Option<String>,
}

impl From<&Configuration> for TransformerMd {
    fn from(configuration: &Configuration) -> Self {
        Self {
            version: configuration.transformer_version.clone(),
            name: configuration.transformer_name.clone(),
            author: configuration.author_name.clone(),
            description: configuration.transformer_description.clone(),
            repository: RepositoryMd {
                rep_url: configuration.repository.clone(),
            },
        }
    }
}

/// Outcome of asking the environment to fetch additional files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveOutcome {
    pub code: i32,
    pub message: Option<String>,
}

impl RetrieveOutcome {
    /// Negative codes are failures; anything else is logged and ignored
    pub fn check(self) -> Result<(), TransformerError> {
        if self.code < 0 {
            let message = self
                .message
                .unwrap_or_else(|| format!("Retrieving files returned a code of {}", self.code));
            return Err(TransformerError::Retrieve {
                code: self.code,
                message,
            });
        }
        if let Some(message) = self.message {
            tracing::info!("{}", message);
        }
        Ok(())
    }
}

pub trait Environment {
    fn configuration(&self) -> &Configuration;

    /// Arguments of the current run, once parameters have been prepared
    fn args(&self) -> Option<&RunArgs> {
        None
    }

    fn generate_transformer_md(&self) -> TransformerMd {
        TransformerMd::from(self.configuration())
    }

    fn add_parameters(&self, command: Command) -> Command {
        command.after_help(epilog(self.configuration()))
    }

    fn get_transformer_params(
        &mut self,
        args: &RunArgs,
        metadata: &[Value],
    ) -> Result<TransformerParams, TransformerError>;

    /// Called when the algorithm asks for files before processing
    fn retrieve_files(&mut self, _args: &RunArgs, _metadata: &[Value]) -> Option<RetrieveOutcome> {
        None
    }
}

fn epilog(configuration: &Configuration) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "unknown".to_string());
    format!(
        "{} version {} author {} {}",
        field(&configuration.transformer_name),
        field(&configuration.transformer_version),
        field(&configuration.author_name),
        field(&configuration.author_email),
    )
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Builds the algorithm parameters from metadata documents and the file list
pub fn build_transformer_params(
    configuration: &Configuration,
    file_list: &[String],
    working_folder: Option<&Path>,
    metadata: &[Value],
) -> TransformerParams {
    let mut timestamp: Option<String> = None;
    let mut season = UNKNOWN_SEASON.to_string();
    let mut experiment = UNKNOWN_EXPERIMENT.to_string();
    let mut full_md = Vec::with_capacity(metadata.len());
    let mut transformer_md = Vec::new();

    for document in metadata {
        // JSON-LD documents wrap the payload in "content", legacy ones in "pipeline"
        let mut parse_md = document.get("content").unwrap_or(document);
        if let Some(pipeline) = parse_md.get("pipeline") {
            parse_md = pipeline;
        }
        full_md.push(parse_md.clone());

        if let Some(value) = parse_md.get("observationTimeStamp") {
            timestamp = Some(value_text(value));
        }
        if let Some(value) = parse_md.get("season") {
            season = value_text(value);
        }
        if let Some(value) = parse_md.get("studyName") {
            experiment = value_text(value);
        }

        let own = configuration
            .transformer_name
            .as_deref()
            .and_then(|name| parse_md.get(name));
        match own {
            Some(Value::Array(entries)) => transformer_md.extend(entries.iter().cloned()),
            Some(entry) => transformer_md.push(entry.clone()),
            None => {}
        }
    }

    let list_files: Vec<String> = file_list
        .iter()
        .filter(|file| !file.starts_with('-'))
        .cloned()
        .collect();

    let timestamp = timestamp.unwrap_or_else(|| {
        list_files
            .iter()
            .fold(None, |current, file| exif::earliest_timestamp(Path::new(file), current))
            .unwrap_or_else(Timestamp::now)
            .to_string()
    });

    TransformerParams {
        check_md: CheckMd {
            timestamp,
            season,
            experiment,
            container_name: None,
            target_container_name: None,
            trigger_name: None,
            context_md: None,
            working_folder: working_folder.map(|folder| folder.display().to_string()),
            list_files,
        },
        transformer_md,
        full_md,
    }
}

/// The stock environment
pub struct StandardEnvironment {
    configuration: Configuration,
    args: Option<RunArgs>,
}

impl StandardEnvironment {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            args: None,
        }
    }

    /// Standard environment for the configuration stored at `path`
    pub fn load(path: &Path) -> Result<Self, TransformerError> {
        let configuration = Configuration::load(path)?;
        Ok(Self::new(configuration))
    }
}

impl Environment for StandardEnvironment {
    fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    fn args(&self) -> Option<&RunArgs> {
        self.args.as_ref()
    }

    fn get_transformer_params(
        &mut self,
        args: &RunArgs,
        metadata: &[Value],
    ) -> Result<TransformerParams, TransformerError> {
        self.args = Some(args.clone());
        Ok(build_transformer_params(
            &self.configuration,
            &args.file_list,
            args.common.working_space(),
            metadata,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::tests::tiff_with_tags;
    use crate::exif::{TAG_DATE_TIME_ORIGINAL, TAG_OFFSET_TIME_ORIGINAL};
    use serde_json::json;

    fn named_configuration() -> Configuration {
        Configuration {
            transformer_name: Some("canopycover".to_string()),
            transformer_version: Some("3.0".to_string()),
            author_name: Some("Plant Lab".to_string()),
            author_email: Some("lab@example.org".to_string()),
            repository: Some("https://example.org/canopycover".to_string()),
            ..Configuration::default()
        }
    }

    #[test]
    fn test_generate_transformer_md() {
        let environment = StandardEnvironment::new(Configuration::default());
        assert_eq!(
            serde_json::to_value(environment.generate_transformer_md()).unwrap(),
            json!({"version": null, "name": null, "author": null, "description": null,
                   "repository": {"repUrl": null}})
        );

        let environment = StandardEnvironment::new(named_configuration());
        let md = environment.generate_transformer_md();
        assert_eq!(md.name.as_deref(), Some("canopycover"));
        assert_eq!(md.repository.rep_url.as_deref(), Some("https://example.org/canopycover"));
    }

    #[test]
    fn test_epilog() {
        assert_eq!(
            epilog(&Configuration::default()),
            "unknown version unknown author unknown unknown"
        );
        assert_eq!(
            epilog(&named_configuration()),
            "canopycover version 3.0 author Plant Lab lab@example.org"
        );
    }

    #[test]
    fn test_params_without_metadata() {
        let params = build_transformer_params(&Configuration::default(), &[], None, &[]);
        assert_eq!(params.check_md.season, UNKNOWN_SEASON);
        assert_eq!(params.check_md.experiment, UNKNOWN_EXPERIMENT);
        assert!(params.check_md.container_name.is_none());
        assert!(params.check_md.list_files().is_empty());
        assert!(params.transformer_md.is_empty());
        assert!(params.full_md.is_empty());
        assert!(Timestamp::parse(&params.check_md.timestamp).is_some());
    }

    #[test]
    fn test_params_unwrap_and_collect() {
        let metadata = vec![
            json!({"content": {"observationTimeStamp": "2019-06-12T10:30:15", "season": "S9"}}),
            json!({"pipeline": {"studyName": "Sorghum", "canopycover": [{"run": 1}, {"run": 2}]}}),
            json!({"season": "S10", "canopycover": {"run": 3}}),
        ];
        let files = vec!["plot.tif".to_string(), "--flag".to_string()];

        let params = build_transformer_params(
            &named_configuration(),
            &files,
            Some(Path::new("/work")),
            &metadata,
        );

        assert_eq!(params.check_md.timestamp, "2019-06-12T10:30:15");
        assert_eq!(params.check_md.season, "S10");
        assert_eq!(params.check_md.experiment, "Sorghum");
        assert_eq!(params.check_md.working_folder(), Some("/work"));
        assert_eq!(params.check_md.list_files(), &["plot.tif".to_string()]);
        assert_eq!(
            params.transformer_md,
            vec![json!({"run": 1}), json!({"run": 2}), json!({"run": 3})]
        );
        assert_eq!(
            params.full_md[0],
            json!({"observationTimeStamp": "2019-06-12T10:30:15", "season": "S9"})
        );
        assert_eq!(params.full_md.len(), 3);
    }

    #[test]
    fn test_timestamp_from_earliest_file() {
        let dir = tempfile::tempdir().unwrap();
        let late = dir.path().join("late.tif");
        let early = dir.path().join("early.tif");
        std::fs::write(&late, tiff_with_tags(&[(TAG_DATE_TIME_ORIGINAL, "2020:07:01 09:00:00")])).unwrap();
        std::fs::write(
            &early,
            tiff_with_tags(&[
                (TAG_DATE_TIME_ORIGINAL, "2020:06:30 08:15:00"),
                (TAG_OFFSET_TIME_ORIGINAL, "+00:00"),
            ]),
        )
        .unwrap();

        let files = vec![
            late.display().to_string(),
            early.display().to_string(),
        ];
        let params = build_transformer_params(&Configuration::default(), &files, None, &[]);
        assert_eq!(params.check_md.timestamp, "2020-06-30T08:15:00+00:00");
    }

    #[test]
    fn test_load_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configuration.json");
        std::fs::write(&path, r#"{"transformer_name": "canopycover", "metadata_needed": "true"}"#).unwrap();

        let environment = StandardEnvironment::load(&path).unwrap();
        assert_eq!(environment.configuration().transformer_name.as_deref(), Some("canopycover"));
        assert!(environment.configuration().metadata_needed());

        let err = StandardEnvironment::load(&dir.path().join("missing.json")).err().unwrap();
        assert!(matches!(err, TransformerError::Config(_)));
        assert_eq!(err.code(), -1);
        assert!(err.to_string().starts_with("Configuration error:"));
    }

    #[test]
    fn test_retrieve_outcome() {
        let err = RetrieveOutcome { code: -5, message: None }.check().unwrap_err();
        assert_eq!(err.code(), -5);
        assert_eq!(err.to_string(), "Retrieving files returned a code of -5");

        assert!(RetrieveOutcome { code: 3, message: Some("fetched".into()) }.check().is_ok());
    }
}
