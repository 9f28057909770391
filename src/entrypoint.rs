//! Transformer runner - Single Entry Point
//!
//! Parses the command line, loads metadata, drives the algorithm through
//! check_continue / retrieve_files / perform_process and reports the
//! result. Errors at any stage become an error result; they never escape
//! as panics.

use clap::Command;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::algorithm::{Algorithm, ContinueStatus};
use crate::args::{self, RunArgs};
use crate::configuration::Configuration;
use crate::environment::{Environment, StandardEnvironment};
use crate::error::{TransformerError, PARAMETERS_ERROR_CODE};
use crate::logging::{self, LogFormat};
use crate::metadata::load_metadata_files;
use crate::result::ProcessResult;

pub const RESULT_FILE_NAME: &str = "result.json";

const DEFAULT_COMMAND_NAME: &str = "transformer";

/// Where the run result is sent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultTargets {
    pub print: bool,
    pub file: bool,
}

impl ResultTargets {
    /// Parse a comma separated list of `all`, `file` and `print`
    pub fn parse(spec: &str) -> Self {
        let mut targets = ResultTargets::default();
        for part in spec.split(',').map(str::trim) {
            match part {
                "all" => {
                    targets.print = true;
                    targets.file = true;
                }
                "print" => targets.print = true,
                "file" => targets.file = true,
                "" => {}
                other => tracing::warn!("Ignoring unknown result type '{}'", other),
            }
        }
        targets
    }
}

/// Base command for a transformer, described by its configuration
pub fn build_command(configuration: &Configuration) -> Command {
    let name = configuration
        .transformer_name
        .clone()
        .unwrap_or_else(|| DEFAULT_COMMAND_NAME.to_string());
    let mut command = Command::new(name);
    if let Some(description) = &configuration.transformer_description {
        command = command.about(description.clone());
    }
    if let Some(version) = &configuration.transformer_version {
        command = command.version(version.clone());
    }
    command
}

/// Common arguments, then the environment's, then the algorithm's; the
/// file list comes last
pub fn add_parameters(
    command: Command,
    algorithm: &dyn Algorithm,
    environment: &dyn Environment,
) -> Command {
    let command = args::add_common_args(command);
    let command = environment.add_parameters(command);
    let command = algorithm.add_parameters(command);
    args::add_file_list_arg(command)
}

fn prepare_working_space(working_space: &Path) -> Result<(), TransformerError> {
    if working_space.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(working_space).map_err(|source| {
        tracing::debug!(error = %source, "Error creating working space path");
        TransformerError::WorkingSpace {
            path: working_space.to_path_buf(),
            source,
        }
    })
}

fn load_run_metadata(
    configuration: &Configuration,
    args: &RunArgs,
) -> Result<Vec<Value>, TransformerError> {
    if args.common.metadata.is_empty() {
        if configuration.metadata_needed() {
            return Err(TransformerError::MetadataMissing);
        }
        return Ok(Vec::new());
    }
    load_metadata_files(&args.common.metadata)
}

/// Prepare parameters, check whether to continue, then process
pub fn perform_processing(
    environment: &mut dyn Environment,
    algorithm: &dyn Algorithm,
    args: &RunArgs,
    metadata: &[Value],
) -> ProcessResult {
    let params = match environment.get_transformer_params(args, metadata) {
        Ok(params) => params,
        Err(e) => return ProcessResult::error(Some(PARAMETERS_ERROR_CODE), Some(e.to_string().as_str())),
    };

    match algorithm.check_continue(&*environment, &params) {
        ContinueStatus::Continue => {
            if let Some(outcome) = environment.retrieve_files(args, metadata) {
                if let Err(e) = outcome.check() {
                    return e.into();
                }
            }
        }
        ContinueStatus::Skip { code, message } => {
            tracing::debug!(code, message = ?message, "Skipping file retrieval");
        }
        ContinueStatus::Error { code, message } => {
            tracing::error!(code, message = ?message, "Unknown error returned from check_continue call");
            return ProcessResult {
                code: Some(code),
                error: Some("Unknown error returned from check_continue call".to_string()),
                message,
                ..ProcessResult::default()
            };
        }
    }

    algorithm.perform_process(&*environment, &params)
}

/// Print and/or save the result as requested
pub fn handle_result(
    result: ProcessResult,
    result_types: Option<&str>,
    result_file_path: Option<&Path>,
) -> ProcessResult {
    let Some(result_types) = result_types else {
        return result;
    };
    let targets = ResultTargets::parse(result_types);

    if targets.print {
        match serde_json::to_string_pretty(&result) {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::warn!("Unable to format result for printing: {}", e),
        }
    }

    if targets.file {
        match result_file_path {
            Some(path) => write_result_file(&result, path),
            None => {
                tracing::warn!("Writing result to a file was requested but a file path wasn't provided.");
                tracing::warn!("    Skipping writing to result file.");
            }
        }
    }

    result
}

fn write_result_file(result: &ProcessResult, path: &Path) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::error!("Error while creating result path \"{}\": {}", parent.display(), e);
            tracing::warn!("Unable to create folders, skipping writing to result file");
            return;
        }
    }

    let written = serde_json::to_string_pretty(result)
        .map_err(|e| e.to_string())
        .and_then(|text| fs::write(path, text).map_err(|e| e.to_string()));
    if let Err(e) = written {
        tracing::warn!("Unable to write result file \"{}\": {}", path.display(), e);
    }
}

/// Parse `argv` and execute one run
///
/// Returns the clap error for bad command lines (including `--help`), so
/// the caller decides how to exit.
pub fn do_work<I, T>(
    command: Command,
    environment: &mut dyn Environment,
    algorithm: &dyn Algorithm,
    argv: I,
) -> Result<ProcessResult, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let command = add_parameters(command, algorithm, &*environment);
    let args = RunArgs::from_matches(command.try_get_matches_from(argv)?)?;

    logging::init_logging(args.common.log_level(), LogFormat::from_env());

    if let Some(working_space) = args.common.working_space() {
        if let Err(e) = prepare_working_space(working_space) {
            tracing::warn!("{}", e);
            return Ok(e.into());
        }
    }

    let result = match load_run_metadata(environment.configuration(), &args) {
        Ok(metadata) => perform_processing(environment, algorithm, &args, &metadata),
        Err(e) => e.into(),
    };

    let result_path: Option<PathBuf> = args
        .common
        .working_space()
        .map(|working_space| working_space.join(RESULT_FILE_NAME));

    Ok(handle_result(
        result,
        Some(&args.common.result),
        result_path.as_deref(),
    ))
}

/// Run a transformer with a custom environment using the process arguments
pub fn entrypoint_with_environment(
    environment: &mut dyn Environment,
    algorithm: &dyn Algorithm,
) -> ExitCode {
    let command = build_command(environment.configuration());
    match do_work(command, environment, algorithm, std::env::args_os()) {
        Ok(result) if result.is_error() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => e.exit(),
    }
}

/// Run a transformer with the standard environment using the process arguments
pub fn entrypoint(configuration: Configuration, algorithm: &dyn Algorithm) -> ExitCode {
    let mut environment = StandardEnvironment::new(configuration);
    entrypoint_with_environment(&mut environment, algorithm)
}
