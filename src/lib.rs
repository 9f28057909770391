//! AgPipeline Core - Transformer Base
//!
//! A transformer is three things:
//! 1. A `Configuration` describing it
//! 2. An `Algorithm` doing the work (the only part most transformers write)
//! 3. An `Environment` preparing each run's parameters
//!
//! `entrypoint` wires them to the command line, loads metadata and reports
//! the result to stdout and `<working_space>/result.json`.

pub mod algorithm;
pub mod args;
pub mod check_md;
pub mod configuration;
pub mod entrypoint;
pub mod environment;
pub mod error;
pub mod exif;
pub mod logging;
pub mod metadata;
pub mod result;
pub mod timestamp;

pub use algorithm::{Algorithm, ContinueStatus};
pub use args::{CommonArgs, RunArgs};
pub use check_md::{CheckMd, TransformerParams};
pub use configuration::{ConfigError, Configuration, MetadataNeeded};
pub use entrypoint::{do_work, entrypoint, entrypoint_with_environment, handle_result, perform_processing};
pub use environment::{Environment, RetrieveOutcome, StandardEnvironment, TransformerMd};
pub use error::TransformerError;
pub use result::{ProcessResult, ResultFile};
pub use timestamp::Timestamp;

pub const FRAMEWORK_VERSION: &str = env!("CARGO_PKG_VERSION");
