//! Command line arguments shared by every transformer
//!
//! The common flags are a clap derive struct so they can be grafted onto a
//! `Command` that environments and algorithms extend with their own
//! arguments. The positional file list always goes last.

use clap::{Arg, ArgAction, ArgMatches, Args, Command, FromArgMatches};
use std::path::{Path, PathBuf};
use tracing::Level;

pub const FILE_LIST_ARG: &str = "file_list";

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// enable debug logging (default=WARN)
    #[arg(short, long)]
    pub debug: bool,

    /// enable info logging (default=WARN)
    #[arg(short, long)]
    pub info: bool,

    /// Direct the result of a run to one or more of (all is default): "all,file,print"
    #[arg(long, default_value = "all", num_args = 0..=1, default_missing_value = "")]
    pub result: String,

    /// The path to the source metadata
    #[arg(short, long)]
    pub metadata: Vec<PathBuf>,

    /// the folder to use as a workspace and for storing results
    #[arg(short, long = "working_space", default_value = "output")]
    pub working_space: PathBuf,
}

impl CommonArgs {
    pub fn log_level(&self) -> Level {
        if self.debug {
            Level::DEBUG
        } else if self.info {
            Level::INFO
        } else {
            Level::WARN
        }
    }

    /// `None` when an empty working space was requested
    pub fn working_space(&self) -> Option<&Path> {
        if self.working_space.as_os_str().is_empty() {
            None
        } else {
            Some(&self.working_space)
        }
    }
}

/// Parsed arguments for one run
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub common: CommonArgs,
    pub file_list: Vec<String>,
    /// Full matches, for arguments added by environments and algorithms
    pub matches: ArgMatches,
}

impl RunArgs {
    pub fn from_matches(matches: ArgMatches) -> Result<Self, clap::Error> {
        let common = CommonArgs::from_arg_matches(&matches)?;
        let file_list = matches
            .get_many::<String>(FILE_LIST_ARG)
            .map(|files| files.cloned().collect())
            .unwrap_or_default();
        Ok(Self {
            common,
            file_list,
            matches,
        })
    }
}

pub fn add_common_args(command: Command) -> Command {
    CommonArgs::augment_args(command)
}

pub fn add_file_list_arg(command: Command) -> Command {
    command.arg(
        Arg::new(FILE_LIST_ARG)
            .help("additional files, folders, and other information for the transformer")
            .num_args(0..)
            .action(ArgAction::Append),
    )
}
