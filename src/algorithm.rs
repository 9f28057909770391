//! Transformer Algorithm contract
//!
//! Downstream transformers implement `Algorithm`; the runner owns
//! everything else.

use clap::Command;

use crate::check_md::TransformerParams;
use crate::environment::Environment;
use crate::result::ProcessResult;

/// What `check_continue` tells the runner to do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContinueStatus {
    /// Have the environment retrieve files, then process (code 0)
    Continue,
    /// Process without retrieving files (positive code)
    Skip { code: i32, message: Option<String> },
    /// Stop processing (negative code)
    Error { code: i32, message: Option<String> },
}

impl ContinueStatus {
    pub fn from_code(code: i32, message: Option<String>) -> Self {
        match code {
            0 => {
                if let Some(message) = message {
                    tracing::info!("{}", message);
                }
                ContinueStatus::Continue
            }
            code if code > 0 => ContinueStatus::Skip { code, message },
            code => ContinueStatus::Error { code, message },
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ContinueStatus::Continue => 0,
            ContinueStatus::Skip { code, .. } | ContinueStatus::Error { code, .. } => *code,
        }
    }
}

impl From<i32> for ContinueStatus {
    fn from(code: i32) -> Self {
        ContinueStatus::from_code(code, None)
    }
}

impl From<(i32, String)> for ContinueStatus {
    fn from((code, message): (i32, String)) -> Self {
        ContinueStatus::from_code(code, Some(message))
    }
}

impl From<(i32, &str)> for ContinueStatus {
    fn from((code, message): (i32, &str)) -> Self {
        ContinueStatus::from_code(code, Some(message.to_string()))
    }
}

pub trait Algorithm {
    /// Add algorithm specific command line arguments
    fn add_parameters(&self, command: Command) -> Command {
        command
    }

    /// Decide whether there is anything to do for this run
    fn check_continue(
        &self,
        _environment: &dyn Environment,
        _params: &TransformerParams,
    ) -> ContinueStatus {
        ContinueStatus::Continue
    }

    /// Perform the processing of data
    fn perform_process(
        &self,
        environment: &dyn Environment,
        params: &TransformerParams,
    ) -> ProcessResult;
}
