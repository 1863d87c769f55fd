/// Error types for the upgrade run
use thiserror::Error;

use crate::upgrade::Step;

/// Errors raised by the upgrade sequence
#[derive(Error, Debug)]
pub enum UpgradeError {
    /// An external command ran but exited unsuccessfully
    #[error("{step} failed: {message}")]
    CommandFailed { step: Step, message: String },

    /// An external command could not be started at all
    #[error("{step} failed: could not launch {target}")]
    Launch {
        step: Step,
        /// The program, and the working directory when one was set
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// A required command-line tool is missing
    #[error("{tool} is not installed or not in PATH. Please install from {install_url}")]
    ToolMissing { tool: String, install_url: String },
}

impl UpgradeError {
    /// The step that failed, if the error came from the upgrade sequence
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::CommandFailed { step, .. } | Self::Launch { step, .. } => Some(*step),
            Self::ToolMissing { .. } => None,
        }
    }
}
