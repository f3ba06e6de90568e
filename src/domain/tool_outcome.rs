use std::fmt;

use crate::domain::AppError;

/// Result of running one external tool command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Succeeded,
    /// Non-zero exit. `None` when terminated by a signal.
    Failed { code: Option<i32> },
    /// Non-zero exit from a tool whose installed version is not the pinned one.
    UnsupportedVersion { installed: String, supported: String },
    LaunchFailed { details: String },
    /// The tool ran to completion but forwarding its output failed.
    OutputLost { code: Option<i32>, details: String },
}

impl ToolOutcome {
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => ToolOutcome::Succeeded,
            code => ToolOutcome::Failed { code },
        }
    }

    /// Outcome for a runner error: the tool either never started or its output was lost.
    pub fn from_run_error(err: AppError) -> Self {
        match err {
            AppError::ToolLaunch { details, .. } => ToolOutcome::LaunchFailed { details },
            AppError::ToolOutput { code, details, .. } => ToolOutcome::OutputLost { code, details },
            other => ToolOutcome::LaunchFailed { details: other.to_string() },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Succeeded)
    }

    /// Turn a failed outcome into the matching [`AppError`].
    pub fn into_result(self, tool: &str) -> Result<(), AppError> {
        match self {
            ToolOutcome::Succeeded => Ok(()),
            ToolOutcome::Failed { code } => Err(AppError::ToolFailed {
                tool: tool.to_string(),
                status: exit_status_text(code),
            }),
            ToolOutcome::UnsupportedVersion { installed, supported } => {
                Err(AppError::UnsupportedToolVersion { tool: tool.to_string(), installed, supported })
            }
            ToolOutcome::LaunchFailed { details } => {
                Err(AppError::ToolLaunch { program: tool.to_string(), details })
            }
            ToolOutcome::OutputLost { code, details } => {
                Err(AppError::ToolOutput { program: tool.to_string(), code, details })
            }
        }
    }
}

fn exit_status_text(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

impl fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutcome::Succeeded => f.write_str("succeeded"),
            ToolOutcome::Failed { code } => write!(f, "failed with {}", exit_status_text(*code)),
            ToolOutcome::UnsupportedVersion { installed, supported } => {
                write!(f, "failed; installed version '{}' is not {}", installed, supported)
            }
            ToolOutcome::LaunchFailed { details } => write!(f, "could not be launched: {}", details),
            ToolOutcome::OutputLost { code, details } => write!(
                f,
                "exited with {} but its output was lost: {}",
                exit_status_text(*code),
                details
            ),
        }
    }
}
