use std::io;

use thiserror::Error;

/// Library-wide error type for drone-deploy operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// No deployment directory exists for the given name.
    #[error("Couldn't find the deployment '{0}'. Run 'drone-deploy list' to see available deployments.")]
    DeploymentNotFound(String),

    /// A deployment directory already exists for the given name.
    #[error("Deployment '{0}' already exists.")]
    DeploymentExists(String),

    /// Deployment name is not usable as a directory name.
    #[error(
        "Invalid deployment name '{0}': must be alphanumeric with hyphens, underscores, or periods"
    )]
    InvalidDeploymentName(String),

    /// The deployment config file could not be parsed.
    #[error("Malformed config file {path}: {details}")]
    ConfigParse { path: String, details: String },

    /// Tool settings (drone-deploy.toml or environment overrides) are invalid.
    #[error("Invalid settings: {0}")]
    Settings(String),

    /// An external tool could not be started at all.
    #[error("Failed to launch '{program}': {details}")]
    ToolLaunch { program: String, details: String },

    /// An external tool ran, but its output could not be forwarded to the terminal.
    #[error("Lost output of '{program}' (exit code {code:?}): {details}")]
    ToolOutput { program: String, code: Option<i32>, details: String },

    /// An external tool ran and exited unsuccessfully.
    #[error("{tool} exited with {status}")]
    ToolFailed { tool: String, status: String },

    /// The installed external tool is not the pinned supported version.
    #[error("Unsupported {tool} version '{installed}' (supported: {supported})")]
    UnsupportedToolVersion { tool: String, installed: String, supported: String },

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(String),

    /// Interactive prompt failed.
    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl AppError {
    /// Provide an `io::ErrorKind`-like view for callers that classify failures.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            AppError::Io(err) => err.kind(),
            AppError::DeploymentNotFound(_) => io::ErrorKind::NotFound,
            AppError::DeploymentExists(_) => io::ErrorKind::AlreadyExists,
            AppError::InvalidDeploymentName(_) | AppError::Settings(_) => {
                io::ErrorKind::InvalidInput
            }
            AppError::ConfigParse { .. } | AppError::Template(_) => io::ErrorKind::InvalidData,
            AppError::ToolLaunch { .. }
            | AppError::ToolOutput { .. }
            | AppError::ToolFailed { .. }
            | AppError::UnsupportedToolVersion { .. }
            | AppError::Prompt(_) => io::ErrorKind::Other,
        }
    }
}
