use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::AppError;

/// One external program invocation. Arguments are passed as-is, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Variables layered over the inherited process environment.
    pub env: BTreeMap<String, String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, cwd: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.as_ref().to_path_buf(),
            env: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
        self.env.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Output of a command run to completion with its streams captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Port for launching external tools.
pub trait CommandRunner {
    /// Run `command` to completion with stdout inherited and stderr forwarded
    /// to stdout as it arrives. Returns the exit code, `None` for a signal.
    ///
    /// A program that cannot be started is an [`AppError::ToolLaunch`]; one
    /// whose stderr could not be forwarded is reaped and reported as
    /// [`AppError::ToolOutput`].
    fn stream(&self, command: &ToolCommand) -> Result<Option<i32>, AppError>;

    /// Run `command` to completion and capture both streams.
    fn capture(&self, command: &ToolCommand) -> Result<CapturedOutput, AppError>;
}
