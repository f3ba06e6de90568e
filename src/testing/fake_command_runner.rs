use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use crate::domain::AppError;
use crate::ports::{CapturedOutput, CommandRunner, ToolCommand};

#[derive(Debug)]
struct FakeState {
    streamed: Vec<ToolCommand>,
    captured: Vec<ToolCommand>,
    exit_code: Option<i32>,
    version_output: String,
    launch_failure: Option<String>,
    produced_files: Vec<(PathBuf, String)>,
}

/// Recording command runner. Clones share one log.
///
/// A `-out=<file>` argument makes the fake write that file in the command's
/// working directory, the way `terraform plan` does.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct FakeCommandRunner {
    state: Rc<RefCell<FakeState>>,
}

impl Default for FakeCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl FakeCommandRunner {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(FakeState {
                streamed: Vec::new(),
                captured: Vec::new(),
                exit_code: Some(0),
                version_output: "Terraform v0.11.14\n".to_string(),
                launch_failure: None,
                produced_files: Vec::new(),
            })),
        }
    }

    /// Exit code returned by every streamed command from now on.
    pub fn set_exit_code(&self, code: Option<i32>) {
        self.state.borrow_mut().exit_code = code;
    }

    /// Output of captured commands (`terraform version`).
    pub fn set_version_output(&self, output: &str) {
        self.state.borrow_mut().version_output = output.to_string();
    }

    pub fn fail_launch(&self, details: &str) {
        self.state.borrow_mut().launch_failure = Some(details.to_string());
    }

    /// Write `content` to `path` during the next streamed command.
    pub fn produce_on_next_run(&self, path: impl Into<PathBuf>, content: &str) {
        self.state.borrow_mut().produced_files.push((path.into(), content.to_string()));
    }

    pub fn streamed(&self) -> Vec<ToolCommand> {
        self.state.borrow().streamed.clone()
    }

    pub fn captured(&self) -> Vec<ToolCommand> {
        self.state.borrow().captured.clone()
    }

    /// Arguments of every streamed command, joined with spaces.
    pub fn streamed_lines(&self) -> Vec<String> {
        self.streamed().iter().map(|command| command.args.join(" ")).collect()
    }
}

impl CommandRunner for FakeCommandRunner {
    fn stream(&self, command: &ToolCommand) -> Result<Option<i32>, AppError> {
        let mut state = self.state.borrow_mut();
        if let Some(details) = &state.launch_failure {
            return Err(AppError::ToolLaunch {
                program: command.program.clone(),
                details: details.clone(),
            });
        }
        state.streamed.push(command.clone());

        for (path, content) in state.produced_files.drain(..) {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
        }
        if state.exit_code == Some(0) {
            for arg in &command.args {
                if let Some(file) = arg.strip_prefix("-out=") {
                    fs::write(command.cwd.join(file), "fake plan")?;
                }
            }
        }
        Ok(state.exit_code)
    }

    fn capture(&self, command: &ToolCommand) -> Result<CapturedOutput, AppError> {
        let mut state = self.state.borrow_mut();
        state.captured.push(command.clone());
        Ok(CapturedOutput { code: Some(0), stdout: state.version_output.clone(), stderr: String::new() })
    }
}
