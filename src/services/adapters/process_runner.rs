use std::io::{self, Read, Write};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::domain::AppError;
use crate::ports::{CapturedOutput, CommandRunner, ToolCommand};

/// Runs tools as child processes of the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCommandRunner;

impl ProcessCommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(&self, command: &ToolCommand) -> Command {
        let mut process = Command::new(&command.program);
        process.args(&command.args).current_dir(&command.cwd).envs(&command.env);
        process
    }
}

fn launch_error(command: &ToolCommand, err: io::Error) -> AppError {
    AppError::ToolLaunch { program: command.program.clone(), details: err.to_string() }
}

/// Copy `reader` to `writer` one byte at a time so progress shows live.
///
/// When `writer` fails the rest of `reader` is still drained, so a child
/// writing to the other end of a pipe never blocks.
fn forward_bytes(reader: &mut impl Read, writer: &mut impl Write) -> io::Result<()> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(()),
            Ok(_) => {
                if let Err(err) = writer.write_all(&byte).and_then(|()| writer.flush()) {
                    if let Err(drain) = io::copy(reader, &mut io::sink()) {
                        warn!(error = %drain, "Error draining tool stderr");
                    }
                    return Err(err);
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                warn!(error = %err, "Error reading tool stderr");
                return Ok(());
            }
        }
    }
}

impl CommandRunner for ProcessCommandRunner {
    fn stream(&self, command: &ToolCommand) -> Result<Option<i32>, AppError> {
        debug!(command = %command, cwd = %command.cwd.display(), "Launching tool");

        let mut child = self
            .command(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| launch_error(command, err))?;

        let forwarded = match child.stderr.take() {
            Some(mut stderr) => forward_bytes(&mut stderr, &mut io::stdout()),
            None => Ok(()),
        };

        let status = child.wait()?;
        debug!(command = %command.program, code = ?status.code(), "Tool exited");
        if let Err(err) = forwarded {
            return Err(AppError::ToolOutput {
                program: command.program.clone(),
                code: status.code(),
                details: err.to_string(),
            });
        }
        Ok(status.code())
    }

    fn capture(&self, command: &ToolCommand) -> Result<CapturedOutput, AppError> {
        let output = self
            .command(command)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| launch_error(command, err))?;

        Ok(CapturedOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
