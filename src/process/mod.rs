// ABOUTME: Local process execution capability used by build, publish and listing.
// ABOUTME: Streams, captures, or pipes a child's stdout into an in-memory conduit.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Errors from running a local program.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {}", describe_exit(.code))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`{program}` output could not be forwarded: {source}")]
    Pipe {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}

/// A program invocation: binary, arguments and optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
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

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(ref dir) = self.cwd {
            command.current_dir(dir);
        }
        command
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Handle to a started local process writing into a conduit.
pub type LocalTask = JoinHandle<Result<(), ProcessError>>;

/// Runs local programs.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion with stdout/stderr passed through unmodified.
    async fn run(&self, command: &CommandSpec) -> Result<(), ProcessError>;

    /// Run to completion and return captured stdout.
    async fn output(&self, command: &CommandSpec) -> Result<String, ProcessError>;

    /// Start the program with its stdout feeding `sink`.
    ///
    /// Returns once the process is spawned. The returned task completes after
    /// all output has been written, `sink` has been shut down, and the process
    /// has exited.
    async fn start_into(
        &self,
        command: &CommandSpec,
        sink: DuplexStream,
    ) -> Result<LocalTask, ProcessError>;
}

/// `ProcessRunner` backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, command: &CommandSpec) -> Result<(), ProcessError> {
        tracing::debug!("running: {}", command);

        let status = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| ProcessError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ProcessError::Failed {
                program: command.program.clone(),
                code: status.code(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    async fn output(&self, command: &CommandSpec) -> Result<String, ProcessError> {
        tracing::debug!("capturing: {}", command);

        let output = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ProcessError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProcessError::Failed {
                program: command.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn start_into(
        &self,
        command: &CommandSpec,
        mut sink: DuplexStream,
    ) -> Result<LocalTask, ProcessError> {
        tracing::debug!("starting: {}", command);

        let program = command.program.clone();
        let mut child = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.clone(),
                source,
            })?;

        let mut stdout = child.stdout.take().ok_or_else(|| ProcessError::Pipe {
            program: program.clone(),
            source: std::io::Error::other("stdout was not captured"),
        })?;

        Ok(tokio::spawn(async move {
            let copied = tokio::io::copy(&mut stdout, &mut sink).await;
            // Signal EOF to the reader even when the copy failed midway.
            let _ = sink.shutdown().await;
            drop(sink);

            if let Err(source) = copied {
                let _ = child.kill().await;
                return Err(ProcessError::Pipe { program, source });
            }

            let status = child.wait().await.map_err(|source| ProcessError::Pipe {
                program: program.clone(),
                source,
            })?;
            if !status.success() {
                return Err(ProcessError::Failed {
                    program,
                    code: status.code(),
                    stderr: String::new(),
                });
            }
            Ok(())
        }))
    }
}
