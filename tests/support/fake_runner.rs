// ABOUTME: FakeRunner records local commands and answers them from canned rules.
// ABOUTME: Its exporter writes a payload into the conduit, optionally slowly or failing.

use super::EventLog;
use async_trait::async_trait;
use parking_lot::Mutex;
use skiff::process::{CommandSpec, LocalTask, ProcessError, ProcessRunner};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, DuplexStream};

/// How `start_into` behaves.
#[derive(Debug, Clone, Default)]
pub struct Export {
    pub payload: Vec<u8>,
    /// Sleep before writing anything.
    pub delay: Duration,
    /// Exit non-zero after writing the payload.
    pub fail: bool,
    /// Refuse to start at all.
    pub fail_to_start: bool,
}

#[derive(Default)]
pub struct FakeRunner {
    log: EventLog,
    calls: Mutex<Vec<CommandSpec>>,
    fail_when: Mutex<Vec<String>>,
    output: Mutex<String>,
    export: Mutex<Export>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: EventLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Fail any command whose rendered line contains `pattern`.
    pub fn fail_when(self, pattern: &str) -> Self {
        self.fail_when.lock().push(pattern.to_string());
        self
    }

    /// Stdout returned by `output`.
    pub fn with_output(self, output: &str) -> Self {
        *self.output.lock() = output.to_string();
        self
    }

    pub fn with_export(self, export: Export) -> Self {
        *self.export.lock() = export;
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().clone()
    }

    /// Rendered command lines, in call order.
    pub fn lines(&self) -> Vec<String> {
        self.calls.lock().iter().map(ToString::to_string).collect()
    }

    fn record(&self, command: &CommandSpec) -> Result<(), ProcessError> {
        self.calls.lock().push(command.clone());
        let line = command.to_string();
        self.log.push(format!("local: {}", line));

        if self.fail_when.lock().iter().any(|p| line.contains(p.as_str())) {
            return Err(ProcessError::Failed {
                program: command.program.clone(),
                code: Some(1),
                stderr: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(&self, command: &CommandSpec) -> Result<(), ProcessError> {
        self.record(command)
    }

    async fn output(&self, command: &CommandSpec) -> Result<String, ProcessError> {
        self.record(command)?;
        Ok(self.output.lock().clone())
    }

    async fn start_into(
        &self,
        command: &CommandSpec,
        mut sink: DuplexStream,
    ) -> Result<LocalTask, ProcessError> {
        let export = self.export.lock().clone();
        if export.fail_to_start {
            return Err(ProcessError::Spawn {
                program: command.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            });
        }
        self.record(command)?;
        self.log.push("export started");

        let log = self.log.clone();
        let program = command.program.clone();
        Ok(tokio::spawn(async move {
            if !export.delay.is_zero() {
                tokio::time::sleep(export.delay).await;
            }
            log.push("export writing");
            let written = sink.write_all(&export.payload).await;
            let _ = sink.shutdown().await;
            drop(sink);
            log.push("export finished");

            if let Err(source) = written {
                return Err(ProcessError::Pipe { program, source });
            }
            if export.fail {
                return Err(ProcessError::Failed {
                    program,
                    code: Some(1),
                    stderr: String::new(),
                });
            }
            Ok(())
        }))
    }
}
