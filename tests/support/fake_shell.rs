// ABOUTME: FakeShell records remote command strings and answers from canned rules.
// ABOUTME: Its importer drains the conduit into a buffer so tests can inspect the bytes.

use super::EventLog;
use async_trait::async_trait;
use parking_lot::Mutex;
use skiff::ssh::{CommandOutput, Error, RemoteShell, RemoteTask, Result};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, DuplexStream};

/// Canned answer for commands containing a pattern.
#[derive(Debug, Clone)]
enum Reply {
    Output(CommandOutput),
    ChannelClosed,
}

#[derive(Default)]
pub struct FakeShell {
    log: EventLog,
    commands: Mutex<Vec<String>>,
    rules: Mutex<Vec<(String, Reply)>>,
    load_exit: Mutex<u32>,
    received: Arc<Mutex<Vec<u8>>>,
}

pub fn output(exit_code: u32, stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code,
        stdout: stdout.to_string(),
        stderr: if exit_code == 0 {
            String::new()
        } else {
            "simulated remote failure".to_string()
        },
    }
}

impl FakeShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: EventLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Answer commands containing `pattern` with `reply`. First match wins.
    pub fn reply(self, pattern: &str, reply: CommandOutput) -> Self {
        self.rules
            .lock()
            .push((pattern.to_string(), Reply::Output(reply)));
        self
    }

    /// Drop the channel for commands containing `pattern`.
    pub fn cut_off(self, pattern: &str) -> Self {
        self.rules
            .lock()
            .push((pattern.to_string(), Reply::ChannelClosed));
        self
    }

    /// Exit code of the remote `load`.
    pub fn load_exits_with(self, code: u32) -> Self {
        *self.load_exit.lock() = code;
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    /// Everything the remote `load` read from its input.
    pub fn received(&self) -> Vec<u8> {
        self.received.lock().clone()
    }

    fn answer(&self, command: &str) -> Result<CommandOutput> {
        self.commands.lock().push(command.to_string());
        self.log.push(format!("remote: {}", command));

        let rules = self.rules.lock();
        match rules.iter().find(|(pattern, _)| command.contains(pattern.as_str())) {
            Some((_, Reply::Output(out))) => Ok(out.clone()),
            Some((_, Reply::ChannelClosed)) => Err(Error::ChannelClosed),
            None => Ok(CommandOutput::default()),
        }
    }
}

#[async_trait]
impl RemoteShell for FakeShell {
    async fn exec(&self, command: &str) -> Result<CommandOutput> {
        self.answer(command)
    }

    async fn exec_streaming(&self, command: &str) -> Result<CommandOutput> {
        self.answer(command)
    }

    async fn start_with_input(&self, command: &str, mut input: DuplexStream) -> Result<RemoteTask> {
        self.answer(command)?;
        self.log.push("import started");

        let log = self.log.clone();
        let received = Arc::clone(&self.received);
        let exit_code = *self.load_exit.lock();
        Ok(tokio::spawn(async move {
            log.push("import reading");
            let mut buf = Vec::new();
            input.read_to_end(&mut buf).await?;
            received.lock().extend_from_slice(&buf);
            log.push("import finished");
            Ok(output(exit_code, "Loaded image"))
        }))
    }
}
