// ABOUTME: RemoteShell capability: run a command string on the deploy host.
// ABOUTME: Implemented by Session; tests substitute in-memory fakes.

use super::channel::{CommandOutput, OutputMode, drive_channel};
use super::session::Session;
use super::error::Result;
use async_trait::async_trait;
use tokio::io::DuplexStream;
use tokio::task::JoinHandle;

/// Handle to a remote command that is consuming a conduit.
pub type RemoteTask = JoinHandle<Result<CommandOutput>>;

/// Runs command strings on a remote host.
#[async_trait]
pub trait RemoteShell: Send + Sync {
    /// Run `command` and capture its output.
    async fn exec(&self, command: &str) -> Result<CommandOutput>;

    /// Run `command`, forwarding its output to the local terminal as it arrives.
    async fn exec_streaming(&self, command: &str) -> Result<CommandOutput>;

    /// Start `command` with its stdin fed from `input`.
    ///
    /// Returns once the remote command has been started and is ready to read.
    /// The task resolves when the command exits.
    async fn start_with_input(&self, command: &str, input: DuplexStream) -> Result<RemoteTask>;
}

#[async_trait]
impl RemoteShell for Session {
    async fn exec(&self, command: &str) -> Result<CommandOutput> {
        let channel = self.open_exec(command).await?;
        drive_channel(channel, None, OutputMode::Capture).await
    }

    async fn exec_streaming(&self, command: &str) -> Result<CommandOutput> {
        let channel = self.open_exec(command).await?;
        drive_channel(channel, None, OutputMode::Stream).await
    }

    async fn start_with_input(&self, command: &str, input: DuplexStream) -> Result<RemoteTask> {
        let channel = self.open_exec(command).await?;
        Ok(tokio::spawn(drive_channel(
            channel,
            Some(input),
            OutputMode::Stream,
        )))
    }
}

