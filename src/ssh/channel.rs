// ABOUTME: Drives one exec channel to completion.
// ABOUTME: Feeds optional stdin from a conduit and captures or forwards the command's output.

use super::error::{Error, Result};
use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

/// Largest chunk of input sent in one data message.
const INPUT_CHUNK: usize = 32 * 1024;

/// SSH extended data type for stderr.
const EXTENDED_STDERR: u32 = 1;

/// Exit status and output of a remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: u32,
    /// Empty when the output was streamed.
    pub stdout: String,
    /// Empty when the output was streamed.
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Where a channel's output goes while the command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputMode {
    /// Buffer stdout and stderr into the returned `CommandOutput`.
    Capture,
    /// Copy both to the local stderr as they arrive. Local stdout is
    /// reserved for command results.
    Stream,
}

/// Run the channel until the remote command has exited.
///
/// With `input`, its bytes become the command's stdin and EOF is sent once
/// the conduit is exhausted.
pub(crate) async fn drive_channel(
    mut channel: Channel<Msg>,
    mut input: Option<DuplexStream>,
    mode: OutputMode,
) -> Result<CommandOutput> {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut exit_status = None;
    let mut eof = false;
    let mut feeding = input.is_some();
    let mut buf = vec![0u8; INPUT_CHUNK];

    loop {
        tokio::select! {
            read = read_input(input.as_mut(), &mut buf), if feeding => {
                let n = read.map_err(|e| Error::Input(e.to_string()))?;
                if n == 0 {
                    feeding = false;
                    channel.eof().await.map_err(|e| Error::Input(e.to_string()))?;
                } else {
                    channel
                        .data(&buf[..n])
                        .await
                        .map_err(|e| Error::Input(e.to_string()))?;
                }
            }

            msg = channel.wait() => match msg {
                Some(ChannelMsg::Data { data }) => collect(mode, &mut stdout, &data).await?,
                Some(ChannelMsg::ExtendedData { data, ext: EXTENDED_STDERR }) => {
                    collect(mode, &mut stderr, &data).await?
                }
                Some(ChannelMsg::ExitStatus { exit_status: code }) => {
                    exit_status = Some(code);
                    if eof {
                        break;
                    }
                }
                Some(ChannelMsg::Eof) => {
                    eof = true;
                    if exit_status.is_some() {
                        break;
                    }
                }
                Some(ChannelMsg::Close) | None => break,
                Some(_) => {}
            }
        }
    }

    // Without an exit status the channel was cut off, the command did not finish.
    let exit_code = exit_status.ok_or(Error::ChannelClosed)?;

    Ok(CommandOutput {
        exit_code,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}

async fn collect(mode: OutputMode, buffer: &mut Vec<u8>, data: &[u8]) -> Result<()> {
    match mode {
        OutputMode::Capture => buffer.extend_from_slice(data),
        OutputMode::Stream => {
            let mut err = tokio::io::stderr();
            err.write_all(data).await?;
            err.flush().await?;
        }
    }
    Ok(())
}

async fn read_input(input: Option<&mut DuplexStream>, buf: &mut [u8]) -> std::io::Result<usize> {
    match input {
        Some(reader) => reader.read(buf).await,
        None => Ok(0),
    }
}
