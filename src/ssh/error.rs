// ABOUTME: Errors from reaching the deploy host and running commands on it.
// ABOUTME: Connection and authentication failures name the host they concern.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot reach {host}:{port}: {reason}")]
    Unreachable {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("{user}@{host} rejected every offered key")]
    Rejected { user: String, host: String },

    #[error("no SSH identity available: {0}")]
    NoIdentity(String),

    #[error("failed to load key from {path}: {source}")]
    KeyLoad {
        path: PathBuf,
        #[source]
        source: russh::keys::Error,
    },

    #[error("failed to start remote command: {0}")]
    Exec(#[source] russh::Error),

    #[error("failed to feed remote command input: {0}")]
    Input(String),

    #[error("channel closed unexpectedly without exit status")]
    ChannelClosed,

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
