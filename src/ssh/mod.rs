// ABOUTME: SSH access to the deploy host.
// ABOUTME: Exposes the RemoteShell capability and its russh-backed Session.

mod channel;
mod error;
mod quote;
mod session;
mod shell;

pub use channel::CommandOutput;
pub use error::{Error, Result};
pub use quote::{shell_join, shell_quote};
pub use session::{Session, SessionConfig};
pub use shell::{RemoteShell, RemoteTask};
