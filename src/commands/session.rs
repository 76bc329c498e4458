// ABOUTME: Shared helpers for opening and closing the SSH session to the deploy host.
// ABOUTME: Disconnect failures become warnings instead of failing the command.

use skiff::config::SshTarget;
use skiff::diagnostics::{Cleanup, Diagnostics};
use skiff::error::{Error, Result};
use skiff::output::Output;
use skiff::ssh::Session;

pub async fn connect(target: &SshTarget, output: &Output) -> Result<Session> {
    output.progress(&format!("  → Connecting to {}...", target.host));
    Session::connect(target.session_config())
        .await
        .map_err(|source| Error::Connect {
            host: target.host.clone(),
            source,
        })
}

pub async fn disconnect(session: Session, diag: &mut Diagnostics) {
    let host = session.host().to_string();
    if let Err(e) = session.disconnect().await {
        diag.warn(Cleanup::Disconnect, format!("{}: {}", host, e));
    }
}
