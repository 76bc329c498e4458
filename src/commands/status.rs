// ABOUTME: Status command implementation.
// ABOUTME: Prints running, stopped or not found for the configured containers.

use skiff::diagnostics::Diagnostics;
use skiff::error::Result;
use skiff::release::StatusProber;

use super::Context;
use super::session::{connect, disconnect};

pub async fn status(ctx: &mut Context) -> Result<()> {
    let config = ctx.load_config()?;
    let target = config.ssh_target("status")?;

    let mut diag = Diagnostics::default();
    let session = connect(target, &ctx.output).await?;
    let containers: Vec<_> = config.containers.iter().cloned().collect();
    let result = StatusProber::new(&session, config.runtime)
        .status(&containers)
        .await;
    disconnect(session, &mut diag).await;

    diag.report(&ctx.output);
    ctx.output.value("status", &result?.to_string());
    Ok(())
}
