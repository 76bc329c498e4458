// ABOUTME: Release command implementation.
// ABOUTME: Build, stream to the host and deploy with one set of tags.

use std::path::Path;

use skiff::diagnostics::Diagnostics;
use skiff::error::Result;
use skiff::release::Transport;

use super::Context;
use super::build::build_images;
use super::deploy::deploy_locked;
use super::push::publish_images;
use super::session::{connect, disconnect};

pub async fn release(
    ctx: &mut Context,
    tag: Option<&str>,
    context: &Path,
    force_lock: bool,
) -> Result<()> {
    let config = ctx.load_config()?;
    // Checked before building so a registry config fails fast.
    let target = config.ssh_target("release")?;
    ctx.output.start_timer();

    let tags = build_images(ctx, &config, tag, context).await?;

    let mut diag = Diagnostics::default();
    let session = connect(target, &ctx.output).await?;
    let result = async {
        publish_images(ctx, &config, &tags, Transport::Ssh(&session)).await?;
        deploy_locked(&session, &config, &tags, force_lock, &ctx.output, &mut diag).await
    }
    .await;
    disconnect(session, &mut diag).await;

    diag.report(&ctx.output);
    result?;
    ctx.output.success("Release complete!");
    Ok(())
}
