// ABOUTME: Push command implementation.
// ABOUTME: Ships already built images to the SSH host or the registry.

use skiff::config::{Config, DeployTarget};
use skiff::diagnostics::Diagnostics;
use skiff::error::{Error, Result};
use skiff::process::SystemRunner;
use skiff::release::{ImagePublisher, TagSet, Transport, tag};
use skiff::vcs::Git;

use super::session::{connect, disconnect};
use super::{Context, image_names};

pub async fn push(ctx: &mut Context, tag: Option<&str>) -> Result<()> {
    let tag = tag.ok_or(Error::MissingTag)?;
    let config = ctx.load_config()?;
    ctx.output.start_timer();

    let runner = SystemRunner;
    let revision = Git::new(&runner, &ctx.project_dir);
    let tags = tag::resolve(&image_names(&config), Some(tag), &revision).await?;

    let mut diag = Diagnostics::default();
    let result = match config.target {
        DeployTarget::Ssh(ref target) => {
            let session = connect(target, &ctx.output).await?;
            let result = publish_images(ctx, &config, &tags, Transport::Ssh(&session)).await;
            disconnect(session, &mut diag).await;
            result
        }
        DeployTarget::Registry(ref target) => {
            publish_images(ctx, &config, &tags, Transport::Registry(target)).await
        }
    };

    diag.report(&ctx.output);
    result?;
    ctx.output.success("Push complete!");
    Ok(())
}

/// Publish every image over `transport`; shared with `release`.
pub(super) async fn publish_images(
    ctx: &Context,
    config: &Config,
    tags: &TagSet,
    transport: Transport<'_>,
) -> Result<()> {
    for (image, tag) in tags.iter() {
        ctx.output.progress(&format!("  → Publishing {} ({})", image, tag));
    }
    ImagePublisher::new(&SystemRunner, config.runtime, transport)
        .publish(&image_names(config), tags)
        .await?;
    Ok(())
}
