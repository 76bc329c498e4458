// ABOUTME: Build command implementation.
// ABOUTME: Resolves tags and builds every configured image.

use std::path::Path;

use skiff::config::Config;
use skiff::error::Result;
use skiff::process::SystemRunner;
use skiff::release::{BuildPaths, ImageBuilder, TagSet, tag};
use skiff::vcs::Git;

use super::{Context, image_names};

pub async fn build(ctx: &mut Context, tag: Option<&str>, context: &Path) -> Result<()> {
    let config = ctx.load_config()?;
    ctx.output.start_timer();

    // Tags go out as progress; stdout stays empty on success.
    build_images(ctx, &config, tag, context).await?;
    ctx.output.success("Build complete!");
    Ok(())
}

/// Resolve tags and build; shared with `release`.
pub(super) async fn build_images(
    ctx: &Context,
    config: &Config,
    tag: Option<&str>,
    context: &Path,
) -> Result<TagSet> {
    let runner = SystemRunner;
    let revision = Git::new(&runner, &ctx.project_dir);
    let tags = tag::resolve(&image_names(config), tag, &revision).await?;

    ctx.output.progress(&format!(
        "Building {} image(s) for {}",
        tags.len(),
        config.name
    ));
    for (image, tag) in tags.iter() {
        ctx.output.progress(&format!("  → {} as {}", image, tag));
    }

    let paths = BuildPaths::new(&ctx.project_dir, context);
    ImageBuilder::new(&runner, config.runtime)
        .build(&config.images, &tags, &paths)
        .await?;
    Ok(tags)
}
