// ABOUTME: Tags command implementation.
// ABOUTME: Lists tags of the configured images from the local runtime or the registry.

use skiff::config::{ConfigError, DeployTarget};
use skiff::error::Result;
use skiff::process::SystemRunner;
use skiff::registry::HttpRegistry;
use skiff::release::listing;

use super::{Context, image_names};

pub async fn tags(ctx: &mut Context, remote: bool) -> Result<()> {
    let config = ctx.load_config()?;
    let images = image_names(&config);

    let tags = if remote {
        let DeployTarget::Registry(ref target) = config.target else {
            return Err(ConfigError::WrongTarget {
                command: "tags --remote",
                required: "registry",
            }
            .into());
        };
        let registry = HttpRegistry::for_target(target)?;
        listing::remote_tags(&registry, &target.repository, &images).await?
    } else {
        listing::local_tags(&SystemRunner, config.runtime, &images).await?
    };

    ctx.output.values("tags", &tags);
    Ok(())
}
