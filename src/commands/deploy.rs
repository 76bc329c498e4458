// ABOUTME: Deploy command implementation.
// ABOUTME: Restarts the configured containers on a tag, under the remote lock when enabled.

use skiff::config::Config;
use skiff::diagnostics::{Cleanup, Diagnostics};
use skiff::error::Result;
use skiff::output::Output;
use skiff::process::SystemRunner;
use skiff::release::{DeployLock, RemoteDeployer, TagSet, tag};
use skiff::ssh::Session;
use skiff::vcs::Git;

use super::session::{connect, disconnect};
use super::{Context, image_names};

pub async fn deploy(ctx: &mut Context, tag: &str, force_lock: bool) -> Result<()> {
    let config = ctx.load_config()?;
    let target = config.ssh_target("deploy")?;
    ctx.output.start_timer();

    let runner = SystemRunner;
    let revision = Git::new(&runner, &ctx.project_dir);
    let tags = tag::resolve(&image_names(&config), Some(tag), &revision).await?;

    let mut diag = Diagnostics::default();
    let session = connect(target, &ctx.output).await?;
    let result = deploy_locked(&session, &config, &tags, force_lock, &ctx.output, &mut diag).await;
    disconnect(session, &mut diag).await;

    diag.report(&ctx.output);
    result?;
    ctx.output.success("Deployment complete!");
    Ok(())
}

/// Deploy every container, holding the remote lock when the config asks for it.
pub(super) async fn deploy_locked(
    session: &Session,
    config: &Config,
    tags: &TagSet,
    force_lock: bool,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<()> {
    let lock = if config.lock {
        output.progress("  → Acquiring deploy lock...");
        Some(DeployLock::acquire(session, &config.name, force_lock).await?)
    } else {
        None
    };

    let containers: Vec<_> = config.containers.iter().cloned().collect();
    for container in &containers {
        output.progress(&format!("  → Restarting {}", container.name));
    }
    let result = RemoteDeployer::new(session, config.runtime)
        .deploy(&containers, tags)
        .await;

    if let Some(lock) = lock
        && let Err(e) = lock.release().await
    {
        diag.warn(Cleanup::LockRelease, e.to_string());
    }

    result?;
    Ok(())
}
