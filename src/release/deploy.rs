// ABOUTME: RemoteDeployer: replaces each configured container with one running the new tag.
// ABOUTME: Stop and remove are best effort; only the final run decides success.

use snafu::{OptionExt, ResultExt};

use crate::config::ContainerSpec;
use crate::ssh::{RemoteShell, shell_join, shell_quote};
use crate::types::RuntimeType;

use super::error::{DeployError, DeployMissingTagSnafu, RemoteSnafu};
use super::tag::TagSet;

pub struct RemoteDeployer<'a> {
    shell: &'a dyn RemoteShell,
    runtime: RuntimeType,
}

impl<'a> RemoteDeployer<'a> {
    pub fn new(shell: &'a dyn RemoteShell, runtime: RuntimeType) -> Self {
        Self { shell, runtime }
    }

    /// Restart every container in order on its image's tag.
    pub async fn deploy(&self, containers: &[ContainerSpec], tags: &TagSet) -> Result<(), DeployError> {
        for container in containers {
            let tag = tags.get(container.image.as_str()).context(DeployMissingTagSnafu {
                container: container.name.clone(),
                image: container.image.clone(),
            })?;

            tracing::info!("deploying {} on {}", container.name, tag);
            let command = deploy_command(self.runtime, container, tag);
            let output = self
                .shell
                .exec_streaming(&command)
                .await
                .context(RemoteSnafu {
                    container: container.name.clone(),
                })?;

            if !output.success() {
                return Err(DeployError::Run {
                    container: container.name.clone(),
                    code: output.exit_code,
                });
            }
        }
        Ok(())
    }
}

/// The single remote invocation that stops, removes and runs `container`.
pub fn deploy_command(runtime: RuntimeType, container: &ContainerSpec, tag: &str) -> String {
    let rt = runtime.binary();
    let name = container.name.as_str();

    let mapping = container.port_mapping();
    let mut run = vec![rt, "run", "-d", "--name", name];
    if let Some(ref mapping) = mapping {
        run.extend(["-p", mapping.as_str()]);
    }
    if let Some(ref env_file) = container.env_file {
        run.extend(["--env-file", env_file.as_str()]);
    }
    for network in &container.networks {
        run.extend(["--network", network.as_str()]);
    }
    run.push(tag);

    let script = format!(
        "{rt} stop {name} >/dev/null 2>&1 || true; {rt} rm -f {name} >/dev/null 2>&1 || true; {run}",
        rt = shell_quote(rt),
        name = shell_quote(name),
        run = shell_join(&run),
    );
    format!("sh -c {}", shell_quote(&script))
}
