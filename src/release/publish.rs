// ABOUTME: ImagePublisher: ships built images to the deploy target.
// ABOUTME: Streams `save | load` over SSH through a bounded conduit, or tags and pushes to a registry.

use snafu::{OptionExt, ResultExt};

use crate::config::RegistryTarget;
use crate::process::{CommandSpec, ProcessRunner};
use crate::ssh::RemoteShell;
use crate::types::{ImageName, RuntimeType};

use super::error::{
    ExportSnafu, ImportSnafu, PublishError, PublishMissingTagSnafu, PushSnafu, StartImportSnafu,
    TagSnafu, TransferSnafu,
};
use super::tag::{TagSet, extract_suffix};

/// Bytes buffered between the local exporter and the remote importer.
pub const CONDUIT_CAPACITY: usize = 64 * 1024;

/// How images reach the target.
#[derive(Clone, Copy)]
pub enum Transport<'a> {
    /// Pipe the image archive into `<runtime> load` on the remote host.
    Ssh(&'a dyn RemoteShell),
    /// Retag and push to a registry.
    Registry(&'a RegistryTarget),
}

pub struct ImagePublisher<'a> {
    runner: &'a dyn ProcessRunner,
    runtime: RuntimeType,
    transport: Transport<'a>,
}

impl<'a> ImagePublisher<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, runtime: RuntimeType, transport: Transport<'a>) -> Self {
        Self {
            runner,
            runtime,
            transport,
        }
    }

    /// Publish each image in order, stopping at the first failure.
    pub async fn publish(&self, images: &[ImageName], tags: &TagSet) -> Result<(), PublishError> {
        for image in images {
            let tag = tags
                .get(image.as_str())
                .context(PublishMissingTagSnafu { image: image.clone() })?;

            match self.transport {
                Transport::Ssh(shell) => self.stream_to_host(shell, image, tag).await?,
                Transport::Registry(target) => self.push_to_registry(target, image, tag).await?,
            }
        }
        Ok(())
    }

    async fn stream_to_host(
        &self,
        shell: &dyn RemoteShell,
        image: &ImageName,
        tag: &str,
    ) -> Result<(), PublishError> {
        tracing::info!("streaming {} to remote host", tag);
        let (sink, source) = tokio::io::duplex(CONDUIT_CAPACITY);

        // The importer must be reading before the exporter produces anything.
        let load = format!("{} load", self.runtime.binary());
        let import = shell
            .start_with_input(&load, source)
            .await
            .context(StartImportSnafu { image: image.clone() })?;

        let save = CommandSpec::new(self.runtime.binary()).args(["save", tag]);
        let export = match self.runner.start_into(&save, sink).await {
            Ok(export) => export,
            Err(source) => {
                import.abort();
                return Err(PublishError::StartExport {
                    image: image.clone(),
                    source,
                });
            }
        };

        let (exported, imported) = tokio::join!(export, import);

        exported
            .context(TransferSnafu {
                image: image.clone(),
                side: "export",
            })?
            .context(ExportSnafu { image: image.clone() })?;

        let output = imported
            .context(TransferSnafu {
                image: image.clone(),
                side: "import",
            })?
            .context(ImportSnafu { image: image.clone() })?;

        if !output.success() {
            return Err(PublishError::ImportExit {
                image: image.clone(),
                code: output.exit_code,
            });
        }

        tracing::debug!("remote load of {}: {}", tag, output.stdout.trim());
        Ok(())
    }

    async fn push_to_registry(
        &self,
        target: &RegistryTarget,
        image: &ImageName,
        tag: &str,
    ) -> Result<(), PublishError> {
        let remote = registry_reference(target, image, tag);
        tracing::info!("pushing {} as {}", tag, remote);

        let retag = CommandSpec::new(self.runtime.binary()).args(["tag", tag, remote.as_str()]);
        self.runner.run(&retag).await.context(TagSnafu {
            image: image.clone(),
            target: remote.clone(),
        })?;

        let push = CommandSpec::new(self.runtime.binary()).args(["push", remote.as_str()]);
        self.runner.run(&push).await.context(PushSnafu {
            image: image.clone(),
            target: remote.clone(),
        })?;
        Ok(())
    }
}

/// `[<host>/]<repository>:<image>-<suffix>`.
pub fn registry_reference(target: &RegistryTarget, image: &ImageName, tag: &str) -> String {
    let reference = format!("{}:{}-{}", target.repository, image, extract_suffix(tag));
    match target.host() {
        Some(host) if !host.is_empty() => format!("{}/{}", host, reference),
        _ => reference,
    }
}
