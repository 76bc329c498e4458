// ABOUTME: Release pipeline error types with SNAFU context selectors.
// ABOUTME: Every variant names the image or container the failing step worked on.

use chrono::{DateTime, Utc};
use snafu::Snafu;

use crate::config::ConfigError;
use crate::process::ProcessError;
use crate::registry::RegistryError;
use crate::types::{ContainerName, ImageName};

/// Tag resolution failures.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ResolveError {
    #[snafu(display("{source}"))]
    Config { source: ConfigError },

    #[snafu(display("tag with repository only supported with a single image (got {tag:?})"))]
    QualifiedTag { tag: String },

    #[snafu(display("failed to read source revision: {source}"))]
    Revision { source: ProcessError },

    #[snafu(display("source revision is empty"))]
    EmptyRevision,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum BuildError {
    #[snafu(display("no tag resolved for image {image}"))]
    BuildMissingTag { image: ImageName },

    #[snafu(display("build of image {image} failed: {source}"))]
    Build { image: ImageName, source: ProcessError },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PublishError {
    #[snafu(display("no tag resolved for image {image}"))]
    PublishMissingTag { image: ImageName },

    #[snafu(display("failed to start remote load of image {image}: {source}"))]
    StartImport {
        image: ImageName,
        source: crate::ssh::Error,
    },

    #[snafu(display("failed to start export of image {image}: {source}"))]
    StartExport { image: ImageName, source: ProcessError },

    #[snafu(display("export of image {image} failed: {source}"))]
    Export { image: ImageName, source: ProcessError },

    #[snafu(display("remote load of image {image} failed: {source}"))]
    Import {
        image: ImageName,
        source: crate::ssh::Error,
    },

    /// The load's output was already streamed to the terminal.
    #[snafu(display("remote load of image {image} exited with code {code}"))]
    ImportExit { image: ImageName, code: u32 },

    #[snafu(display("{side} task for image {image} did not complete: {source}"))]
    Transfer {
        image: ImageName,
        side: &'static str,
        source: tokio::task::JoinError,
    },

    #[snafu(display("tagging image {image} as {target} failed: {source}"))]
    Tag {
        image: ImageName,
        target: String,
        source: ProcessError,
    },

    #[snafu(display("pushing image {image} to {target} failed: {source}"))]
    Push {
        image: ImageName,
        target: String,
        source: ProcessError,
    },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DeployError {
    #[snafu(display("no tag resolved for image {image} of container {container}"))]
    DeployMissingTag {
        container: ContainerName,
        image: ImageName,
    },

    #[snafu(display("deploy of container {container} failed: {source}"))]
    Remote {
        container: ContainerName,
        source: crate::ssh::Error,
    },

    #[snafu(display("starting container {container} failed with exit code {code}"))]
    Run { container: ContainerName, code: u32 },

    #[snafu(display("deploy lock held by {holder} (pid {pid}) since {started_at}"))]
    Locked {
        holder: String,
        pid: u32,
        started_at: DateTime<Utc>,
    },

    #[snafu(display("deploy lock: {message}"))]
    Lock { message: String },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StatusError {
    #[snafu(display("status query for container {container} failed: {source}"))]
    Query {
        container: ContainerName,
        source: crate::ssh::Error,
    },

    #[snafu(display("status query for container {container} exited with code {code}: {stderr}"))]
    QueryExit {
        container: ContainerName,
        code: u32,
        stderr: String,
    },
}

/// Tag listing failures.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ListError {
    #[snafu(display("listing local images failed: {source}"))]
    LocalImages { source: ProcessError },

    #[snafu(display("listing registry tags for {repository} failed: {source}"))]
    RegistryTags {
        repository: String,
        source: RegistryError,
    },
}
