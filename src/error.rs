// ABOUTME: Application-wide error type for skiff.
// ABOUTME: Wraps config, pipeline, SSH and registry failures under one thiserror enum.

use thiserror::Error;

use crate::config::ConfigError;
use crate::registry::RegistryError;
use crate::release::{BuildError, DeployError, ListError, PublishError, ResolveError, StatusError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("resolve: {0}")]
    Resolve(#[from] ResolveError),

    #[error("build: {0}")]
    Build(#[from] BuildError),

    #[error("publish: {0}")]
    Publish(#[from] PublishError),

    #[error("deploy: {0}")]
    Deploy(#[from] DeployError),

    #[error("status: {0}")]
    Status(#[from] StatusError),

    #[error("tags: {0}")]
    List(#[from] ListError),

    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("ssh connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: crate::ssh::Error,
    },

    #[error("a tag is required")]
    MissingTag,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
