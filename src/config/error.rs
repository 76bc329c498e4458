// ABOUTME: Configuration error type.
// ABOUTME: Missing or invalid fields, unreadable files, and target mismatches.

use crate::types::{ContainerNameError, ImageNameError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found in {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is required")]
    MissingField(String),

    #[error("{0}.app_port is required when {0}.port is set")]
    PortWithoutAppPort(String),

    #[error("invalid image name {name:?}: {source}")]
    InvalidImageName {
        name: String,
        #[source]
        source: ImageNameError,
    },

    #[error("invalid container name {name:?}: {source}")]
    InvalidContainerName {
        name: String,
        #[source]
        source: ContainerNameError,
    },

    #[error("container {container} references unknown image {image}")]
    UnknownImage { container: String, image: String },

    #[error("duplicate container name: {0}")]
    DuplicateContainer(String),

    #[error("invalid ssh address: {0}")]
    InvalidAddress(String),

    #[error("deploy.type must be {required} for {command}")]
    WrongTarget {
        command: &'static str,
        required: &'static str,
    },

    #[error("no images configured")]
    NoImages,

    #[error("container: and images: are mutually exclusive")]
    MixedSchema,
}
