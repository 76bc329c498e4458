// ABOUTME: Serde shapes of skiff.yml exactly as written by the user.
// ABOUTME: Every field is optional here; defaulting and validation happen later.

use crate::types::RuntimeType;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub runtime: Option<RuntimeType>,

    #[serde(default)]
    pub images: BTreeMap<String, RawImage>,

    /// Single-image schema: the one image of the project.
    #[serde(default)]
    pub container: Option<RawImage>,

    #[serde(default)]
    pub deploy: RawDeploy,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImage {
    #[serde(default)]
    pub base_image: Option<String>,
    #[serde(default)]
    pub target_arch: Option<String>,
    #[serde(default)]
    pub install_cmd: Option<String>,
    #[serde(default)]
    pub build_cmd: Option<String>,
    #[serde(default)]
    pub start_cmd: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub app_port: Option<u16>,
    #[serde(default)]
    pub dockerfile: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Ssh,
    Registry,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDeploy {
    #[serde(default, rename = "type")]
    pub kind: Option<TargetKind>,

    #[serde(default)]
    pub env_file: Option<String>,

    #[serde(default)]
    pub networks: Vec<String>,

    /// Single-image schema: published port, copied onto containers.
    #[serde(default)]
    pub port: Option<u16>,

    /// Single-image schema: application port, copied onto containers.
    #[serde(default)]
    pub app_port: Option<u16>,

    #[serde(default)]
    pub lock: bool,

    #[serde(default)]
    pub ssh: Option<RawSsh>,

    #[serde(default)]
    pub registry: Option<RawRegistry>,

    #[serde(default)]
    pub containers: Vec<RawContainer>,
}

/// `ssh:` accepts either `user@host:port` or a detailed mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSsh {
    Simple(String),
    Detailed(RawSshDetails),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSshDetails {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub identity_file: Option<String>,
    #[serde(default)]
    pub trust_first_connection: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRegistry {
    #[serde(default)]
    pub registry_url: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContainer {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub app_port: Option<u16>,
    #[serde(default)]
    pub env_file: Option<String>,
    #[serde(default)]
    pub networks: Option<Vec<String>>,
}
