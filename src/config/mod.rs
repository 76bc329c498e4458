// ABOUTME: Configuration types and parsing for skiff.yml.
// ABOUTME: Loads YAML, merges defaults, migrates the single-image schema, validates.

mod defaults;
mod error;
mod init;
mod raw;
mod target;

pub use defaults::Defaults;
pub use error::ConfigError;
pub use init::init_config;
pub use raw::{RawConfig, TargetKind};
pub use target::{DeployTarget, RegistryTarget, SshTarget, expand_user_path};

use crate::types::{ContainerName, ImageName, RuntimeType};
use nonempty::NonEmpty;
use raw::{RawContainer, RawImage, RawSsh};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "skiff.yml";
pub const CONFIG_FILENAME_ALT: &str = "skiff.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".skiff/config.yml";

/// Validated project configuration. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub name: String,
    pub runtime: RuntimeType,
    /// Keyed by name; iteration order is the sorted name order.
    pub images: BTreeMap<ImageName, ImageSpec>,
    pub target: DeployTarget,
    pub containers: NonEmpty<ContainerSpec>,
    /// Take the remote deploy lock around deploys.
    pub lock: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSpec {
    pub base_image: String,
    pub target_arch: String,
    pub install_cmd: String,
    pub build_cmd: String,
    pub start_cmd: String,
    pub port: Option<u16>,
    pub app_port: Option<u16>,
    /// Build descriptor, relative to the project directory.
    pub dockerfile: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: ContainerName,
    pub image: ImageName,
    pub port: Option<u16>,
    pub app_port: Option<u16>,
    pub env_file: Option<String>,
    pub networks: Vec<String>,
}

impl ContainerSpec {
    /// `port:app_port` when both are set.
    pub fn port_mapping(&self) -> Option<String> {
        match (self.port, self.app_port) {
            (Some(port), Some(app_port)) => Some(format!("{}:{}", port, app_port)),
            _ => None,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse(yaml, "configuration")
    }

    fn parse(yaml: &str, origin: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        Self::from_raw(raw, &Defaults::default())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("using config {}", path.display());
                return Self::load(path);
            }
        }

        Err(ConfigError::NotFound(dir.to_path_buf()))
    }

    /// Merge `defaults` into `raw`, then validate into a `Config`.
    pub fn from_raw(raw: RawConfig, defaults: &Defaults) -> Result<Self, ConfigError> {
        let raw = defaults.apply(raw)?;
        let name = raw.name.clone().unwrap_or_default();

        let mut images = BTreeMap::new();
        for (image_name, image) in raw.images {
            let key = ImageName::new(&image_name).map_err(|source| {
                ConfigError::InvalidImageName {
                    name: image_name.clone(),
                    source,
                }
            })?;
            let spec = image_spec(&image_name, image)?;
            images.insert(key, spec);
        }
        if images.is_empty() {
            return Err(ConfigError::NoImages);
        }

        let target = deploy_target(&raw.deploy, defaults)?;

        let mut seen = HashSet::new();
        let containers = raw
            .deploy
            .containers
            .into_iter()
            .map(|container| {
                let spec = container_spec(container, &images)?;
                if !seen.insert(spec.name.clone()) {
                    return Err(ConfigError::DuplicateContainer(spec.name.to_string()));
                }
                Ok(spec)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let containers = NonEmpty::from_vec(containers)
            .ok_or_else(|| ConfigError::MissingField("deploy.containers".to_string()))?;

        Ok(Config {
            name,
            runtime: raw.runtime.unwrap_or_default(),
            images,
            target,
            containers,
            lock: raw.deploy.lock,
        })
    }

    /// The SSH target, or an error naming the command that needs one.
    pub fn ssh_target(&self, command: &'static str) -> Result<&SshTarget, ConfigError> {
        match &self.target {
            DeployTarget::Ssh(ssh) => Ok(ssh),
            DeployTarget::Registry(_) => Err(ConfigError::WrongTarget {
                command,
                required: "ssh",
            }),
        }
    }

    pub fn image(&self, name: &str) -> Option<&ImageSpec> {
        self.images.get(name)
    }
}

fn image_spec(name: &str, image: RawImage) -> Result<ImageSpec, ConfigError> {
    if image.port.is_some() && image.app_port.is_none() {
        return Err(ConfigError::PortWithoutAppPort(format!("images.{}", name)));
    }

    Ok(ImageSpec {
        base_image: image.base_image.unwrap_or_default(),
        target_arch: image.target_arch.unwrap_or_default(),
        install_cmd: image.install_cmd.unwrap_or_default(),
        build_cmd: image.build_cmd.unwrap_or_default(),
        start_cmd: image.start_cmd.unwrap_or_default(),
        port: image.port,
        app_port: image.app_port,
        dockerfile: PathBuf::from(image.dockerfile.unwrap_or_default()),
    })
}

fn container_spec(
    container: RawContainer,
    images: &BTreeMap<ImageName, ImageSpec>,
) -> Result<ContainerSpec, ConfigError> {
    let name = ContainerName::new(&container.name).map_err(|source| {
        ConfigError::InvalidContainerName {
            name: container.name.clone(),
            source,
        }
    })?;

    let image = container.image.ok_or_else(|| {
        ConfigError::MissingField(format!("deploy.containers.{}.image", container.name))
    })?;
    let image = images
        .keys()
        .find(|key| key.as_str() == image)
        .cloned()
        .ok_or_else(|| ConfigError::UnknownImage {
            container: container.name.clone(),
            image: image.clone(),
        })?;

    if container.port.is_some() && container.app_port.is_none() {
        return Err(ConfigError::PortWithoutAppPort(format!(
            "deploy.containers.{}",
            container.name
        )));
    }

    Ok(ContainerSpec {
        name,
        image,
        port: container.port,
        app_port: container.app_port,
        env_file: container.env_file,
        networks: container
            .networks
            .unwrap_or_default()
            .into_iter()
            .filter(|network| !network.trim().is_empty())
            .collect(),
    })
}

fn deploy_target(deploy: &raw::RawDeploy, defaults: &Defaults) -> Result<DeployTarget, ConfigError> {
    let kind = deploy
        .kind
        .ok_or_else(|| ConfigError::MissingField("deploy.type".to_string()))?;

    match kind {
        TargetKind::Ssh => {
            let missing_host = || ConfigError::MissingField("deploy.ssh.host".to_string());
            let target = match deploy.ssh.as_ref().ok_or_else(missing_host)? {
                RawSsh::Simple(address) => SshTarget::parse(address, defaults.ssh_port)?,
                RawSsh::Detailed(details) => {
                    let host = details
                        .host
                        .as_deref()
                        .filter(|h| !h.trim().is_empty())
                        .ok_or_else(missing_host)?;
                    let home = std::env::var("HOME").ok();
                    SshTarget {
                        host: host.to_string(),
                        user: details.user.clone().filter(|u| !u.is_empty()),
                        port: details.port.unwrap_or(defaults.ssh_port),
                        identity_file: details
                            .identity_file
                            .as_deref()
                            .filter(|p| !p.is_empty())
                            .map(|p| expand_user_path(p, home.as_deref())),
                        trust_first_connection: details
                            .trust_first_connection
                            .unwrap_or(defaults.trust_first_connection),
                    }
                }
            };
            Ok(DeployTarget::Ssh(target))
        }
        TargetKind::Registry => {
            let registry = deploy.registry.clone().unwrap_or_default();
            let repository = registry
                .repository
                .filter(|r| !r.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingField("deploy.registry.repository".to_string()))?;
            Ok(DeployTarget::Registry(RegistryTarget {
                registry_url: registry.registry_url.filter(|u| !u.trim().is_empty()),
                repository,
                timeout: registry.timeout.unwrap_or(defaults.registry_timeout),
            }))
        }
    }
}
