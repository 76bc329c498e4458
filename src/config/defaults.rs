// ABOUTME: Default configuration values and the pure function that merges them in.
// ABOUTME: Also migrates the single-image schema onto the named multi-image one.

use super::error::ConfigError;
use super::raw::{RawConfig, RawContainer, RawImage, RawRegistry, RawSsh};
use std::time::Duration;

pub const DEFAULT_NAME: &str = "app";
pub const DEFAULT_BASE_IMAGE: &str = "node:24-alpine";
pub const DEFAULT_TARGET_ARCH: &str = "linux/amd64";
pub const DEFAULT_INSTALL_CMD: &str = "npm ci";
pub const DEFAULT_BUILD_CMD: &str = "npm run build";
pub const DEFAULT_START_CMD: &str = "npm start";
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";
pub const DEFAULT_SSH_PORT: u16 = 22;
pub const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_secs(10);

/// Values used for anything the config file leaves unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub name: String,
    pub base_image: String,
    pub target_arch: String,
    pub install_cmd: String,
    pub build_cmd: String,
    pub start_cmd: String,
    pub dockerfile: String,
    pub ssh_port: u16,
    pub trust_first_connection: bool,
    pub registry_timeout: Duration,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            base_image: DEFAULT_BASE_IMAGE.to_string(),
            target_arch: DEFAULT_TARGET_ARCH.to_string(),
            install_cmd: DEFAULT_INSTALL_CMD.to_string(),
            build_cmd: DEFAULT_BUILD_CMD.to_string(),
            start_cmd: DEFAULT_START_CMD.to_string(),
            dockerfile: DEFAULT_DOCKERFILE.to_string(),
            ssh_port: DEFAULT_SSH_PORT,
            trust_first_connection: true,
            registry_timeout: DEFAULT_REGISTRY_TIMEOUT,
        }
    }
}

impl Defaults {
    /// Merge defaults into `raw` and migrate the single-image schema.
    ///
    /// After this, every image and container field that has a default is set,
    /// the image map is non-empty, and the container list is non-empty.
    /// A file mixing `container:` with `images:` is rejected.
    pub fn apply(&self, mut raw: RawConfig) -> Result<RawConfig, ConfigError> {
        let name = non_empty(raw.name.take()).unwrap_or_else(|| self.name.clone());

        // Single-image schema: the `container:` block is the project's image.
        let legacy = raw.container.take();
        if legacy.is_some() && !raw.images.is_empty() {
            return Err(ConfigError::MixedSchema);
        }
        if raw.images.is_empty() {
            raw.images.insert(name.clone(), legacy.unwrap_or_default());
        }

        raw.images = raw
            .images
            .into_iter()
            .map(|(image_name, image)| (image_name, self.image(image)))
            .collect();

        if raw.deploy.containers.is_empty() {
            raw.deploy.containers = self.implied_containers(&name, &raw);
        }

        let only_image = match raw.images.keys().collect::<Vec<_>>().as_slice() {
            [single] => Some((*single).clone()),
            _ => None,
        };

        let deploy = &raw.deploy;
        let containers = deploy
            .containers
            .iter()
            .cloned()
            .map(|mut container| {
                if container.image.is_none() {
                    container.image = only_image.clone();
                }
                let image = container
                    .image
                    .as_ref()
                    .and_then(|image| raw.images.get(image));

                container.port = nonzero(container.port)
                    .or_else(|| image.and_then(|i| i.port))
                    .or(nonzero(deploy.port));
                container.app_port = nonzero(container.app_port)
                    .or_else(|| image.and_then(|i| i.app_port))
                    .or(nonzero(deploy.app_port));
                container.env_file =
                    non_empty(container.env_file).or_else(|| non_empty(deploy.env_file.clone()));
                if container.networks.is_none() {
                    container.networks = Some(deploy.networks.clone());
                }
                container
            })
            .collect();
        raw.deploy.containers = containers;

        raw.deploy.ssh = raw.deploy.ssh.map(|ssh| match ssh {
            RawSsh::Detailed(mut details) => {
                details.port = nonzero(details.port).or(Some(self.ssh_port));
                details
                    .trust_first_connection
                    .get_or_insert(self.trust_first_connection);
                RawSsh::Detailed(details)
            }
            simple => simple,
        });

        raw.deploy.registry = raw.deploy.registry.map(|registry| RawRegistry {
            timeout: registry.timeout.or(Some(self.registry_timeout)),
            ..registry
        });

        raw.name = Some(name);
        Ok(raw)
    }

    fn image(&self, image: RawImage) -> RawImage {
        RawImage {
            base_image: non_empty(image.base_image).or_else(|| Some(self.base_image.clone())),
            target_arch: non_empty(image.target_arch).or_else(|| Some(self.target_arch.clone())),
            install_cmd: non_empty(image.install_cmd).or_else(|| Some(self.install_cmd.clone())),
            build_cmd: non_empty(image.build_cmd).or_else(|| Some(self.build_cmd.clone())),
            start_cmd: non_empty(image.start_cmd).or_else(|| Some(self.start_cmd.clone())),
            port: nonzero(image.port),
            app_port: nonzero(image.app_port),
            dockerfile: non_empty(image.dockerfile).or_else(|| Some(self.dockerfile.clone())),
        }
    }

    /// One container per image when none are listed: named after the project
    /// for a single image, `<project>-<image>` otherwise.
    fn implied_containers(&self, name: &str, raw: &RawConfig) -> Vec<RawContainer> {
        let single = raw.images.len() == 1;
        raw.images
            .keys()
            .map(|image| RawContainer {
                name: if single {
                    name.to_string()
                } else {
                    format!("{}-{}", name, image)
                },
                image: Some(image.clone()),
                ..Default::default()
            })
            .collect()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// The single-image schema used 0 for "unset".
fn nonzero(value: Option<u16>) -> Option<u16> {
    value.filter(|v| *v != 0)
}
