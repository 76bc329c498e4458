// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates a skiff.yml template in the project directory.

use std::path::{Path, PathBuf};

use crate::types::ImageName;

use super::defaults::{
    DEFAULT_BASE_IMAGE, DEFAULT_BUILD_CMD, DEFAULT_INSTALL_CMD, DEFAULT_NAME, DEFAULT_START_CMD,
    DEFAULT_TARGET_ARCH,
};
use super::{CONFIG_FILENAME, ConfigError};

/// Write a template config to `dir`, returning its path.
pub fn init_config(dir: &Path, name: Option<&str>, force: bool) -> Result<PathBuf, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(ConfigError::AlreadyExists(config_path));
    }

    let name = name.unwrap_or(DEFAULT_NAME);
    // The project name doubles as the image name.
    ImageName::new(name).map_err(|source| ConfigError::InvalidImageName {
        name: name.to_string(),
        source,
    })?;

    std::fs::write(&config_path, template_yaml(name)).map_err(|source| ConfigError::Write {
        path: config_path.clone(),
        source,
    })?;

    Ok(config_path)
}

fn template_yaml(name: &str) -> String {
    format!(
        r#"name: {name}
runtime: docker
images:
  {name}:
    base_image: {DEFAULT_BASE_IMAGE}
    target_arch: {DEFAULT_TARGET_ARCH}
    install_cmd: {DEFAULT_INSTALL_CMD}
    build_cmd: {DEFAULT_BUILD_CMD}
    start_cmd: {DEFAULT_START_CMD}
    port: 80
    app_port: 3000
deploy:
  type: ssh
  ssh:
    host: example.com
    user: deploy
    # identity_file: ~/.ssh/id_ed25519
    # Set to false once the host key is in ~/.ssh/known_hosts
    trust_first_connection: true
  # Serialize deploys from several machines with a remote lock file
  # lock: true
  # env_file: /srv/{name}.env
  # networks: [web]
"#
    )
}
