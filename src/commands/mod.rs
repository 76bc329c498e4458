// ABOUTME: Command module aggregator for the skiff CLI.
// ABOUTME: Holds the per-invocation context and re-exports command handlers.

mod build;
mod deploy;
mod push;
mod release;
mod session;
mod status;
mod tags;

pub use build::build;
pub use deploy::deploy;
pub use push::push;
pub use release::release;
pub use status::status;
pub use tags::tags;

use skiff::config::Config;
use skiff::error::Result;
use skiff::output::Output;
use skiff::types::ImageName;
use std::path::PathBuf;

/// Settings shared by every command of one invocation.
pub struct Context {
    pub project_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    pub output: Output,
}

impl Context {
    /// Load the project config, from `--config` or by discovery.
    pub fn load_config(&self) -> Result<Config> {
        let config = match self.config_path {
            Some(ref path) => Config::load(&self.project_dir.join(path))?,
            None => Config::discover(&self.project_dir)?,
        };
        tracing::debug!(
            "loaded {} ({} image(s), {} container(s), target {})",
            config.name,
            config.images.len(),
            config.containers.len(),
            config.target.kind()
        );
        Ok(config)
    }
}

fn image_names(config: &Config) -> Vec<ImageName> {
    config.images.keys().cloned().collect()
}
