// ABOUTME: ImageBuilder: runs `<runtime> buildx build` once per configured image.
// ABOUTME: Images build in sorted name order and the first failure stops the run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use snafu::{OptionExt, ResultExt};

use crate::config::ImageSpec;
use crate::process::{CommandSpec, ProcessRunner};
use crate::types::{ImageName, RuntimeType};

use super::error::{BuildError, BuildMissingTagSnafu, BuildSnafu};
use super::tag::TagSet;

/// Where a build reads its sources from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    pub project_dir: PathBuf,
    pub context: PathBuf,
}

impl BuildPaths {
    /// `context` is taken relative to `project_dir` unless absolute.
    pub fn new(project_dir: impl Into<PathBuf>, context: impl AsRef<Path>) -> Self {
        let project_dir = project_dir.into();
        let context = project_dir.join(context);
        Self {
            project_dir,
            context,
        }
    }

    fn descriptor(&self, image: &ImageSpec) -> PathBuf {
        self.project_dir.join(&image.dockerfile)
    }
}

pub struct ImageBuilder<'a> {
    runner: &'a dyn ProcessRunner,
    runtime: RuntimeType,
}

impl<'a> ImageBuilder<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, runtime: RuntimeType) -> Self {
        Self { runner, runtime }
    }

    /// Build every image with its resolved tag.
    pub async fn build(
        &self,
        images: &BTreeMap<ImageName, ImageSpec>,
        tags: &TagSet,
        paths: &BuildPaths,
    ) -> Result<(), BuildError> {
        for (name, spec) in images {
            let tag = tags
                .get(name.as_str())
                .context(BuildMissingTagSnafu { image: name.clone() })?;

            tracing::info!("building {} as {}", name, tag);
            let command = build_command(self.runtime, spec, tag, paths);
            self.runner
                .run(&command)
                .await
                .context(BuildSnafu { image: name.clone() })?;
        }
        Ok(())
    }
}

/// The build invocation for one image.
pub fn build_command(
    runtime: RuntimeType,
    image: &ImageSpec,
    tag: &str,
    paths: &BuildPaths,
) -> CommandSpec {
    let mut command = CommandSpec::new(runtime.binary())
        .args(["buildx", "build", "--platform"])
        .arg(&image.target_arch)
        .args(["--tag", tag, "--file"])
        .arg(paths.descriptor(image).display().to_string());

    for (key, value) in build_args(image) {
        command = command.arg("--build-arg").arg(format!("{}={}", key, value));
    }

    command
        .arg(paths.context.display().to_string())
        .current_dir(&paths.project_dir)
}

fn build_args(image: &ImageSpec) -> Vec<(&'static str, String)> {
    let mut args = vec![
        ("BASE_IMAGE", image.base_image.clone()),
        ("INSTALL_CMD", image.install_cmd.clone()),
        ("BUILD_CMD", image.build_cmd.clone()),
        ("START_CMD", image.start_cmd.clone()),
    ];
    if let Some(app_port) = image.app_port {
        args.push(("APP_PORT", app_port.to_string()));
    }
    args
}
