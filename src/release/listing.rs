// ABOUTME: TagLister: lists the tags of configured images locally or in the registry.
// ABOUTME: Registry tags are stored as `<image>-<suffix>` and shown as `<image>:<suffix>`.

use snafu::ResultExt;

use crate::process::{CommandSpec, ProcessRunner};
use crate::registry::RegistryApi;
use crate::types::{ImageName, RuntimeType};

use super::error::{ListError, LocalImagesSnafu, RegistryTagsSnafu};

/// Local tags of `images`, as `<image>:<tag>`, in image order.
pub async fn local_tags(
    runner: &dyn ProcessRunner,
    runtime: RuntimeType,
    images: &[ImageName],
) -> Result<Vec<String>, ListError> {
    let command = CommandSpec::new(runtime.binary())
        .args(["images", "--format", "{{.Repository}}:{{.Tag}}"]);
    let output = runner.output(&command).await.context(LocalImagesSnafu)?;
    Ok(filter_local(&output, images))
}

/// Lines of `<runtime> images` output that belong to `images`.
pub fn filter_local(output: &str, images: &[ImageName]) -> Vec<String> {
    let lines: Vec<&str> = output.lines().map(str::trim).collect();
    let mut tags = Vec::new();
    for image in images {
        let prefix = format!("{}:", image);
        for line in &lines {
            let Some(tag) = line.strip_prefix(&prefix) else {
                continue;
            };
            if tag.is_empty() || tag == "<none>" {
                continue;
            }
            tags.push(line.to_string());
        }
    }
    tags
}

/// Registry tags of `images` in `repository`, as `<image>:<suffix>`.
pub async fn remote_tags(
    registry: &dyn RegistryApi,
    repository: &str,
    images: &[ImageName],
) -> Result<Vec<String>, ListError> {
    let list = registry
        .list_tags(repository)
        .await
        .context(RegistryTagsSnafu { repository })?;
    Ok(filter_remote(&list.tags, images))
}

pub fn filter_remote(tags: &[String], images: &[ImageName]) -> Vec<String> {
    let mut result = Vec::new();
    for image in images {
        let prefix = format!("{}-", image);
        result.extend(
            tags.iter()
                .filter_map(|tag| tag.strip_prefix(&prefix))
                .filter(|suffix| !suffix.is_empty())
                .map(|suffix| format!("{}:{}", image, suffix)),
        );
    }
    result
}
