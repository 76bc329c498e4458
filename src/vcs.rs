// ABOUTME: Revision capability: the short identifier of the checked-out commit.
// ABOUTME: Backed by `git rev-parse --short HEAD` through a ProcessRunner.

use crate::process::{CommandSpec, ProcessError, ProcessRunner};
use async_trait::async_trait;
use std::path::PathBuf;

/// Supplies the short revision id used in derived tags.
#[async_trait]
pub trait RevisionSource: Send + Sync {
    /// Short revision id, trimmed. May be empty if the tool printed nothing.
    async fn short_revision(&self) -> Result<String, ProcessError>;
}

/// Reads the revision from a git work tree.
pub struct Git<'a> {
    runner: &'a dyn ProcessRunner,
    dir: PathBuf,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            dir: dir.into(),
        }
    }
}

#[async_trait]
impl RevisionSource for Git<'_> {
    async fn short_revision(&self) -> Result<String, ProcessError> {
        let command = CommandSpec::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .current_dir(&self.dir);
        let output = self.runner.output(&command).await?;
        Ok(output.trim().to_string())
    }
}
