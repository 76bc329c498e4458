// ABOUTME: StatusProber: asks the remote runtime about each configured container.
// ABOUTME: Folds per-container states into running, stopped or not found.

use std::fmt;

use serde::Serialize;
use snafu::ResultExt;

use crate::config::ContainerSpec;
use crate::ssh::{RemoteShell, shell_join};
use crate::types::{ContainerName, RuntimeType};

use super::error::{QuerySnafu, StatusError};

/// State of one container on the remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerState {
    Running,
    Stopped,
    NotFound,
}

/// Summary over all configured containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Running,
    Stopped,
    NotFound,
}

impl Status {
    /// Any running wins, then any stopped, else not found.
    pub fn aggregate<I>(states: I) -> Self
    where
        I: IntoIterator<Item = ContainerState>,
    {
        let mut found = false;
        for state in states {
            match state {
                ContainerState::Running => return Status::Running,
                ContainerState::Stopped => found = true,
                ContainerState::NotFound => {}
            }
        }
        if found {
            Status::Stopped
        } else {
            Status::NotFound
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Running => "running",
            Status::Stopped => "stopped",
            Status::NotFound => "not found",
        })
    }
}

pub struct StatusProber<'a> {
    shell: &'a dyn RemoteShell,
    runtime: RuntimeType,
}

impl<'a> StatusProber<'a> {
    pub fn new(shell: &'a dyn RemoteShell, runtime: RuntimeType) -> Self {
        Self { shell, runtime }
    }

    /// Probe every container and aggregate.
    pub async fn status(&self, containers: &[ContainerSpec]) -> Result<Status, StatusError> {
        let mut states = Vec::with_capacity(containers.len());
        for container in containers {
            let state = self.container_state(&container.name).await?;
            tracing::debug!("container {} is {:?}", container.name, state);
            states.push(state);
        }
        Ok(Status::aggregate(states))
    }

    pub async fn container_state(&self, name: &ContainerName) -> Result<ContainerState, StatusError> {
        if !self.query(name, false).await?.is_empty() {
            return Ok(ContainerState::Running);
        }
        if !self.query(name, true).await?.is_empty() {
            return Ok(ContainerState::Stopped);
        }
        Ok(ContainerState::NotFound)
    }

    async fn query(&self, name: &ContainerName, all: bool) -> Result<String, StatusError> {
        let command = status_command(self.runtime, name, all);
        let output = self
            .shell
            .exec(&command)
            .await
            .context(QuerySnafu {
                container: name.clone(),
            })?;

        if !output.success() {
            return Err(StatusError::QueryExit {
                container: name.clone(),
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout.trim().to_string())
    }
}

/// `<rt> ps [-a] --filter name=^N$ --format {{.Status}}`.
pub fn status_command(runtime: RuntimeType, name: &ContainerName, all: bool) -> String {
    let filter = format!("name=^{}$", name);
    let mut args = vec![runtime.binary(), "ps"];
    if all {
        args.push("-a");
    }
    args.extend(["--filter", filter.as_str(), "--format", "{{.Status}}"]);
    shell_join(&args)
}
