// ABOUTME: Deploy lock to keep concurrent deploys of a project off the same host.
// ABOUTME: Uses atomic file creation with lock info stored in ~/.local/state/skiff/.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ssh::{RemoteShell, shell_quote};

use super::error::DeployError;

/// Base directory for skiff state files (XDG Base Directory compliant).
const STATE_DIR: &str = ".local/state/skiff";

/// Information about who holds a deploy lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// Project being deployed.
    pub project: String,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new(project: &str) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            project: project.to_string(),
        }
    }

    /// Check if this lock is stale (older than 1 hour).
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= 1
    }

    /// Path to the lock file for a project.
    /// Uses $HOME for shell expansion compatibility.
    pub fn lock_path(project: &str) -> String {
        format!("$HOME/{}/{}.lock", STATE_DIR, project)
    }
}

fn lock_error(message: impl Into<String>) -> DeployError {
    DeployError::Lock {
        message: message.into(),
    }
}

/// A held deploy lock. Call [`DeployLock::release`] when done.
pub struct DeployLock<'a> {
    shell: &'a dyn RemoteShell,
    project: String,
}

impl std::fmt::Debug for DeployLock<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployLock")
            .field("project", &self.project)
            .finish()
    }
}

impl<'a> DeployLock<'a> {
    /// Acquire the deploy lock for `project`.
    ///
    /// Uses shell noclobber mode for atomic acquisition. Fails if the lock is
    /// held, unless it is stale (>1 hour), unreadable, or `force` is set.
    pub async fn acquire(
        shell: &'a dyn RemoteShell,
        project: &str,
        force: bool,
    ) -> Result<Self, DeployError> {
        let lock_path = LockInfo::lock_path(project);

        Self::ensure_state_dir(shell).await?;

        let lock_json = serde_json::to_string(&LockInfo::new(project))
            .map_err(|e| lock_error(format!("failed to serialize lock: {}", e)))?;

        // set -C makes > fail if the file already exists.
        // Double quotes so $HOME expands in the path.
        let acquire_cmd = format!(
            "(set -C; echo {} > \"{}\") 2>/dev/null",
            shell_quote(&lock_json),
            lock_path
        );

        if Self::try_acquire(shell, &acquire_cmd).await? {
            return Ok(Self::held(shell, project));
        }

        if let Some(existing) = Self::existing_lock(shell, &lock_path, force).await? {
            return Err(DeployError::Locked {
                holder: existing.holder,
                pid: existing.pid,
                started_at: existing.started_at,
            });
        }

        tracing::debug!("removing stale or forced lock at {}", lock_path);
        let _ = shell.exec(&format!("rm -f \"{}\"", lock_path)).await;

        if !Self::try_acquire(shell, &acquire_cmd).await? {
            return Err(lock_error("lock acquired by another process during break"));
        }
        Ok(Self::held(shell, project))
    }

    fn held(shell: &'a dyn RemoteShell, project: &str) -> Self {
        Self {
            shell,
            project: project.to_string(),
        }
    }

    async fn try_acquire(shell: &dyn RemoteShell, acquire_cmd: &str) -> Result<bool, DeployError> {
        let output = shell
            .exec(acquire_cmd)
            .await
            .map_err(|e| lock_error(format!("failed to acquire lock: {}", e)))?;
        Ok(output.success())
    }

    async fn ensure_state_dir(shell: &dyn RemoteShell) -> Result<(), DeployError> {
        let output = shell
            .exec(&format!("mkdir -p ~/{}", STATE_DIR))
            .await
            .map_err(|e| lock_error(format!("failed to create state directory: {}", e)))?;

        if !output.success() {
            return Err(lock_error(format!(
                "failed to create state directory: {}",
                output.stderr.trim()
            )));
        }
        Ok(())
    }

    /// The current holder if the lock must be respected, `None` if it may be broken.
    async fn existing_lock(
        shell: &dyn RemoteShell,
        lock_path: &str,
        force: bool,
    ) -> Result<Option<LockInfo>, DeployError> {
        let output = shell
            .exec(&format!("cat \"{}\"", lock_path))
            .await
            .map_err(|e| lock_error(format!("failed to read lock info: {}", e)))?;

        if !output.success() {
            tracing::warn!("lock info unreadable, breaking lock");
            return Ok(None);
        }

        match serde_json::from_str::<LockInfo>(output.stdout.trim()) {
            Ok(existing) if force => {
                tracing::warn!(
                    "breaking lock held by {} (pid {}) since {}",
                    existing.holder,
                    existing.pid,
                    existing.started_at
                );
                Ok(None)
            }
            Ok(existing) if existing.is_stale() => {
                tracing::warn!(
                    "auto-breaking stale lock held by {} (pid {}) since {}",
                    existing.holder,
                    existing.pid,
                    existing.started_at
                );
                Ok(None)
            }
            Ok(existing) => Ok(Some(existing)),
            Err(_) => {
                tracing::warn!("lock info corrupted, breaking lock");
                Ok(None)
            }
        }
    }

    /// Remove the lock file.
    pub async fn release(self) -> Result<(), DeployError> {
        let lock_path = LockInfo::lock_path(&self.project);
        let output = self
            .shell
            .exec(&format!("rm -f \"{}\"", lock_path))
            .await
            .map_err(|e| lock_error(format!("failed to release lock: {}", e)))?;

        if !output.success() {
            return Err(lock_error(format!(
                "failed to release lock: {}",
                output.stderr.trim()
            )));
        }
        Ok(())
    }
}
