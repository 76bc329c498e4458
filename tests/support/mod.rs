// ABOUTME: Test support utilities.
// ABOUTME: In-memory fakes of the process, remote shell, revision and registry capabilities.

use parking_lot::Mutex;
use std::sync::{Arc, Once};

// Each test binary only uses some of these modules, so allow dead_code.
#[allow(dead_code)]
pub mod fake_registry;
#[allow(dead_code)]
pub mod fake_runner;
#[allow(dead_code)]
pub mod fake_shell;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("skiff=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Ordered record of what the fakes did, shared between them.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

#[allow(dead_code)]
impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Position of the first event equal to `event`.
    pub fn position(&self, event: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e == event)
    }
}

/// Revision source returning a fixed answer.
#[allow(dead_code)]
pub struct FixedRevision(pub Result<String, i32>);

#[allow(dead_code)]
impl FixedRevision {
    pub fn ok(revision: &str) -> Self {
        Self(Ok(revision.to_string()))
    }

    pub fn failing(code: i32) -> Self {
        Self(Err(code))
    }
}

#[async_trait::async_trait]
impl skiff::vcs::RevisionSource for FixedRevision {
    async fn short_revision(&self) -> Result<String, skiff::process::ProcessError> {
        match &self.0 {
            Ok(rev) => Ok(rev.clone()),
            Err(code) => Err(skiff::process::ProcessError::Failed {
                program: "git".to_string(),
                code: Some(*code),
                stderr: "fatal: not a git repository".to_string(),
            }),
        }
    }
}
