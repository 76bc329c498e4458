// ABOUTME: Non-fatal problems met while cleaning up after remote work.
// ABOUTME: Collected during a command and reported after its outcome is known.

use std::fmt;

use crate::output::Output;

/// What the cleanup step was doing when it went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleanup {
    /// Removing the remote deploy lock; the lock file may remain.
    LockRelease,
    /// Closing the SSH session.
    Disconnect,
}

impl fmt::Display for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cleanup::LockRelease => "lock release",
            Cleanup::Disconnect => "disconnect",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub step: Cleanup,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.step, self.message)
    }
}

/// Warnings of one command, in the order they happened.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn warn(&mut self, step: Cleanup, message: impl Into<String>) {
        let warning = Warning {
            step,
            message: message.into(),
        };
        tracing::warn!(step = %warning.step, "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Hand every warning to `output`, emptying the collection.
    pub fn report(&mut self, output: &Output) {
        for warning in self.warnings.drain(..) {
            output.warning(&warning.to_string());
        }
    }
}
