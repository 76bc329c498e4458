// ABOUTME: Library root for skiff - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod process;
pub mod registry;
pub mod release;
pub mod ssh;
pub mod types;
pub mod vcs;
