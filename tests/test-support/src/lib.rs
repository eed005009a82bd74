//! Test support utilities for treescout integration tests
//!
//! This crate builds real git repositories and worktrees inside temporary
//! directories. It's designed to be used only during development and testing,
//! not published.

pub mod test_env;

// Re-export commonly used items for convenience
pub use test_env::{CliTestEnvironment, run_git};
