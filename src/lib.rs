//! # treescout
//!
//! Finds every git repository and worktree under a set of project roots, and
//! creates or removes worktrees with live git output and cancellation.
//!
//! ## Features
//!
//! - **Root Scanning** - Walks each configured root (up to 15 levels deep) and stops at the first git checkout on every branch of the tree
//! - **Linked Worktree Resolution** - A linked worktree found during the scan leads back to its main repository through `gitdir`/`commondir`
//! - **Unique Results** - Each repository and each worktree path is reported once, even when roots overlap
//! - **Recency Ordering** - Worktrees are sorted by folder modification time, newest first
//! - **Streaming Creation** - `git worktree add` output is forwarded line by line and can be cancelled at any point
//! - **Upstream Tracking** - New branches track their remote counterpart when the base branch has one
//! - **Safe Removal** - Leftover files go to the system trash instead of being deleted
//!
//! ## Quick Start
//!
//! ```bash
//! # List every worktree under ~/code
//! treescout --root ~/code list
//!
//! # Create a worktree for a new branch based on main
//! treescout create my-app feature/auth --base main
//!
//! # Remove it again
//! treescout remove feature/auth
//! ```
//!
//! ## Module Structure
//!
//! - [`commands`] - Command implementations (list, pick, open, create, remove, branches, completions)
//! - [`config`] - Loads `config.toml` preferences: roots, `open-with`, default worktree location
//! - [`discovery`] - Root scanning, gitdir resolution, porcelain parsing and aggregation
//! - [`git`] - Async git subprocess runner with bounded capture, plus branch queries
//! - [`logging`] - `tracing` subscriber setup for the binary
//! - [`mutation`] - Worktree creation and removal
//! - [`selection`] - Abstracts interactive selection prompts for testability
//! - [`traits`] - Defines the `GitRunner` and `TrashBin` seams used by tests

pub mod commands;
pub mod config;
pub mod discovery;
pub mod git;
pub mod logging;
pub mod mutation;
pub mod selection;
pub mod traits;

pub use anyhow::Result;
