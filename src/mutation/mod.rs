//! Creating and removing worktrees.
//!
//! Both operations report through [`MutationResult`]: `Ok(())` on success,
//! otherwise a [`MutationError`] whose message is the full diagnostic to show
//! the user. Cancellation is reported as [`MutationError::Cancelled`], never
//! as a failure.

pub mod create;
pub mod remove;

use thiserror::Error;

pub use create::{CreateRequest, create_from_base, sanitize_worktree_name};
pub use remove::remove_worktree;

pub type MutationResult = Result<(), MutationError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    /// Git failed; holds its captured diagnostic output
    #[error("{0}")]
    Subprocess(String),

    #[error("{0}")]
    Trash(String),

    #[error("Cancelled")]
    Cancelled,
}

/// Well-known git refusals a caller may want to explain specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The branch is already checked out in another worktree
    BranchInUse,
    /// The destination folder already exists
    PathExists,
}

impl MutationError {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Recognises conflicts from git's diagnostic text.
    ///
    /// This is a best-effort match on English messages and may miss wording
    /// from other git versions.
    #[must_use]
    pub fn conflict(&self) -> Option<ConflictKind> {
        let Self::Subprocess(message) = self else {
            return None;
        };
        let message = message.to_lowercase();

        if message.contains("is already checked out at")
            || message.contains("is already used by worktree at")
            || message.contains("a branch named")
        {
            Some(ConflictKind::BranchInUse)
        } else if message.contains("already exists") {
            Some(ConflictKind::PathExists)
        } else {
            None
        }
    }
}
