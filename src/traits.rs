use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::git::{GitError, GitOutput, StreamOutcome};

/// Callback receiving progress lines from a running git command.
pub type LogSink<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Trait for invoking git so the core logic can be driven by a mock in tests
#[async_trait]
pub trait GitRunner: Send + Sync {
    /// Runs git to completion in `repo` and captures its output.
    ///
    /// A nonzero exit is not an error here; inspect [`GitOutput::success`].
    ///
    /// # Errors
    /// Returns an error if the process could not be spawned or awaited
    async fn output(&self, repo: &Path, args: &[&str]) -> Result<GitOutput, GitError>;

    /// Runs git in `repo`, forwarding stdout and stderr lines to `log` as they
    /// are produced. Triggering `cancel` kills the process.
    ///
    /// # Errors
    /// Returns an error if the process could not be spawned or awaited
    async fn stream(
        &self,
        repo: &Path,
        args: &[&str],
        log: &(dyn for<'line> Fn(&'line str) + Send + Sync),
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome, GitError>;
}

/// Trait for moving leftover worktree folders somewhere recoverable
#[async_trait]
pub trait TrashBin: Send + Sync {
    /// # Errors
    /// Returns an error if the folder could not be moved
    async fn trash(&self, path: &Path) -> anyhow::Result<()>;
}

/// Moves folders to the platform trash / recycle bin
pub struct SystemTrash;

#[async_trait]
impl TrashBin for SystemTrash {
    async fn trash(&self, path: &Path) -> anyhow::Result<()> {
        // The platform trash APIs block
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || trash::delete(&path)).await??;
        Ok(())
    }
}
