use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

use super::{MutationError, MutationResult};
use crate::traits::{GitRunner, TrashBin};

/// Unregisters the worktree at `worktree` from `repo_root` and deletes it.
///
/// Anything git leaves behind (untracked build output, ignored files) is
/// moved to the trash rather than deleted permanently. Callers must not pass
/// the main worktree; a path equal to `repo_root` is refused.
///
/// # Errors
/// Returns an error if:
/// - `worktree` is the repository's main checkout
/// - `git worktree remove` fails
/// - Leftover files could not be moved to the trash
pub async fn remove_worktree(
    git: &dyn GitRunner,
    trash: &dyn TrashBin,
    repo_root: &Path,
    worktree: &Path,
) -> MutationResult {
    if worktree == repo_root {
        return Err(MutationError::Validation(
            "The main worktree cannot be removed".to_string(),
        ));
    }

    let target = worktree.to_string_lossy();
    let output = git
        .output(repo_root, &["worktree", "remove", &target, "--force"])
        .await
        .map_err(|e| MutationError::Subprocess(format!("Failed to remove worktree: {e}")))?;

    if !output.success() {
        let mut parts = vec!["Failed to remove worktree".to_string()];
        parts.extend(
            [output.stderr.trim(), output.stdout.trim()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .map(str::to_string),
        );
        return Err(MutationError::Subprocess(parts.join("\n")));
    }

    if fs::metadata(worktree).await.is_ok() {
        warn!(path = %worktree.display(), "worktree folder left behind, moving to trash");
        trash.trash(worktree).await.map_err(|e| {
            MutationError::Trash(format!(
                "Worktree was unregistered but {} could not be moved to the trash: {e}",
                worktree.display()
            ))
        })?;
    }

    info!(repo = %repo_root.display(), path = %worktree.display(), "Removed worktree");
    Ok(())
}
