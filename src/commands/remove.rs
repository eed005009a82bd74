use anyhow::Result;

use super::{CommandContext, find_worktree};
use crate::discovery::WorktreeItem;
use crate::mutation;
use crate::selection::{SelectionProvider, select_worktree};
use crate::traits::TrashBin;

/// Removes a linked worktree. Files git leaves behind go to the trash.
///
/// Main checkouts are never offered and are refused when named.
///
/// # Errors
/// Returns an error if:
/// - No roots are configured
/// - The target matches no linked worktree or several
/// - Interactive selection fails
/// - Git fails to remove the worktree
pub async fn remove_worktree(
    ctx: &CommandContext,
    target: Option<&str>,
    provider: &dyn SelectionProvider,
    trash: &dyn TrashBin,
) -> Result<()> {
    let items = ctx.discover().await?;

    if let Some(target) = target {
        if let Ok(found) = find_worktree(&items, target) {
            if found.is_main {
                anyhow::bail!(
                    "{} is the main checkout of {}; only linked worktrees can be removed",
                    found.path.display(),
                    found.repo_name
                );
            }
        }
    }

    let candidates: Vec<WorktreeItem> = items.into_iter().filter(|item| !item.is_main).collect();
    let item = match target {
        Some(target) => find_worktree(&candidates, target)?,
        None => select_worktree("Remove worktree:", &candidates, provider)?,
    };

    println!("Removing worktree: {}", item.path.display());
    println!("Branch: {}", item.branch);

    mutation::remove_worktree(&ctx.git, trash, &item.repo_root, &item.path).await?;

    println!("✓ Worktree removed successfully!");
    Ok(())
}
