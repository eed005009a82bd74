use anyhow::Result;
use std::path::PathBuf;

use super::{CommandContext, find_worktree};
use crate::selection::{SelectionProvider, select_worktree};

/// Prints the path of a worktree so a shell can `cd` into it.
///
/// Without a target the user picks from all discovered worktrees.
///
/// # Errors
/// Returns an error if:
/// - No roots are configured
/// - The target matches no worktree or several
/// - Interactive selection fails
pub async fn pick_worktree(
    ctx: &CommandContext,
    target: Option<&str>,
    provider: &dyn SelectionProvider,
) -> Result<()> {
    let path = resolve_worktree_path(ctx, target, provider, "Pick worktree:").await?;

    // Output just the path
    println!("{}", path.display());
    Ok(())
}

/// Finds the worktree `target` names, or prompts when there is none
pub(crate) async fn resolve_worktree_path(
    ctx: &CommandContext,
    target: Option<&str>,
    provider: &dyn SelectionProvider,
    prompt: &str,
) -> Result<PathBuf> {
    let items = ctx.discover().await?;
    let item = match target {
        Some(target) => find_worktree(&items, target)?,
        None => select_worktree(prompt, &items, provider)?,
    };
    Ok(item.path.clone())
}
