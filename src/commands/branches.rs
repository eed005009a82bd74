use anyhow::Result;

use super::CommandContext;
use crate::git::branches::{default_remote, list_branches};

/// Prints the branch names a new worktree can be based on, one per line.
/// The remote new branches will track goes to stderr.
///
/// # Errors
/// Returns an error if the repository cannot be resolved
pub async fn list_repository_branches(ctx: &CommandContext, repo: &str) -> Result<()> {
    let repo = ctx.resolve_repository(repo).await?;
    for branch in list_branches(&ctx.git, &repo).await {
        println!("{}", branch);
    }
    if let Some(remote) = default_remote(&ctx.git, &repo).await {
        eprintln!("Default remote: {}", remote);
    }
    Ok(())
}
