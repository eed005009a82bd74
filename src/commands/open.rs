use anyhow::{Context, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use super::CommandContext;
use super::pick::resolve_worktree_path;
use crate::selection::SelectionProvider;

/// Opens a worktree with the configured `open-with` command.
///
/// # Errors
/// Returns an error if:
/// - `open-with` is not configured
/// - The worktree cannot be resolved
/// - The command cannot be started
pub async fn open_worktree(
    ctx: &CommandContext,
    target: Option<&str>,
    provider: &dyn SelectionProvider,
) -> Result<()> {
    let Some(open_with) = ctx
        .preferences
        .open_with
        .as_deref()
        .map(str::trim)
        .filter(|command| !command.is_empty())
    else {
        anyhow::bail!("No `open-with` command configured");
    };

    let path = resolve_worktree_path(ctx, target, provider, "Open worktree:").await?;
    launch(open_with, &path)?;
    println!("Opened {} with {}", path.display(), open_with);
    Ok(())
}

/// Starts `open_with` on `path` without waiting for it. The setting may carry
/// arguments, e.g. `code --new-window`.
fn launch(open_with: &str, path: &Path) -> Result<()> {
    let mut parts = open_with.split_whitespace();
    let program = parts
        .next()
        .context("`open-with` command is empty")?;

    debug!(program, path = %path.display(), "launching editor");
    Command::new(program)
        .args(parts)
        .arg(path)
        .current_dir(path)
        .spawn()
        .with_context(|| format!("Failed to run '{}'", open_with))?;
    Ok(())
}
