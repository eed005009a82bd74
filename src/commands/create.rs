use anyhow::{Context, Result};
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::CommandContext;
use crate::config::expand_tilde;
use crate::discovery::repo_name;
use crate::git::branches::list_branches;
use crate::mutation::{ConflictKind, CreateRequest, MutationError, create_from_base, sanitize_worktree_name};
use crate::selection::{SelectionProvider, require_non_blank};

/// Options for `treescout create`
#[derive(Debug, Default, Clone, Copy)]
pub struct CreateOptions<'a> {
    pub repo: &'a str,
    pub name: Option<&'a str>,
    pub base: Option<&'a str>,
    pub path: Option<&'a str>,
}

/// Creates a worktree for a new or existing branch, streaming git's output
/// to stderr. Ctrl-C stops git and abandons the creation.
///
/// # Errors
/// Returns an error if:
/// - The repository cannot be resolved
/// - Interactive input fails
/// - Creating the worktree fails or is cancelled
pub async fn create_worktree(
    ctx: &CommandContext,
    options: CreateOptions<'_>,
    provider: &dyn SelectionProvider,
) -> Result<()> {
    let repo = ctx.resolve_repository(options.repo).await?;

    let name = match options.name {
        Some(name) => name.to_string(),
        None => provider.get_text_input("Worktree name:", Some(require_non_blank))?,
    };
    let base = match options.base {
        Some(base) => base.to_string(),
        None => select_base(ctx, &repo, provider).await?,
    };

    let destination = match options.path {
        Some(path) => expand_tilde(path),
        None => ctx
            .preferences
            .worktree_destination(&repo_name(&repo), &sanitize_worktree_name(&name)),
    };

    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create parent directory: {}", parent.display()))?;
    }

    println!(
        "Creating worktree '{}' from '{}' at: {}",
        name,
        base,
        destination.display()
    );

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let request = CreateRequest {
        repo,
        name,
        destination: destination.clone(),
        base,
    };
    let result = create_from_base(
        &ctx.git,
        &request,
        &|line: &str| eprintln!("  {}", line),
        &cancel,
    )
    .await;
    interrupt.abort();

    if let Err(e) = result {
        return Err(describe_failure(e, &destination));
    }

    if cancel.is_cancelled() {
        println!("Interrupted after git finished; upstream tracking was skipped.");
    }
    println!("✓ Worktree created successfully!");
    println!("  Branch: {}", sanitize_worktree_name(&request.name));
    println!("  Path: {}", destination.display());

    Ok(())
}

async fn select_base(
    ctx: &CommandContext,
    repo: &Path,
    provider: &dyn SelectionProvider,
) -> Result<String> {
    let branches = list_branches(&ctx.git, repo).await;
    if branches.is_empty() {
        return provider.get_text_input("Base branch:", Some(require_non_blank));
    }
    provider.select("Base branch:", branches)
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        eprintln!("\nCancelling...");
        cancel.cancel();
    }
}

fn describe_failure(error: MutationError, destination: &Path) -> anyhow::Error {
    match error.conflict() {
        Some(ConflictKind::BranchInUse) => anyhow::anyhow!(
            "{}\nHint: that branch is already checked out in another worktree; pick a different name.",
            error
        ),
        Some(ConflictKind::PathExists) => anyhow::anyhow!(
            "{}\nHint: {} already exists; pass --path to choose another location.",
            error,
            destination.display()
        ),
        None => anyhow::Error::new(error),
    }
}
