use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{MutationError, MutationResult};
use crate::discovery::probe;
use crate::git::StreamOutcome;
use crate::git::branches::{has_local_branch, upstream_ref};
use crate::traits::{GitRunner, LogSink};

/// Remote new branches are set to track
const TRACKING_REMOTE: &str = "origin";

/// Inputs for [`create_from_base`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    /// Main repository the worktree belongs to
    pub repo: PathBuf,
    /// Desired branch name, sanitized before use
    pub name: String,
    /// Folder the worktree is checked out into
    pub destination: PathBuf,
    /// Branch a new branch starts from
    pub base: String,
}

/// Makes free text usable as a branch and folder name by replacing path
/// separators with `-`.
#[must_use]
pub fn sanitize_worktree_name(name: &str) -> String {
    name.trim().replace(['/', '\\'], "-")
}

/// Creates a worktree for `request.name`, creating the branch from
/// `request.base` when it does not exist yet.
///
/// An existing local branch is attached as-is. A new branch starts from the
/// base branch's upstream when it has one, and afterwards is pointed at
/// `origin/<name>` on a best-effort basis. Progress lines from git go to
/// `log`; triggering `cancel` stops at the next checkpoint or kills the
/// running git process.
///
/// # Errors
/// Returns an error if:
/// - The repository does not exist or is not a git repository
/// - The base branch or the sanitized name is blank
/// - `git worktree add` fails
/// - The operation is cancelled
pub async fn create_from_base(
    git: &dyn GitRunner,
    request: &CreateRequest,
    log: LogSink<'_>,
    cancel: &CancellationToken,
) -> MutationResult {
    let repo = request.repo.as_path();
    if !probe::is_git_repository(repo).await {
        return Err(MutationError::NotFound("Repository not found".to_string()));
    }
    let base = request.base.trim();
    if base.is_empty() {
        return Err(MutationError::Validation(
            "Base branch is required".to_string(),
        ));
    }
    let name = sanitize_worktree_name(&request.name);
    if name.is_empty() {
        return Err(MutationError::Validation(
            "Worktree name is required".to_string(),
        ));
    }
    let destination = request.destination.to_string_lossy();

    checkpoint(cancel)?;
    let branch_exists = has_local_branch(git, repo, &name).await;
    checkpoint(cancel)?;

    if branch_exists {
        log(&format!(
            "Branch '{name}' already exists, checking it out at {destination}"
        ));
        run_git(git, repo, &["worktree", "add", &destination, &name], log, cancel).await?;
        info!(repo = %repo.display(), branch = %name, path = %destination, "Attached worktree to existing branch");
        return Ok(());
    }

    let start_point = upstream_ref(git, repo, base)
        .await
        .unwrap_or_else(|| base.to_string());
    checkpoint(cancel)?;

    log(&format!("Creating branch '{name}' from {start_point}"));
    run_git(
        git,
        repo,
        &["worktree", "add", "-b", &name, &destination, &start_point],
        log,
        cancel,
    )
    .await?;
    info!(repo = %repo.display(), branch = %name, start_point = %start_point, path = %destination, "Created worktree");

    // The worktree exists now; cancellation only skips the advisory step
    if cancel.is_cancelled() {
        debug!(branch = %name, "cancelled before upstream configuration");
        return Ok(());
    }
    configure_upstream(git, repo, &name, log).await;
    Ok(())
}

fn checkpoint(cancel: &CancellationToken) -> MutationResult {
    if cancel.is_cancelled() {
        Err(MutationError::Cancelled)
    } else {
        Ok(())
    }
}

async fn run_git(
    git: &dyn GitRunner,
    repo: &Path,
    args: &[&str],
    log: LogSink<'_>,
    cancel: &CancellationToken,
) -> MutationResult {
    match git.stream(repo, args, log, cancel).await {
        Ok(StreamOutcome::Exited { code: Some(0), .. }) => Ok(()),
        Ok(StreamOutcome::Exited { code, captured }) => {
            Err(MutationError::Subprocess(failure_message(code, &captured)))
        }
        Ok(StreamOutcome::Cancelled) => Err(MutationError::Cancelled),
        Err(e) => Err(MutationError::Subprocess(e.to_string())),
    }
}

pub(crate) fn failure_message(code: Option<i32>, captured: &str) -> String {
    let captured = captured.trim();
    if !captured.is_empty() {
        return captured.to_string();
    }
    match code {
        Some(code) => format!("git exited with code {code}"),
        None => "git was terminated by a signal".to_string(),
    }
}

/// Points `branch` at `origin/<branch>`. Never fails the creation: when
/// neither the direct command nor the config fallback works, it only logs.
async fn configure_upstream(git: &dyn GitRunner, repo: &Path, branch: &str, log: LogSink<'_>) {
    let target = format!("{TRACKING_REMOTE}/{branch}");

    let set_upstream = format!("--set-upstream-to={target}");
    if succeeded(git, repo, &["branch", &set_upstream, branch]).await {
        log(&format!("Branch '{branch}' now tracks {target}"));
        return;
    }

    // The remote branch usually does not exist until the first push
    let remote_key = format!("branch.{branch}.remote");
    let merge_key = format!("branch.{branch}.merge");
    let merge_ref = format!("refs/heads/{branch}");
    if succeeded(git, repo, &["config", &remote_key, TRACKING_REMOTE]).await
        && succeeded(git, repo, &["config", &merge_key, &merge_ref]).await
    {
        log(&format!("Branch '{branch}' will track {target} once pushed"));
        return;
    }

    debug!(branch, %target, "upstream configuration failed");
    log(&format!(
        "Note: could not set upstream {target} for '{branch}'; set it when pushing"
    ));
}

async fn succeeded(git: &dyn GitRunner, repo: &Path, args: &[&str]) -> bool {
    git.output(repo, args)
        .await
        .is_ok_and(|output| output.success())
}
