//! Repository and worktree discovery.
//!
//! Discovery is recomputed from scratch on every call: [`scanner`] walks each
//! root for repositories, [`lister`] asks git for each repository's worktrees,
//! and [`discover_worktrees`] merges everything into one list ordered with the
//! most recently touched worktree first.
//!
//! Nothing here fails as a whole. A repository git cannot list, a worktree
//! folder deleted behind git's back, or an unreadable directory simply
//! contributes less to the result.

pub mod lister;
pub mod probe;
pub mod scanner;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::fs;
use tracing::debug;

use crate::traits::GitRunner;

/// Branch label shown for worktrees with a detached HEAD
pub const DETACHED_LABEL: &str = "(detached)";

/// A worktree as presented to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeItem {
    pub path: PathBuf,
    pub branch: String,
    /// Folder name of the owning repository
    pub repo_name: String,
    /// True for the repository's primary checkout
    pub is_main: bool,
    pub repo_root: PathBuf,
    /// Modification time in milliseconds since the Unix epoch
    pub last_modified_ms: Option<u64>,
}

impl WorktreeItem {
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.branch == DETACHED_LABEL
    }
}

/// Discovers all worktrees reachable from `roots`.
///
/// Each worktree appears once even when its repository is reachable from
/// several roots; the first occurrence wins.
pub async fn discover_worktrees(git: &dyn GitRunner, roots: &[PathBuf]) -> Vec<WorktreeItem> {
    let mut seen_repos = HashSet::new();
    let mut seen_paths = HashSet::new();
    let mut items = Vec::new();

    for root in roots {
        let repos = scanner::scan_root_into(root, &mut seen_repos).await;
        debug!(root = %root.display(), repos = repos.len(), "discovery: scanned root");

        for repo in repos {
            let lines = lister::list_worktrees(git, &repo.path).await;
            let main_path = lines
                .first()
                .map(|line| absolutize(&repo.path, &line.path));
            let repo_name = repo_name(&repo.path);

            for line in lines {
                let path = absolutize(&repo.path, &line.path);
                if !seen_paths.insert(path.clone()) {
                    continue;
                }

                let last_modified_ms = modified_ms(&path).await;
                items.push(WorktreeItem {
                    is_main: main_path.as_ref() == Some(&path),
                    branch: line.branch.unwrap_or_else(|| DETACHED_LABEL.to_string()),
                    repo_name: repo_name.clone(),
                    repo_root: repo.path.clone(),
                    last_modified_ms,
                    path,
                });
            }
        }
    }

    sort_worktrees(&mut items);
    items
}

/// Most recently modified first, missing timestamps last, then by path.
pub fn sort_worktrees(items: &mut [WorktreeItem]) {
    items.sort_by(|a, b| {
        b.last_modified_ms
            .unwrap_or(0)
            .cmp(&a.last_modified_ms.unwrap_or(0))
            .then_with(|| a.path.cmp(&b.path))
    });
}

#[must_use]
pub fn repo_name(repo_root: &Path) -> String {
    repo_root
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| repo_root.display().to_string())
}

fn absolutize(repo: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo.join(path)
    }
}

async fn modified_ms(path: &Path) -> Option<u64> {
    let modified = fs::metadata(path).await.ok()?.modified().ok()?;
    let since_epoch = modified.duration_since(UNIX_EPOCH).ok()?;
    u64::try_from(since_epoch.as_millis()).ok()
}
