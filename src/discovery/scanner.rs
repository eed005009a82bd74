//! Walks root directories looking for git repositories.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, trace};

use super::probe::{self, GitDirKind};

/// Deepest directory level below a root that is still inspected.
pub const MAX_SCAN_DEPTH: usize = 15;

/// A main (non-linked) repository found during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRecord {
    pub path: PathBuf,
}

/// Finds every distinct main repository under `root`.
///
/// Linked worktrees resolve to the repository they belong to, so a root
/// holding several checkouts of one repository reports it once. A directory
/// that is itself a checkout is never searched for nested repositories.
/// Unreadable directories are skipped, and a missing root yields nothing.
pub async fn scan_root(root: &Path) -> Vec<RepositoryRecord> {
    let mut seen = HashSet::new();
    scan_root_into(root, &mut seen).await
}

/// Like [`scan_root`], skipping repositories already present in `seen`.
pub async fn scan_root_into(root: &Path, seen: &mut HashSet<PathBuf>) -> Vec<RepositoryRecord> {
    let mut found = Vec::new();

    match fs::metadata(root).await {
        Ok(metadata) if metadata.is_dir() => {}
        _ => {
            debug!(root = %root.display(), "scan: root missing or not a directory");
            return found;
        }
    }

    // Depth-first, visiting children in name order
    let mut stack = vec![(root.to_path_buf(), 0_usize)];
    while let Some((dir, depth)) = stack.pop() {
        if depth > MAX_SCAN_DEPTH {
            continue;
        }

        if let Some(kind) = probe::git_dir_kind(&dir).await {
            let resolved = match kind {
                GitDirKind::Main => probe::canonical_repository(&dir).await,
                GitDirKind::Linked => probe::resolve_main_repository(&dir).await,
            };
            match resolved {
                Some(path) if seen.insert(path.clone()) => {
                    trace!(repo = %path.display(), "scan: found repository");
                    found.push(RepositoryRecord { path });
                }
                Some(_) => {}
                None => debug!(dir = %dir.display(), "scan: unresolvable git link"),
            }
            continue;
        }

        if depth == MAX_SCAN_DEPTH {
            continue;
        }
        let Some(children) = subdirectories(&dir).await else {
            continue;
        };
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }

    found
}

/// Sorted child directories of `dir`, excluding `.git`. Symlinks are not
/// followed. `None` if the directory cannot be read.
async fn subdirectories(dir: &Path) -> Option<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            trace!(dir = %dir.display(), error = %e, "scan: skipping unreadable directory");
            return None;
        }
    };

    let mut children = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(_) => return None,
        };
        if entry.file_name() == ".git" {
            continue;
        }
        if entry.file_type().await.is_ok_and(|kind| kind.is_dir()) {
            children.push(entry.path());
        }
    }
    children.sort();
    Some(children)
}
