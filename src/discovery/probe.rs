//! Filesystem checks for git metadata.
//!
//! These look only at `.git` entries on disk and never invoke git, so they are
//! cheap enough to run on every directory of a scan.

use std::path::{Path, PathBuf};
use tokio::fs;

const GITDIR_PREFIX: &str = "gitdir:";

/// What a directory's `.git` entry says about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitDirKind {
    /// `.git` is a directory: the primary checkout of a repository
    Main,
    /// `.git` is a `gitdir:` pointer file: a linked worktree
    Linked,
}

/// Classifies `dir`, or returns `None` when it is not a git checkout.
pub async fn git_dir_kind(dir: &Path) -> Option<GitDirKind> {
    let dot_git = dir.join(".git");
    let metadata = fs::metadata(&dot_git).await.ok()?;

    if metadata.is_dir() {
        return Some(GitDirKind::Main);
    }
    if metadata.is_file() {
        let content = fs::read_to_string(&dot_git).await.ok()?;
        if content.starts_with(GITDIR_PREFIX) {
            return Some(GitDirKind::Linked);
        }
    }
    None
}

/// True if `dir` is a main checkout or a linked worktree.
pub async fn is_git_repository(dir: &Path) -> bool {
    git_dir_kind(dir).await.is_some()
}

/// Follows a linked worktree's `.git` file back to the main repository root.
///
/// The pointer leads to a per-worktree git dir (`<repo>/.git/worktrees/<name>`);
/// its `commondir` file, when present, names the shared git dir whose parent
/// is the repository root. Any unreadable or malformed link yields `None`.
pub async fn resolve_main_repository(worktree_dir: &Path) -> Option<PathBuf> {
    let content = fs::read_to_string(worktree_dir.join(".git")).await.ok()?;
    let pointer = content
        .lines()
        .next()?
        .strip_prefix(GITDIR_PREFIX)?
        .trim();
    if pointer.is_empty() {
        return None;
    }

    let git_dir = absolutize(worktree_dir, Path::new(pointer));
    let common_dir = match fs::read_to_string(git_dir.join("commondir")).await {
        Ok(common) => {
            let common = common.trim();
            if common.is_empty() {
                return None;
            }
            absolutize(&git_dir, Path::new(common))
        }
        Err(_) => git_dir,
    };

    let common_dir = fs::canonicalize(&common_dir).await.ok()?;
    common_dir.parent().map(Path::to_path_buf)
}

/// Canonical path of a main repository root, used as its identity
pub async fn canonical_repository(dir: &Path) -> Option<PathBuf> {
    fs::canonicalize(dir).await.ok()
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests use unwrap for simplicity

    use super::*;
    use tempfile::TempDir;

    fn canonical_tempdir() -> (TempDir, PathBuf) {
        let temp = tempfile::tempdir().unwrap();
        let root = std::fs::canonicalize(temp.path()).unwrap();
        (temp, root)
    }

    /// Lays out `<root>/repo/.git/worktrees/feature` and a linked checkout at
    /// `<root>/feature` the way `git worktree add` does.
    fn linked_layout(root: &Path, relative_common: bool) -> (PathBuf, PathBuf) {
        let repo = root.join("repo");
        let admin = repo.join(".git").join("worktrees").join("feature");
        std::fs::create_dir_all(&admin).unwrap();
        let common = if relative_common {
            "../..".to_string()
        } else {
            repo.join(".git").display().to_string()
        };
        std::fs::write(admin.join("commondir"), format!("{common}\n")).unwrap();

        let worktree = root.join("feature");
        std::fs::create_dir_all(&worktree).unwrap();
        std::fs::write(
            worktree.join(".git"),
            format!("gitdir: {}\n", admin.display()),
        )
        .unwrap();
        (repo, worktree)
    }

    #[tokio::test]
    async fn test_git_dir_kind_main_and_linked() {
        let (_temp, root) = canonical_tempdir();
        let (repo, worktree) = linked_layout(&root, true);

        assert_eq!(git_dir_kind(&repo).await, Some(GitDirKind::Main));
        assert_eq!(git_dir_kind(&worktree).await, Some(GitDirKind::Linked));
        assert!(!is_git_repository(&root).await);
    }

    #[tokio::test]
    async fn test_git_file_without_prefix_is_not_a_repository() {
        let (_temp, root) = canonical_tempdir();
        std::fs::write(root.join(".git"), "not a pointer\n").unwrap();

        assert!(!is_git_repository(&root).await);
    }

    #[tokio::test]
    async fn test_resolve_main_repository_relative_commondir() {
        let (_temp, root) = canonical_tempdir();
        let (repo, worktree) = linked_layout(&root, true);

        assert_eq!(resolve_main_repository(&worktree).await, Some(repo));
    }

    #[tokio::test]
    async fn test_resolve_main_repository_absolute_commondir() {
        let (_temp, root) = canonical_tempdir();
        let (repo, worktree) = linked_layout(&root, false);

        assert_eq!(resolve_main_repository(&worktree).await, Some(repo));
    }

    #[tokio::test]
    async fn test_resolve_main_repository_relative_gitdir_without_commondir() {
        let (_temp, root) = canonical_tempdir();
        // Submodule-style pointer straight at a git dir
        let git_dir = root.join("store").join("app.git");
        std::fs::create_dir_all(&git_dir).unwrap();
        let checkout = root.join("checkout");
        std::fs::create_dir_all(&checkout).unwrap();
        std::fs::write(checkout.join(".git"), "gitdir: ../store/app.git\n").unwrap();

        assert_eq!(
            resolve_main_repository(&checkout).await,
            Some(root.join("store"))
        );
    }

    #[tokio::test]
    async fn test_resolve_main_repository_broken_link() {
        let (_temp, root) = canonical_tempdir();
        std::fs::write(root.join(".git"), "gitdir: /definitely/not/here\n").unwrap();

        assert_eq!(resolve_main_repository(&root).await, None);
        assert_eq!(resolve_main_repository(&root.join("missing")).await, None);
    }
}
