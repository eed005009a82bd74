//! Reads `git worktree list --porcelain` for one repository.

use std::path::{Path, PathBuf};
use tracing::warn;

use crate::traits::GitRunner;

/// One worktree record from the porcelain listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeLine {
    pub path: PathBuf,
    /// Short branch name, `None` for a detached HEAD
    pub branch: Option<String>,
    pub is_bare: bool,
}

/// Lists the worktrees git knows for `repo`, primary checkout first.
/// Failures yield an empty list.
pub async fn list_worktrees(git: &dyn GitRunner, repo: &Path) -> Vec<WorktreeLine> {
    match git.output(repo, &["worktree", "list", "--porcelain"]).await {
        Ok(output) if output.success() => parse_porcelain(&output.stdout),
        Ok(output) => {
            warn!(repo = %repo.display(), stderr = %output.stderr.trim(), "worktree listing failed");
            Vec::new()
        }
        Err(e) => {
            warn!(repo = %repo.display(), error = %e, "worktree listing failed");
            Vec::new()
        }
    }
}

#[derive(Default)]
struct PartialLine {
    path: Option<String>,
    branch: Option<String>,
    is_bare: bool,
}

impl PartialLine {
    /// Records without a usable path are dropped
    fn finish(self) -> Option<WorktreeLine> {
        let path = self.path.filter(|p| !p.is_empty())?;
        Some(WorktreeLine {
            path: PathBuf::from(path),
            branch: self.branch,
            is_bare: self.is_bare,
        })
    }
}

/// Parses porcelain output into records, in the order git printed them.
pub fn parse_porcelain(stdout: &str) -> Vec<WorktreeLine> {
    let mut lines = Vec::new();
    let mut current: Option<PartialLine> = None;

    for line in stdout.lines() {
        if let Some(path) = line.strip_prefix("worktree ") {
            if let Some(done) = current.take().and_then(PartialLine::finish) {
                lines.push(done);
            }
            current = Some(PartialLine {
                path: Some(path.to_string()),
                ..PartialLine::default()
            });
        } else if let Some(branch) = line.strip_prefix("branch ") {
            if let Some(record) = current.as_mut() {
                let short = branch.strip_prefix("refs/heads/").unwrap_or(branch);
                record.branch = Some(short.to_string());
            }
        } else if line.starts_with("bare") {
            if let Some(record) = current.as_mut() {
                record.is_bare = true;
            }
        } else if line.trim().is_empty() {
            if let Some(done) = current.take().and_then(PartialLine::finish) {
                lines.push(done);
            }
        }
    }

    if let Some(done) = current.and_then(PartialLine::finish) {
        lines.push(done);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::MockGit;

    #[test]
    fn test_parse_porcelain_main_and_linked() {
        let stdout = "\
worktree /work/app
HEAD 1a2b3c4d5e6f
branch refs/heads/main

worktree /work/app-feature
HEAD 9f8e7d6c5b4a
branch refs/heads/feature/login

worktree /work/app-detached
HEAD 0011223344
detached

";
        let lines = parse_porcelain(stdout);
        assert_eq!(
            lines,
            vec![
                WorktreeLine {
                    path: PathBuf::from("/work/app"),
                    branch: Some("main".to_string()),
                    is_bare: false,
                },
                WorktreeLine {
                    path: PathBuf::from("/work/app-feature"),
                    branch: Some("feature/login".to_string()),
                    is_bare: false,
                },
                WorktreeLine {
                    path: PathBuf::from("/work/app-detached"),
                    branch: None,
                    is_bare: false,
                },
            ]
        );
    }

    #[test]
    fn test_parse_porcelain_bare_without_trailing_blank() {
        let stdout = "worktree /srv/app.git\nbare\n\nworktree /srv/app-main\nHEAD abc\nbranch refs/heads/main";
        let lines = parse_porcelain(stdout);

        assert_eq!(lines.len(), 2);
        assert!(lines[0].is_bare);
        assert_eq!(lines[0].branch, None);
        assert_eq!(lines[1].path, PathBuf::from("/srv/app-main"));
        assert_eq!(lines[1].branch.as_deref(), Some("main"));
    }

    #[test]
    fn test_parse_porcelain_ignores_orphan_attributes() {
        let stdout = "branch refs/heads/stray\nbare\n\nworktree \n\n";
        assert!(parse_porcelain(stdout).is_empty());
    }

    #[tokio::test]
    async fn test_list_worktrees_failure_is_empty() {
        let git = MockGit::new().fail(
            "worktree list --porcelain",
            128,
            "fatal: not a git repository",
        );
        assert!(list_worktrees(&git, Path::new("/tmp/nowhere")).await.is_empty());
    }
}
