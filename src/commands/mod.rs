pub mod branches;
pub mod completions;
pub mod create;
pub mod list;
pub mod open;
pub mod pick;
pub mod remove;

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::{Preferences, expand_roots};
use crate::discovery::{self, WorktreeItem, probe};
use crate::git::GitCli;

/// Everything a command needs: preferences, the roots to scan and git.
pub struct CommandContext {
    pub preferences: Preferences,
    pub roots: Vec<PathBuf>,
    pub git: GitCli,
}

impl CommandContext {
    /// Loads preferences from `config_path` (or the default location) and
    /// applies `--root` overrides.
    ///
    /// # Errors
    /// Returns an error if the preferences file exists but cannot be read
    pub fn load(config_path: Option<&Path>, root_overrides: &[String]) -> Result<Self> {
        let preferences = match config_path {
            Some(path) => Preferences::load_from(path)?,
            None => Preferences::load()?,
        };

        let roots = if root_overrides.is_empty() {
            preferences.root_paths()
        } else {
            expand_roots(&root_overrides.join("\n"))
        };

        Ok(Self {
            preferences,
            roots,
            git: GitCli::new(),
        })
    }

    /// Runs a full discovery pass over the configured roots.
    ///
    /// # Errors
    /// Returns an error if no roots are configured
    pub async fn discover(&self) -> Result<Vec<WorktreeItem>> {
        if self.roots.is_empty() {
            anyhow::bail!(
                "No roots configured. Pass --root <dir> or set `roots` in {}",
                Preferences::default_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".to_string())
            );
        }
        Ok(discovery::discover_worktrees(&self.git, &self.roots).await)
    }

    /// Resolves `query` to a main repository root. `query` may be a path to
    /// any checkout of the repository or the name of a discovered repository.
    ///
    /// # Errors
    /// Returns an error if nothing matches or the name is ambiguous
    pub async fn resolve_repository(&self, query: &str) -> Result<PathBuf> {
        let as_path = crate::config::expand_tilde(query);
        if let Some(kind) = probe::git_dir_kind(&as_path).await {
            let resolved = match kind {
                probe::GitDirKind::Main => probe::canonical_repository(&as_path).await,
                probe::GitDirKind::Linked => probe::resolve_main_repository(&as_path).await,
            };
            return resolved
                .with_context(|| format!("Could not resolve repository at {}", as_path.display()));
        }

        let items = self.discover().await?;
        let candidates: BTreeSet<&PathBuf> = items
            .iter()
            .filter(|item| item.repo_name == query)
            .map(|item| &item.repo_root)
            .collect();

        match candidates.len() {
            0 => anyhow::bail!("No repository found matching '{}'", query),
            1 => Ok(candidates.into_iter().next().cloned().unwrap_or_default()),
            _ => {
                eprintln!(
                    "Multiple repositories are named '{}'. Pass a path instead:",
                    query
                );
                for candidate in candidates {
                    eprintln!("  {}", candidate.display());
                }
                anyhow::bail!("Ambiguous repository name");
            }
        }
    }
}

/// Finds the worktree `target` refers to: an exact path, an exact branch
/// name, or a unique partial match on `repo/branch`.
///
/// # Errors
/// Returns an error if nothing matches or the target is ambiguous
pub fn find_worktree<'a>(items: &'a [WorktreeItem], target: &str) -> Result<&'a WorktreeItem> {
    let target_path = crate::config::expand_tilde(target);
    if let Some(item) = items.iter().find(|item| item.path == target_path) {
        return Ok(item);
    }

    let exact: Vec<&WorktreeItem> = items.iter().filter(|item| item.branch == target).collect();
    if exact.len() == 1 {
        return Ok(exact[0]);
    }

    let matches: Vec<&WorktreeItem> = if exact.is_empty() {
        items
            .iter()
            .filter(|item| format!("{}/{}", item.repo_name, item.branch).contains(target))
            .collect()
    } else {
        exact
    };

    match matches.len() {
        0 => anyhow::bail!("No worktree found matching '{}'", target),
        1 => Ok(matches[0]),
        _ => {
            eprintln!(
                "Multiple worktrees match '{}'. Please be more specific:",
                target
            );
            for item in matches {
                eprintln!("  {}/{} ({})", item.repo_name, item.branch, item.path.display());
            }
            anyhow::bail!("Ambiguous worktree name");
        }
    }
}
