//! User preferences: which roots to scan, how to open a worktree, and where
//! new worktrees go.
//!
//! Preferences live in a TOML file, by default
//! `<config dir>/treescout/config.toml` (override with `TREESCOUT_CONFIG`).
//! Every field is optional and a missing file means defaults.
//!
//! # Example
//!
//! ```toml
//! roots = """
//! ~/code
//! ~/work/clients
//! """
//! open-with = "code"
//! default-worktree-path = "~/.worktrees"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an alternative preferences file
pub const CONFIG_ENV: &str = "TREESCOUT_CONFIG";

const DEFAULT_WORKTREE_DIR: &str = "~/.worktrees";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Preferences {
    /// Newline-separated directories to scan; `~` expands to the home directory
    pub roots: String,
    /// Command used to open a worktree folder, e.g. `code` or `idea`
    pub open_with: Option<String>,
    /// Base folder for new worktrees
    pub default_worktree_path: Option<String>,
}

impl Preferences {
    /// Location of the preferences file.
    ///
    /// # Errors
    /// Returns an error if no configuration directory can be determined
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(custom) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(custom));
        }
        Ok(dirs::config_dir()
            .context("Failed to determine the user configuration directory")?
            .join("treescout")
            .join("config.toml"))
    }

    /// Loads preferences from the default location.
    ///
    /// # Errors
    /// Returns an error if the location cannot be determined or the file
    /// exists but cannot be read
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Loads preferences from `path`.
    ///
    /// Missing or blank files give defaults. Invalid TOML prints a warning
    /// and also falls back to defaults, so a typo never blocks discovery.
    ///
    /// # Errors
    /// Only returns an error if the file exists but cannot be read.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        match toml::from_str::<Preferences>(&content) {
            Ok(preferences) => Ok(preferences),
            Err(e) => {
                eprintln!("Warning: Invalid TOML syntax in {}:", path.display());
                eprintln!("  {}", e);
                eprintln!("  Using default configuration. Please fix the syntax and try again.");
                Ok(Self::default())
            }
        }
    }

    /// Configured roots, expanded and de-duplicated
    #[must_use]
    pub fn root_paths(&self) -> Vec<PathBuf> {
        expand_roots(&self.roots)
    }

    /// Base folder for new worktrees, `~/.worktrees` unless configured
    #[must_use]
    pub fn worktree_base(&self) -> PathBuf {
        let raw = self
            .default_worktree_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .unwrap_or(DEFAULT_WORKTREE_DIR);
        expand_tilde(raw)
    }

    /// Default destination for a new worktree: `<base>/<repo>/<name>`
    #[must_use]
    pub fn worktree_destination(&self, repo_name: &str, sanitized_name: &str) -> PathBuf {
        self.worktree_base().join(repo_name).join(sanitized_name)
    }
}

/// Turns the newline-separated roots setting into paths: lines are trimmed,
/// blank lines dropped, `~` expanded and duplicates removed in order.
#[must_use]
pub fn expand_roots(raw: &str) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();
    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let path = expand_tilde(line);
        if !roots.contains(&path) {
            roots.push(path);
        }
    }
    roots
}

/// Expands a leading `~` to the home directory. Paths are otherwise kept
/// as written.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return PathBuf::from(path);
    };
    if path == "~" {
        home
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}
