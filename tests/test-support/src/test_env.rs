#![allow(clippy::unwrap_used)] // Tests use unwrap for simplicity

use anyhow::{Context, Result};
use assert_fs::TempDir;
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;

use std::path::{Path, PathBuf};
use std::process::Command;

/// A scan root full of real git repositories, plus a folder for worktrees
/// and a preferences file location, all inside one temporary directory.
///
/// Paths are canonical so they compare equal to what discovery reports.
pub struct CliTestEnvironment {
    pub root: ChildPath,
    pub worktrees_dir: ChildPath,
    pub config_file: ChildPath,
    _temp_dir: TempDir, // Keep temp_dir private to ensure cleanup, but don't expose it
}

impl CliTestEnvironment {
    /// Creates an empty scan root and worktree folder
    ///
    /// # Errors
    /// Returns an error if the temporary directories cannot be created
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temporary directory")?;
        let base = temp_dir
            .path()
            .canonicalize()
            .context("Failed to canonicalize temporary directory")?;

        let root = ChildPath::new(base.join("code"));
        let worktrees_dir = ChildPath::new(base.join("worktrees"));
        let config_file = ChildPath::new(base.join("config.toml"));

        root.create_dir_all()?;
        worktrees_dir.create_dir_all()?;

        Ok(Self {
            root,
            worktrees_dir,
            config_file,
            _temp_dir: temp_dir,
        })
    }

    /// Initializes a repository at `relative` under the scan root with one
    /// commit on `main`, and returns its path
    ///
    /// # Errors
    /// Returns an error if any git command fails
    pub fn add_repo(&self, relative: &str) -> Result<PathBuf> {
        let repo_dir = self.root.child(relative);
        repo_dir.create_dir_all()?;
        init_repo(repo_dir.path())?;
        Ok(repo_dir.to_path_buf())
    }

    /// Adds a linked worktree of `repo` for a new branch `branch` at `destination`
    ///
    /// # Errors
    /// Returns an error if `git worktree add` fails
    pub fn add_worktree(&self, repo: &Path, branch: &str, destination: &Path) -> Result<()> {
        let destination = destination.to_string_lossy();
        run_git(repo, &["worktree", "add", "-b", branch, &destination])?;
        Ok(())
    }

    /// Writes the preferences file used by [`Self::run_command`]
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn write_config(&self, contents: &str) -> Result<()> {
        self.config_file.write_str(contents)?;
        Ok(())
    }

    /// Path a worktree gets under the environment's worktree folder
    pub fn worktree_path(&self, repo_name: &str, name: &str) -> PathBuf {
        // Use the same sanitization logic as the main application
        let sanitized = name.trim().replace(['/', '\\'], "-");
        self.worktrees_dir.path().join(repo_name).join(sanitized)
    }

    /// Builds a `treescout` invocation that scans this environment's root
    /// and reads this environment's preferences file
    ///
    /// # Errors
    /// Returns an error if the binary cannot be found
    pub fn run_command(&self, args: &[&str]) -> Result<assert_cmd::Command> {
        let mut cmd = assert_cmd::Command::cargo_bin("treescout")
            .context("Failed to find treescout binary")?;

        cmd.env("TREESCOUT_CONFIG", self.config_file.path())
            .env_remove("RUST_LOG")
            .arg("--root")
            .arg(self.root.path());

        cmd.args(args);
        Ok(cmd)
    }
}

/// Runs git in `dir` and returns its stdout
///
/// # Errors
/// Returns an error if git cannot be run or exits unsuccessfully
pub fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .context("Failed to execute git command")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Git command failed: git {}: {}", args.join(" "), stderr);
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn init_repo(dir: &Path) -> Result<()> {
    run_git(dir, &["init"])?;
    run_git(dir, &["config", "user.name", "Test User"])?;
    run_git(dir, &["config", "user.email", "test@example.com"])?;
    run_git(dir, &["config", "commit.gpgsign", "false"])?;

    std::fs::write(dir.join("README.md"), "# Test Repo")?;
    run_git(dir, &["add", "."])?;
    run_git(dir, &["commit", "-m", "Initial commit"])?;

    // Ensure we have a main branch (some git versions default to 'master')
    run_git(dir, &["branch", "-M", "main"])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use predicates::prelude::*;

    #[test]
    fn test_cli_test_environment_creation() -> Result<()> {
        let env = CliTestEnvironment::new()?;
        let repo = env.add_repo("app")?;

        env.root.assert(predicate::path::is_dir());
        env.worktrees_dir.assert(predicate::path::is_dir());
        env.config_file.assert(predicate::path::missing());
        env.root
            .child("app")
            .child("README.md")
            .assert(predicate::str::contains("# Test Repo"));

        let branch = run_git(&repo, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        assert_eq!(branch.trim(), "main");

        Ok(())
    }

    #[test]
    fn test_worktree_path_sanitization() -> Result<()> {
        let env = CliTestEnvironment::new()?;

        let path = env.worktree_path("app", "feature/test-branch");
        assert!(path.ends_with("app/feature-test-branch"));

        Ok(())
    }
}
