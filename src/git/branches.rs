//! Branch queries used when creating worktrees.
//!
//! Every function here absorbs failures: a repository that cannot answer
//! yields an empty list, `false` or `None` rather than an error.

use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

use crate::traits::GitRunner;

/// Remote prefixes collapsed so a branch tracked on both remotes shows once
const COLLAPSED_REMOTES: &[&str] = &["origin/", "upstream/"];

/// Lists local and remote branch names, sorted and de-duplicated.
///
/// Remote branches are reported by their bare name, so `main`,
/// `origin/main` and `upstream/main` all collapse to `main`.
pub async fn list_branches(git: &dyn GitRunner, repo: &Path) -> Vec<String> {
    let output = match git
        .output(repo, &["branch", "-a", "--format=%(refname:short)"])
        .await
    {
        Ok(output) if output.success() => output,
        Ok(output) => {
            warn!(repo = %repo.display(), stderr = %output.stderr.trim(), "branch listing failed");
            return Vec::new();
        }
        Err(e) => {
            warn!(repo = %repo.display(), error = %e, "branch listing failed");
            return Vec::new();
        }
    };

    parse_branch_list(&output.stdout)
}

fn parse_branch_list(stdout: &str) -> Vec<String> {
    let mut names = BTreeSet::new();

    for line in stdout.lines() {
        let line = line.trim();
        // Skip blanks, the symbolic HEAD and "(HEAD detached at ...)"
        if line.is_empty()
            || line == "HEAD"
            || line.ends_with("/HEAD")
            || line.starts_with('(')
        {
            continue;
        }

        let mut name = line;
        if let Some(rest) = name.strip_prefix("remotes/") {
            name = rest.split_once('/').map_or(rest, |(_, branch)| branch);
        }
        for prefix in COLLAPSED_REMOTES {
            if let Some(rest) = name.strip_prefix(prefix) {
                name = rest;
                break;
            }
        }

        if !name.is_empty() {
            names.insert(name.to_string());
        }
    }

    names.into_iter().collect()
}

/// Returns true if `refs/heads/<name>` exists. Any failure reads as absent.
pub async fn has_local_branch(git: &dyn GitRunner, repo: &Path, name: &str) -> bool {
    let reference = format!("refs/heads/{name}");
    git.output(repo, &["rev-parse", "--verify", "--quiet", &reference])
        .await
        .is_ok_and(|output| output.success())
}

/// Picks the remote new branches should track: `origin` when configured,
/// otherwise the first remote git lists.
pub async fn default_remote(git: &dyn GitRunner, repo: &Path) -> Option<String> {
    let output = git.output(repo, &["remote"]).await.ok()?;
    if !output.success() {
        return None;
    }

    let remotes: Vec<&str> = output
        .stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if remotes.contains(&"origin") {
        return Some("origin".to_string());
    }
    remotes.first().map(|remote| (*remote).to_string())
}

/// Resolves the upstream tracking ref of `branch`, e.g. `origin/main`.
pub async fn upstream_ref(git: &dyn GitRunner, repo: &Path, branch: &str) -> Option<String> {
    let revision = format!("{branch}@{{upstream}}");
    let output = git
        .output(repo, &["rev-parse", "--abbrev-ref", &revision])
        .await
        .ok()?;
    if !output.success() {
        return None;
    }

    let upstream = output.stdout.trim();
    // An unresolved "@{upstream}" echoed back is not a ref
    if upstream.is_empty() || upstream.contains('@') {
        return None;
    }
    Some(upstream.to_string())
}
