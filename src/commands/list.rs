use anyhow::Result;
use std::collections::BTreeMap;

use super::CommandContext;
use crate::discovery::WorktreeItem;

/// Prints every discovered worktree, grouped by repository.
///
/// `repo` restricts the output to repositories with that name. `porcelain`
/// prints one tab-separated line per worktree for scripts:
/// `repo<TAB>branch<TAB>path<TAB>main|linked`, most recently modified first.
///
/// # Errors
/// Returns an error if no roots are configured
pub async fn list_worktrees(ctx: &CommandContext, repo: Option<&str>, porcelain: bool) -> Result<()> {
    let items: Vec<WorktreeItem> = ctx
        .discover()
        .await?
        .into_iter()
        .filter(|item| repo.is_none_or(|name| item.repo_name == name))
        .collect();

    if porcelain {
        for line in porcelain_lines(&items) {
            println!("{}", line);
        }
        return Ok(());
    }

    match repo {
        Some(name) => println!("Worktrees for repository: {}", name),
        None => println!("All discovered worktrees:"),
    }
    println!("{}", "=".repeat(40));

    if items.is_empty() {
        println!("No worktrees found.");
        return Ok(());
    }

    let mut by_repo: BTreeMap<&str, Vec<&WorktreeItem>> = BTreeMap::new();
    for item in &items {
        by_repo.entry(item.repo_name.as_str()).or_default().push(item);
    }

    for (repo_name, worktrees) in by_repo {
        println!("\n📁 {}", repo_name);
        for item in worktrees {
            let status = if item.path.exists() { "✓" } else { "✗" };
            let marker = if item.is_main { " [main]" } else { "" };
            println!(
                "  {} {} ({}){}",
                status,
                item.branch,
                item.path.display(),
                marker
            );
        }
    }

    Ok(())
}

fn porcelain_lines(items: &[WorktreeItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| {
            format!(
                "{}\t{}\t{}\t{}",
                item.repo_name,
                item.branch,
                item.path.display(),
                if item.is_main { "main" } else { "linked" }
            )
        })
        .collect()
}
