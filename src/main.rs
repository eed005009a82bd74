use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueHint};
use std::path::PathBuf;
use treescout::Result;
use treescout::commands::completions::Shell;
use treescout::commands::create::CreateOptions;
use treescout::commands::{
    CommandContext, branches, completions, create, list, open, pick, remove,
};
use treescout::config::CONFIG_ENV;
use treescout::logging::init_tracing;
use treescout::selection::RealSelectionProvider;
use treescout::traits::SystemTrash;

#[derive(Parser)]
#[command(name = "treescout")]
#[command(about = "Find git repositories and worktrees across your project roots")]
#[command(version)]
pub struct Cli {
    /// Preferences file to use instead of the default location
    #[arg(long, global = true, env = CONFIG_ENV, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,
    /// Directory to scan; repeat to scan several. Overrides configured roots
    #[arg(long = "root", global = true, value_hint = ValueHint::DirPath)]
    roots: Vec<String>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all discovered worktrees
    List {
        /// Only show worktrees of repositories with this name
        #[arg(long, value_hint = ValueHint::Other)]
        repo: Option<String>,
        /// Tab-separated output for scripts
        #[arg(long)]
        porcelain: bool,
    },
    /// Print the path of a worktree. If no target is given, opens interactive selection
    Pick {
        /// Branch name, path or partial `repo/branch`
        #[arg(value_hint = ValueHint::Other)]
        target: Option<String>,
    },
    /// Open a worktree with the configured `open-with` command
    Open {
        /// Branch name, path or partial `repo/branch`
        #[arg(value_hint = ValueHint::Other)]
        target: Option<String>,
    },
    /// Create a new worktree
    Create {
        /// Repository name or path
        #[arg(value_hint = ValueHint::AnyPath)]
        repo: String,
        /// Worktree and branch name. Prompted for if omitted
        #[arg(value_hint = ValueHint::Other)]
        name: Option<String>,
        /// Branch to start from. Prompted for if omitted
        #[arg(long, value_hint = ValueHint::Other)]
        base: Option<String>,
        /// Destination folder instead of `<default-worktree-path>/<repo>/<name>`
        #[arg(long, value_hint = ValueHint::DirPath)]
        path: Option<String>,
    },
    /// Remove a linked worktree. If no target is given, opens interactive selection
    Remove {
        /// Branch name, path or partial `repo/branch`
        #[arg(value_hint = ValueHint::Other)]
        target: Option<String>,
    },
    /// List the branches a repository's worktrees can start from
    Branches {
        /// Repository name or path
        #[arg(value_hint = ValueHint::AnyPath)]
        repo: String,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        completions::generate_completions(shell, &mut cmd);
        return Ok(());
    }

    let ctx = CommandContext::load(cli.config.as_deref(), &cli.roots)?;

    match cli.command {
        Commands::List { repo, porcelain } => {
            list::list_worktrees(&ctx, repo.as_deref(), porcelain).await?;
        }
        Commands::Pick { target } => {
            pick::pick_worktree(&ctx, target.as_deref(), &RealSelectionProvider).await?;
        }
        Commands::Open { target } => {
            open::open_worktree(&ctx, target.as_deref(), &RealSelectionProvider).await?;
        }
        Commands::Create {
            repo,
            name,
            base,
            path,
        } => {
            let options = CreateOptions {
                repo: &repo,
                name: name.as_deref(),
                base: base.as_deref(),
                path: path.as_deref(),
            };
            create::create_worktree(&ctx, options, &RealSelectionProvider).await?;
        }
        Commands::Remove { target } => {
            remove::remove_worktree(&ctx, target.as_deref(), &RealSelectionProvider, &SystemTrash)
                .await?;
        }
        Commands::Branches { repo } => {
            branches::list_repository_branches(&ctx, &repo).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
