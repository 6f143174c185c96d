//! Plugbay CLI - Install, update and filter plugins from the command line.

mod commands;
mod config;
mod discovery;
mod logging;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::{Result, miette};
use plugbay_core::PluginCategory;

use crate::commands::Context;
use crate::commands::install::InstallTarget;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "plugbay")]
#[command(author, version, about = "Install, update and manage plugins")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory holding .plugbay (auto-detected if not specified)
    #[arg(short = 'w', long, global = true)]
    workspace: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a workspace
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// List installed plugins
    List {
        /// Only show these categories (tools, models, endpoints)
        #[arg(short, long = "category")]
        categories: Vec<PluginCategory>,

        /// Only show plugins carrying any of these tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Case-insensitive search on the plugin id
        #[arg(short, long)]
        search: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Install a plugin
    Install {
        #[command(subcommand)]
        target: InstallTarget,

        /// Stop before installing
        #[arg(long, global = true)]
        dry_run: bool,
    },

    /// Check a GitHub plugin for a newer release
    Check {
        /// Plugin id or installation id
        plugin: String,
    },

    /// Update an installed plugin
    Update {
        /// Plugin id or installation id
        plugin: String,

        /// Target version (newest available if not specified)
        #[arg(long)]
        version: Option<String>,
    },

    /// Uninstall a plugin
    Uninstall {
        /// Plugin id or installation id
        plugin: String,
    },

    /// Show install tasks
    Tasks,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Init runs before a workspace exists
    if let Commands::Init { force } = cli.command {
        let config = Config::load(None)?;
        logging::init(&config.log.filter, cli.verbose);

        let root = match cli.workspace {
            Some(root) => root,
            None => std::env::current_dir()
                .map_err(|e| miette!("Cannot get current directory: {}", e))?,
        };
        return commands::init::execute(&root, force);
    }

    let workspace = discovery::resolve(cli.workspace.as_deref())?;
    let config = Config::load(Some(&workspace))?;
    logging::init(&config.log.filter, cli.verbose);

    let ctx = Context::open(&workspace, &config)?;

    match cli.command {
        Commands::List {
            categories,
            tags,
            search,
            detailed,
        } => commands::list::execute(&ctx, categories, tags, search, detailed).await,

        Commands::Install { target, dry_run } => {
            commands::install::execute(&ctx, target, dry_run).await
        }

        Commands::Check { plugin } => commands::check::execute(&ctx, &plugin).await,

        Commands::Update { plugin, version } => {
            commands::update::execute(&ctx, &plugin, version).await
        }

        Commands::Uninstall { plugin } => commands::uninstall::execute(&ctx, &plugin).await,

        Commands::Tasks => commands::tasks::execute(&ctx).await,

        Commands::Init { .. } => unreachable!("Init is handled earlier"),
    }
}
