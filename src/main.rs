//! accessctl — review cloud access-approval requests from the terminal.
//!
//! Quick start:
//!   accessctl                  # list pending requests
//!   accessctl view             # browse interactively, a/d/r to act
//!   accessctl approve <ID>     # approve one request
//!
//! For more info: accessctl --help

use accessctl::approval::types::Action;
use accessctl::cli;
use accessctl::config::{self, Overrides};
use accessctl::source::StateFilter;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// accessctl — list, review and decide access-approval requests.
#[derive(Parser)]
#[command(
    name = "accessctl",
    version,
    about = "Review access-approval requests from the terminal",
    long_about = "accessctl lists access-approval requests and lets you approve,\n\
                  dismiss or revoke them, either one at a time or from an\n\
                  interactive two-pane viewer.\n\n\
                  Quick start:\n  \
                  accessctl                  # list pending requests\n  \
                  accessctl view             # browse interactively\n  \
                  accessctl approve <ID>     # approve one request"
)]
struct Cli {
    /// Path to config file (default: ~/.accessctl/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Parent resource, e.g. projects/123
    #[arg(long, global = true, env = "ACCESSCTL_PARENT")]
    parent: Option<String>,

    /// Request store (default: ~/.accessctl/requests.json)
    #[arg(long, global = true, env = "ACCESSCTL_DATA")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List approval requests
    List {
        /// Filter: pending, approved, dismissed, all
        #[arg(short, long, value_parser = parse_state)]
        state: Option<StateFilter>,

        /// Print requests as JSON
        #[arg(long)]
        json: bool,

        /// Write JSON to this file instead of stdout (implies --json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show one request in full
    Get {
        /// Request id or full resource name
        id: String,
    },

    /// Browse requests interactively
    View {
        /// Filter: pending, approved, dismissed, all
        #[arg(short, long, value_parser = parse_state)]
        state: Option<StateFilter>,
    },

    /// Approve a pending request
    Approve {
        /// Request id or full resource name
        id: String,

        /// When access expires (RFC 3339). Defaults to the requested expiration.
        #[arg(long)]
        expire: Option<String>,
    },

    /// Dismiss a pending request
    Dismiss {
        /// Request id or full resource name
        id: String,
    },

    /// Revoke an approved request
    Revoke {
        /// Request id or full resource name
        id: String,
    },
}

fn parse_state(s: &str) -> Result<StateFilter, String> {
    StateFilter::from_str_loose(s)
        .ok_or_else(|| format!("unknown state '{}' (pending, approved, dismissed, all)", s))
}

fn main() {
    // Quiet unless RUST_LOG asks for more
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("accessctl=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!();
        eprintln!("  {} {}", "✗".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
        eprintln!();
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::load_config(cli.config.as_deref())?.apply(Overrides {
        parent: cli.parent,
        data_file: cli.data,
    })?;
    let mut source = cli::open_source(&config)?;

    match cli.command {
        // No subcommand: list with the configured default state
        None => cli::list::run_list(&source, config.default_state, false, None),

        Some(Commands::List {
            state,
            json,
            output,
        }) => cli::list::run_list(
            &source,
            state.unwrap_or(config.default_state),
            json || output.is_some(),
            output.as_deref(),
        ),

        Some(Commands::Get { id }) => cli::list::run_get(&source, &config.parent, &id),

        Some(Commands::View { state }) => {
            cli::view::run_view(&mut source, state.unwrap_or(config.default_state))
        }

        Some(Commands::Approve { id, expire }) => cli::act::run_action(
            &mut source,
            &config.parent,
            Action::Approve,
            &id,
            expire.as_deref(),
        ),

        Some(Commands::Dismiss { id }) => {
            cli::act::run_action(&mut source, &config.parent, Action::Dismiss, &id, None)
        }

        Some(Commands::Revoke { id }) => {
            cli::act::run_action(&mut source, &config.parent, Action::Revoke, &id, None)
        }
    }
}
