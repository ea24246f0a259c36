use clap::{Args, Parser, Subcommand};

use crate::core::Scope;

#[derive(Parser)]
#[command(
    name = "paka",
    version,
    about = "Unified front-end over your package managers",
    long_about = "Install, remove, search and upgrade packages through a single \
                  interface, with lifecycle plugins and a rollback-capable \
                  installation history."
)]
pub struct Cli {
    #[command(flatten)]
    pub flags: GlobalFlags,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct GlobalFlags {
    /// Show extra diagnostic output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Assume yes for every confirmation prompt
    #[arg(short = 'y', long = "yes", global = true)]
    pub yes: bool,

    /// Show what would happen without touching anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Use a specific package manager instead of auto-selecting
    #[arg(short, long, global = true)]
    pub manager: Option<String>,

    /// History and plugin scope to operate on
    #[arg(short, long, global = true, value_enum, default_value_t = Scope::User)]
    pub scope: Scope,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install packages
    Install {
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Remove packages
    Remove {
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Remove packages including their configuration
    Purge {
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Refresh package metadata
    Update,
    /// Upgrade installed packages
    Upgrade,
    /// Search for packages
    Search { query: String },
    /// Check managers, history and plugins for problems
    Health,
    /// Compare history against live package state
    Reconcile,
    /// Inspect or roll back the installation history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
    /// Configuration, including plugins
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded installations (newest first)
    List {
        /// Show at most this many entries
        #[arg(short, long)]
        limit: Option<usize>,

        /// Merge user and system scopes, oldest first
        #[arg(short, long)]
        all: bool,
    },
    /// Full detail for one installation
    Show { index: usize },
    /// Find entries by package or manager name
    Search { query: String },
    /// Aggregate statistics
    Stats,
    /// Remove the packages of a recorded installation
    Rollback {
        index: usize,
        /// Purge instead of plain remove
        #[arg(long)]
        purge: bool,
    },
    /// Delete all history for the scope
    Clear,
    /// Drop removed entries older than the retention window
    Cleanup {
        /// Retention window in days
        #[arg(long, default_value_t = 365)]
        days: i64,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Plugin management
    Plugins {
        #[command(subcommand)]
        action: PluginAction,
    },
}

#[derive(Subcommand)]
pub enum PluginAction {
    /// List installed plugins
    List,
    /// Enable a plugin by name
    Enable { name: String },
    /// Disable a plugin by name
    Disable { name: String },
    /// Lint plugin configurations
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["paka", "install", "ripgrep", "--manager", "apt", "-y"])
            .expect("parse");
        assert_eq!(cli.flags.manager.as_deref(), Some("apt"));
        assert!(cli.flags.yes);
        match cli.command {
            Command::Install { packages } => assert_eq!(packages, vec!["ripgrep".to_string()]),
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn scope_defaults_to_user() {
        let cli = Cli::try_parse_from(["paka", "health"]).expect("parse");
        assert_eq!(cli.flags.scope, Scope::User);
    }
}
