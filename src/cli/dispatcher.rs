//! Routes a parsed command line to the command implementations.

use crate::commands;
use crate::core::AppContext;
use crate::error::Result;
use crate::events::OperationKind;

use super::args::{Cli, Command, ConfigAction, HistoryAction, PluginAction};

pub fn dispatch(cli: &Cli, app: &mut AppContext) -> Result<()> {
    let flags = &cli.flags;
    let manager = flags.manager.as_deref();
    match &cli.command {
        Command::Install { packages } => {
            commands::install::run(app, packages, manager, flags.scope, flags.dry_run)
        }
        Command::Remove { packages } => {
            commands::remove::run(app, packages, manager, flags.scope, false, flags.dry_run)
        }
        Command::Purge { packages } => {
            commands::remove::run(app, packages, manager, flags.scope, true, flags.dry_run)
        }
        Command::Update => commands::maintain::run(app, OperationKind::Update, manager, flags.dry_run),
        Command::Upgrade => {
            commands::maintain::run(app, OperationKind::Upgrade, manager, flags.dry_run)
        }
        Command::Search { query } => commands::search::run(app, query, manager),
        Command::Health => commands::health::run(app),
        Command::Reconcile => commands::reconcile::run(app, flags.scope, flags.yes),
        Command::History { action } => match action {
            None => commands::history::list(app, flags.scope, None, manager),
            Some(HistoryAction::List { all: true, limit }) => {
                commands::history::list_all(app, *limit)
            }
            Some(HistoryAction::List { limit, .. }) => {
                commands::history::list(app, flags.scope, *limit, manager)
            }
            Some(HistoryAction::Show { index }) => commands::history::show(app, flags.scope, *index),
            Some(HistoryAction::Search { query }) => {
                commands::history::search(app, flags.scope, query)
            }
            Some(HistoryAction::Stats) => commands::history::stats(app, flags.scope),
            Some(HistoryAction::Rollback { index, purge }) => {
                commands::history::run_rollback(app, flags.scope, *index, *purge, flags.yes)
            }
            Some(HistoryAction::Clear) => commands::history::clear(app, flags.scope, flags.yes),
            Some(HistoryAction::Cleanup { days }) => {
                commands::history::cleanup(app, flags.scope, *days)
            }
        },
        Command::Config { action } => match action {
            ConfigAction::Plugins { action } => match action {
                PluginAction::List => commands::plugins_cfg::list(app),
                PluginAction::Enable { name } => commands::plugins_cfg::set_enabled(app, name, true),
                PluginAction::Disable { name } => {
                    commands::plugins_cfg::set_enabled(app, name, false)
                }
                PluginAction::Check => commands::plugins_cfg::check(app),
            },
        },
    }
}
