//! Command implementations behind the CLI. Each command receives the
//! shared [`AppContext`] and plain arguments; clap parsing stays in the
//! cli module.

pub mod health;
pub mod history;
pub mod install;
pub mod maintain;
pub mod plugins_cfg;
pub mod reconcile;
pub mod remove;
pub mod search;

use crate::backends::registry::BackendRegistry;
use crate::backends::BackendAdapter;
use crate::core::{AppContext, Scope};
use crate::error::{PakaError, Result};
use crate::events::{Event, EventContext};
use crate::plugins::dispatcher::PluginDispatcher;
use crate::ui;

/// Resolve which adapter a command should talk to. An explicit name must
/// exist, be enabled and be installed; otherwise the first usable
/// adapter wins.
pub(crate) fn select_adapter<'a>(
    registry: &'a BackendRegistry,
    manager: Option<&str>,
) -> Result<&'a dyn BackendAdapter> {
    match manager {
        Some(name) => {
            let adapter = registry.get(name).ok_or_else(|| {
                PakaError::TargetNotFound(format!("package manager '{}'", name))
            })?;
            if !adapter.is_enabled() {
                return Err(PakaError::ConfigError(format!(
                    "package manager '{}' is disabled",
                    name
                )));
            }
            if !adapter.is_available() {
                return Err(PakaError::PackageManagerError(format!(
                    "'{}' is not installed on this system",
                    name
                )));
            }
            Ok(adapter)
        }
        None => registry
            .usable()
            .into_iter()
            .next()
            .ok_or_else(|| PakaError::PackageManagerError("no usable package manager found".into())),
    }
}

/// Fire an observational event. Plugin failures are reported but never
/// block the operation.
pub(crate) fn observe(dispatcher: &PluginDispatcher, event: Event, ctx: &EventContext) {
    if !dispatcher.trigger(event, ctx) {
        ui::verbose(&format!("one or more plugins failed on {}", event));
    }
}

/// Fire a gating event: any failing plugin vetoes the operation.
pub(crate) fn gate(dispatcher: &PluginDispatcher, event: Event, ctx: &EventContext) -> Result<()> {
    if dispatcher.trigger(event, ctx) {
        Ok(())
    } else {
        Err(PakaError::AbortedByPlugin(format!(
            "operation vetoed by a plugin on {}",
            event
        )))
    }
}

/// System scope mutations are refused outright for unprivileged users
/// before any backend work happens.
pub(crate) fn check_scope_mutation(app: &AppContext, scope: Scope) -> Result<()> {
    if scope == Scope::System && !app.privileged {
        return Err(PakaError::Authorization(
            "system scope operations require root privileges (try sudo)".into(),
        ));
    }
    Ok(())
}
