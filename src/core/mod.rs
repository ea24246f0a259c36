//! Scope partitioning, privilege detection and the dependency-injected
//! application context passed to every command.

pub mod privilege;

use crate::backends::registry::BackendRegistry;
use crate::error::Result;
use crate::history::ledger::HistoryLedger;
use crate::history::store::FilesystemLedgerStore;
use crate::plugins::dispatcher::PluginDispatcher;
use crate::utils::paths;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Partition of history, plugins and configuration into the current
/// account (`User`) and machine-wide, privileged (`System`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    User,
    System,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::System => "system",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All external dependencies of the command layer, built once at startup.
/// No component reaches for process-wide singletons.
pub struct AppContext {
    pub registry: BackendRegistry,
    pub dispatcher: PluginDispatcher,
    pub ledger: HistoryLedger,
    pub privileged: bool,
}

impl AppContext {
    pub fn new(
        registry: BackendRegistry,
        dispatcher: PluginDispatcher,
        ledger: HistoryLedger,
        privileged: bool,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            ledger,
            privileged,
        }
    }

    /// Build the production context: builtin backends, plugins discovered
    /// from the system and user roots, filesystem-backed ledger.
    pub fn new_filesystem() -> Result<Self> {
        let privileged = privilege::is_privileged();
        let registry = BackendRegistry::with_builtins();
        let dispatcher = PluginDispatcher::load(
            &paths::plugin_root(Scope::System)?,
            &paths::plugin_root(Scope::User)?,
        );
        let ledger = HistoryLedger::open(Box::new(FilesystemLedgerStore::discover()?), privileged)?;
        Ok(Self::new(registry, dispatcher, ledger, privileged))
    }
}
