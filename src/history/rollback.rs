//! Undo a recorded installation by removing its packages through the
//! original manager. The ledger is only touched after the backend
//! reports success, so a failed rollback leaves history exactly as it
//! was.

use chrono::Utc;

use crate::backends::registry::BackendRegistry;
use crate::core::Scope;
use crate::error::{PakaError, Result};
use crate::history::ledger::HistoryLedger;
use crate::history::RollbackRecord;

#[derive(Debug)]
pub struct RollbackOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub packages_attempted: Vec<String>,
    pub packages_removed: Vec<String>,
    pub manager: String,
}

pub fn rollback(
    ledger: &mut HistoryLedger,
    registry: &BackendRegistry,
    scope: Scope,
    index: usize,
    purge: bool,
) -> Result<RollbackOutcome> {
    let original = ledger.installation(scope, index)?.clone();

    // Packages plus their recorded dependencies, first occurrence wins.
    let mut removal_set: Vec<String> = Vec::new();
    for pkg in original.packages.iter().chain(original.dependencies.iter()) {
        if !removal_set.contains(pkg) {
            removal_set.push(pkg.clone());
        }
    }

    let adapter = registry.get(&original.manager).ok_or_else(|| {
        PakaError::TargetNotFound(format!("package manager '{}' not found", original.manager))
    })?;
    if !adapter.is_enabled() {
        return Err(PakaError::ConfigError(format!(
            "package manager '{}' is disabled",
            original.manager
        )));
    }
    if !adapter.is_available() {
        return Err(PakaError::PackageManagerError(format!(
            "'{}' is not installed on this system",
            original.manager
        )));
    }

    let outcome = if purge {
        adapter.purge(&removal_set)
    } else {
        adapter.remove(&removal_set)
    };

    if !outcome.success {
        return Ok(RollbackOutcome {
            success: false,
            error: outcome.error,
            packages_attempted: removal_set,
            packages_removed: Vec::new(),
            manager: original.manager,
        });
    }

    ledger.record_rollback(
        scope,
        RollbackRecord {
            timestamp: Utc::now(),
            installation_index: index,
            reason: if purge {
                "rollback (purge)".into()
            } else {
                "rollback".into()
            },
            original_installation: original.clone(),
            scope,
        },
    )?;
    ledger.mark_removed(&original.manager, &removal_set, scope)?;

    Ok(RollbackOutcome {
        success: true,
        error: None,
        packages_attempted: removal_set.clone(),
        packages_removed: removal_set,
        manager: original.manager,
    })
}
