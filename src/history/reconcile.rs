//! Reconciliation: compare the ledger against live backend state and
//! flag packages that were removed behind our back.
//!
//! The sweep is deliberately conservative. A package is only marked
//! removed when its manager positively reports it absent; any query
//! failure, disabled manager, or unknown manager leaves the record
//! alone for a later run.

use std::fmt;

use crate::backends::registry::BackendRegistry;
use crate::core::Scope;
use crate::error::Result;
use crate::history::ledger::HistoryLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    MarkedRemoved,
    Error,
    Skipped,
}

impl fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileAction::MarkedRemoved => write!(f, "marked removed"),
            ReconcileAction::Error => write!(f, "error"),
            ReconcileAction::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReconcileDetail {
    pub package: String,
    pub manager: String,
    pub action: ReconcileAction,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub checked: usize,
    pub marked_removed: usize,
    pub errors: usize,
    pub skipped: usize,
    pub details: Vec<ReconcileDetail>,
}

impl ReconcileReport {
    fn push(&mut self, package: &str, manager: &str, action: ReconcileAction, reason: String) {
        match action {
            ReconcileAction::MarkedRemoved => self.marked_removed += 1,
            ReconcileAction::Error => self.errors += 1,
            ReconcileAction::Skipped => self.skipped += 1,
        }
        self.details.push(ReconcileDetail {
            package: package.to_string(),
            manager: manager.to_string(),
            action,
            reason,
        });
    }
}

pub fn reconcile(
    ledger: &mut HistoryLedger,
    registry: &BackendRegistry,
    scope: Scope,
) -> Result<ReconcileReport> {
    // Snapshot first: mark_removed mutates the document mid-sweep.
    let pending: Vec<(String, Vec<String>)> = ledger
        .document(scope)
        .installations
        .iter()
        .filter(|r| !r.removed)
        .map(|r| (r.manager.clone(), r.packages.clone()))
        .collect();

    let mut report = ReconcileReport::default();
    for (manager, packages) in pending {
        for package in packages {
            let adapter = match registry.get(&manager) {
                Some(a) => a,
                None => {
                    report.push(
                        &package,
                        &manager,
                        ReconcileAction::Skipped,
                        "manager not known to this build".into(),
                    );
                    continue;
                }
            };
            if !adapter.is_enabled() || !adapter.is_available() {
                report.push(
                    &package,
                    &manager,
                    ReconcileAction::Skipped,
                    "manager disabled or not installed".into(),
                );
                continue;
            }
            report.checked += 1;
            match adapter.search(&package) {
                Ok(found) => {
                    let still_installed = found
                        .iter()
                        .any(|p| p.name == package && p.installed);
                    if !still_installed {
                        ledger.mark_removed(&manager, &[package.clone()], scope)?;
                        report.push(
                            &package,
                            &manager,
                            ReconcileAction::MarkedRemoved,
                            "not reported installed by manager".into(),
                        );
                    }
                }
                Err(e) => {
                    report.push(&package, &manager, ReconcileAction::Error, e.to_string());
                }
            }
        }
    }
    Ok(report)
}
