//! Reconciliation and rollback behavior against a scripted backend.

use std::sync::Mutex;

use paka::backends::adapter::{CommandAdapter, CommandSpec};
use paka::backends::registry::BackendRegistry;
use paka::backends::{BackendAdapter, OpOutcome, PackageInfo};
use paka::core::Scope;
use paka::error::{PakaError, Result};
use paka::history::ledger::HistoryLedger;
use paka::history::reconcile::{reconcile, ReconcileAction};
use paka::history::rollback::rollback;
use paka::history::store::MemoryLedgerStore;
use paka::history::InstallDetails;

/// Backend with scripted answers and call recording.
struct MockAdapter {
    name: String,
    enabled: bool,
    available: bool,
    installed: Vec<String>,
    search_error: Option<String>,
    remove_error: Option<String>,
    removed_calls: Mutex<Vec<Vec<String>>>,
}

impl MockAdapter {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            available: true,
            installed: Vec::new(),
            search_error: None,
            remove_error: None,
            removed_calls: Mutex::new(Vec::new()),
        }
    }
}

impl BackendAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn search(&self, query: &str) -> Result<Vec<PackageInfo>> {
        if let Some(err) = &self.search_error {
            return Err(PakaError::PackageManagerError(err.clone()));
        }
        Ok(self
            .installed
            .iter()
            .filter(|p| p.contains(query))
            .map(|p| PackageInfo {
                name: p.clone(),
                version: None,
                description: None,
                manager: self.name.clone(),
                installed: true,
            })
            .collect())
    }

    fn install(&self, _packages: &[String]) -> OpOutcome {
        OpOutcome::ok()
    }

    fn remove(&self, packages: &[String]) -> OpOutcome {
        if let Some(err) = &self.remove_error {
            return OpOutcome::failed(err.clone());
        }
        self.removed_calls.lock().unwrap().push(packages.to_vec());
        OpOutcome::ok()
    }

    fn purge(&self, packages: &[String]) -> OpOutcome {
        self.remove(packages)
    }

    fn update(&self) -> OpOutcome {
        OpOutcome::ok()
    }

    fn upgrade(&self) -> OpOutcome {
        OpOutcome::ok()
    }
}

fn ledger_with(installs: &[(&str, &[&str], &[&str])]) -> HistoryLedger {
    let mut ledger = HistoryLedger::open(Box::new(MemoryLedgerStore::default()), false).unwrap();
    for (manager, packages, deps) in installs {
        let packages: Vec<String> = packages.iter().map(|s| s.to_string()).collect();
        let details = InstallDetails {
            dependencies: deps.iter().map(|s| s.to_string()).collect(),
            ..InstallDetails::default()
        };
        ledger
            .record_install(manager, &packages, Scope::User, details)
            .unwrap();
    }
    ledger
}

fn registry_with(adapter: MockAdapter) -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.insert(Box::new(adapter));
    registry
}

#[test]
fn vanished_package_is_marked_removed() {
    let mut ledger = ledger_with(&[("apt", &["firefox"], &[])]);
    // Backend reports nothing installed.
    let registry = registry_with(MockAdapter::new("apt"));

    let report = reconcile(&mut ledger, &registry, Scope::User).unwrap();

    assert_eq!(report.checked, 1);
    assert_eq!(report.marked_removed, 1);
    assert_eq!(report.errors, 0);
    assert!(ledger.document(Scope::User).installations[0].removed);
}

#[test]
fn still_installed_package_is_left_alone() {
    let mut ledger = ledger_with(&[("apt", &["firefox"], &[])]);
    let mut adapter = MockAdapter::new("apt");
    adapter.installed = vec!["firefox".into()];
    let registry = registry_with(adapter);

    let report = reconcile(&mut ledger, &registry, Scope::User).unwrap();

    assert_eq!(report.checked, 1);
    assert_eq!(report.marked_removed, 0);
    assert!(!ledger.document(Scope::User).installations[0].removed);
}

#[test]
fn query_error_never_marks_removed() {
    let mut ledger = ledger_with(&[("apt", &["firefox"], &[])]);
    let mut adapter = MockAdapter::new("apt");
    adapter.search_error = Some("network unreachable".into());
    let registry = registry_with(adapter);

    let report = reconcile(&mut ledger, &registry, Scope::User).unwrap();

    assert_eq!(report.errors, 1);
    assert_eq!(report.marked_removed, 0);
    assert!(!ledger.document(Scope::User).installations[0].removed);
    assert!(report
        .details
        .iter()
        .any(|d| d.action == ReconcileAction::Error && d.reason.contains("network unreachable")));
}

#[test]
fn broken_installed_listing_records_error_not_removal() {
    // The command adapter's search succeeds but its installed-state
    // listing cannot run. That is inconclusive evidence, and the record
    // must stay pending.
    let mut ledger = ledger_with(&[("scripted", &["ghostpkg"], &[])]);
    let spec = CommandSpec {
        name: "scripted",
        binary: "sh",
        search: &["sh", "-c", "echo 'ghostpkg 1.0 scripted package'"],
        list_installed: &["paka-missing-binary-xyzzy"],
        install: &["true"],
        remove: &["true"],
        purge: None,
        update: &["true"],
        upgrade: &["true"],
    };
    let mut registry = BackendRegistry::new();
    registry.insert(Box::new(CommandAdapter::new(spec)));

    let report = reconcile(&mut ledger, &registry, Scope::User).unwrap();

    assert_eq!(report.marked_removed, 0);
    assert_eq!(report.errors, 1);
    assert!(!ledger.document(Scope::User).installations[0].removed);
}

#[test]
fn disabled_manager_stays_pending_across_runs() {
    let mut ledger = ledger_with(&[("apt", &["firefox"], &[])]);
    let mut adapter = MockAdapter::new("apt");
    adapter.enabled = false;
    let registry = registry_with(adapter);

    // Run twice: the record must stay unreconciled forever, never
    // inferred as removed.
    for _ in 0..2 {
        let report = reconcile(&mut ledger, &registry, Scope::User).unwrap();
        assert_eq!(report.checked, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.marked_removed, 0);
        assert!(!ledger.document(Scope::User).installations[0].removed);
    }
}

#[test]
fn unknown_manager_is_skipped() {
    let mut ledger = ledger_with(&[("mystery", &["firefox"], &[])]);
    let registry = registry_with(MockAdapter::new("apt"));

    let report = reconcile(&mut ledger, &registry, Scope::User).unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.checked, 0);
    assert!(!ledger.document(Scope::User).installations[0].removed);
}

#[test]
fn failed_rollback_leaves_ledger_untouched() {
    let mut ledger = ledger_with(&[
        ("apt", &["htop"], &[]),
        ("apt", &["curl"], &[]),
        ("apt", &["vim"], &["vim-common"]),
    ]);
    let before = serde_json::to_string(ledger.document(Scope::User)).unwrap();

    let mut adapter = MockAdapter::new("apt");
    adapter.remove_error = Some("permission denied".into());
    let registry = registry_with(adapter);

    let outcome = rollback(&mut ledger, &registry, Scope::User, 2, false).unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("permission denied"));
    assert_eq!(
        outcome.packages_attempted,
        vec!["vim".to_string(), "vim-common".to_string()]
    );
    let after = serde_json::to_string(ledger.document(Scope::User)).unwrap();
    assert_eq!(before, after);
    assert!(ledger.rollbacks(Scope::User).is_empty());
}

#[test]
fn successful_rollback_marks_removed_and_records_audit() {
    let mut ledger = ledger_with(&[("apt", &["vim", "vim-common"], &["vim-common"])]);
    let adapter = MockAdapter::new("apt");
    let registry = registry_with(adapter);

    let outcome = rollback(&mut ledger, &registry, Scope::User, 0, false).unwrap();

    assert!(outcome.success);
    // Dependencies merged in, duplicates dropped, order preserved.
    assert_eq!(
        outcome.packages_removed,
        vec!["vim".to_string(), "vim-common".to_string()]
    );

    let doc = ledger.document(Scope::User);
    assert_eq!(doc.installations.len(), 1, "records are never deleted");
    assert!(doc.installations[0].removed);
    assert_eq!(doc.rollbacks.len(), 1);
    assert_eq!(doc.rollbacks[0].installation_index, 0);
    assert_eq!(
        doc.rollbacks[0].original_installation.packages,
        vec!["vim".to_string(), "vim-common".to_string()]
    );
    assert!(!doc.rollbacks[0].original_installation.removed);
}

#[test]
fn rollback_out_of_range_is_not_found() {
    let mut ledger = ledger_with(&[("apt", &["htop"], &[])]);
    let registry = registry_with(MockAdapter::new("apt"));

    let err = rollback(&mut ledger, &registry, Scope::User, 5, false).unwrap_err();
    assert!(matches!(err, PakaError::TargetNotFound(_)));
}
