//! The in-process view over both scope ledgers, with the privilege
//! boundary enforced at every system-scope mutation.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};

use crate::core::Scope;
use crate::error::{PakaError, Result};
use crate::history::store::LedgerStore;
use crate::history::{InstallDetails, InstallationRecord, LedgerDocument, RollbackRecord};
use crate::ui;

pub struct HistoryLedger {
    store: Box<dyn LedgerStore>,
    user: LedgerDocument,
    system: LedgerDocument,
    privileged: bool,
}

/// Aggregate view for `paka history stats`.
#[derive(Debug, Default)]
pub struct LedgerStatistics {
    pub total_installations: usize,
    pub total_rollbacks: usize,
    pub active_installations: usize,
    pub unique_packages: usize,
    pub by_manager: BTreeMap<String, usize>,
    pub recent: Vec<InstallationRecord>,
}

impl HistoryLedger {
    /// Load both scope documents. A missing system file, or one we are
    /// not allowed to read, degrades to an empty document with a
    /// warning rather than failing the whole program.
    pub fn open(store: Box<dyn LedgerStore>, privileged: bool) -> Result<Self> {
        let user = match store.load(Scope::User)? {
            Some(doc) => doc,
            None => LedgerDocument::empty(Scope::User),
        };
        let system = match store.load(Scope::System) {
            Ok(Some(doc)) => doc,
            Ok(None) => LedgerDocument::empty(Scope::System),
            Err(e) => {
                if privileged {
                    return Err(e);
                }
                ui::verbose(&format!("system history unavailable: {}", e));
                LedgerDocument::empty(Scope::System)
            }
        };
        Ok(Self {
            store,
            user,
            system,
            privileged,
        })
    }

    pub fn document(&self, scope: Scope) -> &LedgerDocument {
        match scope {
            Scope::User => &self.user,
            Scope::System => &self.system,
        }
    }

    fn document_mut(&mut self, scope: Scope) -> Result<&mut LedgerDocument> {
        self.check_write(scope)?;
        Ok(match scope {
            Scope::User => &mut self.user,
            Scope::System => &mut self.system,
        })
    }

    fn check_write(&self, scope: Scope) -> Result<()> {
        if scope == Scope::System && !self.privileged {
            return Err(PakaError::Authorization(
                "modifying the system history requires root privileges".into(),
            ));
        }
        Ok(())
    }

    fn persist(&mut self, scope: Scope) -> Result<()> {
        let doc = match scope {
            Scope::User => &mut self.user,
            Scope::System => &mut self.system,
        };
        doc.refresh_metadata();
        self.store.save(scope, doc)
    }

    pub fn record_install(
        &mut self,
        manager: &str,
        packages: &[String],
        scope: Scope,
        details: InstallDetails,
    ) -> Result<()> {
        let user = std::env::var("USER").unwrap_or_else(|_| "unknown".into());
        let record = InstallationRecord {
            timestamp: Utc::now(),
            manager: manager.to_string(),
            packages: packages.to_vec(),
            dependencies: details.dependencies,
            version: details.version.unwrap_or_default(),
            size: details.size,
            user,
            scope,
            removed: false,
            removed_timestamp: None,
            removed_packages: Vec::new(),
        };
        self.document_mut(scope)?.installations.push(record);
        self.persist(scope)
    }

    /// Flag packages as gone in every matching record. Records are
    /// never deleted; a record touched here keeps its place so indexes
    /// stay stable.
    pub fn mark_removed(&mut self, manager: &str, packages: &[String], scope: Scope) -> Result<()> {
        let mut changed = false;
        {
            let doc = self.document_mut(scope)?;
            let now = Utc::now();
            for record in doc.installations.iter_mut() {
                if record.manager != manager {
                    continue;
                }
                let hits: Vec<String> = record
                    .packages
                    .iter()
                    .filter(|p| packages.contains(p) && !record.removed_packages.contains(p))
                    .cloned()
                    .collect();
                if hits.is_empty() {
                    continue;
                }
                record.removed = true;
                record.removed_timestamp = Some(now);
                record.removed_packages.extend(hits);
                changed = true;
            }
        }
        if changed {
            self.persist(scope)?;
        }
        Ok(())
    }

    /// Most-recent-first view, optionally filtered by manager.
    pub fn installations(
        &self,
        scope: Scope,
        limit: Option<usize>,
        manager: Option<&str>,
    ) -> Vec<&InstallationRecord> {
        let mut records: Vec<&InstallationRecord> = self
            .document(scope)
            .installations
            .iter()
            .filter(|r| manager.map_or(true, |m| r.manager == m))
            .collect();
        records.reverse();
        if let Some(n) = limit {
            records.truncate(n);
        }
        records
    }

    /// Merged user+system view, sorted by timestamp ascending. The
    /// system half is whatever this process could read at open time
    /// (empty when unprivileged).
    pub fn all_installations(&self) -> Vec<&InstallationRecord> {
        let mut records: Vec<&InstallationRecord> = self
            .user
            .installations
            .iter()
            .chain(self.system.installations.iter())
            .collect();
        records.sort_by_key(|r| r.timestamp);
        records
    }

    /// Record by its stored position (the index shown by `history list`).
    pub fn installation(&self, scope: Scope, index: usize) -> Result<&InstallationRecord> {
        self.document(scope)
            .installations
            .get(index)
            .ok_or_else(|| {
                PakaError::TargetNotFound(format!("no installation with index {}", index))
            })
    }

    /// Case-insensitive substring match over package names, dependencies
    /// and manager.
    pub fn search(&self, scope: Scope, query: &str) -> Vec<(usize, &InstallationRecord)> {
        let needle = query.to_lowercase();
        self.document(scope)
            .installations
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                r.manager.to_lowercase().contains(&needle)
                    || r.packages.iter().any(|p| p.to_lowercase().contains(&needle))
                    || r.dependencies
                        .iter()
                        .any(|d| d.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn statistics(&self, scope: Scope) -> LedgerStatistics {
        let doc = self.document(scope);
        let mut by_manager = BTreeMap::new();
        let mut unique = std::collections::BTreeSet::new();
        let mut active = 0;
        for record in &doc.installations {
            *by_manager.entry(record.manager.clone()).or_insert(0) += 1;
            for pkg in &record.packages {
                unique.insert(pkg.clone());
            }
            if !record.removed {
                active += 1;
            }
        }
        let mut recent: Vec<InstallationRecord> = doc.installations.clone();
        recent.reverse();
        recent.truncate(5);
        LedgerStatistics {
            total_installations: doc.installations.len(),
            total_rollbacks: doc.rollbacks.len(),
            active_installations: active,
            unique_packages: unique.len(),
            by_manager,
            recent,
        }
    }

    pub fn rollbacks(&self, scope: Scope) -> &[RollbackRecord] {
        &self.document(scope).rollbacks
    }

    pub fn record_rollback(&mut self, scope: Scope, record: RollbackRecord) -> Result<()> {
        self.document_mut(scope)?.rollbacks.push(record);
        self.persist(scope)
    }

    /// Drop everything in a scope. The audit trail is gone after this,
    /// so callers must confirm with the user first.
    pub fn clear(&mut self, scope: Scope) -> Result<usize> {
        let doc = self.document_mut(scope)?;
        let count = doc.installations.len() + doc.rollbacks.len();
        doc.installations.clear();
        doc.rollbacks.clear();
        self.persist(scope)?;
        Ok(count)
    }

    /// Retention sweep: drop removed records whose removal is older than
    /// `days`. Active records are kept regardless of age.
    pub fn cleanup_old_entries(&mut self, scope: Scope, days: i64) -> Result<usize> {
        let cutoff = Utc::now() - Duration::days(days);
        let doc = self.document_mut(scope)?;
        let before = doc.installations.len();
        doc.installations
            .retain(|r| !r.removed || r.removed_timestamp.unwrap_or(r.timestamp) >= cutoff);
        let dropped = before - doc.installations.len();
        if dropped > 0 {
            self.persist(scope)?;
        }
        Ok(dropped)
    }

    pub fn validate(&self, scope: Scope) -> Vec<String> {
        self.document(scope).integrity_issues()
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }
}
