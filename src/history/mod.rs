//! Installation history: durable, queryable record of what was installed,
//! by which manager, and whether it is still present.
//!
//! Records are never deleted by normal operation; removal only flips
//! flags, preserving the audit trail.

pub mod ledger;
pub mod reconcile;
pub mod rollback;
pub mod store;

use crate::core::Scope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationRecord {
    pub timestamp: DateTime<Utc>,
    pub manager: String,
    pub packages: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub user: String,
    pub scope: Scope,
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub removed_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub removed_packages: Vec<String>,
}

impl InstallationRecord {
    /// Whether any of this record's packages are still believed installed.
    pub fn has_pending_packages(&self) -> bool {
        !self.removed
            || self
                .packages
                .iter()
                .any(|p| !self.removed_packages.contains(p))
    }
}

/// Append-only audit entry for an explicit rollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackRecord {
    pub timestamp: DateTime<Utc>,
    pub installation_index: usize,
    pub reason: String,
    /// Snapshot of the installation as it looked before the rollback.
    pub original_installation: InstallationRecord,
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerMeta {
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub total_installations: usize,
    pub total_rollbacks: usize,
    pub scope: Scope,
}

/// One persisted ledger document, one per scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerDocument {
    pub installations: Vec<InstallationRecord>,
    pub rollbacks: Vec<RollbackRecord>,
    pub metadata: LedgerMeta,
}

impl LedgerDocument {
    pub fn empty(scope: Scope) -> Self {
        let now = Utc::now();
        Self {
            installations: Vec::new(),
            rollbacks: Vec::new(),
            metadata: LedgerMeta {
                created: now,
                last_updated: now,
                total_installations: 0,
                total_rollbacks: 0,
                scope,
            },
        }
    }

    /// Recompute the counters from the lists. Called on every save so
    /// metadata can never drift from the actual contents.
    pub fn refresh_metadata(&mut self) {
        self.metadata.total_installations = self.installations.len();
        self.metadata.total_rollbacks = self.rollbacks.len();
        self.metadata.last_updated = Utc::now();
    }

    /// Counter/list mismatches a health check should surface.
    pub fn integrity_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.metadata.total_installations != self.installations.len() {
            issues.push(format!(
                "metadata says {} installations, list has {}",
                self.metadata.total_installations,
                self.installations.len()
            ));
        }
        if self.metadata.total_rollbacks != self.rollbacks.len() {
            issues.push(format!(
                "metadata says {} rollbacks, list has {}",
                self.metadata.total_rollbacks,
                self.rollbacks.len()
            ));
        }
        for (i, record) in self.installations.iter().enumerate() {
            if record.packages.is_empty() {
                issues.push(format!("installation {} has no packages", i));
            }
            if record.removed && record.removed_timestamp.is_none() {
                issues.push(format!("installation {} removed without timestamp", i));
            }
        }
        issues
    }
}

/// Details a backend reported about a successful install.
#[derive(Debug, Clone, Default)]
pub struct InstallDetails {
    pub dependencies: Vec<String>,
    pub version: Option<String>,
    pub size: Option<u64>,
}
