//! Uniform interface over real package managers.
//!
//! The core never inspects manager-specific flags; it consumes only the
//! shapes defined here. Expected external failures (non-zero exit, timeout,
//! missing binary) surface as `OpOutcome` values, never as panics.

pub mod adapter;
pub mod registry;

use crate::error::Result;
use std::collections::BTreeMap;

/// One package as reported by a backend query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub manager: String,
    /// Whether the package is currently installed on this machine.
    pub installed: bool,
}

/// Uniform result of a mutating backend operation.
#[derive(Debug, Clone, Default)]
pub struct OpOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub details: BTreeMap<String, String>,
}

impl OpOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            details: BTreeMap::new(),
        }
    }
}

/// Uniform operation surface over one real package manager.
///
/// `search` returns `Err` only when the query itself could not be carried
/// out (binary missing, timeout); "nothing found" is an empty `Ok` list.
/// The reconciliation engine depends on that distinction.
pub trait BackendAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Configured on/off switch, independent of binary presence.
    fn is_enabled(&self) -> bool;

    /// Binary present on PATH.
    fn is_available(&self) -> bool;

    fn search(&self, query: &str) -> Result<Vec<PackageInfo>>;

    fn install(&self, packages: &[String]) -> OpOutcome;

    fn remove(&self, packages: &[String]) -> OpOutcome;

    fn purge(&self, packages: &[String]) -> OpOutcome;

    fn update(&self) -> OpOutcome;

    fn upgrade(&self) -> OpOutcome;
}
