//! Name-keyed adapter registry, built once at startup.
//!
//! No dynamic discovery: the lookup map is populated from the builtin
//! specs (or explicitly inserted adapters in tests) and consulted by
//! name everywhere else.

use super::adapter::{CommandAdapter, BUILTIN_SPECS};
use super::BackendAdapter;
use std::collections::BTreeMap;

pub struct BackendRegistry {
    adapters: BTreeMap<String, Box<dyn BackendAdapter>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            adapters: BTreeMap::new(),
        }
    }

    /// Registry over all builtin command-driven adapters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for spec in BUILTIN_SPECS {
            registry.insert(Box::new(CommandAdapter::new(spec.clone())));
        }
        registry
    }

    pub fn insert(&mut self, adapter: Box<dyn BackendAdapter>) {
        self.adapters.insert(adapter.name().to_string(), adapter);
    }

    pub fn get(&self, name: &str) -> Option<&dyn BackendAdapter> {
        self.adapters.get(name).map(|a| a.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }

    /// Adapters that are both enabled and whose binary is on PATH, in
    /// stable name order.
    pub fn usable(&self) -> Vec<&dyn BackendAdapter> {
        self.adapters
            .values()
            .map(|a| a.as_ref())
            .filter(|a| a.is_enabled() && a.is_available())
            .collect()
    }

    pub fn all(&self) -> Vec<&dyn BackendAdapter> {
        self.adapters.values().map(|a| a.as_ref()).collect()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
