//! Lifecycle event taxonomy and the context payload handed to plugins.
//!
//! Events form a closed vocabulary: plugin configs refer to them by their
//! kebab-case wire name (the `[section]` headers in `plugin.conf`), and the
//! orchestrator fires them around every backend-mutating operation.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    // Search
    PreSearch,
    SearchSuccess,
    SearchFailure,
    PostSearch,
    // Install
    PreInstall,
    PreInstallSuccess,
    PostInstallSuccess,
    PostInstallFailure,
    PostInstall,
    // Remove
    PreRemove,
    PreRemoveSuccess,
    PostRemoveSuccess,
    PostRemoveFailure,
    PostRemove,
    // Purge
    PrePurge,
    PrePurgeSuccess,
    PostPurgeSuccess,
    PostPurgeFailure,
    PostPurge,
    // Upgrade
    PreUpgrade,
    PreUpgradeSuccess,
    PostUpgradeSuccess,
    PostUpgradeFailure,
    PostUpgrade,
    // Update
    PreUpdate,
    PostUpdateSuccess,
    PostUpdateFailure,
    PostUpdate,
    // Health
    PreHealth,
    HealthCheck,
    HealthFix,
    PostHealthSuccess,
    PostHealthFailure,
    PostHealth,
    // Session
    SessionStart,
    SessionEnd,
    // Diagnostics
    Error,
    Warning,
    // Configuration
    ConfigChanged,
    PluginEnabled,
    PluginDisabled,
    // Package manager lifecycle
    ManagerDetected,
    ManagerEnabled,
    ManagerDisabled,
    // History
    HistoryRecorded,
    HistoryCleared,
    // Cache
    CacheUpdated,
    CacheCleared,
}

impl Event {
    pub fn as_str(self) -> &'static str {
        match self {
            Event::PreSearch => "pre-search",
            Event::SearchSuccess => "search-success",
            Event::SearchFailure => "search-failure",
            Event::PostSearch => "post-search",
            Event::PreInstall => "pre-install",
            Event::PreInstallSuccess => "pre-install-success",
            Event::PostInstallSuccess => "post-install-success",
            Event::PostInstallFailure => "post-install-failure",
            Event::PostInstall => "post-install",
            Event::PreRemove => "pre-remove",
            Event::PreRemoveSuccess => "pre-remove-success",
            Event::PostRemoveSuccess => "post-remove-success",
            Event::PostRemoveFailure => "post-remove-failure",
            Event::PostRemove => "post-remove",
            Event::PrePurge => "pre-purge",
            Event::PrePurgeSuccess => "pre-purge-success",
            Event::PostPurgeSuccess => "post-purge-success",
            Event::PostPurgeFailure => "post-purge-failure",
            Event::PostPurge => "post-purge",
            Event::PreUpgrade => "pre-upgrade",
            Event::PreUpgradeSuccess => "pre-upgrade-success",
            Event::PostUpgradeSuccess => "post-upgrade-success",
            Event::PostUpgradeFailure => "post-upgrade-failure",
            Event::PostUpgrade => "post-upgrade",
            Event::PreUpdate => "pre-update",
            Event::PostUpdateSuccess => "post-update-success",
            Event::PostUpdateFailure => "post-update-failure",
            Event::PostUpdate => "post-update",
            Event::PreHealth => "pre-health",
            Event::HealthCheck => "health-check",
            Event::HealthFix => "health-fix",
            Event::PostHealthSuccess => "post-health-success",
            Event::PostHealthFailure => "post-health-failure",
            Event::PostHealth => "post-health",
            Event::SessionStart => "session-start",
            Event::SessionEnd => "session-end",
            Event::Error => "error",
            Event::Warning => "warning",
            Event::ConfigChanged => "config-changed",
            Event::PluginEnabled => "plugin-enabled",
            Event::PluginDisabled => "plugin-disabled",
            Event::ManagerDetected => "manager-detected",
            Event::ManagerEnabled => "manager-enabled",
            Event::ManagerDisabled => "manager-disabled",
            Event::HistoryRecorded => "history-recorded",
            Event::HistoryCleared => "history-cleared",
            Event::CacheUpdated => "cache-updated",
            Event::CacheCleared => "cache-cleared",
        }
    }

    pub fn from_name(name: &str) -> Option<Event> {
        ALL_EVENTS.iter().copied().find(|e| e.as_str() == name)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const ALL_EVENTS: &[Event] = &[
    Event::PreSearch,
    Event::SearchSuccess,
    Event::SearchFailure,
    Event::PostSearch,
    Event::PreInstall,
    Event::PreInstallSuccess,
    Event::PostInstallSuccess,
    Event::PostInstallFailure,
    Event::PostInstall,
    Event::PreRemove,
    Event::PreRemoveSuccess,
    Event::PostRemoveSuccess,
    Event::PostRemoveFailure,
    Event::PostRemove,
    Event::PrePurge,
    Event::PrePurgeSuccess,
    Event::PostPurgeSuccess,
    Event::PostPurgeFailure,
    Event::PostPurge,
    Event::PreUpgrade,
    Event::PreUpgradeSuccess,
    Event::PostUpgradeSuccess,
    Event::PostUpgradeFailure,
    Event::PostUpgrade,
    Event::PreUpdate,
    Event::PostUpdateSuccess,
    Event::PostUpdateFailure,
    Event::PostUpdate,
    Event::PreHealth,
    Event::HealthCheck,
    Event::HealthFix,
    Event::PostHealthSuccess,
    Event::PostHealthFailure,
    Event::PostHealth,
    Event::SessionStart,
    Event::SessionEnd,
    Event::Error,
    Event::Warning,
    Event::ConfigChanged,
    Event::PluginEnabled,
    Event::PluginDisabled,
    Event::ManagerDetected,
    Event::ManagerEnabled,
    Event::ManagerDisabled,
    Event::HistoryRecorded,
    Event::HistoryCleared,
    Event::CacheUpdated,
    Event::CacheCleared,
];

/// Backend-mutating operations the orchestrator wraps with events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Install,
    Remove,
    Purge,
    Update,
    Upgrade,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Install => "install",
            OperationKind::Remove => "remove",
            OperationKind::Purge => "purge",
            OperationKind::Update => "update",
            OperationKind::Upgrade => "upgrade",
        }
    }

    pub fn pre_event(self) -> Event {
        match self {
            OperationKind::Install => Event::PreInstall,
            OperationKind::Remove => Event::PreRemove,
            OperationKind::Purge => Event::PrePurge,
            OperationKind::Update => Event::PreUpdate,
            OperationKind::Upgrade => Event::PreUpgrade,
        }
    }

    /// Gating event fired once the packages are confirmed to resolve.
    /// Update has no such refinement in the vocabulary.
    pub fn pre_success_event(self) -> Option<Event> {
        match self {
            OperationKind::Install => Some(Event::PreInstallSuccess),
            OperationKind::Remove => Some(Event::PreRemoveSuccess),
            OperationKind::Purge => Some(Event::PrePurgeSuccess),
            OperationKind::Update => None,
            OperationKind::Upgrade => Some(Event::PreUpgradeSuccess),
        }
    }

    pub fn post_success_event(self) -> Event {
        match self {
            OperationKind::Install => Event::PostInstallSuccess,
            OperationKind::Remove => Event::PostRemoveSuccess,
            OperationKind::Purge => Event::PostPurgeSuccess,
            OperationKind::Update => Event::PostUpdateSuccess,
            OperationKind::Upgrade => Event::PostUpgradeSuccess,
        }
    }

    pub fn post_failure_event(self) -> Event {
        match self {
            OperationKind::Install => Event::PostInstallFailure,
            OperationKind::Remove => Event::PostRemoveFailure,
            OperationKind::Purge => Event::PostPurgeFailure,
            OperationKind::Update => Event::PostUpdateFailure,
            OperationKind::Upgrade => Event::PostUpgradeFailure,
        }
    }

    pub fn post_event(self) -> Event {
        match self {
            OperationKind::Install => Event::PostInstall,
            OperationKind::Remove => Event::PostRemove,
            OperationKind::Purge => Event::PostPurge,
            OperationKind::Update => Event::PostUpdate,
            OperationKind::Upgrade => Event::PostUpgrade,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    Str(String),
    Bool(bool),
    List(Vec<String>),
}

impl ContextValue {
    pub fn as_display(&self) -> String {
        match self {
            ContextValue::Str(s) => s.clone(),
            ContextValue::Bool(b) => b.to_string(),
            ContextValue::List(items) => items.join(" "),
        }
    }
}

/// Ordered key/value payload carried by every event.
///
/// The dispatcher hands contexts to plugins read-only and never mutates them.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    entries: Vec<(String, ContextValue)>,
}

impl EventContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, preserving first-insertion order.
    pub fn set(mut self, key: &str, value: ContextValue) -> Self {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
        self
    }

    pub fn with_str(self, key: &str, value: &str) -> Self {
        self.set(key, ContextValue::Str(value.to_string()))
    }

    pub fn with_bool(self, key: &str, value: bool) -> Self {
        self.set(key, ContextValue::Bool(value))
    }

    pub fn with_list(self, key: &str, values: &[String]) -> Self {
        self.set(key, ContextValue::List(values.to_vec()))
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn packages(&self) -> Vec<String> {
        match self.get("packages") {
            Some(ContextValue::List(items)) => items.clone(),
            Some(other) => vec![other.as_display()],
            None => Vec::new(),
        }
    }

    pub fn entries(&self) -> &[(String, ContextValue)] {
        &self.entries
    }
}

/// Context for a package operation, shared by all orchestrator call sites.
pub fn operation_context(op: OperationKind, manager: &str, packages: &[String]) -> EventContext {
    EventContext::new()
        .with_str("operation", op.as_str())
        .with_str("package-manager", manager)
        .with_list("packages", packages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_round_trip() {
        for event in ALL_EVENTS {
            assert_eq!(Event::from_name(event.as_str()), Some(*event));
        }
    }

    #[test]
    fn unknown_event_name_is_none() {
        assert_eq!(Event::from_name("pre-frobnicate"), None);
    }

    #[test]
    fn context_set_replaces_in_place() {
        let ctx = EventContext::new()
            .with_str("a", "1")
            .with_str("b", "2")
            .with_str("a", "3");
        assert_eq!(ctx.entries().len(), 2);
        assert_eq!(ctx.entries()[0].1, ContextValue::Str("3".into()));
    }

    #[test]
    fn operation_events_line_up() {
        assert_eq!(OperationKind::Install.pre_event(), Event::PreInstall);
        assert_eq!(
            OperationKind::Install.pre_success_event(),
            Some(Event::PreInstallSuccess)
        );
        assert_eq!(OperationKind::Update.pre_success_event(), None);
        assert_eq!(
            OperationKind::Purge.post_failure_event(),
            Event::PostPurgeFailure
        );
    }
}
