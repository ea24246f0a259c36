//! Event fan-out over discovered plugin units.
//!
//! Units load from the system root first, then the user root; a user
//! unit with the same name replaces the system one (it keeps the earlier
//! position so invocation order stays stable).
//!
//! `trigger` deliberately does not short-circuit: every subscribed unit
//! runs even after one has failed, and the result is the logical AND.
//! Diagnostic units (logging, notifications) still fire when a gating
//! unit vetoes.

use super::config::CONFIG_FILE_NAME;
use super::PluginUnit;
use crate::core::Scope;
use crate::error::{PakaError, Result};
use crate::events::{Event, EventContext};
use crate::ui;
use std::path::Path;

pub struct PluginDispatcher {
    units: Vec<PluginUnit>,
}

impl PluginDispatcher {
    pub fn empty() -> Self {
        Self { units: Vec::new() }
    }

    /// Discover plugin units. Missing roots are fine; unreadable entries
    /// warn and are skipped. Never fails.
    pub fn load(system_root: &Path, user_root: &Path) -> Self {
        let mut dispatcher = Self::empty();
        dispatcher.load_root(system_root, Scope::System);
        dispatcher.load_root(user_root, Scope::User);
        dispatcher
    }

    fn load_root(&mut self, root: &Path, origin: Scope) {
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(_) => return,
        };

        // Sort for a deterministic invocation order.
        let mut dirs: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir() && p.join(CONFIG_FILE_NAME).exists())
            .collect();
        dirs.sort();

        for dir in dirs {
            let name = match dir.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => {
                    ui::warning(&format!("Skipping plugin with unreadable name: {}", dir.display()));
                    continue;
                }
            };
            let unit = PluginUnit::load(&name, dir, origin);
            match self.units.iter().position(|u| u.name == unit.name) {
                // User units shadow system units of the same name.
                Some(idx) => self.units[idx] = unit,
                None => self.units.push(unit),
            }
        }
    }

    /// Fan an event out to every enabled subscribed unit, in load order.
    /// Returns true iff every invoked unit succeeded; all units run
    /// regardless of earlier failures.
    pub fn trigger(&self, event: Event, ctx: &EventContext) -> bool {
        let mut all_ok = true;
        for unit in &self.units {
            if !unit.handle(event, ctx) {
                all_ok = false;
            }
        }
        all_ok
    }

    pub fn units(&self) -> &[PluginUnit] {
        &self.units
    }

    pub fn enabled_units(&self) -> impl Iterator<Item = &PluginUnit> {
        self.units.iter().filter(|u| u.is_enabled())
    }

    pub fn get(&self, name: &str) -> Option<&PluginUnit> {
        self.units.iter().find(|u| u.name == name)
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        let unit = self
            .units
            .iter_mut()
            .find(|u| u.name == name)
            .ok_or_else(|| PakaError::TargetNotFound(format!("plugin '{}'", name)))?;
        unit.set_enabled(enabled)
    }

    /// Per-unit lint results for `config plugins check`.
    pub fn lint_all(&self) -> Vec<(String, Vec<String>)> {
        self.units
            .iter()
            .map(|u| (u.name.clone(), u.lint()))
            .filter(|(_, issues)| !issues.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use std::fs;
    use tempfile::tempdir;

    fn write_plugin(root: &Path, name: &str, conf: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).expect("plugin dir");
        fs::write(dir.join(CONFIG_FILE_NAME), conf).expect("plugin.conf");
    }

    #[test]
    fn aggregation_runs_every_unit_and_ands_results() {
        let sys = tempdir().expect("sys");
        let user = tempdir().expect("user");
        // Three units: one fails, two succeed; the succeeding ones leave
        // marker files proving they still ran after the failure.
        write_plugin(
            sys.path(),
            "a-fails",
            "enabled=true\n[pre-install-success]\naction=run:false\n",
        );
        write_plugin(
            sys.path(),
            "b-marks",
            "enabled=true\n[pre-install-success]\naction=run:touch $plugin-dir/ran\n",
        );
        write_plugin(
            user.path(),
            "c-marks",
            "enabled=true\n[pre-install-success]\naction=run:touch $plugin-dir/ran\n",
        );

        let dispatcher = PluginDispatcher::load(sys.path(), user.path());
        let ok = dispatcher.trigger(Event::PreInstallSuccess, &EventContext::new());
        assert!(!ok, "one failing unit vetoes the aggregate");
        assert!(sys.path().join("b-marks/ran").exists());
        assert!(user.path().join("c-marks/ran").exists());
    }

    #[test]
    fn all_success_aggregates_to_true() {
        let sys = tempdir().expect("sys");
        let user = tempdir().expect("user");
        write_plugin(
            user.path(),
            "ok",
            "enabled=true\n[post-install]\naction=run:true\n",
        );
        let dispatcher = PluginDispatcher::load(sys.path(), user.path());
        assert!(dispatcher.trigger(Event::PostInstall, &EventContext::new()));
    }

    #[test]
    fn user_unit_shadows_system_unit_of_same_name() {
        let sys = tempdir().expect("sys");
        let user = tempdir().expect("user");
        write_plugin(sys.path(), "backup", "enabled=false\ndescription=system copy\n");
        write_plugin(user.path(), "backup", "enabled=true\ndescription=user copy\n");

        let dispatcher = PluginDispatcher::load(sys.path(), user.path());
        let matching: Vec<_> = dispatcher
            .units()
            .iter()
            .filter(|u| u.name == "backup")
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].origin, Scope::User);
        assert!(matching[0].is_enabled());
        assert_eq!(dispatcher.enabled_units().count(), 1);
    }

    #[test]
    fn disabled_unit_is_a_silent_success() {
        let sys = tempdir().expect("sys");
        let user = tempdir().expect("user");
        write_plugin(
            user.path(),
            "off",
            "enabled=false\n[pre-install-success]\naction=run:false\naction=run:touch $plugin-dir/ran\n",
        );
        let dispatcher = PluginDispatcher::load(sys.path(), user.path());
        assert!(dispatcher.trigger(Event::PreInstallSuccess, &EventContext::new()));
        assert!(!user.path().join("off/ran").exists());
    }

    #[test]
    fn unit_stops_at_first_failing_action() {
        let sys = tempdir().expect("sys");
        let user = tempdir().expect("user");
        write_plugin(
            user.path(),
            "stopper",
            "enabled=true\n[pre-remove-success]\naction=run:false\naction=run:touch $plugin-dir/after\n",
        );
        let dispatcher = PluginDispatcher::load(sys.path(), user.path());
        assert!(!dispatcher.trigger(Event::PreRemoveSuccess, &EventContext::new()));
        assert!(
            !user.path().join("stopper/after").exists(),
            "actions after the first failure must not run"
        );
    }

    #[test]
    fn unsubscribed_event_is_a_no_op_success() {
        let sys = tempdir().expect("sys");
        let user = tempdir().expect("user");
        write_plugin(
            user.path(),
            "narrow",
            "enabled=true\n[post-remove]\naction=run:false\n",
        );
        let dispatcher = PluginDispatcher::load(sys.path(), user.path());
        assert!(dispatcher.trigger(Event::PostInstall, &EventContext::new()));
    }

    #[test]
    fn set_enabled_rewrites_config_file() {
        let sys = tempdir().expect("sys");
        let user = tempdir().expect("user");
        write_plugin(user.path(), "togglable", "enabled=true\ndescription=x\n");

        let mut dispatcher = PluginDispatcher::load(sys.path(), user.path());
        dispatcher.set_enabled("togglable", false).expect("disable");

        // Reload from disk and verify persistence
        let reloaded = PluginDispatcher::load(sys.path(), user.path());
        assert!(!reloaded.get("togglable").expect("unit").is_enabled());
    }

    #[test]
    fn set_enabled_unknown_plugin_errors() {
        let mut dispatcher = PluginDispatcher::empty();
        assert!(dispatcher.set_enabled("ghost", true).is_err());
    }

    #[test]
    fn lint_reports_empty_sections() {
        let sys = tempdir().expect("sys");
        let user = tempdir().expect("user");
        write_plugin(user.path(), "sloppy", "enabled=true\n[post-install]\n");
        let dispatcher = PluginDispatcher::load(sys.path(), user.path());
        let lint = dispatcher.lint_all();
        assert_eq!(lint.len(), 1);
        assert!(lint[0].1[0].contains("no actions"));
    }
}
