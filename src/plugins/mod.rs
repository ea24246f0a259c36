//! Plugin units: independently enable/disable-able bundles of
//! event-to-action bindings, discovered from per-scope directories.

pub mod action;
pub mod config;
pub mod dispatcher;
pub mod exec;

use crate::core::Scope;
use crate::error::{PakaError, Result};
use crate::events::{Event, EventContext};
use crate::ui;
use std::path::PathBuf;

pub struct PluginUnit {
    pub name: String,
    pub origin: Scope,
    pub dir: PathBuf,
    pub config: config::PluginConfig,
}

impl PluginUnit {
    /// Load a unit from its directory. A missing or broken config file
    /// yields a unit with defaults; warnings go to the UI layer.
    pub fn load(name: &str, dir: PathBuf, origin: Scope) -> Self {
        let config_path = dir.join(config::CONFIG_FILE_NAME);
        let config = match std::fs::read_to_string(&config_path) {
            Ok(content) => {
                let (config, warnings) = config::parse(&content);
                for warning in warnings {
                    ui::warning(&format!("Plugin '{}': {}", name, warning));
                }
                config
            }
            Err(e) => {
                ui::warning(&format!(
                    "Plugin '{}': cannot read {}: {}",
                    name,
                    config_path.display(),
                    e
                ));
                config::PluginConfig::default()
            }
        };

        Self {
            name: name.to_string(),
            origin,
            dir,
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Handle one event: run the bound actions in order, stopping at the
    /// first failure. Disabled units and unbound events are side-effect
    /// free successes.
    pub fn handle(&self, event: Event, ctx: &EventContext) -> bool {
        if !self.is_enabled() {
            return true;
        }
        let actions = match self.config.actions_for(event) {
            Some(actions) => actions,
            None => return true,
        };

        for template in actions {
            let substituted = self.substitute_action(template, ctx);
            if !exec::execute(&substituted, &self.name, &self.dir) {
                return false;
            }
        }
        true
    }

    fn substitute_action(&self, template: &action::Action, ctx: &EventContext) -> action::Action {
        let payload = action::substitute(
            template.payload(),
            ctx,
            &self.name,
            &self.dir.to_string_lossy(),
        );
        match template {
            action::Action::Run(_) => action::Action::Run(payload),
            action::Action::Script(_) => action::Action::Script(payload),
            action::Action::Notify(_) => action::Action::Notify(payload),
            action::Action::Log(_) => action::Action::Log(payload),
        }
    }

    /// Flip the enabled flag and rewrite this unit's own config file.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.config.enabled = enabled;
        let config_path = self.dir.join(config::CONFIG_FILE_NAME);
        std::fs::write(&config_path, config::serialize(&self.config)).map_err(|e| {
            PakaError::IoError {
                path: config_path,
                source: e,
            }
        })
    }

    /// Config issues a careful user would want to know about.
    pub fn lint(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (event, actions) in &self.config.bindings {
            if actions.is_empty() {
                issues.push(format!("Event '{}' has no actions", event));
            }
            for template in actions {
                // An unrecognized prefix parses as a Run of the whole
                // string; lint the payload to catch the typo.
                if let action::Action::Run(payload) = template {
                    if let Some(warning) = action::Action::lint(payload) {
                        issues.push(warning);
                    }
                }
            }
        }
        issues
    }
}
