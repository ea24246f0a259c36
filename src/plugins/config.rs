//! `plugin.conf` text format: `key=value` metadata followed by
//! `[event-name]` sections of `action=` lines.
//!
//! The parser is lenient by contract: malformed lines and unknown events
//! produce warnings and are skipped; a broken file never aborts plugin
//! discovery.

use super::action::Action;
use crate::events::Event;

pub const CONFIG_FILE_NAME: &str = "plugin.conf";

#[derive(Debug, Clone)]
pub struct PluginConfig {
    pub enabled: bool,
    pub description: String,
    pub version: String,
    pub author: String,
    /// Event bindings in declaration order.
    pub bindings: Vec<(Event, Vec<Action>)>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            description: String::new(),
            version: "1.0.0".to_string(),
            author: String::new(),
            bindings: Vec::new(),
        }
    }
}

impl PluginConfig {
    pub fn actions_for(&self, event: Event) -> Option<&[Action]> {
        self.bindings
            .iter()
            .find(|(e, _)| *e == event)
            .map(|(_, actions)| actions.as_slice())
    }

    pub fn subscribed_events(&self) -> Vec<Event> {
        self.bindings.iter().map(|(e, _)| *e).collect()
    }
}

/// Parse a config document. Returns the config plus human-readable
/// warnings for every skipped line.
pub fn parse(content: &str) -> (PluginConfig, Vec<String>) {
    let mut config = PluginConfig::default();
    let mut warnings = Vec::new();
    // Section state: Some(event) inside a recognized section, None at the
    // top (metadata) or inside an unknown section (actions dropped).
    let mut current: Option<Event> = None;
    let mut in_unknown_section = false;

    for (lineno, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            let name = &line[1..line.len() - 1];
            match Event::from_name(name) {
                Some(event) => {
                    if config.bindings.iter().all(|(e, _)| *e != event) {
                        config.bindings.push((event, Vec::new()));
                    }
                    current = Some(event);
                    in_unknown_section = false;
                }
                None => {
                    warnings.push(format!("Line {}: unknown event '{}'", lineno + 1, name));
                    current = None;
                    in_unknown_section = true;
                }
            }
            continue;
        }

        let (key, value) = match line.split_once('=') {
            Some(kv) => kv,
            None => {
                warnings.push(format!("Line {}: not a key=value line", lineno + 1));
                continue;
            }
        };

        match (key.trim(), current) {
            ("action", Some(event)) => {
                if let Some((_, actions)) = config.bindings.iter_mut().find(|(e, _)| *e == event) {
                    actions.push(Action::parse(value));
                }
            }
            ("action", None) => {
                if !in_unknown_section {
                    warnings.push(format!(
                        "Line {}: action outside of an event section",
                        lineno + 1
                    ));
                }
            }
            ("enabled", _) => config.enabled = value.trim().eq_ignore_ascii_case("true"),
            ("description", _) => config.description = value.to_string(),
            ("version", _) => config.version = value.to_string(),
            ("author", _) => config.author = value.to_string(),
            // name= is allowed for self-description but the directory name
            // is authoritative
            ("name", _) => {}
            (other, _) => {
                warnings.push(format!("Line {}: unknown key '{}'", lineno + 1, other));
            }
        }
    }

    (config, warnings)
}

/// Serialize back to the text format. Used when enable/disable rewrites
/// the unit's own config file.
pub fn serialize(config: &PluginConfig) -> String {
    let mut lines = vec![
        format!("description={}", config.description),
        format!("version={}", config.version),
        format!("author={}", config.author),
        format!("enabled={}", config.enabled),
        String::new(),
    ];
    for (event, actions) in &config.bindings {
        lines.push(format!("[{}]", event));
        for action in actions {
            lines.push(format!("action={}", action.to_config_line()));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Snapper plugin
description=Filesystem snapshots around installs
version=2.1.0
author=someone
enabled=true

[pre-install-success]
action=run:snapper create --description \"before $packages\"
action=notify:about to install $packages

[post-install-success]
action=log:installed $packages
";

    #[test]
    fn parses_metadata_and_sections() {
        let (config, warnings) = parse(SAMPLE);
        assert!(warnings.is_empty(), "warnings: {:?}", warnings);
        assert!(config.enabled);
        assert_eq!(config.version, "2.1.0");
        assert_eq!(config.bindings.len(), 2);
        let actions = config
            .actions_for(Event::PreInstallSuccess)
            .expect("bound event");
        assert_eq!(actions.len(), 2);
        assert!(matches!(actions[1], Action::Notify(_)));
    }

    #[test]
    fn malformed_lines_warn_but_do_not_abort() {
        let text = "description=ok\nthis is not a kv line\n[no-such-event]\naction=run:x\n[post-install]\naction=run:y\n";
        let (config, warnings) = parse(text);
        assert_eq!(config.description, "ok");
        // Unknown event and bad line warned; actions under the unknown
        // section dropped silently
        assert_eq!(warnings.len(), 2);
        assert_eq!(config.bindings.len(), 1);
        assert!(config.actions_for(Event::PostInstall).is_some());
    }

    #[test]
    fn empty_config_is_enabled_with_defaults() {
        let (config, warnings) = parse("");
        assert!(config.enabled);
        assert!(config.bindings.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn serialize_then_parse_is_lossless() {
        let (config, _) = parse(SAMPLE);
        let (reparsed, warnings) = parse(&serialize(&config));
        assert!(warnings.is_empty());
        assert_eq!(reparsed.enabled, config.enabled);
        assert_eq!(reparsed.description, config.description);
        assert_eq!(reparsed.bindings, config.bindings);
    }

    #[test]
    fn disabled_flag_parses() {
        let (config, _) = parse("enabled=false\n");
        assert!(!config.enabled);
    }
}
