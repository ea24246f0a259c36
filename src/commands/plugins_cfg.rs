//! `paka config plugins`: list, enable, disable and lint plugin units.

use crate::core::AppContext;
use crate::error::Result;
use crate::events::{Event, EventContext};
use crate::ui;

use super::observe;

pub fn list(app: &AppContext) -> Result<()> {
    let units = app.dispatcher.units();
    if units.is_empty() {
        ui::info("no plugins installed");
        return Ok(());
    }
    ui::header("Plugins");
    for unit in units {
        let state = if unit.is_enabled() { "enabled" } else { "disabled" };
        ui::keyval(&unit.name, &format!("{} ({} scope)", state, unit.origin));
        if !unit.config.description.is_empty() {
            ui::indent(&unit.config.description, 1);
        }
        let events: Vec<&str> = unit
            .config
            .subscribed_events()
            .iter()
            .map(|e| e.as_str())
            .collect();
        if !events.is_empty() {
            ui::indent(&format!("events: {}", events.join(", ")), 1);
        }
    }
    Ok(())
}

pub fn set_enabled(app: &mut AppContext, name: &str, enabled: bool) -> Result<()> {
    app.dispatcher.set_enabled(name, enabled)?;
    let event = if enabled {
        Event::PluginEnabled
    } else {
        Event::PluginDisabled
    };
    observe(
        &app.dispatcher,
        event,
        &EventContext::new().with_str("plugin", name),
    );
    ui::success(&format!(
        "plugin '{}' {}",
        name,
        if enabled { "enabled" } else { "disabled" }
    ));
    Ok(())
}

pub fn check(app: &AppContext) -> Result<()> {
    let lint = app.dispatcher.lint_all();
    if lint.is_empty() {
        ui::success("all plugin configurations look fine");
        return Ok(());
    }
    for (name, issues) in lint {
        ui::keyval(&name, &format!("{} issue(s)", issues.len()));
        for issue in issues {
            ui::indent(&issue, 1);
        }
    }
    Ok(())
}
