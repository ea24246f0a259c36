//! `paka health`: sanity report over adapters, the history ledger and
//! plugin configuration.

use crate::core::{AppContext, Scope};
use crate::error::Result;
use crate::events::{Event, EventContext};
use crate::ui;

use super::observe;

pub fn run(app: &mut AppContext) -> Result<()> {
    let ctx = EventContext::new().with_str("operation", "health");
    observe(&app.dispatcher, Event::PreHealth, &ctx);

    let mut problems = 0usize;

    ui::header("Package managers");
    for adapter in app.registry.all() {
        let status = if !adapter.is_enabled() {
            "disabled".to_string()
        } else if adapter.is_available() {
            "ok".to_string()
        } else {
            problems += 1;
            "binary not found".to_string()
        };
        ui::keyval(adapter.name(), &status);
    }

    ui::header("History ledger");
    let scopes = if app.privileged {
        vec![Scope::User, Scope::System]
    } else {
        vec![Scope::User]
    };
    for scope in scopes {
        let issues = app.ledger.validate(scope);
        if issues.is_empty() {
            ui::keyval(scope.as_str(), "consistent");
        } else {
            problems += issues.len();
            ui::keyval(scope.as_str(), &format!("{} issue(s)", issues.len()));
            for issue in issues {
                ui::indent(&issue, 1);
            }
        }
    }

    ui::header("Plugins");
    let lint = app.dispatcher.lint_all();
    if lint.is_empty() {
        ui::info("no plugin configuration issues");
    } else {
        for (name, issues) in &lint {
            problems += issues.len();
            ui::keyval(name, &format!("{} issue(s)", issues.len()));
            for issue in issues {
                ui::indent(issue, 1);
            }
        }
    }

    observe(&app.dispatcher, Event::HealthCheck, &ctx);
    if problems == 0 {
        observe(&app.dispatcher, Event::PostHealthSuccess, &ctx);
        ui::success("everything looks healthy");
    } else {
        observe(
            &app.dispatcher,
            Event::PostHealthFailure,
            &ctx.clone().with_str("problems", &problems.to_string()),
        );
        ui::warning(&format!("{} problem(s) found", problems));
    }
    observe(&app.dispatcher, Event::PostHealth, &ctx);
    Ok(())
}
