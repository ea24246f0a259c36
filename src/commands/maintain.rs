//! `paka update` / `paka upgrade`: run a metadata refresh or full
//! upgrade across one or all usable managers. A failure in one manager
//! never aborts the rest.

use crate::core::AppContext;
use crate::error::{PakaError, Result};
use crate::events::{EventContext, OperationKind};
use crate::ui;

use super::{gate, observe, select_adapter};

pub fn run(app: &mut AppContext, op: OperationKind, manager: Option<&str>, dry_run: bool) -> Result<()> {
    let adapters = match manager {
        Some(name) => vec![select_adapter(&app.registry, Some(name))?],
        None => {
            let usable = app.registry.usable();
            if usable.is_empty() {
                return Err(PakaError::PackageManagerError(
                    "no usable package manager found".into(),
                ));
            }
            usable
        }
    };

    if dry_run {
        let names: Vec<&str> = adapters.iter().map(|a| a.name()).collect();
        ui::info(&format!("dry run: would {} {}", op.as_str(), names.join(", ")));
        return Ok(());
    }

    let mut failures = Vec::new();
    for adapter in adapters {
        let name = adapter.name().to_string();
        let ctx = EventContext::new()
            .with_str("operation", op.as_str())
            .with_str("package-manager", &name);
        if let Err(e) = gate(&app.dispatcher, op.pre_event(), &ctx) {
            ui::warning(&format!("{}: {}", name, e));
            failures.push(name);
            continue;
        }

        ui::header(&format!("{} {}", capitalize(op.as_str()), name));
        let outcome = match op {
            OperationKind::Update => adapter.update(),
            OperationKind::Upgrade => adapter.upgrade(),
            _ => unreachable!("maintain only handles update/upgrade"),
        };

        if outcome.success {
            observe(
                &app.dispatcher,
                op.post_success_event(),
                &ctx.clone().with_bool("success", true),
            );
            ui::success(&format!("{} {} finished", name, op.as_str()));
        } else {
            let reason = outcome.error.unwrap_or_else(|| "unknown error".into());
            observe(
                &app.dispatcher,
                op.post_failure_event(),
                &ctx.clone().with_bool("success", false).with_str("error", &reason),
            );
            ui::error(&format!("{} {} failed: {}", name, op.as_str(), reason));
            failures.push(name);
        }
        observe(&app.dispatcher, op.post_event(), &ctx);
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(PakaError::PackageManagerError(format!(
            "{} failed for: {}",
            op.as_str(),
            failures.join(", ")
        )))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
