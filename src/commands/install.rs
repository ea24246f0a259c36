//! `paka install`: resolve, gate through plugins, install, record.

use crate::core::{AppContext, Scope};
use crate::error::{PakaError, Result};
use crate::events::{operation_context, ContextValue, Event, OperationKind};
use crate::history::InstallDetails;
use crate::ui;

use super::{check_scope_mutation, gate, observe, select_adapter};

pub fn run(
    app: &mut AppContext,
    packages: &[String],
    manager: Option<&str>,
    scope: Scope,
    dry_run: bool,
) -> Result<()> {
    check_scope_mutation(app, scope)?;
    let adapter = select_adapter(&app.registry, manager)?;
    let manager_name = adapter.name().to_string();
    let op = OperationKind::Install;

    let ctx = operation_context(op, &manager_name, packages)
        .set("scope", ContextValue::Str(scope.to_string()));
    gate(&app.dispatcher, op.pre_event(), &ctx)?;

    // Resolve every package first so a typo fails before anything is
    // touched. A query failure is not proof of absence, so the package
    // is assumed to exist and the backend gets the final word.
    let mut missing = Vec::new();
    for package in packages {
        match adapter.search(package) {
            Ok(found) => {
                if !found.iter().any(|p| &p.name == package) {
                    missing.push(package.clone());
                }
            }
            Err(e) => {
                ui::warning(&format!(
                    "could not verify '{}' via {}: {}",
                    package, manager_name, e
                ));
            }
        }
    }
    if !missing.is_empty() {
        return Err(PakaError::TargetNotFound(format!(
            "package(s) not found via {}: {}",
            manager_name,
            missing.join(", ")
        )));
    }

    if let Some(event) = op.pre_success_event() {
        gate(&app.dispatcher, event, &ctx)?;
    }

    if dry_run {
        ui::info(&format!(
            "dry run: would install {} via {}",
            packages.join(", "),
            manager_name
        ));
        return Ok(());
    }

    ui::header(&format!("Installing via {}", manager_name));
    let outcome = adapter.install(packages);

    if outcome.success {
        observe(
            &app.dispatcher,
            op.post_success_event(),
            &ctx.clone().with_bool("success", true),
        );
        app.ledger
            .record_install(&manager_name, packages, scope, InstallDetails::default())?;
        observe(&app.dispatcher, Event::HistoryRecorded, &ctx);
        observe(&app.dispatcher, op.post_event(), &ctx);
        ui::success(&format!("Installed {}", packages.join(", ")));
        Ok(())
    } else {
        let reason = outcome.error.unwrap_or_else(|| "unknown error".into());
        let fail_ctx = ctx
            .clone()
            .with_bool("success", false)
            .with_str("error", &reason);
        observe(&app.dispatcher, op.post_failure_event(), &fail_ctx);
        observe(&app.dispatcher, op.post_event(), &fail_ctx);
        Err(PakaError::PackageManagerError(format!(
            "{} install failed: {}",
            manager_name, reason
        )))
    }
}
