//! `paka remove` / `paka purge`.
//!
//! Without an explicit `--manager`, removal first figures out which
//! manager actually owns the packages: history records plus a live
//! query across usable managers. More than one owner is an error the
//! user must disambiguate, and owners behind disabled managers are
//! named so the ambiguity is explainable.

use std::collections::BTreeSet;

use crate::core::{AppContext, Scope};
use crate::error::{PakaError, Result};
use crate::events::{operation_context, ContextValue, OperationKind};
use crate::ui;

use super::{check_scope_mutation, gate, observe, select_adapter};

pub fn run(
    app: &mut AppContext,
    packages: &[String],
    manager: Option<&str>,
    scope: Scope,
    purge: bool,
    dry_run: bool,
) -> Result<()> {
    check_scope_mutation(app, scope)?;
    let op = if purge {
        OperationKind::Purge
    } else {
        OperationKind::Remove
    };

    let manager_name = match manager {
        Some(name) => select_adapter(&app.registry, Some(name))?.name().to_string(),
        None => detect_owner(app, packages, scope)?,
    };
    let adapter = select_adapter(&app.registry, Some(&manager_name))?;

    let ctx = operation_context(op, &manager_name, packages)
        .set("scope", ContextValue::Str(scope.to_string()));
    gate(&app.dispatcher, op.pre_event(), &ctx)?;
    if let Some(event) = op.pre_success_event() {
        gate(&app.dispatcher, event, &ctx)?;
    }

    if dry_run {
        ui::info(&format!(
            "dry run: would {} {} via {}",
            op.as_str(),
            packages.join(", "),
            manager_name
        ));
        return Ok(());
    }

    ui::header(&format!("Removing via {}", manager_name));
    let outcome = if purge {
        adapter.purge(packages)
    } else {
        adapter.remove(packages)
    };

    if outcome.success {
        observe(
            &app.dispatcher,
            op.post_success_event(),
            &ctx.clone().with_bool("success", true),
        );
        app.ledger.mark_removed(&manager_name, packages, scope)?;
        observe(&app.dispatcher, op.post_event(), &ctx);
        ui::success(&format!("Removed {}", packages.join(", ")));
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
            "{} {} failed: {}",
            manager_name,
            op.as_str(),
            reason
        )))
    }
}

/// Find the single manager that owns the given packages.
fn detect_owner(app: &AppContext, packages: &[String], scope: Scope) -> Result<String> {
    let mut owners: BTreeSet<String> = BTreeSet::new();
    let mut unreconcilable: BTreeSet<String> = BTreeSet::new();

    // History first: records whose packages are still believed present.
    for record in &app.ledger.document(scope).installations {
        let pending = record
            .packages
            .iter()
            .any(|p| packages.contains(p) && !record.removed_packages.contains(p));
        if !pending {
            continue;
        }
        let live = app
            .registry
            .get(&record.manager)
            .map(|a| a.is_enabled() && a.is_available())
            .unwrap_or(false);
        if live {
            owners.insert(record.manager.clone());
        } else {
            unreconcilable.insert(record.manager.clone());
        }
    }

    // Live query for installs paka never saw.
    for adapter in app.registry.usable() {
        for package in packages {
            match adapter.search(package) {
                Ok(found) => {
                    if found.iter().any(|p| &p.name == package && p.installed) {
                        owners.insert(adapter.name().to_string());
                    }
                }
                Err(e) => {
                    ui::verbose(&format!("{}: {}", adapter.name(), e));
                }
            }
        }
    }

    match owners.len() {
        1 => Ok(owners.into_iter().next().unwrap_or_default()),
        0 => {
            if unreconcilable.is_empty() {
                Err(PakaError::TargetNotFound(format!(
                    "no installed package matching: {}",
                    packages.join(", ")
                )))
            } else {
                Err(PakaError::PackageManagerError(format!(
                    "only found via currently disabled/unavailable manager(s): {}; \
                     enable one or pass --manager",
                    unreconcilable.into_iter().collect::<Vec<_>>().join(", ")
                )))
            }
        }
        _ => {
            let mut names: Vec<String> = owners.into_iter().collect();
            names.extend(unreconcilable);
            Err(PakaError::ConfigError(format!(
                "installed via multiple managers ({}); pass --manager to choose",
                names.join(", ")
            )))
        }
    }
}
