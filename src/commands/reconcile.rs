//! `paka reconcile`: sweep the ledger against live backend state.

use crate::core::{AppContext, Scope};
use crate::error::Result;
use crate::history::reconcile::{self, ReconcileAction};
use crate::ui;

use super::check_scope_mutation;

pub fn run(app: &mut AppContext, scope: Scope, assume_yes: bool) -> Result<()> {
    check_scope_mutation(app, scope)?;
    if !assume_yes
        && !ui::prompt_yes_no(&format!(
            "Reconcile {} scope history against live package state?",
            scope
        ))
    {
        ui::info("reconcile cancelled");
        return Ok(());
    }

    let report = reconcile::reconcile(&mut app.ledger, &app.registry, scope)?;

    ui::header(&format!("Reconciliation ({})", scope));
    ui::keyval("Checked", &report.checked.to_string());
    ui::keyval("Marked removed", &report.marked_removed.to_string());
    ui::keyval("Errors", &report.errors.to_string());
    ui::keyval("Skipped", &report.skipped.to_string());

    for detail in &report.details {
        let line = format!(
            "{} ({}): {} ({})",
            detail.package, detail.manager, detail.action, detail.reason
        );
        match detail.action {
            ReconcileAction::MarkedRemoved => ui::indent(&line, 1),
            ReconcileAction::Error => ui::warning(&line),
            ReconcileAction::Skipped => ui::verbose(&line),
        }
    }
    Ok(())
}
