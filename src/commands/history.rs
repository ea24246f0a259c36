//! `paka history`: inspect the installation ledger and roll entries
//! back.

use chrono::{DateTime, Utc};

use crate::core::{AppContext, Scope};
use crate::error::{PakaError, Result};
use crate::events::{Event, EventContext};
use crate::history::rollback;
use crate::history::InstallationRecord;
use crate::ui;

use super::{check_scope_mutation, observe};

fn fmt_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}

fn record_line(record: &InstallationRecord) -> String {
    let mut line = format!(
        "{}  {}  {}",
        fmt_time(record.timestamp),
        record.manager,
        record.packages.join(", ")
    );
    if record.removed {
        line.push_str(" (removed)");
    }
    line
}

pub fn list(app: &AppContext, scope: Scope, limit: Option<usize>, manager: Option<&str>) -> Result<()> {
    // Indexes refer to stored positions so they stay valid for rollback.
    let mut rows: Vec<(usize, &InstallationRecord)> = app
        .ledger
        .document(scope)
        .installations
        .iter()
        .enumerate()
        .filter(|(_, r)| manager.map_or(true, |m| r.manager == m))
        .collect();
    rows.reverse();
    if let Some(n) = limit {
        rows.truncate(n);
    }
    if rows.is_empty() {
        ui::info(&format!("no installations recorded in {} scope", scope));
        return Ok(());
    }
    ui::header(&format!("Installation history ({})", scope));
    for (index, record) in rows {
        ui::indent(&format!("[{}] {}", index, record_line(record)), 1);
    }
    Ok(())
}

/// Merged user+system view, oldest first. Scope is shown per entry
/// since indexes are only meaningful within one scope.
pub fn list_all(app: &AppContext, limit: Option<usize>) -> Result<()> {
    let mut records = app.ledger.all_installations();
    if let Some(n) = limit {
        let skip = records.len().saturating_sub(n);
        records.drain(..skip);
    }
    if records.is_empty() {
        ui::info("no installations recorded");
        return Ok(());
    }
    ui::header("Installation history (all scopes)");
    for record in records {
        ui::indent(&format!("({}) {}", record.scope, record_line(record)), 1);
    }
    Ok(())
}

pub fn show(app: &AppContext, scope: Scope, index: usize) -> Result<()> {
    let record = app.ledger.installation(scope, index)?;
    ui::header(&format!("Installation [{}]", index));
    ui::keyval("When", &fmt_time(record.timestamp));
    ui::keyval("Manager", &record.manager);
    ui::keyval("Packages", &record.packages.join(", "));
    if !record.dependencies.is_empty() {
        ui::keyval("Dependencies", &record.dependencies.join(", "));
    }
    if !record.version.is_empty() {
        ui::keyval("Version", &record.version);
    }
    if let Some(size) = record.size {
        ui::keyval("Size", &format!("{} bytes", size));
    }
    ui::keyval("User", &record.user);
    ui::keyval("Scope", record.scope.as_str());
    if record.removed {
        let when = record
            .removed_timestamp
            .map(fmt_time)
            .unwrap_or_else(|| "unknown".into());
        ui::keyval("Removed", &when);
        if !record.removed_packages.is_empty() {
            ui::keyval("Removed packages", &record.removed_packages.join(", "));
        }
    }
    Ok(())
}

pub fn search(app: &AppContext, scope: Scope, query: &str) -> Result<()> {
    let hits = app.ledger.search(scope, query);
    if hits.is_empty() {
        ui::info(&format!("no history entries matching '{}'", query));
        return Ok(());
    }
    ui::header(&format!("History matching '{}'", query));
    for (index, record) in hits {
        ui::indent(&format!("[{}] {}", index, record_line(record)), 1);
    }
    Ok(())
}

pub fn stats(app: &AppContext, scope: Scope) -> Result<()> {
    let stats = app.ledger.statistics(scope);
    ui::header(&format!("History statistics ({})", scope));
    ui::keyval("Installations", &stats.total_installations.to_string());
    ui::keyval("Still installed", &stats.active_installations.to_string());
    ui::keyval("Rollbacks", &stats.total_rollbacks.to_string());
    ui::keyval("Unique packages", &stats.unique_packages.to_string());
    if !stats.by_manager.is_empty() {
        ui::header("By manager");
        for (manager, count) in &stats.by_manager {
            ui::keyval(manager, &count.to_string());
        }
    }
    if !stats.recent.is_empty() {
        ui::header("Recent");
        for record in &stats.recent {
            ui::indent(&record_line(record), 1);
        }
    }
    Ok(())
}

pub fn run_rollback(
    app: &mut AppContext,
    scope: Scope,
    index: usize,
    purge: bool,
    assume_yes: bool,
) -> Result<()> {
    check_scope_mutation(app, scope)?;
    let record = app.ledger.installation(scope, index)?.clone();
    ui::info(&format!(
        "rollback [{}]: {} via {}",
        index,
        record.packages.join(", "),
        record.manager
    ));
    if !assume_yes && !ui::prompt_yes_no("Remove these packages?") {
        ui::info("rollback cancelled");
        return Ok(());
    }

    let outcome = rollback::rollback(&mut app.ledger, &app.registry, scope, index, purge)?;
    if outcome.success {
        observe(
            &app.dispatcher,
            Event::HistoryRecorded,
            &EventContext::new()
                .with_str("operation", "rollback")
                .with_str("package-manager", &outcome.manager)
                .with_list("packages", &outcome.packages_removed),
        );
        ui::success(&format!(
            "rolled back, removed: {}",
            outcome.packages_removed.join(", ")
        ));
        Ok(())
    } else {
        Err(PakaError::PackageManagerError(format!(
            "rollback failed for [{}] ({}): {}",
            outcome.packages_attempted.join(", "),
            outcome.manager,
            outcome.error.unwrap_or_else(|| "unknown error".into())
        )))
    }
}

pub fn clear(app: &mut AppContext, scope: Scope, assume_yes: bool) -> Result<()> {
    check_scope_mutation(app, scope)?;
    if !assume_yes
        && !ui::prompt_yes_no(&format!(
            "Permanently delete all {} scope history (audit trail included)?",
            scope
        ))
    {
        ui::info("clear cancelled");
        return Ok(());
    }
    let count = app.ledger.clear(scope)?;
    observe(
        &app.dispatcher,
        Event::HistoryCleared,
        &EventContext::new().with_str("scope", scope.as_str()),
    );
    ui::success(&format!("cleared {} history entrie(s)", count));
    Ok(())
}

pub fn cleanup(app: &mut AppContext, scope: Scope, days: i64) -> Result<()> {
    check_scope_mutation(app, scope)?;
    let dropped = app.ledger.cleanup_old_entries(scope, days)?;
    ui::success(&format!(
        "dropped {} removed entrie(s) older than {} days",
        dropped, days
    ));
    Ok(())
}
