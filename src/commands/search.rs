//! `paka search`: query one or all usable managers and print a merged
//! result list.

use crate::core::AppContext;
use crate::error::{PakaError, Result};
use crate::events::{Event, EventContext};
use crate::ui;

use super::{gate, observe, select_adapter};

pub fn run(app: &mut AppContext, query: &str, manager: Option<&str>) -> Result<()> {
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

    let ctx = EventContext::new().with_str("operation", "search").with_str("query", query);
    gate(&app.dispatcher, Event::PreSearch, &ctx)?;

    let mut total = 0usize;
    let mut query_errors = 0usize;
    for adapter in adapters {
        match adapter.search(query) {
            Ok(results) => {
                observe(
                    &app.dispatcher,
                    Event::SearchSuccess,
                    &ctx.clone().with_str("package-manager", adapter.name()),
                );
                if results.is_empty() {
                    continue;
                }
                ui::header(&format!("{} ({} results)", adapter.name(), results.len()));
                for pkg in &results {
                    let mut line = pkg.name.clone();
                    if let Some(version) = &pkg.version {
                        line.push_str(&format!(" {}", version));
                    }
                    if pkg.installed {
                        line.push_str(" [installed]");
                    }
                    ui::indent(&line, 1);
                    if let Some(desc) = &pkg.description {
                        ui::indent(desc, 2);
                    }
                }
                total += results.len();
            }
            Err(e) => {
                observe(
                    &app.dispatcher,
                    Event::SearchFailure,
                    &ctx.clone()
                        .with_str("package-manager", adapter.name())
                        .with_str("error", &e.to_string()),
                );
                ui::warning(&format!("{}: {}", adapter.name(), e));
                query_errors += 1;
            }
        }
    }

    observe(&app.dispatcher, Event::PostSearch, &ctx);

    if total == 0 {
        if query_errors > 0 {
            ui::warning(&format!(
                "no results for '{}' ({} manager(s) could not be queried)",
                query, query_errors
            ));
        } else {
            ui::info(&format!("no results for '{}'", query));
        }
    }
    Ok(())
}
