//! paka: a unified front-end over heterogeneous package managers with
//! lifecycle plugins and a rollback-capable installation history.

pub mod backends;
pub mod cli;
pub mod commands;
pub mod core;
pub mod error;
pub mod events;
pub mod history;
pub mod plugins;
pub mod ui;
pub mod utils;

use clap::Parser;

use crate::events::{Event, EventContext};

/// Full program run: parse arguments, build the context, execute and
/// report. Returns the process exit code.
pub fn run_cli() -> i32 {
    let cli = cli::Cli::parse();

    ui::init_colors();
    ui::set_quiet(cli.flags.quiet);
    ui::set_verbose(cli.flags.verbose);

    let mut app = match core::AppContext::new_filesystem() {
        Ok(app) => app,
        Err(e) => {
            ui::error(&format!("startup failed: {}", e));
            return 1;
        }
    };

    let session_ctx = EventContext::new().with_str("version", env!("CARGO_PKG_VERSION"));
    app.dispatcher.trigger(Event::SessionStart, &session_ctx);

    let result = cli::dispatch(&cli, &mut app);

    let code = match result {
        Ok(()) => 0,
        Err(e) => {
            app.dispatcher.trigger(
                Event::Error,
                &EventContext::new().with_str("error", &e.to_string()),
            );
            ui::error(&e.to_string());
            1
        }
    };

    app.dispatcher.trigger(
        Event::SessionEnd,
        &session_ctx.with_str("exit-code", &code.to_string()),
    );
    code
}
