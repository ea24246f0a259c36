pub mod args;
pub mod dispatcher;

pub use args::Cli;
pub use dispatcher::dispatch;
