pub mod answer;
pub mod banner;
pub mod customer;
pub mod forms;
pub mod io;
pub mod output;
pub mod report;
pub mod selection;
pub mod selectors;
mod shell;
pub mod shell_context;
pub mod table;
pub mod wizard;

pub use shell::{run_cli, ExitReason, ExitSummary, SessionSettings, Shell, SCRIPT_ENV};
