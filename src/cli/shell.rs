//! Session driver: startup prompts, the restart loop and every way out.

use std::{env, path::PathBuf};

use crate::cli::banner::Banner;
use crate::cli::io::Console;
use crate::cli::output::OutputPreferences;
use crate::cli::shell_context::{CliMode, ShellContext};
use crate::cli::wizard::{run_wizard, SessionEnd};
use crate::config::{Config, ConfigManager};
use crate::errors::{CliError, Flow, SessionError, Termination};
use crate::storage::{BookStore, SqliteStore};
use crate::utils::error_log::{ErrorLog, FlushOutcome};

/// Forces plain line-by-line stdin instead of the line editor.
pub const SCRIPT_ENV: &str = "BOOK_PURCHASE_CLI_SCRIPT";

const COMMIT_QUESTION: &str = "Do you want to commit any/all of the changes made, to the database?";

/// Preferences for one process, resolved from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// `None` asks at every (re)start.
    pub confirm_input: Option<bool>,
    /// `None` asks once per process.
    pub commit_on_end_of_input: Option<bool>,
    pub error_log_path: PathBuf,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            confirm_input: config.confirm_input,
            commit_on_end_of_input: config.commit_on_end_of_input,
            error_log_path: config.resolve_error_log_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The user declined to start the application.
    NotStarted,
    /// A run ended and no restart was requested.
    Finished,
    Aborted,
    CommitExit,
    EndOfInput,
    /// A store failure that could not be retried.
    Fatal,
}

/// What happened over the lifetime of a [`Shell`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitSummary {
    pub reason: ExitReason,
    /// Whether the last transaction decision was a successful commit.
    pub committed: bool,
    pub runs: usize,
    pub error_log: FlushOutcome,
}

pub struct Shell<'a> {
    console: &'a mut Console,
    store: &'a mut dyn BookStore,
    errors: ErrorLog,
    settings: SessionSettings,
    commit_on_end_of_input: Option<bool>,
    committed: bool,
    runs: usize,
}

impl<'a> Shell<'a> {
    pub fn new(
        console: &'a mut Console,
        store: &'a mut dyn BookStore,
        settings: SessionSettings,
    ) -> Self {
        Self {
            console,
            store,
            errors: ErrorLog::new(),
            commit_on_end_of_input: settings.commit_on_end_of_input,
            settings,
            committed: false,
            runs: 0,
        }
    }

    /// Runs until the user leaves, then closes the store and flushes the error log.
    pub fn run(mut self) -> ExitSummary {
        let reason = match self.drive() {
            Ok(reason) => reason,
            Err(err) => match self.recover(err) {
                Ok(reason) => reason,
                Err(err) => self.abandon(err),
            },
        };
        tracing::info!(?reason, runs = self.runs, "session over");
        self.shutdown(reason)
    }

    fn drive(&mut self) -> Flow<ExitReason> {
        loop {
            if self.runs > 0 {
                self.console.separator()?;
            }
            Banner::render(self.console)?;

            let confirm_input = match self.settings.confirm_input {
                Some(confirm) => confirm,
                None => self.console.ask(
                    "Do you want to be prompted to confirm your input after validation?",
                )?,
            };
            if self.commit_on_end_of_input.is_none() {
                let commit = self.console.ask(
                    "Do you want to commit any/all of the changes made, to the database \
                     if/when the End Of Input is reached during a prompt?",
                )?;
                self.commit_on_end_of_input = Some(commit);
            }
            if self.runs == 0 && !self.console.ask("Do you want to start the application?")? {
                return Ok(ExitReason::NotStarted);
            }

            self.runs += 1;
            let end = {
                let mut ctx =
                    ShellContext::new(self.console, self.store, &mut self.errors, confirm_input);
                run_wizard(&mut ctx)?
            };

            let commit = self.console.ask(COMMIT_QUESTION)?;
            if !self.settle(commit)? {
                return Ok(ExitReason::Fatal);
            }
            if end == SessionEnd::ExitRequested {
                return Ok(ExitReason::Finished);
            }
            if !self.console.ask("Do you want to restart the application?")? {
                return Ok(ExitReason::Finished);
            }
            tracing::debug!("restarting wizard");
        }
    }

    /// Commits or rolls back. A failure is reported, followed by a
    /// best-effort rollback, and `false` is returned.
    fn settle(&mut self, commit: bool) -> Flow<bool> {
        let (action, result) = if commit {
            ("commit", self.store.commit())
        } else {
            ("rollback", self.store.rollback())
        };
        match result {
            Ok(()) => {
                self.committed = commit;
                tracing::debug!(action, "changes settled");
                Ok(true)
            }
            Err(err) => {
                self.errors
                    .record(format!("Failed to {action} the changes made: {err}"));
                self.console.error(format!(
                    "Failed to {action} any/all of the changes made, to the database."
                ))?;
                self.committed = false;
                if commit {
                    if let Err(err) = self.store.rollback() {
                        self.errors.record(format!("Rollback after failed commit: {err}"));
                    }
                }
                Ok(false)
            }
        }
    }

    fn recover(&mut self, err: SessionError) -> Result<ExitReason, SessionError> {
        match err {
            SessionError::Terminated(Termination::Abort) => {
                self.console
                    .warning("Abort requested. Any/all of the changes made are rolled back.")?;
                self.settle(false)?;
                Ok(ExitReason::Aborted)
            }
            SessionError::Terminated(Termination::CommitExit) => {
                self.console
                    .info("Exit requested. Any/all of the changes made are committed.")?;
                let reason = if self.settle(true)? {
                    ExitReason::CommitExit
                } else {
                    ExitReason::Fatal
                };
                Ok(reason)
            }
            SessionError::Terminated(Termination::EndOfInput) => {
                self.console.blank()?;
                self.console
                    .info("End Of Input has been reached so there is nothing else that can be done!")?;
                let commit = self.commit_on_end_of_input.unwrap_or(false);
                self.settle(commit)?;
                Ok(ExitReason::EndOfInput)
            }
            SessionError::Store { context, source } => {
                tracing::error!(error = %source, context = %context, "fatal store failure");
                self.console.error(format!(
                    "Unfortunately a fatal error has occurred when attempting to {context}."
                ))?;
                let commit = self.ask_during_shutdown(COMMIT_QUESTION)?;
                self.settle(commit)?;
                Ok(ExitReason::Fatal)
            }
            SessionError::RollbackFailed(source) => {
                tracing::error!(error = %source, "rollback after failed write failed");
                self.console
                    .error("Failed to roll back the changes made by the failed attempt.")?;
                self.committed = false;
                Ok(ExitReason::Fatal)
            }
            other => Ok(self.abandon(other)),
        }
    }

    /// The console itself failed: roll back without asking anything.
    fn abandon(&mut self, err: SessionError) -> ExitReason {
        tracing::error!(error = %err, "console failure");
        self.errors.record(err.to_string());
        if let Err(err) = self.store.rollback() {
            self.errors.record(format!("Rollback after console failure: {err}"));
        }
        self.committed = false;
        ExitReason::Fatal
    }

    /// Asks a yes/no question where termination keywords are plain answers.
    fn ask_during_shutdown(&mut self, question: &str) -> Flow<bool> {
        match self.console.ask(question) {
            Ok(answer) => Ok(answer),
            Err(SessionError::Terminated(Termination::Abort)) => Ok(false),
            Err(SessionError::Terminated(Termination::CommitExit)) => Ok(true),
            Err(SessionError::Terminated(Termination::EndOfInput)) => {
                Ok(self.commit_on_end_of_input.unwrap_or(false))
            }
            Err(err) => Err(err),
        }
    }

    fn flush_errors(&mut self) -> FlushOutcome {
        self.errors.flush_to(&self.settings.error_log_path)
    }

    fn shutdown(mut self, reason: ExitReason) -> ExitSummary {
        if let Err(err) = self.store.close() {
            self.errors.record(format!("Failed to close the database connection: {err}"));
        }
        let error_log = self.flush_errors();
        if let Err(err) = self.farewell(&error_log) {
            tracing::warn!(error = %err, "could not print the farewell");
        }
        ExitSummary {
            reason,
            committed: self.committed,
            runs: self.runs,
            error_log,
        }
    }

    fn farewell(&mut self, error_log: &FlushOutcome) -> Flow<()> {
        match error_log {
            FlushOutcome::Written(path) => self.console.info(format!(
                "The error log has been written to {}.",
                path.display()
            ))?,
            FlushOutcome::Stderr => self
                .console
                .warning("The error log could not be saved and was written to stderr.")?,
            FlushOutcome::Empty => {}
        }
        self.console.info("Goodbye.")?;
        self.console.flush()
    }
}

/// Entry point of `book_purchase_cli run`.
pub fn run_cli(database: Option<PathBuf>) -> Result<ExitSummary, CliError> {
    let mode = if env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let config = ConfigManager::default_location()
        .load()
        .map_err(|err| CliError::Config(err.to_string()))?;
    let database = database.unwrap_or_else(|| config.resolve_database_path());
    if !database.exists() {
        return Err(CliError::Usage(format!(
            "database {} does not exist; create one with `book_purchase_cli init-demo {}`",
            database.display(),
            database.display()
        )));
    }

    let mut store = SqliteStore::open(&database)?;
    let prefs = OutputPreferences {
        color: config.color_output && mode == CliMode::Interactive,
    };
    let mut console = Console::stdio(mode == CliMode::Interactive, prefs)?;
    tracing::debug!(?mode, database = %database.display(), "starting session");

    let summary = Shell::new(&mut console, &mut store, SessionSettings::from_config(&config)).run();
    Ok(summary)
}
