use std::fmt;

use thiserror::Error;

use crate::domain::DomainError;

/// Failure reported by the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Constraint violated: {0}")]
    Constraint(String),
    #[error("Invalid record: {0}")]
    Domain(#[from] DomainError),
    #[error("Store connection already closed")]
    Closed,
}

/// The three ways a session can be ended from any input prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// `abort`: roll back and exit.
    Abort,
    /// `exit`: commit and exit.
    CommitExit,
    /// The input stream is exhausted.
    EndOfInput,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Termination::Abort => "abort requested",
            Termination::CommitExit => "exit requested",
            Termination::EndOfInput => "end of input",
        };
        f.write_str(label)
    }
}

/// Anything that unwinds the wizard out of its current state.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Terminated(Termination),
    /// A store query failed in a place where no retry is offered.
    #[error("Fatal store failure while trying to {context}: {source}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },
    /// Undoing a failed write failed as well; nothing more can be trusted.
    #[error("Failed to roll back after a failed write: {0}")]
    RollbackFailed(#[source] StoreError),
    #[error("Console error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl SessionError {
    pub fn store(context: impl Into<String>, source: StoreError) -> Self {
        SessionError::Store {
            context: context.into(),
            source,
        }
    }
}

impl From<Termination> for SessionError {
    fn from(termination: Termination) -> Self {
        SessionError::Terminated(termination)
    }
}

/// Result alias used throughout the interactive core.
pub type Flow<T> = Result<T, SessionError>;

/// Startup and command-line failures.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("{0}")]
    Usage(String),
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Config(err.to_string())
    }
}
