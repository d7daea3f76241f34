use crate::{
    cli::{
        forms::{self, ValidationError},
        io::Console,
    },
    errors::{Flow, SessionError, StoreError},
    storage::{self, BookStore},
    utils::error_log::ErrorLog,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Collaborators threaded through every step of one wizard run.
pub struct ShellContext<'a> {
    pub console: &'a mut Console,
    pub store: &'a mut dyn BookStore,
    pub errors: &'a mut ErrorLog,
    /// Echo validated entries and ask for confirmation.
    pub confirm_input: bool,
}

impl<'a> ShellContext<'a> {
    pub fn new(
        console: &'a mut Console,
        store: &'a mut dyn BookStore,
        errors: &'a mut ErrorLog,
        confirm_input: bool,
    ) -> Self {
        Self {
            console,
            store,
            errors,
            confirm_input,
        }
    }

    pub fn ask(&mut self, question: &str) -> Flow<bool> {
        self.console.ask(question)
    }

    /// Confirm/retry acquisition honouring the session's confirmation flag.
    pub fn acquire<T, V, E>(&mut self, prompt: &str, validate: V, echo: E) -> Flow<T>
    where
        V: Fn(&str) -> Result<T, ValidationError>,
        E: Fn(&T) -> String,
    {
        forms::acquire(self.console, self.confirm_input, prompt, validate, echo)
    }

    /// Runs a read query whose failure cannot be retried and ends the session.
    pub fn fetch<T>(
        &mut self,
        action: &str,
        query: impl FnOnce(&dyn BookStore) -> storage::Result<T>,
    ) -> Flow<T> {
        query(&*self.store).map_err(|err| {
            self.errors.record(format!("Failed to {action}: {err}"));
            tracing::error!(error = %err, action, "store query failed");
            SessionError::store(action, err)
        })
    }

    /// Runs a retryable operation. A failure is logged, shown, and returned.
    pub fn attempt<T>(
        &mut self,
        action: &str,
        operation: impl FnOnce(&mut dyn BookStore) -> storage::Result<T>,
    ) -> Flow<Result<T, StoreError>> {
        match operation(&mut *self.store) {
            Ok(value) => Ok(Ok(value)),
            Err(err) => {
                self.report_store_failure(action, &err)?;
                Ok(Err(err))
            }
        }
    }

    pub fn report_store_failure(&mut self, action: &str, err: &StoreError) -> Flow<()> {
        tracing::warn!(error = %err, action, "store operation failed");
        let message = format!("Failed to {action}: {err}");
        self.errors.record(message.clone());
        self.console.error(message)
    }

    /// Undoes a failed write. If that fails too the session cannot go on.
    pub fn rollback_after_failure(&mut self) -> Flow<()> {
        self.store.rollback().map_err(|err| {
            self.errors
                .record(format!("Failed to roll back after a failed write: {err}"));
            SessionError::RollbackFailed(err)
        })
    }

    /// Repeats a write until it succeeds or the user stops retrying.
    ///
    /// Returns whether the write eventually succeeded.
    pub fn write_with_retry(
        &mut self,
        action: &str,
        mut operation: impl FnMut(&mut dyn BookStore) -> storage::Result<()>,
    ) -> Flow<bool> {
        loop {
            if self.attempt(action, &mut operation)?.is_ok() {
                return Ok(true);
            }
            self.rollback_after_failure()?;
            if !self.ask("Do you want to try again?")? {
                return Ok(false);
            }
        }
    }
}
