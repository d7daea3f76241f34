//! Accumulated diagnostics that are flushed to a side file when the
//! application shuts down.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

/// Where the error log ended up after [`ErrorLog::flush_to`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was recorded, no file was written.
    Empty,
    Written(PathBuf),
    /// The file could not be written; entries went to stderr instead.
    Stderr,
}

#[derive(Debug, Default)]
pub struct ErrorLog {
    entries: Vec<String>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one diagnostic. Blank messages are ignored.
    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        if message.trim().is_empty() {
            return;
        }
        tracing::warn!(target: "book_purchase::error_log", "{message}");
        self.entries.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Drains the log and returns its text, one entry per line.
    pub fn take(&mut self) -> String {
        let mut text = String::new();
        for entry in self.entries.drain(..) {
            text.push_str(&entry);
            text.push('\n');
        }
        text
    }

    /// Writes the accumulated entries to `path`, staging through a temporary
    /// file. Falls back to stderr when the file cannot be written.
    pub fn flush_to(&mut self, path: &Path) -> FlushOutcome {
        if self.is_empty() {
            return FlushOutcome::Empty;
        }
        let text = self.take();
        match write_atomic(path, &text) {
            Ok(()) => FlushOutcome::Written(path.to_path_buf()),
            Err(err) => {
                let mut stderr = io::stderr();
                let _ = writeln!(stderr, "\nThe error log is as follows:");
                let _ = write!(stderr, "{text}");
                let _ = writeln!(stderr, "(could not write {}: {err})", path.display());
                FlushOutcome::Stderr
            }
        }
    }
}

fn write_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, text)?;
    fs::rename(tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_log_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("errors.txt");
        let mut log = ErrorLog::new();
        log.record("   ");
        assert_eq!(log.flush_to(&path), FlushOutcome::Empty);
        assert!(!path.exists());
    }

    #[test]
    fn flush_writes_entries_and_drains() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("errors.txt");
        let mut log = ErrorLog::new();
        log.record("offer query failed");
        log.record("insert failed");

        assert_eq!(log.flush_to(&path), FlushOutcome::Written(path.clone()));
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "offer query failed\ninsert failed\n");
        assert!(log.is_empty());
    }
}
