//! Line-oriented console: every read goes through [`Console::next_line`],
//! which turns end of input and the reserved keywords into
//! [`Termination`] errors that unwind the wizard with `?`.

use std::{
    cell::RefCell,
    collections::VecDeque,
    fmt,
    io::{self, BufRead, Write},
    rc::Rc,
};

use rustyline::{error::ReadlineError, DefaultEditor};

use crate::cli::answer::parse_answer;
use crate::cli::output::{format_message, MessageKind, OutputPreferences};
use crate::errors::{Flow, SessionError, Termination};

/// Rolls back and exits from any prompt.
pub const ABORT_KEYWORD: &str = "abort";
/// Commits and exits from any prompt.
pub const EXIT_KEYWORD: &str = "exit";
/// Keeps the previous value inside free-text update prompts.
pub const STOP_KEYWORD: &str = "stop";

/// Result of one raw read, before keyword handling is applied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    Abort,
    CommitExit,
    EndOfInput,
}

impl ReadOutcome {
    pub fn classify(raw: Option<String>) -> Self {
        match raw {
            None => ReadOutcome::EndOfInput,
            Some(line) if line == ABORT_KEYWORD => ReadOutcome::Abort,
            Some(line) if line == EXIT_KEYWORD => ReadOutcome::CommitExit,
            Some(line) => ReadOutcome::Line(line),
        }
    }

    pub fn into_line(self) -> Result<String, Termination> {
        match self {
            ReadOutcome::Line(line) => Ok(line),
            ReadOutcome::Abort => Err(Termination::Abort),
            ReadOutcome::CommitExit => Err(Termination::CommitExit),
            ReadOutcome::EndOfInput => Err(Termination::EndOfInput),
        }
    }
}

/// Anything that can hand out input lines.
pub trait LineSource {
    /// Shows `prompt` and reads one line without its terminator.
    /// Returns `Ok(None)` once the input is exhausted.
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> Flow<Option<String>>;
}

fn strip_terminator(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

/// Plain buffered reader, used for piped input and script mode.
pub struct ReaderLines<R: BufRead> {
    reader: R,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderLines<R> {
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> Flow<Option<String>> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut buffer = Vec::new();
        if self.reader.read_until(b'\n', &mut buffer)? == 0 {
            return Ok(None);
        }
        // Undecodable bytes become U+FFFD and reach validation as ordinary text.
        let line = String::from_utf8_lossy(&buffer).into_owned();
        Ok(Some(strip_terminator(line)))
    }
}

/// Interactive line editor with history. Ctrl-C behaves like `abort`.
pub struct EditorLines {
    editor: DefaultEditor,
}

impl EditorLines {
    pub fn new() -> Flow<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorLines {
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> Flow<Option<String>> {
        out.flush()?;
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str()).ok();
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Some(ABORT_KEYWORD.to_string())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(SessionError::Readline(err)),
        }
    }
}

/// Pre-recorded input, mainly for tests and demos.
#[derive(Debug, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl LineSource for ScriptedLines {
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> Flow<Option<String>> {
        write!(out, "{prompt}")?;
        let line = self.lines.pop_front();
        if let Some(line) = &line {
            writeln!(out, "{line}")?;
        }
        Ok(line)
    }
}

/// Cloneable in-memory sink so a transcript can be inspected after a run.
#[derive(Debug, Clone, Default)]
pub struct SharedOutput {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl SharedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.borrow()).into_owned()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Prompt/answer channel shared by every step of the wizard.
pub struct Console {
    source: Box<dyn LineSource>,
    out: Box<dyn Write>,
    prefs: OutputPreferences,
}

impl Console {
    pub fn new(
        source: Box<dyn LineSource>,
        out: Box<dyn Write>,
        prefs: OutputPreferences,
    ) -> Self {
        Self { source, out, prefs }
    }

    /// Console over stdin/stdout. `interactive` selects the line editor.
    pub fn stdio(interactive: bool, prefs: OutputPreferences) -> Flow<Self> {
        let source: Box<dyn LineSource> = if interactive {
            Box::new(EditorLines::new()?)
        } else {
            Box::new(ReaderLines::new(io::BufReader::new(io::stdin())))
        };
        Ok(Self::new(source, Box::new(io::stdout()), prefs))
    }

    /// Scripted console writing into `output`; colour is disabled.
    pub fn scripted<I, S>(lines: I, output: SharedOutput) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            Box::new(ScriptedLines::new(lines)),
            Box::new(output),
            OutputPreferences { color: false },
        )
    }

    /// Reads one line and classifies it without acting on keywords.
    pub fn read_outcome(&mut self, prompt: &str) -> Flow<ReadOutcome> {
        let raw = self.source.read_line(prompt, self.out.as_mut())?;
        Ok(ReadOutcome::classify(raw))
    }

    /// Reads one line; `abort`, `exit` and end of input become termination errors.
    pub fn next_line(&mut self, prompt: &str) -> Flow<String> {
        let outcome = self.read_outcome(prompt)?;
        if outcome != ReadOutcome::EndOfInput {
            tracing::trace!(?outcome, "line read");
        }
        Ok(outcome.into_line()?)
    }

    /// Asks a yes/no question on the current line.
    pub fn ask(&mut self, question: &str) -> Flow<bool> {
        let answer = self.next_line(&format!("{question} (y/n) "))?;
        Ok(parse_answer(&answer))
    }

    pub fn say(&mut self, text: impl fmt::Display) -> Flow<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    pub fn blank(&mut self) -> Flow<()> {
        writeln!(self.out)?;
        Ok(())
    }

    fn styled(&mut self, kind: MessageKind, text: impl fmt::Display) -> Flow<()> {
        let formatted = format_message(kind, text, &self.prefs);
        match kind {
            MessageKind::Section | MessageKind::Separator => writeln!(self.out, "\n{formatted}")?,
            _ => writeln!(self.out, "{formatted}")?,
        }
        Ok(())
    }

    pub fn info(&mut self, text: impl fmt::Display) -> Flow<()> {
        self.styled(MessageKind::Info, text)
    }

    pub fn success(&mut self, text: impl fmt::Display) -> Flow<()> {
        self.styled(MessageKind::Success, text)
    }

    pub fn warning(&mut self, text: impl fmt::Display) -> Flow<()> {
        self.styled(MessageKind::Warning, text)
    }

    pub fn error(&mut self, text: impl fmt::Display) -> Flow<()> {
        self.styled(MessageKind::Error, text)
    }

    pub fn section(&mut self, title: impl fmt::Display) -> Flow<()> {
        self.styled(MessageKind::Section, title)
    }

    pub fn separator(&mut self) -> Flow<()> {
        self.styled(MessageKind::Separator, "")
    }

    pub fn flush(&mut self) -> Flow<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_terminate_from_any_read() {
        let out = SharedOutput::new();
        let mut console = Console::scripted(["abort", "exit", "Abort"], out);
        assert!(matches!(
            console.next_line("> "),
            Err(SessionError::Terminated(Termination::Abort))
        ));
        assert!(matches!(
            console.next_line("> "),
            Err(SessionError::Terminated(Termination::CommitExit))
        ));
        assert_eq!(console.next_line("> ").unwrap(), "Abort");
        assert!(matches!(
            console.next_line("> "),
            Err(SessionError::Terminated(Termination::EndOfInput))
        ));
    }

    #[test]
    fn keyword_match_is_exact() {
        assert_eq!(
            ReadOutcome::classify(Some(" exit".into())),
            ReadOutcome::Line(" exit".into())
        );
        assert_eq!(ReadOutcome::classify(None), ReadOutcome::EndOfInput);
    }

    #[test]
    fn reader_lines_strip_terminators_only() {
        let mut source = ReaderLines::new(io::Cursor::new("one\r\n two \nlast"));
        let mut sink = Vec::new();
        assert_eq!(source.read_line("", &mut sink).unwrap().as_deref(), Some("one"));
        assert_eq!(source.read_line("", &mut sink).unwrap().as_deref(), Some(" two "));
        assert_eq!(source.read_line("", &mut sink).unwrap().as_deref(), Some("last"));
        assert_eq!(source.read_line("", &mut sink).unwrap(), None);
    }

    #[test]
    fn reader_lines_replace_invalid_utf8() {
        let mut source = ReaderLines::new(io::Cursor::new(b"\xff\xfe\n7\n".to_vec()));
        let mut sink = Vec::new();
        assert_eq!(
            source.read_line("", &mut sink).unwrap().as_deref(),
            Some("\u{FFFD}\u{FFFD}")
        );
        assert_eq!(source.read_line("", &mut sink).unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn ask_uses_answer_parser() {
        let out = SharedOutput::new();
        let mut console = Console::scripted(["YES", "yes ", "n"], out.clone());
        assert!(console.ask("Continue?").unwrap());
        assert!(!console.ask("Continue?").unwrap());
        assert!(!console.ask("Continue?").unwrap());
        assert!(out.contents().contains("Continue? (y/n) YES"));
    }
}
