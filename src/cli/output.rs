use colored::Colorize;
use std::fmt;

/// Message categories used by the console helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
    Separator,
}

#[derive(Clone, Copy, Debug)]
pub struct OutputPreferences {
    pub color: bool,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self { color: true }
    }
}

const SEPARATOR: &str = "--------------------------------------------------";

fn build_label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Success => "[ok]",
        MessageKind::Warning => "[!]",
        MessageKind::Error => "[x]",
        MessageKind::Info | MessageKind::Section | MessageKind::Separator => "",
    }
}

/// Renders `message` for the given kind, applying colour when enabled.
pub fn format_message(
    kind: MessageKind,
    message: impl fmt::Display,
    prefs: &OutputPreferences,
) -> String {
    let text = message.to_string();
    let base = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        MessageKind::Separator => SEPARATOR.to_string(),
        _ => {
            let label = build_label(kind);
            if label.is_empty() {
                text
            } else {
                format!("{label} {text}")
            }
        }
    };

    if !prefs.color {
        return base;
    }

    match kind {
        MessageKind::Success => base.bright_green().to_string(),
        MessageKind::Warning => base.bright_yellow().to_string(),
        MessageKind::Error => base.bright_red().to_string(),
        MessageKind::Section => base.bold().to_string(),
        MessageKind::Info | MessageKind::Separator => base,
    }
}
