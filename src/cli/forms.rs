//! Confirm/retry loop shared by every "read and validate one value" step.
//!
//! A value is read and validated until it passes; validation failures are
//! reported and re-read without a confirmation round. Once a value passes,
//! and when input confirmation is enabled, it is echoed back and the user
//! must accept it. Declining restarts the whole read-and-validate cycle.

use std::fmt;

use crate::cli::io::{Console, STOP_KEYWORD};
use crate::domain::{DomainError, Quantity};
use crate::errors::Flow;

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Result of one acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    Valid(T),
    /// The attempt already reported why it failed; read again.
    Retry,
}

/// Runs `attempt` until it yields a value the user accepts.
///
/// Termination keywords and end of input propagate out of `attempt` through
/// the returned error.
pub fn confirm_loop<T, A, E>(
    console: &mut Console,
    confirm: bool,
    mut attempt: A,
    echo: E,
) -> Flow<T>
where
    A: FnMut(&mut Console) -> Flow<Attempt<T>>,
    E: Fn(&T) -> String,
{
    loop {
        let value = match attempt(console)? {
            Attempt::Valid(value) => value,
            Attempt::Retry => continue,
        };
        if !confirm {
            return Ok(value);
        }
        let question = format!("You entered: {}. Is this correct?", echo(&value));
        if console.ask(&question)? {
            return Ok(value);
        }
        tracing::debug!("entry declined, asking again");
    }
}

/// Reads one line per attempt and validates it with `validate`.
pub fn acquire<T, V, E>(
    console: &mut Console,
    confirm: bool,
    prompt: &str,
    validate: V,
    echo: E,
) -> Flow<T>
where
    V: Fn(&str) -> Result<T, ValidationError>,
    E: Fn(&T) -> String,
{
    confirm_loop(
        console,
        confirm,
        |console| {
            let line = console.next_line(prompt)?;
            match validate(&line) {
                Ok(value) => Ok(Attempt::Valid(value)),
                Err(err) => {
                    console.error(&err)?;
                    console.info("Please try again.")?;
                    Ok(Attempt::Retry)
                }
            }
        },
        echo,
    )
}

/// Parses a short integer. Surrounding whitespace is not accepted.
pub fn parse_short(input: &str, field: &str) -> Result<i16, ValidationError> {
    input.parse::<i16>().map_err(|_| {
        ValidationError::new(format!(
            "{field} '{input}' is not a valid integer in [{}, {}]",
            i16::MIN,
            i16::MAX
        ))
    })
}

pub fn parse_quantity(input: &str) -> Result<Quantity, ValidationError> {
    let value = parse_short(input, "Quantity")?;
    Quantity::new(value).map_err(|err| ValidationError::new(err.to_string()))
}

/// Free text accepted by `check`; `stop` keeps `previous`.
pub fn bounded_text<C>(input: &str, previous: &str, check: C) -> Result<String, ValidationError>
where
    C: Fn(&str) -> Result<(), DomainError>,
{
    if input == STOP_KEYWORD {
        return Ok(previous.to_string());
    }
    check(input).map_err(|err| ValidationError::new(err.to_string()))?;
    Ok(input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::io::SharedOutput;
    use crate::domain::common::check_length;
    use crate::errors::{SessionError, Termination};

    #[test]
    fn short_parsing_is_strict() {
        assert_eq!(parse_short("42", "Id"), Ok(42));
        assert_eq!(parse_short("-7", "Id"), Ok(-7));
        assert!(parse_short(" 42", "Id").is_err());
        assert!(parse_short("40000", "Id").is_err());
        assert!(parse_short("", "Id").is_err());
    }

    #[test]
    fn quantity_must_be_positive() {
        assert_eq!(parse_quantity("3").map(Quantity::get), Ok(3));
        assert!(parse_quantity("0").is_err());
        assert!(parse_quantity("-2").is_err());
        assert!(parse_quantity("three").is_err());
    }

    #[test]
    fn stop_keeps_previous_text() {
        let check = |value: &str| check_length("name", value, 5);
        assert_eq!(bounded_text("stop", "Old", check), Ok("Old".into()));
        assert_eq!(bounded_text("New", "Old", check), Ok("New".into()));
        assert!(bounded_text("", "Old", check).is_err());
        assert!(bounded_text("Too long", "Old", check).is_err());
    }

    #[test]
    fn invalid_entries_are_retried_without_confirmation() {
        let out = SharedOutput::new();
        let mut console = Console::scripted(["-1", "0", "4", "n", "5", "y"], out.clone());
        let quantity = acquire(&mut console, true, "Quantity: ", parse_quantity, |q| {
            q.to_string()
        })
        .unwrap();
        assert_eq!(quantity.get(), 5);

        let transcript = out.contents();
        assert_eq!(transcript.matches("Is this correct?").count(), 2);
        assert_eq!(transcript.matches("Please try again.").count(), 2);
    }

    #[test]
    fn confirmation_can_be_disabled() {
        let out = SharedOutput::new();
        let mut console = Console::scripted(["9"], out.clone());
        let quantity =
            acquire(&mut console, false, "Quantity: ", parse_quantity, |q| q.to_string()).unwrap();
        assert_eq!(quantity.get(), 9);
        assert!(!out.contents().contains("Is this correct?"));
    }

    #[test]
    fn end_of_input_escapes_the_loop() {
        let mut console = Console::scripted(["bad"], SharedOutput::new());
        let result = acquire(&mut console, true, "Quantity: ", parse_quantity, |q| {
            q.to_string()
        });
        assert!(matches!(
            result,
            Err(SessionError::Terminated(Termination::EndOfInput))
        ));
    }
}
