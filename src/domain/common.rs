use thiserror::Error;

/// Supplies a presentation-ready label for prompts and logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Validation failures raised while building domain records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{field} has length {length} which is not in the following range: [1, {max}]")]
    FieldLength {
        field: &'static str,
        length: usize,
        max: usize,
    },
    #[error("quantity({0}) is not positive")]
    NonPositiveQuantity(i64),
    #[error("purchase has no quantity yet")]
    MissingQuantity,
}

/// Checks that `value` has between 1 and `max` characters.
pub fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), DomainError> {
    let length = value.chars().count();
    if length == 0 || length > max {
        Err(DomainError::FieldLength { field, length, max })
    } else {
        Ok(())
    }
}
