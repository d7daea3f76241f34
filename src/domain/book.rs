use serde::{Deserialize, Serialize};

use super::common::Displayable;

pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// A book as listed inside one category. `(title, year)` is the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub year: i16,
    pub language: Option<String>,
    pub category: String,
    pub weight: i16,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        year: i16,
        language: Option<String>,
        category: impl Into<String>,
        weight: i16,
    ) -> Self {
        Self {
            title: title.into(),
            year,
            language,
            category: category.into(),
            weight,
        }
    }

    pub fn language_label(&self) -> &str {
        self.language
            .as_deref()
            .filter(|lang| !lang.is_empty())
            .unwrap_or(UNKNOWN_LANGUAGE)
    }
}

impl Displayable for Book {
    fn display_label(&self) -> String {
        format!("{} ({})", self.title, self.year)
    }
}

/// The cheapest eligible offer for a book: which club sells it and at what price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub club: String,
    pub price: f64,
}
