#![doc(test(attr(deny(warnings))))]

//! Book Purchase drives a line-oriented wizard that looks up a customer,
//! walks them through a category and a book, and records the purchase in a
//! book-sales database.

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Book Purchase tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
