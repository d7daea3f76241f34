//! Persistence collaborator consumed by the wizard.
//!
//! The wizard never decides state transitions from storage internals; it only
//! asks for candidate lists and writes the finished results through
//! [`BookStore`]. Every call may fail and failures are always reported as
//! [`StoreError`], never as an empty or default value.

pub mod sqlite_backend;

use crate::domain::{Book, Customer, CustomerId, Offer, Purchase, PurchaseRecord};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Abstraction over the book-sales database.
pub trait BookStore {
    fn lookup_customer(&self, id: CustomerId) -> Result<Option<Customer>>;

    /// Smallest and largest customer id, `None` when there are no customers.
    fn customer_id_range(&self) -> Result<Option<(CustomerId, CustomerId)>>;

    /// All customers ordered by id.
    fn list_customers(&self) -> Result<Vec<Customer>>;

    fn update_customer(&mut self, id: CustomerId, name: &str, city: &str) -> Result<()>;

    /// Category names in display order.
    fn list_categories(&self) -> Result<Vec<String>>;

    /// Books of one category ordered by year, then title.
    fn list_books_in_category(&self, category: &str) -> Result<Vec<Book>>;

    /// Cheapest offer for `(title, year)` among the clubs the customer belongs to.
    fn min_price_for_customer(
        &self,
        id: CustomerId,
        title: &str,
        year: i16,
    ) -> Result<Option<Offer>>;

    fn list_purchases(&self, id: CustomerId) -> Result<Vec<PurchaseRecord>>;

    fn insert_purchase(&mut self, purchase: &Purchase) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

pub use crate::errors::StoreError;
pub use sqlite_backend::SqliteStore;
