//! Records exchanged between the wizard and the store.

pub mod book;
pub mod common;
pub mod customer;
pub mod purchase;

pub use book::{Book, Offer};
pub use common::{DomainError, Displayable};
pub use customer::{Customer, CustomerId};
pub use purchase::{Purchase, PurchaseDraft, PurchaseRecord, Quantity};
