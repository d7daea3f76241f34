use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::book::{Book, Offer};
use super::common::DomainError;
use super::customer::CustomerId;

/// A strictly positive purchase quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quantity(i16);

impl Quantity {
    pub fn new(value: i16) -> Result<Self, DomainError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(DomainError::NonPositiveQuantity(value.into()))
        }
    }

    pub fn get(self) -> i16 {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Purchase being assembled by the wizard. Mutable until stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseDraft {
    pub customer_id: CustomerId,
    pub club: String,
    pub title: String,
    pub year: i16,
    pub price: f64,
    quantity: Option<Quantity>,
}

impl PurchaseDraft {
    pub fn new(customer_id: CustomerId, book: &Book, offer: Offer) -> Self {
        Self {
            customer_id,
            club: offer.club,
            title: book.title.clone(),
            year: book.year,
            price: offer.price,
            quantity: None,
        }
    }

    pub fn quantity(&self) -> Option<Quantity> {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = Some(quantity);
    }

    pub fn total_cost(&self) -> f64 {
        self.quantity
            .map(|q| f64::from(q.get()) * self.price)
            .unwrap_or(0.0)
    }

    /// Fixes the purchase time, producing the immutable record to persist.
    pub fn stamp(&self, when: DateTime<Utc>) -> Result<Purchase, DomainError> {
        let quantity = self.quantity.ok_or(DomainError::MissingQuantity)?;
        Ok(Purchase {
            customer_id: self.customer_id,
            club: self.club.clone(),
            title: self.title.clone(),
            year: self.year,
            price: self.price,
            quantity,
            when,
        })
    }
}

/// A finalized purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub customer_id: CustomerId,
    pub club: String,
    pub title: String,
    pub year: i16,
    pub price: f64,
    pub quantity: Quantity,
    pub when: DateTime<Utc>,
}

impl Purchase {
    pub fn total_cost(&self) -> f64 {
        f64::from(self.quantity.get()) * self.price
    }

    /// Whether `record` denotes the same stored purchase (same club, book and time).
    pub fn same_entry(&self, record: &PurchaseRecord) -> bool {
        self.club == record.club
            && self.title == record.title
            && self.year == record.year
            && self.when.timestamp_millis() == record.when.timestamp_millis()
    }
}

/// A purchase row as stored for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub club: String,
    pub title: String,
    pub year: i16,
    pub when: DateTime<Utc>,
    pub quantity: i16,
}

impl PurchaseRecord {
    /// History order: time, then club, year and title.
    pub fn history_order(&self, other: &Self) -> Ordering {
        self.when
            .cmp(&other.when)
            .then_with(|| self.club.cmp(&other.club))
            .then_with(|| self.year.cmp(&other.year))
            .then_with(|| self.title.cmp(&other.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> PurchaseDraft {
        let book = Book::new("Alpha", 1990, Some("English".into()), "Mystery", 300);
        PurchaseDraft::new(
            7,
            &book,
            Offer {
                club: "Readers".into(),
                price: 12.5,
            },
        )
    }

    #[test]
    fn quantity_rejects_zero_and_negative() {
        assert_eq!(Quantity::new(0), Err(DomainError::NonPositiveQuantity(0)));
        assert_eq!(Quantity::new(-4), Err(DomainError::NonPositiveQuantity(-4)));
        assert_eq!(Quantity::new(3).map(Quantity::get), Ok(3));
    }

    #[test]
    fn stamping_requires_quantity() {
        let when = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let mut draft = draft();
        assert_eq!(draft.stamp(when), Err(DomainError::MissingQuantity));

        draft.set_quantity(Quantity::new(3).unwrap());
        let purchase = draft.stamp(when).unwrap();
        assert_eq!(purchase.quantity.get(), 3);
        assert_eq!(purchase.when, when);
        assert!((purchase.total_cost() - 37.5).abs() < f64::EPSILON);
    }

    #[test]
    fn same_entry_ignores_quantity() {
        let when = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let mut draft = draft();
        draft.set_quantity(Quantity::new(2).unwrap());
        let purchase = draft.stamp(when).unwrap();
        let record = PurchaseRecord {
            club: "Readers".into(),
            title: "Alpha".into(),
            year: 1990,
            when,
            quantity: 9,
        };
        assert!(purchase.same_entry(&record));
    }
}
