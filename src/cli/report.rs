//! Fixed-layout reports printed by the wizard.

use chrono::{DateTime, Utc};

use crate::cli::table::{Table, TableColumn};
use crate::domain::{Customer, Offer, PurchaseDraft, PurchaseRecord};

/// `label = value` lines with the labels right-aligned.
fn key_values(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(label, value)| format!("{label:>width$} = {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

pub fn timestamp(when: &DateTime<Utc>) -> String {
    when.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string()
}

pub fn customer_card(customer: &Customer) -> String {
    key_values(&[
        ("CID", customer.id.to_string()),
        ("Name", customer.name.clone()),
        ("City", customer.city.clone()),
    ])
}

pub fn order_summary(draft: &PurchaseDraft) -> String {
    let quantity = draft
        .quantity()
        .map(|q| q.to_string())
        .unwrap_or_else(|| "-".to_string());
    key_values(&[
        ("Title", draft.title.clone()),
        ("Year", draft.year.to_string()),
        ("Club", draft.club.clone()),
        ("Book Price", money(draft.price)),
        ("Quantity", quantity),
        ("Total Cost", money(draft.total_cost())),
    ])
}

pub fn customer_table(customers: &[Customer]) -> String {
    let mut table = Table::new(vec![
        TableColumn::right("Number"),
        TableColumn::right("Customer ID"),
        TableColumn::left("Name"),
        TableColumn::left("City"),
    ]);
    for (idx, customer) in customers.iter().enumerate() {
        table.push_row(vec![
            (idx + 1).to_string(),
            customer.id.to_string(),
            customer.name.clone(),
            customer.city.clone(),
        ]);
    }
    table.render()
}

/// One history line: the stored purchase and its current cheapest offer.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub record: PurchaseRecord,
    pub offer: Offer,
}

impl HistoryEntry {
    pub fn total_cost(&self) -> f64 {
        f64::from(self.record.quantity) * self.offer.price
    }
}

pub fn history_table(entries: &[HistoryEntry]) -> String {
    let mut table = Table::new(vec![
        TableColumn::right("Number"),
        TableColumn::left("Club Name"),
        TableColumn::left("Book Title"),
        TableColumn::right("Book Year"),
        TableColumn::right("Book Price"),
        TableColumn::right("Purchase Quantity"),
        TableColumn::right("Total Cost"),
        TableColumn::left("Purchase Time"),
    ]);
    for (idx, entry) in entries.iter().enumerate() {
        table.push_row(vec![
            (idx + 1).to_string(),
            entry.record.club.clone(),
            entry.record.title.clone(),
            entry.record.year.to_string(),
            money(entry.offer.price),
            entry.record.quantity.to_string(),
            money(entry.total_cost()),
            timestamp(&entry.record.when),
        ]);
    }
    table.render()
}
