#![allow(dead_code)]

use std::cell::Cell;

use book_purchase::{
    cli::{
        io::{Console, SharedOutput},
        ExitSummary, SessionSettings, Shell,
    },
    domain::{Book, Customer, CustomerId, Offer, Purchase, PurchaseRecord},
    errors::StoreError,
    storage::{self, BookStore},
};
use tempfile::TempDir;

#[derive(Debug, Clone, Default)]
struct Tables {
    customers: Vec<Customer>,
    purchases: Vec<Purchase>,
}

/// In-memory [`BookStore`] with a working and a durable copy of the mutable
/// tables, plus switches to make individual operations fail.
#[derive(Debug, Default)]
pub struct MemoryStore {
    working: Tables,
    durable: Tables,
    pub categories: Vec<String>,
    pub books: Vec<Book>,
    /// `(customer, title, year, offer)` for every club the customer belongs to.
    pub offers: Vec<(CustomerId, String, i16, Offer)>,
    pub commits: usize,
    pub rollbacks: usize,
    pub closed: bool,
    /// Number of upcoming purchase inserts that fail.
    pub failing_inserts: usize,
    pub failing_price_lookup: bool,
    pub failing_rollback: bool,
    /// Number of purchase listings that fail while a purchase is pending.
    pub failing_history_listings: Cell<usize>,
}

impl MemoryStore {
    pub fn with_customers(customers: Vec<Customer>) -> Self {
        let tables = Tables {
            customers,
            purchases: Vec::new(),
        };
        Self {
            working: tables.clone(),
            durable: tables,
            ..Self::default()
        }
    }

    pub fn add_book(&mut self, book: Book) {
        if !self.categories.contains(&book.category) {
            self.categories.push(book.category.clone());
        }
        self.books.push(book);
    }

    pub fn add_offer(&mut self, customer: CustomerId, title: &str, year: i16, club: &str, price: f64) {
        self.offers.push((
            customer,
            title.to_string(),
            year,
            Offer {
                club: club.to_string(),
                price,
            },
        ));
    }

    pub fn durable_customer(&self, id: CustomerId) -> Option<&Customer> {
        self.durable.customers.iter().find(|c| c.id == id)
    }

    pub fn durable_purchases(&self) -> &[Purchase] {
        &self.durable.purchases
    }

    pub fn pending_purchases(&self) -> &[Purchase] {
        &self.working.purchases
    }
}

fn injected(what: &str) -> StoreError {
    StoreError::Constraint(format!("injected {what} failure"))
}

impl BookStore for MemoryStore {
    fn lookup_customer(&self, id: CustomerId) -> storage::Result<Option<Customer>> {
        Ok(self.working.customers.iter().find(|c| c.id == id).cloned())
    }

    fn customer_id_range(&self) -> storage::Result<Option<(CustomerId, CustomerId)>> {
        let ids = self.working.customers.iter().map(|c| c.id);
        Ok(ids.clone().min().zip(ids.max()))
    }

    fn list_customers(&self) -> storage::Result<Vec<Customer>> {
        let mut customers = self.working.customers.clone();
        customers.sort_by_key(|c| c.id);
        Ok(customers)
    }

    fn update_customer(&mut self, id: CustomerId, name: &str, city: &str) -> storage::Result<()> {
        let customer = self
            .working
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::Constraint(format!("customer {id} does not exist")))?;
        customer.name = name.to_string();
        customer.city = city.to_string();
        Ok(())
    }

    fn list_categories(&self) -> storage::Result<Vec<String>> {
        Ok(self.categories.clone())
    }

    fn list_books_in_category(&self, category: &str) -> storage::Result<Vec<Book>> {
        let mut books: Vec<Book> = self
            .books
            .iter()
            .filter(|b| b.category == category)
            .cloned()
            .collect();
        books.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.title.cmp(&b.title)));
        Ok(books)
    }

    fn min_price_for_customer(
        &self,
        id: CustomerId,
        title: &str,
        year: i16,
    ) -> storage::Result<Option<Offer>> {
        if self.failing_price_lookup {
            return Err(injected("price lookup"));
        }
        Ok(self
            .offers
            .iter()
            .filter(|(cid, t, y, _)| *cid == id && t == title && *y == year)
            .map(|(_, _, _, offer)| offer.clone())
            .min_by(|a, b| {
                a.price
                    .total_cmp(&b.price)
                    .then_with(|| a.club.cmp(&b.club))
            }))
    }

    fn list_purchases(&self, id: CustomerId) -> storage::Result<Vec<PurchaseRecord>> {
        let remaining = self.failing_history_listings.get();
        if remaining > 0 && !self.working.purchases.is_empty() {
            self.failing_history_listings.set(remaining - 1);
            return Err(injected("purchase listing"));
        }
        Ok(self
            .working
            .purchases
            .iter()
            .filter(|p| p.customer_id == id)
            .map(|p| PurchaseRecord {
                club: p.club.clone(),
                title: p.title.clone(),
                year: p.year,
                when: p.when,
                quantity: p.quantity.get(),
            })
            .collect())
    }

    fn insert_purchase(&mut self, purchase: &Purchase) -> storage::Result<()> {
        self.working.purchases.push(purchase.clone());
        if self.failing_inserts > 0 {
            self.failing_inserts -= 1;
            return Err(injected("insert"));
        }
        Ok(())
    }

    fn commit(&mut self) -> storage::Result<()> {
        self.durable = self.working.clone();
        self.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> storage::Result<()> {
        if self.failing_rollback {
            return Err(injected("rollback"));
        }
        self.working = self.durable.clone();
        self.rollbacks += 1;
        Ok(())
    }

    fn close(&mut self) -> storage::Result<()> {
        self.working = self.durable.clone();
        self.closed = true;
        Ok(())
    }
}

/// Customer 7 and a single mystery book they can buy from one club.
pub fn single_book_store() -> MemoryStore {
    let mut store =
        MemoryStore::with_customers(vec![Customer::new(7, "Jackie Johnson", "Williamsburg")]);
    store.add_book(Book::new(
        "Nightfall",
        1992,
        Some("English".into()),
        "Mystery",
        300,
    ));
    store.add_offer(7, "Nightfall", 1992, "Readers", 12.75);
    store
}

/// Temporary directory holding the error log of one scripted session.
pub struct Harness {
    pub dir: TempDir,
    pub settings: SessionSettings,
}

impl Harness {
    /// Confirmation and end-of-input preferences fixed, so only
    /// "start the application?" is asked at startup.
    pub fn new(confirm_input: bool) -> Self {
        let dir = TempDir::new().unwrap();
        let settings = SessionSettings {
            confirm_input: Some(confirm_input),
            commit_on_end_of_input: Some(false),
            error_log_path: dir.path().join("stderr.txt"),
        };
        Self { dir, settings }
    }

    pub fn with_settings(mut self, edit: impl FnOnce(&mut SessionSettings)) -> Self {
        edit(&mut self.settings);
        self
    }

    pub fn run(&self, store: &mut MemoryStore, lines: &[&str]) -> (ExitSummary, String) {
        let out = SharedOutput::new();
        let mut console = Console::scripted(lines.iter().copied(), out.clone());
        let summary = Shell::new(&mut console, store, self.settings.clone()).run();
        (summary, out.contents())
    }
}
