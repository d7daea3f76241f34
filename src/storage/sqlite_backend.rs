use std::{path::Path, time::Duration};

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{BookStore, Result};
use crate::{
    domain::{Book, Customer, CustomerId, Offer, Purchase, PurchaseRecord},
    errors::StoreError,
};

/// Seconds a statement waits on a locked database before failing.
pub const QUERY_TIMEOUT_SECS: u64 = 10;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS customer (
    cid   INTEGER PRIMARY KEY,
    name  TEXT NOT NULL,
    city  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS category (
    cat TEXT PRIMARY KEY
);
CREATE TABLE IF NOT EXISTS book (
    title    TEXT NOT NULL,
    year     INTEGER NOT NULL,
    language TEXT,
    cat      TEXT NOT NULL REFERENCES category(cat),
    weight   INTEGER NOT NULL,
    PRIMARY KEY (title, year)
);
CREATE TABLE IF NOT EXISTS club (
    club TEXT PRIMARY KEY,
    description TEXT
);
CREATE TABLE IF NOT EXISTS member (
    club TEXT NOT NULL REFERENCES club(club),
    cid  INTEGER NOT NULL REFERENCES customer(cid),
    PRIMARY KEY (club, cid)
);
CREATE TABLE IF NOT EXISTS offer (
    club  TEXT NOT NULL REFERENCES club(club),
    title TEXT NOT NULL,
    year  INTEGER NOT NULL,
    price REAL NOT NULL,
    PRIMARY KEY (club, title, year)
);
CREATE TABLE IF NOT EXISTS purchase (
    cid          INTEGER NOT NULL REFERENCES customer(cid),
    club         TEXT NOT NULL,
    title        TEXT NOT NULL,
    year         INTEGER NOT NULL,
    purchased_at INTEGER NOT NULL,
    qnty         INTEGER NOT NULL CHECK (qnty > 0),
    PRIMARY KEY (cid, club, title, year, purchased_at)
);
";

const DEMO_DATA: &str = "
INSERT OR IGNORE INTO customer (cid, name, city) VALUES
    (1, 'Tracy Turnip', 'Richmond'),
    (2, 'Qfwfq', 'Pluto'),
    (7, 'Jackie Johnson', 'Williamsburg');
INSERT OR IGNORE INTO category (cat) VALUES
    ('children'), ('cooking'), ('mystery'), ('science');
INSERT OR IGNORE INTO book (title, year, language, cat, weight) VALUES
    ('Alpha Centauri', 1990, 'English', 'science', 410),
    ('Brief History', 1991, 'English', 'science', 250),
    ('Alpha Centauri', 1995, 'French', 'science', 395),
    ('Nightfall', 1992, 'English', 'mystery', 300),
    ('Dessert Days', 1998, 'English', 'cooking', 520),
    ('Radiant Tales', 1999, NULL, 'children', 180);
INSERT OR IGNORE INTO club (club, description) VALUES
    ('Basic', 'Everyone is welcome'),
    ('Readers', 'Frequent readers'),
    ('Science', 'Science fans');
INSERT OR IGNORE INTO member (club, cid) VALUES
    ('Basic', 1), ('Basic', 2), ('Basic', 7),
    ('Readers', 7), ('Science', 1);
INSERT OR IGNORE INTO offer (club, title, year, price) VALUES
    ('Basic', 'Alpha Centauri', 1990, 30.00),
    ('Science', 'Alpha Centauri', 1990, 24.50),
    ('Basic', 'Alpha Centauri', 1995, 28.00),
    ('Basic', 'Brief History', 1991, 19.99),
    ('Basic', 'Nightfall', 1992, 15.00),
    ('Readers', 'Nightfall', 1992, 12.75),
    ('Basic', 'Dessert Days', 1998, 22.00),
    ('Readers', 'Radiant Tales', 1999, 9.50);
";

/// [`BookStore`] backed by a single SQLite connection.
///
/// All work happens inside one explicit transaction that is reopened after
/// every commit or rollback, so nothing reaches the file until
/// [`BookStore::commit`] is called.
pub struct SqliteStore {
    conn: Option<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "opening book store");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(QUERY_TIMEOUT_SECS))?;
        conn.execute_batch(SCHEMA)?;
        conn.execute_batch("BEGIN DEFERRED")?;
        Ok(Self { conn: Some(conn) })
    }

    /// Loads the demo data set and commits it.
    pub fn seed_demo(&mut self) -> Result<()> {
        self.conn()?.execute_batch(DEMO_DATA)?;
        self.commit()
    }

    /// Runs raw SQL inside the current transaction. Intended for fixtures.
    pub fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(StoreError::Closed)
    }

    fn reopen_transaction(conn: &Connection) -> Result<()> {
        if conn.is_autocommit() {
            conn.execute_batch("BEGIN DEFERRED")?;
        }
        Ok(())
    }
}

fn timestamp_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| StoreError::Constraint(format!("invalid purchase timestamp {millis}")))
}

impl BookStore for SqliteStore {
    fn lookup_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let customer = self
            .conn()?
            .query_row(
                "SELECT cid, name, city FROM customer WHERE cid = ?1",
                params![id],
                |row| {
                    Ok(Customer {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        city: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(customer)
    }

    fn customer_id_range(&self) -> Result<Option<(CustomerId, CustomerId)>> {
        let range = self.conn()?.query_row(
            "SELECT MIN(cid), MAX(cid) FROM customer",
            [],
            |row| {
                let min: Option<CustomerId> = row.get(0)?;
                let max: Option<CustomerId> = row.get(1)?;
                Ok(min.zip(max))
            },
        )?;
        Ok(range)
    }

    fn list_customers(&self) -> Result<Vec<Customer>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT cid, name, city FROM customer ORDER BY cid")?;
        let customers = stmt
            .query_map([], |row| {
                Ok(Customer {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    city: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(customers)
    }

    fn update_customer(&mut self, id: CustomerId, name: &str, city: &str) -> Result<()> {
        let changed = self.conn()?.execute(
            "UPDATE customer SET name = ?1, city = ?2 WHERE cid = ?3",
            params![name, city, id],
        )?;
        if changed == 0 {
            return Err(StoreError::Constraint(format!("customer {id} does not exist")));
        }
        tracing::debug!(cid = id, "customer updated");
        Ok(())
    }

    fn list_categories(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT cat FROM category ORDER BY cat")?;
        let categories = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(categories)
    }

    fn list_books_in_category(&self, category: &str) -> Result<Vec<Book>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT title, year, language, weight FROM book
             WHERE cat = ?1
             ORDER BY year, title",
        )?;
        let books = stmt
            .query_map(params![category], |row| {
                Ok(Book {
                    title: row.get(0)?,
                    year: row.get(1)?,
                    language: row.get(2)?,
                    category: category.to_string(),
                    weight: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(books)
    }

    fn min_price_for_customer(
        &self,
        id: CustomerId,
        title: &str,
        year: i16,
    ) -> Result<Option<Offer>> {
        let offer = self
            .conn()?
            .query_row(
                "SELECT o.club, o.price
                 FROM member m JOIN offer o ON o.club = m.club
                 WHERE m.cid = ?1 AND o.title = ?2 AND o.year = ?3
                 ORDER BY o.price, o.club
                 LIMIT 1",
                params![id, title, year],
                |row| {
                    Ok(Offer {
                        club: row.get(0)?,
                        price: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(offer)
    }

    fn list_purchases(&self, id: CustomerId) -> Result<Vec<PurchaseRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT club, title, year, purchased_at, qnty FROM purchase
             WHERE cid = ?1
             ORDER BY purchased_at, club, year, title",
        )?;
        let rows = stmt
            .query_map(params![id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i16>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i16>(4)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(club, title, year, millis, quantity)| {
                Ok(PurchaseRecord {
                    club,
                    title,
                    year,
                    when: timestamp_from_millis(millis)?,
                    quantity,
                })
            })
            .collect()
    }

    fn insert_purchase(&mut self, purchase: &Purchase) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO purchase (cid, club, title, year, purchased_at, qnty)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                purchase.customer_id,
                purchase.club,
                purchase.title,
                purchase.year,
                purchase.when.timestamp_millis(),
                purchase.quantity.get(),
            ],
        )?;
        tracing::info!(
            cid = purchase.customer_id,
            title = %purchase.title,
            quantity = purchase.quantity.get(),
            "purchase inserted"
        );
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let conn = self.conn()?;
        if !conn.is_autocommit() {
            conn.execute_batch("COMMIT")?;
        }
        tracing::debug!("transaction committed");
        Self::reopen_transaction(conn)
    }

    fn rollback(&mut self) -> Result<()> {
        let conn = self.conn()?;
        if !conn.is_autocommit() {
            conn.execute_batch("ROLLBACK")?;
        }
        tracing::debug!("transaction rolled back");
        Self::reopen_transaction(conn)
    }

    fn close(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        if !conn.is_autocommit() {
            conn.execute_batch("ROLLBACK")?;
        }
        conn.close().map_err(|(_, err)| StoreError::from(err))
    }
}
