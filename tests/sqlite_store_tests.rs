use book_purchase::{
    domain::{PurchaseDraft, Quantity},
    errors::StoreError,
    storage::{BookStore, SqliteStore},
};
use chrono::{Duration, TimeZone, Utc};
use tempfile::tempdir;

fn seeded(path: &std::path::Path) -> SqliteStore {
    let mut store = SqliteStore::open(path).unwrap();
    store.seed_demo().unwrap();
    store
}

fn buy(store: &mut SqliteStore, quantity: i16, minutes: i64) {
    let book = store.list_books_in_category("mystery").unwrap().remove(0);
    let offer = store
        .min_price_for_customer(7, &book.title, book.year)
        .unwrap()
        .unwrap();
    let mut draft = PurchaseDraft::new(7, &book, offer);
    draft.set_quantity(Quantity::new(quantity).unwrap());
    let when = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes);
    store.insert_purchase(&draft.stamp(when).unwrap()).unwrap();
}

#[test]
fn committed_changes_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("books.sqlite");

    let mut store = seeded(&path);
    store.update_customer(7, "Jackie Chan", "Williamsburg").unwrap();
    buy(&mut store, 3, 0);
    store.commit().unwrap();
    store.close().unwrap();

    let store = SqliteStore::open(&path).unwrap();
    let customer = store.lookup_customer(7).unwrap().unwrap();
    assert_eq!(customer.name, "Jackie Chan");
    let purchases = store.list_purchases(7).unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].quantity, 3);
    assert_eq!(
        purchases[0].when,
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    );
}

#[test]
fn uncommitted_changes_are_lost_on_close() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("books.sqlite");

    let mut store = seeded(&path);
    store.update_customer(7, "Jackie Chan", "Boston").unwrap();
    buy(&mut store, 1, 0);
    store.close().unwrap();

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.lookup_customer(7).unwrap().unwrap().city, "Williamsburg");
    assert!(store.list_purchases(7).unwrap().is_empty());
}

#[test]
fn rollback_keeps_earlier_commits() {
    let dir = tempdir().unwrap();
    let mut store = seeded(&dir.path().join("books.sqlite"));

    buy(&mut store, 1, 0);
    store.commit().unwrap();
    buy(&mut store, 2, 5);
    store.rollback().unwrap();

    let purchases = store.list_purchases(7).unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].quantity, 1);
}

#[test]
fn queries_follow_documented_order() {
    let dir = tempdir().unwrap();
    let store = seeded(&dir.path().join("books.sqlite"));

    assert_eq!(store.customer_id_range().unwrap(), Some((1, 7)));
    let ids: Vec<_> = store.list_customers().unwrap().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2, 7]);
    assert_eq!(
        store.list_categories().unwrap(),
        vec!["children", "cooking", "mystery", "science"]
    );

    let books: Vec<_> = store
        .list_books_in_category("science")
        .unwrap()
        .into_iter()
        .map(|b| (b.title, b.year))
        .collect();
    assert_eq!(
        books,
        vec![
            ("Alpha Centauri".to_string(), 1990),
            ("Brief History".to_string(), 1991),
            ("Alpha Centauri".to_string(), 1995),
        ]
    );
    let children = store.list_books_in_category("children").unwrap();
    assert_eq!(children[0].language_label(), "Unknown");
}

#[test]
fn empty_database_has_no_id_range() {
    let dir = tempdir().unwrap();
    let store = SqliteStore::open(&dir.path().join("empty.sqlite")).unwrap();
    assert_eq!(store.customer_id_range().unwrap(), None);
    assert!(store.lookup_customer(7).unwrap().is_none());
}

#[test]
fn non_positive_quantity_violates_constraint() {
    let dir = tempdir().unwrap();
    let mut store = seeded(&dir.path().join("books.sqlite"));
    let err = store
        .execute_batch(
            "INSERT INTO purchase (cid, club, title, year, purchased_at, qnty) \
             VALUES (7, 'Readers', 'Nightfall', 1992, 0, 0)",
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Sqlite(_)));
}

#[test]
fn unopenable_path_reports_sqlite_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        SqliteStore::open(dir.path()),
        Err(StoreError::Sqlite(_))
    ));
}
