//! The purchase workflow as an explicit state machine.
//!
//! Each [`Step`] carries exactly the working values that are valid while it
//! is active, so backtracking is a matter of building an earlier step from
//! the values that survive. Termination keywords and fatal store failures are
//! not states: they leave through the `Err` side of [`Flow`].

use chrono::Utc;

use crate::cli::customer::{self, CustomerLookup};
use crate::cli::forms::parse_quantity;
use crate::cli::report::{self, HistoryEntry};
use crate::cli::selection::{self, Pick};
use crate::cli::shell_context::ShellContext;
use crate::domain::{Book, CustomerId, Purchase, PurchaseDraft};
use crate::errors::{Flow, SessionError, StoreError};
use crate::storage::{self, BookStore};

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Customer,
    Category {
        customer: CustomerId,
    },
    Book {
        customer: CustomerId,
        category: String,
    },
    Purchase {
        customer: CustomerId,
        category: String,
        book: Book,
    },
    Finalize {
        customer: CustomerId,
        category: String,
        book: Book,
        draft: PurchaseDraft,
    },
    BackTrack {
        customer: CustomerId,
        category: String,
        book: Book,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Customer => "customer",
            Step::Category { .. } => "category",
            Step::Book { .. } => "book",
            Step::Purchase { .. } => "purchase",
            Step::Finalize { .. } => "finalize",
            Step::BackTrack { .. } => "back-track",
        }
    }
}

/// How one run of the wizard ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The run is over; a restart may be offered.
    Completed,
    /// The user asked to leave the application.
    ExitRequested,
}

enum Transition {
    Next(Step),
    End(SessionEnd),
}

/// Drives one run from the customer step until the run ends.
pub fn run_wizard(ctx: &mut ShellContext<'_>) -> Flow<SessionEnd> {
    let mut step = Step::Customer;
    loop {
        tracing::debug!(step = step.name(), "entering step");
        let transition = match step {
            Step::Customer => customer_step(ctx)?,
            Step::Category { customer } => category_step(ctx, customer)?,
            Step::Book { customer, category } => book_step(ctx, customer, category)?,
            Step::Purchase {
                customer,
                category,
                book,
            } => purchase_step(ctx, customer, category, book)?,
            Step::Finalize {
                customer,
                category,
                book,
                draft,
            } => finalize_step(ctx, customer, category, book, draft)?,
            Step::BackTrack {
                customer,
                category,
                book: _,
            } => back_track_step(ctx, customer, category)?,
        };
        match transition {
            Transition::Next(next) => step = next,
            Transition::End(end) => {
                tracing::debug!(?end, "wizard run finished");
                return Ok(end);
            }
        }
    }
}

fn customer_step(ctx: &mut ShellContext<'_>) -> Flow<Transition> {
    match customer::find_customer(ctx)? {
        CustomerLookup::Found(customer) => Ok(Transition::Next(Step::Category { customer })),
        CustomerLookup::NotFound => {
            if ctx.ask("Do you want to try again?")? {
                Ok(Transition::Next(Step::Customer))
            } else {
                Ok(Transition::End(SessionEnd::Completed))
            }
        }
    }
}

fn category_step(ctx: &mut ShellContext<'_>, customer: CustomerId) -> Flow<Transition> {
    let categories = ctx.fetch("find the book categories", |store| store.list_categories())?;
    match selection::choose_category(ctx, categories)? {
        Some(category) => Ok(Transition::Next(Step::Book { customer, category })),
        None => {
            ctx.errors
                .record("There are no book categories in the database.");
            ctx.console
                .error("There are no book categories in the database.")?;
            Ok(Transition::End(SessionEnd::ExitRequested))
        }
    }
}

fn book_step(ctx: &mut ShellContext<'_>, customer: CustomerId, category: String) -> Flow<Transition> {
    let books = ctx.fetch("find the books of the chosen category", |store| {
        store.list_books_in_category(&category)
    })?;
    match selection::choose_book(ctx, books)? {
        Pick::Chosen(book) | Pick::OnlyChoice(book) => Ok(Transition::Next(Step::Purchase {
            customer,
            category,
            book,
        })),
        Pick::OnlyChoiceRejected => {
            if ctx.ask("Do you want to choose a different category?")? {
                return Ok(Transition::Next(Step::Category { customer }));
            }
            ctx.console.warning(
                "You have chosen not to accept the only available book, \
                 but also not to change the book category. These cannot both be done.",
            )?;
            Ok(Transition::End(SessionEnd::Completed))
        }
        Pick::Empty => {
            ctx.console
                .warning(format!("There are no books in the category '{category}'."))?;
            if ctx.ask("Do you want to try again?")? {
                Ok(Transition::Next(Step::Category { customer }))
            } else {
                Ok(Transition::End(SessionEnd::Completed))
            }
        }
    }
}

fn purchase_step(
    ctx: &mut ShellContext<'_>,
    customer: CustomerId,
    category: String,
    book: Book,
) -> Flow<Transition> {
    let offer = ctx.fetch("find the minimum price of the chosen book", |store| {
        store.min_price_for_customer(customer, &book.title, book.year)
    })?;
    let Some(offer) = offer else {
        ctx.console.warning(format!(
            "The book '{}' ({}) of category '{category}' is not offered at any price \
             to the customer with ID {customer}.",
            book.title, book.year
        ))?;
        return Ok(Transition::Next(Step::BackTrack {
            customer,
            category,
            book,
        }));
    };

    ctx.console.info(format!(
        "The minimum price for '{}' ({}) is {} through the club '{}'.",
        book.title,
        book.year,
        report::money(offer.price),
        offer.club
    ))?;
    let mut draft = PurchaseDraft::new(customer, &book, offer);
    let quantity = ctx.acquire(
        "Please enter the purchase quantity: ",
        parse_quantity,
        |quantity| quantity.to_string(),
    )?;
    draft.set_quantity(quantity);
    Ok(Transition::Next(Step::Finalize {
        customer,
        category,
        book,
        draft,
    }))
}

fn finalize_step(
    ctx: &mut ShellContext<'_>,
    customer: CustomerId,
    category: String,
    book: Book,
    draft: PurchaseDraft,
) -> Flow<Transition> {
    ctx.console.info("The following is your order:")?;
    ctx.console.say(report::order_summary(&draft))?;
    if !ctx.ask("Do you want to make this purchase?")? {
        tracing::debug!("purchase declined");
        return Ok(Transition::Next(Step::BackTrack {
            customer,
            category,
            book,
        }));
    }

    let purchase = draft
        .stamp(Utc::now())
        .map_err(|err| SessionError::store("finalize the purchase", StoreError::from(err)))?;
    let saved = ctx.write_with_retry("insert the purchase", |store| {
        insert_once(store, &purchase)
    })?;
    if saved {
        ctx.console.success("Your purchase has been recorded.")?;
    } else {
        ctx.console.warning("The purchase has not been recorded.")?;
    }

    if ctx.ask("Do you want to view all purchases made by the chosen customer?")? {
        show_history(ctx, customer)?;
    }
    Ok(Transition::End(SessionEnd::Completed))
}

/// Inserts `purchase` unless the same entry is already stored.
fn insert_once(store: &mut dyn BookStore, purchase: &Purchase) -> storage::Result<()> {
    let existing = store.list_purchases(purchase.customer_id)?;
    if existing.iter().any(|record| purchase.same_entry(record)) {
        tracing::info!(cid = purchase.customer_id, "purchase already stored");
        return Ok(());
    }
    store.insert_purchase(purchase)
}

fn show_history(ctx: &mut ShellContext<'_>, customer: CustomerId) -> Flow<()> {
    let entries = loop {
        match ctx.attempt("find the purchases of the chosen customer", |store| {
            history(&*store, customer)
        })? {
            Ok(entries) => break entries,
            Err(_) => {
                if !ctx.ask("Do you want to try again?")? {
                    return Ok(());
                }
            }
        }
    };
    if entries.is_empty() {
        return ctx
            .console
            .info(format!("The customer with ID {customer} has no purchases."));
    }
    ctx.console.section("Purchase History")?;
    ctx.console.say(report::history_table(&entries))
}

/// Purchases in history order, each with its current cheapest offer.
fn history(store: &dyn BookStore, customer: CustomerId) -> storage::Result<Vec<HistoryEntry>> {
    let mut records = store.list_purchases(customer)?;
    records.sort_by(|a, b| a.history_order(b));
    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        match store.min_price_for_customer(customer, &record.title, record.year)? {
            Some(offer) => entries.push(HistoryEntry { record, offer }),
            None => tracing::debug!(title = %record.title, "no eligible price, skipped"),
        }
    }
    Ok(entries)
}

fn back_track_step(
    ctx: &mut ShellContext<'_>,
    customer: CustomerId,
    category: String,
) -> Flow<Transition> {
    if ctx.ask("Do you want to exit the application?")? {
        return Ok(Transition::End(SessionEnd::ExitRequested));
    }
    if ctx.ask("Do you want to choose another book?")? {
        return Ok(Transition::Next(Step::Book { customer, category }));
    }
    if ctx.ask("Do you want to choose another category?")? {
        return Ok(Transition::Next(Step::Category { customer }));
    }
    if ctx.ask("Do you want to choose another customer?")? {
        return Ok(Transition::Next(Step::Customer));
    }
    ctx.console.warning(
        "You have chosen not to complete the purchase, not to exit the application \
         and not to change any choice. These contradict each other.",
    )?;
    Ok(Transition::End(SessionEnd::Completed))
}
