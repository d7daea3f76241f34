//! Customer lookup, the optional name/city update and the not-found help.

use crate::cli::answer::parse_answer;
use crate::cli::forms::{bounded_text, parse_short};
use crate::cli::io::{ReadOutcome, STOP_KEYWORD};
use crate::cli::report;
use crate::cli::shell_context::ShellContext;
use crate::domain::customer::{
    validate_city, validate_name, MAX_CUSTOMER_CITY_LENGTH, MAX_CUSTOMER_NAME_LENGTH,
};
use crate::domain::{Customer, CustomerId, DomainError};
use crate::errors::{Flow, Termination};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerLookup {
    Found(CustomerId),
    NotFound,
}

pub fn find_customer(ctx: &mut ShellContext<'_>) -> Flow<CustomerLookup> {
    let id = ctx.acquire(
        "Please enter a customer identification number (ID): ",
        |input| parse_short(input, "Customer ID"),
        |id| id.to_string(),
    )?;
    tracing::debug!(cid = id, "looking up customer");

    let found = ctx.fetch("find the customer with the given ID", |store| {
        store.lookup_customer(id)
    })?;
    let Some(customer) = found else {
        ctx.console
            .warning(format!("Customer ID {id} does not exist in the database."))?;
        show_id_range(ctx)?;
        if ctx.ask("Do you want to view all customers?")? {
            list_all_customers(ctx)?;
        }
        return Ok(CustomerLookup::NotFound);
    };

    ctx.console.say(report::customer_card(&customer))?;
    offer_update(ctx, &customer)?;
    Ok(CustomerLookup::Found(customer.id))
}

fn show_id_range(ctx: &mut ShellContext<'_>) -> Flow<()> {
    let range = ctx.fetch("find the minimum and maximum customer IDs", |store| {
        store.customer_id_range()
    })?;
    if let Some((min, max)) = range {
        ctx.console.info(format!(
            "The minimum and the maximum customer IDs in the database are {min} and {max}. \
             Not every number between them is a valid ID."
        ))?;
    }
    Ok(())
}

fn list_all_customers(ctx: &mut ShellContext<'_>) -> Flow<()> {
    loop {
        match ctx.attempt("find all customers", |store| store.list_customers())? {
            Ok(customers) if customers.is_empty() => {
                return ctx.console.info("There are no customers in the database.");
            }
            Ok(customers) => {
                ctx.console.info("The database contains the following customers:")?;
                return ctx.console.say(report::customer_table(&customers));
            }
            Err(_) => {
                if !ctx.ask("Do you want to try again?")? {
                    return Ok(());
                }
            }
        }
    }
}

fn offer_update(ctx: &mut ShellContext<'_>, customer: &Customer) -> Flow<()> {
    ctx.console
        .info("You can update the name or the city of the current customer (or both).")?;
    if !ctx.ask("Do you want to update the customer's information?")? {
        return Ok(());
    }

    let name = if ctx.ask("Do you want to update the customer's name?")? {
        read_text(ctx, "name", MAX_CUSTOMER_NAME_LENGTH, &customer.name, validate_name)?
    } else {
        customer.name.clone()
    };

    // `exit` here still saves the new name before the session commits.
    let answer = ctx
        .console
        .read_outcome("Do you want to update the customer's city? (y/n) ")?;
    let wants_city = match answer {
        ReadOutcome::CommitExit => {
            save_changes(ctx, customer, &name, &customer.city)?;
            return Err(Termination::CommitExit.into());
        }
        other => parse_answer(&other.into_line()?),
    };
    let city = if wants_city {
        read_text(ctx, "city", MAX_CUSTOMER_CITY_LENGTH, &customer.city, validate_city)?
    } else {
        customer.city.clone()
    };

    save_changes(ctx, customer, &name, &city)
}

fn read_text(
    ctx: &mut ShellContext<'_>,
    field: &str,
    max: usize,
    previous: &str,
    check: fn(&str) -> Result<(), DomainError>,
) -> Flow<String> {
    ctx.acquire(
        &format!(
            "Please enter the customer's new {field} (1 to {max} characters, \"{STOP_KEYWORD}\" keeps \"{previous}\"): "
        ),
        |input| bounded_text(input, previous, check),
        |value| value.clone(),
    )
}

fn save_changes(
    ctx: &mut ShellContext<'_>,
    customer: &Customer,
    name: &str,
    city: &str,
) -> Flow<()> {
    if name == customer.name && city == customer.city {
        return Ok(());
    }
    let id = customer.id;
    let saved = ctx.write_with_retry("update the customer", |store| {
        store.update_customer(id, name, city)
    })?;
    if saved {
        ctx.console.success("Customer information updated.")?;
        ctx.console.say(report::customer_card(&Customer::new(id, name, city)))?;
    }
    Ok(())
}
