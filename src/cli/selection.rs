//! Interactive category and book choice on top of [`OptionList`].

use crate::cli::forms::{self, Attempt};
use crate::cli::io::Console;
use crate::cli::selectors::{
    Candidate, InvalidChoice, OptionList, Resolution, SubMenu, SubMenuReason,
};
use crate::cli::shell_context::ShellContext;
use crate::cli::table::{Table, TableColumn};
use crate::domain::{Book, Displayable};
use crate::errors::Flow;

/// How a selection ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Pick<T> {
    /// Chosen from a list of two or more candidates.
    Chosen(T),
    /// The list had a single candidate which was taken.
    OnlyChoice(T),
    /// The list had a single candidate and the user turned it down.
    OnlyChoiceRejected,
    /// There was nothing to choose from.
    Empty,
}

/// A candidate that knows how to present itself in a numbered table.
pub trait Listed: Candidate {
    const NOUN: &'static str;
    const TEXT_FIELD: &'static str;

    fn columns() -> Vec<TableColumn>;
    fn cells(&self) -> Vec<String>;
    fn echo(&self) -> String;
}

impl Listed for String {
    const NOUN: &'static str = "category";
    const TEXT_FIELD: &'static str = "name";

    fn columns() -> Vec<TableColumn> {
        vec![TableColumn::left("Category Name")]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.clone()]
    }

    fn echo(&self) -> String {
        self.clone()
    }
}

impl Listed for Book {
    const NOUN: &'static str = "book";
    const TEXT_FIELD: &'static str = "title";

    fn columns() -> Vec<TableColumn> {
        vec![
            TableColumn::left("Title"),
            TableColumn::right("Year"),
            TableColumn::left("Language"),
            TableColumn::right("Weight"),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.year.to_string(),
            self.language_label().to_string(),
            self.weight.to_string(),
        ]
    }

    fn echo(&self) -> String {
        self.display_label()
    }
}

/// Renders `(number, candidate)` rows under a `Number` column.
pub fn render_rows<'a, T: Listed + 'a>(rows: impl IntoIterator<Item = (usize, &'a T)>) -> String {
    let mut columns = vec![TableColumn::right("Number")];
    columns.extend(T::columns());
    let mut table = Table::new(columns);
    for (number, item) in rows {
        let mut row = vec![number.to_string()];
        row.extend(item.cells());
        table.push_row(row);
    }
    table.render()
}

/// Picks a category, `None` when there is none. A single category is taken
/// without asking.
pub fn choose_category(ctx: &mut ShellContext<'_>, categories: Vec<String>) -> Flow<Option<String>> {
    let list = OptionList::new(categories);
    if list.is_empty() {
        return Ok(None);
    }
    if let Some(only) = list.only_choice() {
        ctx.console.info(format!(
            "There is only one category available ({only}); it has been selected."
        ))?;
        return Ok(Some(only.clone()));
    }
    ctx.console.info("The following book categories are available:")?;
    let ordinal = resolve_interactively(ctx, &list)?;
    Ok(list.into_item(ordinal))
}

/// Picks a book. With a single book the user may still turn it down.
pub fn choose_book(ctx: &mut ShellContext<'_>, books: Vec<Book>) -> Flow<Pick<Book>> {
    let list = OptionList::new(books);
    if list.is_empty() {
        return Ok(Pick::Empty);
    }
    if let Some(only) = list.only_choice() {
        ctx.console.info("There is only one book in the chosen category:")?;
        ctx.console.say(render_rows(list.iter()))?;
        if ctx.ask("Do you want to change the book choice?")? {
            return Ok(Pick::OnlyChoiceRejected);
        }
        return Ok(Pick::OnlyChoice(only.clone()));
    }
    ctx.console.info("The following books are available in the chosen category:")?;
    let ordinal = resolve_interactively(ctx, &list)?;
    Ok(list.into_item(ordinal).map_or(Pick::Empty, Pick::Chosen))
}

/// Prompts until the input names exactly one candidate of a non-empty list.
fn resolve_interactively<T: Listed>(ctx: &mut ShellContext<'_>, list: &OptionList<T>) -> Flow<usize> {
    let prompt = format!(
        "Please enter the {noun} number or {noun} {field}: ",
        noun = T::NOUN,
        field = T::TEXT_FIELD
    );
    forms::confirm_loop(
        ctx.console,
        ctx.confirm_input,
        |console| {
            console.say(render_rows(list.iter()))?;
            let line = console.next_line(&prompt)?;
            match list.resolve(&line) {
                Resolution::Selected(ordinal) => Ok(Attempt::Valid(ordinal)),
                Resolution::SubMenu(menu) => pick_from_sub_menu(console, list, &menu, &line),
                Resolution::Invalid(choice) => {
                    report_invalid(console, list, &choice)?;
                    Ok(Attempt::Retry)
                }
                Resolution::Empty => Ok(Attempt::Retry),
            }
        },
        |ordinal| list.get(*ordinal).map(T::echo).unwrap_or_default(),
    )
}

fn pick_from_sub_menu<T: Listed>(
    console: &mut Console,
    list: &OptionList<T>,
    menu: &SubMenu,
    input: &str,
) -> Flow<Attempt<usize>> {
    let explanation = match menu.reason {
        SubMenuReason::OrdinalTextCollision { ordinal } => format!(
            "'{input}' is {noun} number {ordinal} but also the {field} of another {noun}.",
            noun = T::NOUN,
            field = T::TEXT_FIELD
        ),
        SubMenuReason::DuplicateText => format!(
            "More than one {noun} has the {field} '{input}'.",
            noun = T::NOUN,
            field = T::TEXT_FIELD
        ),
    };
    console.info(explanation)?;
    let rows = menu
        .numbered()
        .filter_map(|(number, ordinal)| list.get(ordinal).map(|item| (number, item)));
    console.say(render_rows(rows))?;

    let answer = console.next_line("Please enter the number of your choice: ")?;
    match menu.pick(&answer) {
        Ok(ordinal) => Ok(Attempt::Valid(ordinal)),
        Err(_) => {
            console.error(format!(
                "'{answer}' is not a valid choice in [1, {}].",
                menu.len()
            ))?;
            console.info("Please try again.")?;
            Ok(Attempt::Retry)
        }
    }
}

fn report_invalid<T: Listed>(
    console: &mut Console,
    list: &OptionList<T>,
    choice: &InvalidChoice,
) -> Flow<()> {
    let message = match choice {
        InvalidChoice::OutOfRange { input, max } => format!(
            "'{input}' is neither a {noun} number in [1, {max}] nor a {noun} {field}.",
            noun = T::NOUN,
            field = T::TEXT_FIELD
        ),
        InvalidChoice::UnknownText { input } => format!(
            "'{input}' is neither a {noun} number nor a {noun} {field}.",
            noun = T::NOUN,
            field = T::TEXT_FIELD
        ),
    };
    console.error(message)?;
    if let Some(suggestion) = list.suggest(choice.input()) {
        console.info(format!("Did you mean '{suggestion}'?"))?;
    }
    console.info("Please try again.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_menu_rows_are_renumbered() {
        let list = OptionList::new(vec![
            Book::new("Alpha", 1990, None, "science", 100),
            Book::new("Beta", 1991, None, "science", 100),
            Book::new("Alpha", 1995, None, "science", 100),
        ]);
        let Resolution::SubMenu(menu) = list.resolve("Alpha") else {
            panic!("expected sub-menu");
        };
        let rows = menu
            .numbered()
            .filter_map(|(number, ordinal)| list.get(ordinal).map(|item| (number, item)));
        let rendered = render_rows(rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].trim_start().starts_with("1 | Alpha"));
        assert!(lines[2].contains("1990"));
        assert!(lines[3].trim_start().starts_with("2 | Alpha"));
        assert!(lines[3].contains("1995"));
        assert!(lines[3].contains("Unknown"));
    }
}
