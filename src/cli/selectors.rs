//! Option lists and the ordinal-versus-text resolution algorithm.
//!
//! An [`OptionList`] numbers its candidates `1..=N` in insertion order. Free
//! form input may name a candidate by that ordinal or by its exact display
//! text, and the two readings can disagree: a category literally called `"1"`
//! collides with ordinal 1, and two books can share a title. [`OptionList::resolve`]
//! decides which reading applies and, when it cannot, describes the
//! renumbered sub-menu the user has to pick from.

use strsim::levenshtein;

use crate::domain::Book;

/// Largest edit distance for which a "did you mean" hint is offered.
const SUGGESTION_DISTANCE: usize = 2;

/// Something that can be offered in an option list.
pub trait Candidate {
    /// Text compared verbatim against user input.
    fn display_text(&self) -> &str;

    fn matches_text(&self, input: &str) -> bool {
        self.display_text() == input
    }
}

impl Candidate for String {
    fn display_text(&self) -> &str {
        self
    }
}

impl Candidate for Book {
    fn display_text(&self) -> &str {
        &self.title
    }
}

/// Candidates keyed by dense 1-based ordinals.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionList<T> {
    items: Vec<T>,
}

/// Input that names no candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidChoice {
    /// Parsed as a number outside `[1, max]`.
    OutOfRange { input: String, max: usize },
    /// Neither a number nor the text of any candidate.
    UnknownText { input: String },
}

impl InvalidChoice {
    pub fn input(&self) -> &str {
        match self {
            InvalidChoice::OutOfRange { input, .. } | InvalidChoice::UnknownText { input } => input,
        }
    }
}

/// Why a sub-menu is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubMenuReason {
    /// The input is ordinal `ordinal` and also the text of another candidate.
    OrdinalTextCollision { ordinal: usize },
    /// The input is the text of several candidates.
    DuplicateText,
}

/// A renumbered menu over a subset of an option list.
///
/// Entry `i` (1-based) of the sub-menu refers to original ordinal
/// `entries[i - 1]`. For an ordinal/text collision the literal ordinal comes
/// first, followed by the text matches; for duplicate text only the matches
/// are listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubMenu {
    pub reason: SubMenuReason,
    entries: Vec<usize>,
}

impl SubMenu {
    pub fn entries(&self) -> &[usize] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs of `(sub-menu number, original ordinal)`.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, ordinal)| (idx + 1, *ordinal))
    }

    /// Maps a sub-menu answer back to an original ordinal.
    pub fn pick(&self, input: &str) -> Result<usize, InvalidChoice> {
        let invalid = || InvalidChoice::OutOfRange {
            input: input.to_string(),
            max: self.entries.len(),
        };
        let number = input.parse::<i64>().map_err(|_| invalid())?;
        if number < 1 {
            return Err(invalid());
        }
        usize::try_from(number)
            .ok()
            .and_then(|n| self.entries.get(n - 1).copied())
            .ok_or_else(invalid)
    }
}

/// What a single line of input resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Selected(usize),
    SubMenu(SubMenu),
    Invalid(InvalidChoice),
    /// The list has no candidates at all.
    Empty,
}

impl<T> OptionList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, ordinal: usize) -> Option<&T> {
        ordinal.checked_sub(1).and_then(|idx| self.items.get(idx))
    }

    /// The lone candidate of a single-entry list.
    pub fn only_choice(&self) -> Option<&T> {
        match self.items.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Pairs of `(ordinal, candidate)` in display order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.items.iter().enumerate().map(|(idx, item)| (idx + 1, item))
    }

    /// Removes and returns the candidate at `ordinal`, consuming the list.
    pub fn into_item(mut self, ordinal: usize) -> Option<T> {
        let idx = ordinal.checked_sub(1)?;
        (idx < self.items.len()).then(|| self.items.swap_remove(idx))
    }
}

impl<T: Candidate> OptionList<T> {
    /// Ordinals of candidates whose text equals `input` verbatim.
    pub fn text_matches(&self, input: &str) -> Vec<usize> {
        self.iter()
            .filter(|(_, item)| item.matches_text(input))
            .map(|(ordinal, _)| ordinal)
            .collect()
    }

    pub fn resolve(&self, input: &str) -> Resolution {
        if self.is_empty() {
            return Resolution::Empty;
        }
        let matches = self.text_matches(input);
        let parsed = input.parse::<i64>().ok();

        if let Some(ordinal) = parsed.and_then(|k| self.in_range(k)) {
            if matches.iter().all(|&m| m == ordinal) {
                return Resolution::Selected(ordinal);
            }
            let mut entries = vec![ordinal];
            entries.extend(matches.into_iter().filter(|&m| m != ordinal));
            return Resolution::SubMenu(SubMenu {
                reason: SubMenuReason::OrdinalTextCollision { ordinal },
                entries,
            });
        }

        match matches.as_slice() {
            [] => Resolution::Invalid(if parsed.is_some() {
                InvalidChoice::OutOfRange {
                    input: input.to_string(),
                    max: self.len(),
                }
            } else {
                InvalidChoice::UnknownText {
                    input: input.to_string(),
                }
            }),
            [only] => Resolution::Selected(*only),
            _ => Resolution::SubMenu(SubMenu {
                reason: SubMenuReason::DuplicateText,
                entries: matches,
            }),
        }
    }

    /// Closest candidate text to `input`, if any is within a small edit distance.
    pub fn suggest(&self, input: &str) -> Option<&str> {
        self.items
            .iter()
            .map(|item| (levenshtein(item.display_text(), input), item.display_text()))
            .filter(|(distance, _)| *distance > 0 && *distance <= SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, text)| text)
    }

    fn in_range(&self, k: i64) -> Option<usize> {
        usize::try_from(k)
            .ok()
            .filter(|ordinal| (1..=self.len()).contains(ordinal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(names: &[&str]) -> OptionList<String> {
        OptionList::new(names.iter().map(|name| name.to_string()).collect())
    }

    #[test]
    fn ordinals_are_one_based_and_dense() {
        let list = categories(&["a", "b", "c"]);
        let ordinals: Vec<usize> = list.iter().map(|(ordinal, _)| ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        assert_eq!(list.get(0), None);
        assert_eq!(list.get(3).map(String::as_str), Some("c"));
    }

    #[test]
    fn numeric_name_matching_its_own_ordinal_is_not_ambiguous() {
        let list = categories(&["1", "Fiction"]);
        assert_eq!(list.resolve("1"), Resolution::Selected(1));
    }

    #[test]
    fn out_of_range_number_falls_back_to_text() {
        let list = categories(&["Fiction", "2024"]);
        assert_eq!(list.resolve("2024"), Resolution::Selected(2));
        assert_eq!(
            list.resolve("7"),
            Resolution::Invalid(InvalidChoice::OutOfRange {
                input: "7".into(),
                max: 2
            })
        );
        assert_eq!(
            list.resolve("0"),
            Resolution::Invalid(InvalidChoice::OutOfRange {
                input: "0".into(),
                max: 2
            })
        );
    }

    #[test]
    fn text_comparison_is_verbatim() {
        let list = categories(&["Fiction", "Poetry"]);
        assert_eq!(
            list.resolve("fiction"),
            Resolution::Invalid(InvalidChoice::UnknownText {
                input: "fiction".into()
            })
        );
        assert_eq!(
            list.resolve(" 1"),
            Resolution::Invalid(InvalidChoice::UnknownText { input: " 1".into() })
        );
        assert_eq!(list.suggest("fiction"), Some("Fiction"));
        assert_eq!(list.suggest("History"), None);
    }

    #[test]
    fn collision_lists_ordinal_first_without_duplicates() {
        let list = categories(&["1", "x", "1"]);
        match list.resolve("1") {
            Resolution::SubMenu(menu) => {
                assert_eq!(
                    menu.reason,
                    SubMenuReason::OrdinalTextCollision { ordinal: 1 }
                );
                assert_eq!(menu.entries(), &[1, 3]);
            }
            other => panic!("expected sub-menu, got {other:?}"),
        }
    }

    #[test]
    fn sub_menu_pick_rejects_garbage() {
        let list = categories(&["Fiction", "1"]);
        let Resolution::SubMenu(menu) = list.resolve("1") else {
            panic!("expected sub-menu");
        };
        assert_eq!(menu.pick("1"), Ok(1));
        assert_eq!(menu.pick("2"), Ok(2));
        for bad in ["0", "3", "-1", "two", ""] {
            assert_eq!(
                menu.pick(bad),
                Err(InvalidChoice::OutOfRange {
                    input: bad.into(),
                    max: 2
                })
            );
        }
    }

    #[test]
    fn empty_list_resolves_to_empty() {
        let list: OptionList<String> = OptionList::new(Vec::new());
        assert_eq!(list.resolve("1"), Resolution::Empty);
    }

    #[test]
    fn into_item_returns_requested_candidate() {
        let list = categories(&["a", "b", "c"]);
        assert_eq!(list.clone().into_item(1).as_deref(), Some("a"));
        assert_eq!(list.clone().into_item(3).as_deref(), Some("c"));
        assert_eq!(list.into_item(4), None);
    }
}
