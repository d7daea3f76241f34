/// Interprets a yes/no answer.
///
/// Only `y`, `Y`, `yes`, `Yes` and `YES` are affirmative; everything else,
/// including the empty string and padded variants, is a no.
pub fn parse_answer(input: &str) -> bool {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) if first.to_ascii_lowercase() == 'y' => {}
        _ => return false,
    }
    if chars.next().is_none() {
        return true;
    }
    matches!(input, "yes" | "Yes" | "YES")
}
