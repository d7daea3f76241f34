use crate::cli::io::{Console, ABORT_KEYWORD, EXIT_KEYWORD};
use crate::errors::Flow;

pub struct Banner;

impl Banner {
    pub fn render(console: &mut Console) -> Flow<()> {
        console.say(Self::text())
    }

    pub fn text() -> String {
        [
            "Welcome to the book search and purchase wizard.".to_string(),
            String::new(),
            "Whenever prompted to answer a yes/no question, enter \"y\", \"Y\", \"yes\", \"Yes\" \
             or \"YES\" to indicate a yes. Everything else is processed as a no."
                .to_string(),
            String::new(),
            format!("Enter \"{ABORT_KEYWORD}\" at any prompt to leave without committing."),
            format!("Enter \"{EXIT_KEYWORD}\" at any prompt to commit and leave."),
            String::new(),
            "Input is read line by line and is case sensitive.".to_string(),
            format!(
                "Short integers are whole numbers in the range [{}, {}].",
                i16::MIN,
                i16::MAX
            ),
            String::new(),
        ]
        .join("\n")
    }
}
