//! Input handling for the interactive `pick` loop

/// One line of user input at the pick prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickCommand {
    /// Empty line: analyse the first listed log
    First,
    /// 1-based position in the listing
    Index(usize),
    Refresh,
    Quit,
    Invalid(String),
}

impl PickCommand {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input {
            "" => PickCommand::First,
            "r" | "R" => PickCommand::Refresh,
            "q" | "Q" => PickCommand::Quit,
            _ => match input.parse::<usize>() {
                Ok(n) if n > 0 => PickCommand::Index(n),
                _ => PickCommand::Invalid(input.to_string()),
            },
        }
    }
}
