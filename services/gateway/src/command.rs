//! Chat command parsing
//!
//! Commands look like `/name`, `/name@bot` or `/name args...`. Anything that
//! does not start with a slash is a plain message for the user's room.

use types::ids::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Search,
    Unsearch,
    Leave,
    Unknown(String),
}

impl Command {
    /// `None` means `text` is not a command at all.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim_start().strip_prefix('/')?;
        let word = rest.split_whitespace().next().unwrap_or("");
        let name = word.split('@').next().unwrap_or("");
        if name.is_empty() {
            return None;
        }

        Some(match name.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "search" => Command::Search,
            "unsearch" => Command::Unsearch,
            "leave" => Command::Leave,
            _ => Command::Unknown(name.to_string()),
        })
    }
}

/// Split a `<user_id> <text>` input line.
pub fn parse_input_line(line: &str) -> Option<(UserId, &str)> {
    let line = line.trim();
    let (id, text) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let id = id.parse::<i64>().ok()?;
    Some((UserId::new(id), text.trim_start()))
}
