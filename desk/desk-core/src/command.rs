//! Command grammar.
//!
//! Two shapes are accepted, case-insensitively:
//!
//! ```text
//! open|close <name>
//! move|put <object> on|onto|up|upon|to|in|into <target>
//! ```
//!
//! An `action type <N>:` prefix and a trailing period are stripped first.
//! Anything else is [`Rejection::Malformed`].

use desk_types::Rejection;

/// Normalized relation word of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preposition {
    /// `on`, `onto`, `up`, `upon`, `to`.
    On,
    /// `in`, `into`.
    In,
}

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open or close a lidded box or drawer.
    Toggle {
        /// `true` for `open`.
        open: bool,
        /// Name as written.
        name: String,
    },
    /// Pick an object up and place it relative to a target.
    Move {
        /// Source name as written.
        object: String,
        /// Relation word.
        preposition: Preposition,
        /// Target name as written.
        target: String,
    },
}

/// Strip an `action type <N>:` prefix.
fn strip_action_prefix(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("action type") else {
        return text;
    };
    let rest = rest.trim_start();
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return text;
    }
    rest[digits..]
        .trim_start()
        .strip_prefix(':')
        .map_or(text, str::trim_start)
}

/// Parse command text.
///
/// # Errors
///
/// Returns [`Rejection::Malformed`] if the text matches neither shape.
///
/// # Example
///
/// ```
/// use desk_core::{parse_command, Command, Preposition};
///
/// let cmd = parse_command("Action type 2: Move red_mug into red_box.").unwrap();
/// assert_eq!(
///     cmd,
///     Command::Move {
///         object: "red_mug".into(),
///         preposition: Preposition::In,
///         target: "red_box".into(),
///     }
/// );
/// assert!(parse_command("dance").is_err());
/// ```
pub fn parse_command(text: &str) -> Result<Command, Rejection> {
    let lowered = text.trim().to_lowercase();
    let body = strip_action_prefix(&lowered);
    let body = body.strip_suffix('.').unwrap_or(body).trim();
    let words: Vec<&str> = body.split_whitespace().collect();

    let malformed = || Rejection::Malformed(text.trim().to_owned());
    match words.as_slice() {
        [verb @ ("open" | "close"), name] => Ok(Command::Toggle {
            open: *verb == "open",
            name: (*name).to_owned(),
        }),
        ["move" | "put", object, prep, target] => {
            let preposition = match *prep {
                "on" | "onto" | "up" | "upon" | "to" => Preposition::On,
                "in" | "into" => Preposition::In,
                _ => return Err(malformed()),
            };
            Ok(Command::Move {
                object: (*object).to_owned(),
                preposition,
                target: (*target).to_owned(),
            })
        }
        _ => Err(malformed()),
    }
}
