/***************************************/
/*        3rd party libraries          */
/***************************************/
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::Call;

/// A line typed at the operator console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Call(Call),
    Status,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (expected inside, up, down, status or quit)")]
    UnknownCommand(String),
    #[error("'{0}' needs a floor number")]
    MissingFloor(String),
    #[error("'{0}' is not a floor number")]
    InvalidFloor(String),
    #[error("unexpected argument '{0}'")]
    TrailingArgument(String),
}

/// Parses one console line, e.g. `inside 2`, `up 0`, `down 3`, `status` or `quit`.
pub fn parse_command(line: &str) -> Result<ConsoleCommand, ConsoleError> {
    let mut words = line.split_whitespace();
    let name = words.next().ok_or(ConsoleError::Empty)?.to_lowercase();

    let command = match name.as_str() {
        "status" | "s" => ConsoleCommand::Status,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        "inside" | "cab" | "i" => ConsoleCommand::Call(Call::Inside(parse_floor(&name, words.next())?)),
        "up" | "u" => ConsoleCommand::Call(Call::Up(parse_floor(&name, words.next())?)),
        "down" | "d" => ConsoleCommand::Call(Call::Down(parse_floor(&name, words.next())?)),
        _ => return Err(ConsoleError::UnknownCommand(name)),
    };

    match words.next() {
        Some(extra) => Err(ConsoleError::TrailingArgument(extra.to_string())),
        None => Ok(command),
    }
}

fn parse_floor(name: &str, word: Option<&str>) -> Result<usize, ConsoleError> {
    let word = word.ok_or_else(|| ConsoleError::MissingFloor(name.to_string()))?;
    word.parse::<usize>()
        .map_err(|_| ConsoleError::InvalidFloor(word.to_string()))
}

/***************************************/
/*             Unit tests              */
/***************************************/
