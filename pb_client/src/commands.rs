use private_blackjack::Usd;
use std::fmt;

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Bet amount is not a whole number.
    InvalidBetAmount(String),
    /// `create` or `join` without a room name.
    MissingRoomName(&'static str),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBetAmount(value) => write!(
                f,
                "Invalid bet '{}'. Enter a whole amount (e.g., '25') or 'quit'",
                value
            ),
            Self::MissingRoomName(command) => {
                write!(f, "'{}' requires a room name (e.g., '{} lucky')", command, command)
            }
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Commands accepted while in the lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyCommand {
    List,
    Create(String),
    Join(String),
    /// A bare room name. Joins the room if the last listing showed it,
    /// otherwise creates it first.
    Enter(String),
    Help,
    Quit,
}

/// Commands accepted while a bet is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetCommand {
    Bet(Usd),
    Quit,
}

/// Commands accepted on the player's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnCommand {
    Hit,
    Stand,
    Quit,
}

pub const LOBBY_HELP: &str = "\
Lobby commands:
  list           Show rooms that still have free seats
  create NAME    Create a room (1-8 characters) and take a seat in it
  join NAME      Take a seat in a room
  NAME           Join NAME if it was listed, otherwise create it
  quit           Disconnect
";

/// Parse a lobby command.
///
/// # Examples
///
/// ```
/// use pb_client::commands::{LobbyCommand, parse_lobby_command};
///
/// assert_eq!(parse_lobby_command("list"), Ok(LobbyCommand::List));
/// assert_eq!(
///     parse_lobby_command("join lucky"),
///     Ok(LobbyCommand::Join("lucky".to_string()))
/// );
/// ```
pub fn parse_lobby_command(input: &str) -> Result<LobbyCommand, ParseError> {
    let parts: Vec<&str> = input.split_ascii_whitespace().collect();
    match parts.as_slice() {
        ["list" | "l"] => Ok(LobbyCommand::List),
        ["help" | "h" | "?"] => Ok(LobbyCommand::Help),
        ["quit" | "q" | "exit"] => Ok(LobbyCommand::Quit),
        ["create" | "c", name] => Ok(LobbyCommand::Create(name.to_string())),
        ["join" | "j", name] => Ok(LobbyCommand::Join(name.to_string())),
        ["create" | "c"] => Err(ParseError::MissingRoomName("create")),
        ["join" | "j"] => Err(ParseError::MissingRoomName("join")),
        [name] => Ok(LobbyCommand::Enter(name.to_string())),
        _ => Err(ParseError::UnrecognizedCommand(input.trim().to_string())),
    }
}

/// Parse a bet. Non-positive amounts parse fine; the server rejects them.
pub fn parse_bet_command(input: &str) -> Result<BetCommand, ParseError> {
    let trimmed = input.trim();
    match trimmed {
        "quit" | "q" | "exit" => Ok(BetCommand::Quit),
        _ => trimmed
            .parse::<Usd>()
            .map(BetCommand::Bet)
            .map_err(|_| ParseError::InvalidBetAmount(trimmed.to_string())),
    }
}

pub fn parse_turn_command(input: &str) -> Result<TurnCommand, ParseError> {
    match input.trim() {
        "hit" | "h" => Ok(TurnCommand::Hit),
        "stand" | "s" => Ok(TurnCommand::Stand),
        "quit" | "q" | "exit" => Ok(TurnCommand::Quit),
        other => Err(ParseError::UnrecognizedCommand(other.to_string())),
    }
}
