//! Line protocol shared by the treasure-hunt server and its clients.
//!
//! Everything on the wire is newline-delimited UTF-8 text. Clients send a
//! name line followed by command lines; the server answers with the lines
//! rendered by [`ServerMessage`]. [`ServerLine::parse`] classifies received
//! lines so clients (and tests) don't have to match raw text.

use std::fmt;
use std::str::FromStr;

pub const GRID_SIZE: i32 = 10;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 12345;
/// Longest accepted inbound line in bytes, terminator included.
pub const MAX_LINE_LEN: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Commands a registered player may send, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    Dig,
}

impl Command {
    /// Unit delta for movement commands, `None` for `Dig`.
    pub fn delta(self) -> Option<(i32, i32)> {
        match self {
            Command::Up => Some((0, -1)),
            Command::Down => Some((0, 1)),
            Command::Left => Some((-1, 0)),
            Command::Right => Some((1, 0)),
            Command::Dig => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command: {0:?}")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UP" => Ok(Command::Up),
            "DOWN" => Ok(Command::Down),
            "LEFT" => Ok(Command::Left),
            "RIGHT" => Ok(Command::Right),
            "DIG" => Ok(Command::Dig),
            _ => Err(UnknownCommand(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerPosition {
    pub name: String,
    pub position: Position,
}

/// Point-in-time view of the world as sent to clients.
///
/// Treasure locations stay hidden; only the remaining count is published.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub players: Vec<PlayerPosition>,
    pub treasures_remaining: usize,
}

impl Snapshot {
    pub fn position_of(&self, name: &str) -> Option<Position> {
        self.players
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.position)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}{}", ACTIVE_PLAYERS, self.players.len())?;
        for player in &self.players {
            writeln!(f, "{}{}{}", player.name, IS_AT_POSITION, player.position)?;
        }
        write!(f, "{}{}", TREASURES_REMAINING, self.treasures_remaining)
    }
}

const WELCOME: &str = "Welcome! Enter your name:";
const INVALID_NAME: &str = "Name must not be empty. Goodbye.";
const NAME_TAKEN_PREFIX: &str = "Name '";
const NAME_TAKEN_SUFFIX: &str = "' is already taken. Goodbye.";
const JOINED: &str = " has joined the game!";
const LEFT: &str = " has left the game.";
const FOUND: &str = " has found the treasure!";
const NO_TREASURE: &str = "No treasure here.";
const INVALID_COMMAND: &str = "Invalid command!";
const ACTIVE_PLAYERS: &str = "Active players: ";
const IS_AT_POSITION: &str = " is at position: ";
const TREASURES_REMAINING: &str = "Treasures remaining: ";

/// Everything the server writes to a client.
///
/// `Display` produces the wire text without a trailing newline; a snapshot
/// spans several lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Welcome,
    NameTaken { name: String },
    InvalidName,
    Joined { name: String },
    Left { name: String },
    TreasureFound { name: String },
    NoTreasure,
    InvalidCommand,
    Snapshot(Snapshot),
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Welcome => f.write_str(WELCOME),
            ServerMessage::NameTaken { name } => {
                write!(f, "{}{}{}", NAME_TAKEN_PREFIX, name, NAME_TAKEN_SUFFIX)
            }
            ServerMessage::InvalidName => f.write_str(INVALID_NAME),
            ServerMessage::Joined { name } => write!(f, "{}{}", name, JOINED),
            ServerMessage::Left { name } => write!(f, "{}{}", name, LEFT),
            ServerMessage::TreasureFound { name } => write!(f, "{}{}", name, FOUND),
            ServerMessage::NoTreasure => f.write_str(NO_TREASURE),
            ServerMessage::InvalidCommand => f.write_str(INVALID_COMMAND),
            ServerMessage::Snapshot(snapshot) => snapshot.fmt(f),
        }
    }
}

/// One received server line, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine {
    Welcome,
    NameTaken(String),
    InvalidName,
    Joined(String),
    Left(String),
    TreasureFound(String),
    NoTreasure,
    InvalidCommand,
    ActivePlayers(usize),
    PlayerAt { name: String, position: Position },
    TreasuresRemaining(usize),
    Other(String),
}

impl ServerLine {
    pub fn parse(line: &str) -> ServerLine {
        let line = line.trim_end_matches(['\r', '\n']);
        match line {
            WELCOME => return ServerLine::Welcome,
            INVALID_NAME => return ServerLine::InvalidName,
            NO_TREASURE => return ServerLine::NoTreasure,
            INVALID_COMMAND => return ServerLine::InvalidCommand,
            _ => {}
        }

        if let Some(n) = line.strip_prefix(ACTIVE_PLAYERS).and_then(|n| n.parse().ok()) {
            return ServerLine::ActivePlayers(n);
        }
        if let Some(n) = line
            .strip_prefix(TREASURES_REMAINING)
            .and_then(|n| n.parse().ok())
        {
            return ServerLine::TreasuresRemaining(n);
        }
        if let Some(name) = line
            .strip_prefix(NAME_TAKEN_PREFIX)
            .and_then(|rest| rest.strip_suffix(NAME_TAKEN_SUFFIX))
        {
            return ServerLine::NameTaken(name.to_string());
        }
        if let Some((name, coords)) = line.rsplit_once(IS_AT_POSITION) {
            if let Some(position) = parse_position(coords) {
                return ServerLine::PlayerAt {
                    name: name.to_string(),
                    position,
                };
            }
        }
        if let Some(name) = line.strip_suffix(FOUND) {
            return ServerLine::TreasureFound(name.to_string());
        }
        if let Some(name) = line.strip_suffix(JOINED) {
            return ServerLine::Joined(name.to_string());
        }
        if let Some(name) = line.strip_suffix(LEFT) {
            return ServerLine::Left(name.to_string());
        }
        ServerLine::Other(line.to_string())
    }
}

fn parse_position(s: &str) -> Option<Position> {
    let inner = s.trim().strip_prefix('(')?.strip_suffix(')')?;
    let (x, y) = inner.split_once(',')?;
    Some(Position::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            players: vec![
                PlayerPosition {
                    name: "Alice".to_string(),
                    position: Position::new(2, 2),
                },
                PlayerPosition {
                    name: "Bob".to_string(),
                    position: Position::new(0, 9),
                },
            ],
            treasures_remaining: 3,
        }
    }

    #[test]
    fn test_command_parsing_is_case_insensitive() {
        assert_eq!("up".parse::<Command>(), Ok(Command::Up));
        assert_eq!("Down".parse::<Command>(), Ok(Command::Down));
        assert_eq!("  left \r".parse::<Command>(), Ok(Command::Left));
        assert_eq!("RIGHT".parse::<Command>(), Ok(Command::Right));
        assert_eq!("dIg".parse::<Command>(), Ok(Command::Dig));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            "JUMP".parse::<Command>(),
            Err(UnknownCommand("JUMP".to_string()))
        );
        assert!("".parse::<Command>().is_err());
        assert!("UP UP".parse::<Command>().is_err());
    }

    #[test]
    fn test_command_deltas() {
        assert_eq!(Command::Up.delta(), Some((0, -1)));
        assert_eq!(Command::Down.delta(), Some((0, 1)));
        assert_eq!(Command::Left.delta(), Some((-1, 0)));
        assert_eq!(Command::Right.delta(), Some((1, 0)));
        assert_eq!(Command::Dig.delta(), None);
    }

    #[test]
    fn test_snapshot_rendering() {
        let text = ServerMessage::Snapshot(snapshot()).to_string();
        assert_eq!(
            text,
            "Active players: 2\n\
             Alice is at position: (2, 2)\n\
             Bob is at position: (0, 9)\n\
             Treasures remaining: 3"
        );
    }

    #[test]
    fn test_empty_snapshot_rendering() {
        let text = Snapshot::default().to_string();
        assert_eq!(text, "Active players: 0\nTreasures remaining: 0");
    }

    #[test]
    fn test_event_rendering() {
        let name = "Alice".to_string();
        assert_eq!(ServerMessage::Welcome.to_string(), "Welcome! Enter your name:");
        assert_eq!(
            ServerMessage::Joined { name: name.clone() }.to_string(),
            "Alice has joined the game!"
        );
        assert_eq!(
            ServerMessage::Left { name: name.clone() }.to_string(),
            "Alice has left the game."
        );
        assert_eq!(
            ServerMessage::TreasureFound { name: name.clone() }.to_string(),
            "Alice has found the treasure!"
        );
        assert_eq!(
            ServerMessage::NameTaken { name }.to_string(),
            "Name 'Alice' is already taken. Goodbye."
        );
        assert_eq!(ServerMessage::NoTreasure.to_string(), "No treasure here.");
        assert_eq!(ServerMessage::InvalidCommand.to_string(), "Invalid command!");
    }

    #[test]
    fn test_parse_snapshot_lines() {
        let text = ServerMessage::Snapshot(snapshot()).to_string();
        let parsed: Vec<ServerLine> = text.lines().map(ServerLine::parse).collect();
        assert_eq!(
            parsed,
            vec![
                ServerLine::ActivePlayers(2),
                ServerLine::PlayerAt {
                    name: "Alice".to_string(),
                    position: Position::new(2, 2),
                },
                ServerLine::PlayerAt {
                    name: "Bob".to_string(),
                    position: Position::new(0, 9),
                },
                ServerLine::TreasuresRemaining(3),
            ]
        );
    }

    #[test]
    fn test_parse_event_lines() {
        assert_eq!(
            ServerLine::parse("Welcome! Enter your name:\r\n"),
            ServerLine::Welcome
        );
        assert_eq!(
            ServerLine::parse("Mary Ann has joined the game!"),
            ServerLine::Joined("Mary Ann".to_string())
        );
        assert_eq!(
            ServerLine::parse("Bob has left the game."),
            ServerLine::Left("Bob".to_string())
        );
        assert_eq!(
            ServerLine::parse("Bob has found the treasure!"),
            ServerLine::TreasureFound("Bob".to_string())
        );
        assert_eq!(
            ServerLine::parse("Name 'Bob' is already taken. Goodbye."),
            ServerLine::NameTaken("Bob".to_string())
        );
        assert_eq!(
            ServerLine::parse("Name must not be empty. Goodbye."),
            ServerLine::InvalidName
        );
        assert_eq!(ServerLine::parse("No treasure here."), ServerLine::NoTreasure);
        assert_eq!(
            ServerLine::parse("Invalid command!"),
            ServerLine::InvalidCommand
        );
    }

    #[test]
    fn test_parse_unrecognised_line() {
        assert_eq!(
            ServerLine::parse("Bob is at position: nowhere"),
            ServerLine::Other("Bob is at position: nowhere".to_string())
        );
        assert_eq!(
            ServerLine::parse("hello"),
            ServerLine::Other("hello".to_string())
        );
    }

    #[test]
    fn test_snapshot_position_lookup() {
        let snapshot = snapshot();
        assert_eq!(snapshot.position_of("Bob"), Some(Position::new(0, 9)));
        assert_eq!(snapshot.position_of("Carol"), None);
    }
}
