//! Client-side view of the game assembled from server lines.

use shared::{PlayerPosition, Position, ServerLine, Snapshot};

/// Something noteworthy that a received line told us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Prompted,
    Rejected(String),
    Joined(String),
    Left(String),
    TreasureFound(String),
    NoTreasure,
    InvalidCommand,
    SnapshotUpdated,
}

#[derive(Debug, Default)]
pub struct ClientView {
    name: Option<String>,
    latest: Option<Snapshot>,
    pending: Option<Snapshot>,
    treasures_found: Vec<String>,
}

impl ClientView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the name we answered the welcome prompt with.
    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.trim().to_string());
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn awaiting_name(&self) -> bool {
        self.name.is_none()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.latest.as_ref()
    }

    pub fn own_position(&self) -> Option<Position> {
        let name = self.name.as_deref()?;
        self.latest.as_ref()?.position_of(name)
    }

    /// Everyone who has announced a find, oldest first.
    pub fn treasures_found(&self) -> &[String] {
        &self.treasures_found
    }

    /// Feeds one received line into the view.
    pub fn apply(&mut self, line: &str) -> Option<ViewEvent> {
        match ServerLine::parse(line) {
            ServerLine::Welcome => Some(ViewEvent::Prompted),
            ServerLine::NameTaken(name) => Some(ViewEvent::Rejected(format!(
                "name {:?} is already taken",
                name
            ))),
            ServerLine::InvalidName => Some(ViewEvent::Rejected("empty name".to_string())),
            ServerLine::Joined(name) => Some(ViewEvent::Joined(name)),
            ServerLine::Left(name) => Some(ViewEvent::Left(name)),
            ServerLine::TreasureFound(name) => {
                self.treasures_found.push(name.clone());
                Some(ViewEvent::TreasureFound(name))
            }
            ServerLine::NoTreasure => Some(ViewEvent::NoTreasure),
            ServerLine::InvalidCommand => Some(ViewEvent::InvalidCommand),
            ServerLine::ActivePlayers(count) => {
                self.pending = Some(Snapshot {
                    players: Vec::with_capacity(count),
                    treasures_remaining: 0,
                });
                None
            }
            ServerLine::PlayerAt { name, position } => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.players.push(PlayerPosition { name, position });
                }
                None
            }
            ServerLine::TreasuresRemaining(remaining) => {
                let mut snapshot = self.pending.take()?;
                snapshot.treasures_remaining = remaining;
                self.latest = Some(snapshot);
                Some(ViewEvent::SnapshotUpdated)
            }
            ServerLine::Other(_) => None,
        }
    }
}
