//! Authoritative world state: connected players and remaining treasure.
//!
//! The world is the only state shared between connection tasks. It is always
//! accessed through a [`SharedWorld`] lock, and every operation that mutates
//! it also fans out the resulting messages before the lock is released, so
//! the sequence of broadcasts follows the sequence of mutations exactly.

use crate::error::RegisterError;
use crate::grid::GridState;
use crate::outbox::Outbox;
use log::info;
use shared::{PlayerPosition, Position, Snapshot};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

pub type SharedWorld = Arc<Mutex<WorldState>>;

/// A registered player and the queue feeding its connection.
#[derive(Debug)]
pub struct Player {
    pub name: String,
    pub position: Position,
    outbox: Outbox,
}

impl Player {
    fn new(name: String, outbox: Outbox) -> Self {
        Self {
            name,
            position: Position::default(),
            outbox,
        }
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigOutcome {
    Found,
    Absent,
}

#[derive(Debug)]
pub struct WorldState {
    grid: GridState,
    /// Keyed by name; ordered so snapshots are deterministic.
    players: BTreeMap<String, Player>,
    treasures: HashSet<Position>,
}

impl WorldState {
    /// Creates an empty world. Treasures outside the grid are discarded.
    pub fn new(grid: GridState, treasures: impl IntoIterator<Item = Position>) -> Self {
        let treasures = treasures
            .into_iter()
            .filter(|t| grid.contains(*t))
            .collect();
        Self {
            grid,
            players: BTreeMap::new(),
            treasures,
        }
    }

    pub fn into_shared(self) -> SharedWorld {
        Arc::new(Mutex::new(self))
    }

    pub fn grid(&self) -> GridState {
        self.grid
    }

    /// Adds a player at the origin. Names are trimmed first.
    pub fn register(&mut self, name: &str, outbox: Outbox) -> Result<Position, RegisterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegisterError::InvalidName);
        }
        if self.players.contains_key(name) {
            return Err(RegisterError::NameConflict(name.to_string()));
        }

        let player = Player::new(name.to_string(), outbox);
        let position = player.position;
        info!("Added player {} at {}", name, position);
        self.players.insert(name.to_string(), player);
        Ok(position)
    }

    /// Removes a player. Removing an absent name is a no-op.
    pub fn unregister(&mut self, name: &str) -> Option<Player> {
        let removed = self.players.remove(name);
        if removed.is_some() {
            info!("Removed player {}", name);
        }
        removed
    }

    /// Moves a player by a delta, clamped to the grid.
    ///
    /// Returns the new position, or `None` if no such player is registered.
    pub fn move_player(&mut self, name: &str, dx: i32, dy: i32) -> Option<Position> {
        let grid = self.grid;
        let player = self.players.get_mut(name)?;
        player.position = grid.step(player.position, dx, dy);
        Some(player.position)
    }

    /// Digs at the player's position, removing the treasure there if any.
    pub fn dig(&mut self, name: &str) -> DigOutcome {
        let Some(position) = self.position_of(name) else {
            return DigOutcome::Absent;
        };
        if self.treasures.remove(&position) {
            info!("{} dug up the treasure at {}", name, position);
            DigOutcome::Found
        } else {
            DigOutcome::Absent
        }
    }

    pub fn position_of(&self, name: &str) -> Option<Position> {
        self.players.get(name).map(|p| p.position)
    }

    pub fn contains_player(&self, name: &str) -> bool {
        self.players.contains_key(name)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn treasures_remaining(&self) -> usize {
        self.treasures.len()
    }

    pub fn has_treasure_at(&self, position: Position) -> bool {
        self.treasures.contains(&position)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            players: self
                .players
                .values()
                .map(|p| PlayerPosition {
                    name: p.name.clone(),
                    position: p.position,
                })
                .collect(),
            treasures_remaining: self.treasures.len(),
        }
    }

    pub fn outbox_of(&self, name: &str) -> Option<&Outbox> {
        self.players.get(name).map(Player::outbox)
    }

    pub fn outboxes(&self) -> impl Iterator<Item = &Outbox> {
        self.players.values().map(Player::outbox)
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new(GridState::default(), std::iter::empty())
    }
}
