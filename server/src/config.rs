//! Startup configuration for the server core.

use crate::error::ServerError;
use crate::grid::GridState;
use crate::world::WorldState;
use rand::Rng;
use shared::Position;

/// Treasure list used when nothing else is configured.
pub const DEFAULT_TREASURES: [Position; 3] = [
    Position::new(2, 2),
    Position::new(5, 7),
    Position::new(9, 3),
];

pub const DEFAULT_OUTBOX_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreasurePlacement {
    /// Exactly these cells; entries outside the grid are ignored.
    Fixed(Vec<Position>),
    /// One treasure on a uniformly random cell.
    Random,
}

impl TreasurePlacement {
    pub fn positions<R: Rng + ?Sized>(&self, grid: GridState, rng: &mut R) -> Vec<Position> {
        match self {
            TreasurePlacement::Fixed(positions) => positions
                .iter()
                .copied()
                .filter(|p| grid.contains(*p))
                .collect(),
            TreasurePlacement::Random => vec![grid.random_cell(rng)],
        }
    }
}

impl Default for TreasurePlacement {
    fn default() -> Self {
        TreasurePlacement::Fixed(DEFAULT_TREASURES.to_vec())
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub grid_size: i32,
    pub treasures: TreasurePlacement,
    pub outbox_capacity: usize,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.grid_size < 1 {
            return Err(ServerError::InvalidConfig(format!(
                "grid size must be at least 1, got {}",
                self.grid_size
            )));
        }
        if self.outbox_capacity == 0 {
            return Err(ServerError::InvalidConfig(
                "outbox capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the initial world, placing treasure before any player exists.
    pub fn build_world<R: Rng + ?Sized>(&self, rng: &mut R) -> WorldState {
        let grid = GridState::new(self.grid_size);
        WorldState::new(grid, self.treasures.positions(grid, rng))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("{}:{}", shared::DEFAULT_HOST, shared::DEFAULT_PORT),
            grid_size: shared::GRID_SIZE,
            treasures: TreasurePlacement::default(),
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
        }
    }
}
