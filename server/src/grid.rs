//! Bounded square grid that every position lives on.

use rand::Rng;
use shared::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridState {
    size: i32,
}

impl GridState {
    /// Creates a `size` x `size` grid. Sizes below 1 are raised to 1.
    pub fn new(size: i32) -> Self {
        Self { size: size.max(1) }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn contains(&self, position: Position) -> bool {
        (0..self.size).contains(&position.x) && (0..self.size).contains(&position.y)
    }

    /// Applies a delta and clamps both axes into `[0, size - 1]`.
    pub fn step(&self, from: Position, dx: i32, dy: i32) -> Position {
        let max = self.size - 1;
        Position::new(
            from.x.saturating_add(dx).clamp(0, max),
            from.y.saturating_add(dy).clamp(0, max),
        )
    }

    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(rng.gen_range(0..self.size), rng.gen_range(0..self.size))
    }
}

impl Default for GridState {
    fn default() -> Self {
        Self::new(shared::GRID_SIZE)
    }
}
