//! A self-contained 2048 game with seedable tile spawns.
//!
//! The game stands in for the browser when the policy is run headless: it
//! reports its tiles through [`SnapshotSource`] just like any external
//! reader would, and accepts moves through [`Game::step`].
//!
//! ```
//! use play2048_core::{Direction, Game};
//!
//! let mut game = Game::new(42);
//! let result = game.step(Direction::Left);
//! println!("Score: {}, Changed: {}", game.score(), result.changed);
//! ```

use std::convert::Infallible;
use std::fmt;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::geometry::Direction;
use crate::grid::{Grid, Tile};
use crate::snapshot::{Snapshot, SnapshotSource};

/// Result of executing a step (move) in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the board changed (and a new tile was spawned).
    pub changed: bool,
    /// Points earned from merges in this move.
    pub reward: u32,
    /// Whether this move produced a 2048 tile.
    pub won: bool,
    /// Whether the game is over (no legal moves remaining).
    pub done: bool,
}

/// The 2048 game state.
#[derive(Clone)]
pub struct Game {
    grid: Grid,
    score: u32,
    rng: SmallRng,
    won: bool,
    done: bool,
}

impl Game {
    /// Create a new game with the given seed.
    ///
    /// The game starts with two random tiles (90% chance of 2, 10% chance of 4).
    pub fn new(seed: u64) -> Self {
        let mut game = Game {
            grid: Grid::new(),
            score: 0,
            rng: SmallRng::seed_from_u64(seed),
            won: false,
            done: false,
        };
        game.spawn_tile();
        game.spawn_tile();
        game.update_done();
        game
    }

    /// Continue from an existing board. No tiles are added.
    pub fn from_grid(grid: Grid, seed: u64) -> Self {
        let mut game = Game {
            grid,
            score: 0,
            rng: SmallRng::seed_from_u64(seed),
            won: false,
            done: false,
        };
        game.update_done();
        game
    }

    /// Reset the game to initial state with a new seed.
    pub fn reset(&mut self, seed: u64) {
        *self = Game::new(seed);
    }

    /// Execute a move in the given direction.
    ///
    /// If the move doesn't change the board, no tile is spawned.
    pub fn step(&mut self, direction: Direction) -> StepResult {
        if self.done {
            return StepResult {
                changed: false,
                reward: 0,
                won: false,
                done: true,
            };
        }

        let outcome = self.grid.move_tiles(direction);
        if outcome.moved {
            self.score += outcome.points;
            self.spawn_tile();
        }
        self.won |= outcome.won;
        self.update_done();

        StepResult {
            changed: outcome.moved,
            reward: outcome.points,
            won: outcome.won,
            done: self.done,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Check if the game is over (no legal moves available).
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Whether a 2048 tile has been made at any point.
    pub fn has_won(&self) -> bool {
        self.won
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn max_tile(&self) -> u32 {
        self.grid.max_value()
    }

    pub fn empty_count(&self) -> usize {
        self.grid.empty_count()
    }

    /// Directions that would change the board, in search order.
    pub fn legal_directions(&self) -> Vec<Direction> {
        self.grid.legal_directions()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.grid.to_snapshot()
    }

    // -------------------------------------------------------------------------
    // Private methods
    // -------------------------------------------------------------------------

    /// Spawn a new tile in a random empty cell.
    /// 90% chance of 2, 10% chance of 4.
    fn spawn_tile(&mut self) {
        let empty = self.grid.available_cells();
        let Some(&position) = empty.choose(&mut self.rng) else {
            return;
        };
        let value = if self.rng.gen::<f32>() < 0.9 { 2 } else { 4 };
        self.grid.insert_tile(Tile::new(position, value));
    }

    fn update_done(&mut self) {
        self.done = !self.grid.has_moves();
    }
}

impl SnapshotSource for Game {
    type Error = Infallible;

    fn capture(&mut self) -> Result<Snapshot, Self::Error> {
        Ok(self.snapshot())
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Game {{ score: {}, won: {}, done: {} }}",
            self.score, self.won, self.done
        )?;
        write!(f, "{:?}", self.grid)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score: {}", self.score)?;
        write!(f, "{}", self.grid)
    }
}

// =============================================================================
// Tests
// =============================================================================
