//! Move policies behind a common interface.
//!
//! [`Policy`] is the seam between whatever drives the game and the decision
//! procedure: a snapshot goes in, a direction (or nothing) comes out. The
//! greedy one-ply search is the real player; [`RandomPolicy`] and
//! [`CyclePolicy`] are baselines for comparison runs.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::geometry::Direction;
use crate::grid::Grid;
use crate::search::GreedyPolicy;
use crate::snapshot::Snapshot;

/// Chooses the next move from an observed board.
pub trait Policy {
    /// The direction to play, or `None` when no move changes the board.
    fn next_move(&mut self, snapshot: &Snapshot) -> Option<Direction>;

    fn name(&self) -> &'static str;
}

impl Policy for GreedyPolicy {
    fn next_move(&mut self, snapshot: &Snapshot) -> Option<Direction> {
        self.best_move(snapshot)
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}

/// Uniformly random legal direction.
pub struct RandomPolicy {
    rng: SmallRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        RandomPolicy {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn next_move(&mut self, snapshot: &Snapshot) -> Option<Direction> {
        let legal = Grid::build(snapshot).legal_directions();
        legal.choose(&mut self.rng).copied()
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Tries Left, Down, Right, Up in rotation and plays the first legal one.
#[derive(Debug, Default)]
pub struct CyclePolicy {
    cursor: usize,
}

impl CyclePolicy {
    const ORDER: [Direction; 4] = [
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
    ];

    pub fn new() -> Self {
        Self::default()
    }
}

impl Policy for CyclePolicy {
    fn next_move(&mut self, snapshot: &Snapshot) -> Option<Direction> {
        let grid = Grid::build(snapshot);
        for _ in 0..Self::ORDER.len() {
            let direction = Self::ORDER[self.cursor % Self::ORDER.len()];
            self.cursor += 1;
            if grid.can_move(direction) {
                return Some(direction);
            }
        }
        None
    }

    fn name(&self) -> &'static str {
        "cycle"
    }
}
