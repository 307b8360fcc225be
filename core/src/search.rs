//! One-ply greedy move selection.
//!
//! For each direction (in the order Up, Right, Down, Left) the snapshot board
//! is cloned and moved. A move that produces 2048 is taken at once; otherwise
//! the move whose resulting board scores highest wins, with ties going to the
//! earlier direction. Directions that do not change the board are never
//! chosen, so `None` means the game is stuck.
//!
//! ```
//! use play2048_core::{GreedyPolicy, Snapshot};
//!
//! let policy = GreedyPolicy::default();
//! let snapshot = Snapshot::from_triples([(2, 1, 1), (2, 1, 2)]);
//! assert!(policy.best_move(&snapshot).is_some());
//!
//! let empty = Snapshot::default();
//! assert_eq!(policy.best_move(&empty), None);
//! ```

use log::debug;

use crate::evaluator::{Evaluator, EvaluatorWeights};
use crate::geometry::Direction;
use crate::grid::{Grid, MoveOutcome};
use crate::snapshot::Snapshot;

/// Per-direction result of a one-ply look-ahead.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub direction: Direction,
    pub outcome: MoveOutcome,
    /// Evaluator score of the resulting board; `None` when the move is a no-op.
    pub score: Option<f64>,
    pub grid: Grid,
}

impl Branch {
    pub fn legal(&self) -> bool {
        self.outcome.moved
    }
}

/// Depth-1 policy over an [`Evaluator`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GreedyPolicy {
    evaluator: Evaluator,
}

impl GreedyPolicy {
    pub fn new(weights: EvaluatorWeights) -> Self {
        GreedyPolicy {
            evaluator: Evaluator::new(weights),
        }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Pick the direction to play for `snapshot`, or `None` if no move
    /// changes the board.
    pub fn best_move(&self, snapshot: &Snapshot) -> Option<Direction> {
        self.best_move_on(&Grid::build(snapshot))
    }

    /// Same as [`GreedyPolicy::best_move`] on an already-built board.
    pub fn best_move_on(&self, origin: &Grid) -> Option<Direction> {
        let mut best: Option<(Direction, f64)> = None;

        for direction in Direction::all() {
            let mut grid = origin.clone();
            let outcome = grid.move_tiles(direction);
            if outcome.won {
                debug!("{direction} reaches 2048");
                return Some(direction);
            }
            if !outcome.moved {
                debug!("{direction}: no change");
                continue;
            }
            let score = self.evaluator.score(&grid);
            debug!("{direction}: score {score:.4}");
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((direction, score)),
            }
        }

        let chosen = best.map(|(direction, _)| direction);
        debug!("chosen move: {chosen:?}");
        chosen
    }

    /// Simulate and score all four directions without short-circuiting.
    ///
    /// Returned in search order: `[Up, Right, Down, Left]`.
    pub fn branches(&self, snapshot: &Snapshot) -> [Branch; 4] {
        let origin = Grid::build(snapshot);
        Direction::all().map(|direction| {
            let mut grid = origin.clone();
            let outcome = grid.move_tiles(direction);
            let score = outcome.moved.then(|| self.evaluator.score(&grid));
            Branch {
                direction,
                outcome,
                score,
                grid,
            }
        })
    }
}
