//! Heuristic board evaluation.
//!
//! Every term works on base-2 logarithms of tile values, so a 2 counts as 1,
//! a 4 as 2, and so on. The score combines four terms:
//!
//! - **smoothness**: penalty for value jumps between a tile and the next tile
//!   to its right and below it
//! - **monotonicity**: penalty for rows/columns that are not ordered
//! - **empty cells**: natural log of the number of free cells
//! - **max value**: log2 of the largest tile
//!
//! Higher is better.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::geometry::{Direction, Position, SIZE};
use crate::grid::{Grid, Tile};

/// Weights of the four evaluation terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorWeights {
    pub smoothness_weight: f64,
    pub monotonicity_weight: f64,
    pub empty_weight: f64,
    pub max_weight: f64,
}

impl Default for EvaluatorWeights {
    fn default() -> Self {
        Self {
            smoothness_weight: 0.1,
            monotonicity_weight: 1.0,
            empty_weight: 2.7,
            max_weight: 1.0,
        }
    }
}

impl EvaluatorWeights {
    /// Every weight must be finite and non-negative. Full boards only rank
    /// last under non-negative weights.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("smoothness_weight", self.smoothness_weight),
            ("monotonicity_weight", self.monotonicity_weight),
            ("empty_weight", self.empty_weight),
            ("max_weight", self.max_weight),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
            }
            if value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must not be negative, got {value}")));
            }
        }
        Ok(())
    }
}

/// The unweighted evaluation terms of a board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub smoothness: f64,
    /// Column (top to bottom) contribution.
    pub monotonicity_columns: f64,
    /// Row (left to right) contribution.
    pub monotonicity_rows: f64,
    /// `ln(empty cells)`, or `f64::MIN` on a full board.
    pub empty_cells: f64,
    pub max_value: f64,
}

impl ScoreBreakdown {
    pub fn monotonicity(&self) -> f64 {
        self.monotonicity_columns + self.monotonicity_rows
    }
}

/// Scores boards with a fixed set of weights.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Evaluator {
    weights: EvaluatorWeights,
}

impl Evaluator {
    pub fn new(weights: EvaluatorWeights) -> Self {
        Evaluator { weights }
    }

    pub fn weights(&self) -> &EvaluatorWeights {
        &self.weights
    }

    /// Weighted sum of all terms.
    ///
    /// A full board drives the empty-cell term to `f64::MIN`; the result
    /// stays finite so full boards still compare below everything else.
    pub fn score(&self, grid: &Grid) -> f64 {
        let b = self.breakdown(grid);
        let w = &self.weights;
        let empty = (w.empty_weight * b.empty_cells).clamp(f64::MIN, f64::MAX);
        b.smoothness * w.smoothness_weight
            + b.monotonicity() * w.monotonicity_weight
            + empty
            + b.max_value * w.max_weight
    }

    pub fn breakdown(&self, grid: &Grid) -> ScoreBreakdown {
        let (monotonicity_columns, monotonicity_rows) = monotonicity_axes(grid);
        ScoreBreakdown {
            smoothness: smoothness(grid),
            monotonicity_columns,
            monotonicity_rows,
            empty_cells: empty_cells(grid),
            max_value: max_value(grid),
        }
    }
}

#[inline]
fn log2_value(tile: &Tile) -> f64 {
    (tile.value as f64).log2()
}

/// Sum of `-|log2(a) - log2(b)|` over every tile and the first tile found to
/// its right and below it. Always `<= 0`.
pub fn smoothness(grid: &Grid) -> f64 {
    let mut total = 0.0;
    for tile in grid.tiles() {
        let value = log2_value(tile);
        for direction in [Direction::Right, Direction::Down] {
            let next = grid.find_farthest_position(tile.position, direction.vector()).next;
            if let Some(target) = grid.cell(next) {
                total -= (value - log2_value(target)).abs();
            }
        }
    }
    total
}

/// Column and row monotonicity contributions, each `<= 0`.
pub fn monotonicity_axes(grid: &Grid) -> (f64, f64) {
    let line = |at: &dyn Fn(i32) -> Position| -> [Option<f64>; SIZE] {
        let mut out = [None; SIZE];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = grid.cell(at(i as i32)).map(log2_value);
        }
        out
    };

    let mut columns = (0.0, 0.0);
    let mut rows = (0.0, 0.0);
    for k in 0..SIZE as i32 {
        let (dec, inc) = line_monotonicity(&line(&|y: i32| Position::new(k, y)));
        columns.0 += dec;
        columns.1 += inc;
        let (dec, inc) = line_monotonicity(&line(&|x: i32| Position::new(x, k)));
        rows.0 += dec;
        rows.1 += inc;
    }
    // Both sums are <= 0; keep the larger magnitude.
    (f64::min(columns.0, columns.1), f64::min(rows.0, rows.1))
}

/// Sum of both monotonicity contributions.
pub fn monotonicity(grid: &Grid) -> f64 {
    let (columns, rows) = monotonicity_axes(grid);
    columns + rows
}

/// Decreasing and increasing step totals along one line, both `<= 0`.
///
/// Only occupied cells take part; each tile is compared with the next
/// occupied one.
fn line_monotonicity(line: &[Option<f64>; SIZE]) -> (f64, f64) {
    let mut decreasing = 0.0;
    let mut increasing = 0.0;
    let mut previous: Option<f64> = None;
    for value in line.iter().flatten().copied() {
        if let Some(current) = previous {
            if current > value {
                decreasing += value - current;
            } else if value > current {
                increasing += current - value;
            }
        }
        previous = Some(value);
    }
    (decreasing, increasing)
}

/// `ln(empty cells)`; `f64::MIN` when the board is full.
pub fn empty_cells(grid: &Grid) -> f64 {
    match grid.empty_count() {
        0 => f64::MIN,
        n => (n as f64).ln(),
    }
}

/// `log2` of the largest tile, 0 on an empty board.
pub fn max_value(grid: &Grid) -> f64 {
    match grid.max_value() {
        0 => 0.0,
        v => (v as f64).log2(),
    }
}
