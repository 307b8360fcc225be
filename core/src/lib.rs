//! # play2048 core
//!
//! Game-state engine and move selection for an automated 2048 player.
//!
//! The crate turns an observed board (a [`Snapshot`] of `(value, row, col)`
//! triples) into a [`Grid`], simulates each of the four moves on independent
//! copies, scores the results with an [`Evaluator`], and picks a direction
//! with [`GreedyPolicy`]. How the snapshot is captured and how the chosen
//! move reaches the game are left to the caller; [`Game`] is an in-process
//! stand-in used for headless play.
//!
//! ## Example
//!
//! ```rust
//! use play2048_core::{Game, GreedyPolicy, Policy, SnapshotSource};
//!
//! let mut game = Game::new(42);
//! let mut policy = GreedyPolicy::default();
//!
//! for _ in 0..10 {
//!     let snapshot = game.capture().unwrap();
//!     match policy.next_move(&snapshot) {
//!         Some(direction) => {
//!             game.step(direction);
//!         }
//!         None => break,
//!     }
//! }
//! assert!(game.grid().tiles().count() >= 2);
//! ```

pub mod config;
pub mod error;
pub mod evaluator;
pub mod game;
pub mod geometry;
pub mod grid;
pub mod policy;
pub mod search;
pub mod snapshot;

pub use config::{Config, ConfigError, PlayConfig};
pub use error::{Result, SnapshotError};
pub use evaluator::{Evaluator, EvaluatorWeights, ScoreBreakdown};
pub use game::{Game, StepResult};
pub use geometry::{Direction, Position, Vector, SIZE};
pub use grid::{FarthestPosition, Grid, MergeSource, MoveOutcome, Tile, CELLS, MAX_TILE_VALUE, WIN_VALUE};
pub use policy::{CyclePolicy, Policy, RandomPolicy};
pub use search::{Branch, GreedyPolicy};
pub use snapshot::{Observation, Snapshot, SnapshotSource};
