//! The 4x4 board and the slide/merge simulation.
//!
//! The grid is a flat array of 16 optional tiles stored in row-major order
//! (indices 0-3 are the top row, 4-7 the second row, etc.). Every tile is
//! plain data, so `Clone` is a full independent copy of the board.

use std::fmt;

use log::{trace, warn};

use crate::geometry::{traversal_order, Direction, Position, Vector, SIZE};
use crate::snapshot::{Observation, Snapshot};

/// Number of cells on the board.
pub const CELLS: usize = SIZE * SIZE;

/// Producing a tile of this value wins the game.
pub const WIN_VALUE: u32 = 2048;

/// Largest tile a 4x4 board can hold (2^17, reached with 4-spawns only).
pub const MAX_TILE_VALUE: u32 = 1 << 17;

/// Value copy of a tile that took part in a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeSource {
    pub position: Position,
    pub value: u32,
}

/// A numbered piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub position: Position,
    pub value: u32,
    /// Set only on tiles created by the move currently being simulated.
    pub merged_from: Option<[MergeSource; 2]>,
}

impl Tile {
    pub fn new(position: Position, value: u32) -> Self {
        Tile {
            position,
            value,
            merged_from: None,
        }
    }

    fn source(&self) -> MergeSource {
        MergeSource {
            position: self.position,
            value: self.value,
        }
    }
}

/// Result of [`Grid::find_farthest_position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarthestPosition {
    /// Last empty in-bounds cell reached (the origin if none).
    pub farthest: Position,
    /// First cell past `farthest`: occupied or off the board.
    pub next: Position,
}

/// Result of simulating a single move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// Whether any tile slid or merged.
    pub moved: bool,
    /// Whether a merge produced a [`WIN_VALUE`] tile.
    pub won: bool,
    /// Sum of the values of all tiles created by merges.
    pub points: u32,
}

/// The 2048 board.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Grid {
    cells: [Option<Tile>; CELLS],
}

impl Grid {
    /// An empty board.
    pub fn new() -> Self {
        Grid {
            cells: [None; CELLS],
        }
    }

    /// Build a board from observed tiles.
    ///
    /// When several observations name the same cell the largest value wins.
    /// Observations that do not name a board cell or carry an impossible tile
    /// value are skipped.
    pub fn build(snapshot: &Snapshot) -> Self {
        let mut grid = Grid::new();
        for observation in snapshot {
            grid.observe(observation);
        }
        grid
    }

    fn observe(&mut self, observation: &Observation) {
        if let Err(err) = observation.validate() {
            warn!("skipping observation {observation:?}: {err}");
            return;
        }
        let position = observation.position();
        match self.cell(position) {
            Some(existing) if existing.value >= observation.value => {}
            _ => self.insert_tile(Tile::new(position, observation.value)),
        }
    }

    /// Build a board from 16 row-major values, 0 meaning empty.
    /// Values that are not valid tiles are treated as empty.
    pub fn from_values(values: [u32; CELLS]) -> Self {
        let mut grid = Grid::new();
        for (idx, &value) in values.iter().enumerate() {
            if (2..=MAX_TILE_VALUE).contains(&value) && value.is_power_of_two() {
                grid.insert_tile(Tile::new(Position::from_index(idx), value));
            }
        }
        grid
    }

    /// Row-major tile values, 0 for empty cells.
    pub fn values(&self) -> [u32; CELLS] {
        let mut out = [0; CELLS];
        for (slot, cell) in out.iter_mut().zip(self.cells.iter()) {
            *slot = cell.map_or(0, |t| t.value);
        }
        out
    }

    /// Convert back into the observation format (1-indexed rows and columns).
    pub fn to_snapshot(&self) -> Snapshot {
        self.tiles()
            .map(|t| Observation::new(t.value, t.position.y as u32 + 1, t.position.x as u32 + 1))
            .collect()
    }

    /// The tile at `position`, or `None` when empty or off the board.
    #[inline]
    pub fn cell(&self, position: Position) -> Option<&Tile> {
        position.index().and_then(|idx| self.cells[idx].as_ref())
    }

    #[inline]
    pub fn is_available(&self, position: Position) -> bool {
        position.in_bounds() && self.cell(position).is_none()
    }

    /// Occupied cells in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.cells.iter().flatten()
    }

    /// Empty positions in row-major order.
    pub fn available_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(idx, _)| Position::from_index(idx))
            .collect()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Highest tile value on the board, 0 when empty.
    pub fn max_value(&self) -> u32 {
        self.tiles().map(|t| t.value).max().unwrap_or(0)
    }

    /// Place `tile` at its own position, replacing whatever was there.
    pub(crate) fn insert_tile(&mut self, tile: Tile) {
        debug_assert!(tile.position.in_bounds(), "tile off the board: {}", tile.position);
        if let Some(idx) = tile.position.index() {
            self.cells[idx] = Some(tile);
        }
    }

    pub(crate) fn remove_tile(&mut self, position: Position) -> Option<Tile> {
        position.index().and_then(|idx| self.cells[idx].take())
    }

    /// Whether some move would change the board: an empty cell exists or two
    /// equal tiles touch horizontally or vertically.
    pub fn has_moves(&self) -> bool {
        self.empty_count() > 0 || self.tile_matches_available()
    }

    /// Whether moving in `direction` would change the board.
    pub fn can_move(&self, direction: Direction) -> bool {
        self.clone().move_tiles(direction).moved
    }

    /// Directions that change the board, in search order.
    pub fn legal_directions(&self) -> Vec<Direction> {
        Direction::all()
            .into_iter()
            .filter(|&d| self.can_move(d))
            .collect()
    }

    fn tile_matches_available(&self) -> bool {
        self.tiles().any(|tile| {
            [Direction::Right, Direction::Down].iter().any(|d| {
                self.cell(tile.position.step(d.vector()))
                    .is_some_and(|other| other.value == tile.value)
            })
        })
    }

    /// Walk from `origin` along `vector` while the next cell is on the board
    /// and empty.
    pub fn find_farthest_position(&self, origin: Position, vector: Vector) -> FarthestPosition {
        let mut farthest = origin;
        let mut next = origin.step(vector);
        while self.is_available(next) {
            farthest = next;
            next = farthest.step(vector);
        }
        FarthestPosition { farthest, next }
    }

    /// Slide and merge every tile in `direction`.
    ///
    /// Cells are visited starting from the edge the tiles move toward. A tile
    /// merges into the next tile in its path when both hold the same value and
    /// the target was not itself created by a merge during this move.
    ///
    /// Any `merged_from` left by an earlier move is cleared first, so a no-op
    /// leaves the board unchanged only if it came in without provenance, as
    /// every board from [`Grid::build`] or [`Grid::from_values`] does.
    pub fn move_tiles(&mut self, direction: Direction) -> MoveOutcome {
        let vector = direction.vector();
        let (xs, ys) = traversal_order(vector);
        let mut outcome = MoveOutcome::default();

        self.prepare_tiles();

        for &x in &xs {
            for &y in &ys {
                let cell = Position::new(x, y);
                let Some(tile) = self.cell(cell).copied() else {
                    continue;
                };

                let FarthestPosition { farthest, next } = self.find_farthest_position(cell, vector);
                let target = self.cell(next).copied();

                match target {
                    Some(other) if other.value == tile.value && other.merged_from.is_none() => {
                        let merged = Tile {
                            position: next,
                            value: tile.value * 2,
                            merged_from: Some([tile.source(), other.source()]),
                        };
                        trace!("merge {} + {} -> {} at {}", tile.value, other.value, merged.value, next);
                        self.remove_tile(cell);
                        self.insert_tile(merged);

                        outcome.points += merged.value;
                        outcome.moved = true;
                        if merged.value == WIN_VALUE {
                            outcome.won = true;
                        }
                    }
                    _ if farthest != cell => {
                        self.remove_tile(cell);
                        self.insert_tile(Tile { position: farthest, ..tile });
                        outcome.moved = true;
                    }
                    _ => {}
                }
            }
        }

        outcome
    }

    /// Clear merge provenance left over from a previous move.
    fn prepare_tiles(&mut self) {
        for tile in self.cells.iter_mut().flatten() {
            tile.merged_from = None;
        }
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {{ max: {}, empty: {} }}", self.max_value(), self.empty_count())?;
        for row in self.values().chunks(SIZE) {
            for &val in row {
                if val == 0 {
                    write!(f, "    .")?;
                } else {
                    write!(f, "{:5}", val)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+------+------+------+------+")?;
        for row in self.values().chunks(SIZE) {
            write!(f, "|")?;
            for &val in row {
                if val == 0 {
                    write!(f, "      |")?;
                } else {
                    write!(f, "{:^6}|", val)?;
                }
            }
            writeln!(f)?;
            writeln!(f, "+------+------+------+------+")?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(triples: &[(u32, u32, u32)]) -> Grid {
        Grid::build(&Snapshot::from_triples(triples.iter().copied()))
    }

    fn is_consistent(grid: &Grid) -> bool {
        grid.cells.iter().enumerate().all(|(idx, cell)| match cell {
            Some(t) => t.position == Position::from_index(idx) && t.value >= 2 && t.value.is_power_of_two(),
            None => true,
        })
    }

    // -------------------------------------------------------------------------
    // Building from snapshots
    // -------------------------------------------------------------------------

    #[test]
    fn test_build_places_tiles_zero_indexed() {
        let g = grid(&[(2, 1, 1), (4, 2, 3)]);
        assert_eq!(g.cell(Position::new(0, 0)).map(|t| t.value), Some(2));
        assert_eq!(g.cell(Position::new(2, 1)).map(|t| t.value), Some(4));
        assert_eq!(g.empty_count(), 14);
        assert!(g.tiles().all(|t| t.merged_from.is_none()));
    }

    #[test]
    fn test_build_duplicates_keep_max() {
        let g = grid(&[(2, 1, 1), (8, 1, 1), (4, 1, 1)]);
        assert_eq!(g.cell(Position::new(0, 0)).map(|t| t.value), Some(8));
        assert_eq!(g.tiles().count(), 1);
    }

    #[test]
    fn test_build_skips_invalid_observations() {
        let g = grid(&[(2, 0, 1), (2, 1, 5), (3, 1, 1), (0, 2, 2), (4, 4, 4)]);
        assert_eq!(g.values(), [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 4]);
    }

    #[test]
    fn test_build_skips_oversized_tiles() {
        let mut g = grid(&[(1 << 31, 1, 1), (1 << 31, 1, 2), (1 << 18, 2, 1)]);
        assert_eq!(g.empty_count(), CELLS);
        assert_eq!(g.move_tiles(Direction::Left), MoveOutcome::default());

        let from_values = Grid::from_values([1 << 31, 1 << 31, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(from_values.empty_count(), CELLS);
    }

    #[test]
    fn test_largest_tiles_merge_without_overflow() {
        let mut g = grid(&[(MAX_TILE_VALUE, 1, 1), (MAX_TILE_VALUE, 1, 2)]);
        let outcome = g.move_tiles(Direction::Left);
        assert!(outcome.moved);
        assert_eq!(outcome.points, MAX_TILE_VALUE * 2);
        assert_eq!(g.max_value(), MAX_TILE_VALUE * 2);
    }

    #[test]
    fn test_build_empty_snapshot() {
        let g = Grid::build(&Snapshot::default());
        assert_eq!(g.empty_count(), CELLS);
        assert_eq!(g.max_value(), 0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let g = grid(&[(2, 1, 1), (16, 3, 4), (4, 4, 2)]);
        assert_eq!(Grid::build(&g.to_snapshot()), g);
    }

    #[test]
    fn test_available_cells_row_major() {
        let g = Grid::from_values([2, 0, 4, 8, 2, 4, 8, 16, 0, 2, 4, 8, 2, 4, 8, 0]);
        assert_eq!(
            g.available_cells(),
            vec![Position::new(1, 0), Position::new(0, 2), Position::new(3, 3)]
        );
    }

    // -------------------------------------------------------------------------
    // Farthest position
    // -------------------------------------------------------------------------

    #[test]
    fn test_farthest_on_empty_row() {
        let g = grid(&[(2, 1, 4)]);
        let fp = g.find_farthest_position(Position::new(3, 0), Direction::Left.vector());
        assert_eq!(fp.farthest, Position::new(0, 0));
        assert_eq!(fp.next, Position::new(-1, 0));
    }

    #[test]
    fn test_farthest_stops_before_tile() {
        let g = grid(&[(2, 1, 1), (4, 1, 4)]);
        let fp = g.find_farthest_position(Position::new(3, 0), Direction::Left.vector());
        assert_eq!(fp.farthest, Position::new(1, 0));
        assert_eq!(fp.next, Position::new(0, 0));
    }

    #[test]
    fn test_farthest_blocked_immediately() {
        let g = grid(&[(2, 1, 1), (4, 2, 1)]);
        let fp = g.find_farthest_position(Position::new(0, 1), Direction::Up.vector());
        assert_eq!(fp.farthest, Position::new(0, 1));
        assert_eq!(fp.next, Position::new(0, 0));
    }

    // -------------------------------------------------------------------------
    // Move correctness
    // -------------------------------------------------------------------------

    #[test]
    fn test_merge_pair_left() {
        // Tiles at (0,0) and (1,0).
        let mut g = grid(&[(2, 1, 1), (2, 1, 2)]);
        let outcome = g.move_tiles(Direction::Left);
        assert!(outcome.moved);
        assert!(!outcome.won);
        assert_eq!(outcome.points, 4);
        assert_eq!(g.tiles().count(), 1);
        let merged = g.cell(Position::new(0, 0)).unwrap();
        assert_eq!(merged.value, 4);
        assert_eq!(
            merged.merged_from.map(|s| [s[0].value, s[1].value]),
            Some([2, 2])
        );
    }

    #[test]
    fn test_move_left_rows() {
        let mut g = Grid::from_values([2, 2, 0, 0, 0, 4, 4, 0, 2, 0, 2, 0, 8, 8, 8, 8]);
        let outcome = g.move_tiles(Direction::Left);
        assert_eq!(g.values(), [4, 0, 0, 0, 8, 0, 0, 0, 4, 0, 0, 0, 16, 16, 0, 0]);
        assert_eq!(outcome.points, 4 + 8 + 4 + 32);
    }

    #[test]
    fn test_move_right_rows() {
        let mut g = Grid::from_values([2, 2, 0, 0, 0, 4, 4, 0, 2, 0, 2, 0, 8, 8, 8, 8]);
        g.move_tiles(Direction::Right);
        assert_eq!(g.values(), [0, 0, 0, 4, 0, 0, 0, 8, 0, 0, 0, 4, 0, 0, 16, 16]);
    }

    #[test]
    fn test_move_up_columns() {
        let mut g = Grid::from_values([2, 0, 2, 8, 2, 4, 0, 8, 0, 4, 2, 8, 0, 0, 0, 8]);
        g.move_tiles(Direction::Up);
        assert_eq!(g.values(), [4, 8, 4, 16, 0, 0, 0, 16, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_move_down_columns() {
        let mut g = Grid::from_values([2, 0, 2, 8, 2, 4, 0, 8, 0, 4, 2, 8, 0, 0, 0, 8]);
        g.move_tiles(Direction::Down);
        assert_eq!(g.values(), [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 16, 4, 8, 4, 16]);
    }

    #[test]
    fn test_no_double_merge() {
        // [4, 2, 2, 0] becomes [4, 4, 0, 0], not [8, 0, 0, 0]
        let mut g = Grid::from_values([4, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        g.move_tiles(Direction::Left);
        assert_eq!(&g.values()[..4], &[4, 4, 0, 0]);
    }

    #[test]
    fn test_no_double_merge_chain() {
        // [2, 2, 2, 2] becomes [4, 4, 0, 0], and sliding right gives [0, 0, 4, 4]
        let mut g = Grid::from_values([2, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let outcome = g.move_tiles(Direction::Left);
        assert_eq!(&g.values()[..4], &[4, 4, 0, 0]);
        assert_eq!(outcome.points, 8);

        let mut g = Grid::from_values([2, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        g.move_tiles(Direction::Right);
        assert_eq!(&g.values()[..4], &[0, 0, 4, 4]);
    }

    #[test]
    fn test_merged_tile_does_not_merge_again() {
        // 4 arrives next to a freshly merged 4: the pair must stay apart.
        let mut g = Grid::from_values([2, 2, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        g.move_tiles(Direction::Left);
        assert_eq!(&g.values()[..4], &[4, 4, 0, 0]);
        let merged_count = g.tiles().filter(|t| t.merged_from.is_some()).count();
        assert_eq!(merged_count, 1);
        assert!(g.tiles().all(|t| t.merged_from.map_or(true, |s| s[0].value == s[1].value && t.value == 2 * s[0].value)));
    }

    #[test]
    fn test_merge_with_gaps() {
        let mut g = Grid::from_values([2, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        g.move_tiles(Direction::Left);
        assert_eq!(&g.values()[..4], &[4, 0, 0, 0]);
    }

    #[test]
    fn test_provenance_cleared_on_next_move() {
        let mut g = Grid::from_values([2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        g.move_tiles(Direction::Left);
        assert!(g.tiles().any(|t| t.merged_from.is_some()));
        g.move_tiles(Direction::Down);
        assert!(g.tiles().all(|t| t.merged_from.is_none()));
    }

    #[test]
    fn test_noop_after_merge_only_drops_provenance() {
        let mut g = Grid::from_values([2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        g.move_tiles(Direction::Left);
        let values = g.values();
        assert!(!g.move_tiles(Direction::Left).moved);
        assert_eq!(g.values(), values);
        assert!(g.tiles().all(|t| t.merged_from.is_none()));
        assert_eq!(g, Grid::from_values(values));
    }

    #[test]
    fn test_win_detection() {
        let mut g = grid(&[(1024, 1, 1), (1024, 1, 2)]);
        let outcome = g.move_tiles(Direction::Left);
        assert!(outcome.moved);
        assert!(outcome.won);
        assert_eq!(g.max_value(), 2048);
    }

    #[test]
    fn test_larger_merge_is_not_a_win() {
        let mut g = grid(&[(2048, 1, 1), (2048, 1, 2)]);
        let outcome = g.move_tiles(Direction::Left);
        assert!(outcome.moved);
        assert!(!outcome.won);
        assert_eq!(g.max_value(), 4096);
    }

    #[test]
    fn test_noop_move_leaves_grid_unchanged() {
        let mut g = Grid::from_values([2, 0, 0, 0, 4, 0, 0, 0, 8, 0, 0, 0, 16, 0, 0, 0]);
        let before = g.clone();
        let outcome = g.move_tiles(Direction::Left);
        assert_eq!(outcome, MoveOutcome::default());
        assert_eq!(g, before);
    }

    #[test]
    fn test_stuck_board_never_moves() {
        let stuck = Grid::from_values([2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2]);
        assert!(!stuck.has_moves());
        for dir in Direction::all() {
            let mut g = stuck.clone();
            assert!(!g.move_tiles(dir).moved, "{dir} should not move");
            assert_eq!(g, stuck);
        }
    }

    #[test]
    fn test_legal_directions() {
        let g = grid(&[(2, 1, 1)]);
        assert_eq!(g.legal_directions(), vec![Direction::Right, Direction::Down]);
        assert!(!g.can_move(Direction::Up));
        assert!(Grid::new().legal_directions().is_empty());
    }

    #[test]
    fn test_has_moves() {
        assert!(Grid::new().has_moves());
        let full_with_pair = Grid::from_values([2, 2, 4, 8, 4, 8, 16, 32, 8, 16, 32, 64, 16, 32, 64, 128]);
        assert!(full_with_pair.has_moves());
        let full_with_column_pair = Grid::from_values([2, 4, 8, 16, 2, 8, 16, 32, 4, 16, 32, 64, 8, 32, 64, 128]);
        assert!(full_with_column_pair.has_moves());
    }

    #[test]
    fn test_moves_preserve_grid_invariants() {
        let start = Grid::from_values([2, 2, 4, 8, 0, 4, 4, 16, 2, 0, 2, 2, 8, 8, 8, 0]);
        for dir in Direction::all() {
            let mut g = start.clone();
            let before_sum: u32 = g.values().iter().sum();
            g.move_tiles(dir);
            assert!(is_consistent(&g));
            assert_eq!(g.values().iter().sum::<u32>(), before_sum, "{dir} changed the tile sum");
        }
    }

    #[test]
    fn test_clones_are_independent() {
        let base = grid(&[(2, 1, 1), (2, 2, 1), (4, 1, 4)]);
        let mut up = base.clone();
        up.move_tiles(Direction::Up);
        let mut right = base.clone();
        right.move_tiles(Direction::Right);

        assert_eq!(base, grid(&[(2, 1, 1), (2, 2, 1), (4, 1, 4)]));
        assert_eq!(up.values()[0], 4);
        assert_eq!(&right.values()[..8], &[0, 0, 2, 4, 0, 0, 0, 2]);
    }

    // -------------------------------------------------------------------------
    // Display
    // -------------------------------------------------------------------------

    #[test]
    fn test_display_format() {
        let g = grid(&[(2048, 1, 1)]);
        let display = format!("{}", g);
        assert!(display.contains("+------+"));
        assert!(display.contains(" 2048 "));
    }

    #[test]
    fn test_debug_format() {
        let g = grid(&[(2, 1, 1)]);
        let debug = format!("{:?}", g);
        assert!(debug.contains("Grid"));
        assert!(debug.contains("max: 2"));
    }
}
