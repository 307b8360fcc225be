//! Board observations as supplied by whatever is watching the game.
//!
//! A [`Snapshot`] is a flat list of `(value, row, col)` triples with 1-indexed
//! rows and columns, exactly as an external reader reports the rendered tiles.
//! Nothing here knows how the tiles were read; sources plug in through
//! [`SnapshotSource`].

use std::fmt;

use crate::error::{Result, SnapshotError};
use crate::geometry::{Position, SIZE};
use crate::grid::MAX_TILE_VALUE;

/// One observed tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Observation {
    pub value: u32,
    /// 1-indexed, top row is 1.
    pub row: u32,
    /// 1-indexed, leftmost column is 1.
    pub col: u32,
}

impl Observation {
    pub const fn new(value: u32, row: u32, col: u32) -> Self {
        Observation { value, row, col }
    }

    /// Check that the observation names a real cell and a legal tile value.
    pub fn validate(&self) -> Result<()> {
        if !(1..=SIZE as u32).contains(&self.row) {
            return Err(SnapshotError::RowOutOfRange(self.row));
        }
        if !(1..=SIZE as u32).contains(&self.col) {
            return Err(SnapshotError::ColOutOfRange(self.col));
        }
        if !(2..=MAX_TILE_VALUE).contains(&self.value) || !self.value.is_power_of_two() {
            return Err(SnapshotError::InvalidValue(self.value));
        }
        Ok(())
    }

    /// Zero-indexed board position: column maps to `x`, row maps to `y`.
    /// Only meaningful for observations that pass [`Observation::validate`].
    pub fn position(&self) -> Position {
        Position::new(self.col as i32 - 1, self.row as i32 - 1)
    }
}

impl From<(u32, u32, u32)> for Observation {
    fn from((value, row, col): (u32, u32, u32)) -> Self {
        Observation::new(value, row, col)
    }
}

/// An ordered list of observations. Duplicates for one cell are allowed;
/// the grid keeps the largest value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    observations: Vec<Observation>,
}

impl Snapshot {
    pub fn new(observations: Vec<Observation>) -> Self {
        Snapshot { observations }
    }

    /// Build from raw `(value, row, col)` triples.
    pub fn from_triples<I>(triples: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32, u32)>,
    {
        Snapshot {
            observations: triples.into_iter().map(Observation::from).collect(),
        }
    }

    /// Parse the text form `value,row,col` with entries separated by `;`
    /// or whitespace, e.g. `"2,1,1; 4,1,2"`. Every entry is validated.
    pub fn parse(text: &str) -> Result<Self> {
        let mut observations = Vec::new();
        for entry in text
            .split(|c: char| c == ';' || c.is_whitespace())
            .filter(|e| !e.is_empty())
        {
            let fields: Vec<&str> = entry.split(',').map(str::trim).collect();
            let [value, row, col] = fields.as_slice() else {
                return Err(SnapshotError::Malformed(entry.to_string()));
            };
            let parse = |field: &str| {
                field
                    .parse::<u32>()
                    .map_err(|_| SnapshotError::Malformed(entry.to_string()))
            };
            let observation = Observation::new(parse(*value)?, parse(*row)?, parse(*col)?);
            observation.validate()?;
            observations.push(observation);
        }
        Ok(Snapshot { observations })
    }

    /// Validate every observation, reporting the first bad one.
    pub fn validate(&self) -> Result<()> {
        self.observations.iter().try_for_each(Observation::validate)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl FromIterator<Observation> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Snapshot {
            observations: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, o) in self.observations.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{},{},{}", o.value, o.row, o.col)?;
        }
        Ok(())
    }
}

/// Anything that can report the tiles currently on the board.
///
/// A browser reader, a screen scraper or the in-process [`crate::Game`]
/// all look the same to the policy.
pub trait SnapshotSource {
    type Error;

    fn capture(&mut self) -> std::result::Result<Snapshot, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_semicolons_and_spaces() {
        let snap = Snapshot::parse("2,1,1; 4,1,2  8,4,4").unwrap();
        assert_eq!(
            snap.observations(),
            &[
                Observation::new(2, 1, 1),
                Observation::new(4, 1, 2),
                Observation::new(8, 4, 4)
            ]
        );
    }

    #[test]
    fn test_parse_empty_text() {
        assert!(Snapshot::parse("  ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_entry() {
        assert_eq!(
            Snapshot::parse("2,1"),
            Err(SnapshotError::Malformed("2,1".to_string()))
        );
        assert_eq!(
            Snapshot::parse("two,1,1"),
            Err(SnapshotError::Malformed("two,1,1".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(Snapshot::parse("2,5,1"), Err(SnapshotError::RowOutOfRange(5)));
        assert_eq!(Snapshot::parse("2,1,0"), Err(SnapshotError::ColOutOfRange(0)));
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert_eq!(Snapshot::parse("3,1,1"), Err(SnapshotError::InvalidValue(3)));
        assert_eq!(Snapshot::parse("1,1,1"), Err(SnapshotError::InvalidValue(1)));
        assert_eq!(Snapshot::parse("0,1,1"), Err(SnapshotError::InvalidValue(0)));
        assert_eq!(Snapshot::parse("262144,1,1"), Err(SnapshotError::InvalidValue(262144)));
        assert_eq!(
            Snapshot::parse("2147483648,1,1"),
            Err(SnapshotError::InvalidValue(1 << 31))
        );
        assert!(Snapshot::parse("131072,1,1").is_ok());
    }

    #[test]
    fn test_position_is_zero_indexed_column_then_row() {
        assert_eq!(Observation::new(2, 1, 1).position(), Position::new(0, 0));
        assert_eq!(Observation::new(2, 3, 2).position(), Position::new(1, 2));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let snap = Snapshot::from_triples([(2, 1, 1), (1024, 2, 3)]);
        assert_eq!(snap.to_string(), "2,1,1;1024,2,3");
        assert_eq!(Snapshot::parse(&snap.to_string()).unwrap(), snap);
    }

    #[test]
    fn test_validate_reports_first_error() {
        let snap = Snapshot::from_triples([(2, 1, 1), (6, 1, 2), (2, 9, 1)]);
        assert_eq!(snap.validate(), Err(SnapshotError::InvalidValue(6)));
    }
}
