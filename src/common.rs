//! Common types for the grid: coordinates, cell states, shot results and
//! board errors.

use core::fmt;

use crate::config::BOARD_SIZE;

/// A cell on the `BOARD_SIZE`×`BOARD_SIZE` grid. Always in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    row: usize,
    col: usize,
}

impl Coordinate {
    /// Build a coordinate, rejecting anything outside the grid.
    pub fn new(row: usize, col: usize) -> Result<Self, BoardError> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(BoardError::OutOfBounds { row, col });
        }
        Ok(Self { row, col })
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Cell `offset` steps away along `orientation`, if still on the grid.
    pub fn step(&self, orientation: crate::unit::Orientation, offset: usize) -> Option<Self> {
        let (row, col) = match orientation {
            crate::unit::Orientation::Horizontal => (self.row, self.col + offset),
            crate::unit::Orientation::Vertical => (self.row + offset, self.col),
        };
        Self::new(row, col).ok()
    }

    /// Every cell of the grid in row-major order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Coordinate { row, col }))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.col as u8) as char, self.row + 1)
    }
}

/// State of a single grid cell.
///
/// A cell only ever advances `Empty -> Miss` or `Occupied -> Hit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellStatus {
    #[default]
    Empty,
    /// Unit present, not yet revealed.
    Occupied,
    /// Occupied cell that was shot.
    Hit,
    /// Empty cell that was shot.
    Miss,
}

impl CellStatus {
    /// `true` once the cell has been shot at.
    pub fn is_resolved(self) -> bool {
        matches!(self, CellStatus::Hit | CellStatus::Miss)
    }
}

/// Outcome of a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ShotResult {
    /// Shot landed on a unit that is still afloat.
    Hit,
    /// Shot landed on an empty cell, or repeated an earlier shot.
    Miss,
    /// Shot landed on the last intact segment of a unit.
    Sunk,
}

impl ShotResult {
    pub fn is_hit(self) -> bool {
        matches!(self, ShotResult::Hit | ShotResult::Sunk)
    }
}

/// Errors returned by board operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("coordinate ({row}, {col}) is outside the grid")]
    OutOfBounds { row: usize, col: usize },
    #[error("placement overlaps another unit")]
    Overlap,
    #[error("unit `{0}` is already placed")]
    AlreadyPlaced(&'static str),
}
