//! Board state: cell grid, placed units and shot history.
//!
//! A `Board` is a value. Operations in `placement` and `shot` take a board by
//! reference and hand back a new one; units that an operation does not touch
//! are shared between the old and the new board through `Arc`.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::common::{CellStatus, Coordinate, ShotResult};
use crate::config::BOARD_SIZE;
use crate::unit::PlacedUnit;

pub type Grid = [[CellStatus; BOARD_SIZE]; BOARD_SIZE];

#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) grid: Grid,
    pub(crate) units: Vec<Arc<PlacedUnit>>,
    pub(crate) shots: Vec<Coordinate>,
}

impl Board {
    /// Create an empty board: no units, no shots.
    pub fn empty() -> Self {
        Board {
            grid: [[CellStatus::Empty; BOARD_SIZE]; BOARD_SIZE],
            units: Vec::new(),
            shots: Vec::new(),
        }
    }

    pub fn cell(&self, coord: Coordinate) -> CellStatus {
        self.grid[coord.row()][coord.col()]
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn units(&self) -> &[Arc<PlacedUnit>] {
        &self.units
    }

    /// Fired-at coordinates in firing order.
    pub fn shots(&self) -> &[Coordinate] {
        &self.shots
    }

    pub fn has_shot(&self, coord: Coordinate) -> bool {
        self.shots.contains(&coord)
    }

    /// The unit covering `coord`, if any.
    pub fn unit_at(&self, coord: Coordinate) -> Option<&Arc<PlacedUnit>> {
        self.units.iter().find(|u| u.occupies(coord))
    }

    /// `true` when a unit of the given catalog id is on the board.
    pub fn has_unit_type(&self, type_id: &str) -> bool {
        self.units.iter().any(|u| u.kind().id() == type_id)
    }

    /// Number of `Occupied` or `Hit` cells.
    pub fn occupied_count(&self) -> usize {
        self.count(|s| matches!(s, CellStatus::Occupied | CellStatus::Hit))
    }

    /// Number of `Hit` cells.
    pub fn revealed_hits(&self) -> usize {
        self.count(|s| s == CellStatus::Hit)
    }

    /// Sizes of the units on this board that are still afloat.
    pub fn remaining_unit_sizes(&self) -> Vec<usize> {
        self.units
            .iter()
            .filter(|u| !u.is_sunk())
            .map(|u| u.kind().size())
            .collect()
    }

    /// What an attacker may see of this board: unrevealed occupancy masked
    /// as `Empty`, no unit objects, same shot history.
    pub fn observed_view(&self) -> Board {
        let mut grid = self.grid;
        for row in grid.iter_mut() {
            for cell in row.iter_mut() {
                if *cell == CellStatus::Occupied {
                    *cell = CellStatus::Empty;
                }
            }
        }
        Board {
            grid,
            units: Vec::new(),
            shots: self.shots.clone(),
        }
    }

    /// Record a remote-reported outcome on an observed view. Repeat marks
    /// return the board unchanged.
    pub fn mark_observed(&self, coord: Coordinate, result: ShotResult) -> Board {
        if self.has_shot(coord) {
            return self.clone();
        }
        let mut grid = self.grid;
        grid[coord.row()][coord.col()] = if result.is_hit() {
            CellStatus::Hit
        } else {
            CellStatus::Miss
        };
        let mut shots = self.shots.clone();
        shots.push(coord);
        Board {
            grid,
            units: self.units.clone(),
            shots,
        }
    }

    fn count(&self, pred: impl Fn(CellStatus) -> bool) -> usize {
        self.grid
            .iter()
            .flat_map(|row| row.iter())
            .filter(|s| pred(**s))
            .count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{")?;
        for row in self.grid.iter() {
            write!(f, "  ")?;
            for cell in row.iter() {
                let ch = match cell {
                    CellStatus::Empty => '.',
                    CellStatus::Occupied => 'S',
                    CellStatus::Hit => 'X',
                    CellStatus::Miss => 'o',
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  units: {:?},\n  shots: {:?}\n}}", self.units, self.shots)
    }
}
