//! Unit placement: validation, commit and bounded random placement.

use alloc::sync::Arc;
use alloc::vec::Vec;
use rand::Rng;

use crate::board::Board;
use crate::common::{BoardError, CellStatus, Coordinate};
use crate::config::{BOARD_SIZE, MAX_PLACEMENT_ATTEMPTS, UNIT_TYPES};
use crate::unit::{Orientation, PlacedUnit, UnitId, UnitType};

/// Cells a unit would cover from `start` along `orientation`, or `None` when
/// the run leaves the grid.
pub fn placement_cells(
    unit: &UnitType,
    start: Coordinate,
    orientation: Orientation,
) -> Option<Vec<Coordinate>> {
    (0..unit.size())
        .map(|i| start.step(orientation, i))
        .collect()
}

/// `true` when the unit fits on the grid without covering another unit.
/// Units may touch.
pub fn is_valid_placement(
    board: &Board,
    unit: &UnitType,
    start: Coordinate,
    orientation: Orientation,
) -> bool {
    match placement_cells(unit, start, orientation) {
        Some(cells) => cells.iter().all(|c| board.unit_at(*c).is_none()),
        None => false,
    }
}

/// Commit a placement without re-validating it. Callers check
/// `is_valid_placement` first or go through [`try_place_unit`]; an invalid
/// placement here breaks the occupancy invariant.
pub fn place_unit(
    board: &Board,
    unit: &UnitType,
    start: Coordinate,
    orientation: Orientation,
) -> Board {
    let cells: Vec<Coordinate> = (0..unit.size())
        .filter_map(|i| start.step(orientation, i))
        .collect();

    let mut grid = board.grid;
    for c in cells.iter() {
        grid[c.row()][c.col()] = CellStatus::Occupied;
    }

    let id = UnitId::new(unit.id(), board.units.len());
    let mut units = board.units.clone();
    units.push(Arc::new(PlacedUnit::new(id, *unit, cells, orientation)));

    Board {
        grid,
        units,
        shots: board.shots.clone(),
    }
}

/// Checked variant of [`place_unit`] for call sites that want a reason.
pub fn try_place_unit(
    board: &Board,
    unit: &UnitType,
    start: Coordinate,
    orientation: Orientation,
) -> Result<Board, BoardError> {
    if board.has_unit_type(unit.id()) {
        return Err(BoardError::AlreadyPlaced(unit.name()));
    }
    let Some(cells) = placement_cells(unit, start, orientation) else {
        let reach = unit.size().saturating_sub(1);
        let (row, col) = match orientation {
            Orientation::Horizontal => (start.row(), start.col() + reach),
            Orientation::Vertical => (start.row() + reach, start.col()),
        };
        return Err(BoardError::OutOfBounds { row, col });
    };
    if cells.iter().any(|c| board.unit_at(*c).is_some()) {
        return Err(BoardError::Overlap);
    }
    Ok(place_unit(board, unit, start, orientation))
}

/// Add one unit of every catalog type, in catalog order, at a random valid
/// spot on top of whatever `board` already holds.
///
/// Each unit gets at most `MAX_PLACEMENT_ATTEMPTS` uniform samples of
/// (coordinate, orientation); a unit that finds no spot is skipped, so a
/// crowded board comes back with fewer new units.
pub fn random_placement<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Board {
    let mut board = board.clone();
    for unit in UNIT_TYPES.iter() {
        let mut placed = false;
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let orient = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let row = rng.random_range(0..BOARD_SIZE);
            let col = rng.random_range(0..BOARD_SIZE);
            let Ok(start) = Coordinate::new(row, col) else {
                continue;
            };
            if is_valid_placement(&board, unit, start, orient) {
                board = place_unit(&board, unit, start, orient);
                placed = true;
                break;
            }
        }
        if !placed {
            log::warn!(
                "gave up placing {} after {} attempts",
                unit.name(),
                MAX_PLACEMENT_ATTEMPTS
            );
        }
    }
    board
}
