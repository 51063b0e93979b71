//! Shot resolution against a board.

use alloc::sync::Arc;

use crate::board::Board;
use crate::common::{CellStatus, Coordinate, ShotResult};

/// New board after a shot, plus what the shot did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotOutcome {
    pub board: Board,
    pub result: ShotResult,
    /// Display name of the unit this shot sank, if any.
    pub sunk_unit_name: Option<&'static str>,
}

/// Process a shot at `target`, marking hits/misses and reporting the result.
///
/// A repeat shot returns the board unchanged with `ShotResult::Miss`.
pub fn fire_shot(board: &Board, target: Coordinate) -> ShotOutcome {
    if board.has_shot(target) {
        return ShotOutcome {
            board: board.clone(),
            result: ShotResult::Miss,
            sunk_unit_name: None,
        };
    }

    let mut grid = board.grid;
    let mut units = board.units.clone();
    let mut shots = board.shots.clone();
    shots.push(target);

    let mut result = ShotResult::Miss;
    let mut sunk_unit_name = None;

    match board.cell(target) {
        CellStatus::Occupied => {
            grid[target.row()][target.col()] = CellStatus::Hit;
            result = ShotResult::Hit;
            if let Some(slot) = units.iter_mut().find(|u| u.occupies(target)) {
                let was_sunk = slot.is_sunk();
                let updated = slot.with_hit();
                if updated.is_sunk() && !was_sunk {
                    result = ShotResult::Sunk;
                    sunk_unit_name = Some(updated.kind().name());
                }
                *slot = Arc::new(updated);
            } else {
                log::error!("occupied cell {} has no owning unit", target);
            }
        }
        CellStatus::Empty => {
            grid[target.row()][target.col()] = CellStatus::Miss;
        }
        // Resolved cells always appear in the shot history.
        CellStatus::Hit | CellStatus::Miss => {}
    }

    ShotOutcome {
        board: Board { grid, units, shots },
        result,
        sunk_unit_name,
    }
}
