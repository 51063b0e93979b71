use crate::board::Board;
use crate::config::total_segments;

/// Returns `true` when the board has units and all of them are sunk. An
/// unset board never reports a win.
pub fn check_win_condition(board: &Board) -> bool {
    !board.units().is_empty() && board.units().iter().all(|u| u.is_sunk())
}

/// Win check for an observed view with no unit objects: every catalog
/// segment has been revealed as a hit.
pub fn check_observed_win(board: &Board) -> bool {
    board.revealed_hits() >= total_segments()
}
