//! Move selection for the scripted single-player opponent.
//!
//! The orchestrator only needs "something that produces a target". Any
//! [`MoveOracle`] may be slow or fail; [`select_target`] bounds the call
//! with a timeout and falls back to a uniformly random untargeted cell.

use rand::rngs::SmallRng;
use tokio::time::{timeout, Duration};

use crate::{ai, board::Board, common::Coordinate, game::Match};

/// Everything an oracle may look at when picking a target.
#[derive(Debug, Clone)]
pub struct TargetRequest {
    /// The attacker's view of the board under attack (occupancy masked).
    pub view: Board,
    /// The attacker's own real board.
    pub own: Board,
    /// Sizes of defending units still afloat.
    pub remaining_sizes: Vec<usize>,
}

impl TargetRequest {
    /// Request for the scripted opponent attacking the local player's board.
    pub fn for_opponent(state: &Match) -> Self {
        Self {
            view: state.own_board().observed_view(),
            own: state.opponent_board().clone(),
            remaining_sizes: state.own_board().remaining_unit_sizes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSuggestion {
    pub target: Coordinate,
    /// Optional flavour text shown to the player.
    pub remark: Option<String>,
}

#[async_trait::async_trait]
pub trait MoveOracle: Send + Sync {
    async fn suggest(
        &self,
        request: &TargetRequest,
        rng: &mut SmallRng,
    ) -> anyhow::Result<MoveSuggestion>;
}

/// Uniformly random untargeted cell.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOracle;

#[async_trait::async_trait]
impl MoveOracle for RandomOracle {
    async fn suggest(
        &self,
        request: &TargetRequest,
        rng: &mut SmallRng,
    ) -> anyhow::Result<MoveSuggestion> {
        let target = ai::random_untargeted(&request.view, rng)
            .ok_or_else(|| anyhow::anyhow!("no untargeted cells left"))?;
        Ok(MoveSuggestion {
            target,
            remark: None,
        })
    }
}

/// Probability-density hunter: weighs every placement of the remaining
/// units that fits the observed hits and misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProbabilityOracle;

#[async_trait::async_trait]
impl MoveOracle for ProbabilityOracle {
    async fn suggest(
        &self,
        request: &TargetRequest,
        rng: &mut SmallRng,
    ) -> anyhow::Result<MoveSuggestion> {
        let target = ai::calc_pdf_and_guess(&request.view, &request.remaining_sizes, rng)
            .ok_or_else(|| anyhow::anyhow!("no untargeted cells left"))?;
        Ok(MoveSuggestion {
            target,
            remark: None,
        })
    }
}

/// Ask `oracle` for a target, recovering locally from failure, timeout or a
/// suggestion that was already fired upon. Returns `None` only when the view
/// has no untargeted cell left.
pub async fn select_target(
    oracle: &dyn MoveOracle,
    request: &TargetRequest,
    rng: &mut SmallRng,
    limit: Duration,
) -> Option<MoveSuggestion> {
    match timeout(limit, oracle.suggest(request, rng)).await {
        Ok(Ok(suggestion)) if !request.view.cell(suggestion.target).is_resolved() => {
            return Some(suggestion);
        }
        Ok(Ok(suggestion)) => {
            log::warn!(
                "oracle suggested already targeted cell {}, falling back to random",
                suggestion.target
            );
        }
        Ok(Err(e)) => log::warn!("oracle failed: {}, falling back to random", e),
        Err(_) => log::warn!("oracle timed out after {:?}, falling back to random", limit),
    }

    ai::random_untargeted(&request.view, rng).map(|target| MoveSuggestion {
        target,
        remark: Some("Checking the snowbanks...".to_string()),
    })
}
