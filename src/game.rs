//! Match state machine.
//!
//! [`Match::apply`] takes the current match and one [`Event`] and returns the
//! next match together with the [`Effect`]s the runtime must carry out. The
//! current match is never modified; a rejected event yields a copy that only
//! differs in its status message.

use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};
use rand::Rng;

use crate::{
    board::Board,
    common::{BoardError, Coordinate, ShotResult},
    config::{unit_type_by_name, UNIT_TYPES},
    placement::{random_placement, try_place_unit},
    protocol::Message,
    shot::{fire_shot, ShotOutcome},
    unit::Orientation,
    win::{check_observed_win, check_win_condition},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    SinglePlayer,
    MultiPlayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Setup,
    /// Multiplayer only: local setup done, waiting for the peer's `Ready`.
    WaitingForOpponent,
    Playing,
    GameOver,
}

/// Participant a turn or a win belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Human,
    Ai,
    Remote,
}

/// Which end of a peer connection this process is. The host throws first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Guest,
}

/// Reasons a local action is turned down.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("not available while {0:?}")]
    WrongPhase(Phase),
    #[error("wait for your turn")]
    NotYourTurn,
    #[error("{0} was already targeted")]
    AlreadyTargeted(Coordinate),
    #[error("place every unit first")]
    SetupIncomplete,
    #[error("every unit is already placed")]
    NothingToPlace,
    #[error("a throw is still in flight")]
    ShotPending,
    #[error("no opponent connected")]
    NotConnected,
    #[error("can't build there: {0}")]
    InvalidPlacement(#[from] BoardError),
}

/// Input to the state machine: a local action, a peer message or the
/// completion of an opponent move computation.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StartSinglePlayer,
    Connected { role: Role },
    ToggleOrientation,
    /// Place the next unplaced catalog unit at `at`.
    Place { at: Coordinate },
    AutoPlace,
    FinishSetup,
    Fire { at: Coordinate },
    OpponentMove {
        generation: u64,
        target: Coordinate,
        remark: Option<String>,
    },
    Peer(Message),
    PeerDisconnected { reason: String },
    Rematch,
    Exit,
}

/// Work the runtime performs after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Send(Message),
    /// Ask the oracle for the scripted opponent's next target, tagged with
    /// the session generation it belongs to.
    RequestOpponentMove { generation: u64 },
    CloseConnection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: Match,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    mode: Mode,
    phase: Phase,
    turn: Side,
    winner: Option<Side>,
    own: Board,
    opponent: Board,
    status: String,
    orientation: Orientation,
    thinking: bool,
    generation: u64,
    first_turn: Side,
    connected: bool,
    ready_latched: bool,
    pending_shot: Option<Coordinate>,
    opponent_sunk: Vec<&'static str>,
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

impl Match {
    /// A match sitting in the menu.
    pub fn new() -> Self {
        Self {
            mode: Mode::SinglePlayer,
            phase: Phase::Menu,
            turn: Side::Human,
            winner: None,
            own: Board::empty(),
            opponent: Board::empty(),
            status: "Welcome to the tundra.".to_string(),
            orientation: Orientation::Horizontal,
            thinking: false,
            generation: 0,
            first_turn: Side::Human,
            connected: false,
            ready_latched: false,
            pending_shot: None,
            opponent_sunk: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// This player's authoritative board.
    pub fn own_board(&self) -> &Board {
        &self.own
    }

    /// The scripted opponent's real board in single-player, the observed
    /// view of the peer's board in multiplayer.
    pub fn opponent_board(&self) -> &Board {
        &self.opponent
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// `true` while the scripted opponent's move is being computed.
    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    /// Session counter, bumped by every reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Target of a `Fire` sent to the peer and not yet answered.
    pub fn pending_shot(&self) -> Option<Coordinate> {
        self.pending_shot
    }

    /// `true` when it is the local player's turn to throw.
    pub fn can_fire(&self) -> bool {
        self.phase == Phase::Playing
            && self.turn == Side::Human
            && !self.thinking
            && self.pending_shot.is_none()
    }

    /// `true` once every catalog unit is on the local board.
    pub fn all_units_placed(&self) -> bool {
        UNIT_TYPES.iter().all(|t| self.own.has_unit_type(t.id()))
    }

    /// The opponent board as the local player may see it.
    pub fn attacker_view(&self) -> Board {
        match self.mode {
            Mode::SinglePlayer => self.opponent.observed_view(),
            Mode::MultiPlayer => self.opponent.clone(),
        }
    }

    /// Sizes of opponent units not yet reported sunk.
    pub fn opponent_remaining_sizes(&self) -> Vec<usize> {
        match self.mode {
            Mode::SinglePlayer => self.opponent.remaining_unit_sizes(),
            Mode::MultiPlayer => UNIT_TYPES
                .iter()
                .filter(|t| !self.opponent_sunk.contains(&t.name()))
                .map(|t| t.size())
                .collect(),
        }
    }

    /// Compute the transition for `event`.
    pub fn apply<R: Rng + ?Sized>(&self, event: Event, rng: &mut R) -> Transition {
        let mut next = self.clone();
        let mut effects = Vec::new();

        let outcome = match event {
            Event::StartSinglePlayer => next.start_single_player(),
            Event::Connected { role } => next.connect(role),
            Event::ToggleOrientation => next.toggle_orientation(),
            Event::Place { at } => next.place_next(at),
            Event::AutoPlace => next.auto_place(rng),
            Event::FinishSetup => next.finish_setup(rng, &mut effects),
            Event::Fire { at } => next.fire(at, &mut effects),
            Event::OpponentMove {
                generation,
                target,
                remark,
            } => next.opponent_move(generation, target, remark),
            Event::Peer(msg) => next.peer_message(msg, &mut effects),
            Event::PeerDisconnected { reason } => next.disconnected(&reason),
            Event::Rematch => next.rematch(&mut effects),
            Event::Exit => next.exit(&mut effects),
        };

        match outcome {
            Ok(()) => Transition {
                state: next,
                effects,
            },
            Err(err) => {
                log::debug!("action rejected in {:?}: {}", self.phase, err);
                let mut state = self.clone();
                state.status = err.to_string();
                Transition {
                    state,
                    effects: Vec::new(),
                }
            }
        }
    }

    fn require_phase(&self, phase: Phase) -> Result<(), ActionError> {
        if self.phase != phase {
            return Err(ActionError::WrongPhase(self.phase));
        }
        Ok(())
    }

    /// Start a fresh session. Connection state is left to the caller.
    fn reset(&mut self, mode: Mode, phase: Phase, first_turn: Side, status: &str) {
        let connected = self.connected;
        *self = Match {
            mode,
            phase,
            turn: first_turn,
            status: status.to_string(),
            generation: self.generation + 1,
            first_turn,
            connected,
            ..Match::new()
        };
    }

    fn begin_play(&mut self) {
        self.phase = Phase::Playing;
        self.turn = self.first_turn;
        self.status = match self.turn {
            Side::Human => "Battle started. Your throw.",
            _ => "Battle started. The opponent throws first.",
        }
        .to_string();
    }

    fn game_over(&mut self, winner: Side, status: String) {
        log::info!("match over, winner {:?}", winner);
        self.phase = Phase::GameOver;
        self.winner = Some(winner);
        self.thinking = false;
        self.pending_shot = None;
        self.status = status;
    }

    fn start_single_player(&mut self) -> Result<(), ActionError> {
        self.require_phase(Phase::Menu)?;
        self.connected = false;
        self.reset(
            Mode::SinglePlayer,
            Phase::Setup,
            Side::Human,
            "Build your defenses.",
        );
        Ok(())
    }

    fn connect(&mut self, role: Role) -> Result<(), ActionError> {
        self.require_phase(Phase::Menu)?;
        let first = match role {
            Role::Host => Side::Human,
            Role::Guest => Side::Remote,
        };
        self.connected = true;
        self.reset(
            Mode::MultiPlayer,
            Phase::Setup,
            first,
            "Opponent connected. Build your defenses.",
        );
        Ok(())
    }

    fn toggle_orientation(&mut self) -> Result<(), ActionError> {
        self.require_phase(Phase::Setup)?;
        self.orientation = self.orientation.toggled();
        self.status = format!("Building {:?}.", self.orientation);
        Ok(())
    }

    fn place_next(&mut self, at: Coordinate) -> Result<(), ActionError> {
        self.require_phase(Phase::Setup)?;
        let unit = UNIT_TYPES
            .iter()
            .find(|t| !self.own.has_unit_type(t.id()))
            .ok_or(ActionError::NothingToPlace)?;
        self.own = try_place_unit(&self.own, unit, at, self.orientation)?;
        self.status = format!("Built {} at {}.", unit.name(), at);
        Ok(())
    }

    fn auto_place<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), ActionError> {
        self.require_phase(Phase::Setup)?;
        self.own = random_placement(&Board::empty(), rng);
        self.status = "Units scattered at random.".to_string();
        Ok(())
    }

    fn finish_setup<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        effects: &mut Vec<Effect>,
    ) -> Result<(), ActionError> {
        self.require_phase(Phase::Setup)?;
        if !self.all_units_placed() {
            return Err(ActionError::SetupIncomplete);
        }
        match self.mode {
            Mode::SinglePlayer => {
                self.opponent = random_placement(&Board::empty(), rng);
                self.begin_play();
            }
            Mode::MultiPlayer => {
                if !self.connected {
                    return Err(ActionError::NotConnected);
                }
                effects.push(Effect::Send(Message::Ready));
                if self.ready_latched {
                    self.ready_latched = false;
                    self.begin_play();
                } else {
                    self.phase = Phase::WaitingForOpponent;
                    self.status = "Waiting for the other team...".to_string();
                }
            }
        }
        Ok(())
    }

    fn fire(&mut self, at: Coordinate, effects: &mut Vec<Effect>) -> Result<(), ActionError> {
        self.require_phase(Phase::Playing)?;
        if self.turn != Side::Human {
            return Err(ActionError::NotYourTurn);
        }
        if self.thinking || self.pending_shot.is_some() {
            return Err(ActionError::ShotPending);
        }
        if self.opponent.cell(at).is_resolved() {
            return Err(ActionError::AlreadyTargeted(at));
        }

        match self.mode {
            Mode::SinglePlayer => {
                let ShotOutcome {
                    board,
                    result,
                    sunk_unit_name,
                } = fire_shot(&self.opponent, at);
                self.opponent = board;
                if check_win_condition(&self.opponent) {
                    self.game_over(Side::Human, "Victory! Every enemy unit is frozen.".to_string());
                } else {
                    self.turn = Side::Ai;
                    self.thinking = true;
                    self.status = describe_own_shot(at, result, sunk_unit_name);
                    effects.push(Effect::RequestOpponentMove {
                        generation: self.generation,
                    });
                }
            }
            Mode::MultiPlayer => {
                if !self.connected {
                    return Err(ActionError::NotConnected);
                }
                effects.push(Effect::Send(Message::Fire {
                    row: at.row() as u8,
                    col: at.col() as u8,
                }));
                self.pending_shot = Some(at);
                self.turn = Side::Remote;
                self.status = format!("Snowball away at {}...", at);
            }
        }
        Ok(())
    }

    fn opponent_move(
        &mut self,
        generation: u64,
        target: Coordinate,
        remark: Option<String>,
    ) -> Result<(), ActionError> {
        if generation != self.generation || self.phase != Phase::Playing || self.turn != Side::Ai
        {
            log::debug!(
                "discarding stale opponent move {} (generation {}, current {})",
                target,
                generation,
                self.generation
            );
            return Ok(());
        }

        let ShotOutcome {
            board,
            result,
            sunk_unit_name,
        } = fire_shot(&self.own, target);
        self.own = board;
        self.thinking = false;
        if check_win_condition(&self.own) {
            self.game_over(Side::Ai, "Defeat! All your units are frozen.".to_string());
        } else {
            self.turn = Side::Human;
            self.status = match remark {
                Some(remark) => format!("Opponent: \"{}\"", remark),
                None => describe_incoming_shot(target, result, sunk_unit_name),
            };
        }
        Ok(())
    }

    fn peer_message(&mut self, msg: Message, effects: &mut Vec<Effect>) -> Result<(), ActionError> {
        if self.mode != Mode::MultiPlayer {
            log::warn!("ignoring peer message outside multiplayer: {:?}", msg);
            return Ok(());
        }

        match msg {
            Message::Hello { version } => {
                log::debug!("ignoring late handshake (version {})", version);
            }
            Message::Ready => match self.phase {
                Phase::WaitingForOpponent => self.begin_play(),
                Phase::Setup => {
                    self.ready_latched = true;
                    self.status = "The other team is ready.".to_string();
                }
                phase => log::warn!("ignoring Ready during {:?}", phase),
            },
            Message::Fire { row, col } => {
                let Ok(at) = Coordinate::new(row as usize, col as usize) else {
                    log::warn!("ignoring Fire outside the grid: ({}, {})", row, col);
                    return Ok(());
                };
                if self.phase != Phase::Playing || self.turn != Side::Remote {
                    log::warn!(
                        "ignoring out-of-turn Fire at {} during {:?}/{:?}",
                        at,
                        self.phase,
                        self.turn
                    );
                    return Ok(());
                }
                let ShotOutcome {
                    board,
                    result,
                    sunk_unit_name,
                } = fire_shot(&self.own, at);
                self.own = board;
                effects.push(Effect::Send(Message::Result {
                    row,
                    col,
                    result,
                    sunk_name: sunk_unit_name.map(String::from),
                }));
                if check_win_condition(&self.own) {
                    self.game_over(Side::Remote, "Defeat! All your units are frozen.".to_string());
                } else {
                    self.turn = Side::Human;
                    self.status = describe_incoming_shot(at, result, sunk_unit_name);
                }
            }
            Message::Result {
                row,
                col,
                result,
                sunk_name,
            } => {
                let Ok(at) = Coordinate::new(row as usize, col as usize) else {
                    log::warn!("ignoring Result outside the grid: ({}, {})", row, col);
                    return Ok(());
                };
                if self.phase != Phase::Playing || self.pending_shot != Some(at) {
                    log::warn!(
                        "ignoring Result for {} (pending {:?}) during {:?}",
                        at,
                        self.pending_shot,
                        self.phase
                    );
                    return Ok(());
                }
                self.opponent = self.opponent.mark_observed(at, result);
                self.pending_shot = None;
                let sunk = sunk_name.as_deref().and_then(unit_type_by_name);
                if result == ShotResult::Sunk {
                    match sunk {
                        Some(kind) => self.opponent_sunk.push(kind.name()),
                        None => log::warn!("peer reported an unknown sunk unit: {:?}", sunk_name),
                    }
                }
                if check_observed_win(&self.opponent) {
                    self.game_over(Side::Human, "Victory! Every enemy unit is frozen.".to_string());
                } else {
                    self.status = describe_own_shot(at, result, sunk.map(|k| k.name()));
                }
            }
            Message::Restart => {
                if self.phase == Phase::Menu {
                    log::warn!("ignoring Restart while in the menu");
                    return Ok(());
                }
                self.reset(
                    Mode::MultiPlayer,
                    Phase::Setup,
                    self.first_turn,
                    "Rematch requested. Build your defenses.",
                );
            }
        }
        Ok(())
    }

    fn disconnected(&mut self, reason: &str) -> Result<(), ActionError> {
        if !self.connected {
            return Ok(());
        }
        log::warn!("peer connection lost: {}", reason);
        self.connected = false;
        self.pending_shot = None;
        self.status = format!("Opponent disconnected ({}).", reason);
        Ok(())
    }

    fn rematch(&mut self, effects: &mut Vec<Effect>) -> Result<(), ActionError> {
        self.require_phase(Phase::GameOver)?;
        if self.mode == Mode::MultiPlayer {
            if !self.connected {
                return Err(ActionError::NotConnected);
            }
            effects.push(Effect::Send(Message::Restart));
        }
        self.reset(self.mode, Phase::Setup, self.first_turn, "Rematch! Build your defenses.");
        Ok(())
    }

    fn exit(&mut self, effects: &mut Vec<Effect>) -> Result<(), ActionError> {
        if self.phase == Phase::Menu {
            return Err(ActionError::WrongPhase(Phase::Menu));
        }
        if self.connected {
            effects.push(Effect::CloseConnection);
        }
        self.connected = false;
        self.reset(Mode::SinglePlayer, Phase::Menu, Side::Human, "Welcome back.");
        Ok(())
    }
}

fn describe_own_shot(at: Coordinate, result: ShotResult, sunk: Option<&str>) -> String {
    match (result, sunk) {
        (ShotResult::Sunk, Some(name)) => format!("You froze their {}!", name),
        (ShotResult::Sunk, None) | (ShotResult::Hit, _) => format!("Direct hit at {}!", at),
        (ShotResult::Miss, _) => format!("Just snow at {}.", at),
    }
}

fn describe_incoming_shot(at: Coordinate, result: ShotResult, sunk: Option<&str>) -> String {
    match (result, sunk) {
        (ShotResult::Sunk, Some(name)) => format!("Enemy froze your {} at {}!", name, at),
        (ShotResult::Sunk, None) | (ShotResult::Hit, _) => format!("Enemy hit you at {}!", at),
        (ShotResult::Miss, _) => format!("Enemy missed at {}.", at),
    }
}
