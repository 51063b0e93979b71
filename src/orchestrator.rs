//! Async runtime around the [`Match`] state machine.
//!
//! One task owns the match and applies transitions strictly one after the
//! other. Events come from three places: local commands, the peer link and
//! finished opponent move computations. Snapshots of the match are
//! published on a `watch` channel for front-ends.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::{rngs::SmallRng, Rng, SeedableRng};
use tokio::sync::{mpsc, watch};

use crate::{
    common::Coordinate,
    config::OrchestratorConfig,
    game::{Effect, Event, Match, Phase, Role, Transition},
    oracle::{select_target, MoveOracle, MoveSuggestion, TargetRequest},
    protocol::Message,
    transport::Transport,
};

/// Local input to the orchestrator.
pub enum Command {
    StartSinglePlayer,
    /// Attach an already handshaken peer link and enter multiplayer setup.
    Connect {
        transport: Box<dyn Transport>,
        role: Role,
    },
    ToggleOrientation,
    Place(Coordinate),
    AutoPlace,
    FinishSetup,
    Fire(Coordinate),
    Rematch,
    Exit,
    /// Stop the event loop.
    Shutdown,
}

/// Cloneable front-end side of an [`Orchestrator`].
#[derive(Clone)]
pub struct OrchestratorHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<Match>,
}

impl OrchestratorHandle {
    pub fn send(&self, command: Command) -> anyhow::Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow::anyhow!("orchestrator has stopped"))
    }

    /// Latest published match.
    pub fn snapshot(&self) -> Match {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Match> {
        self.state.clone()
    }

    /// Wait until a published match satisfies `pred`, starting with the
    /// current one.
    pub async fn wait_for(&self, pred: impl FnMut(&Match) -> bool) -> anyhow::Result<Match> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(pred)
            .await
            .map_err(|_| anyhow::anyhow!("orchestrator has stopped"))?;
        Ok(state.clone())
    }
}

enum Input {
    Command(Option<Command>),
    Move(Event),
    Peer(anyhow::Result<Message>),
}

pub struct Orchestrator {
    state: Match,
    rng: SmallRng,
    link: Option<Box<dyn Transport>>,
    oracle: Arc<dyn MoveOracle>,
    config: OrchestratorConfig,
    commands: mpsc::UnboundedReceiver<Command>,
    moves_tx: mpsc::UnboundedSender<Event>,
    moves_rx: mpsc::UnboundedReceiver<Event>,
    state_tx: watch::Sender<Match>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        oracle: Arc<dyn MoveOracle>,
        rng: SmallRng,
    ) -> (Self, OrchestratorHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (moves_tx, moves_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(Match::new());
        let orchestrator = Self {
            state: Match::new(),
            rng,
            link: None,
            oracle,
            config,
            commands,
            moves_tx,
            moves_rx,
            state_tx,
        };
        let handle = OrchestratorHandle {
            commands: commands_tx,
            state: state_rx,
        };
        (orchestrator, handle)
    }

    /// Run until `Command::Shutdown` or until every handle is dropped.
    /// Returns the final match.
    pub async fn run(mut self) -> anyhow::Result<Match> {
        log::info!("orchestrator started");
        loop {
            let input = tokio::select! {
                cmd = self.commands.recv() => Input::Command(cmd),
                Some(event) = self.moves_rx.recv() => Input::Move(event),
                msg = recv_from(&mut self.link) => Input::Peer(msg),
            };

            let event = match input {
                Input::Command(None) => break,
                Input::Command(Some(cmd)) => match cmd {
                    Command::Shutdown => break,
                    Command::Connect { transport, role } => {
                        if self.state.phase() == Phase::Menu {
                            self.link = Some(transport);
                        } else {
                            log::warn!(
                                "refusing peer connection during {:?}",
                                self.state.phase()
                            );
                        }
                        Event::Connected { role }
                    }
                    Command::StartSinglePlayer => Event::StartSinglePlayer,
                    Command::ToggleOrientation => Event::ToggleOrientation,
                    Command::Place(at) => Event::Place { at },
                    Command::AutoPlace => Event::AutoPlace,
                    Command::FinishSetup => Event::FinishSetup,
                    Command::Fire(at) => Event::Fire { at },
                    Command::Rematch => Event::Rematch,
                    Command::Exit => Event::Exit,
                },
                Input::Move(event) => event,
                Input::Peer(Ok(msg)) => Event::Peer(msg),
                Input::Peer(Err(e)) => {
                    self.link = None;
                    Event::PeerDisconnected {
                        reason: e.to_string(),
                    }
                }
            };
            self.dispatch(event).await;
        }
        log::info!("orchestrator stopped");
        Ok(self.state)
    }

    async fn dispatch(&mut self, event: Event) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            log::debug!("{:?} during {:?}", event, self.state.phase());
            let Transition { state, effects } = self.state.apply(event, &mut self.rng);
            self.state = state;
            for effect in effects {
                if let Some(follow_up) = self.execute(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }
        self.state_tx.send_replace(self.state.clone());
    }

    async fn execute(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::Send(msg) => {
                let Some(link) = self.link.as_mut() else {
                    log::warn!("dropping {:?}: no peer connection", msg);
                    return None;
                };
                if let Err(e) = link.send(msg).await {
                    log::warn!("send to peer failed: {}", e);
                    self.link = None;
                    return Some(Event::PeerDisconnected {
                        reason: e.to_string(),
                    });
                }
                None
            }
            Effect::RequestOpponentMove { generation } => {
                self.spawn_opponent_move(generation);
                None
            }
            Effect::CloseConnection => {
                if self.link.take().is_some() {
                    log::info!("peer connection closed");
                }
                None
            }
        }
    }

    /// Compute the scripted opponent's move off the event loop. The result
    /// re-enters as `Event::OpponentMove` tagged with `generation`; the state
    /// machine drops it if the session moved on meanwhile.
    fn spawn_opponent_move(&mut self, generation: u64) {
        let request = TargetRequest::for_opponent(&self.state);
        let oracle = Arc::clone(&self.oracle);
        let moves_tx = self.moves_tx.clone();
        let config = self.config;
        let mut rng = SmallRng::seed_from_u64(self.rng.random());

        tokio::spawn(async move {
            tokio::time::sleep(config.opponent_delay).await;
            match select_target(oracle.as_ref(), &request, &mut rng, config.oracle_timeout).await {
                Some(MoveSuggestion { target, remark }) => {
                    // The orchestrator may already be gone.
                    let _ = moves_tx.send(Event::OpponentMove {
                        generation,
                        target,
                        remark,
                    });
                }
                None => log::error!("no untargeted cell left for the opponent"),
            }
        });
    }
}

async fn recv_from(link: &mut Option<Box<dyn Transport>>) -> anyhow::Result<Message> {
    match link {
        Some(transport) => transport.recv().await,
        None => std::future::pending().await,
    }
}
