#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod ai;
pub mod board;
pub mod common;
pub mod config;
pub mod game;
pub mod placement;
pub mod protocol;
pub mod shot;
pub mod unit;
pub mod win;

#[cfg(feature = "std")]
pub mod cli;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod oracle;
#[cfg(feature = "std")]
pub mod orchestrator;
#[cfg(feature = "std")]
pub mod transport;

pub use ai::*;
pub use board::*;
pub use common::*;
pub use config::*;
pub use game::*;
pub use placement::*;
pub use protocol::*;
pub use shot::*;
pub use unit::*;
pub use win::*;

#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use oracle::*;
#[cfg(feature = "std")]
pub use orchestrator::{Command, Orchestrator, OrchestratorHandle};
#[cfg(feature = "std")]
pub use transport::{handshake, in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
