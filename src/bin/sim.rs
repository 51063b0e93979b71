//! Headless multiplayer match between two local orchestrators joined by an
//! in-memory link. Prints a one-line JSON report.

use std::sync::Arc;

use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;
use snowfort::{
    calc_pdf_and_guess, handshake, Command, InMemoryTransport, Match, Orchestrator,
    OrchestratorConfig, OrchestratorHandle, Phase, RandomOracle, Role, Side,
};
use tokio::time::Duration;

/// Upper bound on throws per side; a full grid is 100 cells.
const MAX_THROWS: usize = 100;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    snowfort::init_logging();
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed1> <seed2>", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;

    let (mut t1, mut t2) = InMemoryTransport::pair();
    tokio::try_join!(handshake(&mut t1, true), handshake(&mut t2, false))?;

    let host = spawn_side(seed1);
    let guest = spawn_side(seed2);
    host.send(Command::Connect {
        transport: Box::new(t1),
        role: Role::Host,
    })?;
    guest.send(Command::Connect {
        transport: Box::new(t2),
        role: Role::Guest,
    })?;

    let (host_throws, guest_throws) = tokio::try_join!(
        drive(&host, SmallRng::seed_from_u64(seed1.wrapping_add(1))),
        drive(&guest, SmallRng::seed_from_u64(seed2.wrapping_add(1))),
    )?;

    let host_state = host.snapshot();
    let guest_state = guest.snapshot();
    let winner = match (host_state.winner(), guest_state.winner()) {
        (Some(Side::Human), Some(Side::Remote)) => Some("host"),
        (Some(Side::Remote), Some(Side::Human)) => Some("guest"),
        _ => None,
    };

    let result = json!({
        "host": {"outcome": outcome(&host_state), "throws": host_throws},
        "guest": {"outcome": outcome(&guest_state), "throws": guest_throws},
        "winner": winner,
    });
    println!("{}", serde_json::to_string(&result)?);

    let _ = host.send(Command::Shutdown);
    let _ = guest.send(Command::Shutdown);
    Ok(())
}

fn spawn_side(seed: u64) -> OrchestratorHandle {
    let config = OrchestratorConfig {
        opponent_delay: Duration::ZERO,
        ..OrchestratorConfig::default()
    };
    let (orchestrator, handle) =
        Orchestrator::new(config, Arc::new(RandomOracle), SmallRng::seed_from_u64(seed));
    tokio::spawn(orchestrator.run());
    handle
}

fn outcome(state: &Match) -> &'static str {
    match state.winner() {
        Some(Side::Human) => "won",
        Some(_) => "lost",
        None => "unfinished",
    }
}

/// Build at random, then throw with the probability hunter whenever it is
/// this side's turn. Returns the number of throws made.
async fn drive(handle: &OrchestratorHandle, mut rng: SmallRng) -> anyhow::Result<usize> {
    handle.wait_for(|s| s.phase() == Phase::Setup).await?;
    handle.send(Command::AutoPlace)?;
    handle.send(Command::FinishSetup)?;

    let mut throws = 0;
    loop {
        // A throw counts once its outcome is on the observed board.
        let state = handle
            .wait_for(|s| {
                s.phase() == Phase::GameOver
                    || !s.is_connected()
                    || (s.can_fire() && s.opponent_board().shots().len() == throws)
            })
            .await?;
        if state.phase() == Phase::GameOver || !state.is_connected() {
            return Ok(throws);
        }
        if throws >= MAX_THROWS {
            anyhow::bail!("no winner after {} throws", throws);
        }
        let target = calc_pdf_and_guess(
            &state.attacker_view(),
            &state.opponent_remaining_sizes(),
            &mut rng,
        )
        .ok_or_else(|| anyhow::anyhow!("no untargeted cell left"))?;
        handle.send(Command::Fire(target))?;
        throws += 1;
    }
}
