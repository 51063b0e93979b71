use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::Duration;

use snowfort::{
    cli::{parse_line, render_match, LineCommand, HELP},
    handshake, init_logging, Command, Orchestrator, OrchestratorConfig, OrchestratorHandle,
    ProbabilityOracle, Role, TcpTransport,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct Tuning {
    #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
    seed: Option<u64>,
    #[arg(long, default_value_t = 1500, help = "Opponent thinking pause in milliseconds")]
    delay_ms: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the computer on the local machine.
    Solo {
        #[command(flatten)]
        tuning: Tuning,
    },
    /// Host a networked match and wait for the other team to connect.
    Host {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[command(flatten)]
        tuning: Tuning,
    },
    /// Join a networked match hosted elsewhere.
    Join {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        #[command(flatten)]
        tuning: Tuning,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let (tuning, link) = match cli.command {
        Commands::Solo { tuning } => (tuning, None),
        Commands::Host { bind, tuning } => {
            println!("Hosting at {}...", bind);
            let listener = TcpListener::bind(&bind).await?;
            println!("Waiting for the other team to connect...");
            let (stream, addr) = listener.accept().await?;
            println!("Team connected from {}", addr);
            let mut transport = TcpTransport::new(stream);
            handshake(&mut transport, true).await?;
            (tuning, Some((transport, Role::Host)))
        }
        Commands::Join { connect, tuning } => {
            println!("Connecting to {}...", connect);
            let mut transport = TcpTransport::connect(&connect).await?;
            handshake(&mut transport, false).await?;
            println!("Connected successfully!");
            (tuning, Some((transport, Role::Guest)))
        }
    };

    let rng = match tuning.seed {
        Some(s) => {
            println!("Using fixed seed: {} (game will be reproducible)", s);
            SmallRng::seed_from_u64(s)
        }
        None => SmallRng::from_rng(&mut rand::rng()),
    };
    let config = OrchestratorConfig {
        opponent_delay: Duration::from_millis(tuning.delay_ms),
        ..OrchestratorConfig::default()
    };

    let (orchestrator, handle) = Orchestrator::new(config, Arc::new(ProbabilityOracle), rng);
    let runner = tokio::spawn(orchestrator.run());

    match link {
        Some((transport, role)) => handle.send(Command::Connect {
            transport: Box::new(transport),
            role,
        })?,
        None => handle.send(Command::StartSinglePlayer)?,
    }
    println!("{}", HELP);

    let played = play(&handle).await;
    // The loop may already have stopped on its own.
    let _ = handle.send(Command::Shutdown);
    runner.await??;
    played
}

/// Read commands from stdin and redraw on every published state until the
/// player quits or stdin closes.
async fn play(handle: &OrchestratorHandle) -> anyhow::Result<()> {
    let mut states = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let screen = render_match(&states.borrow_and_update());
    print!("{}", screen);

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let screen = render_match(&states.borrow_and_update());
                print!("{}", screen);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_line(&line) {
                    Ok(LineCommand::Quit) => break,
                    Ok(LineCommand::Help) => println!("{}", HELP),
                    Ok(cmd) => {
                        if let Some(command) = cmd.to_command() {
                            handle.send(command)?;
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
        }
    }
    Ok(())
}
