//! Text front-end helpers: coordinate and command parsing, board rendering.

use std::fmt::Write;

use crate::{
    board::Board,
    common::{CellStatus, Coordinate},
    config::{BOARD_SIZE, UNIT_TYPES},
    game::{Match, Phase, Side},
    orchestrator::Command,
};

pub const HELP: &str = "\
Commands:
  new          start a single-player match (from the menu)
  place A1     build the next unit with its head at A1
  rotate       toggle horizontal/vertical building
  auto         scatter all units at random
  ready        finish setup
  fire B7      throw at B7
  rematch      play again after a match
  exit         leave the match
  quit         close the program";

/// One parsed line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCommand {
    New,
    Place(Coordinate),
    Rotate,
    Auto,
    Ready,
    Fire(Coordinate),
    Rematch,
    Exit,
    Help,
    Quit,
}

impl LineCommand {
    /// The orchestrator command for this line, `None` for purely local ones.
    pub fn to_command(self) -> Option<Command> {
        Some(match self {
            LineCommand::New => Command::StartSinglePlayer,
            LineCommand::Place(at) => Command::Place(at),
            LineCommand::Rotate => Command::ToggleOrientation,
            LineCommand::Auto => Command::AutoPlace,
            LineCommand::Ready => Command::FinishSetup,
            LineCommand::Fire(at) => Command::Fire(at),
            LineCommand::Rematch => Command::Rematch,
            LineCommand::Exit => Command::Exit,
            LineCommand::Help | LineCommand::Quit => return None,
        })
    }
}

/// Parse `A5`-style input: column letter then 1-based row.
pub fn parse_coord(input: &str) -> Result<Coordinate, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Empty coordinate".to_string());
    }
    if input.len() < 2 {
        return Err("Too short - need column letter and row number (e.g., A5)".to_string());
    }
    let mut chars = input.chars();
    let col_ch = chars
        .next()
        .ok_or("No column letter")?
        .to_ascii_uppercase();
    if !col_ch.is_ascii_alphabetic() {
        return Err(format!("Invalid column '{}' - must be a letter A-J", col_ch));
    }
    let col = (col_ch as u8 - b'A') as usize;
    if col >= BOARD_SIZE {
        return Err(format!("Column '{}' out of bounds - must be A-J", col_ch));
    }
    let row_str: String = chars.collect();
    let row: usize = row_str
        .parse()
        .map_err(|_| format!("Invalid row '{}' - must be a number 1-10", row_str))?;
    if row == 0 || row > BOARD_SIZE {
        return Err(format!("Row {} out of bounds - must be 1-10", row));
    }
    Coordinate::new(row - 1, col).map_err(|e| e.to_string())
}

pub fn parse_line(line: &str) -> Result<LineCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("Type a command, or `help`".to_string());
    };
    let arg = words.next();
    if words.next().is_some() {
        return Err(format!("Too many arguments for `{}`", verb));
    }

    let coord_arg = |arg: Option<&str>| -> Result<Coordinate, String> {
        arg.ok_or_else(|| format!("`{}` needs a coordinate, e.g. `{} A5`", verb, verb))
            .and_then(parse_coord)
    };

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "new" | "solo" => LineCommand::New,
        "place" | "p" => LineCommand::Place(coord_arg(arg)?),
        "rotate" | "r" => LineCommand::Rotate,
        "auto" => LineCommand::Auto,
        "ready" => LineCommand::Ready,
        "fire" | "f" => LineCommand::Fire(coord_arg(arg)?),
        "rematch" => LineCommand::Rematch,
        "exit" => LineCommand::Exit,
        "help" | "?" => LineCommand::Help,
        "quit" | "q" => LineCommand::Quit,
        other => return Err(format!("Unknown command `{}`, try `help`", other)),
    };
    let takes_arg = matches!(cmd, LineCommand::Place(_) | LineCommand::Fire(_));
    if !takes_arg && arg.is_some() {
        return Err(format!("`{}` takes no arguments", verb));
    }
    Ok(cmd)
}

fn cell_char(cell: CellStatus, reveal: bool) -> char {
    match cell {
        CellStatus::Hit => 'X',
        CellStatus::Miss => 'o',
        CellStatus::Occupied if reveal => 'S',
        _ => '.',
    }
}

/// Draw a board inside a frame. `reveal` shows unhit occupied cells.
pub fn render_board(board: &Board, reveal: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "    ╔═══════════════════════╗");
    let _ = write!(out, "    ║  ");
    for c in 0..BOARD_SIZE {
        let _ = write!(out, " {}", (b'A' + c as u8) as char);
    }
    let _ = writeln!(out, " ║");
    let _ = writeln!(out, "    ╠═══════════════════════╣");
    for (r, row) in board.grid().iter().enumerate() {
        let _ = write!(out, "    ║ {:2}", r + 1);
        for cell in row.iter() {
            let _ = write!(out, " {}", cell_char(*cell, reveal));
        }
        let _ = writeln!(out, " ║");
    }
    let _ = writeln!(out, "    ╚═══════════════════════╝");
    if reveal {
        let _ = writeln!(out, "    Legend: S=Unit  X=Hit  o=Miss  .=Snow");
    } else {
        let _ = writeln!(out, "    Legend: X=Hit  o=Miss  .=Unknown");
    }
    out
}

fn render_roster(board: &Board) -> String {
    let mut out = String::new();
    for kind in UNIT_TYPES.iter() {
        let state = match board.units().iter().find(|u| u.kind().id() == kind.id()) {
            None => "not built",
            Some(unit) if unit.is_sunk() => "FROZEN",
            Some(_) => "standing",
        };
        let _ = writeln!(
            out,
            "      {} ({}, {}): {}",
            kind.name(),
            kind.size(),
            kind.tag(),
            state
        );
    }
    out
}

/// Full screen for one published match: enemy view, own board, status.
pub fn render_match(state: &Match) -> String {
    let mut out = String::new();
    match state.phase() {
        Phase::Menu => {
            let _ = writeln!(out, "\n== Snowfort ==");
        }
        Phase::Setup => {
            let _ = writeln!(out, "\n== Setup ({:?}) ==", state.orientation());
            let _ = write!(out, "{}", render_board(state.own_board(), true));
            let _ = write!(out, "{}", render_roster(state.own_board()));
        }
        _ => {
            let _ = writeln!(out, "\n== Enemy tundra ==");
            let _ = write!(out, "{}", render_board(&state.attacker_view(), false));
            let _ = writeln!(out, "\n== Your camp ==");
            let _ = write!(out, "{}", render_board(state.own_board(), true));
            let _ = write!(out, "{}", render_roster(state.own_board()));
        }
    }
    let _ = writeln!(out, "\n>> {}", state.status());
    if let Some(line) = turn_line(state) {
        let _ = writeln!(out, "{}", line);
    }
    out
}

fn turn_line(state: &Match) -> Option<&'static str> {
    match state.phase() {
        Phase::Playing if state.can_fire() => Some("Your throw: `fire <coord>`"),
        Phase::Playing if state.is_thinking() => Some("The opponent is aiming..."),
        Phase::Playing => Some("Waiting for the opponent..."),
        Phase::GameOver if state.winner() == Some(Side::Human) => {
            Some("You win! `rematch` or `exit`.")
        }
        Phase::GameOver => Some("You lose. `rematch` or `exit`."),
        Phase::WaitingForOpponent => Some("Waiting for the other team to finish building..."),
        Phase::Menu | Phase::Setup => None,
    }
}
