use rand::rngs::SmallRng;
use rand::SeedableRng;
use snowfort::cli::{parse_coord, parse_line, render_board, render_match, LineCommand};
use snowfort::{fire_shot, Board, Coordinate, Event, Match, Phase, UNIT_TYPES};

fn at(row: usize, col: usize) -> Coordinate {
    Coordinate::new(row, col).unwrap()
}

fn count_in_grid(rendered: &str, ch: char) -> usize {
    rendered
        .lines()
        .filter(|l| l.trim_start().starts_with('║'))
        .map(|l| l.matches(ch).count())
        .sum()
}

#[test]
fn test_parse_coord() {
    assert_eq!(parse_coord("A1"), Ok(at(0, 0)));
    assert_eq!(parse_coord("j10"), Ok(at(9, 9)));
    assert_eq!(parse_coord(" b7 "), Ok(at(6, 1)));
    assert!(parse_coord("").is_err());
    assert!(parse_coord("A").is_err());
    assert!(parse_coord("K1").is_err());
    assert!(parse_coord("A0").is_err());
    assert!(parse_coord("A11").is_err());
    assert!(parse_coord("5A").is_err());
}

#[test]
fn test_parse_line() {
    assert_eq!(parse_line("place A1"), Ok(LineCommand::Place(at(0, 0))));
    assert_eq!(parse_line("FIRE c3"), Ok(LineCommand::Fire(at(2, 2))));
    assert_eq!(parse_line("rotate"), Ok(LineCommand::Rotate));
    assert_eq!(parse_line("  auto  "), Ok(LineCommand::Auto));
    assert_eq!(parse_line("ready"), Ok(LineCommand::Ready));
    assert_eq!(parse_line("rematch"), Ok(LineCommand::Rematch));
    assert_eq!(parse_line("exit"), Ok(LineCommand::Exit));
    assert_eq!(parse_line("q"), Ok(LineCommand::Quit));

    assert!(parse_line("fire").is_err());
    assert!(parse_line("fire Z9").is_err());
    assert!(parse_line("ready now").is_err());
    assert!(parse_line("place A1 B2").is_err());
    assert!(parse_line("dance").is_err());
    assert!(parse_line("").is_err());
}

#[test]
fn test_local_commands_have_no_orchestrator_command() {
    assert!(LineCommand::Help.to_command().is_none());
    assert!(LineCommand::Quit.to_command().is_none());
    assert!(LineCommand::Fire(at(1, 1)).to_command().is_some());
}

#[test]
fn test_render_board_hides_units_unless_revealed() {
    let mut rng = SmallRng::seed_from_u64(8);
    let board = snowfort::random_placement(&Board::empty(), &mut rng);
    let target = board.units()[0].cells()[0];
    let board = fire_shot(&board, target).board;

    let revealed = render_board(&board, true);
    let hidden = render_board(&board.observed_view(), false);
    assert_eq!(count_in_grid(&revealed, 'S'), 16);
    assert_eq!(count_in_grid(&revealed, 'X'), 1);
    assert_eq!(count_in_grid(&hidden, 'S'), 0);
    assert_eq!(count_in_grid(&hidden, 'X'), 1);
}

#[test]
fn test_render_match_shows_status() {
    let mut rng = SmallRng::seed_from_u64(8);
    let state = Match::new().apply(Event::StartSinglePlayer, &mut rng).state;
    assert_eq!(state.phase(), Phase::Setup);
    let screen = render_match(&state);
    assert!(screen.contains(state.status()));
    assert!(screen.contains("not built"));
    for kind in UNIT_TYPES.iter() {
        assert!(screen.contains(&format!("{} ({}, {})", kind.name(), kind.size(), kind.tag())));
    }
}
