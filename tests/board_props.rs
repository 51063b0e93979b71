use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use snowfort::{
    check_win_condition, fire_shot, random_placement, Board, CellStatus, Coordinate, BOARD_SIZE,
    NUM_UNITS,
};

fn random_board(seed: u64) -> Board {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = random_placement(&Board::empty(), &mut rng);
    let throws = rng.random_range(0..BOARD_SIZE * 4);
    for _ in 0..throws {
        let target = Coordinate::new(
            rng.random_range(0..BOARD_SIZE),
            rng.random_range(0..BOARD_SIZE),
        )
        .unwrap();
        board = fire_shot(&board, target).board;
    }
    board
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fire_shot_idempotent(seed in any::<u64>(), row in 0..BOARD_SIZE, col in 0..BOARD_SIZE) {
        let board = random_board(seed);
        let target = Coordinate::new(row, col).unwrap();
        let once = fire_shot(&board, target);
        let twice = fire_shot(&once.board, target);
        prop_assert_eq!(&twice.board, &once.board);
        prop_assert!(once.board.has_shot(target));
        prop_assert!(once.board.cell(target).is_resolved());
    }

    #[test]
    fn occupancy_matches_unit_sizes(seed in any::<u64>()) {
        let board = random_board(seed);
        let sizes: usize = board.units().iter().map(|u| u.kind().size()).sum();
        prop_assert_eq!(board.occupied_count(), sizes);
    }

    #[test]
    fn random_placement_is_complete_and_disjoint(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let board = random_placement(&Board::empty(), &mut rng);
        prop_assert_eq!(board.units().len(), NUM_UNITS);

        let mut seen = Vec::new();
        for unit in board.units() {
            prop_assert_eq!(unit.cells().len(), unit.kind().size());
            for cell in unit.cells() {
                prop_assert!(!seen.contains(cell));
                prop_assert_eq!(board.cell(*cell), CellStatus::Occupied);
                seen.push(*cell);
            }
        }
    }

    #[test]
    fn win_iff_no_occupied_cell_left(seed in any::<u64>()) {
        let board = random_board(seed);
        let any_left = Coordinate::all().any(|c| board.cell(c) == CellStatus::Occupied);
        prop_assert_eq!(check_win_condition(&board), !any_left);
    }

    #[test]
    fn sinking_everything_wins(seed in any::<u64>()) {
        let mut board = random_board(seed);
        let targets: Vec<Coordinate> = board
            .units()
            .iter()
            .flat_map(|u| u.cells().to_vec())
            .collect();
        for target in targets {
            board = fire_shot(&board, target).board;
        }
        prop_assert!(check_win_condition(&board));
        prop_assert!(board.units().iter().all(|u| u.is_sunk()));
    }
}
