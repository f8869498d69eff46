use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use rollout_2048::engine::{self, Board, Move};
use rollout_2048::rollout::RolloutAgent;

fn board_strategy() -> impl Strategy<Value = Board> {
    // Bias toward empties so boards of every density show up.
    proptest::array::uniform16(prop_oneof![3 => Just(0u8), 5 => 1u8..12])
        .prop_map(|exps| Board::from_exponents(exps).expect("exponents in range"))
}

/// Boards crowded with tiles near the cap.
fn large_board_strategy() -> impl Strategy<Value = Board> {
    proptest::array::uniform16(prop_oneof![1 => Just(0u8), 3 => 26u8..=engine::MAX_EXPONENT])
        .prop_map(|exps| Board::from_exponents(exps).expect("exponents in range"))
}

fn move_strategy() -> impl Strategy<Value = Move> {
    (0usize..4).prop_map(|i| Move::ALL[i])
}

/// Lines of `board` read from the wall `dir` moves toward.
fn lines(board: &Board, dir: Move) -> Vec<[u32; 4]> {
    (0..4)
        .map(|i| {
            let mut line = [0; 4];
            for (k, slot) in line.iter_mut().enumerate() {
                let far = 3 - k;
                *slot = match dir {
                    Move::Left => board.get(i, k),
                    Move::Right => board.get(i, far),
                    Move::Up => board.get(k, i),
                    Move::Down => board.get(far, i),
                };
            }
            line
        })
        .collect()
}

fn tile_count(board: &Board) -> usize { 16 - board.count_empty() }

proptest! {
    #[test]
    fn conserves_tile_sum(board in board_strategy(), dir in move_strategy(), score in 0u64..10_000) {
        let out = engine::apply_move(board, dir, score);
        prop_assert_eq!(out.board.tile_sum(), board.tile_sum() + (out.score - score));
    }

    #[test]
    fn conserves_tile_sum_near_the_cap(board in large_board_strategy(), dir in move_strategy()) {
        let out = board.shift(dir);
        prop_assert_eq!(out.board.tile_sum(), board.tile_sum() + out.score);
        prop_assert!(out.board.highest_tile() <= engine::MAX_TILE);
        prop_assert_eq!(engine::is_terminal(board), Move::ALL.iter().all(|&d| !board.can_move(d)) && board.is_full());
    }

    #[test]
    fn never_adds_tiles(board in board_strategy(), dir in move_strategy()) {
        let out = board.shift(dir);
        prop_assert!(tile_count(&out.board) <= tile_count(&board));
        for (_, _, v) in out.board.tiles() {
            prop_assert!(v.is_power_of_two() && v >= 2);
        }
    }

    #[test]
    fn unmoved_means_unchanged(board in board_strategy(), dir in move_strategy(), score in 0u64..10_000) {
        let out = engine::apply_move(board, dir, score);
        prop_assert_eq!(out.moved, out.board != board);
        if !out.moved {
            prop_assert_eq!(out.score, score);
        }
    }

    #[test]
    fn lines_end_compacted_with_at_most_one_merge(board in board_strategy(), dir in move_strategy()) {
        let out = board.shift(dir);
        for (before, after) in lines(&board, dir).iter().zip(lines(&out.board, dir)) {
            let nonzero_before = before.iter().filter(|&&v| v != 0).count();
            let nonzero_after = after.iter().filter(|&&v| v != 0).count();
            prop_assert!(nonzero_before - nonzero_after <= 1);
            // All tiles sit against the wall with no gaps.
            prop_assert!(after[..nonzero_after].iter().all(|&v| v != 0));
            prop_assert!(after[nonzero_after..].iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn repeated_move_keeps_one_merge_rule(board in board_strategy(), dir in move_strategy()) {
        let first = board.shift(dir);
        let second = first.board.shift(dir);
        if !second.moved {
            prop_assert_eq!(second.board, first.board);
        }
        for (before, after) in lines(&first.board, dir).iter().zip(lines(&second.board, dir)) {
            let lost = before.iter().filter(|&&v| v != 0).count() - after.iter().filter(|&&v| v != 0).count();
            prop_assert!(lost <= 1);
        }
    }

    #[test]
    fn spawn_only_fills_an_empty_cell(board in board_strategy(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let spawned = engine::spawn_tile(board, &mut rng);
        for (r, c, v) in board.tiles() {
            prop_assert_eq!(spawned.get(r, c), v);
        }
        if board.is_full() {
            prop_assert_eq!(spawned, board);
        } else {
            prop_assert_eq!(spawned.count_empty() + 1, board.count_empty());
            let new_tiles: Vec<u32> = board
                .empty_cells()
                .into_iter()
                .map(|(r, c)| spawned.get(r, c))
                .filter(|&v| v != 0)
                .collect();
            prop_assert!(new_tiles == vec![2] || new_tiles == vec![4]);
        }
    }

    #[test]
    fn terminal_iff_no_direction_moves(board in board_strategy()) {
        prop_assume!(board != Board::EMPTY);
        let any_moves = Move::ALL.iter().any(|&d| board.shift(d).moved);
        prop_assert_eq!(engine::is_terminal(board), !any_moves);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn agent_picks_a_legal_move(board in board_strategy(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let picked = RolloutAgent::with_iterations(256).best_move(board, &mut rng);
        match picked {
            Some(dir) => prop_assert!(board.shift(dir).moved),
            None => prop_assert!(Move::ALL.iter().all(|&d| !board.shift(d).moved)),
        }
    }
}

#[test]
fn full_board_without_pairs_is_terminal() {
    let board = Board::from_rows([
        [2, 4, 8, 16],
        [16, 8, 4, 2],
        [2, 4, 8, 16],
        [16, 8, 4, 2],
    ])
    .unwrap();
    assert!(engine::is_terminal(board));
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(RolloutAgent::with_iterations(1_000).best_move(board, &mut rng), None);
}
