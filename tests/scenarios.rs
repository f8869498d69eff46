use rand::{rngs::StdRng, SeedableRng};

use rollout_2048::engine::{self, Board, Move};
use rollout_2048::game::Game;
use rollout_2048::rollout::{MovePolicy, RolloutAgent, RolloutAgentParallel, RolloutConfig};
use rollout_2048::trace::{self, Recorder};

fn board(rows: [[u32; 4]; 4]) -> Board { Board::from_rows(rows).unwrap() }

#[test]
fn pair_merges_into_one_tile() {
    let out = engine::apply_move(board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]), Move::Left, 0);
    assert_eq!(out.board, board([[4, 0, 0, 0], [0; 4], [0; 4], [0; 4]]));
    assert!(out.moved);
    assert_eq!(out.score, 4);

    let out = engine::apply_move(board([[2, 0, 0, 0], [2, 0, 0, 0], [0; 4], [0; 4]]), Move::Up, 0);
    assert_eq!(out.board, board([[4, 0, 0, 0], [0; 4], [0; 4], [0; 4]]));
    assert_eq!(out.score, 4);
}

#[test]
fn gapped_pair_merges() {
    let out = engine::apply_move(board([[2, 0, 2, 0], [0; 4], [0; 4], [0; 4]]), Move::Left, 10);
    assert_eq!(out.board.rows()[0], [4, 0, 0, 0]);
    assert_eq!(out.score, 14);
}

#[test]
fn agent_plays_a_whole_game() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut game = Game::new(&mut rng);
    let mut agent = RolloutAgent::with_config(RolloutConfig { iterations: 40, cache_outcomes: true, ..Default::default() });
    let mut rec = Recorder::new(game.board(), game.score());
    while !game.is_over() {
        let dir = agent.choose_move(game.board(), &mut rng).expect("non-terminal board has a move");
        let out = game.play(dir, &mut rng);
        assert!(out.moved);
        rec.push(dir, game.board(), game.score());
    }
    assert!(engine::is_terminal(game.board()));
    assert_eq!(agent.choose_move(game.board(), &mut rng), None);
    assert_eq!(game.best_score(), game.score());
    assert!(game.board().highest_tile() >= 32);

    let run = rec.finish(2024, 0, 0.0, 40, None);
    assert_eq!(run.meta.steps as u64, game.moves());
    let bytes = trace::encode_run(&run).unwrap();
    assert_eq!(trace::parse_run_bytes(&bytes).unwrap(), run);
}

#[test]
fn policies_are_interchangeable() {
    let b = board([[0; 4], [0, 2, 0, 0], [0, 0, 4, 0], [0; 4]]);
    let cfg = RolloutConfig { iterations: 500, ..Default::default() };
    let mut policies: Vec<Box<dyn MovePolicy>> = vec![
        Box::new(RolloutAgent::with_config(cfg.clone())),
        Box::new(RolloutAgentParallel::with_config(cfg)),
    ];
    let mut rng = StdRng::seed_from_u64(8);
    for policy in policies.iter_mut() {
        let dir = policy.choose_move(b, &mut rng).unwrap();
        assert!(b.shift(dir).moved, "{} picked an illegal move", policy.name());
    }
}
