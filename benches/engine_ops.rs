use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use rollout_2048::engine::{self, Board, Move, SpawnPolicy};
use rollout_2048::rollout::evaluate;
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut boards = vec![Board::EMPTY];
    let (mut b, _) = engine::new_game(&mut rng);
    boards.push(b);
    // Derive a variety of densities deterministically
    for i in 0..40 {
        let out = b.shift(Move::ALL[i % 4]);
        if out.moved {
            b = out.board.with_random_tile(&mut rng);
        }
        boards.push(b);
    }
    boards
}

fn bench_shift(c: &mut Criterion) {
    let boards = corpus();
    for dir in Move::ALL {
        c.bench_function(&format!("shift/{dir}"), |bch| {
            bch.iter(|| {
                let mut acc = 0u64;
                for &bd in &boards {
                    acc = acc.wrapping_add(bd.shift(dir).score);
                }
                black_box(acc)
            })
        });
    }
}

fn bench_spawn(c: &mut Criterion) {
    c.bench_function("board/with_random_tile", |bch| {
        bch.iter_batched(
            || (Board::EMPTY, StdRng::seed_from_u64(7)),
            |(mut bd, mut rng)| {
                for _ in 0..16 {
                    bd = bd.with_random_tile(&mut rng);
                }
                black_box(bd)
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("board/make_move_left", |bch| {
        bch.iter_batched(
            || {
                let mut rng = StdRng::seed_from_u64(9);
                let (bd, _) = engine::new_game(&mut rng);
                (bd, rng)
            },
            |(mut bd, mut rng)| {
                for _ in 0..64 {
                    bd = bd.make_move(Move::Left, &mut rng, SpawnPolicy::default()).board;
                }
                black_box(bd)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_queries(c: &mut Criterion) {
    let boards = corpus();
    c.bench_function("query/is_terminal", |bch| {
        bch.iter(|| boards.iter().filter(|&&bd| engine::is_terminal(bd)).count())
    });
    c.bench_function("query/empty_cells", |bch| {
        bch.iter(|| boards.iter().map(|bd| bd.empty_cells().len()).sum::<usize>())
    });
    c.bench_function("eval/evaluate", |bch| {
        bch.iter(|| boards.iter().map(|&bd| evaluate(bd)).sum::<f64>())
    });
}

criterion_group!(engine_ops, bench_shift, bench_spawn, bench_queries);
criterion_main!(engine_ops);
