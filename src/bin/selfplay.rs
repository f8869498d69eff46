use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use rollout_2048::engine::SpawnPolicy;
use rollout_2048::game::Game;
use rollout_2048::rollout::{RolloutAgent, RolloutConfig};
use rollout_2048::trace::{self, Recorder};

#[derive(Debug, Parser)]
#[command(name = "selfplay", version, about = "Play many 2048 games with the rollout agent in parallel")]
struct Args {
    /// Number of games
    #[arg(short, long, default_value_t = 16)]
    games: u64,
    /// Rollouts per move
    #[arg(short, long, default_value_t = 2_000)]
    iterations: u64,
    /// Base seed; game i uses seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Probability that a spawned tile is a 4
    #[arg(long, default_value_t = 0.5)]
    four_chance: f64,
    /// Per game: stop after this many moves
    #[arg(long)]
    steps: Option<u64>,
    /// Worker threads (defaults to rayon's choice)
    #[arg(long)]
    threads: Option<usize>,
    /// Write one trace per game into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Serialize)]
struct GameResult {
    seed: u64,
    moves: u64,
    score: u64,
    highest_tile: u32,
    elapsed_s: f64,
}

#[derive(Debug, Serialize)]
struct Summary {
    games: usize,
    iterations: u64,
    mean_score: f64,
    best_score: u64,
    mean_moves: f64,
    /// Highest tile reached -> number of games.
    highest_tiles: BTreeMap<u32, usize>,
    elapsed_s: f64,
    results: Vec<GameResult>,
}

fn play_one(seed: u64, args: &Args) -> anyhow::Result<GameResult> {
    let start = Instant::now();
    let start_wall = trace::now_unix_seconds();
    let mut rng = StdRng::seed_from_u64(seed);
    let cfg = RolloutConfig { iterations: args.iterations, ..Default::default() };
    let mut agent = RolloutAgent::with_config(cfg);
    let mut game = Game::with_policy(&mut rng, SpawnPolicy::new(args.four_chance));
    let mut recorder = args.out_dir.as_ref().map(|_| Recorder::new(game.board(), game.score()));

    while !game.is_over() {
        let Some(dir) = agent.best_move(game.board(), &mut rng) else { break };
        if !game.play(dir, &mut rng).moved {
            break;
        }
        if let Some(rec) = recorder.as_mut() {
            rec.push(dir, game.board(), game.score());
        }
        if args.steps.is_some_and(|limit| game.moves() >= limit) {
            break;
        }
    }

    let elapsed_s = start.elapsed().as_secs_f64();
    if let (Some(dir), Some(rec)) = (&args.out_dir, recorder) {
        let iterations = u32::try_from(args.iterations).unwrap_or(u32::MAX);
        let run = rec.finish(seed, start_wall, elapsed_s as f32, iterations, Some("rollout".to_string()));
        let path = dir.join(format!("game-{seed:08}.r2t"));
        trace::write_run_to_path(&path, &run).with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(GameResult {
        seed,
        moves: game.moves(),
        score: game.score(),
        highest_tile: game.board().highest_tile(),
        elapsed_s,
    })
}

fn summarize(mut results: Vec<GameResult>, iterations: u64, elapsed_s: f64) -> Summary {
    results.sort_by_key(|r| r.seed);
    let n = results.len().max(1) as f64;
    let mut highest_tiles = BTreeMap::new();
    for r in &results {
        *highest_tiles.entry(r.highest_tile).or_insert(0) += 1;
    }
    Summary {
        games: results.len(),
        iterations,
        mean_score: results.iter().map(|r| r.score as f64).sum::<f64>() / n,
        best_score: results.iter().map(|r| r.score).max().unwrap_or(0),
        mean_moves: results.iter().map(|r| r.moves as f64).sum::<f64>() / n,
        highest_tiles,
        elapsed_s,
        results,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new().num_threads(threads).build_global()?;
    }
    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(args.games);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} games ({eta})")?
                .progress_chars("=>-"),
        );
        pb
    };

    let start = Instant::now();
    let results = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let res = play_one(args.seed.wrapping_add(i), &args);
            pb.inc(1);
            res
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    pb.finish_and_clear();

    let summary = summarize(results, args.iterations, start.elapsed().as_secs_f64());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Games: {} | mean score: {:.1} | best score: {} | mean moves: {:.1} | {:.1}s",
            summary.games, summary.mean_score, summary.best_score, summary.mean_moves, summary.elapsed_s
        );
        for (tile, count) in &summary.highest_tiles {
            println!("  {:>6}: {}", tile, count);
        }
    }
    Ok(())
}
