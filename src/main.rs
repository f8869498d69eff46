use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{rngs::StdRng, Rng, SeedableRng};

use rollout_2048::engine::{Move, SpawnPolicy};
use rollout_2048::game::Game;
use rollout_2048::rollout::{MovePolicy, RolloutAgent, RolloutAgentParallel, RolloutConfig, DEFAULT_ITERATIONS};
use rollout_2048::trace::{self, Recorder};

#[derive(Debug, Parser)]
#[command(name = "rollout-2048", version, about = "Play 2048 from the keyboard or watch the rollout agent")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play with w/a/s/d (or up/down/left/right) lines on stdin; q quits
    Play {
        /// Seed for tile spawns (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Probability that a spawned tile is a 4
        #[arg(long, default_value_t = 0.5)]
        four_chance: f64,
    },
    /// Let the rollout agent play one game
    Auto {
        /// Rollouts per move
        #[arg(short, long, default_value_t = DEFAULT_ITERATIONS)]
        iterations: u64,
        /// Seed for spawns and rollouts (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Split rollouts across threads
        #[arg(long)]
        parallel: bool,
        /// Evaluate each direction once per move
        #[arg(long)]
        cache: bool,
        /// Probability that a spawned tile is a 4
        #[arg(long, default_value_t = 0.5)]
        four_chance: f64,
        /// Stop after this many moves
        #[arg(long)]
        steps: Option<u64>,
        /// Print the board after every move
        #[arg(long)]
        show: bool,
        /// Suppress the status line
        #[arg(long)]
        quiet: bool,
        /// Write a binary trace of the run to this path
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Play { seed, four_chance } => play(seed, SpawnPolicy::new(four_chance)),
        Command::Auto { iterations, seed, parallel, cache, four_chance, steps, show, quiet, out } => {
            let cfg = RolloutConfig { iterations, cache_outcomes: cache, ..Default::default() };
            let policy: Box<dyn MovePolicy> = if parallel {
                Box::new(RolloutAgentParallel::with_config(cfg))
            } else {
                Box::new(RolloutAgent::with_config(cfg))
            };
            let opts = AutoOpts { seed, spawn: SpawnPolicy::new(four_chance), steps, show, quiet, out, iterations };
            auto(policy, opts)
        }
    }
}

fn parse_move(input: &str) -> Option<Move> {
    match input.trim().to_ascii_lowercase().as_str() {
        "w" | "k" | "up" => Some(Move::Up),
        "s" | "j" | "down" => Some(Move::Down),
        "a" | "h" | "left" => Some(Move::Left),
        "d" | "l" | "right" => Some(Move::Right),
        _ => None,
    }
}

fn play(seed: Option<u64>, spawn: SpawnPolicy) -> anyhow::Result<()> {
    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = Game::with_policy(&mut rng, spawn);
    let stdin = io::stdin();
    let mut out = io::stdout().lock();

    writeln!(out, "{}Score: {} | Best: {}", game.board(), game.score(), game.best_score())?;
    write!(out, "> ")?;
    out.flush()?;
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        if game.is_over() {
            if line.trim().is_empty() {
                game.restart(&mut rng);
                writeln!(out, "{}Score: {} | Best: {}", game.board(), game.score(), game.best_score())?;
            } else if line.trim() == "q" {
                break;
            }
        } else if line.trim() == "q" {
            break;
        } else if let Some(dir) = parse_move(&line) {
            if game.play(dir, &mut rng).moved {
                writeln!(out, "{}Score: {} | Best: {}", game.board(), game.score(), game.best_score())?;
            } else {
                writeln!(out, "Can't move {dir}")?;
            }
            if game.is_over() {
                writeln!(out, "Game Over\nScore: {}\nBest Score: {}\nPress ENTER to restart", game.score(), game.best_score())?;
            }
        } else {
            writeln!(out, "Use w/a/s/d or up/down/left/right, q to quit")?;
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    Ok(())
}

struct AutoOpts {
    seed: Option<u64>,
    spawn: SpawnPolicy,
    steps: Option<u64>,
    show: bool,
    quiet: bool,
    out: Option<PathBuf>,
    iterations: u64,
}

fn auto(mut policy: Box<dyn MovePolicy>, opts: AutoOpts) -> anyhow::Result<()> {
    let seed = opts.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = StdRng::seed_from_u64(seed);
    let start = Instant::now();
    let start_wall = trace::now_unix_seconds();

    let mut game = Game::with_policy(&mut rng, opts.spawn);
    let mut recorder = Recorder::new(game.board(), game.score());
    if opts.show {
        println!("{}", game.board());
    }

    let pb = if opts.quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} | Moves: {msg}")?
                .tick_chars("⠁⠃⠇⠧⠷⠿⠻⠟⠯⠷⠧⠇⠃"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    };

    while !game.is_over() {
        let Some(dir) = policy.choose_move(game.board(), &mut rng) else { break };
        let out = game.play(dir, &mut rng);
        if !out.moved {
            break;
        }
        recorder.push(dir, game.board(), game.score());
        if opts.show {
            match &pb {
                Some(pb) => pb.println(format!("{dir}\n{}", game.board())),
                None => println!("{dir}\n{}", game.board()),
            }
        }
        if let Some(pb) = &pb {
            let rate = game.moves() as f64 / start.elapsed().as_secs_f64().max(1e-6);
            pb.set_message(format!("{} | moves/sec: {:.1} | score: {}", game.moves(), rate, game.score()));
        }
        if opts.steps.is_some_and(|limit| game.moves() >= limit) {
            break;
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let elapsed = start.elapsed().as_secs_f64();
    println!(
        "Seed: {} | Moves: {} | score: {} | highest tile: {} | {:.1}s",
        seed,
        game.moves(),
        game.score(),
        game.board().highest_tile(),
        elapsed
    );

    if let Some(path) = opts.out {
        let iterations = u32::try_from(opts.iterations).unwrap_or(u32::MAX);
        let run = recorder.finish(seed, start_wall, elapsed as f32, iterations, Some(policy.name().to_string()));
        trace::write_run_to_path(&path, &run).with_context(|| format!("writing trace to {}", path.display()))?;
    }
    Ok(())
}
