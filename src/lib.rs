//! rollout-2048: a 2048 game engine + Monte-Carlo rollout policy
//!
//! This crate provides:
//! - A `Board` value type with the directional move rules (`shift`), tile
//!   spawning and terminal checks (`engine` module)
//! - A rollout move picker with single-threaded and rayon variants behind a
//!   `MovePolicy` trait (`rollout` module)
//! - A `Game` session with score and best score (`game` module)
//! - A binary trace format for runs (`trace` module)
//!
//! All randomness comes from an RNG the caller passes in, so a seeded
//! generator reproduces games and decisions.
//!
//! Full loop (simplest possible)
//! ```
//! use rollout_2048::engine;
//! use rollout_2048::rollout::RolloutAgent;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! let mut agent = RolloutAgent::with_iterations(200);
//! let (mut board, mut score) = engine::new_game(&mut rng);
//! let mut moves = 0u32;
//!
//! // Keep doctests fast: only a few moves
//! while !engine::is_terminal(board) && moves < 4 {
//!     let Some(dir) = agent.best_move(board, &mut rng) else { break };
//!     let out = engine::apply_move(board, dir, score);
//!     board = if out.moved { engine::spawn_tile(out.board, &mut rng) } else { out.board };
//!     score = out.score;
//!     moves += 1;
//! }
//! assert!(moves > 0);
//! ```

pub mod engine;
pub mod game;
pub mod rollout;
pub mod trace;

pub use engine::{apply_move, is_terminal, new_game, spawn_tile, Board, Move, MoveOutcome, Score};
pub use rollout::{choose_move, MovePolicy};
