//! 2048 game engine: board state, directional moves and tile spawning.
//!
//! The engine is pure: every operation takes a [`Board`] by value and returns
//! a new one. Randomness only enters through [`spawn_tile`] /
//! [`Board::with_random_tile`], which take the caller's RNG so a seeded
//! generator reproduces a whole game.
//!
//! Turn-driver surface
//! ```
//! use rollout_2048::engine::{self, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let (board, score) = engine::new_game(&mut rng);
//! assert_eq!(board.count_empty(), 14);
//!
//! let out = engine::apply_move(board, Move::Left, score);
//! let board = if out.moved { engine::spawn_tile(out.board, &mut rng) } else { out.board };
//! assert!(!engine::is_terminal(board));
//! ```

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod shift;
pub mod spawn;
pub mod state;

pub use shift::MoveOutcome;
pub use spawn::SpawnPolicy;
pub use state::{Board, BoardError, Score, Tile, MAX_EXPONENT, MAX_TILE};

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All four directions, in the order used by traces and branch evaluations.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Stable index of this direction in [`Move::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Move::Up => 0,
            Move::Down => 1,
            Move::Left => 2,
            Move::Right => 3,
        }
    }

    /// Inverse of [`Move::index`].
    #[inline]
    pub fn from_index(idx: usize) -> Option<Move> { Move::ALL.get(idx).copied() }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        };
        f.write_str(s)
    }
}

/// Start a game: an empty board with two tiles spawned, and a zero score.
pub fn new_game<R: Rng + ?Sized>(rng: &mut R) -> (Board, Score) {
    new_game_with(rng, SpawnPolicy::default())
}

/// Like [`new_game`] with an explicit spawn policy.
pub fn new_game_with<R: Rng + ?Sized>(rng: &mut R, policy: SpawnPolicy) -> (Board, Score) {
    let board = Board::EMPTY
        .with_random_tile_policy(rng, policy)
        .with_random_tile_policy(rng, policy);
    (board, 0)
}

/// Slide/merge tiles in `dir`, adding merge values to `score`. No randomness.
#[inline]
pub fn apply_move(board: Board, dir: Move, score: Score) -> MoveOutcome {
    let mut out = board.shift(dir);
    out.score += score;
    out
}

/// Insert a 2 or 4 into a uniformly chosen empty cell (default policy).
///
/// Call only after [`apply_move`] reported `moved`. A full board is returned unchanged.
#[inline]
pub fn spawn_tile<R: Rng + ?Sized>(board: Board, rng: &mut R) -> Board { board.with_random_tile(rng) }

/// True iff the board is full and no adjacent pair can merge.
#[inline]
pub fn is_terminal(board: Board) -> bool { board.is_full() && !board.has_available_merge() }
