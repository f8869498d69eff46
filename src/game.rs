//! A single play session: the authoritative board, its score and the best
//! score seen across restarts.
//!
//! ```
//! use rollout_2048::game::Game;
//! use rollout_2048::engine::Move;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let mut game = Game::new(&mut rng);
//! for dir in [Move::Left, Move::Up, Move::Right, Move::Down] {
//!     game.play(dir, &mut rng);
//! }
//! assert!(game.best_score() >= game.score() || !game.is_over());
//! ```

use rand::Rng;

use crate::engine::{self, Board, Move, MoveOutcome, Score, SpawnPolicy};

#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    score: Score,
    best_score: Score,
    moves: u64,
    policy: SpawnPolicy,
}

impl Game {
    /// New game with two spawned tiles and the default spawn policy.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self { Self::with_policy(rng, SpawnPolicy::default()) }

    pub fn with_policy<R: Rng + ?Sized>(rng: &mut R, policy: SpawnPolicy) -> Self {
        let (board, score) = engine::new_game_with(rng, policy);
        Game { board, score, best_score: 0, moves: 0, policy }
    }

    /// Resume from an existing board and score.
    pub fn from_board(board: Board, score: Score, policy: SpawnPolicy) -> Self {
        Game { board, score, best_score: score, moves: 0, policy }
    }

    #[inline]
    pub fn board(&self) -> Board { self.board }

    #[inline]
    pub fn score(&self) -> Score { self.score }

    /// Highest final score of this session, including the current game once it ends.
    #[inline]
    pub fn best_score(&self) -> Score { self.best_score }

    /// Successful moves in the current game.
    #[inline]
    pub fn moves(&self) -> u64 { self.moves }

    #[inline]
    pub fn policy(&self) -> SpawnPolicy { self.policy }

    #[inline]
    pub fn is_over(&self) -> bool { engine::is_terminal(self.board) }

    /// Apply `dir`; on success spawn a tile and bump the move counter.
    ///
    /// The returned outcome carries the running score. An illegal move is a
    /// normal result with `moved == false` and nothing changes.
    pub fn play<R: Rng + ?Sized>(&mut self, dir: Move, rng: &mut R) -> MoveOutcome {
        let mut out = engine::apply_move(self.board, dir, self.score);
        if !out.moved {
            return out;
        }
        out.board = out.board.with_random_tile_policy(rng, self.policy);
        self.board = out.board;
        self.score = out.score;
        self.moves += 1;
        if self.is_over() {
            self.best_score = self.best_score.max(self.score);
            log::info!(
                "game over after {} moves: score {}, highest tile {}",
                self.moves,
                self.score,
                self.board.highest_tile()
            );
        }
        out
    }

    /// Start over with a fresh board. The best score is kept.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.best_score = self.best_score.max(self.score);
        let (board, score) = engine::new_game_with(rng, self.policy);
        self.board = board;
        self.score = score;
        self.moves = 0;
    }
}
