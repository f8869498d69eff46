use rand::Rng;
use serde::{Deserialize, Serialize};

use super::shift::MoveOutcome;
use super::state::{Board, Tile};
use super::Move;

/// How often a spawned tile is a 4 instead of a 2.
///
/// The default is [`SpawnPolicy::EVEN`] (a fair coin).
/// [`SpawnPolicy::CLASSIC`] is the usual 90/10 rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPolicy {
    four_chance: f64,
}

impl SpawnPolicy {
    pub const EVEN: SpawnPolicy = SpawnPolicy { four_chance: 0.5 };
    pub const CLASSIC: SpawnPolicy = SpawnPolicy { four_chance: 0.1 };

    /// Policy spawning a 4 with probability `four_chance` (clamped to `[0, 1]`; NaN counts as 0).
    pub fn new(four_chance: f64) -> Self {
        let four_chance = if four_chance.is_nan() { 0.0 } else { four_chance.clamp(0.0, 1.0) };
        SpawnPolicy { four_chance }
    }

    #[inline]
    pub fn four_chance(&self) -> f64 { self.four_chance }

    #[inline]
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Tile { if rng.gen_bool(self.four_chance) { 4 } else { 2 } }
}

impl Default for SpawnPolicy {
    fn default() -> Self { SpawnPolicy::EVEN }
}

impl Board {
    /// Insert a random tile into a uniformly chosen empty cell using the default policy.
    ///
    /// ```
    /// use rollout_2048::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    #[inline]
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        self.with_random_tile_policy(rng, SpawnPolicy::default())
    }

    /// Insert a random tile chosen by `policy`. A full board is returned unchanged.
    pub fn with_random_tile_policy<R: Rng + ?Sized>(self, rng: &mut R, policy: SpawnPolicy) -> Self {
        let empty = self.empty_cells();
        if empty.is_empty() {
            return self;
        }
        let (row, col) = empty[rng.gen_range(0..empty.len())];
        let tile = policy.draw(rng);
        log::trace!("spawn {tile} at ({row}, {col})");
        let mut next = self;
        next.set(row, col, tile);
        next
    }

    /// Perform a move, then insert a random tile if the move changed the board.
    ///
    /// The outcome's `score` is what the move gained.
    #[inline]
    pub fn make_move<R: Rng + ?Sized>(self, dir: Move, rng: &mut R, policy: SpawnPolicy) -> MoveOutcome {
        let mut out = self.shift(dir);
        if out.moved {
            out.board = out.board.with_random_tile_policy(rng, policy);
        }
        out
    }
}
