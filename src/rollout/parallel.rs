use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use rayon::prelude::*;

use crate::engine::{Board, Move};

use super::{run_batch, BranchEval, MovePolicy, RolloutConfig, RolloutStats, Tally};

/// Samples handed to one rayon task.
pub const DEFAULT_CHUNK: u64 = 4_096;

const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Parallel rollouts using rayon.
///
/// The budget is cut into fixed-size chunks. Each chunk gets its own
/// `StdRng`, seeded from one draw of the caller's RNG plus the chunk index,
/// so results do not depend on the thread count. Chunks are reduced by
/// (higher evaluation, then earlier global sample index), which keeps the
/// first-sampled-wins tie rule.
#[derive(Debug, Clone)]
pub struct RolloutAgentParallel {
    cfg: RolloutConfig,
    chunk: u64,
    stats: RolloutStats,
}

impl Default for RolloutAgentParallel {
    fn default() -> Self { Self::new() }
}

impl RolloutAgentParallel {
    pub fn new() -> Self { Self::with_config(RolloutConfig::default()) }

    pub fn with_config(cfg: RolloutConfig) -> Self { Self { cfg, chunk: DEFAULT_CHUNK, stats: RolloutStats::default() } }

    /// Override the chunk size (minimum 1).
    pub fn with_chunk(mut self, chunk: u64) -> Self {
        self.chunk = chunk.max(1);
        self
    }

    #[inline]
    pub fn config(&self) -> &RolloutConfig { &self.cfg }

    /// Compute the best move from parallel rollouts.
    ///
    /// ```
    /// use rollout_2048::engine::{Board, Move};
    /// use rollout_2048::rollout::{RolloutAgentParallel, RolloutConfig};
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let b = Board::from_rows([[0; 4], [0; 4], [0; 4], [2, 4, 8, 16]]).unwrap();
    /// let mut agent = RolloutAgentParallel::with_config(RolloutConfig { iterations: 1_000, ..Default::default() });
    /// assert_eq!(agent.best_move(b, &mut StdRng::seed_from_u64(1)), Some(Move::Up));
    /// ```
    pub fn best_move<R: Rng + ?Sized>(&mut self, board: Board, rng: &mut R) -> Option<Move> {
        let tally = self.run(board, rng);
        tally.log_decision("rollout-par");
        self.stats = tally.stats;
        tally.best.map(|b| b.dir)
    }

    /// Per-direction results, in order `[Up, Down, Left, Right]`.
    pub fn branch_evals<R: Rng + ?Sized>(&mut self, board: Board, rng: &mut R) -> [BranchEval; 4] {
        let tally = self.run(board, rng);
        self.stats = tally.stats;
        tally.branches
    }

    #[inline]
    pub fn last_stats(&self) -> RolloutStats { self.stats }

    fn run<R: Rng + ?Sized>(&self, board: Board, rng: &mut R) -> Tally {
        let base: u64 = rng.gen();
        let total = self.cfg.iterations;
        let chunk = self.chunk;
        let chunks = total.div_ceil(chunk);
        let cfg = &self.cfg;
        (0..chunks)
            .into_par_iter()
            .map(|k| {
                let first = k * chunk;
                let count = chunk.min(total - first);
                let mut chunk_rng = StdRng::seed_from_u64(base.wrapping_add(k.wrapping_mul(SEED_STRIDE)));
                run_batch(board, cfg, first, count, &mut chunk_rng)
            })
            .reduce(Tally::new, Tally::merge)
    }
}

impl MovePolicy for RolloutAgentParallel {
    fn choose_move(&mut self, board: Board, rng: &mut dyn RngCore) -> Option<Move> { self.best_move(board, rng) }

    fn name(&self) -> &str { "rollout-par" }
}
