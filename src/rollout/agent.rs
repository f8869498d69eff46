use rand::{Rng, RngCore};

use crate::engine::{Board, Move};

use super::{run_batch, BranchEval, MovePolicy, RolloutConfig, RolloutStats};

/// Single-threaded rollout policy.
///
/// Every decision runs the full iteration budget before returning. The
/// caller's board is never modified; each trial works on a copy.
#[derive(Debug, Clone, Default)]
pub struct RolloutAgent {
    cfg: RolloutConfig,
    stats: RolloutStats,
}

impl RolloutAgent {
    pub fn new() -> Self { Self::with_config(RolloutConfig::default()) }

    pub fn with_config(cfg: RolloutConfig) -> Self { Self { cfg, stats: RolloutStats::default() } }

    /// Shorthand for a default config with `iterations` samples.
    pub fn with_iterations(iterations: u64) -> Self {
        Self::with_config(RolloutConfig { iterations, ..Default::default() })
    }

    #[inline]
    pub fn config(&self) -> &RolloutConfig { &self.cfg }

    /// Pick the best sampled direction, or `None` if every sample was illegal.
    ///
    /// Example
    /// ```
    /// use rollout_2048::engine::{Board, Move};
    /// use rollout_2048::rollout::RolloutAgent;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(7);
    /// // Only Left and Right can merge the pair; Right puts the 4 further along.
    /// let b = Board::from_rows([
    ///     [2, 4, 2, 4],
    ///     [4, 2, 4, 2],
    ///     [2, 4, 2, 4],
    ///     [4, 2, 8, 8],
    /// ]).unwrap();
    /// let mut agent = RolloutAgent::with_iterations(200);
    /// assert_eq!(agent.best_move(b, &mut rng), Some(Move::Right));
    /// ```
    pub fn best_move<R: Rng + ?Sized>(&mut self, board: Board, rng: &mut R) -> Option<Move> {
        let tally = run_batch(board, &self.cfg, 0, self.cfg.iterations, rng);
        tally.log_decision("rollout");
        self.stats = tally.stats;
        tally.best.map(|b| b.dir)
    }

    /// Run one decision's worth of samples and report every direction.
    ///
    /// Returns a fixed array in order `[Up, Down, Left, Right]`.
    pub fn branch_evals<R: Rng + ?Sized>(&mut self, board: Board, rng: &mut R) -> [BranchEval; 4] {
        let tally = run_batch(board, &self.cfg, 0, self.cfg.iterations, rng);
        self.stats = tally.stats;
        tally.branches
    }

    /// Statistics from the last call to [`Self::best_move`] or [`Self::branch_evals`].
    #[inline]
    pub fn last_stats(&self) -> RolloutStats { self.stats }
}

impl MovePolicy for RolloutAgent {
    fn choose_move(&mut self, board: Board, rng: &mut dyn RngCore) -> Option<Move> { self.best_move(board, rng) }

    fn name(&self) -> &str { "rollout" }
}
