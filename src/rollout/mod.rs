//! Monte-Carlo rollout move picker for 2048.
//!
//! This module provides two policy implementations:
//! - [`RolloutAgent`]: single-threaded rollouts.
//! - [`RolloutAgentParallel`]: rayon-based rollouts over the same budget.
//!
//! Each rollout samples a direction uniformly at random, applies it to a
//! scratch copy of the board and scores the result with [`evaluate`].
//! Illegal samples are wasted. The best-scoring direction wins; ties keep
//! the direction sampled first.
//!
//! Quick start
//! ```
//! use rollout_2048::engine::Board;
//! use rollout_2048::rollout::{RolloutAgent, RolloutConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! let b0 = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//!
//! let mut agent = RolloutAgent::with_config(RolloutConfig { iterations: 500, ..Default::default() });
//! assert!(agent.best_move(b0, &mut rng).is_some());
//! ```

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::engine::{Board, Move};

mod agent;
mod evaluator;
mod parallel;

pub use agent::RolloutAgent;
pub use evaluator::{evaluate, evaluate_with, EvalWeights};
pub use parallel::RolloutAgentParallel;

/// Default rollouts per decision.
pub const DEFAULT_ITERATIONS: u64 = 100_000;

/// A move-selection strategy the turn driver can plug in.
pub trait MovePolicy {
    /// Pick a direction for `board`, or `None` when no sampled move was legal.
    fn choose_move(&mut self, board: Board, rng: &mut dyn RngCore) -> Option<Move>;

    fn name(&self) -> &str;
}

/// Configurable knobs for rollouts.
///
/// - `iterations`: number of random samples per decision.
/// - `weights`: evaluation weights.
/// - `cache_outcomes`: evaluate each direction once per decision and reuse it
///   for later samples. Moves are deterministic, so decisions do not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutConfig {
    pub iterations: u64,
    pub weights: EvalWeights,
    pub cache_outcomes: bool,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self { iterations: DEFAULT_ITERATIONS, weights: EvalWeights::default(), cache_outcomes: false }
    }
}

/// Per-direction summary of one decision.
///
/// - `ev` is the best evaluation seen for `dir` (0.0 when never legal).
/// - `legal` is false when no sample of `dir` moved the board.
/// - `samples` counts how often `dir` was drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchEval {
    pub dir: Move,
    pub ev: f64,
    pub legal: bool,
    pub samples: u64,
}

/// Counters for a single decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RolloutStats {
    pub trials: u64,
    pub legal_trials: u64,
    /// Draws per direction, indexed like [`Move::ALL`].
    pub samples: [u64; 4],
}

/// Pick a move with a default [`RolloutAgent`].
#[inline]
pub fn choose_move<R: Rng + ?Sized>(board: Board, rng: &mut R) -> Option<Move> {
    RolloutAgent::new().best_move(board, rng)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Best {
    dir: Move,
    value: f64,
    sample: u64,
}

impl Best {
    /// Higher value wins; equal values keep the earlier sample.
    #[inline]
    fn beats(&self, other: &Best) -> bool {
        self.value > other.value || (self.value == other.value && self.sample < other.sample)
    }
}

/// Running result of a batch of rollouts.
#[derive(Debug, Clone)]
struct Tally {
    best: Option<Best>,
    branches: [BranchEval; 4],
    stats: RolloutStats,
}

impl Tally {
    fn new() -> Self {
        let branch = |dir| BranchEval { dir, ev: 0.0, legal: false, samples: 0 };
        Self {
            best: None,
            branches: Move::ALL.map(branch),
            stats: RolloutStats::default(),
        }
    }

    /// Record sample number `sample`; `value` is `None` when the move was illegal.
    fn record(&mut self, sample: u64, dir: Move, value: Option<f64>) {
        let i = dir.index();
        self.stats.trials += 1;
        self.stats.samples[i] += 1;
        self.branches[i].samples += 1;
        let Some(value) = value else { return };
        self.stats.legal_trials += 1;
        let branch = &mut self.branches[i];
        if !branch.legal || value > branch.ev {
            branch.ev = value;
        }
        branch.legal = true;
        let cand = Best { dir, value, sample };
        if self.best.map_or(true, |b| cand.beats(&b)) {
            self.best = Some(cand);
        }
    }

    /// Combine two disjoint batches.
    fn merge(mut self, other: Tally) -> Tally {
        self.best = match (self.best, other.best) {
            (Some(a), Some(b)) => Some(if b.beats(&a) { b } else { a }),
            (a, b) => a.or(b),
        };
        for (mine, theirs) in self.branches.iter_mut().zip(other.branches.iter()) {
            if theirs.legal && (!mine.legal || theirs.ev > mine.ev) {
                mine.ev = theirs.ev;
            }
            mine.legal |= theirs.legal;
            mine.samples += theirs.samples;
        }
        self.stats.trials += other.stats.trials;
        self.stats.legal_trials += other.stats.legal_trials;
        for (a, b) in self.stats.samples.iter_mut().zip(other.stats.samples) {
            *a += b;
        }
        self
    }

    fn log_decision(&self, policy: &str) {
        match self.best {
            Some(b) => log::debug!(
                "{policy}: {} trials, {} legal, picked {} ({:.1})",
                self.stats.trials, self.stats.legal_trials, b.dir, b.value
            ),
            None => log::debug!("{policy}: {} trials, no legal move", self.stats.trials),
        }
    }
}

/// Evaluations of each direction for one board, filled lazily.
struct OutcomeCache([Option<Option<f64>>; 4]);

impl OutcomeCache {
    fn new() -> Self { Self([None; 4]) }

    fn get_or_eval(&mut self, board: Board, dir: Move, weights: &EvalWeights) -> Option<f64> {
        *self.0[dir.index()].get_or_insert_with(|| rollout(board, dir, weights))
    }
}

/// One trial: apply `dir` to a copy of `board` and score it if it moved.
#[inline]
fn rollout(board: Board, dir: Move, weights: &EvalWeights) -> Option<f64> {
    let out = board.shift(dir);
    out.moved.then(|| evaluate_with(out.board, weights))
}

/// Run samples `first..first + count` on `board`.
fn run_batch<R: Rng + ?Sized>(board: Board, cfg: &RolloutConfig, first: u64, count: u64, rng: &mut R) -> Tally {
    let mut tally = Tally::new();
    let mut cache = OutcomeCache::new();
    for sample in first..first + count {
        let dir = Move::ALL[rng.gen_range(0..Move::ALL.len())];
        let value = if cfg.cache_outcomes {
            cache.get_or_eval(board, dir, &cfg.weights)
        } else {
            rollout(board, dir, &cfg.weights)
        };
        tally.record(sample, dir, value);
    }
    tally
}
