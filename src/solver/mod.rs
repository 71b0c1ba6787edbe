//! The solver family: clique enumeration, greedy minimum-entropy filling,
//! Monte Carlo annealing, and the multi-stage composition operator. All four
//! share the same `Solver` contract: given a starting [`Puzzle`], produce a
//! lazy stream of `(score, Puzzle)` pairs, score higher-is-better.

pub mod annealer;
pub mod clique;
pub mod config;
pub mod greedy;
pub mod multistage;

use std::collections::BTreeMap;

use crate::puzzle::Puzzle;
use crate::types::SlotId;

pub use config::{benchmark_score, SolverConfig};

/// A stream of candidate solutions, most to least interesting in the order
/// the solver happens to produce them (not necessarily sorted by score —
/// that's [`crate::ranking::top_n`]'s job).
pub type SolveStream<'s> = Box<dyn Iterator<Item = (f64, Puzzle)> + 's>;

/// Common contract for every solver variant.
pub trait Solver {
    fn solve<'s>(&'s self, puzzle: Puzzle) -> SolveStream<'s>;
}

/// Produces the per-slot candidate answer sets a [`clique::CliqueSolver`]
/// builds its compatibility graph from, and that [`greedy::GreedyMinimumEntropySolver`]
/// and [`annealer::MonteCarloAnnealer`] consume directly. The two concrete
/// sources are lexicon-backed (pattern lookup) and historical-index-backed
/// (fuzzy clue search); see [`clique::LexiconAnswerSource`] and
/// [`clique::HistoricalAnswerSource`].
///
/// A `BTreeMap` (rather than a hash map) keeps slot iteration order a pure
/// function of slot id, not of the process's randomized hasher seed — moves
/// and candidate orderings downstream of this need to stay deterministic
/// given a fixed RNG seed, per §5.
pub trait AnswerSource {
    fn query_answers(&self, puzzle: &Puzzle) -> BTreeMap<SlotId, Vec<String>>;
}
