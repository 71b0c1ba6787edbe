//! The multi-stage composition operator: chains an ordered list of solvers,
//! feeding each stage's output puzzle into the next, and taking the
//! left-to-right Cartesian product of their scores.

use log::info;

use crate::error::{CrosswordError, Result};
use crate::puzzle::Puzzle;

use super::{SolveStream, Solver};

/// Composes `solvers` left-to-right: for each `(p_1, P_1)` the first solver
/// emits, runs the second solver on `P_1` and so on, yielding
/// `(p_1 * p_2 * ... * p_k, P_k)` for every depth-first path through the
/// stages. A stage that emits nothing for a given input puzzle prunes that
/// whole branch (skipped, not an error).
pub struct MultiStageSolver<'a> {
    solvers: Vec<Box<dyn Solver + 'a>>,
}

impl<'a> MultiStageSolver<'a> {
    /// Fails with [`CrosswordError::ConfigurationError`] if `solvers` is
    /// empty — an empty pipeline has no defined semantics.
    pub fn new(solvers: Vec<Box<dyn Solver + 'a>>) -> Result<Self> {
        if solvers.is_empty() {
            return Err(CrosswordError::ConfigurationError("MultiStageSolver requires at least one stage".to_string()));
        }
        Ok(MultiStageSolver { solvers })
    }
}

impl<'a> Solver for MultiStageSolver<'a> {
    fn solve<'s>(&'s self, puzzle: Puzzle) -> SolveStream<'s> {
        info!("multistage solver: running {} stage(s)", self.solvers.len());
        depth_first_product(&self.solvers, 0, 1.0, puzzle)
    }
}

/// Depth-first walk over `solvers[stage..]`: at each level, pull the current
/// stage's stream and recurse into the remainder for each item it produces,
/// multiplying scores along the way. Expressed recursively (rather than
/// buffering a literal Cartesian product) so memory use tracks the current
/// path's depth, not the product's total size.
fn depth_first_product<'s>(solvers: &'s [Box<dyn Solver + 's>], stage: usize, score_so_far: f64, puzzle: Puzzle) -> SolveStream<'s> {
    if stage == solvers.len() {
        return Box::new(std::iter::once((score_so_far, puzzle)));
    }

    let stage_stream = solvers[stage].solve(puzzle);
    Box::new(stage_stream.flat_map(move |(stage_score, stage_puzzle)| {
        depth_first_product(solvers, stage + 1, score_so_far * stage_score, stage_puzzle)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::Slot;
    use crate::types::{Direction, SlotId};

    /// A solver stub that emits a fixed number of (score, puzzle) copies,
    /// ignoring its input beyond cloning it.
    struct FixedCountSolver {
        count: usize,
    }

    impl Solver for FixedCountSolver {
        fn solve<'s>(&'s self, puzzle: Puzzle) -> SolveStream<'s> {
            let results: Vec<(f64, Puzzle)> = (0..self.count).map(|_| (1.0, puzzle.copy())).collect();
            Box::new(results.into_iter())
        }
    }

    fn trivial_puzzle() -> Puzzle {
        let across = Slot::new(SlotId::new(1, Direction::Across), "x", vec![0, 1, 2]);
        Puzzle::new(3, 1, vec![across], None).unwrap()
    }

    #[test]
    fn product_size_multiplies() {
        let solvers: Vec<Box<dyn Solver>> = vec![Box::new(FixedCountSolver { count: 2 }), Box::new(FixedCountSolver { count: 3 })];
        let multi = MultiStageSolver::new(solvers).unwrap();
        let results: Vec<(f64, Puzzle)> = multi.solve(trivial_puzzle()).collect();
        assert_eq!(results.len(), 6);
    }

    #[test]
    fn empty_solver_list_is_a_configuration_error() {
        let solvers: Vec<Box<dyn Solver>> = Vec::new();
        let err = MultiStageSolver::new(solvers).unwrap_err();
        assert!(matches!(err, CrosswordError::ConfigurationError(_)));
    }

    #[test]
    fn a_stage_that_emits_nothing_prunes_the_branch() {
        struct EmptySolver;
        impl Solver for EmptySolver {
            fn solve<'s>(&'s self, _puzzle: Puzzle) -> SolveStream<'s> {
                Box::new(std::iter::empty())
            }
        }

        let solvers: Vec<Box<dyn Solver>> = vec![Box::new(FixedCountSolver { count: 2 }), Box::new(EmptySolver)];
        let multi = MultiStageSolver::new(solvers).unwrap();
        let results: Vec<(f64, Puzzle)> = multi.solve(trivial_puzzle()).collect();
        assert!(results.is_empty());
    }
}
