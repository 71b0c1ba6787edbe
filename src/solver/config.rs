//! Driver-level configuration: how many solutions to keep, benchmark
//! scoring penalties, and the CLI's concurrency knob. Distinct from how an
//! individual solver is invoked — see [`crate::bin`] for how this is parsed
//! from the command line.

use crate::puzzle::Puzzle;
use crate::types::CellState;

#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub nsolutions: usize,
    pub empty_penalty: i64,
    pub incorrect_penalty: i64,
    pub nthreads: usize,
    pub max_examined: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            nsolutions: 1,
            empty_penalty: 1,
            incorrect_penalty: 1,
            nthreads: 1,
            max_examined: None,
        }
    }
}

/// Benchmark score against a known solution: `-(empty_penalty * n_empty +
/// incorrect_penalty * n_incorrect)`, i.e. zero for a perfect match, more
/// negative the further off a candidate fill is. Used to rank self-check
/// runs where a puzzle was loaded with its solution included.
#[must_use]
pub fn benchmark_score(candidate: &Puzzle, solution: &Puzzle, config: &SolverConfig) -> i64 {
    let mut empty = 0i64;
    let mut incorrect = 0i64;
    for idx in 0..candidate.width * candidate.height {
        match (candidate.cell(idx), solution.cell(idx)) {
            (CellState::Black, _) => {}
            (CellState::Empty, _) => empty += 1,
            (CellState::Letter(g), CellState::Letter(w)) if g != w => incorrect += 1,
            _ => {}
        }
    }
    -(config.empty_penalty * empty + config.incorrect_penalty * incorrect)
}
