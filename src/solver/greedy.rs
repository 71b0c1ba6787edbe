//! The greedy minimum-entropy solver: repeatedly fills in the slot with the
//! fewest remaining candidates, picking one at random, until no slot has any
//! candidates left.

use log::{debug, info};
use rand::Rng;

use crate::puzzle::Puzzle;

use super::{AnswerSource, SolveStream, Solver};

/// Fills slots one at a time, always choosing the most-constrained
/// (fewest-candidate) slot next — the idea being that the slot with the
/// least freedom is the one most likely to go wrong if left for later.
/// Ties are broken by the smallest [`crate::types::SlotId`] for a stable,
/// reproducible choice.
pub struct GreedyMinimumEntropySolver<S: AnswerSource, R: Rng> {
    pub answer_source: S,
    pub rng: std::cell::RefCell<R>,
}

impl<S: AnswerSource, R: Rng> GreedyMinimumEntropySolver<S, R> {
    pub fn new(answer_source: S, rng: R) -> Self {
        GreedyMinimumEntropySolver {
            answer_source,
            rng: std::cell::RefCell::new(rng),
        }
    }
}

impl<S: AnswerSource, R: Rng> Solver for GreedyMinimumEntropySolver<S, R> {
    fn solve<'s>(&'s self, puzzle: Puzzle) -> SolveStream<'s> {
        let mut puzzle = puzzle;

        loop {
            let candidates = self.answer_source.query_answers(&puzzle);
            if candidates.is_empty() {
                break;
            }

            let chosen_slot_id = candidates
                .keys()
                .min_by_key(|id| (candidates[*id].len(), **id))
                .copied()
                .expect("candidates is non-empty");

            let words = &candidates[&chosen_slot_id];
            let idx = self.rng.borrow_mut().gen_range(0..words.len());
            let word = words[idx].clone();

            let slot = puzzle
                .slot(chosen_slot_id)
                .expect("slot id from query_answers must exist in the puzzle")
                .clone();
            debug!("greedy solver: filling {chosen_slot_id} with {word} ({} candidates)", words.len());
            if puzzle.set_fill(&slot, &word).is_err() {
                // The candidate source promised this was conflict-free; if
                // it wasn't (a buggy AnswerSource), stop rather than loop.
                break;
            }
        }

        info!("greedy solver: finished with {} cells set", puzzle.n_set());
        Box::new(std::iter::once((puzzle.n_set() as f64, puzzle)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use crate::puzzle::Slot;
    use crate::solver::clique::LexiconAnswerSource;
    use crate::types::{Direction, SlotId};
    use rand::SeedableRng;

    #[test]
    fn fills_until_no_candidates_remain() {
        let mut lex = Lexicon::new();
        for w in ["CAT", "CAR", "COT", "AA", "AR"] {
            lex.add(w);
        }
        let across = Slot::new(SlotId::new(1, Direction::Across), "x", vec![0, 1, 2]);
        let down0 = Slot::new(SlotId::new(1, Direction::Down), "y", vec![0, 3]);
        let puzzle = Puzzle::new(2, 2, vec![across, down0], None).unwrap();

        let rng = rand::rngs::SmallRng::seed_from_u64(42);
        let solver = GreedyMinimumEntropySolver::new(LexiconAnswerSource { lexicon: &lex }, rng);
        let mut results: Vec<(f64, Puzzle)> = solver.solve(puzzle).collect();
        assert_eq!(results.len(), 1);
        let (_, solved) = results.pop().unwrap();
        assert!(solved.n_set() > 0);
    }

    #[test]
    fn no_candidates_emits_unfilled_puzzle() {
        let lex = Lexicon::new();
        let across = Slot::new(SlotId::new(1, Direction::Across), "x", vec![0, 1, 2]);
        let puzzle = Puzzle::new(3, 1, vec![across], None).unwrap();

        let rng = rand::rngs::SmallRng::seed_from_u64(1);
        let solver = GreedyMinimumEntropySolver::new(LexiconAnswerSource { lexicon: &lex }, rng);
        let results: Vec<(f64, Puzzle)> = solver.solve(puzzle).collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, 0.0);
    }
}
