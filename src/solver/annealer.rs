//! The Monte Carlo / simulated-annealing solver: Metropolis-Hastings
//! acceptance over a sequence of random moves (assign or erase a random
//! slot), following an exponentially-decaying temperature schedule.

use log::{debug, info};
use rand::Rng;

use crate::puzzle::Puzzle;
use crate::types::SlotId;

use super::{AnswerSource, SolveStream, Solver};

/// A single Monte Carlo move: mutates a copy of the puzzle in place.
/// `assign_random_slot` and `erase_random_slot` are the two defaults §4.5
/// names; callers may supply others.
pub type Move<S> = fn(&mut Puzzle, &S, &mut dyn MoveRng) -> ();

/// Narrow, object-safe RNG trait so [`Move`] can be a plain `fn` pointer
/// without threading a generic RNG type parameter through it.
pub trait MoveRng {
    fn gen_range_usize(&mut self, upper: usize) -> usize;
    fn gen_f64(&mut self) -> f64;
}

impl<R: Rng> MoveRng for R {
    fn gen_range_usize(&mut self, upper: usize) -> usize {
        self.gen_range(0..upper)
    }

    fn gen_f64(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Pick a random slot that has at least one candidate, and assign it a
/// random candidate, overwriting any conflicting letters by erasing the
/// slot first.
pub fn assign_random_slot<S: AnswerSource>(puzzle: &mut Puzzle, source: &S, rng: &mut dyn MoveRng) {
    let candidates = source.query_answers(puzzle);
    if candidates.is_empty() {
        return;
    }
    let slot_ids: Vec<SlotId> = candidates.keys().copied().collect();
    let slot_id = slot_ids[rng.gen_range_usize(slot_ids.len())];
    let words = &candidates[&slot_id];
    let word = &words[rng.gen_range_usize(words.len())];

    let slot = puzzle.slot(slot_id).expect("slot id from query_answers must exist").clone();
    puzzle.erase_fill(&slot);
    let _ = puzzle.set_fill(&slot, word);
}

/// Pick a random slot (regardless of candidates) and erase its fill.
pub fn erase_random_slot<S: AnswerSource>(puzzle: &mut Puzzle, _source: &S, rng: &mut dyn MoveRng) {
    let slots = puzzle.slots().to_vec();
    if slots.is_empty() {
        return;
    }
    let slot = &slots[rng.gen_range_usize(slots.len())];
    puzzle.erase_fill(slot);
}

/// Exponential-decay temperature schedule `T_i = T_0 * exp(-alpha * i)` for
/// `i` in `0..steps`.
#[must_use]
pub fn exponential_schedule(t0: f64, alpha: f64, steps: usize) -> Vec<f64> {
    (0..steps).map(|i| t0 * (-alpha * i as f64).exp()).collect()
}

/// Metropolis-Hastings annealer over a sequence of candidate-generating
/// moves. Energy is `-n_set` (lower is better, i.e. more cells filled).
pub struct MonteCarloAnnealer<S: AnswerSource, R: Rng> {
    pub answer_source: S,
    pub moves: Vec<Move<S>>,
    pub schedule: Vec<f64>,
    pub rng: std::cell::RefCell<R>,
}

impl<S: AnswerSource, R: Rng> MonteCarloAnnealer<S, R> {
    #[must_use]
    pub fn new(answer_source: S, moves: Vec<Move<S>>, schedule: Vec<f64>, rng: R) -> Self {
        MonteCarloAnnealer {
            answer_source,
            moves,
            schedule,
            rng: std::cell::RefCell::new(rng),
        }
    }

    fn energy(puzzle: &Puzzle) -> f64 {
        -(puzzle.n_set() as f64)
    }
}

impl<S: AnswerSource, R: Rng> Solver for MonteCarloAnnealer<S, R> {
    fn solve<'s>(&'s self, puzzle: Puzzle) -> SolveStream<'s> {
        if self.moves.is_empty() || self.schedule.is_empty() {
            return Box::new(std::iter::once((puzzle.n_set() as f64, puzzle)));
        }

        Box::new(AnnealStream {
            annealer: self,
            current: Some(puzzle),
            step: 0,
        })
    }
}

/// Drives one Metropolis-Hastings step per `next()` call instead of running
/// the whole schedule up front, so a consumer that stops early (`top_n`'s
/// `max_examined`, or just dropping the stream) leaves the remaining steps
/// un-run.
struct AnnealStream<'s, S: AnswerSource, R: Rng> {
    annealer: &'s MonteCarloAnnealer<S, R>,
    /// `None` only once the final extra emission (past the schedule) has
    /// already gone out, so the stream then fuses to `None`.
    current: Option<Puzzle>,
    step: usize,
}

impl<'s, S: AnswerSource, R: Rng> Iterator for AnnealStream<'s, S, R> {
    type Item = (f64, Puzzle);

    fn next(&mut self) -> Option<Self::Item> {
        let schedule = &self.annealer.schedule;
        if self.step >= schedule.len() {
            let current = self.current.take()?;
            info!("annealer: finished with {} cells set", current.n_set());
            return Some((current.n_set() as f64, current));
        }

        let temperature = schedule[self.step];
        self.step += 1;

        let current = self.current.as_ref().expect("current set until the final emission");
        let mut rng = self.annealer.rng.borrow_mut();
        let move_fn = self.annealer.moves[rng.gen_range_usize(self.annealer.moves.len())];

        let energy_before = MonteCarloAnnealer::<S, R>::energy(current);
        let mut candidate = current.copy();
        move_fn(&mut candidate, &self.annealer.answer_source, &mut *rng);
        let energy_after = MonteCarloAnnealer::<S, R>::energy(&candidate);

        let delta = energy_after - energy_before;
        let accept_probability = if delta <= 0.0 { 1.0 } else { (-delta / temperature).exp() };
        let accepted = rng.gen_f64() < accept_probability;
        drop(rng);

        debug!("annealer: T={temperature:.3} dE={delta:.3} p={accept_probability:.3} accepted={accepted}");
        if accepted {
            self.current = Some(candidate);
        }

        let current = self.current.as_ref().expect("current set until the final emission");
        Some((current.n_set() as f64, current.copy()))
    }
}
