//! The clique-enumeration solver: builds a [`CompatibilityGraph`] from a
//! candidate answer set, enumerates its maximal cliques with degeneracy-
//! ordered Bron-Kerbosch, and emits a filled [`Puzzle`] per clique.
//!
//! `CliqueSolver` is a template method: it's generic over an [`AnswerSource`]
//! that supplies `query_answers`, and the two concrete sources
//! ([`LexiconAnswerSource`], [`HistoricalAnswerSource`]) are the only thing
//! that differs between "search the dictionary" and "search past clues".

use std::collections::{BTreeMap, BTreeSet};

use bit_set::BitSet;
use log::{debug, info};

use crate::compatibility_graph::CompatibilityGraph;
use crate::error::Result;
use crate::historical_index::HistoricalIndex;
use crate::lexicon::Lexicon;
use crate::puzzle::Puzzle;
use crate::types::{CellState, SlotId};

use super::{AnswerSource, SolveStream, Solver};

/// Queries a [`Lexicon`] for each slot with at least one empty cell, using
/// the letters already filled in as a sparse pattern constraint.
pub struct LexiconAnswerSource<'l> {
    pub lexicon: &'l Lexicon,
}

impl<'l> AnswerSource for LexiconAnswerSource<'l> {
    fn query_answers(&self, puzzle: &Puzzle) -> BTreeMap<SlotId, Vec<String>> {
        let mut answers = BTreeMap::new();
        for slot in puzzle.slots() {
            let fill = puzzle.get_fill(slot);
            if !fill.iter().any(CellState::is_empty) {
                continue;
            }
            let pattern: BTreeMap<usize, char> = fill
                .iter()
                .enumerate()
                .filter_map(|(i, c)| c.letter().map(|ch| (i, ch)))
                .collect();
            let words = self.lexicon.words(Some(slot.len()), &pattern);
            if !words.is_empty() {
                answers.insert(slot.id, words);
            }
        }
        answers
    }
}

/// Queries a [`HistoricalIndex`] for each slot's clue text using fuzzy
/// N-gram search, unioning length-matched answers across every clue that
/// clears `threshold`.
pub struct HistoricalAnswerSource<'h> {
    pub index: &'h HistoricalIndex,
    pub threshold: f64,
}

impl<'h> AnswerSource for HistoricalAnswerSource<'h> {
    fn query_answers(&self, puzzle: &Puzzle) -> BTreeMap<SlotId, Vec<String>> {
        let mut answers = BTreeMap::new();
        for slot in puzzle.slots() {
            // A `BTreeSet` rather than a hash set so the per-slot candidate
            // list comes out in a fixed (lexicographic) order regardless of
            // the process's hasher seed — the same determinism
            // `LexiconAnswerSource` already gets for free from `Lexicon::words`.
            let mut all_answers: BTreeSet<String> = BTreeSet::new();
            for (clue, _similarity) in self.index.search(&slot.clue_text, self.threshold) {
                if let Ok(matched) = self.index.answers(&clue, Some(slot.len())) {
                    all_answers.extend(matched);
                }
            }
            if !all_answers.is_empty() {
                answers.insert(slot.id, all_answers.into_iter().collect());
            }
        }
        answers
    }
}

/// One level of a Bron-Kerbosch-with-pivot call, reified as data instead of
/// a stack frame so the whole search can be driven one step at a time.
/// `p`/`x` are the same-named sets from the algorithm; `candidates` is `P
/// minus pivot's neighbors`, computed once, lazily, the first time this
/// frame is visited; `added_vertex` is the vertex pushed onto the shared `r`
/// stack to reach this frame (every frame corresponds to one recursive call,
/// and every recursive call is entered right after inserting a vertex into
/// `R`).
struct BkFrame {
    p: BitSet,
    x: BitSet,
    candidates: Vec<usize>,
    cand_pos: usize,
    candidates_ready: bool,
    added_vertex: usize,
}

/// A cursor over the maximal cliques of a [`CompatibilityGraph`], found by
/// Bron-Kerbosch with pivot selection over a degeneracy-ordered top level
/// (Eppstein/Löffler/Strash). Each call to [`Iterator::next`] resumes the
/// search exactly where the last call left off — no clique beyond the one
/// just returned is computed until the caller asks for it, so a consumer
/// that stops early (the ranker's `max_examined` cap, for instance) bounds
/// the actual search work, not just how many results get collected.
struct CliqueCursor {
    graph: CompatibilityGraph,
    order: Vec<usize>,
    order_pos: usize,
    p_all: BitSet,
    x_top: BitSet,
    r: Vec<usize>,
    frames: Vec<BkFrame>,
}

impl CliqueCursor {
    fn new(graph: CompatibilityGraph) -> Self {
        let n = graph.len();
        let order = degeneracy_order(&graph);
        let mut p_all = BitSet::with_capacity(n);
        for i in 0..n {
            p_all.insert(i);
        }
        CliqueCursor {
            graph,
            order,
            order_pos: 0,
            p_all,
            x_top: BitSet::with_capacity(n),
            r: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Advance the search until the next maximal clique is found, or the
    /// search is exhausted. Implements Bron-Kerbosch with pivoting and a
    /// degeneracy ordering exactly as the recursive formulation does, just
    /// flattened onto an explicit stack of [`BkFrame`]s so a single step can
    /// return in the middle of what would otherwise be a recursive call.
    fn advance(&mut self) -> Option<Vec<usize>> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                // No frame active: start the next top-level vertex from the
                // degeneracy order, if any remain.
                if self.order_pos >= self.order.len() {
                    return None;
                }
                let v = self.order[self.order_pos];
                self.order_pos += 1;

                let neighbors_v = self.graph.neighbors(v);
                let mut p = self.p_all.clone();
                p.intersect_with(&neighbors_v);
                let mut x = self.x_top.clone();
                x.intersect_with(&neighbors_v);

                self.r.push(v);
                self.frames.push(BkFrame {
                    p,
                    x,
                    candidates: Vec::new(),
                    cand_pos: 0,
                    candidates_ready: false,
                    added_vertex: v,
                });
                continue;
            };

            if !frame.candidates_ready {
                if frame.p.is_empty() && frame.x.is_empty() {
                    // Terminal: R is itself maximal. Emit it; this frame has
                    // no candidates to explore, so the next step pops it.
                    frame.candidates_ready = true;
                    let mut clique = self.r.clone();
                    clique.sort_unstable();
                    return Some(clique);
                }

                let pivot = frame.p.iter().next().or_else(|| frame.x.iter().next());
                let pivot_neighbors = pivot.map(|u| self.graph.neighbors(u)).unwrap_or_else(BitSet::new);
                let mut candidates = frame.p.clone();
                candidates.difference_with(&pivot_neighbors);
                frame.candidates = candidates.iter().collect();
                frame.cand_pos = 0;
                frame.candidates_ready = true;
            }

            if frame.cand_pos < frame.candidates.len() {
                let v = frame.candidates[frame.cand_pos];
                frame.cand_pos += 1;

                let neighbors_v = self.graph.neighbors(v);
                let mut p_next = frame.p.clone();
                p_next.intersect_with(&neighbors_v);
                let mut x_next = frame.x.clone();
                x_next.intersect_with(&neighbors_v);

                self.r.push(v);
                self.frames.push(BkFrame {
                    p: p_next,
                    x: x_next,
                    candidates: Vec::new(),
                    cand_pos: 0,
                    candidates_ready: false,
                    added_vertex: v,
                });
                continue;
            }

            // This frame is exhausted: unwind it, restoring `r` and
            // propagating `p.remove(v)` / `x.insert(v)` to whichever level
            // (a parent frame, or the top-level outer loop) spawned it.
            let finished = self.frames.pop().expect("frame active per the match above");
            self.r.pop();
            match self.frames.last_mut() {
                Some(parent) => {
                    parent.p.remove(finished.added_vertex);
                    parent.x.insert(finished.added_vertex);
                }
                None => {
                    self.p_all.remove(finished.added_vertex);
                    self.x_top.insert(finished.added_vertex);
                }
            }
        }
    }
}

/// Repeatedly remove a minimum-degree vertex, appending it to the order
/// list, then reverse: this bounds Bron-Kerbosch's branching factor by the
/// graph's degeneracy.
fn degeneracy_order(graph: &CompatibilityGraph) -> Vec<usize> {
    let n = graph.len();
    let mut degree: Vec<usize> = (0..n).map(|v| graph.neighbors(v).len()).collect();
    let mut removed = vec![false; n];
    let mut order = Vec::with_capacity(n);

    for _ in 0..n {
        let v = (0..n)
            .filter(|&i| !removed[i])
            .min_by_key(|&i| degree[i])
            .expect("at least one vertex remains");
        removed[v] = true;
        order.push(v);
        for u in graph.neighbors(v).iter() {
            if !removed[u] {
                degree[u] = degree[u].saturating_sub(1);
            }
        }
    }

    order.reverse();
    order
}

/// The clique-enumeration solver, parameterized over where candidate
/// answers come from.
pub struct CliqueSolver<S: AnswerSource> {
    pub answer_source: S,
    pub node_cap: usize,
}

impl<S: AnswerSource> CliqueSolver<S> {
    #[must_use]
    pub fn new(answer_source: S) -> Self {
        CliqueSolver {
            answer_source,
            node_cap: crate::compatibility_graph::DEFAULT_NODE_CAP,
        }
    }
}

impl<S: AnswerSource> Solver for CliqueSolver<S> {
    fn solve<'s>(&'s self, puzzle: Puzzle) -> SolveStream<'s> {
        let candidates = self.answer_source.query_answers(&puzzle);
        info!("clique solver: {} slots with candidates", candidates.len());

        let graph = match CompatibilityGraph::build_with_cap(&puzzle, &candidates, self.node_cap) {
            Ok(g) => g,
            Err(e) => {
                log::warn!("clique solver: failed to build compatibility graph: {e}");
                return Box::new(std::iter::empty());
            }
        };
        info!("clique solver: graph has {} nodes", graph.len());

        Box::new(CliqueStream {
            cursor: CliqueCursor::new(graph),
            template: puzzle,
        })
    }
}

/// Drives [`CliqueCursor`] one clique at a time and turns each into a
/// filled [`Puzzle`], so pulling one item from this stream does exactly one
/// unit of Bron-Kerbosch search work (plus applying the clique it found) —
/// nothing past what the caller actually asks for gets computed.
struct CliqueStream {
    cursor: CliqueCursor,
    template: Puzzle,
}

impl Iterator for CliqueStream {
    type Item = (f64, Puzzle);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let clique = self.cursor.advance()?;
            debug!("clique solver: emitting a clique of {} candidates", clique.len());
            match apply_clique(&self.template, &self.cursor.graph, &clique) {
                Ok(filled) => return Some((filled.n_set() as f64, filled)),
                // By construction a clique is pairwise conflict-free, so
                // this should never fail; if it somehow does, skip it
                // rather than fabricate a result.
                Err(_) => continue,
            }
        }
    }
}

fn apply_clique(puzzle: &Puzzle, graph: &CompatibilityGraph, clique: &[usize]) -> Result<Puzzle> {
    let mut filled = puzzle.copy();
    for &node_id in clique {
        let node = graph.node(node_id);
        let slot = filled.slot(node.slot).expect("clique node references a real slot").clone();
        filled.set_fill(&slot, &node.word)?;
    }
    Ok(filled)
}
