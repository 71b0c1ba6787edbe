//! A lazily-built graph over candidate `(slot, word)` nodes whose edges
//! encode pairwise compatibility: different slots, and no disagreement on any
//! shared cell.

use std::collections::{BTreeMap, HashMap};

use bit_set::BitSet;
use log::debug;

use crate::error::{CrosswordError, Result};
use crate::puzzle::Puzzle;
use crate::types::{NodeId, SlotId};

/// Default cap on the number of candidate nodes a single graph may contain,
/// above which construction fails with [`CrosswordError::CapacityExceeded`]
/// rather than building a graph with edge counts in the billions.
pub const DEFAULT_NODE_CAP: usize = 200_000;

/// A candidate answer for a slot: which slot, and which word.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateNode {
    pub slot: SlotId,
    pub word: String,
}

/// The compatibility graph for one puzzle/candidate-set pair. Scoped to a
/// single solver invocation.
#[derive(Debug, Clone)]
pub struct CompatibilityGraph {
    nodes: Vec<CandidateNode>,
    /// Per-node conflict set: ids of nodes that CANNOT be played alongside
    /// this one. Neighbors are the complement of this set within the node
    /// universe.
    conflicts: Vec<BitSet>,
}

impl CompatibilityGraph {
    /// Build a graph from a puzzle and a map from slot to its candidate
    /// words. Only candidates with a length matching their slot are
    /// considered (others are silently dropped — they can never be played).
    pub fn build(puzzle: &Puzzle, candidates: &BTreeMap<SlotId, Vec<String>>) -> Result<Self> {
        Self::build_with_cap(puzzle, candidates, DEFAULT_NODE_CAP)
    }

    pub fn build_with_cap(puzzle: &Puzzle, candidates: &BTreeMap<SlotId, Vec<String>>, cap: usize) -> Result<Self> {
        let mut nodes = Vec::new();
        // Range of node ids used by each slot, for same-slot conflicts and
        // for indexing per-position letters during crossing checks.
        let mut slot_node_range: HashMap<SlotId, (usize, usize)> = HashMap::new();

        for slot in puzzle.slots() {
            let Some(words) = candidates.get(&slot.id) else {
                continue;
            };
            let start = nodes.len();
            for word in words {
                if word.chars().count() != slot.len() {
                    continue;
                }
                nodes.push(CandidateNode {
                    slot: slot.id,
                    word: word.clone(),
                });
            }
            if nodes.len() > start {
                slot_node_range.insert(slot.id, (start, nodes.len()));
            }
        }

        if nodes.len() > cap {
            return Err(CrosswordError::CapacityExceeded {
                actual: nodes.len(),
                cap,
            });
        }

        let n = nodes.len();
        let mut conflicts: Vec<BitSet> = (0..n).map(|_| BitSet::with_capacity(n)).collect();

        // Same-slot candidates always conflict with each other.
        for &(start, end) in slot_node_range.values() {
            for i in start..end {
                for j in start..end {
                    if i != j {
                        conflicts[i].insert(j);
                    }
                }
            }
        }

        // Cross-slot conflicts: only need to examine pairs of slots that
        // actually share a cell.
        for (slot_a, &(start_a, end_a)) in &slot_node_range {
            let slot_a_ref = puzzle.slot(*slot_a).expect("slot referenced by candidates must exist");
            for (pos_a, &cell_idx) in slot_a_ref.cell_indices.iter().enumerate() {
                let Some(slot_b_ref) = puzzle.crossing(slot_a_ref, pos_a) else {
                    continue;
                };
                if slot_b_ref.id <= *slot_a {
                    // Each crossing pair is handled once, from the
                    // lexicographically-smaller slot id's side.
                    continue;
                }
                let Some(&(start_b, end_b)) = slot_node_range.get(&slot_b_ref.id) else {
                    continue;
                };
                let pos_b = slot_b_ref
                    .cell_indices
                    .iter()
                    .position(|&c| c == cell_idx)
                    .expect("crossing cell must be present in both slots");

                for i in start_a..end_a {
                    let letter_a = nodes[i].word.chars().nth(pos_a).unwrap();
                    for j in start_b..end_b {
                        let letter_b = nodes[j].word.chars().nth(pos_b).unwrap();
                        if letter_a != letter_b {
                            conflicts[i].insert(j);
                            conflicts[j].insert(i);
                        }
                    }
                }
            }
        }

        debug!(
            "built compatibility graph: {} nodes, {} slots with candidates",
            n,
            slot_node_range.len()
        );

        Ok(CompatibilityGraph { nodes, conflicts })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &CandidateNode {
        &self.nodes[id]
    }

    #[must_use]
    pub fn conflicts(&self, id: NodeId) -> &BitSet {
        &self.conflicts[id]
    }

    /// All node ids not in conflict with `id` (excluding `id` itself).
    #[must_use]
    pub fn neighbors(&self, id: NodeId) -> BitSet {
        let mut all = BitSet::with_capacity(self.nodes.len());
        for i in 0..self.nodes.len() {
            all.insert(i);
        }
        all.difference_with(&self.conflicts[id]);
        all.remove(id);
        all
    }

    #[must_use]
    pub fn edge_exists(&self, u: NodeId, v: NodeId) -> bool {
        u != v && !self.conflicts[u].contains(v)
    }
}
