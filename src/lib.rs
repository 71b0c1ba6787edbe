//! `xwcore`: a candidate-answer search engine for American-style crossword
//! puzzles. Given a grid of white/black cells and a numbered clue list,
//! [`puzzle::Puzzle`] models the geometry and fill state; [`lexicon::Lexicon`]
//! and [`historical_index::HistoricalIndex`] are the two candidate-answer
//! sources; [`compatibility_graph::CompatibilityGraph`] encodes pairwise
//! conflicts between candidates; and the [`solver`] family turns all of
//! that into a ranked stream of filled puzzles.

#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::comparison_chain)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::match_on_vec_items)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod compatibility_graph;
pub mod error;
pub mod historical_index;
pub mod lexicon;
pub mod puzzle;
pub mod ranking;
pub mod reader;
pub mod solver;
pub mod types;

/// The expected maximum length for a single slot; grids wider or taller
/// than this are unusual but not rejected outright.
pub const MAX_SLOT_LENGTH: usize = 21;
