//! Shared small types used throughout the crate: slot identity, cell state, and
//! the dense integer ids used by the lexicon and compatibility graph.

use std::fmt;

/// The two axes a crossword slot can run along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Across,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "A"),
            Direction::Down => write!(f, "D"),
        }
    }
}

/// Uniquely identifies a clue: its printed number plus the direction it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct SlotId {
    pub number: u32,
    pub direction: Direction,
}

impl SlotId {
    #[must_use]
    pub fn new(number: u32, direction: Direction) -> Self {
        SlotId { number, direction }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.direction)
    }
}

/// The state of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Empty,
    Black,
    Letter(char),
}

impl CellState {
    #[must_use]
    pub fn is_black(&self) -> bool {
        matches!(self, CellState::Black)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, CellState::Empty)
    }

    #[must_use]
    pub fn letter(&self) -> Option<char> {
        match self {
            CellState::Letter(c) => Some(*c),
            _ => None,
        }
    }
}

/// Dense id for a word within a single length bin of a [`crate::lexicon::Lexicon`].
pub type WordId = usize;

/// Dense id for a node in a [`crate::compatibility_graph::CompatibilityGraph`].
pub type NodeId = usize;

/// Normalize a raw answer string to the crate's canonical uppercase, letters-only form.
#[must_use]
pub fn normalize_word(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Normalize a raw clue string to the crate's canonical lowercase form.
#[must_use]
pub fn normalize_clue(clue: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    clue.trim().nfkc().collect::<String>().to_lowercase()
}
