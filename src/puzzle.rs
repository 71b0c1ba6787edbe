//! The geometric and combinatorial puzzle model: grid, clue list,
//! slot↔cell indexing, crossing lookup, and fill/erase/conflict operations.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::error::{CrosswordError, Result};
use crate::types::{normalize_word, CellState, Direction, SlotId};

/// An immutable clue: its identity, free-form clue text, and the ordered
/// linear cell indices (row-major) it occupies. For ACROSS slots these are
/// consecutive; for DOWN slots they are offset by the grid width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub id: SlotId,
    pub clue_text: String,
    pub cell_indices: Vec<usize>,
}

impl Slot {
    #[must_use]
    pub fn new(id: SlotId, clue_text: impl Into<String>, cell_indices: Vec<usize>) -> Self {
        Slot {
            id,
            clue_text: clue_text.into(),
            cell_indices,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cell_indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cell_indices.is_empty()
    }
}

/// A crossword grid with its clue list and current letter fill.
///
/// Invariants maintained by construction and every mutator: a cell is
/// [`CellState::Black`] iff no [`Slot`] references it, and every cell a slot
/// references is never black.
#[derive(Debug, Clone)]
pub struct Puzzle {
    pub width: usize,
    pub height: usize,
    slots: Vec<Slot>,
    cells: Vec<CellState>,
    /// For each cell index, the slots (by index into `slots`) passing
    /// through it — at most two by grid rules (one ACROSS, one DOWN).
    cell_to_slots: HashMap<usize, SmallVec<[usize; 2]>>,
    slot_index: HashMap<SlotId, usize>,
}

impl Puzzle {
    /// Build a puzzle from its dimensions and slot list. Cells not
    /// referenced by any slot become [`CellState::Black`]; all others start
    /// [`CellState::Empty`], except where `solution` supplies an initial
    /// letter.
    pub fn new(width: usize, height: usize, slots: Vec<Slot>, solution: Option<Vec<char>>) -> Result<Self> {
        let size = width * height;
        let mut touched = vec![false; size];

        for slot in &slots {
            for &idx in &slot.cell_indices {
                if idx >= size {
                    return Err(CrosswordError::InvalidPuzzle(format!(
                        "slot {} references out-of-grid cell {idx}",
                        slot.id
                    )));
                }
                touched[idx] = true;
            }
        }

        let mut cells = vec![CellState::Empty; size];
        for (idx, t) in touched.iter().enumerate() {
            if !t {
                cells[idx] = CellState::Black;
            }
        }

        if let Some(solution) = solution {
            if solution.len() != size {
                return Err(CrosswordError::InvalidPuzzle(format!(
                    "solution has {} cells, expected {size}",
                    solution.len()
                )));
            }
            for (idx, &c) in solution.iter().enumerate() {
                if !touched[idx] {
                    continue;
                }
                cells[idx] = CellState::Letter(c.to_ascii_uppercase());
            }
        }

        let mut cell_to_slots: HashMap<usize, SmallVec<[usize; 2]>> = HashMap::new();
        let mut slot_index = HashMap::new();
        for (slot_idx, slot) in slots.iter().enumerate() {
            slot_index.insert(slot.id, slot_idx);
            for &idx in &slot.cell_indices {
                cell_to_slots.entry(idx).or_default().push(slot_idx);
            }
        }

        Ok(Puzzle {
            width,
            height,
            slots,
            cells,
            cell_to_slots,
            slot_index,
        })
    }

    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    #[must_use]
    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slot_index.get(&id).map(|&idx| &self.slots[idx])
    }

    /// Number of cells currently holding a letter (neither empty nor black).
    #[must_use]
    pub fn n_set(&self) -> usize {
        self.cells.iter().filter(|c| matches!(c, CellState::Letter(_))).count()
    }

    #[must_use]
    pub fn cell(&self, idx: usize) -> CellState {
        self.cells[idx]
    }

    /// The current fill for a slot; unfilled cells are [`CellState::Empty`].
    #[must_use]
    pub fn get_fill(&self, slot: &Slot) -> Vec<CellState> {
        slot.cell_indices.iter().map(|&idx| self.cells[idx]).collect()
    }

    /// Whether filling `slot` with `word` would contradict an existing
    /// letter, or whether the lengths simply don't match.
    #[must_use]
    pub fn would_conflict(&self, slot: &Slot, word: &str) -> bool {
        let word = normalize_word(word);
        if word.chars().count() != slot.len() {
            return true;
        }
        slot.cell_indices.iter().zip(word.chars()).any(|(&idx, ch)| {
            matches!(self.cells[idx], CellState::Letter(existing) if existing != ch)
        })
    }

    /// Fill `slot` with `word`. Already-set letters identical to the
    /// incoming word are left untouched.
    pub fn set_fill(&mut self, slot: &Slot, word: &str) -> Result<()> {
        let word = normalize_word(word);
        if word.chars().count() != slot.len() {
            return Err(CrosswordError::LengthMismatch {
                slot: slot.id,
                expected: slot.len(),
                actual: word.chars().count(),
            });
        }
        if self.would_conflict(slot, &word) {
            return Err(CrosswordError::Conflict { slot: slot.id });
        }
        for (&idx, ch) in slot.cell_indices.iter().zip(word.chars()) {
            self.cells[idx] = CellState::Letter(ch);
        }
        Ok(())
    }

    /// Clear every cell of `slot` back to [`CellState::Empty`].
    pub fn erase_fill(&mut self, slot: &Slot) {
        for &idx in &slot.cell_indices {
            self.cells[idx] = CellState::Empty;
        }
    }

    /// The other slot crossing `slot` at the given position within it, if
    /// any (the ACROSS↔DOWN pair sharing that cell).
    #[must_use]
    pub fn crossing(&self, slot: &Slot, position: usize) -> Option<&Slot> {
        let cell_idx = *slot.cell_indices.get(position)?;
        let others = self.cell_to_slots.get(&cell_idx)?;
        others
            .iter()
            .find(|&&idx| self.slots[idx].id != slot.id)
            .map(|&idx| &self.slots[idx])
    }

    /// An independent copy: mutating the copy never affects `self`.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

/// Build the ordered, numbered slot list for a grid from a black/white mask.
/// ACROSS slots are maximal horizontal runs of length ≥ 2 of white cells;
/// DOWN slots are the vertical analog. Numbering follows standard crossword
/// convention: scan row-major, assign the next number to any cell that
/// begins an ACROSS or DOWN run, sharing the number across both directions
/// when a cell begins both.
///
/// `is_black(row, col)` should return whether the given cell is a black
/// square. `clue_text` supplies the clue text for a given `(number,
/// direction)`, in case callers want to attach text after numbering (the
/// default puzzle reader looks clues up by scan order instead).
pub fn number_slots(width: usize, height: usize, is_black: impl Fn(usize, usize) -> bool) -> Vec<(SlotId, Vec<usize>)> {
    let mut result = Vec::new();
    let mut number = 0u32;

    for row in 0..height {
        for col in 0..width {
            if is_black(row, col) {
                continue;
            }

            let starts_across = col == 0 || is_black(row, col - 1);
            let starts_down = row == 0 || is_black(row - 1, col);

            let across_len = if starts_across {
                let mut len = 0;
                let mut c = col;
                while c < width && !is_black(row, c) {
                    len += 1;
                    c += 1;
                }
                len
            } else {
                0
            };

            let down_len = if starts_down {
                let mut len = 0;
                let mut r = row;
                while r < height && !is_black(r, col) {
                    len += 1;
                    r += 1;
                }
                len
            } else {
                0
            };

            let has_across = starts_across && across_len >= 2;
            let has_down = starts_down && down_len >= 2;

            if !has_across && !has_down {
                continue;
            }

            number += 1;
            if has_across {
                let indices = (0..across_len).map(|i| row * width + col + i).collect();
                result.push((SlotId::new(number, Direction::Across), indices));
            }
            if has_down {
                let indices = (0..down_len).map(|i| (row + i) * width + col).collect();
                result.push((SlotId::new(number, Direction::Down), indices));
            }
        }
    }

    result
}
