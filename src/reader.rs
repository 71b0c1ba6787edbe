//! The puzzle-file reader: a thin adapter from the AcrossLite `.puz` binary
//! container to the `(width, height, slots, solution?)` shape [`crate::puzzle::Puzzle::new`]
//! expects. This module owns no solving logic — it only knows how to find
//! the grid and clue list inside the byte stream.
//!
//! Container layout (everything before the NUL-terminated string section is
//! fixed-width):
//!
//! ```text
//! offset  size  field
//! 0x02    12    magic "ACROSS&DOWN\0"
//! 0x2C    1     board width
//! 0x2D    1     board height
//! 0x2E    2     clue count (u16, little-endian)
//! 0x32    2     scrambled-state tag
//! 0x34    W*H   solution grid ('.' = black, else a letter)
//! ..      W*H   player-state grid ('.' = black, '-' = empty, else a letter)
//! ..      ...   NUL-terminated strings: title, author, copyright, one clue
//!               per slot (board order), notes
//! ```
//!
//! Checksums and rebus/extension sections are out of scope: this reader is
//! explicitly a thin adapter, not a full-fidelity `.puz` implementation.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{CrosswordError, Result};
use crate::puzzle::{number_slots, Puzzle, Slot};

const MAGIC: &[u8] = b"ACROSS&DOWN\0";
const MAGIC_OFFSET: usize = 0x02;
const WIDTH_OFFSET: usize = 0x2C;
const HEIGHT_OFFSET: usize = 0x2D;
const CLUE_COUNT_OFFSET: usize = 0x2E;
const HEADER_LEN: usize = 0x34;

fn parse_error(message: impl Into<String>) -> CrosswordError {
    CrosswordError::ParseError {
        context: ".puz container".to_string(),
        message: message.into(),
    }
}

/// Reads a single NUL-terminated UTF-8 (lossy) string starting at `offset`,
/// returning the string and the offset of the byte just past its NUL.
fn read_cstr(bytes: &[u8], offset: usize) -> Result<(String, usize)> {
    let rest = bytes.get(offset..).ok_or_else(|| parse_error("unexpected end of file"))?;
    let nul = rest.iter().position(|&b| b == 0).ok_or_else(|| parse_error("unterminated string"))?;
    let s = String::from_utf8_lossy(&rest[..nul]).into_owned();
    Ok((s, offset + nul + 1))
}

/// Parse a `.puz` byte buffer into `(width, height, slots, solution)`.
/// `include_solution` controls whether the returned solution vector is
/// populated (benchmark scoring, §8) or omitted.
pub fn read_puz(bytes: &[u8], include_solution: bool) -> Result<(usize, usize, Vec<Slot>, Option<Vec<char>>)> {
    if bytes.len() < HEADER_LEN {
        return Err(parse_error(format!("file too short for header ({} bytes)", bytes.len())));
    }
    if &bytes[MAGIC_OFFSET..MAGIC_OFFSET + MAGIC.len()] != MAGIC {
        return Err(parse_error("missing ACROSS&DOWN magic"));
    }

    let width = bytes[WIDTH_OFFSET] as usize;
    let height = bytes[HEIGHT_OFFSET] as usize;
    let clue_count = LittleEndian::read_u16(&bytes[CLUE_COUNT_OFFSET..CLUE_COUNT_OFFSET + 2]) as usize;

    if width == 0 || height == 0 {
        return Err(parse_error("zero-sized board"));
    }

    let size = width * height;
    let grid_end = HEADER_LEN + size;
    let state_end = grid_end + size;
    if bytes.len() < state_end {
        return Err(parse_error("file truncated before player-state grid"));
    }

    let solution_bytes = &bytes[HEADER_LEN..grid_end];
    let is_black = |row: usize, col: usize| solution_bytes[row * width + col] == b'.';

    let numbered = number_slots(width, height, is_black);

    // Strings section: title, author, copyright, then one clue per slot in
    // board order (ACROSS-then-DOWN at each numbered cell, matching how
    // `.puz` stores its flat clue list), then notes.
    let mut offset = state_end;
    let (_title, next) = read_cstr(bytes, offset)?;
    offset = next;
    let (_author, next) = read_cstr(bytes, offset)?;
    offset = next;
    let (_copyright, next) = read_cstr(bytes, offset)?;
    offset = next;

    if numbered.len() != clue_count {
        return Err(parse_error(format!(
            "clue count mismatch: header says {clue_count}, grid implies {}",
            numbered.len()
        )));
    }

    let mut slots = Vec::with_capacity(numbered.len());
    for (id, indices) in numbered {
        let (clue_text, next) = read_cstr(bytes, offset)?;
        offset = next;
        slots.push(Slot::new(id, clue_text, indices));
    }

    let solution = if include_solution {
        Some(
            solution_bytes
                .iter()
                .map(|&b| if b == b'.' { ' ' } else { (b as char).to_ascii_uppercase() })
                .collect(),
        )
    } else {
        None
    };

    Ok((width, height, slots, solution))
}

/// Load a [`Puzzle`] directly from a `.puz` byte buffer.
pub fn load_puz(bytes: &[u8], include_solution: bool) -> Result<Puzzle> {
    let (width, height, slots, solution) = read_puz(bytes, include_solution)?;
    Puzzle::new(width, height, slots, solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, SlotId};

    /// Build a minimal well-formed `.puz` buffer for a given grid, with one
    /// clue string per slot (in the same scan order `number_slots` produces).
    fn build_puz(width: usize, height: usize, grid: &str, clues_by_slot: Vec<&str>) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes[MAGIC_OFFSET..MAGIC_OFFSET + MAGIC.len()].copy_from_slice(MAGIC);
        bytes[WIDTH_OFFSET] = width as u8;
        bytes[HEIGHT_OFFSET] = height as u8;
        LittleEndian::write_u16(&mut bytes[CLUE_COUNT_OFFSET..CLUE_COUNT_OFFSET + 2], clues_by_slot.len() as u16);

        bytes.extend_from_slice(grid.as_bytes()); // solution grid
        let state: String = grid.chars().map(|c| if c == '.' { '.' } else { '-' }).collect();
        bytes.extend_from_slice(state.as_bytes()); // player-state grid

        bytes.push(0); // title
        bytes.push(0); // author
        bytes.push(0); // copyright
        for clue in clues_by_slot {
            bytes.extend_from_slice(clue.as_bytes());
            bytes.push(0);
        }
        bytes
    }

    #[test]
    fn reads_minimal_grid() {
        // CAT
        // A.A
        // R.R
        let grid = "CAT" .to_string() + "A.A" + "R.R";
        let bytes = build_puz(3, 3, &grid, vec!["feline pet", "down a", "down b"]);

        let (width, height, slots, solution) = read_puz(&bytes, true).unwrap();
        assert_eq!((width, height), (3, 3));
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().any(|s| s.id == SlotId::new(1, Direction::Across) && s.clue_text == "feline pet"));
        assert_eq!(solution.unwrap()[0], 'C');
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = vec![0u8; HEADER_LEN + 10];
        bytes[MAGIC_OFFSET..MAGIC_OFFSET + MAGIC.len()].copy_from_slice(b"NOT A PUZ!\0\0");
        assert!(read_puz(&bytes, false).is_err());
    }

    #[test]
    fn full_load_builds_puzzle() {
        let grid = "CAT".to_string() + "A.A" + "R.R";
        let bytes = build_puz(3, 3, &grid, vec!["feline pet", "down a", "down b"]);
        let puzzle = load_puz(&bytes, false).unwrap();
        assert_eq!(puzzle.n_set(), 0);
        assert_eq!(puzzle.slots().len(), 3);
    }
}
