// End-to-end tests wiring the reader, lexicon/historical-index, solver, and
// ranker together against small in-memory (or tempfile-backed) fixtures.

use std::io::Write;

use indoc::indoc;

use xwcore::historical_index::HistoricalIndex;
use xwcore::lexicon::Lexicon;
use xwcore::puzzle::Puzzle;
use xwcore::ranking::top_n;
use xwcore::solver::clique::{CliqueSolver, HistoricalAnswerSource, LexiconAnswerSource};
use xwcore::solver::Solver;
use xwcore::types::{CellState, Direction, SlotId};

/// A fully-white 2x2 grid with solution
/// ```text
/// CA
/// AT
/// ```
/// `number_slots` assigns, in row-major scan order: ACROSS 1 ([0,1]),
/// DOWN 1 ([0,2]), DOWN 2 ([1,3]), ACROSS 3 ([2,3]) — four slots, one clue
/// string each in that board order.
const TINY_GRID: &str = "CAAT";
const TINY_CLUES: [&str; 4] = ["one across", "one down", "two down", "three across"];

fn tiny_puzzle_bytes() -> Vec<u8> {
    build_puz(2, 2, TINY_GRID, TINY_CLUES.to_vec())
}

/// Build a minimal well-formed `.puz` buffer, mirroring the byte layout
/// `xwcore::reader` expects (see its module docs for the field table).
fn build_puz(width: usize, height: usize, grid: &str, clues_by_slot: Vec<&str>) -> Vec<u8> {
    const HEADER_LEN: usize = 0x34;
    const MAGIC_OFFSET: usize = 0x02;
    const MAGIC: &[u8] = b"ACROSS&DOWN\0";
    const WIDTH_OFFSET: usize = 0x2C;
    const HEIGHT_OFFSET: usize = 0x2D;
    const CLUE_COUNT_OFFSET: usize = 0x2E;

    let mut bytes = vec![0u8; HEADER_LEN];
    bytes[MAGIC_OFFSET..MAGIC_OFFSET + MAGIC.len()].copy_from_slice(MAGIC);
    bytes[WIDTH_OFFSET] = width as u8;
    bytes[HEIGHT_OFFSET] = height as u8;
    bytes[CLUE_COUNT_OFFSET..CLUE_COUNT_OFFSET + 2].copy_from_slice(&(clues_by_slot.len() as u16).to_le_bytes());

    bytes.extend_from_slice(grid.as_bytes());
    let state: String = grid.chars().map(|c| if c == '.' { '.' } else { '-' }).collect();
    bytes.extend_from_slice(state.as_bytes());

    bytes.push(0); // title
    bytes.push(0); // author
    bytes.push(0); // copyright
    for clue in clues_by_slot {
        bytes.extend_from_slice(clue.as_bytes());
        bytes.push(0);
    }
    bytes
}

fn word_at(puzzle: &Puzzle, id: SlotId) -> String {
    let slot = puzzle.slot(id).unwrap();
    puzzle.get_fill(slot).iter().map(|c| c.letter().unwrap_or('?')).collect()
}

#[test]
fn reader_to_lexicon_to_clique_solver_to_ranker() {
    let bytes = tiny_puzzle_bytes();
    let puzzle = xwcore::reader::load_puz(&bytes, false).expect("valid puz fixture");
    assert_eq!(puzzle.n_set(), 0, "the solve-time puzzle starts blank");
    assert_eq!(puzzle.slots().len(), 4);

    let dictionary = indoc! {"
        CA
        AT
        XY
    "};
    let lexicon = Lexicon::load_from_str(dictionary);

    let solver = CliqueSolver::new(LexiconAnswerSource { lexicon: &lexicon });
    let solutions = top_n(solver.solve(puzzle), 5, None);

    assert!(!solutions.is_empty(), "a consistent fill exists for this grid");
    for solved in &solutions {
        // A clique's constituent candidates never conflict with each other,
        // so every slot it touches ends up either entirely filled or
        // (if the clique omitted it) entirely untouched — never partial.
        for slot in solved.slots() {
            let fill = solved.get_fill(slot);
            let all_empty = fill.iter().all(CellState::is_empty);
            let all_letters = fill.iter().all(|c| !c.is_empty());
            assert!(all_empty || all_letters, "slot {} is partially filled", slot.id);
        }
    }

    // The complete grid (CA / AT, reading both across and down) is itself
    // pairwise-consistent, so some maximal clique must realize it in full.
    assert!(
        solutions.iter().any(|p| p.n_set() == 4),
        "the fully-consistent fill should appear among the emitted cliques"
    );
    let complete = solutions.iter().find(|p| p.n_set() == 4).unwrap();
    assert_eq!(word_at(complete, SlotId::new(1, Direction::Across)), "CA");
    assert_eq!(word_at(complete, SlotId::new(1, Direction::Down)), "CA");
    assert_eq!(word_at(complete, SlotId::new(2, Direction::Down)), "AT");
    assert_eq!(word_at(complete, SlotId::new(3, Direction::Across)), "AT");
}

/// Build one fixed-column historical clue database line: answer padded to
/// 26 columns, a digit, a space, a 4-digit year, a space, a 3-column source
/// tag, a space, then free clue text — matching `parse_record`'s layout.
fn build_clue_db_line(answer: &str, year: &str, source: &str, text: &str) -> String {
    format!("{answer:<26}0 {year} {source:<3} {text}")
}

#[test]
fn clue_database_text_loader_feeds_historical_solver() {
    let lines: Vec<String> = TINY_CLUES
        .iter()
        .zip(["CA", "CA", "AT", "AT"])
        .map(|(clue, answer)| build_clue_db_line(answer, "2020", "nyt", clue))
        .collect();
    let clue_db_text = lines.join("\n");
    let cluedb = HistoricalIndex::load_text(clue_db_text.lines());
    assert_eq!(cluedb.len(), 4);

    let bytes = tiny_puzzle_bytes();
    let puzzle = xwcore::reader::load_puz(&bytes, false).unwrap();

    let solver = CliqueSolver::new(HistoricalAnswerSource { index: &cluedb, threshold: 1.0 });
    let solutions = top_n(solver.solve(puzzle), 5, None);
    assert!(solutions.iter().any(|p| p.n_set() > 0));
}

/// Exercises the reader and the dictionary loader against real files on disk
/// (the only place this suite touches the filesystem), then snapshots the
/// solved fill as JSON the way a regression fixture would.
#[test]
fn end_to_end_against_tempfile_backed_inputs() {
    let dir = tempfile::tempdir().expect("create temp dir");

    let puzzle_path = dir.path().join("tiny.puz");
    std::fs::File::create(&puzzle_path).unwrap().write_all(&tiny_puzzle_bytes()).unwrap();

    let dictionary_path = dir.path().join("words.dict");
    std::fs::write(&dictionary_path, "CA\nAT\n").unwrap();

    let puz_bytes = std::fs::read(&puzzle_path).unwrap();
    let puzzle = xwcore::reader::load_puz(&puz_bytes, false).unwrap();

    let dict_text = std::fs::read_to_string(&dictionary_path).unwrap();
    let lexicon = Lexicon::load_from_str(&dict_text);

    let solver = CliqueSolver::new(LexiconAnswerSource { lexicon: &lexicon });
    let solutions = top_n(solver.solve(puzzle), 1, None);
    assert_eq!(solutions.len(), 1);

    let solved = &solutions[0];
    let snapshot = serde_json::json!({
        "1A": word_at(solved, SlotId::new(1, Direction::Across)),
        "1D": word_at(solved, SlotId::new(1, Direction::Down)),
    });

    assert_eq!(snapshot["1A"], serde_json::json!("CA"));
    assert_eq!(snapshot["1D"], serde_json::json!("CA"));
}

#[test]
fn malformed_dictionary_and_cluedb_lines_are_skipped_not_fatal() {
    let dictionary = indoc! {"
        CAT

        car
        123
    "};
    let lexicon = Lexicon::load_from_str(dictionary);
    assert!(lexicon.is_word("CAT"));
    assert!(lexicon.is_word("CAR"));
    assert_eq!(lexicon.size(), 2);

    let good_line = build_clue_db_line("CAT", "2020", "nyt", "feline pet");
    let clue_db_text = format!("too short\n{good_line}");
    let cluedb = HistoricalIndex::load_text(clue_db_text.lines());
    assert_eq!(cluedb.len(), 1);
}
