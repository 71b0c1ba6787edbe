//! A fuzzy clue → historical-answer index.
//!
//! Two structures are kept in step: an exact `clue -> answers` map, and an
//! inverted index from character N-gram "shingles" to the clues that contain
//! them. The inverted index lets `search` avoid comparing the query against
//! every clue ever seen — it only has to compare against clues sharing at
//! least one shingle, then scores those exactly with a Dice coefficient.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::{Read, Write};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{CrosswordError, Result};
use crate::types::{normalize_clue, normalize_word};

const DEFAULT_N: usize = 3;
const PAD_CHAR: char = '$';

/// Split a normalized string into its multiset of length-`n` character
/// shingles, padding both ends with `n - 1` sentinel characters the way the
/// historical Python `ngram` package did, so short strings and string edges
/// still contribute shingles.
fn shingles(s: &str, n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    let pad: String = std::iter::repeat(PAD_CHAR).take(n - 1).collect();
    let padded: Vec<char> = format!("{pad}{s}{pad}").chars().collect();
    if padded.len() < n {
        return Vec::new();
    }
    (0..=padded.len() - n)
        .map(|i| padded[i..i + n].iter().collect())
        .collect()
}

fn multiset_counts(shingles: &[String]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for s in shingles {
        *counts.entry(s.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Dice coefficient between the multisets of shingles of `a` and `b`:
/// `2 * |intersection| / (|A| + |B|)`.
fn dice_similarity(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let counts_a = multiset_counts(a);
    let counts_b = multiset_counts(b);

    let mut intersection = 0usize;
    for (shingle, &count_a) in &counts_a {
        if let Some(&count_b) = counts_b.get(shingle) {
            intersection += count_a.min(count_b);
        }
    }

    (2.0 * intersection as f64) / (a.len() + b.len()) as f64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Record {
    clue: String,
    answers: Vec<String>,
}

/// A fuzzy index from normalized clue text to the set of answers previously
/// observed for it, plus an N-gram similarity index over clue text.
#[derive(Debug, Clone)]
pub struct HistoricalIndex {
    n: usize,
    clue_to_answers: HashMap<String, HashSet<String>>,
    shingle_to_clues: HashMap<String, HashSet<String>>,
}

impl Default for HistoricalIndex {
    fn default() -> Self {
        Self::new(DEFAULT_N)
    }
}

impl HistoricalIndex {
    #[must_use]
    pub fn new(n: usize) -> Self {
        HistoricalIndex {
            n,
            clue_to_answers: HashMap::new(),
            shingle_to_clues: HashMap::new(),
        }
    }

    /// Add a clue-answer pair. Normalizes the clue to lowercase and the
    /// answer to uppercase letters-only before storing.
    pub fn add(&mut self, clue: &str, answer: &str) {
        let clue = normalize_clue(clue);
        let answer = normalize_word(answer);

        for shingle in shingles(&clue, self.n) {
            self.shingle_to_clues.entry(shingle).or_default().insert(clue.clone());
        }

        self.clue_to_answers.entry(clue).or_default().insert(answer);
    }

    /// Search for clues similar to `clue`, by N-gram Dice similarity, with
    /// similarity at least `threshold`. A `threshold` of exactly `1.0` takes
    /// a fast path: a single exact lookup instead of scoring every candidate.
    #[must_use]
    pub fn search(&self, clue: &str, threshold: f64) -> BTreeSet<(String, float_ord::FloatOrd<f64>)> {
        let clue = normalize_clue(clue);

        if threshold >= 1.0 {
            return if self.clue_to_answers.contains_key(&clue) {
                BTreeSet::from([(clue, float_ord::FloatOrd(1.0))])
            } else {
                BTreeSet::new()
            };
        }

        let query_shingles = shingles(&clue, self.n);
        let mut candidates: HashSet<&str> = HashSet::new();
        for shingle in &query_shingles {
            if let Some(clues) = self.shingle_to_clues.get(shingle) {
                candidates.extend(clues.iter().map(String::as_str));
            }
        }

        let mut result = BTreeSet::new();
        for candidate in candidates {
            let candidate_shingles = shingles(candidate, self.n);
            let similarity = dice_similarity(&query_shingles, &candidate_shingles);
            if similarity >= threshold {
                result.insert((candidate.to_string(), float_ord::FloatOrd(similarity)));
            }
        }
        result
    }

    /// Look up the previously-observed answers for a clue, optionally
    /// restricted to a given length. Fails with [`CrosswordError::NotFound`]
    /// if the clue has never been added.
    pub fn answers(&self, clue: &str, length: Option<usize>) -> Result<HashSet<String>> {
        let clue = normalize_clue(clue);
        let answers = self
            .clue_to_answers
            .get(&clue)
            .ok_or_else(|| CrosswordError::NotFound(clue.clone()))?;

        Ok(match length {
            Some(l) => answers.iter().filter(|a| a.chars().count() == l).cloned().collect(),
            None => answers.clone(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clue_to_answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clue_to_answers.is_empty()
    }

    /// Serialize to a length-prefixed, little-endian binary stream: a
    /// sequence of `(clue, answers)` records with no outer container.
    pub fn serialize<W: Write>(&self, mut sink: W) -> Result<()> {
        for (clue, answers) in &self.clue_to_answers {
            let record = Record {
                clue: clue.clone(),
                answers: answers.iter().cloned().collect(),
            };
            bincode::serialize_into(&mut sink, &record)?;
        }
        Ok(())
    }

    /// Rebuild a [`HistoricalIndex`] from a stream written by [`Self::serialize`].
    pub fn deserialize<R: Read>(mut source: R) -> Result<Self> {
        let mut index = HistoricalIndex::new(DEFAULT_N);
        let mut buf = Vec::new();
        source.read_to_end(&mut buf)?;

        let mut cursor = std::io::Cursor::new(buf);
        while (cursor.position() as usize) < cursor.get_ref().len() {
            let record: Record = bincode::deserialize_from(&mut cursor)?;
            for answer in record.answers {
                index.add(&record.clue, &answer);
            }
        }
        Ok(index)
    }

    /// Bulk-load from the fixed-column historical clue database text format:
    /// answer at `[0,26)` right-padded with spaces, a digit byte at 26, year
    /// at `[28,32)`, source tag at `[33,36)`, clue text from 37 to line end.
    /// Malformed lines are logged and skipped.
    pub fn load_text<'a>(lines: impl Iterator<Item = &'a str>) -> Self {
        let mut index = HistoricalIndex::default();
        for (lineno, line) in lines.enumerate() {
            match parse_record(line) {
                Ok(record) => index.add(&record.text, &record.answer),
                Err(e) => warn!("skipping malformed clue-db line {lineno}: {e}"),
            }
        }
        index
    }
}

impl PartialEq for HistoricalIndex {
    fn eq(&self, other: &Self) -> bool {
        self.clue_to_answers == other.clue_to_answers
    }
}
impl Eq for HistoricalIndex {}

/// A single parsed historical-clue-database record.
#[derive(Debug, Clone)]
pub struct ClueDbRecord {
    pub text: String,
    pub answer: String,
    pub num: i32,
    pub year: i32,
    pub source: String,
}

/// Parse one fixed-column historical clue database line.
pub fn parse_record(line: &str) -> Result<ClueDbRecord> {
    let bytes = line.as_bytes();
    if bytes.len() < 37 {
        return Err(CrosswordError::ParseError {
            context: "clue-db record".to_string(),
            message: format!("line too short ({} bytes)", bytes.len()),
        });
    }

    let answer = String::from_utf8_lossy(&bytes[0..26]).trim().to_string();
    let num = (bytes[26] as char).to_digit(10).unwrap_or(0) as i32;
    let year: i32 = std::str::from_utf8(&bytes[28..32])
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(-1);
    let source = String::from_utf8_lossy(&bytes[33..36]).to_string();
    let text = String::from_utf8_lossy(&bytes[37..]).trim_end().to_string();

    if answer.is_empty() {
        return Err(CrosswordError::ParseError {
            context: "clue-db record".to_string(),
            message: "empty answer field".to_string(),
        });
    }

    debug!("parsed clue-db record for {answer:?} (source {source:?}, year {year})");

    Ok(ClueDbRecord {
        text,
        answer,
        num,
        year,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_search_scenario() {
        let mut idx = HistoricalIndex::default();
        idx.add("feline pet", "CAT");

        let result = idx.search("feline pet", 1.0);
        assert_eq!(result.len(), 1);
        assert!(result.contains(&("feline pet".to_string(), float_ord::FloatOrd(1.0))));

        let answers = idx.answers("feline pet", Some(3)).unwrap();
        assert_eq!(answers, HashSet::from(["CAT".to_string()]));

        let normalized = idx.search("FELINE PET", 1.0);
        assert_eq!(normalized, result);
    }

    #[test]
    fn fuzzy_search_finds_near_match() {
        let mut idx = HistoricalIndex::new(3);
        idx.add("feline pet", "CAT");

        let result = idx.search("feline pets", 0.5);
        let found = result.iter().find(|(clue, _)| clue == "feline pet");
        assert!(found.is_some());
        assert!(found.unwrap().1 .0 > 0.5);
    }

    #[test]
    fn unknown_clue_is_not_found() {
        let idx = HistoricalIndex::default();
        assert!(idx.answers("never added", None).is_err());
    }

    #[test]
    fn serialization_round_trips() {
        let mut idx = HistoricalIndex::default();
        idx.add("feline pet", "CAT");
        idx.add("canine companion", "DOG");
        idx.add("canine companion", "PUP");

        let mut buf = Vec::new();
        idx.serialize(&mut buf).unwrap();
        let restored = HistoricalIndex::deserialize(&buf[..]).unwrap();

        assert_eq!(idx, restored);
    }

    fn build_record_line(answer: &str, num: u8, year: &str, source: &str, text: &str) -> String {
        let mut line = format!("{answer:<26}");
        line.push(num as char);
        line.push(' ');
        line.push_str(year);
        line.push(' ');
        line.push_str(&format!("{source:<3}"));
        line.push(' ');
        line.push_str(text);
        line
    }

    #[test]
    fn text_loader_skips_malformed_lines() {
        let good = build_record_line("CAT", b'0', "2020", "nyt", "feline pet");
        let parsed = parse_record(&good).unwrap();
        assert_eq!(parsed.answer, "CAT");
        assert_eq!(parsed.year, 2020);
        assert_eq!(parsed.text, "feline pet");

        let lines = vec![good.as_str(), "too short"];
        let idx = HistoricalIndex::load_text(lines.into_iter());
        assert_eq!(idx.len(), 1);
    }
}
