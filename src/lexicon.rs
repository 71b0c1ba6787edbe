//! A length-binned trie lexicon supporting exact membership and
//! length/pattern-constrained enumeration.
//!
//! Each observed word length gets its own [`Trie`], built as an arena of
//! [`TrieNode`]s addressed by dense integer ids rather than linked pointers —
//! this keeps the structure flat and avoids the borrow-checker friction of a
//! pointer-chasing tree. Children are stored as a 26-slot array keyed by
//! `letter - b'A'` since lexicon words are always uppercase ASCII letters
//! after normalization; this makes the hot path of both insertion and
//! pattern-matching traversal branch-free array indexing instead of a hash
//! lookup.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::types::{normalize_word, WordId};

const ALPHABET_SIZE: usize = 26;

fn letter_index(c: char) -> Option<usize> {
    if c.is_ascii_uppercase() {
        Some((c as u8 - b'A') as usize)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
struct TrieNode {
    children: [Option<u32>; ALPHABET_SIZE],
    /// The word stored at this node, if this node is terminal.
    terminal: Option<WordId>,
}

impl TrieNode {
    fn empty() -> Self {
        TrieNode {
            children: [None; ALPHABET_SIZE],
            terminal: None,
        }
    }
}

/// A trie over words of a single fixed length.
#[derive(Debug, Clone)]
struct Trie {
    nodes: Vec<TrieNode>,
    /// Words stored in this trie, indexed by [`WordId`]. A word's id is
    /// stable for the lifetime of the trie.
    words: Vec<String>,
    /// Cache of `words`, sorted. Invalidated (cleared) on every insert and
    /// rebuilt lazily on the next full enumeration.
    sorted_cache: RefCell<Option<Vec<WordId>>>,
}

impl Trie {
    fn new() -> Self {
        Trie {
            nodes: vec![TrieNode::empty()],
            words: Vec::new(),
            sorted_cache: RefCell::new(None),
        }
    }

    fn is_word(&self, word: &str) -> bool {
        self.follow(word)
            .is_some_and(|idx| self.nodes[idx as usize].terminal.is_some())
    }

    fn follow(&self, word: &str) -> Option<u32> {
        let mut current = 0u32;
        for c in word.chars() {
            let i = letter_index(c)?;
            current = self.nodes[current as usize].children[i]?;
        }
        Some(current)
    }

    fn add(&mut self, word: &str) {
        if self.is_word(word) {
            return;
        }

        let mut current = 0u32;
        for c in word.chars() {
            let Some(i) = letter_index(c) else {
                return;
            };
            current = match self.nodes[current as usize].children[i] {
                Some(idx) => idx,
                None => {
                    let idx = self.nodes.len() as u32;
                    self.nodes.push(TrieNode::empty());
                    self.nodes[current as usize].children[i] = Some(idx);
                    idx
                }
            };
        }

        let id = self.words.len();
        self.words.push(word.to_string());
        self.nodes[current as usize].terminal = Some(id);
        *self.sorted_cache.borrow_mut() = None;
    }

    fn size(&self) -> usize {
        self.words.len()
    }

    /// Iterative preorder traversal of the trie, honoring an optional sparse
    /// pattern constraint. See module docs on [`Lexicon::words`] for the
    /// algorithm this implements.
    fn matching_words(&self, pattern: &BTreeMap<usize, char>) -> Vec<&str> {
        let min_depth = pattern.keys().copied().max();

        // Fast path: no pattern at all means "every word", which is exactly
        // the cached sorted list once we have one.
        if pattern.is_empty() {
            return self.sorted_word_ids().iter().map(|&id| self.words[id].as_str()).collect();
        }

        let mut result = Vec::new();
        // Stack entries are (depth, node_idx), with depth counted from -1 at
        // the root so a node at depth d holds the (d+1)-th letter of a word.
        let mut stack: Vec<(isize, u32)> = vec![(-1, 0)];

        while let Some((depth, node_idx)) = stack.pop() {
            let node = &self.nodes[node_idx as usize];

            if let Some(word_id) = node.terminal {
                if min_depth.map_or(true, |m| depth >= m as isize) {
                    result.push(self.words[word_id].as_str());
                }
            }

            let next_depth = depth + 1;
            if let Some(&required) = pattern.get(&(next_depth as usize)) {
                if let Some(i) = letter_index(required) {
                    if let Some(child) = node.children[i] {
                        stack.push((next_depth, child));
                    }
                }
            } else {
                // Push children in reverse sorted order so popping the stack
                // visits the smallest letter first (preorder, lexical).
                for i in (0..ALPHABET_SIZE).rev() {
                    if let Some(child) = node.children[i] {
                        stack.push((next_depth, child));
                    }
                }
            }
        }

        result
    }

    /// Sorted word ids, lazily computed and cached until the next `add`.
    fn sorted_word_ids(&self) -> Vec<WordId> {
        if let Some(cached) = self.sorted_cache.borrow().as_ref() {
            return cached.clone();
        }
        let mut ids: Vec<WordId> = (0..self.words.len()).collect();
        ids.sort_by(|&a, &b| self.words[a].cmp(&self.words[b]));
        *self.sorted_cache.borrow_mut() = Some(ids.clone());
        ids
    }
}

/// A dictionary of words, binned by length for fast length-constrained
/// lookup.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    binned_tries: BTreeMap<usize, Trie>,
}

impl Lexicon {
    #[must_use]
    pub fn new() -> Self {
        Lexicon {
            binned_tries: BTreeMap::new(),
        }
    }

    /// Load a dictionary file: UTF-8 text, one word per line, trailing CR/LF
    /// stripped, empty lines ignored.
    pub fn load_from_str(text: &str) -> Self {
        let mut lexicon = Lexicon::new();
        for line in text.lines() {
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }
            lexicon.add(line);
        }
        lexicon
    }

    /// Normalize to uppercase and insert into the trie bucket for its length.
    /// Idempotent: re-adding a word already present is a no-op.
    pub fn add(&mut self, word: &str) {
        let normalized = normalize_word(word);
        if normalized.is_empty() {
            return;
        }
        self.binned_tries
            .entry(normalized.chars().count())
            .or_insert_with(Trie::new)
            .add(&normalized);
    }

    /// Exact membership check.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        let normalized = normalize_word(word);
        self.binned_tries
            .get(&normalized.chars().count())
            .is_some_and(|trie| trie.is_word(&normalized))
    }

    /// Total number of distinct words stored.
    #[must_use]
    pub fn size(&self) -> usize {
        self.binned_tries.values().map(Trie::size).sum()
    }

    /// Yield every stored word matching both `length` (if non-zero) and
    /// `pattern` (a sparse index→letter constraint). Output order is by
    /// length ascending, then lexicographic within length.
    #[must_use]
    pub fn words(&self, length: Option<usize>, pattern: &BTreeMap<usize, char>) -> Vec<String> {
        let min_length = pattern.keys().copied().max().map(|m| m + 1);

        let mut result = Vec::new();
        match length {
            Some(0) | None => {
                for (&l, trie) in &self.binned_tries {
                    if min_length.is_some_and(|m| l < m) {
                        continue;
                    }
                    result.extend(trie.matching_words(pattern).into_iter().map(str::to_string));
                }
            }
            Some(l) => {
                if min_length.is_some_and(|m| l < m) {
                    return result;
                }
                if let Some(trie) = self.binned_tries.get(&l) {
                    result.extend(trie.matching_words(pattern).into_iter().map(str::to_string));
                }
            }
        }
        result
    }
}

impl<'a> IntoIterator for &'a Lexicon {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.words(None, &BTreeMap::new()).into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(pairs: &[(usize, char)]) -> BTreeMap<usize, char> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn tiny_lexicon_scenario() {
        let mut lex = Lexicon::new();
        for w in ["CAT", "CAR", "BAT", "BAR", "CART"] {
            lex.add(w);
        }

        assert_eq!(lex.words(Some(3), &BTreeMap::new()), vec!["BAR", "BAT", "CAR", "CAT"]);
        assert_eq!(lex.words(Some(3), &pattern(&[(0, 'C')])), vec!["CAR", "CAT"]);
        assert_eq!(lex.words(None, &pattern(&[(2, 'R')])), vec!["BAR", "CAR", "CART"]);
    }

    #[test]
    fn membership_matches_additions() {
        let mut lex = Lexicon::new();
        lex.add("hello");
        assert!(lex.is_word("hello"));
        assert!(lex.is_word("HELLO"));
        assert!(!lex.is_word("world"));
    }

    #[test]
    fn add_is_idempotent() {
        let mut lex = Lexicon::new();
        lex.add("CAT");
        lex.add("CAT");
        assert_eq!(lex.size(), 1);
    }

    #[test]
    fn unknown_length_returns_empty() {
        let mut lex = Lexicon::new();
        lex.add("CAT");
        assert!(lex.words(Some(7), &BTreeMap::new()).is_empty());
    }

    #[test]
    fn pattern_past_length_returns_empty() {
        let mut lex = Lexicon::new();
        lex.add("CAT");
        assert!(lex.words(Some(3), &pattern(&[(5, 'X')])).is_empty());
    }

    #[test]
    fn full_enumeration_matches_input_set() {
        let words = ["zebra", "apple", "mango", "kiwi", "pear"];
        let mut lex = Lexicon::new();
        for w in words {
            lex.add(w);
        }
        let mut got: Vec<String> = (&lex).into_iter().collect();
        got.sort();
        let mut expected: Vec<String> = words.iter().map(|w| w.to_uppercase()).collect();
        expected.sort();
        assert_eq!(got, expected);
    }
}
