//! `matcher` — pattern queries against the dictionary.
//!
//! A [`Pattern`] is a fixed-length template of slots, each either a fixed
//! uppercase letter or a wildcard. Matching is an early-exit byte compare
//! against the length bucket of the word list; there is no regex engine.
//! For patterns with several fixed slots a prebuilt
//! `(length, position, letter) -> bitset` index answers the query by
//! bitset intersection instead.

use crate::word_list::{RatedWord, WordList};
use bit_set::BitSet;
use once_cell::sync::OnceCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

const ALPHABET_SIZE: usize = 26;

/// A slot-for-slot word template: fixed letters and wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    slots: Vec<Option<char>>,
}

/// Error from parsing a pattern string.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("'{ch}' is not a letter or wildcard")]
    InvalidChar { ch: char },
}

impl Pattern {
    /// Build a pattern from slot values (`None` = wildcard).
    #[must_use]
    pub fn from_slots(slots: impl IntoIterator<Item = Option<char>>) -> Self {
        Self { slots: slots.into_iter().collect() }
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pattern has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether every slot is fixed, i.e. the entry is already filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// The slot values in order.
    #[must_use]
    pub fn slots(&self) -> &[Option<char>] {
        &self.slots
    }

    /// `(position, letter)` for every fixed slot.
    pub fn fixed_slots(&self) -> impl Iterator<Item = (usize, char)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|ch| (i, ch)))
    }

    /// Early-exit test: same length, every fixed slot equal.
    #[must_use]
    pub fn matches(&self, word: &str) -> bool {
        let bytes = word.as_bytes();
        if bytes.len() != self.slots.len() {
            return false;
        }
        self.slots
            .iter()
            .zip(bytes)
            .all(|(slot, &b)| slot.map_or(true, |ch| ch as u8 == b))
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    /// Parse a template string: letters fix a slot (lowercase is
    /// normalized), `.`, `_`, and `?` are wildcards.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|ch| match ch {
                '.' | '_' | '?' => Ok(None),
                _ if ch.is_ascii_alphabetic() => Ok(Some(ch.to_ascii_uppercase())),
                _ => Err(PatternError::InvalidChar { ch }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|slots| Self { slots })
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in &self.slots {
            write!(f, "{}", slot.unwrap_or('.'))?;
        }
        Ok(())
    }
}

/// Optional inclusive rating range. When either bound is set, unranked
/// words are excluded; with no bounds everything passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingFilter {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl RatingFilter {
    /// The pass-everything filter.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Ratings at or above `min`.
    #[must_use]
    pub fn at_least(min: u32) -> Self {
        Self { min: Some(min), max: None }
    }

    #[must_use]
    pub fn passes(self, rating: Option<u32>) -> bool {
        if self.min.is_none() && self.max.is_none() {
            return true;
        }
        let Some(r) = rating else { return false };
        self.min.map_or(true, |min| r >= min) && self.max.map_or(true, |max| r <= max)
    }
}

/// Result ordering for candidate queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ranked words first, higher ratings first, ties alphabetical;
    /// unranked words follow alphabetically.
    #[default]
    RatingDesc,
    /// Strict lexicographic order.
    Alphabetical,
}

pub(crate) fn rating_desc(a: &RatedWord, b: &RatedWord) -> Ordering {
    match (a.rating, b.rating) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.word.cmp(&b.word)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.word.cmp(&b.word),
    }
}

/// Per-length `(position, letter) -> bitset of bucket offsets` index.
///
/// Buckets are alphabetical, so ascending bit order preserves the naive
/// scan's result order and the two query paths stay interchangeable.
#[derive(Debug, Clone)]
struct PositionIndex {
    by_length: HashMap<usize, Vec<Vec<BitSet>>>,
}

impl PositionIndex {
    fn build(words: &WordList) -> Self {
        let mut by_length = HashMap::new();
        let lengths: Vec<usize> = {
            let mut seen: Vec<usize> = words.entries().iter().map(|e| e.word.len()).collect();
            seen.sort_unstable();
            seen.dedup();
            seen
        };

        for len in lengths {
            let bucket = words.bucket(len);
            let mut per_position: Vec<Vec<BitSet>> = (0..len)
                .map(|_| (0..ALPHABET_SIZE).map(|_| BitSet::with_capacity(bucket.len())).collect())
                .collect();

            for (offset, &entry_idx) in bucket.iter().enumerate() {
                for (pos, b) in words.entry(entry_idx).word.bytes().enumerate() {
                    per_position[pos][(b - b'A') as usize].insert(offset);
                }
            }
            by_length.insert(len, per_position);
        }

        Self { by_length }
    }

    /// Bucket offsets matching all fixed slots, ascending. `None` when the
    /// length is not indexed.
    fn query(&self, pattern: &Pattern) -> Option<Vec<usize>> {
        let per_position = self.by_length.get(&pattern.len())?;
        let mut fixed = pattern.fixed_slots();
        let (first_pos, first_ch) = fixed.next()?;

        let mut acc = per_position[first_pos][(first_ch as u8 - b'A') as usize].clone();
        for (pos, ch) in fixed {
            acc.intersect_with(&per_position[pos][(ch as u8 - b'A') as usize]);
            if acc.is_empty() {
                break;
            }
        }
        Some(acc.iter().collect())
    }
}

/// Pattern-query front end over a read-only [`WordList`].
///
/// Construction is free; [`Matcher::with_index`] additionally enables the
/// bitset index, built lazily on the first indexed query, which pays off
/// once the same dictionary serves many queries (the suggestion panel, or
/// repeated autofill runs).
#[derive(Debug, Clone)]
pub struct Matcher<'a> {
    words: &'a WordList,
    use_index: bool,
    index: OnceCell<PositionIndex>,
}

impl<'a> Matcher<'a> {
    #[must_use]
    pub fn new(words: &'a WordList) -> Self {
        Self { words, use_index: false, index: OnceCell::new() }
    }

    /// A matcher with the `(length, position, letter)` bitset index
    /// enabled.
    #[must_use]
    pub fn with_index(words: &'a WordList) -> Self {
        Self { words, use_index: true, index: OnceCell::new() }
    }

    /// The dictionary this matcher queries.
    #[must_use]
    pub fn word_list(&self) -> &'a WordList {
        self.words
    }

    fn position_index(&self) -> Option<&PositionIndex> {
        if !self.use_index {
            return None;
        }
        Some(self.index.get_or_init(|| PositionIndex::build(self.words)))
    }

    /// Dictionary indices of all words matching `pattern`, in bucket
    /// (alphabetical) order, before any rating filter.
    #[must_use]
    pub fn matching_indices(&self, pattern: &Pattern) -> Vec<usize> {
        let bucket = self.words.bucket(pattern.len());

        // The index only helps when there is at least one fixed slot to
        // intersect on; an all-wildcard pattern is the whole bucket.
        if let Some(index) = self.position_index() {
            if pattern.fixed_slots().next().is_some() {
                if let Some(offsets) = index.query(pattern) {
                    return offsets.into_iter().map(|off| bucket[off]).collect();
                }
                return Vec::new();
            }
        }

        bucket
            .iter()
            .copied()
            .filter(|&idx| pattern.matches(&self.words.entry(idx).word))
            .collect()
    }

    /// All dictionary entries of the pattern's length matching its fixed
    /// slots, filtered by `rating_filter`, in the requested order.
    #[must_use]
    pub fn candidates(
        &self,
        pattern: &Pattern,
        rating_filter: RatingFilter,
        sort: SortOrder,
    ) -> Vec<&'a RatedWord> {
        let mut found: Vec<&RatedWord> = self
            .matching_indices(pattern)
            .into_iter()
            .map(|idx| self.words.entry(idx))
            .filter(|entry| rating_filter.passes(entry.rating))
            .collect();

        match sort {
            // Bucket order is already alphabetical.
            SortOrder::Alphabetical => {}
            SortOrder::RatingDesc => found.sort_by(|a, b| rating_desc(a, b)),
        }
        found
    }
}
