//! `word_list` — load and preprocess the construction dictionary.
//!
//! A word list is built once per process from one or more plain-text
//! sources and is read-only afterwards. Each source line is either `WORD`
//! or `WORD;RATING`:
//! - lines starting with `#` and blank lines are skipped,
//! - words are normalized to uppercase,
//! - the rating is a non-negative base-10 integer; an unparseable or
//!   missing rating means the word is unranked.
//!
//! Merging multiple sources deduplicates words, keeping the maximum rating
//! seen; a merged word is unranked only if every occurrence was unranked.
//! Entries are stored sorted by length then alphabetically, and grouped by
//! length so pattern queries never touch words of the wrong length.
//!
//! The module is WASM-friendly: `parse_from_str`/`from_sources` work
//! everywhere; `load_from_path` exists only on native builds.

use std::collections::HashMap;

/// A dictionary word with its optional quality rating (higher is better).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatedWord {
    /// Uppercase A-Z word.
    pub word: String,
    /// Quality rating; `None` means unranked.
    pub rating: Option<u32>,
}

/// The indexed, deduplicated dictionary.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    /// Canonical entries, sorted by (length, alphabetical).
    entries: Vec<RatedWord>,
    /// Indices into `entries`, keyed by word length. Each bucket is in
    /// ascending (therefore alphabetical) order.
    by_length: HashMap<usize, Vec<usize>>,
}

impl WordList {
    /// Parse a single source from an in-memory string.
    #[must_use]
    pub fn parse_from_str(contents: &str) -> Self {
        Self::from_sources([contents])
    }

    /// Parse and merge any number of sources.
    #[must_use]
    pub fn from_sources<'a>(sources: impl IntoIterator<Item = &'a str>) -> Self {
        // Merge map: word -> best rating seen so far.
        let mut best: HashMap<String, Option<u32>> = HashMap::new();

        for contents in sources {
            for raw_line in contents.lines() {
                let line = raw_line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }

                // `WORD` alone, or `WORD;RATING` split on the first ';'
                // so stray separators later in the line stay harmless.
                let (word_raw, rating) = match line.split_once(';') {
                    Some((w, r)) => (w, r.trim().parse::<u32>().ok()),
                    None => (line, None),
                };

                let word = word_raw.trim().to_uppercase();
                if word.is_empty() || !word.bytes().all(|b| b.is_ascii_uppercase()) {
                    continue;
                }

                // Keep the maximum rating across all occurrences; a word is
                // unranked only if no occurrence carried a rating.
                best.entry(word)
                    .and_modify(|existing| {
                        *existing = match (*existing, rating) {
                            (Some(a), Some(b)) => Some(a.max(b)),
                            (a, b) => a.or(b),
                        };
                    })
                    .or_insert(rating);
            }
        }

        let mut entries: Vec<RatedWord> = best
            .into_iter()
            .map(|(word, rating)| RatedWord { word, rating })
            .collect();

        // Sort by length, then alphabetically, so each length bucket comes
        // out in lexicographic order for free.
        entries.sort_by(|a, b| {
            a.word
                .len()
                .cmp(&b.word.len())
                .then_with(|| a.word.cmp(&b.word))
        });

        let mut by_length: HashMap<usize, Vec<usize>> = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            by_length.entry(entry.word.len()).or_default().push(idx);
        }

        Self { entries, by_length }
    }

    /// Native-only convenience: read one or more files and merge them.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error, annotated with the offending path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_paths<P: AsRef<std::path::Path>>(paths: &[P]) -> std::io::Result<Self> {
        let mut texts = Vec::with_capacity(paths.len());
        for path in paths {
            let path_ref = path.as_ref();
            let data = std::fs::read_to_string(path_ref).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!("failed to read word list '{}': {}", path_ref.display(), e),
                )
            })?;
            texts.push(data);
        }
        Ok(Self::from_sources(texts.iter().map(String::as_str)))
    }

    /// All canonical entries, sorted by (length, alphabetical).
    #[must_use]
    pub fn entries(&self) -> &[RatedWord] {
        &self.entries
    }

    /// The entry at a canonical index.
    #[must_use]
    pub fn entry(&self, idx: usize) -> &RatedWord {
        &self.entries[idx]
    }

    /// Indices of all words of the given length, in alphabetical order.
    #[must_use]
    pub fn bucket(&self, len: usize) -> &[usize] {
        self.by_length.get(&len).map_or(&[], Vec::as_slice)
    }

    /// Number of canonical entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
