//! `workbench` — the composition point for construction sessions.
//!
//! A [`Workbench`] owns the grid, the clue map, and the puzzle metadata,
//! and wires the pure core modules together into the operations a host
//! (UI shell, CLI, wasm page) actually calls: symmetric editing, entry
//! suggestions, filling a single entry, whole-grid autofill previews, and
//! `.puz` import/export. The core modules stay stateless; everything
//! session-shaped lives here.

use crate::autofill::{autofill, FillOptions, FillResult};
use crate::cell::{Cell, Symmetry};
use crate::errors::{FillError, GridError, PuzError};
use crate::grid::Grid;
use crate::matcher::{Matcher, Pattern, RatingFilter, SortOrder};
use crate::puz::Puzzle;
use crate::word_index::{Entry, EntryId, WordIndex};
use crate::word_list::{RatedWord, WordList};
use std::collections::HashMap;

/// One construction session: a grid plus clues and metadata.
#[derive(Debug, Clone)]
pub struct Workbench {
    grid: Grid,
    clues: HashMap<EntryId, String>,
    symmetry: Symmetry,
    pub title: String,
    pub author: String,
    pub copyright: String,
    pub notes: String,
}

impl Workbench {
    /// Start a session on an empty `rows x cols` grid with the default
    /// rotational symmetry.
    ///
    /// # Errors
    ///
    /// `InvalidGeometry` for out-of-range dimensions.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        Ok(Self::from_grid(Grid::new(rows, cols)?))
    }

    /// Start a session on an existing grid.
    #[must_use]
    pub fn from_grid(grid: Grid) -> Self {
        Self {
            grid,
            clues: HashMap::new(),
            symmetry: Symmetry::default(),
            title: String::new(),
            author: String::new(),
            copyright: String::new(),
            notes: String::new(),
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    pub fn set_symmetry(&mut self, symmetry: Symmetry) {
        self.symmetry = symmetry;
    }

    /// Edit one cell under the session's symmetry mode.
    ///
    /// # Errors
    ///
    /// Propagates the grid's bounds and letter validation.
    pub fn set_cell(&mut self, row: usize, col: usize, value: Cell) -> Result<(), GridError> {
        self.grid.set_cell(row, col, value, self.symmetry)
    }

    /// Resize the grid, keeping the top-left region.
    ///
    /// # Errors
    ///
    /// `InvalidGeometry` for out-of-range dimensions.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<(), GridError> {
        self.grid.resize(rows, cols)
    }

    /// Erase all letters, keeping the block pattern and clues.
    pub fn clear_letters(&mut self) {
        self.grid.clear_letters();
    }

    /// The entry index of the current grid. Derived fresh on each call;
    /// cache at the call site when reusing a snapshot.
    #[must_use]
    pub fn word_index(&self) -> WordIndex {
        WordIndex::build(&self.grid)
    }

    fn lookup<'a>(&self, index: &'a WordIndex, id: EntryId) -> Result<&'a Entry, FillError> {
        index.entry(id).ok_or(FillError::UnknownEntry { entry: id })
    }

    /// The pattern of the entry starting at `id`.
    ///
    /// # Errors
    ///
    /// `UnknownEntry` if no entry starts there.
    pub fn pattern_of(&self, id: EntryId) -> Result<Pattern, FillError> {
        let index = self.word_index();
        let entry = self.lookup(&index, id)?;
        Ok(index.pattern_of(&self.grid, entry))
    }

    /// Dictionary suggestions for one entry, honoring its current letters.
    ///
    /// # Errors
    ///
    /// `UnknownEntry` if no entry starts at `id`.
    pub fn suggestions<'a>(
        &self,
        words: &'a WordList,
        id: EntryId,
        rating_filter: RatingFilter,
        sort: SortOrder,
    ) -> Result<Vec<&'a RatedWord>, FillError> {
        let pattern = self.pattern_of(id)?;
        Ok(Matcher::new(words).candidates(&pattern, rating_filter, sort))
    }

    /// Write `word` into the entry at `id`, overwriting its letters.
    ///
    /// # Errors
    ///
    /// `UnknownEntry`, `LengthMismatch`, or `InvalidWord` when the word
    /// is not plain A-Z.
    pub fn fill_entry(&mut self, id: EntryId, word: &str) -> Result<(), FillError> {
        let word = word.to_ascii_uppercase();
        if !word.bytes().all(|b| b.is_ascii_uppercase()) || word.is_empty() {
            return Err(FillError::InvalidWord { word });
        }
        let index = self.word_index();
        let entry = self.lookup(&index, id)?;
        if entry.length != word.len() {
            return Err(FillError::LengthMismatch {
                pattern_len: word.len(),
                entry_len: entry.length,
            });
        }

        for ((r, c), b) in entry.cells().zip(word.bytes()) {
            self.grid
                .set_cell(r, c, Cell::Letter(b as char), Symmetry::None)
                .expect("entry cell in bounds");
        }
        Ok(())
    }

    /// Enumerate autofill previews for the current grid. The session grid
    /// is untouched; apply a preview with [`Workbench::apply_preview`].
    #[must_use]
    pub fn autofill(&self, words: &WordList, options: FillOptions<'_>) -> FillResult {
        autofill(words, &self.grid, options)
    }

    /// Replace the session grid with a chosen preview (or any grid).
    pub fn apply_preview(&mut self, grid: Grid) {
        self.grid = grid;
    }

    /// Set or clear the clue for an entry. Empty text removes the clue.
    pub fn set_clue(&mut self, id: EntryId, text: &str) {
        if text.is_empty() {
            self.clues.remove(&id);
        } else {
            self.clues.insert(id, text.to_string());
        }
    }

    #[must_use]
    pub fn clue(&self, id: EntryId) -> Option<&str> {
        self.clues.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn clues(&self) -> &HashMap<EntryId, String> {
        &self.clues
    }

    /// Export the session as `.puz` bytes (metadata truncated at the
    /// format caps).
    ///
    /// # Errors
    ///
    /// `Unencodable` for non-ISO-8859-1 text.
    pub fn export_puz(&self) -> Result<Vec<u8>, PuzError> {
        self.to_puzzle().encode()
    }

    /// Load a `.puz` byte stream, replacing the grid, clues, and metadata.
    ///
    /// # Errors
    ///
    /// Any decode failure; on error the session is unchanged.
    pub fn import_puz(&mut self, data: &[u8]) -> Result<(), PuzError> {
        let puzzle = Puzzle::decode(data)?;
        *self = Self::from_puzzle(puzzle);
        Ok(())
    }

    /// Build a session from a decoded puzzle document.
    #[must_use]
    pub fn from_puzzle(puzzle: Puzzle) -> Self {
        Self {
            grid: puzzle.grid,
            clues: puzzle.clues,
            symmetry: Symmetry::default(),
            title: puzzle.title,
            author: puzzle.author,
            copyright: puzzle.copyright,
            notes: puzzle.notes,
        }
    }

    fn to_puzzle(&self) -> Puzzle {
        Puzzle {
            grid: self.grid.clone(),
            clues: self.clues.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            copyright: self.copyright.clone(),
            notes: self.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word_index::Direction;

    fn dict() -> WordList {
        WordList::parse_from_str("ant;40\nart;60\nbat\naba\ntab")
    }

    #[test]
    fn test_symmetric_editing_through_the_session() {
        let mut wb = Workbench::new(4, 4).unwrap();
        wb.set_cell(0, 1, Cell::Black).unwrap();
        assert_eq!(wb.grid().get(3, 2).unwrap(), Cell::Black);

        wb.set_symmetry(Symmetry::None);
        wb.set_cell(0, 0, Cell::Black).unwrap();
        assert_eq!(wb.grid().get(3, 3).unwrap(), Cell::Empty);
    }

    #[test]
    fn test_suggestions_respect_entry_letters() {
        let mut wb = Workbench::from_grid(Grid::from_template("A.T").unwrap());
        wb.set_symmetry(Symmetry::None);
        let dict = dict();
        let found = wb
            .suggestions(
                &dict,
                EntryId::new(Direction::Across, 0, 0),
                RatingFilter::any(),
                SortOrder::Alphabetical,
            )
            .unwrap();
        let words: Vec<&str> = found.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["ANT", "ART"]);
    }

    #[test]
    fn test_fill_entry_writes_letters() {
        let mut wb = Workbench::new(1, 3).unwrap();
        wb.fill_entry(EntryId::new(Direction::Across, 0, 0), "bat").unwrap();
        assert_eq!(wb.grid().get(0, 0).unwrap(), Cell::Letter('B'));
        assert_eq!(wb.grid().get(0, 2).unwrap(), Cell::Letter('T'));
    }

    #[test]
    fn test_fill_entry_validates() {
        let mut wb = Workbench::new(1, 3).unwrap();
        let id = EntryId::new(Direction::Across, 0, 0);
        assert_eq!(
            wb.fill_entry(id, "toolong"),
            Err(FillError::LengthMismatch { pattern_len: 7, entry_len: 3 })
        );
        assert!(matches!(
            wb.fill_entry(id, "a-b"),
            Err(FillError::InvalidWord { .. })
        ));
        assert_eq!(
            wb.fill_entry(EntryId::new(Direction::Down, 2, 2), "bat"),
            Err(FillError::UnknownEntry { entry: EntryId::new(Direction::Down, 2, 2) })
        );
    }

    #[test]
    fn test_autofill_preview_leaves_session_untouched() {
        let words = WordList::parse_from_str("ab\nba\naa");
        let wb = Workbench::new(2, 2).unwrap();
        let result = wb.autofill(&words, FillOptions::default());
        assert!(!result.grids.is_empty());
        assert!(!wb.grid().is_filled());

        let mut wb = wb;
        let preview = result.grids[0].clone();
        wb.apply_preview(preview.clone());
        assert_eq!(wb.grid(), &preview);
        assert!(wb.grid().is_filled());
    }

    #[test]
    fn test_clue_round_trip_through_puz() {
        let mut wb = Workbench::from_grid(Grid::from_template("CAT\nA#A\nBAR").unwrap());
        let one_across = EntryId::new(Direction::Across, 0, 0);
        wb.set_clue(one_across, "Feline");
        wb.title = "Mini".into();

        let bytes = wb.export_puz().unwrap();
        let mut loaded = Workbench::new(1, 1).unwrap();
        loaded.import_puz(&bytes).unwrap();

        assert_eq!(loaded.grid(), wb.grid());
        assert_eq!(loaded.clue(one_across), Some("Feline"));
        assert_eq!(loaded.title, "Mini");
    }

    #[test]
    fn test_clearing_a_clue() {
        let mut wb = Workbench::new(3, 3).unwrap();
        let id = EntryId::new(Direction::Across, 0, 0);
        wb.set_clue(id, "Something");
        wb.set_clue(id, "");
        assert_eq!(wb.clue(id), None);
    }
}
