use crate::cell::Cell;
use crate::grid::Grid;
use crate::matcher::Pattern;
use std::collections::HashMap;
use std::fmt;
use std::fmt::Display;
use std::ops::Not;

/// The two crossword directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

impl Not for Direction {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::Across => Self::Down,
            Self::Down => Self::Across,
        }
    }
}

impl Direction {
    /// The `(row, col)` step taken when walking an entry of this direction.
    #[must_use]
    pub fn step(self) -> (usize, usize) {
        match self {
            Self::Across => (0, 1),
            Self::Down => (1, 0),
        }
    }
}

/// Stable identifier for an entry: its direction and start cell.
///
/// Survives edits that do not move the entry's start, which makes it the
/// key for clue maps and autofill diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId {
    pub direction: Direction,
    pub row: usize,
    pub col: usize,
}

impl EntryId {
    #[must_use]
    pub fn new(direction: Direction, row: usize, col: usize) -> Self {
        Self { direction, row, col }
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.direction {
            Direction::Across => 'A',
            Direction::Down => 'D',
        };
        write!(f, "{tag}({},{})", self.row, self.col)
    }
}

/// A maximal run of playable cells in one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    /// Display number shared with a same-start entry of the other direction.
    pub number: u32,
    pub length: usize,
}

impl Entry {
    /// The `(row, col)` of the i-th cell of this entry.
    #[must_use]
    pub fn cell(&self, i: usize) -> (usize, usize) {
        debug_assert!(i < self.length);
        let (dr, dc) = self.id.direction.step();
        (self.id.row + dr * i, self.id.col + dc * i)
    }

    /// Iterate the entry's cell coordinates in order of travel.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.length).map(|i| self.cell(i))
    }
}

/// Per-cell entry membership: indices into `WordIndex::entries` for the
/// across and down entries that contain the cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellEntries {
    pub across: Option<usize>,
    pub down: Option<usize>,
}

/// The derived view of a grid snapshot: numbered entries plus position
/// lookups. Built by one pure scan; rebuilding on the same grid always
/// yields the same index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordIndex {
    /// All entries, sorted by (number, across-before-down).
    entries: Vec<Entry>,
    /// Display number of each numbered start cell.
    numbers: HashMap<(usize, usize), u32>,
    /// Membership of every playable cell.
    membership: HashMap<(usize, usize), CellEntries>,
}

impl WordIndex {
    /// Scan `grid` and derive its entries.
    ///
    /// A cell starts an entry in a direction iff it is playable and its
    /// neighbor on the opposite side of travel is the boundary or a block.
    /// Numbers are assigned sequentially from 1 over start positions in
    /// reading order; an across and a down entry starting at the same cell
    /// share their number.
    #[must_use]
    pub fn build(grid: &Grid) -> Self {
        let mut entries: Vec<Entry> = Vec::new();
        let mut numbers = HashMap::new();
        let mut next_number: u32 = 1;

        for (r, c) in grid.positions() {
            let starts_across = Self::starts(grid, r, c, Direction::Across);
            let starts_down = Self::starts(grid, r, c, Direction::Down);
            if !starts_across && !starts_down {
                continue;
            }

            let number = next_number;
            next_number += 1;
            numbers.insert((r, c), number);

            if starts_across {
                entries.push(Entry {
                    id: EntryId::new(Direction::Across, r, c),
                    number,
                    length: Self::run_length(grid, r, c, Direction::Across),
                });
            }
            if starts_down {
                entries.push(Entry {
                    id: EntryId::new(Direction::Down, r, c),
                    number,
                    length: Self::run_length(grid, r, c, Direction::Down),
                });
            }
        }

        // Reading order already yields (number, across-first); membership
        // is filled afterwards so entry indices are final.
        let mut membership: HashMap<(usize, usize), CellEntries> = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            for pos in entry.cells() {
                let slot = membership.entry(pos).or_default();
                match entry.id.direction {
                    Direction::Across => slot.across = Some(idx),
                    Direction::Down => slot.down = Some(idx),
                }
            }
        }

        Self { entries, numbers, membership }
    }

    fn starts(grid: &Grid, r: usize, c: usize, direction: Direction) -> bool {
        if !grid.at_or_black(r as isize, c as isize).is_playable() {
            return false;
        }
        let (dr, dc) = direction.step();
        let prev = grid.at_or_black(r as isize - dr as isize, c as isize - dc as isize);
        prev.is_black()
    }

    fn run_length(grid: &Grid, r: usize, c: usize, direction: Direction) -> usize {
        let (dr, dc) = direction.step();
        let mut len = 0;
        while grid
            .at_or_black((r + dr * len) as isize, (c + dc * len) as isize)
            .is_playable()
        {
            len += 1;
        }
        len
    }

    /// All entries, sorted by (number, across before down).
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The entry with the given id, if the grid currently has one.
    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// The display number at a start position, if that cell starts an entry.
    #[must_use]
    pub fn number_at(&self, row: usize, col: usize) -> Option<u32> {
        self.numbers.get(&(row, col)).copied()
    }

    /// The across/down entries containing a playable cell.
    #[must_use]
    pub fn entries_at(&self, row: usize, col: usize) -> CellEntries {
        self.membership.get(&(row, col)).copied().unwrap_or_default()
    }

    /// Derive the pattern of an entry from the grid it was built against:
    /// letters become fixed slots, empty cells become wildcards.
    #[must_use]
    pub fn pattern_of(&self, grid: &Grid, entry: &Entry) -> Pattern {
        Pattern::from_slots(entry.cells().map(|(r, c)| {
            match grid.get(r, c) {
                Ok(Cell::Letter(ch)) => Some(ch),
                _ => None,
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Symmetry;

    fn grid(template: &str) -> Grid {
        Grid::from_template(template).unwrap()
    }

    #[test]
    fn test_open_grid_numbering() {
        let g = grid("...\n...\n...");
        let wi = WordIndex::build(&g);
        // 3 across + 3 down; starts share numbers along the top-left edge.
        assert_eq!(wi.entries().len(), 6);
        assert_eq!(wi.number_at(0, 0), Some(1));
        assert_eq!(wi.number_at(0, 1), Some(2));
        assert_eq!(wi.number_at(0, 2), Some(3));
        assert_eq!(wi.number_at(1, 0), Some(4));
        assert_eq!(wi.number_at(2, 0), Some(5));
        assert_eq!(wi.number_at(1, 1), None);
    }

    #[test]
    fn test_across_before_down_on_shared_number() {
        let g = grid("..\n..");
        let wi = WordIndex::build(&g);
        let first_two: Vec<_> = wi.entries().iter().take(2).map(|e| e.id.direction).collect();
        assert_eq!(first_two, vec![Direction::Across, Direction::Down]);
        assert_eq!(wi.entries()[0].number, 1);
        assert_eq!(wi.entries()[1].number, 1);
    }

    #[test]
    fn test_centre_block_five_by_five() {
        let mut g = Grid::new(5, 5).unwrap();
        g.set_cell(2, 2, Cell::Black, Symmetry::None).unwrap();
        let wi = WordIndex::build(&g);

        let across = wi.entries().iter().filter(|e| e.id.direction == Direction::Across).count();
        let down = wi.entries().iter().filter(|e| e.id.direction == Direction::Down).count();
        assert_eq!(across, 6);
        assert_eq!(down, 6);

        assert_eq!(wi.number_at(0, 0), Some(1));
        // Reading-order numbering: five down starts across the top row,
        // then the row-1 and row-2 across starts, putting (2,3) at 8.
        assert_eq!(wi.number_at(2, 3), Some(8));
        let e = wi.entry(EntryId::new(Direction::Across, 2, 3)).unwrap();
        assert_eq!(e.number, 8);
        assert_eq!(e.length, 2);
    }

    #[test]
    fn test_block_splits_runs() {
        let g = grid("..#..");
        let wi = WordIndex::build(&g);
        let across: Vec<_> = wi
            .entries()
            .iter()
            .filter(|e| e.id.direction == Direction::Across)
            .collect();
        assert_eq!(across.len(), 2);
        assert_eq!(across[0].length, 2);
        assert_eq!(across[1].id, EntryId::new(Direction::Across, 0, 3));
        assert_eq!(across[1].length, 2);
    }

    #[test]
    fn test_length_one_entries_are_reported() {
        // The centre cell of the cross shape is playable with blocks on
        // all sides of the outer cells; (1,0) and (0,1) start length-1
        // runs in the other direction.
        let g = grid("#.#\n...\n#.#");
        let wi = WordIndex::build(&g);
        let one_long = wi.entries().iter().filter(|e| e.length == 1).count();
        // Across run of row 1 is length 3; down run of col 1 is length 3;
        // (1,0) and (1,2) start length-1 down runs, (0,1)/(2,1) start
        // length-1 across runs.
        assert_eq!(one_long, 4);
    }

    #[test]
    fn test_membership_covers_every_playable_cell() {
        let mut g = Grid::new(4, 4).unwrap();
        g.set_cell(1, 1, Cell::Black, Symmetry::None).unwrap();
        let wi = WordIndex::build(&g);
        for (r, c) in g.positions() {
            let m = wi.entries_at(r, c);
            if g.get(r, c).unwrap().is_black() {
                assert_eq!(m, CellEntries::default());
            } else {
                let across = m.across.expect("playable cell in an across entry");
                let down = m.down.expect("playable cell in a down entry");
                assert!(wi.entries()[across].cells().any(|pos| pos == (r, c)));
                assert!(wi.entries()[down].cells().any(|pos| pos == (r, c)));
            }
        }
    }

    #[test]
    fn test_determinism() {
        let g = grid(".#..\n....\n..#.");
        assert_eq!(WordIndex::build(&g), WordIndex::build(&g));
    }

    #[test]
    fn test_pattern_derivation() {
        let g = grid("A.T");
        let wi = WordIndex::build(&g);
        let entry = wi.entry(EntryId::new(Direction::Across, 0, 0)).unwrap();
        let p = wi.pattern_of(&g, entry);
        assert_eq!(p.to_string(), "A.T");
        assert!(!p.is_complete());

        let full = grid("CAT");
        let wi = WordIndex::build(&full);
        let entry = wi.entry(EntryId::new(Direction::Across, 0, 0)).unwrap();
        assert!(wi.pattern_of(&full, entry).is_complete());
    }
}
