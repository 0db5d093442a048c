//! `puz` — codec for the Across Lite `.puz` binary format.
//!
//! The format is little-endian: a 52-byte header, the solution and
//! player-state grids (one byte per cell, row-major), then a table of
//! NUL-terminated strings (title, author, copyright, one clue per entry,
//! notes). Strings predate UTF-8 and are treated as ISO-8859-1, one byte
//! per char in both directions.
//!
//! Encoding is bit-exact and always emits valid checksums. Decoding
//! rejects a bad magic or geometry but deliberately does not verify
//! checksums, so legacy files with stale sums still load.

mod checksum;

pub use checksum::cksum_region;

use crate::cell::Cell;
use crate::errors::PuzError;
use crate::grid::Grid;
use crate::word_index::{EntryId, WordIndex};
use checksum::masked_block;
use std::collections::HashMap;

const MAGIC: &[u8; 12] = b"ACROSS&DOWN\0";
const VERSION: &[u8; 4] = b"1.3\0";

const OFF_MAGIC: usize = 0x02;
const OFF_CIB_CHECKSUM: usize = 0x0E;
const OFF_MASKED: usize = 0x10;
const OFF_VERSION: usize = 0x18;
const OFF_SCRAMBLED_CHECKSUM: usize = 0x1E;
const OFF_WIDTH: usize = 0x2C;
const OFF_HEIGHT: usize = 0x2D;
const OFF_NUM_CLUES: usize = 0x2E;
const OFF_BITMASK: usize = 0x30;
const OFF_SCRAMBLED_TAG: usize = 0x32;
const HEADER_LEN: usize = 0x34;

/// Byte caps the format imposes on the metadata strings.
pub const TITLE_CAP: usize = 50;
pub const AUTHOR_CAP: usize = 50;
pub const COPYRIGHT_CAP: usize = 200;
pub const NOTES_CAP: usize = 2000;

/// A puzzle document as the codec sees it: the solution grid, clue text
/// keyed by entry, and the metadata strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Puzzle {
    pub grid: Grid,
    pub clues: HashMap<EntryId, String>,
    pub title: String,
    pub author: String,
    pub copyright: String,
    pub notes: String,
}

impl Puzzle {
    /// A puzzle with the given grid and no clues or metadata.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            clues: HashMap::new(),
            title: String::new(),
            author: String::new(),
            copyright: String::new(),
            notes: String::new(),
        }
    }

    /// Encode to `.puz` bytes, truncating metadata strings at their
    /// format caps.
    ///
    /// # Errors
    ///
    /// `Unencodable` if a string contains a char outside ISO-8859-1.
    pub fn encode(&self) -> Result<Vec<u8>, PuzError> {
        encode(self, true)
    }

    /// Encode to `.puz` bytes, rejecting over-cap metadata strings
    /// instead of truncating.
    ///
    /// # Errors
    ///
    /// `EncodeCapExceeded` for an over-long string, `Unencodable` for a
    /// char outside ISO-8859-1.
    pub fn encode_strict(&self) -> Result<Vec<u8>, PuzError> {
        encode(self, false)
    }

    /// Decode a `.puz` byte stream.
    ///
    /// # Errors
    ///
    /// `InvalidMagic`, `InvalidGeometry`, `Truncated`, or
    /// `BadSolutionByte` as described in the module docs.
    pub fn decode(data: &[u8]) -> Result<Self, PuzError> {
        decode(data)
    }
}

/// Entries of the grid in clue order: ascending number, across before
/// down on a shared number. This is the order clue strings are written
/// and re-associated in.
fn clue_order(index: &WordIndex) -> Vec<EntryId> {
    // WordIndex::entries is already sorted by (number, across-first).
    index.entries().iter().map(|e| e.id).collect()
}

fn latin1_bytes(s: &str) -> Result<Vec<u8>, PuzError> {
    s.chars()
        .map(|ch| u8::try_from(u32::from(ch)).map_err(|_| PuzError::Unencodable { ch }))
        .collect()
}

fn latin1_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn capped(
    s: &str,
    field: &'static str,
    cap: usize,
    truncate: bool,
) -> Result<Vec<u8>, PuzError> {
    let mut bytes = latin1_bytes(s)?;
    if bytes.len() > cap {
        if !truncate {
            return Err(PuzError::EncodeCapExceeded { field, len: bytes.len(), cap });
        }
        bytes.truncate(cap);
    }
    Ok(bytes)
}

fn push_u16_le(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn encode(puzzle: &Puzzle, truncate: bool) -> Result<Vec<u8>, PuzError> {
    let grid = &puzzle.grid;
    let rows = grid.rows();
    let cols = grid.cols();

    let solution = grid.to_puz_bytes();
    // The construction core has no play state: every playable cell is
    // emitted empty.
    let state: Vec<u8> = solution
        .iter()
        .map(|&b| if b == b'.' { b'.' } else { b'-' })
        .collect();

    let index = WordIndex::build(grid);
    let order = clue_order(&index);
    let clues: Vec<Vec<u8>> = order
        .iter()
        .map(|id| latin1_bytes(puzzle.clues.get(id).map_or("", String::as_str)))
        .collect::<Result<_, _>>()?;
    let num_clues = u16::try_from(clues.len()).expect("entry count fits u16");

    let title = capped(&puzzle.title, "title", TITLE_CAP, truncate)?;
    let author = capped(&puzzle.author, "author", AUTHOR_CAP, truncate)?;
    let copyright = capped(&puzzle.copyright, "copyright", COPYRIGHT_CAP, truncate)?;
    let notes = capped(&puzzle.notes, "notes", NOTES_CAP, truncate)?;

    // CIB: width, height, clue count, bitmask, scrambled tag.
    let mut cib = Vec::with_capacity(8);
    cib.push(cols as u8);
    cib.push(rows as u8);
    push_u16_le(&mut cib, num_clues);
    push_u16_le(&mut cib, 0); // bitmask
    push_u16_le(&mut cib, 0); // scrambled tag

    let c_cib = cksum_region(&cib, 0);
    let c_sol = cksum_region(&solution, 0);
    let c_grid = cksum_region(&state, 0);

    // String-section fold: metadata strings include their terminator,
    // clues do not (the format's quirk), empty strings contribute nothing.
    let fold_strings = |mut c: u16| -> u16 {
        for s in [&title, &author, &copyright] {
            if !s.is_empty() {
                c = cksum_region(s, c);
                c = cksum_region(&[0], c);
            }
        }
        for clue in &clues {
            if !clue.is_empty() {
                c = cksum_region(clue, c);
            }
        }
        if !notes.is_empty() {
            c = cksum_region(&notes, c);
            c = cksum_region(&[0], c);
        }
        c
    };
    let c_part = fold_strings(0);

    let mut c_overall = c_cib;
    c_overall = cksum_region(&solution, c_overall);
    c_overall = cksum_region(&state, c_overall);
    c_overall = fold_strings(c_overall);

    let mut buf = Vec::with_capacity(HEADER_LEN + 2 * rows * cols + 64);
    push_u16_le(&mut buf, c_overall);
    buf.extend_from_slice(MAGIC);
    push_u16_le(&mut buf, c_cib);
    buf.extend_from_slice(&masked_block(c_cib, c_sol, c_grid, c_part));
    buf.extend_from_slice(VERSION);
    push_u16_le(&mut buf, 0); // reserved
    push_u16_le(&mut buf, 0); // scrambled-solution checksum
    buf.extend_from_slice(&[0u8; 12]); // reserved
    buf.extend_from_slice(&cib);
    debug_assert_eq!(buf.len(), HEADER_LEN);

    buf.extend_from_slice(&solution);
    buf.extend_from_slice(&state);
    for s in [&title, &author, &copyright] {
        buf.extend_from_slice(s);
        buf.push(0);
    }
    for clue in &clues {
        buf.extend_from_slice(clue);
        buf.push(0);
    }
    buf.extend_from_slice(&notes);
    buf.push(0);

    Ok(buf)
}

/// Cursor over the string table; every read checks the remaining buffer.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], PuzError> {
        if self.pos + n > self.data.len() {
            return Err(PuzError::Truncated {
                offset: self.pos,
                needed: self.pos + n - self.data.len(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_string(&mut self) -> Result<String, PuzError> {
        let rest = &self.data[self.pos..];
        let Some(nul) = rest.iter().position(|&b| b == 0) else {
            return Err(PuzError::Truncated { offset: self.pos, needed: 1 });
        };
        let s = latin1_string(&rest[..nul]);
        self.pos += nul + 1;
        Ok(s)
    }
}

fn decode(data: &[u8]) -> Result<Puzzle, PuzError> {
    if data.len() < HEADER_LEN {
        return Err(PuzError::Truncated {
            offset: data.len(),
            needed: HEADER_LEN - data.len(),
        });
    }
    if &data[OFF_MAGIC..OFF_MAGIC + MAGIC.len()] != MAGIC {
        return Err(PuzError::InvalidMagic);
    }

    let cols = usize::from(data[OFF_WIDTH]);
    let rows = usize::from(data[OFF_HEIGHT]);
    if rows == 0 || cols == 0 {
        return Err(PuzError::InvalidGeometry { rows, cols });
    }
    let num_clues =
        usize::from(u16::from_le_bytes([data[OFF_NUM_CLUES], data[OFF_NUM_CLUES + 1]]));

    let mut reader = Reader { data, pos: HEADER_LEN };
    let solution = reader.take(rows * cols)?.to_vec();
    let _state = reader.take(rows * cols)?;

    let mut grid =
        Grid::new(rows, cols).map_err(|_| PuzError::InvalidGeometry { rows, cols })?;
    for (i, &byte) in solution.iter().enumerate() {
        let (r, c) = (i / cols, i % cols);
        let cell = match byte {
            b'.' => Cell::Black,
            b'-' => Cell::Empty,
            b'A'..=b'Z' => Cell::Letter(byte as char),
            b'a'..=b'z' => Cell::Letter(byte.to_ascii_uppercase() as char),
            _ => return Err(PuzError::BadSolutionByte { byte, row: r, col: c }),
        };
        grid.set_cell(r, c, cell, crate::cell::Symmetry::None)
            .expect("decoded cell in bounds");
    }

    let title = reader.take_string()?;
    let author = reader.take_string()?;
    let copyright = reader.take_string()?;
    let clue_strings: Vec<String> = (0..num_clues)
        .map(|_| reader.take_string())
        .collect::<Result<_, _>>()?;
    let notes = reader.take_string()?;

    // Re-associate clues by rebuilding the index of the decoded grid and
    // consuming strings in the same (number, across-first) order they
    // were written in. Extra strings in a malformed file are ignored.
    let index = WordIndex::build(&grid);
    let mut clues = HashMap::new();
    for (id, text) in clue_order(&index).into_iter().zip(clue_strings) {
        if !text.is_empty() {
            clues.insert(id, text);
        }
    }

    Ok(Puzzle { grid, clues, title, author, copyright, notes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word_index::Direction;

    fn sample_puzzle() -> Puzzle {
        let grid = Grid::from_template("CAT\nA#A\nBAR").unwrap();
        let mut puzzle = Puzzle::new(grid);
        puzzle.title = "Test".into();
        puzzle.author = "A. Constructor".into();
        puzzle.copyright = "© 2024".into();
        puzzle.notes = "built by hand".into();
        puzzle.clues.insert(EntryId::new(Direction::Across, 0, 0), "Feline".into());
        puzzle.clues.insert(EntryId::new(Direction::Down, 0, 0), "Taxi".into());
        puzzle.clues.insert(EntryId::new(Direction::Across, 2, 0), "Tavern".into());
        puzzle
    }

    #[test]
    fn test_round_trip() {
        let puzzle = sample_puzzle();
        let bytes = puzzle.encode().unwrap();
        let decoded = Puzzle::decode(&bytes).unwrap();
        assert_eq!(decoded, puzzle);
    }

    #[test]
    fn test_header_fields() {
        let bytes = sample_puzzle().encode().unwrap();
        assert_eq!(&bytes[OFF_MAGIC..OFF_MAGIC + 12], MAGIC);
        assert_eq!(&bytes[OFF_VERSION..OFF_VERSION + 4], VERSION);
        assert_eq!(bytes[OFF_WIDTH], 3);
        assert_eq!(bytes[OFF_HEIGHT], 3);
        // 8 entries (including the length-1 runs) -> 8 clue slots,
        // whether or not text exists.
        assert_eq!(u16::from_le_bytes([bytes[OFF_NUM_CLUES], bytes[OFF_NUM_CLUES + 1]]), 8);
        assert_eq!(&bytes[OFF_BITMASK..OFF_BITMASK + 2], &[0, 0]);
        assert_eq!(&bytes[OFF_SCRAMBLED_TAG..OFF_SCRAMBLED_TAG + 2], &[0, 0]);
        assert_eq!(&bytes[OFF_SCRAMBLED_CHECKSUM..OFF_SCRAMBLED_CHECKSUM + 2], &[0, 0]);
    }

    #[test]
    fn test_stored_checksums_recompute() {
        let bytes = sample_puzzle().encode().unwrap();
        let wh = 9;

        let c_cib = cksum_region(&bytes[OFF_WIDTH..OFF_WIDTH + 8], 0);
        assert_eq!(
            c_cib,
            u16::from_le_bytes([bytes[OFF_CIB_CHECKSUM], bytes[OFF_CIB_CHECKSUM + 1]])
        );

        // Overall checksum: CIB state folded over grids then strings.
        let mut c = c_cib;
        c = cksum_region(&bytes[HEADER_LEN..HEADER_LEN + 2 * wh], c);
        let strings = &bytes[HEADER_LEN + 2 * wh..];
        let mut parts = strings.split(|&b| b == 0);
        for _ in 0..3 {
            let s = parts.next().unwrap();
            if !s.is_empty() {
                c = cksum_region(s, c);
                c = cksum_region(&[0], c);
            }
        }
        for _ in 0..8 {
            let s = parts.next().unwrap();
            if !s.is_empty() {
                c = cksum_region(s, c);
            }
        }
        let notes = parts.next().unwrap();
        if !notes.is_empty() {
            c = cksum_region(notes, c);
            c = cksum_region(&[0], c);
        }
        assert_eq!(c, u16::from_le_bytes([bytes[0], bytes[1]]));
    }

    #[test]
    fn test_masked_checksums_recompute() {
        let bytes = sample_puzzle().encode().unwrap();
        let wh = 9;
        let c_cib = cksum_region(&bytes[OFF_WIDTH..OFF_WIDTH + 8], 0);
        let c_sol = cksum_region(&bytes[HEADER_LEN..HEADER_LEN + wh], 0);
        let c_grid = cksum_region(&bytes[HEADER_LEN + wh..HEADER_LEN + 2 * wh], 0);

        assert_eq!(bytes[OFF_MASKED], b'I' ^ (c_cib & 0xFF) as u8);
        assert_eq!(bytes[OFF_MASKED + 1], b'C' ^ (c_sol & 0xFF) as u8);
        assert_eq!(bytes[OFF_MASKED + 2], b'H' ^ (c_grid & 0xFF) as u8);
        assert_eq!(bytes[OFF_MASKED + 4], b'A' ^ (c_cib >> 8) as u8);
        assert_eq!(bytes[OFF_MASKED + 5], b'T' ^ (c_sol >> 8) as u8);
        assert_eq!(bytes[OFF_MASKED + 6], b'E' ^ (c_grid >> 8) as u8);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = sample_puzzle().encode().unwrap();
        bytes[OFF_MAGIC..OFF_MAGIC + 12].copy_from_slice(b"NOTAPUZZLE!!");
        assert_eq!(Puzzle::decode(&bytes), Err(PuzError::InvalidMagic));
    }

    #[test]
    fn test_rejects_zero_geometry() {
        let mut bytes = sample_puzzle().encode().unwrap();
        bytes[OFF_WIDTH] = 0;
        assert_eq!(
            Puzzle::decode(&bytes),
            Err(PuzError::InvalidGeometry { rows: 3, cols: 0 })
        );
    }

    #[test]
    fn test_rejects_truncated_buffer() {
        let bytes = sample_puzzle().encode().unwrap();
        assert!(matches!(
            Puzzle::decode(&bytes[..HEADER_LEN + 4]),
            Err(PuzError::Truncated { .. })
        ));
        assert!(matches!(
            Puzzle::decode(&bytes[..bytes.len() - 1]),
            Err(PuzError::Truncated { .. })
        ));
    }

    #[test]
    fn test_accepts_stale_checksums() {
        let mut bytes = sample_puzzle().encode().unwrap();
        bytes[0] ^= 0xFF;
        bytes[OFF_CIB_CHECKSUM] ^= 0xFF;
        assert!(Puzzle::decode(&bytes).is_ok());
    }

    #[test]
    fn test_empty_grid_round_trip() {
        // Solution cells encode as '-' and come back Empty.
        let puzzle = Puzzle::new(Grid::new(2, 2).unwrap());
        let decoded = Puzzle::decode(&puzzle.encode().unwrap()).unwrap();
        assert_eq!(decoded.grid, puzzle.grid);
        assert!(decoded.clues.is_empty());
    }

    #[test]
    fn test_caps_truncate_or_reject() {
        let mut puzzle = sample_puzzle();
        puzzle.title = "T".repeat(TITLE_CAP + 10);
        let decoded = Puzzle::decode(&puzzle.encode().unwrap()).unwrap();
        assert_eq!(decoded.title.len(), TITLE_CAP);

        assert_eq!(
            puzzle.encode_strict(),
            Err(PuzError::EncodeCapExceeded {
                field: "title",
                len: TITLE_CAP + 10,
                cap: TITLE_CAP
            })
        );
    }

    #[test]
    fn test_non_latin1_rejected() {
        let mut puzzle = sample_puzzle();
        puzzle.title = "日本語".into();
        assert_eq!(puzzle.encode(), Err(PuzError::Unencodable { ch: '日' }));
    }

    #[test]
    fn test_latin1_survives_round_trip() {
        let mut puzzle = sample_puzzle();
        puzzle.author = "Ærøskøbing café".into();
        let decoded = Puzzle::decode(&puzzle.encode().unwrap()).unwrap();
        assert_eq!(decoded.author, "Ærøskøbing café");
    }

    #[test]
    fn test_clue_order_across_before_down() {
        let puzzle = sample_puzzle();
        let bytes = puzzle.encode().unwrap();
        let strings = &bytes[HEADER_LEN + 18..];
        let parts: Vec<&[u8]> = strings.split(|&b| b == 0).collect();
        // title, author, copyright, then clue 1-Across then 1-Down.
        assert_eq!(parts[3], b"Feline");
        assert_eq!(parts[4], b"Taxi");
    }
}
