use crate::word_index::EntryId;
use std::io;

/// Errors from grid construction and editing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid dimensions {rows}x{cols} outside [1, {max}]")]
    InvalidGeometry { rows: usize, cols: usize, max: usize },

    #[error("cell ({row}, {col}) outside {rows}x{cols} grid")]
    OutOfBounds { row: usize, col: usize, rows: usize, cols: usize },

    #[error("'{ch}' is not an uppercase A-Z letter")]
    InvalidLetter { ch: char },

    #[error("conflicting block edits at ({row}, {col}) and its mirror ({mirror_row}, {mirror_col})")]
    SymmetryViolation { row: usize, col: usize, mirror_row: usize, mirror_col: usize },
}

/// Errors from autofill setup. Exhausting the search space is *not* an
/// error (see `FillStatus::NoFill`); these cover structurally bad inputs.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FillError {
    #[error("entry {entry} has no dictionary candidates")]
    NoCandidates { entry: EntryId },

    #[error("pattern length {pattern_len} does not match entry length {entry_len}")]
    LengthMismatch { pattern_len: usize, entry_len: usize },

    #[error("no entry at {entry}")]
    UnknownEntry { entry: EntryId },

    #[error("\"{word}\" is not an A-Z word")]
    InvalidWord { word: String },
}

/// Errors from `.puz` decoding and (cap-checked) encoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PuzError {
    #[error("bad magic at offset 0x02 (not an Across Lite file)")]
    InvalidMagic,

    #[error("puzzle geometry {rows}x{cols} is invalid")]
    InvalidGeometry { rows: usize, cols: usize },

    #[error("file truncated: needed {needed} more byte(s) at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("{field} is {len} bytes, over the {cap}-byte format cap")]
    EncodeCapExceeded { field: &'static str, len: usize, cap: usize },

    #[error("'{ch}' cannot be encoded as ISO-8859-1")]
    Unencodable { ch: char },

    #[error("solution byte {byte:#04x} at ({row}, {col}) is not '.', '-', or A-Z")]
    BadSolutionByte { byte: u8, row: usize, col: usize },
}

// The CLI reports errors through io::Error; string conversion avoids
// Send/Sync bound issues, same trade-off as a parse error would make.
impl From<GridError> for io::Error {
    fn from(e: GridError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    }
}

impl From<PuzError> for io::Error {
    fn from(e: PuzError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, e.to_string())
    }
}
