//! Crossword construction core: grid model and entry numbering, a
//! dictionary-backed pattern matcher, a backtracking autofill engine, and
//! a bit-exact Across Lite (`.puz`) codec.
//!
//! The core is single-threaded and pure at the module level; the
//! [`workbench`] module composes it into session-shaped operations for a
//! host UI, CLI, or wasm page.

pub mod autofill;
pub mod cell;
pub mod errors;
pub mod grid;
pub mod log;
pub mod matcher;
pub mod puz;
pub mod word_index;
pub mod word_list;
pub mod workbench;

// Compile the wasm glue only when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm;
