//! # Pitchpad Text
//!
//! Coordinate-level primitives for the pitch editor: spans, edit-window
//! diffing, offset remapping, and bounded undo history.
//!
//! ## Key Concepts for Learning Rust
//!
//! ### Ownership & Borrowing
//! - `History` owns its snapshot strings
//! - `DiffWindow` is a small `Copy` value derived from two borrowed texts
//! - Span mapping never mutates the window it reads from
//!
//! ### Total Functions
//! - Every operation here is defined for arbitrary input, including empty
//!   strings; a span consumed by an edit maps to `None` rather than an error
//! - All offsets are char offsets into the current text

mod diff;
mod history;
mod span;
mod word;

pub use diff::DiffWindow;
pub use history::{History, HISTORY_MAX_DEFAULT, QUIET_PERIOD_DEFAULT};
pub use span::{merge_spans, Span};
pub use word::{char_to_byte, delete_word_backward};
