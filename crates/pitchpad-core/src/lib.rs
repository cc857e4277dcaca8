//! # Pitchpad Core
//!
//! Editor core for the pitch composer: tracked highlight spans, bounded
//! undo history, and live token substitution behind one facade.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Editor                            │
//! │  ┌──────────┐ ┌─────────┐ ┌────────────────────────────┐ │
//! │  │  Keymap  │ │ Config  │ │        Event Bus           │ │
//! │  └──────────┘ └─────────┘ └────────────────────────────┘ │
//! │        │                                                 │
//! │  ┌─────┴────────────────────────────────────────┐        │
//! │  │  text  +  RangeStore  +  History  +  Engine  │        │
//! │  └──────────────────────────────────────────────┘        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every input change flows: diff window -> span remap -> growth rules ->
//! merge -> history record -> substitution pass -> events out. Renderers
//! receive an immutable [`RenderSnapshot`] and feed nothing back except
//! ordinary text-change and selection events.
//!
//! ## Learning: Module Organization
//!
//! Rust modules map to files:
//! - `mod foo;` looks for `foo.rs` or `foo/mod.rs`
//! - `pub use` re-exports items for cleaner public APIs

pub mod command;
pub mod config;
pub mod editor;
pub mod event;
pub mod keymap;
pub mod render;
pub mod store;
pub mod substitution;

pub use command::Command;
pub use config::Config;
pub use editor::{Editor, EditorId};
pub use event::{EditorEvent, EventBus, UpdateReason};
pub use keymap::{Key, KeyPress, Keymap, Modifiers};
pub use render::{OverlaySink, RenderSnapshot, TextMetrics};
pub use store::{ExternalKind, RangeStore, TrackedKind};
pub use substitution::{SubstitutionEngine, SubstitutionValues};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
///
/// Editing itself never fails: span mapping, history moves, and token
/// substitution are total over arbitrary input. What can fail is the
/// ambient surface around the editor.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}
