//! # Pitchpad Scan
//!
//! Stateless token scanning over the current text.
//!
//! The scanner derives three transient highlight classes on every call:
//! bracket placeholders like `[RATE]`, instruction-link markers like
//! `[[Confirm your instructions::https://example.com/start]]`, and the
//! leading markers of numbered lines. Results are thrown away and
//! recomputed per render; nothing here reads or writes the tracked span
//! collections, so derived and tracked highlighting can never feed back
//! into each other.
//!
//! ## Learning: Lazy Statics
//!
//! Compiling a regex is expensive; matching with one is cheap. The
//! `once_cell::sync::Lazy` wrapper compiles each pattern on first use and
//! shares it for the rest of the process.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use pitchpad_text::Span;

/// `[TOKEN]` - one or more non-bracket chars between square brackets.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\[\]]+\]").expect("placeholder pattern is valid"));

/// `[[LABEL::href]]` - friendly label with an embedded URL payload.
static LINK_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\[\]:]+)::([^\[\]]+)\]\]").expect("link pattern is valid"));

/// A line starting with optional whitespace, digits, a dot, and a space.
/// The capture covers the number and dot only.
static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(\d+\.)[ \t]").expect("numbered-line pattern is valid"));

/// An instruction-link marker extracted from the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMarker {
    /// Span of the whole `[[..]]` marker, in char offsets.
    pub span: Span,
    /// Anchor text to display instead of the raw markup.
    pub label: String,
    /// The embedded URL payload.
    pub href: String,
}

/// Everything a single scan pass derives from the text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Bracket placeholder spans, excluding any inside a link marker.
    pub placeholders: Vec<Span>,
    /// Instruction-link markers with their payloads.
    pub links: Vec<LinkMarker>,
    /// Leading numbered-list markers (the `1.` part only).
    pub numbered_lines: Vec<Span>,
}

/// Scans the text for placeholder, link, and numbered-line tokens.
///
/// Pure and stateless: safe to call on every render, over arbitrary text
/// including the empty string.
pub fn scan(text: &str) -> ScanResult {
    let links: Vec<LinkMarker> = LINK_MARKER
        .captures_iter(text)
        .map(|caps| {
            let whole = caps.get(0).expect("capture 0 always present");
            LinkMarker {
                span: byte_span_to_chars(text, whole.start(), whole.end()),
                label: caps[1].trim().to_string(),
                href: caps[2].trim().to_string(),
            }
        })
        .collect();

    // The placeholder pattern also matches the inner bracket pair of a
    // link marker, so anything landing inside a link span is discarded.
    let placeholders = PLACEHOLDER
        .find_iter(text)
        .map(|m| byte_span_to_chars(text, m.start(), m.end()))
        .filter(|span| !links.iter().any(|link| link.span.overlaps(span)))
        .collect();

    let numbered_lines = NUMBERED_LINE
        .captures_iter(text)
        .map(|caps| {
            let marker = caps.get(1).expect("marker group always present");
            byte_span_to_chars(text, marker.start(), marker.end())
        })
        .collect();

    ScanResult {
        placeholders,
        links,
        numbered_lines,
    }
}

/// Finds the placeholder token strictly containing the caret, if any.
///
/// Drives the click-to-overtype heuristic: a caret sitting exactly on a
/// bracket does not select the token.
pub fn placeholder_at(text: &str, caret: usize) -> Option<Span> {
    scan(text)
        .placeholders
        .into_iter()
        .find(|span| span.strictly_contains(caret))
}

/// Converts a regex byte match into a char-offset span.
fn byte_span_to_chars(text: &str, byte_start: usize, byte_end: usize) -> Span {
    let start = text[..byte_start].chars().count();
    let len = text[byte_start..byte_end].chars().count();
    Span::new(start, start + len)
}
