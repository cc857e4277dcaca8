//! The render-sink seam.
//!
//! The core never touches layout. It hands a renderer an owned
//! [`RenderSnapshot`] (text plus every span category) and a
//! [`TextMetrics`] value object describing the live input's font, and the
//! renderer produces overlay markup that sits pixel-for-pixel under the
//! input. Information only flows outward across this seam; renderers
//! influence the core solely through ordinary text-change and selection
//! events.

use serde::{Deserialize, Serialize};

use pitchpad_scan::ScanResult;
use pitchpad_text::Span;

use crate::config::RenderConfig;

/// Font metrics the overlay must reproduce exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub font_family: String,
    pub font_size: f32,
    pub line_height: f32,
    pub padding_x: f32,
    pub padding_y: f32,
}

impl From<&RenderConfig> for TextMetrics {
    fn from(config: &RenderConfig) -> Self {
        Self {
            font_family: config.font_family.clone(),
            font_size: config.font_size,
            line_height: config.line_height,
            padding_x: config.padding_x,
            padding_y: config.padding_y,
        }
    }
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSnapshot {
    /// The full current text.
    pub text: String,
    /// Spans the user typed into tracked placeholders.
    pub active_edit: Vec<Span>,
    /// Spans written by the substitution engine.
    pub auto_insert: Vec<Span>,
    /// Host-synced bookkeeping spans.
    pub persistent: Vec<Span>,
    /// Transient token highlights, rescanned from the text.
    pub scan: ScanResult,
}

/// A renderer consuming snapshots.
pub trait OverlaySink {
    /// Produces overlay markup for one snapshot.
    fn render(&mut self, snapshot: &RenderSnapshot, metrics: &TextMetrics) -> String;
}

/// A reference sink that wraps highlighted regions in plain tags.
///
/// Real hosts render HTML spans with background colors; this one exists
/// for the demo binary and for tests, where `<auto>£150.00</auto>` is
/// easier to assert on than styled markup. Overlapping categories are
/// rendered first-span-wins, lowest start first.
#[derive(Debug, Default)]
pub struct MarkupRenderer;

impl MarkupRenderer {
    fn tagged_spans(snapshot: &RenderSnapshot) -> Vec<(Span, &'static str)> {
        let mut tagged: Vec<(Span, &'static str)> = Vec::new();
        tagged.extend(snapshot.active_edit.iter().map(|s| (*s, "edit")));
        tagged.extend(snapshot.auto_insert.iter().map(|s| (*s, "auto")));
        tagged.extend(snapshot.persistent.iter().map(|s| (*s, "persist")));
        tagged.extend(snapshot.scan.placeholders.iter().map(|s| (*s, "ph")));
        tagged.extend(snapshot.scan.links.iter().map(|l| (l.span, "link")));
        tagged.extend(snapshot.scan.numbered_lines.iter().map(|s| (*s, "num")));
        tagged.sort_by_key(|(span, _)| (span.start, span.end));
        tagged
    }
}

impl OverlaySink for MarkupRenderer {
    fn render(&mut self, snapshot: &RenderSnapshot, _metrics: &TextMetrics) -> String {
        let chars: Vec<char> = snapshot.text.chars().collect();
        let mut out = String::with_capacity(snapshot.text.len() + 64);
        let mut pos = 0;

        for (span, tag) in Self::tagged_spans(snapshot) {
            if span.start < pos || span.end > chars.len() {
                // Overlaps an already-rendered region: first span wins
                continue;
            }
            out.extend(&chars[pos..span.start]);
            out.push('<');
            out.push_str(tag);
            out.push('>');
            out.extend(&chars[span.start..span.end]);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
            pos = span.end;
        }
        out.extend(&chars[pos..]);
        out
    }
}
