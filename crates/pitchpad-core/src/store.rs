//! Tracked highlight span bookkeeping.
//!
//! The store owns the three persisted span collections: ActiveEdit (spans
//! the user is typing into), AutoInsert (spans written by the
//! substitution engine), and Persistent (host-supplied bookkeeping, e.g.
//! "already replaced" accounting). Derived highlights (placeholders,
//! links, numbered lines) never enter the store; they are rescanned from
//! the text on every render.
//!
//! On every local edit the collections are pushed through the diff
//! window, then the growth rules run, then each collection is merged back
//! to sorted non-overlapping form. A non-local jump (undo, redo,
//! programmatic replace) resets ActiveEdit instead: there is no minimal
//! edit window to map through.

use tracing::trace;

use pitchpad_text::{merge_spans, DiffWindow, Span};

/// The three persisted span categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedKind {
    /// A span the user created or grew by typing.
    ActiveEdit,
    /// A span written by token substitution.
    AutoInsert,
    /// A host-supplied span tracked on the host's behalf.
    Persistent,
}

/// The categories an external collaborator may sync into the store.
/// ActiveEdit is owned by the editor itself and cannot be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalKind {
    AutoInsert,
    Persistent,
}

/// Owns the tracked span collections and the two pending-edit anchors.
#[derive(Debug, Clone, Default)]
pub struct RangeStore {
    active_edit: Vec<Span>,
    auto_insert: Vec<Span>,
    persistent: Vec<Span>,

    /// A placeholder the user selected-to-overtype; consumed by the next
    /// edit.
    replacing_placeholder: Option<Span>,

    /// The most recently created or grown ActiveEdit span. Decides
    /// whether the next keystroke grows it or starts a new span.
    /// Invariant: when set, a span with equal bounds exists in
    /// `active_edit`.
    active_replacement: Option<Span>,
}

impl RangeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spans of one category, sorted and non-overlapping.
    pub fn spans(&self, kind: TrackedKind) -> &[Span] {
        match kind {
            TrackedKind::ActiveEdit => &self.active_edit,
            TrackedKind::AutoInsert => &self.auto_insert,
            TrackedKind::Persistent => &self.persistent,
        }
    }

    /// The placeholder pending overtype, if any.
    pub fn replacing_placeholder(&self) -> Option<Span> {
        self.replacing_placeholder
    }

    /// The growable span the last edit produced, if any.
    pub fn active_replacement(&self) -> Option<Span> {
        self.active_replacement
    }

    /// Records a placeholder the host just auto-selected for overtype.
    /// Clears any growth tracking: the next edit belongs to the token.
    pub fn begin_placeholder_overtype(&mut self, token: Span) {
        self.replacing_placeholder = Some(token);
        self.active_replacement = None;
    }

    /// Replaces an externally synced collection. Spans are clamped to the
    /// text length, merged, and then tracked like any other.
    pub fn set_external(&mut self, kind: ExternalKind, spans: Vec<Span>, text_len: usize) {
        let cleaned = merge_spans(spans.into_iter().map(|s| s.clamp_to(text_len)).collect());
        match kind {
            ExternalKind::AutoInsert => self.auto_insert = cleaned,
            ExternalKind::Persistent => self.persistent = cleaned,
        }
    }

    /// Remaps every collection through an edit window without running the
    /// growth rules. Used for substitution rewrites, where the edit is
    /// mechanical and must only shift surrounding spans.
    pub fn remap(&mut self, window: &DiffWindow) {
        for spans in [
            &mut self.active_edit,
            &mut self.auto_insert,
            &mut self.persistent,
        ] {
            *spans = spans.iter().filter_map(|s| window.map_span(*s)).collect();
        }
        self.replacing_placeholder = self
            .replacing_placeholder
            .and_then(|s| window.map_span(s));
        self.active_replacement = self.active_replacement.and_then(|s| window.map_span(s));
        self.merge_all();
    }

    /// Applies a local edit: remap, then the growth rules, then merge.
    ///
    /// `caret` is the selection position after the edit; when the host
    /// cannot supply one, the end of the changed window stands in for it.
    pub fn apply_edit(&mut self, window: &DiffWindow, caret: Option<usize>) {
        if window.is_noop() {
            return;
        }
        let caret = caret.unwrap_or_else(|| window.new_change_end());

        // Old-coordinate anchors, captured before remapping. The pending
        // overtype is consumed by this edit either way.
        let pending_token = self.replacing_placeholder.take();
        let active_before = self.active_replacement;

        for spans in [
            &mut self.active_edit,
            &mut self.auto_insert,
            &mut self.persistent,
        ] {
            *spans = spans.iter().filter_map(|s| window.map_span(*s)).collect();
        }
        self.active_replacement = active_before.and_then(|s| window.map_span(s));

        if let Some(token) = pending_token {
            if window.old_window().meets(&token) {
                // The user typed over the selected placeholder: the typed
                // text becomes a fresh growable span at the token's
                // mapped start.
                let start = window.map_offset(token.start);
                let span = Span::new(start, start + window.inserted_len());
                trace!(target: "core.store", ?token, ?span, "placeholder_overtyped");
                if span.is_empty() {
                    // Deleting the selection produced nothing to track
                    self.active_replacement = None;
                } else {
                    self.active_edit.push(span);
                    self.active_replacement = Some(span);
                }
                self.merge_all();
                return;
            }
            // The edit happened elsewhere; the pending overtype lapses.
        }

        if let Some(active) = active_before {
            let grows = window.is_pure_insertion()
                && (window.change_start() == active.end
                    || caret == window.map_offset(active.end) + window.inserted_len());
            if grows {
                let mapped = Span::new(window.map_offset(active.start), active.end);
                let grown = mapped.grown(window.inserted_len());
                self.replace_in(TrackedKind::ActiveEdit, mapped, grown);
                self.active_replacement = Some(grown);
                trace!(target: "core.store", ?grown, "active_replacement_grown");
            } else {
                // Not contiguous: the span stays highlighted, growth stops.
                self.active_replacement = None;
            }
        } else if window.is_pure_insertion() {
            self.promote_at_boundary(window);
        }

        self.merge_all();
    }

    /// A pure insertion landing exactly at the end of an existing span
    /// grows that span and promotes it to the growable anchor.
    fn promote_at_boundary(&mut self, window: &DiffWindow) {
        let at = window.change_start();
        let grown_by = window.inserted_len();

        for kind in [
            TrackedKind::ActiveEdit,
            TrackedKind::AutoInsert,
            TrackedKind::Persistent,
        ] {
            // After remapping, a span that ended exactly at the insertion
            // point still ends there (boundary offsets map by identity).
            let found = self.spans(kind).iter().copied().find(|s| s.end == at);
            let Some(span) = found else { continue };

            let grown = span.grown(grown_by);
            self.replace_in(kind, span, grown);
            if kind != TrackedKind::ActiveEdit {
                // Mirror into ActiveEdit so the growable anchor keeps its
                // invariant of living there.
                self.active_edit.push(grown);
            }
            self.active_replacement = Some(grown);
            trace!(target: "core.store", ?grown, ?kind, "promoted_at_boundary");
            return;
        }
    }

    fn replace_in(&mut self, kind: TrackedKind, from: Span, to: Span) {
        let spans = match kind {
            TrackedKind::ActiveEdit => &mut self.active_edit,
            TrackedKind::AutoInsert => &mut self.auto_insert,
            TrackedKind::Persistent => &mut self.persistent,
        };
        if let Some(slot) = spans.iter_mut().find(|s| **s == from) {
            *slot = to;
        } else {
            spans.push(to);
        }
    }

    /// Clears ActiveEdit and both anchors. Called on undo, redo, and
    /// programmatic replaces; AutoInsert and Persistent stay as last
    /// synced, since they are owned by their external sources.
    pub fn reset_active(&mut self) {
        self.active_edit.clear();
        self.replacing_placeholder = None;
        self.active_replacement = None;
    }

    /// Clears everything.
    pub fn clear(&mut self) {
        self.active_edit.clear();
        self.auto_insert.clear();
        self.persistent.clear();
        self.replacing_placeholder = None;
        self.active_replacement = None;
    }

    /// Merges each collection to sorted non-overlapping form and
    /// re-anchors the growable span onto whatever merged span absorbed it.
    fn merge_all(&mut self) {
        self.active_edit = merge_spans(std::mem::take(&mut self.active_edit));
        self.auto_insert = merge_spans(std::mem::take(&mut self.auto_insert));
        self.persistent = merge_spans(std::mem::take(&mut self.persistent));

        if let Some(active) = self.active_replacement {
            self.active_replacement = self
                .active_edit
                .iter()
                .copied()
                .find(|s| s.start <= active.start && active.end <= s.end);
        }
    }
}
