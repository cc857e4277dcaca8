//! Main editor orchestration.
//!
//! ## Learning: The Facade Pattern
//!
//! `Editor` acts as a facade, providing a simple interface to the span
//! store, history, substitution engine, and keymap. The host widget only
//! ever talks to `Editor`: it forwards every input change, caret event,
//! and key combo, and renders whatever snapshot comes back.

use tracing::debug;
use uuid::Uuid;

use pitchpad_text::{delete_word_backward, DiffWindow, History, Span};

use crate::config::Config;
use crate::event::{EditorEvent, EventBus, UpdateReason};
use crate::keymap::{KeyPress, Keymap};
use crate::render::{RenderSnapshot, TextMetrics};
use crate::store::{ExternalKind, RangeStore, TrackedKind};
use crate::substitution::{SubstitutionEngine, SubstitutionValues};
use crate::{Command, CoreError, CoreResult};

/// Unique identifier for an editor instance.
///
/// A page can host several editable regions at once; events carry the id
/// so subscribers can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct EditorId(Uuid);

impl EditorId {
    /// Creates a new unique editor ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EditorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EditorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The editor core for one editable region.
///
/// Owned by a single thread; all mutation happens synchronously inside
/// the handler that received the input event. Nothing is shared between
/// editor instances.
pub struct Editor {
    id: EditorId,
    text: String,
    store: RangeStore,
    history: History,
    substitutions: SubstitutionEngine,
    values: SubstitutionValues,
    keymap: Keymap,
    config: Config,
    events: EventBus,
}

impl Editor {
    /// Creates an editor seeded with initial text and default config.
    pub fn new(initial: impl Into<String>) -> Self {
        Self::with_config(initial, Config::default())
    }

    /// Creates an editor with custom configuration.
    pub fn with_config(initial: impl Into<String>, config: Config) -> Self {
        let text = initial.into();
        Self {
            id: EditorId::new(),
            history: History::with_limits(
                text.clone(),
                config.editor.history_limit,
                config.editor.quiet_period(),
            ),
            substitutions: SubstitutionEngine::new(&config.substitutions),
            values: SubstitutionValues::default(),
            keymap: Keymap::from_config(&config),
            store: RangeStore::new(),
            events: EventBus::new(),
            config,
            text,
        }
    }

    // ==================== State Access ====================

    /// Returns this editor's ID.
    pub fn id(&self) -> EditorId {
        self.id
    }

    /// Returns the current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the current text length in chars.
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns the span store.
    pub fn store(&self) -> &RangeStore {
        &self.store
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the overlay metrics the renderer must reproduce.
    pub fn metrics(&self) -> TextMetrics {
        TextMetrics::from(&self.config.render)
    }

    /// Returns true if there is an edit to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if there is an edit to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ==================== Text Editing ====================

    /// Applies one input change: the new full text plus the caret
    /// position after the edit, when the host knows it.
    ///
    /// This is the per-keystroke entry point. It locates the minimal
    /// changed window, pushes every tracked span through it, runs the
    /// growth rules, records history, and re-runs the substitution pass
    /// in case the edit introduced a fresh token.
    pub fn apply_input(&mut self, new_text: &str, caret: Option<usize>) {
        let window = DiffWindow::between(&self.text, new_text);
        if window.is_noop() {
            return;
        }
        debug!(
            target: "core.editor",
            removed = window.removed_len(),
            inserted = window.inserted_len(),
            "local_edit"
        );

        self.store.apply_edit(&window, caret);
        self.substitutions.remap(&window);
        self.text = new_text.to_string();
        self.history.record(&self.text);

        self.emit_text_changed(UpdateReason::LocalEdit);
        self.emit_ranges_changed();
        self.run_substitutions();
    }

    /// Replaces the whole text programmatically (scenario load, template
    /// swap). Tracked editing state is reset: a wholesale replace has no
    /// meaningful minimal edit window to map spans through.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.replace_text(text.into(), UpdateReason::Replace);
        self.run_substitutions();
    }

    /// Empties the editor and every tracked collection.
    pub fn clear_all(&mut self) {
        self.store.clear();
        self.substitutions.reset();
        self.text.clear();
        self.history.seal();
        self.history.record("");
        self.history.seal();
        self.emit_text_changed(UpdateReason::ClearAll);
        self.emit_ranges_changed();
    }

    fn replace_text(&mut self, text: String, reason: UpdateReason) {
        self.store.reset_active();
        self.substitutions.reset();
        self.text = text;
        self.history.seal();
        self.history.record(&self.text);
        self.history.seal();
        self.emit_text_changed(reason);
        self.emit_ranges_changed();
    }

    // ==================== Undo/Redo ====================

    /// Steps back one snapshot. Safe no-op at the bottom of history.
    pub fn undo(&mut self) -> bool {
        let Some(text) = self.history.undo() else {
            return false;
        };
        let text = text.to_string();
        self.restore(text, UpdateReason::Undo);
        true
    }

    /// Steps forward one snapshot. Safe no-op at the top of history.
    pub fn redo(&mut self) -> bool {
        let Some(text) = self.history.redo() else {
            return false;
        };
        let text = text.to_string();
        self.restore(text, UpdateReason::Redo);
        true
    }

    /// A history jump is not a local edit: tracked editing state resets,
    /// externally synced spans stay as their owners last left them.
    fn restore(&mut self, text: String, reason: UpdateReason) {
        self.store.reset_active();
        self.substitutions.reset();
        self.text = text;
        self.emit_text_changed(reason);
        self.emit_ranges_changed();
    }

    // ==================== Selection ====================

    /// The selection-to-overtype heuristic. Call on focus, click, and
    /// pointer events with a collapsed selection: if the caret sits
    /// strictly inside a placeholder token, the token's span is recorded
    /// for overtype and returned so the host can select it
    /// programmatically.
    pub fn select_placeholder_at(&mut self, caret: usize) -> Option<Span> {
        if !self.config.editor.select_placeholder_on_click {
            return None;
        }
        let span = pitchpad_scan::placeholder_at(&self.text, caret)?;
        self.store.begin_placeholder_overtype(span);
        self.events.emit(EditorEvent::PlaceholderSelected {
            editor: self.id,
            span,
        });
        Some(span)
    }

    // ==================== External Collaborators ====================

    /// Syncs an externally owned span collection into the store.
    pub fn set_external_spans(&mut self, kind: ExternalKind, spans: Vec<Span>) {
        self.store.set_external(kind, spans, self.len_chars());
        self.emit_ranges_changed();
    }

    /// Updates the named substitution values and re-runs the engine.
    /// The host calls this whenever upstream business data changes.
    pub fn set_values(&mut self, values: SubstitutionValues) {
        self.values = values;
        self.run_substitutions();
    }

    /// Runs one substitution pass over the current text. Memoized: a
    /// pass over an unchanged `(values, text)` pair fires nothing.
    fn run_substitutions(&mut self) {
        let Some(outcome) = self.substitutions.run(&self.text, &self.values) else {
            return;
        };

        for window in &outcome.windows {
            self.store.remap(window);
        }
        let text_changed = outcome.text != self.text;
        self.text = outcome.text;
        self.store
            .set_external(ExternalKind::AutoInsert, outcome.spans, self.len_chars());

        if text_changed {
            self.history.record(&self.text);
            self.history.seal();
            self.emit_text_changed(UpdateReason::Substitution);
        }
        if outcome.replacements > 0 {
            self.events.emit(EditorEvent::SubstitutionsApplied {
                editor: self.id,
                count: outcome.replacements,
            });
        }
        self.emit_ranges_changed();
    }

    // ==================== Configuration ====================

    /// Replaces the configuration, rebuilding the keymap.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        self.keymap = Keymap::from_config(&self.config);
        self.events.emit(EditorEvent::ConfigChanged);
    }

    /// Reloads configuration from the default path.
    pub fn reload_config(&mut self) -> CoreResult<()> {
        let path = Config::default_path()?;
        let config = if path.exists() {
            Config::load_from(&path)?
        } else {
            Config::default()
        };
        self.set_config(config);
        Ok(())
    }

    // ==================== Commands ====================

    /// Dispatches a key combo through the keymap. Returns the command
    /// that ran, if the combo was bound.
    pub fn handle_key(&mut self, key: KeyPress, caret: Option<usize>) -> Option<Command> {
        let command = self.keymap.lookup(&key)?;
        self.execute(command, caret);
        Some(command)
    }

    /// Runs a command by its config identifier, e.g. `"editor.undo"`.
    /// Used by hosts wiring toolbar buttons to the same actions the
    /// keyboard reaches.
    pub fn run_command(&mut self, name: &str, caret: Option<usize>) -> CoreResult<Command> {
        let command =
            Command::parse(name).ok_or_else(|| CoreError::UnknownCommand(name.to_string()))?;
        self.execute(command, caret);
        Ok(command)
    }

    fn execute(&mut self, command: Command, caret: Option<usize>) {
        match command {
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::ClearAll => self.clear_all(),
            Command::DeleteWordBackward => {
                let caret = caret.unwrap_or_else(|| self.len_chars());
                let (new_text, new_caret) = delete_word_backward(&self.text, caret);
                self.apply_input(&new_text, Some(new_caret));
            }
        }
    }

    // ==================== Rendering ====================

    /// Builds the snapshot handed to the overlay renderer.
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            text: self.text.clone(),
            active_edit: self.store.spans(TrackedKind::ActiveEdit).to_vec(),
            auto_insert: self.store.spans(TrackedKind::AutoInsert).to_vec(),
            persistent: self.store.spans(TrackedKind::Persistent).to_vec(),
            scan: pitchpad_scan::scan(&self.text),
        }
    }

    // ==================== Events ====================

    /// Subscribes to editor events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EditorEvent> {
        self.events.subscribe()
    }

    fn emit_text_changed(&self, reason: UpdateReason) {
        self.events.emit(EditorEvent::TextChanged {
            editor: self.id,
            reason,
            text: self.text.clone(),
        });
    }

    fn emit_ranges_changed(&self) {
        self.events.emit(EditorEvent::RangesChanged { editor: self.id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// An editor whose history records every edit separately.
    fn editor(initial: &str) -> Editor {
        let mut config = Config::default();
        config.editor.history_quiet_ms = 0;
        Editor::with_config(initial, config)
    }

    #[test]
    fn test_placeholder_overtype_end_to_end() {
        let mut editor = editor("Dear [NAME],");

        // The user clicks inside [NAME]; the host is told to select it
        let selected = editor.select_placeholder_at(8).unwrap();
        assert_eq!(selected, Span::new(5, 11));

        // The host replaces the selection with typed text
        editor.apply_input("Dear John,", Some(9));
        assert_eq!(editor.text(), "Dear John,");
        assert_eq!(
            editor.store().spans(TrackedKind::ActiveEdit),
            &[Span::new(5, 9)]
        );

        // Typing immediately after grows the same span
        editor.apply_input("Dear John Smith,", Some(15));
        assert_eq!(
            editor.store().spans(TrackedKind::ActiveEdit),
            &[Span::new(5, 15)]
        );
    }

    #[test]
    fn test_click_on_bracket_selects_nothing() {
        let mut editor = editor("Dear [NAME],");
        assert!(editor.select_placeholder_at(5).is_none());
        assert!(editor.select_placeholder_at(11).is_none());
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut editor = editor("start");
        editor.apply_input("start one", Some(9));
        editor.apply_input("start one two", Some(13));

        assert!(editor.undo());
        assert_eq!(editor.text(), "start one");
        assert!(editor.undo());
        assert_eq!(editor.text(), "start");
        assert!(!editor.undo());

        assert!(editor.redo());
        assert!(editor.redo());
        assert_eq!(editor.text(), "start one two");
        assert!(!editor.redo());
    }

    #[test]
    fn test_undo_resets_active_edit_but_keeps_synced_spans() {
        let mut editor = editor("Dear [NAME],");
        editor.set_external_spans(ExternalKind::Persistent, vec![Span::new(0, 4)]);

        editor.select_placeholder_at(8);
        editor.apply_input("Dear John,", Some(9));
        assert!(!editor.store().spans(TrackedKind::ActiveEdit).is_empty());

        editor.undo();
        assert_eq!(editor.text(), "Dear [NAME],");
        assert!(editor.store().spans(TrackedKind::ActiveEdit).is_empty());
        assert_eq!(
            editor.store().spans(TrackedKind::Persistent),
            &[Span::new(0, 4)]
        );
    }

    #[test]
    fn test_rate_substitution_end_to_end() {
        let mut editor = editor("Rate: [RATE] per hour");
        editor.set_values(SubstitutionValues {
            role: None,
            rate: Some("150".to_string()),
        });

        assert_eq!(editor.text(), "Rate: £150.00 per hour");
        assert_eq!(
            editor.store().spans(TrackedKind::AutoInsert),
            &[Span::new(6, 13)]
        );

        // Same values again: nothing changes
        let before = editor.snapshot();
        editor.set_values(SubstitutionValues {
            role: None,
            rate: Some("150".to_string()),
        });
        assert_eq!(editor.text(), before.text);

        // A bigger rate rewrites the same span and shifts spans after it,
        // even after the user has edited elsewhere in the meantime
        let mut t = editor.text().to_string();
        t.push('!');
        let caret = t.chars().count();
        editor.apply_input(&t, Some(caret));

        editor.set_values(SubstitutionValues {
            role: None,
            rate: Some("1500".to_string()),
        });
        assert_eq!(editor.text(), "Rate: £1,500.00 per hour!");
        assert_eq!(
            editor.store().spans(TrackedKind::AutoInsert),
            &[Span::new(6, 15)]
        );
    }

    #[test]
    fn test_substitution_shifts_active_edit_after_it() {
        let mut editor = editor("[RATE] for [NAME]");
        editor.select_placeholder_at(13);
        editor.apply_input("[RATE] for Ann", Some(14));
        assert_eq!(
            editor.store().spans(TrackedKind::ActiveEdit),
            &[Span::new(11, 14)]
        );

        editor.set_values(SubstitutionValues {
            role: None,
            rate: Some("99".to_string()),
        });
        // "[RATE]" (6 chars) became "£99.00" (6 chars): no shift
        assert_eq!(editor.text(), "£99.00 for Ann");
        assert_eq!(
            editor.store().spans(TrackedKind::ActiveEdit),
            &[Span::new(11, 14)]
        );

        editor.set_values(SubstitutionValues {
            role: None,
            rate: Some("1500".to_string()),
        });
        assert_eq!(editor.text(), "£1,500.00 for Ann");
        assert_eq!(
            editor.store().spans(TrackedKind::ActiveEdit),
            &[Span::new(14, 17)]
        );
    }

    #[test]
    fn test_clear_all() {
        let mut editor = editor("some text");
        editor.set_external_spans(ExternalKind::Persistent, vec![Span::new(0, 4)]);
        editor.clear_all();
        assert_eq!(editor.text(), "");
        assert!(editor.store().spans(TrackedKind::Persistent).is_empty());
        assert!(editor.undo());
        assert_eq!(editor.text(), "some text");
    }

    #[test]
    fn test_handle_key_dispatch() {
        use crate::keymap::{Key, Modifiers};

        let mut editor = editor("one two");
        editor.apply_input("one two three", Some(13));

        let undo = KeyPress::new(Key::Char('z'), Modifiers::CTRL);
        assert_eq!(editor.handle_key(undo, None), Some(Command::Undo));
        assert_eq!(editor.text(), "one two");

        let redo = KeyPress::new(Key::Char('y'), Modifiers::CTRL);
        assert_eq!(editor.handle_key(redo, None), Some(Command::Redo));
        assert_eq!(editor.text(), "one two three");

        let delete_word = KeyPress::new(Key::Backspace, Modifiers::CTRL);
        assert_eq!(
            editor.handle_key(delete_word, None),
            Some(Command::DeleteWordBackward)
        );
        assert_eq!(editor.text(), "one two ");

        let unbound = KeyPress::new(Key::Char('q'), Modifiers::CTRL);
        assert_eq!(editor.handle_key(unbound, None), None);
    }

    #[test]
    fn test_run_command_by_name() {
        let mut editor = editor("one");
        editor.apply_input("one two", Some(7));

        assert_eq!(editor.run_command("editor.undo", None).unwrap(), Command::Undo);
        assert_eq!(editor.text(), "one");

        let err = editor.run_command("editor.bogus", None).unwrap_err();
        assert!(matches!(err, CoreError::UnknownCommand(_)));
    }

    #[test]
    fn test_set_config_emits_and_rebuilds_keymap() {
        use crate::keymap::{Key, Modifiers};

        let mut editor = editor("x");
        let mut rx = editor.subscribe();

        let mut config = Config::default();
        config
            .keyboard
            .bindings
            .insert("ctrl+k".to_string(), "editor.clearAll".to_string());
        editor.set_config(config);

        assert!(matches!(rx.try_recv(), Ok(EditorEvent::ConfigChanged)));
        let combo = KeyPress::new(Key::Char('k'), Modifiers::CTRL);
        assert_eq!(editor.handle_key(combo, None), Some(Command::ClearAll));
        assert_eq!(editor.text(), "");
    }

    #[test]
    fn test_set_text_resets_tracking_and_substitutes() {
        let mut editor = editor("old");
        editor.set_values(SubstitutionValues {
            role: Some("Partner".to_string()),
            rate: None,
        });
        editor.set_text("A [ROLE] will call");
        assert_eq!(editor.text(), "A Partner will call");
        assert_eq!(
            editor.store().spans(TrackedKind::AutoInsert),
            &[Span::new(2, 9)]
        );
        // The programmatic load is undoable
        assert!(editor.undo());
    }

    #[test]
    fn test_events_carry_reason_and_text() {
        let mut editor = editor("x");
        let mut rx = editor.subscribe();
        editor.apply_input("xy", Some(2));

        let event = rx.try_recv().unwrap();
        match event {
            EditorEvent::TextChanged { reason, text, .. } => {
                assert_eq!(reason, UpdateReason::LocalEdit);
                assert_eq!(text, "xy");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_contains_all_categories() {
        let mut editor = editor("Budget [INSERT] at [RATE]");
        editor.set_values(SubstitutionValues {
            role: None,
            rate: Some("150".to_string()),
        });
        let snapshot = editor.snapshot();
        assert_eq!(snapshot.text, "Budget [INSERT] at £150.00");
        assert_eq!(snapshot.auto_insert, vec![Span::new(19, 26)]);
        assert_eq!(snapshot.scan.placeholders, vec![Span::new(7, 15)]);
    }

    #[test]
    fn test_rapid_edits_collapse_into_one_undo_step() {
        let mut config = Config::default();
        config.editor.history_quiet_ms = 60_000;
        let mut editor = Editor::with_config("", config);

        editor.apply_input("h", Some(1));
        editor.apply_input("he", Some(2));
        editor.apply_input("hello", Some(5));

        assert!(editor.undo());
        assert_eq!(editor.text(), "");
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_no_op_input_changes_nothing() {
        let mut editor = editor("same");
        let mut rx = editor.subscribe();
        editor.apply_input("same", Some(4));
        assert!(rx.try_recv().is_err());
        assert!(!editor.can_undo());
    }

    #[allow(dead_code)]
    fn assert_editor_is_send() {
        fn is_send<T: Send>() {}
        is_send::<Editor>();
    }

    #[test]
    fn test_history_quiet_period_from_config() {
        let config = Config::default();
        assert_eq!(config.editor.quiet_period(), Duration::from_millis(300));
    }
}
