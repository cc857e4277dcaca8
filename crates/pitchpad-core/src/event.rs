//! Event system for editor notifications.
//!
//! ## Learning: Observer Pattern in Rust
//!
//! Rust's ownership model makes traditional observer patterns tricky.
//! We use `tokio::sync::broadcast` for a safe, async-friendly event bus.
//!
//! Key differences from OOP observers:
//! - No object references to manage
//! - Events are values, not callbacks
//! - Subscribers receive copies (Clone)
//! - No lifetime complexity

use tokio::sync::broadcast;

use pitchpad_text::Span;

use crate::editor::EditorId;

/// Why the editor's text changed.
///
/// Every change is tagged at the source instead of being inferred from a
/// side-channel flag: the span store dispatches on this tag to decide
/// between diff-mapping (a local edit has a meaningful minimal window)
/// and resetting (a jump does not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    /// A keystroke, paste, or deletion diffed and remapped in place.
    LocalEdit,
    /// A snapshot restore stepping back.
    Undo,
    /// A snapshot restore stepping forward.
    Redo,
    /// A programmatic whole-text replace (scenario load, template swap).
    Replace,
    /// The substitution engine rewrote token spans in place.
    Substitution,
    /// The clear-all command emptied the editor.
    ClearAll,
}

impl UpdateReason {
    /// Returns true for changes that carry a usable diff window.
    pub fn is_local(&self) -> bool {
        matches!(self, UpdateReason::LocalEdit | UpdateReason::Substitution)
    }
}

/// Events that can occur in the editor.
#[derive(Debug, Clone)]
pub enum EditorEvent {
    /// The text changed; carries the new full text for upstream state
    /// (subject line, template assembly, and the like).
    TextChanged {
        editor: EditorId,
        reason: UpdateReason,
        text: String,
    },
    /// One or more tracked span collections changed.
    RangesChanged { editor: EditorId },
    /// The substitution engine rewrote tokens.
    SubstitutionsApplied { editor: EditorId, count: usize },
    /// The overtype heuristic picked a placeholder for the host to select.
    PlaceholderSelected { editor: EditorId, span: Span },
    /// Configuration changed.
    ConfigChanged,
}

/// Event bus for broadcasting editor events.
///
/// ## Design
///
/// Using a broadcast channel allows:
/// - Multiple subscribers (host form, preview pane, tests)
/// - Async reception
/// - No direct coupling between components
/// - Lagged receivers don't block senders
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        // Capacity of 256 events in the buffer
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: EditorEvent) {
        // Ignore error if no receivers (not a problem)
        let _ = self.sender.send(event);
    }

    /// Subscribes to events.
    ///
    /// Returns a receiver that will get all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Helper for processing events asynchronously.
pub struct EventHandler {
    receiver: broadcast::Receiver<EditorEvent>,
}

impl EventHandler {
    /// Creates a new event handler.
    pub fn new(receiver: broadcast::Receiver<EditorEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(EditorEvent::ConfigChanged);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, EditorEvent::ConfigChanged));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(EditorEvent::ConfigChanged);

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[test]
    fn test_update_reason_locality() {
        assert!(UpdateReason::LocalEdit.is_local());
        assert!(UpdateReason::Substitution.is_local());
        assert!(!UpdateReason::Undo.is_local());
        assert!(!UpdateReason::Replace.is_local());
    }
}
