//! Debounced change notification.
//!
//! Serializing and shipping the document to listeners (preview panes,
//! persistence) is too expensive to do per keystroke, so notifications
//! are coalesced: each change re-arms a quiet-window timer and
//! listeners hear only the state at the end of a burst. History is not
//! coalesced; every commit stays individually undoable.
//!
//! The notifier owns no clock and spawns nothing. Callers pump it from
//! their own loop, and tests drive it with explicit instants.

use std::time::{Duration, Instant};

use mailcraft_document::Document;

/// Default quiet window before listeners are told about changes.
pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(300);

type Listener = Box<dyn FnMut(&Document)>;

/// Coalescing fan-out to change listeners.
pub struct ChangeNotifier {
    window: Duration,
    deadline: Option<Instant>,
    listeners: Vec<Listener>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_QUIET_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Document) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Records that the document changed. Re-arms the quiet window, so
    /// a burst of calls produces one notification after the burst.
    pub fn schedule(&mut self) {
        self.schedule_at(Instant::now());
    }

    pub fn schedule_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Fires listeners if the quiet window has elapsed. Returns whether
    /// a notification went out.
    pub fn emit_due(&mut self, document: &Document) -> bool {
        self.emit_due_at(Instant::now(), document)
    }

    pub fn emit_due_at(&mut self, now: Instant, document: &Document) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                for listener in &mut self.listeners {
                    listener(document);
                }
                true
            }
            _ => false,
        }
    }

    /// Fires pending listeners immediately, window or not. Used on
    /// shutdown and before saves.
    pub fn flush(&mut self, document: &Document) -> bool {
        if self.deadline.is_none() {
            return false;
        }
        self.deadline = None;
        for listener in &mut self.listeners {
            listener(document);
        }
        true
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
