//! Bounded snapshot history.
//!
//! Undo is whole-document: every committed edit pushes a full snapshot
//! and undo/redo moves a cursor over the snapshot list. There are no
//! inverse operations to get wrong; restoring a snapshot restores
//! every id, attribute, and child position exactly.

use std::collections::VecDeque;

use mailcraft_document::Document;

/// How many snapshots are kept by default, current state included.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Snapshot stack with a cursor.
///
/// Invariant: `snapshots` is never empty and `cursor` always indexes
/// into it. The snapshot at the cursor is the current document.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<Document>,
    cursor: usize,
    limit: usize,
}

impl History {
    pub fn new(initial: Document) -> Self {
        Self::with_limit(initial, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(initial: Document, limit: usize) -> Self {
        let mut snapshots = VecDeque::new();
        snapshots.push_back(initial);
        Self {
            snapshots,
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// The document as of the cursor.
    pub fn current(&self) -> &Document {
        // Safe by the struct invariant; index never misses.
        &self.snapshots[self.cursor]
    }

    /// Pushes a new state. Any redo states beyond the cursor are
    /// discarded first; once the stack is full the oldest snapshot
    /// falls off the front.
    pub fn commit(&mut self, document: Document) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(document);
        self.cursor += 1;
        if self.snapshots.len() > self.limit {
            self.snapshots.pop_front();
            self.cursor -= 1;
        }
    }

    /// Steps back one snapshot. Returns the document now current, or
    /// `None` at the beginning of history.
    pub fn undo(&mut self) -> Option<&Document> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Steps forward one snapshot. Returns the document now current,
    /// or `None` at the end of history.
    pub fn redo(&mut self) -> Option<&Document> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of snapshots currently held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Cursor position from the start of the retained window.
    pub fn position(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailcraft_document::factory;

    fn doc_with_marker(marker: &str) -> Document {
        let mut document = factory::default_document();
        document
            .body
            .attributes
            .insert("data-marker".to_string(), marker.to_string());
        document
    }

    fn marker(history: &History) -> String {
        history
            .current()
            .body
            .attributes
            .get("data-marker")
            .cloned()
            .unwrap_or_default()
    }

    #[test]
    fn undo_and_redo_walk_the_cursor() {
        let mut history = History::new(doc_with_marker("a"));
        history.commit(doc_with_marker("b"));
        history.commit(doc_with_marker("c"));

        assert_eq!(marker(&history), "c");
        assert!(history.can_undo());
        assert!(!history.can_redo());

        history.undo();
        assert_eq!(marker(&history), "b");
        history.undo();
        assert_eq!(marker(&history), "a");
        assert!(!history.can_undo());
        assert!(history.undo().is_none());

        history.redo();
        history.redo();
        assert_eq!(marker(&history), "c");
        assert!(history.redo().is_none());
    }

    #[test]
    fn commit_after_undo_drops_the_redo_branch() {
        let mut history = History::new(doc_with_marker("a"));
        history.commit(doc_with_marker("b"));
        history.commit(doc_with_marker("c"));

        history.undo();
        history.undo();
        history.commit(doc_with_marker("d"));

        assert!(!history.can_redo());
        assert_eq!(marker(&history), "d");
        history.undo();
        assert_eq!(marker(&history), "a");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn the_stack_is_bounded() {
        let mut history = History::with_limit(doc_with_marker("0"), 5);
        for i in 1..=20 {
            history.commit(doc_with_marker(&i.to_string()));
        }
        assert_eq!(history.len(), 5);
        assert_eq!(marker(&history), "20");

        // Only four undos are possible from a five-deep window.
        let mut undos = 0;
        while history.undo().is_some() {
            undos += 1;
        }
        assert_eq!(undos, 4);
        assert_eq!(marker(&history), "16");
    }

    #[test]
    fn degenerate_limit_keeps_only_the_present() {
        let mut history = History::with_limit(doc_with_marker("a"), 1);
        history.commit(doc_with_marker("b"));
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert_eq!(marker(&history), "b");
    }
}
