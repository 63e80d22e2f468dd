//! The editing session.
//!
//! [`EditorSession`] owns the loop every edit travels through: clone
//! the current document, apply the mutation, commit the result to
//! history, schedule a change notification. Callers never mutate a
//! document directly; they hand mutations in and read state back out.

use std::time::Instant;

use mailcraft_document::{factory, from_saved_json, to_saved_json, Document};
use mailcraft_markup::document_to_markup;

use crate::compiler::{CompiledEmail, MarkupCompiler};
use crate::errors::EditorError;
use crate::history::History;
use crate::mutations::{Mutation, MutationOutcome};
use crate::notify::ChangeNotifier;

pub struct EditorSession {
    history: History,
    notifier: ChangeNotifier,
    compiler: Option<Box<dyn MarkupCompiler>>,
}

impl EditorSession {
    /// Session over the canonical default document.
    pub fn new() -> Self {
        Self::with_document(factory::default_document())
    }

    pub fn with_document(document: Document) -> Self {
        Self {
            history: History::new(document),
            notifier: ChangeNotifier::new(),
            compiler: None,
        }
    }

    pub fn document(&self) -> &Document {
        self.history.current()
    }

    /// Applies one mutation. No-op mutations (stale ids) succeed but
    /// create no history entry and no notification.
    pub fn apply(&mut self, mutation: &Mutation) -> Result<MutationOutcome, EditorError> {
        let mut document = self.history.current().clone();
        let outcome = mutation.apply(&mut document)?;
        if outcome.applied {
            self.history.commit(document);
            self.notifier.schedule();
            tracing::debug!(mutation = mutation.kind(), "applied mutation");
        } else {
            tracing::debug!(mutation = mutation.kind(), "mutation target missing, ignored");
        }
        Ok(outcome)
    }

    /// Steps history back. Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        if self.history.undo().is_some() {
            self.notifier.schedule();
            return true;
        }
        false
    }

    pub fn redo(&mut self) -> bool {
        if self.history.redo().is_some() {
            self.notifier.schedule();
            return true;
        }
        false
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Swaps in a whole new document, as one undoable step. Loads and
    /// recovered documents come through here.
    pub fn replace_document(&mut self, document: Document) {
        self.history.commit(document);
        self.notifier.schedule();
        tracing::debug!("document replaced");
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Document) + 'static) {
        self.notifier.subscribe(listener);
    }

    /// Pump for the host's event loop: fires coalesced notifications
    /// whose quiet window has elapsed.
    pub fn poll_notifications(&mut self) -> bool {
        self.poll_notifications_at(Instant::now())
    }

    pub fn poll_notifications_at(&mut self, now: Instant) -> bool {
        self.notifier.emit_due_at(now, self.history.current())
    }

    /// Fires any pending notification immediately.
    pub fn flush_notifications(&mut self) -> bool {
        self.notifier.flush(self.history.current())
    }

    /// Current document as markup.
    pub fn markup(&self) -> String {
        document_to_markup(self.history.current())
    }

    pub fn set_compiler(&mut self, compiler: Box<dyn MarkupCompiler>) {
        self.compiler = Some(compiler);
    }

    /// Runs the configured engine over the current markup, if any
    /// engine is configured.
    pub fn compile(&self) -> Option<CompiledEmail> {
        self.compiler
            .as_ref()
            .map(|compiler| compiler.compile(&self.markup()))
    }

    /// Current document in the saved-payload envelope.
    pub fn to_saved_json(&self) -> Result<String, EditorError> {
        Ok(to_saved_json(self.history.current())?)
    }

    /// Loads a saved payload as the new current document, undoably.
    pub fn load_saved_json(&mut self, json: &str) -> Result<(), EditorError> {
        let document = from_saved_json(json)?;
        self.replace_document(document);
        Ok(())
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}
