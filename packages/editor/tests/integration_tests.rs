//! End-to-end tests of the editing engine: sessions, history,
//! notifications, and the way they interlock.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use mailcraft_document::{factory, NodeType, StarterTemplate};
use mailcraft_editor::{
    EditorSession, Mutation, MutationError, PassthroughCompiler,
};

fn first_column_id(session: &EditorSession) -> String {
    let mut found = None;
    session.document().body.walk(&mut |node| {
        if found.is_none() && node.node_type == NodeType::Column {
            found = Some(node.id.clone());
        }
    });
    found.expect("document has a column")
}

fn first_text_id(session: &EditorSession) -> String {
    let mut found = None;
    session.document().body.walk(&mut |node| {
        if found.is_none() && node.node_type == NodeType::Text {
            found = Some(node.id.clone());
        }
    });
    found.expect("document has a text node")
}

#[test]
fn a_session_starts_on_the_default_document() {
    let session = EditorSession::new();
    assert_eq!(session.document().node_count(), 4);
    assert!(!session.can_undo());
    assert!(!session.can_redo());
}

#[test]
fn edits_commit_history_and_undo_restores_exact_state() {
    let mut session = EditorSession::new();
    let before = session.document().clone();
    let text_id = first_text_id(&session);

    session
        .apply(&Mutation::SetContent {
            node_id: text_id.clone(),
            html: "<p>changed</p>".to_string(),
        })
        .unwrap();
    assert!(session.can_undo());
    assert_eq!(
        session
            .document()
            .find_node(&text_id)
            .unwrap()
            .html_content
            .as_deref(),
        Some("<p>changed</p>")
    );

    assert!(session.undo());
    assert_eq!(session.document(), &before);
    assert!(session.can_redo());

    assert!(session.redo());
    assert_eq!(
        session
            .document()
            .find_node(&text_id)
            .unwrap()
            .html_content
            .as_deref(),
        Some("<p>changed</p>")
    );
}

#[test]
fn undo_then_edit_forks_history() {
    let mut session = EditorSession::new();
    let text_id = first_text_id(&session);

    for html in ["<p>one</p>", "<p>two</p>"] {
        session
            .apply(&Mutation::SetContent {
                node_id: text_id.clone(),
                html: html.to_string(),
            })
            .unwrap();
    }
    session.undo();
    session
        .apply(&Mutation::SetContent {
            node_id: text_id.clone(),
            html: "<p>fork</p>".to_string(),
        })
        .unwrap();

    assert!(!session.can_redo());
    assert_eq!(
        session
            .document()
            .find_node(&text_id)
            .unwrap()
            .html_content
            .as_deref(),
        Some("<p>fork</p>")
    );
}

#[test]
fn refused_mutations_leave_no_history_entry() {
    let mut session = EditorSession::new();
    let before = session.document().clone();
    let section_id = session.document().body.children[0].id.clone();

    let result = session.apply(&Mutation::InsertNode {
        parent_id: section_id,
        index: 0,
        node: factory::text("<p>illegal</p>"),
    });
    assert!(result.is_err());
    assert_eq!(session.document(), &before);
    assert!(!session.can_undo());
}

#[test]
fn stale_ids_are_accepted_and_change_nothing() {
    let mut session = EditorSession::new();
    let before = session.document().clone();

    let outcome = session
        .apply(&Mutation::RemoveNode {
            node_id: "deleted-long-ago".to_string(),
        })
        .unwrap();
    assert!(!outcome.applied);
    assert_eq!(session.document(), &before);
    assert!(!session.can_undo());
}

// A text element is removed, the removal is undone, and editing
// continues against the restored element without stale-id failures.
#[test]
fn remove_undo_edit_again_flow() {
    let mut session = EditorSession::new();
    let text_id = first_text_id(&session);

    let outcome = session
        .apply(&Mutation::RemoveNode {
            node_id: text_id.clone(),
        })
        .unwrap();
    assert!(outcome.applied);
    assert!(session.document().find_node(&text_id).is_none());

    assert!(session.undo());
    assert!(session.document().find_node(&text_id).is_some());

    // Snapshot undo restores the identical subtree, same id included,
    // so follow-up edits hit their target.
    let outcome = session
        .apply(&Mutation::SetContent {
            node_id: text_id.clone(),
            html: "<p>still here</p>".to_string(),
        })
        .unwrap();
    assert!(outcome.applied);
    assert_eq!(
        session
            .document()
            .find_node(&text_id)
            .unwrap()
            .html_content
            .as_deref(),
        Some("<p>still here</p>")
    );
}

#[test]
fn every_commit_in_a_burst_is_individually_undoable() {
    let mut session = EditorSession::new();
    let text_id = first_text_id(&session);

    for html in ["<p>a</p>", "<p>ab</p>", "<p>abc</p>"] {
        session
            .apply(&Mutation::SetContent {
                node_id: text_id.clone(),
                html: html.to_string(),
            })
            .unwrap();
    }

    session.undo();
    assert_eq!(
        session
            .document()
            .find_node(&text_id)
            .unwrap()
            .html_content
            .as_deref(),
        Some("<p>ab</p>")
    );
    session.undo();
    assert_eq!(
        session
            .document()
            .find_node(&text_id)
            .unwrap()
            .html_content
            .as_deref(),
        Some("<p>a</p>")
    );
}

#[test]
fn notifications_coalesce_across_a_burst_of_commits() {
    let mut session = EditorSession::new();
    let text_id = first_text_id(&session);
    let notified = Rc::new(RefCell::new(0));
    let seen = Rc::clone(&notified);
    session.subscribe(move |_| *seen.borrow_mut() += 1);

    for html in ["<p>a</p>", "<p>ab</p>", "<p>abc</p>"] {
        session
            .apply(&Mutation::SetContent {
                node_id: text_id.clone(),
                html: html.to_string(),
            })
            .unwrap();
        // Polling immediately is too early for the quiet window.
        assert!(!session.poll_notifications());
    }

    // Well past the window, one notification covers the whole burst.
    let later = Instant::now() + Duration::from_secs(1);
    assert!(session.poll_notifications_at(later));
    assert_eq!(*notified.borrow(), 1);

    // But history kept all three commits.
    assert!(session.undo());
    assert!(session.undo());
    assert!(session.undo());
    assert!(!session.can_undo());
}

#[test]
fn listeners_receive_the_final_state_of_the_burst() {
    let mut session = EditorSession::new();
    let text_id = first_text_id(&session);
    let payloads = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&payloads);
    let watched = text_id.clone();
    session.subscribe(move |document| {
        sink.borrow_mut().push(
            document
                .find_node(&watched)
                .and_then(|n| n.html_content.clone())
                .unwrap_or_default(),
        );
    });

    for html in ["<p>draft</p>", "<p>final</p>"] {
        session
            .apply(&Mutation::SetContent {
                node_id: text_id.clone(),
                html: html.to_string(),
            })
            .unwrap();
    }
    session.flush_notifications();

    let payloads = payloads.borrow();
    assert_eq!(payloads.as_slice(), ["<p>final</p>"]);
}

#[test]
fn replace_document_is_one_undo_step() {
    let mut session = EditorSession::new();
    let original = session.document().clone();

    session.replace_document(StarterTemplate::Newsletter.build());
    assert_ne!(session.document(), &original);

    assert!(session.undo());
    assert_eq!(session.document(), &original);
}

#[test]
fn saved_payload_round_trips_through_the_session() {
    let mut session = EditorSession::with_document(StarterTemplate::Announcement.build());
    let saved = session.to_saved_json().unwrap();

    let mut other = EditorSession::new();
    other.load_saved_json(&saved).unwrap();
    assert_eq!(other.document(), session.document());

    // Foreign JSON is refused and the session is untouched.
    let before = session.document().clone();
    assert!(session.load_saved_json(r#"{"legacy": true}"#).is_err());
    assert_eq!(session.document(), &before);
}

#[test]
fn markup_and_compile_reflect_the_current_document() {
    let mut session = EditorSession::new();
    assert!(session.compile().is_none());

    session.set_compiler(Box::new(PassthroughCompiler));
    let compiled = session.compile().unwrap();
    assert_eq!(compiled.html, session.markup());
    assert!(compiled.errors.is_empty());
    assert!(compiled.html.contains("<mj-body"));
}

#[test]
fn moving_between_sections_stays_consistent_under_undo() {
    let mut session = EditorSession::new();

    // Build a second section to move into.
    session
        .apply(&Mutation::InsertNode {
            parent_id: session.document().body.id.clone(),
            index: 1,
            node: factory::section(1),
        })
        .unwrap();
    let target_column = session.document().body.children[1].children[0].id.clone();
    let text_id = first_text_id(&session);

    session
        .apply(&Mutation::MoveNode {
            node_id: text_id.clone(),
            new_parent_id: target_column.clone(),
            index: 0,
        })
        .unwrap();
    assert_eq!(
        session.document().find_parent(&text_id).unwrap().id,
        target_column
    );

    session.undo();
    let column_id = first_column_id(&session);
    assert_eq!(
        session.document().find_parent(&text_id).unwrap().id,
        column_id
    );

    let err = session
        .apply(&Mutation::MoveNode {
            node_id: session.document().body.children[0].id.clone(),
            new_parent_id: first_column_id(&session),
            index: 0,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        mailcraft_editor::EditorError::Mutation(MutationError::WouldCreateCycle)
    ));
}
