//! Round-trip tests across the writer/reader pair.
//!
//! A round trip never preserves node ids, so these tests compare
//! structure, attributes, and content, with ids erased where whole
//! documents are compared.

use std::collections::HashSet;

use mailcraft_document::{factory, Condition, ConditionOperator, Document, Node, NodeType, StarterTemplate};
use mailcraft_markup::{document_to_markup, markup_to_document, MarkupWriter};

fn erase_ids(node: &mut Node) {
    node.id.clear();
    for child in &mut node.children {
        erase_ids(child);
    }
}

fn normalized(mut document: Document) -> Document {
    erase_ids(&mut document.body);
    document
}

fn collect_ids(document: &Document) -> HashSet<String> {
    let mut ids = HashSet::new();
    document.body.walk(&mut |node| {
        ids.insert(node.id.clone());
    });
    ids
}

#[test]
fn every_starter_round_trips_its_census() {
    for template in StarterTemplate::ALL {
        let document = template.build();
        let reread = markup_to_document(&document_to_markup(&document));
        assert_eq!(
            reread.body.census(),
            document.body.census(),
            "census drifted for the {} starter",
            template.name()
        );
    }
}

#[test]
fn head_settings_round_trip_exactly() {
    let document = StarterTemplate::Newsletter.build();
    let reread = markup_to_document(&document_to_markup(&document));
    assert_eq!(reread.head_attributes, document.head_attributes);
}

#[test]
fn reading_mints_fresh_ids() {
    let document = StarterTemplate::Newsletter.build();
    let reread = markup_to_document(&document_to_markup(&document));

    let before = collect_ids(&document);
    let after = collect_ids(&reread);
    assert_eq!(before.len(), after.len());
    assert!(before.is_disjoint(&after));

    // Stale identity tokens never survive into attributes.
    reread.body.walk(&mut |node| {
        if let Some(classes) = node.attributes.get("css-class") {
            assert!(
                !classes.split_whitespace().any(|c| c.starts_with("node-")),
                "identity token leaked into {classes:?}"
            );
        }
    });
}

// After one read the document is a fixed point: further round trips
// change nothing but the ids.
#[test]
fn round_trips_converge_after_the_first_read() {
    for template in StarterTemplate::ALL {
        let once = markup_to_document(&document_to_markup(&template.build()));
        let twice = markup_to_document(&document_to_markup(&once));
        assert_eq!(normalized(twice), normalized(once));
    }
}

#[test]
fn writing_a_reread_document_is_deterministic() {
    let reread = markup_to_document(&document_to_markup(&StarterTemplate::Announcement.build()));
    assert_eq!(document_to_markup(&reread), document_to_markup(&reread));
}

#[test]
fn user_css_classes_survive_without_identity_buildup() {
    let mut body = Node::new(NodeType::Body);
    let mut section = factory::section(1);
    section
        .attributes
        .insert("css-class".to_string(), "promo dark".to_string());
    body.children.push(section);
    let document = Document::with_body(body);

    let mut current = document;
    for _ in 0..2 {
        current = markup_to_document(&document_to_markup(&current));
        let section = &current.body.children[0];
        assert_eq!(
            section.attributes.get("css-class").map(String::as_str),
            Some("promo dark")
        );
    }
}

#[test]
fn content_payloads_survive_verbatim() {
    let mut body = Node::new(NodeType::Body);
    let mut section = factory::section(1);
    let column = &mut section.children[0];
    column
        .children
        .push(factory::text("<p>Tom &amp; Jerry <strong>forever</strong></p>"));
    column
        .children
        .push(factory::raw("<!--[if mso]><table><tr><td><![endif]-->"));
    body.children.push(section);
    let document = Document::with_body(body);

    let reread = markup_to_document(&document_to_markup(&document));
    let column = &reread.body.children[0].children[0];
    assert_eq!(
        column.children[0].html_content.as_deref(),
        Some("<p>Tom &amp; Jerry <strong>forever</strong></p>")
    );
    assert_eq!(
        column.children[1].html_content.as_deref(),
        Some("<!--[if mso]><table><tr><td><![endif]-->")
    );
}

#[test]
fn attribute_values_round_trip_through_escaping() {
    let mut body = Node::new(NodeType::Body);
    let mut section = factory::section(1);
    let mut button = factory::button("Buy");
    button.attributes.insert(
        "href".to_string(),
        "https://example.com/?a=1&b=\"two\"<3>".to_string(),
    );
    section.children[0].children.push(button);
    body.children.push(section);
    let document = Document::with_body(body);

    let reread = markup_to_document(&document_to_markup(&document));
    let button = &reread.body.children[0].children[0].children[0];
    assert_eq!(
        button.attributes.get("href").map(String::as_str),
        Some("https://example.com/?a=1&b=\"two\"<3>")
    );
}

#[test]
fn conditions_gate_the_write_and_never_read_back() {
    let mut gated = factory::section(1);
    gated.condition = Some(Condition {
        variable: "user.vip".to_string(),
        operator: ConditionOperator::Exists,
        value: None,
    });
    let mut body = Node::new(NodeType::Body);
    body.children.push(gated);
    body.children.push(factory::section(2));
    let document = Document::with_body(body);

    // Denied: the gated section is gone from the round-tripped tree.
    let deny = |_: &Condition| false;
    let markup = MarkupWriter::with_condition_eval(&deny).write(&document);
    let reread = markup_to_document(&markup);
    assert_eq!(reread.body.children.len(), 1);
    assert_eq!(reread.body.children[0].children.len(), 2);

    // Default write keeps it, but the condition itself is editor-side
    // state and does not survive the trip.
    let reread = markup_to_document(&document_to_markup(&document));
    assert_eq!(reread.body.children.len(), 2);
    assert!(reread.body.children[0].condition.is_none());
}

#[test]
fn arbitrary_junk_still_round_trips_to_legal_markup() {
    for junk in [
        "",
        "not markup at all",
        "<<<>>>",
        "<mj-section><mj-column><mj-text>lost",
        "<?xml version=\"1.0\"?><!DOCTYPE html><wat></wat>",
    ] {
        let document = markup_to_document(junk);
        assert_eq!(document.body.node_type, NodeType::Body);
        let markup = document_to_markup(&document);
        assert!(markup.starts_with("<mjml>\n"));
        assert!(markup.ends_with("</mjml>\n"));
    }
}
