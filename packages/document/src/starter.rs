//! Ready-made documents the editor offers on the new-email screen.

use std::collections::BTreeMap;

use crate::document::{Document, FontDecl};
use crate::factory;
use crate::node::{Node, NodeType};

/// The built-in starting points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarterTemplate {
    /// One section, one column, one text block.
    Default,
    /// Two-column issue layout with a social footer.
    Newsletter,
    /// Hero banner with a call to action.
    Announcement,
}

impl StarterTemplate {
    pub const ALL: [StarterTemplate; 3] = [
        StarterTemplate::Default,
        StarterTemplate::Newsletter,
        StarterTemplate::Announcement,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StarterTemplate::Default => "default",
            StarterTemplate::Newsletter => "newsletter",
            StarterTemplate::Announcement => "announcement",
        }
    }

    pub fn from_name(name: &str) -> Option<StarterTemplate> {
        StarterTemplate::ALL.iter().copied().find(|t| t.name() == name)
    }

    pub fn build(&self) -> Document {
        match self {
            StarterTemplate::Default => factory::default_document(),
            StarterTemplate::Newsletter => newsletter(),
            StarterTemplate::Announcement => announcement(),
        }
    }
}

fn text_defaults() -> BTreeMap<String, String> {
    let mut styles = BTreeMap::new();
    styles.insert("font-size".to_string(), "14px".to_string());
    styles.insert("line-height".to_string(), "1.6".to_string());
    styles
}

fn newsletter() -> Document {
    let mut body = Node::new(NodeType::Body);
    body.attributes
        .insert("background-color".to_string(), "#f4f4f4".to_string());

    // Masthead inside a wrapper so the banner background spans the
    // full width.
    let mut masthead = factory::wrapper();
    masthead
        .attributes
        .insert("background-color".to_string(), "#ffffff".to_string());
    let mut title_section = factory::section(1);
    if let Some(column) = title_section.children.first_mut() {
        column
            .children
            .push(factory::text("<h1>The Monthly Dispatch</h1>"));
        column.children.push(factory::divider());
    }
    masthead.children.push(title_section);
    body.children.push(masthead);

    // Lead story: image beside copy.
    let mut story = factory::section(2);
    if let Some(left) = story.children.get_mut(0) {
        left.children
            .push(factory::image("https://placehold.co/280x160"));
    }
    if let Some(right) = story.children.get_mut(1) {
        right
            .children
            .push(factory::text("<p>This month we shipped the things we said we would, which surprised everyone including us.</p>"));
        right.children.push(factory::button("Read more"));
    }
    body.children.push(story);

    // Footer with social links.
    let mut footer = factory::section(1);
    if let Some(column) = footer.children.first_mut() {
        column.children.push(factory::spacer());
        let mut links = factory::social();
        links
            .children
            .push(factory::social_element("twitter", "https://twitter.com/example"));
        links
            .children
            .push(factory::social_element("github", "https://github.com/example"));
        column.children.push(links);
    }
    body.children.push(footer);

    let mut document = Document::with_body(body);
    document.head_attributes.preview_text = "Your monthly update is here".to_string();
    document.head_attributes.fonts.push(FontDecl {
        name: "Inter".to_string(),
        href: "https://fonts.googleapis.com/css2?family=Inter".to_string(),
    });
    document
        .head_attributes
        .default_styles
        .insert("mj-text".to_string(), text_defaults());
    document
}

fn announcement() -> Document {
    let mut body = Node::new(NodeType::Body);
    body.attributes
        .insert("background-color".to_string(), "#1a1a2e".to_string());

    let mut banner = factory::hero();
    banner
        .attributes
        .insert("background-color".to_string(), "#16213e".to_string());
    banner
        .children
        .push(factory::text("<h1>We have news</h1>"));
    banner.children.push(factory::button("See what changed"));
    body.children.push(banner);

    let mut fine_print = factory::section(1);
    if let Some(column) = fine_print.children.first_mut() {
        column.children.push(factory::spacer());
        column.children.push(factory::raw(
            "<!--[if mso]><p>Outlook readers get the plain version.</p><![endif]-->",
        ));
    }
    body.children.push(fine_print);

    let mut document = Document::with_body(body);
    document.head_attributes.preview_text = "A short announcement".to_string();
    document
}
