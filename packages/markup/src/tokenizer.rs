//! Lexer for the email markup dialect.
//!
//! Markup is XML-shaped but arrives from sources that do not always
//! produce XML: hand edits, template exports, model output. The lexer
//! therefore never fails; anything it cannot recognize is skipped and
//! the caller keeps going.
//!
//! Two token sets cover the two lexical contexts. [`ContentToken`]
//! applies between tags, [`TagToken`] applies inside a tag between the
//! name and the closing `>`. [`MarkupLexer`] switches between them and
//! hands out whole [`MarkupEvent`]s so callers never see the split.

use logos::{Lexer, Logos};

/// Tokens recognized between tags.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum ContentToken<'src> {
    #[regex(r"<[A-Za-z][A-Za-z0-9-]*", |lex| &lex.slice()[1..])]
    TagOpen(&'src str),

    #[regex(r"</[A-Za-z][A-Za-z0-9-]*\s*>", |lex| lex.slice()[2..].trim_end_matches('>').trim_end())]
    TagClose(&'src str),

    #[token("<!--")]
    CommentOpen,

    /// Doctype and friends. Recognized only to be dropped.
    #[regex(r"<![A-Za-z][^>]*>")]
    Declaration,

    #[regex(r"[^<]+")]
    Text(&'src str),

    /// A `<` that does not start a tag.
    #[token("<")]
    StrayLt,
}

/// Tokens recognized inside a tag, after the name.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TagToken<'src> {
    /// Attribute name, or an unquoted attribute value.
    #[regex(r"[A-Za-z0-9_][A-Za-z0-9_.:%-]*")]
    Name(&'src str),

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#, |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    #[regex(r"'[^']*'", |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    Quoted(&'src str),

    #[token(">")]
    TagEnd,

    #[token("/>")]
    SelfClose,
}

/// A structural event assembled from the raw tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupEvent<'src> {
    Open {
        tag: &'src str,
        /// Attribute pairs in source order, values still entity-encoded.
        attributes: Vec<(&'src str, &'src str)>,
        self_closing: bool,
    },
    Close {
        tag: &'src str,
    },
    Text(&'src str),
}

/// Streaming event lexer over a markup source.
pub struct MarkupLexer<'src> {
    source: &'src str,
    lexer: Lexer<'src, ContentToken<'src>>,
}

impl<'src> MarkupLexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            lexer: ContentToken::lexer(source),
        }
    }

    /// Byte offset just past the last consumed token.
    pub fn offset(&self) -> usize {
        self.lexer.span().end
    }

    /// Next structural event, or `None` at end of input. Junk between
    /// events is consumed silently.
    pub fn next_event(&mut self) -> Option<MarkupEvent<'src>> {
        loop {
            match self.lexer.next()? {
                Ok(ContentToken::TagOpen(tag)) => return Some(self.finish_open(tag)),
                Ok(ContentToken::TagClose(tag)) => return Some(MarkupEvent::Close { tag }),
                Ok(ContentToken::Text(text)) => return Some(MarkupEvent::Text(text)),
                Ok(ContentToken::CommentOpen) => self.skip_comment(),
                Ok(ContentToken::Declaration) | Ok(ContentToken::StrayLt) | Err(()) => {}
            }
        }
    }

    /// Consumes raw character data up to the matching close tag and
    /// returns it verbatim, entities and inner markup untouched. Nested
    /// same-name tags are balanced. Runs to end of input when the close
    /// tag never shows up.
    pub fn raw_until_close(&mut self, tag: &str) -> &'src str {
        let start = self.offset();
        let rest = &self.source[start..];
        let mut cursor = 0usize;
        let mut depth = 0usize;
        while let Some(found) = rest[cursor..].find('<') {
            let lt = cursor + found;
            if let Some(end) = tag_span_end(rest, lt, tag, true) {
                if depth == 0 {
                    self.lexer.bump(end);
                    return &rest[..lt];
                }
                depth -= 1;
                cursor = end;
            } else if let Some(end) = tag_span_end(rest, lt, tag, false) {
                depth += 1;
                cursor = end;
            } else {
                cursor = lt + 1;
            }
        }
        self.lexer.bump(rest.len());
        rest
    }

    /// Reads the attribute section of an open tag, through `>` or `/>`.
    fn finish_open(&mut self, tag: &'src str) -> MarkupEvent<'src> {
        let content = std::mem::replace(&mut self.lexer, ContentToken::lexer(""));
        let mut tags = content.morph::<TagToken<'src>>();

        let mut attributes = Vec::new();
        let mut pending_name: Option<&'src str> = None;
        let mut after_eq = false;
        let mut self_closing = false;

        for token in tags.by_ref() {
            match token {
                Ok(TagToken::Name(name)) => {
                    if after_eq {
                        if let Some(key) = pending_name.take() {
                            attributes.push((key, name));
                        }
                        after_eq = false;
                    } else {
                        if let Some(key) = pending_name.take() {
                            attributes.push((key, ""));
                        }
                        pending_name = Some(name);
                    }
                }
                Ok(TagToken::Eq) => after_eq = true,
                Ok(TagToken::Quoted(value)) => {
                    if let Some(key) = pending_name.take() {
                        attributes.push((key, value));
                    }
                    after_eq = false;
                }
                Ok(TagToken::TagEnd) => break,
                Ok(TagToken::SelfClose) => {
                    self_closing = true;
                    break;
                }
                Err(()) => {}
            }
        }
        if let Some(key) = pending_name.take() {
            attributes.push((key, ""));
        }

        self.lexer = tags.morph();
        MarkupEvent::Open {
            tag,
            attributes,
            self_closing,
        }
    }

    fn skip_comment(&mut self) {
        let rest = self.lexer.remainder();
        match rest.find("-->") {
            Some(pos) => self.lexer.bump(pos + 3),
            None => self.lexer.bump(rest.len()),
        }
    }
}

/// If `rest[lt..]` spells the requested open or close tag
/// (case-insensitively), returns the offset just past it.
fn tag_span_end(rest: &str, lt: usize, tag: &str, closing: bool) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut i = lt + 1;
    if closing {
        if bytes.get(i) != Some(&b'/') {
            return None;
        }
        i += 1;
    }
    let name_end = i + tag.len();
    if rest.len() < name_end || !rest[i..name_end].eq_ignore_ascii_case(tag) {
        return None;
    }
    i = name_end;
    if closing {
        while bytes.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
            i += 1;
        }
        match bytes.get(i) {
            Some(&b'>') => Some(i + 1),
            None => Some(i),
            _ => None,
        }
    } else {
        // Open tags only count when the name stops here, so "mj-text"
        // does not match inside "<mj-texts".
        match bytes.get(i) {
            Some(&b'>') | Some(&b'/') => Some(i),
            Some(b) if b.is_ascii_whitespace() => Some(i),
            None => Some(i),
            _ => None,
        }
    }
}

/// Collects every event in `source`. Reading incrementally through
/// [`MarkupLexer`] is preferred; this exists for tests and tooling.
pub fn tokenize(source: &str) -> Vec<MarkupEvent<'_>> {
    let mut lexer = MarkupLexer::new(source);
    let mut events = Vec::new();
    while let Some(event) = lexer.next_event() {
        events.push(event);
    }
    events
}
