//! # mailcraft-markup
//!
//! Conversion between [`mailcraft_document::Document`] trees and MJML
//! markup text.
//!
//! The two directions have very different contracts. Writing is total
//! and deterministic: any document serializes, and the same document
//! always produces the same bytes. Reading is total and lenient: any
//! input, however broken, produces a structurally legal document, with
//! unrepresentable pieces dropped rather than reported.
//!
//! Reading always mints fresh node ids, so a round trip preserves the
//! shape and content of a document but never its identity.
//!
//! ```
//! use mailcraft_document::factory;
//! use mailcraft_markup::{document_to_markup, markup_to_document};
//!
//! let document = factory::default_document();
//! let reread = markup_to_document(&document_to_markup(&document));
//! assert_eq!(reread.body.census(), document.body.census());
//! ```

pub mod reader;
pub mod tokenizer;
pub mod writer;

pub use reader::markup_to_document;
pub use tokenizer::{tokenize, ContentToken, MarkupEvent, MarkupLexer, TagToken};
pub use writer::{document_to_markup, MarkupWriter};
