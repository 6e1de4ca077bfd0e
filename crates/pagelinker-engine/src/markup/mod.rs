//! # Markup
//!
//! Reading HTML into a [`Document`](crate::dom::Document) and writing it back.
//!
//! ## Modules
//!
//! - **`lexer`**: Logos tokenizer (tags, comments, doctype, text)
//! - **`parser`**: tolerant tree builder: void elements, raw text elements,
//!   entity decoding, forgiving end-tag handling
//! - **`render`**: serializer with text/attribute escaping
//!
//! This is not a conforming HTML5 parser. It covers what the annotator needs
//! to process saved pages and mail bodies: every input yields a tree, and all
//! character data survives the trip through `parse` and `render`.

pub mod lexer;
pub mod parser;
pub mod render;

pub use parser::parse;
pub use render::{inner_html, render};
