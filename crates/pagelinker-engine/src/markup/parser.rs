use std::sync::OnceLock;

use regex::Regex;

use super::lexer::{Lexer, TokenKind};
use crate::dom::{Attribute, Document, Element, NodeId};

/// Elements that never have children or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is taken verbatim up to the matching end tag.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Raw text elements whose content still has character references decoded.
pub const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["textarea", "title"];

pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

pub fn is_raw_text(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

fn is_escapable_raw_text(name: &str) -> bool {
    ESCAPABLE_RAW_TEXT_ELEMENTS
        .iter()
        .any(|v| v.eq_ignore_ascii_case(name))
}

/// Reads markup into a [`Document`].
///
/// The reader is tolerant rather than conforming: it never fails, ignores end
/// tags that match nothing, and closes whatever is still open at end of input.
/// No mutation records are produced.
pub fn parse(input: &str) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    let mut open: Vec<NodeId> = vec![root];
    let mut lexer = Lexer::new(input);

    while let Some(token) = lexer.next() {
        let parent = open.last().copied().unwrap_or(root);
        match token.kind {
            TokenKind::Text => push_text(&mut doc, parent, token.text, true),
            TokenKind::Comment => {
                let body = token.text.strip_prefix("<!--").unwrap_or(token.text);
                let body = body.strip_suffix("-->").unwrap_or(body);
                let node = doc.create_comment(body);
                doc.append_silently(parent, node);
            }
            TokenKind::Doctype => {
                let body = &token.text[2..token.text.len() - 1];
                let node = doc.create_doctype(body);
                doc.append_silently(parent, node);
            }
            TokenKind::StartTag => {
                let (element, self_closing) = parse_start_tag(token.text);
                let name = element.name.clone();
                let node = doc.create_element(element);
                doc.append_silently(parent, node);

                if self_closing || is_void(&name) {
                    continue;
                }
                if is_raw_text(&name) || is_escapable_raw_text(&name) {
                    let raw = lexer.take_raw_text(&name);
                    push_text(&mut doc, node, raw, !is_raw_text(&name));
                }
                open.push(node);
            }
            TokenKind::EndTag => {
                let name = end_tag_name(token.text);
                let matching = open.iter().skip(1).rposition(|&n| {
                    doc.element(n).is_some_and(|el| el.name.eq_ignore_ascii_case(&name))
                });
                if let Some(pos) = matching {
                    open.truncate(pos + 1);
                }
            }
        }
    }

    doc
}

/// Appends text to `parent`, merging with a preceding text sibling so that
/// split tokens (e.g. around a stray `<`) stay one text node.
fn push_text(doc: &mut Document, parent: NodeId, raw: &str, decode: bool) {
    if raw.is_empty() {
        return;
    }
    let text = if decode {
        html_escape::decode_html_entities(raw)
    } else {
        raw.into()
    };

    if let Some(&last) = doc.children(parent).last()
        && let Some(existing) = doc.text_mut_silently(last)
    {
        existing.push_str(&text);
        return;
    }

    let node = doc.create_text(text.into_owned());
    doc.append_silently(parent, node);
}

fn attribute_regex() -> &'static Regex {
    static ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
    ATTR_REGEX.get_or_init(|| {
        Regex::new(
            r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
        )
        .expect("Invalid attribute regex")
    })
}

/// Splits a start tag token into its element and whether it was written
/// self-closing (`<br/>`).
fn parse_start_tag(text: &str) -> (Element, bool) {
    let inner = text.trim_start_matches('<').trim_end_matches('>');
    let self_closing = inner.ends_with('/');
    let inner = inner.trim_end_matches('/');

    let name_end = inner
        .find(|c: char| c.is_ascii_whitespace())
        .unwrap_or(inner.len());
    let mut element = Element::new(&inner[..name_end]);

    for caps in attribute_regex().captures_iter(&inner[name_end..]) {
        let name = caps[1].to_ascii_lowercase();
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned())
            .unwrap_or_default();
        // First occurrence wins, as in browsers.
        if element.attr(&name).is_none() {
            element.attrs.push(Attribute { name, value });
        }
    }

    (element, self_closing)
}

fn end_tag_name(text: &str) -> String {
    text.trim_start_matches("</")
        .trim_end_matches('>')
        .trim()
        .to_ascii_lowercase()
}
