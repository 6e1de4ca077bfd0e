use super::matches::TextContext;
use crate::dom::{Document, Element, NodeData, NodeId};

/// Elements whose content is never annotated.
pub const DEFAULT_SKIP_TAGS: &[&str] = &[
    "a", "script", "style", "noscript", "textarea", "input", "select", "option", "button",
];

/// Elements whose text runs on from their neighbours, so their first and last
/// characters count as context for an adjacent text node.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark", "q",
    "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

/// Which elements hide their subtree from the annotator. Links are always
/// skipped, whatever the configured list says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipPolicy {
    tags: Vec<String>,
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SKIP_TAGS)
    }
}

impl SkipPolicy {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = vec!["a".to_string()];
        for tag in tags {
            let tag = tag.as_ref().trim().to_ascii_lowercase();
            if !tag.is_empty() && !list.contains(&tag) {
                list.push(tag);
            }
        }
        Self { tags: list }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn skips(&self, el: &Element) -> bool {
        self.tags.iter().any(|t| el.is(t))
    }
}

/// Text nodes under `root` (or `root` itself) that may be annotated, in
/// document order.
///
/// Nothing is returned when `root` sits inside a skipped element, however far
/// up that element is.
pub fn candidate_text_nodes(doc: &Document, root: NodeId, policy: &SkipPolicy) -> Vec<NodeId> {
    if let Some(skipped) = doc.closest(root, |el| policy.skips(el)) {
        log::trace!("scan root {root:?} is inside skipped element {skipped:?}");
        return Vec::new();
    }

    let mut found = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        match doc.data(id) {
            NodeData::Text(t) if !t.is_empty() => found.push(id),
            NodeData::Element(el) if policy.skips(el) => {
                log::trace!("skipping <{}> subtree at {id:?}", el.name);
            }
            NodeData::Element(_) | NodeData::Document => {
                stack.extend(doc.children(id).iter().rev());
            }
            _ => {}
        }
    }
    found
}

/// Characters of the inline neighbours of a text node. At the edge of an
/// inline parent the search continues with the parent's own neighbours.
pub fn text_context(doc: &Document, node: NodeId) -> TextContext {
    TextContext {
        before: neighbour_char(doc, node, Side::Before),
        after: neighbour_char(doc, node, Side::After),
    }
}

#[derive(Clone, Copy)]
enum Side {
    Before,
    After,
}

fn neighbour_char(doc: &Document, node: NodeId, side: Side) -> Option<char> {
    let mut current = node;
    loop {
        let parent = doc.parent(current)?;
        let siblings = doc.children(parent);
        let index = siblings.iter().position(|&c| c == current)?;
        let neighbour = match side {
            Side::Before => siblings[..index].iter().rev().find(|&&s| !is_comment(doc, s)),
            Side::After => siblings[index + 1..].iter().find(|&&s| !is_comment(doc, s)),
        };
        match neighbour {
            Some(&sibling) => return edge_char(doc, sibling, side),
            None if is_inline(doc, parent) => current = parent,
            None => return None,
        }
    }
}

fn is_comment(doc: &Document, id: NodeId) -> bool {
    matches!(doc.data(id), NodeData::Comment(_))
}

fn is_inline(doc: &Document, id: NodeId) -> bool {
    doc.element(id)
        .is_some_and(|el| INLINE_ELEMENTS.iter().any(|n| el.is(n)))
}

/// The character of `id` that faces the node on `side` of it.
fn edge_char(doc: &Document, id: NodeId, side: Side) -> Option<char> {
    let text = match doc.data(id) {
        NodeData::Text(t) => t.clone(),
        NodeData::Element(_) if is_inline(doc, id) => doc.text_content(id),
        _ => return None,
    };
    match side {
        Side::Before => text.chars().next_back(),
        Side::After => text.chars().next(),
    }
}
