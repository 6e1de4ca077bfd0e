//! # Document Tree
//!
//! An arena-backed, DOM-like tree that the annotator rewrites in place.
//!
//! ## Model
//!
//! - Every node lives in a single `Vec` owned by [`Document`] and is addressed
//!   by a copyable [`NodeId`]. Removing a node only detaches it; the id stays
//!   valid, so a stale id can always be asked whether it is still connected.
//! - Node id `0` is the document node and is never detached.
//! - The arena only grows. Detached nodes, including every text node the
//!   annotator replaces, keep their slot for the life of the document, so a
//!   long-lived document that is rescanned after each change grows by the
//!   nodes each rewrite creates. Re-parse into a fresh [`Document`] to
//!   reclaim them.
//! - Public mutators (`append_child`, `insert_before`, `remove`, `set_text`,
//!   `replace_with`) append a [`MutationRecord`] to the journal, playing the
//!   part of a browser's `MutationObserver` queue. The markup reader builds
//!   trees without journaling.

pub mod mutation;

pub use mutation::{MutationKind, MutationRecord, Origin};

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena. Allocation order, not tree order.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// An element's tag name (always ASCII-lowercased) and its attributes in
/// source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Sets an attribute, replacing an existing value with the same name.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attrs
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.value = value,
            None => self.attrs.push(Attribute {
                name: name.to_ascii_lowercase(),
                value,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Doctype(String),
    Comment(String),
    Text(String),
    Element(Element),
}

impl NodeData {
    fn can_have_children(&self) -> bool {
        matches!(self, NodeData::Document | NodeData::Element(_))
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0:?} cannot have children")]
    NotAContainer(NodeId),
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("the document node cannot be moved")]
    DocumentNode,
    #[error("{reference:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, reference: NodeId },
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    records: Vec<MutationRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            records: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    // Node creation. New nodes are detached until inserted.

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.alloc(NodeData::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(text.into()))
    }

    pub fn create_doctype(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Doctype(text.into()))
    }

    // Queries

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id).data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Siblings immediately before and after `id` within its parent.
    pub fn adjacent_siblings(&self, id: NodeId) -> (Option<NodeId>, Option<NodeId>) {
        let Some(parent) = self.parent(id) else {
            return (None, None);
        };
        let siblings = self.children(parent);
        match siblings.iter().position(|&c| c == id) {
            Some(i) => (
                i.checked_sub(1).map(|p| siblings[p]),
                siblings.get(i + 1).copied(),
            ),
            None => (None, None),
        }
    }

    /// Ancestors of `id` from its parent up to the document node.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// True if `id` is the document node or has it as an ancestor.
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == Self::ROOT || self.ancestors(id).any(|a| a == Self::ROOT)
    }

    /// True if `node` is `ancestor` or lies somewhere beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Nearest element, starting at `id` itself, that satisfies `pred`.
    pub fn closest(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| self.element(n).is_some_and(&pred))
    }

    /// Pre-order traversal of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// Concatenated text of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// The `<body>` element, or the document node when there is none.
    pub fn body(&self) -> NodeId {
        self.descendants(Self::ROOT)
            .find(|&n| self.element(n).is_some_and(|el| el.is("body")))
            .unwrap_or(Self::ROOT)
    }

    // Journaled mutations

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.insert_before(parent, child, None)
    }

    /// Inserts `child` under `parent` before `reference`, or last when
    /// `reference` is `None`. A child that already has a parent is moved.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), TreeError> {
        self.check_insert(parent, child)?;
        if let Some(r) = reference
            && self.parent(r) != Some(parent)
        {
            return Err(TreeError::NotAChild {
                parent,
                reference: r,
            });
        }
        if reference == Some(child) {
            return Ok(());
        }

        if let Some(old_parent) = self.detach(child) {
            self.records.push(MutationRecord::child_list(
                old_parent,
                Vec::new(),
                vec![child],
                Origin::External,
            ));
        }

        let index = match reference {
            Some(r) => self.index_in_parent(parent, r),
            None => self.children(parent).len(),
        };
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.records.push(MutationRecord::child_list(
            parent,
            vec![child],
            Vec::new(),
            Origin::External,
        ));
        Ok(())
    }

    /// Detaches `id` from its parent. Returns `false` for the document node
    /// or a node that is already detached.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == Self::ROOT {
            return false;
        }
        match self.detach(id) {
            Some(parent) => {
                self.records.push(MutationRecord::child_list(
                    parent,
                    Vec::new(),
                    vec![id],
                    Origin::External,
                ));
                true
            }
            None => false,
        }
    }

    /// Replaces the character data of a text node. Returns `false` if `id`
    /// is not a text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        match &mut self.nodes[id.0].data {
            NodeData::Text(t) => {
                *t = text.into();
                self.records.push(MutationRecord::character_data(id));
                true
            }
            _ => false,
        }
    }

    /// Swaps `node` for `replacements` in one child-list mutation.
    ///
    /// This is the guarded replacement used by the annotator: when `node` has
    /// been detached, or its subtree is no longer part of the document, nothing
    /// happens and `false` is returned. Replacements must be detached nodes.
    pub fn replace_with(&mut self, node: NodeId, replacements: &[NodeId], origin: Origin) -> bool {
        if node == Self::ROOT || !self.is_connected(node) {
            return false;
        }
        let Some(parent) = self.parent(node) else {
            return false;
        };
        if replacements
            .iter()
            .any(|&r| r == Self::ROOT || self.parent(r).is_some() || self.contains(r, parent))
        {
            return false;
        }

        let index = self.index_in_parent(parent, node);
        self.nodes[parent.0]
            .children
            .splice(index..=index, replacements.iter().copied());
        self.nodes[node.0].parent = None;
        for &r in replacements {
            self.nodes[r.0].parent = Some(parent);
        }
        self.records.push(MutationRecord::child_list(
            parent,
            replacements.to_vec(),
            vec![node],
            origin,
        ));
        true
    }

    /// Drains the mutation journal.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn pending_records(&self) -> &[MutationRecord] {
        &self.records
    }

    // Unjournaled building, used by the markup reader.

    pub(crate) fn append_silently(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.node(parent).data.can_have_children());
        debug_assert!(self.parent(child).is_none());
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub(crate) fn text_mut_silently(&mut self, id: NodeId) -> Option<&mut String> {
        match &mut self.nodes[id.0].data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if child == Self::ROOT {
            return Err(TreeError::DocumentNode);
        }
        if !self.node(parent).data.can_have_children() {
            return Err(TreeError::NotAContainer(parent));
        }
        if self.contains(child, parent) {
            return Err(TreeError::Cycle { parent, child });
        }
        Ok(())
    }

    fn index_in_parent(&self, parent: NodeId, child: NodeId) -> usize {
        self.children(parent)
            .iter()
            .position(|&c| c == child)
            .unwrap_or(self.children(parent).len())
    }

    fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes[id.0].parent.take()?;
        self.nodes[parent.0].children.retain(|&c| c != id);
        Some(parent)
    }
}

/// Pre-order iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}
