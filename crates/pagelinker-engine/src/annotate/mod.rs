//! # Annotation
//!
//! Turns recognisable tokens in text nodes into inline links.
//!
//! A scan runs in two phases:
//!
//! 1. **Plan** (read-only): walk the candidate text nodes under a root, match
//!    every rule against each node's full text plus its inline context, drop
//!    overlaps and build an [`AnnotatedFragment`] per node that has links.
//! 2. **Apply**: swap each planned node for its fragment with one guarded
//!    [`Document::replace_with`]. An edit whose node was detached or whose text
//!    changed since planning is skipped and counted as stale.
//!
//! Output links are `<a>` elements, which are always skipped on later scans,
//! so scanning the same content again changes nothing.

pub mod fragment;
pub mod matches;
pub mod span;
pub mod walk;

pub use fragment::{AnnotatedFragment, LinkRun, Run};
pub use matches::{Match, TextContext, find_matches, resolve_overlaps};
pub use span::Span;
pub use walk::{DEFAULT_SKIP_TAGS, SkipPolicy};

use crate::dom::{Document, NodeId, Origin};
use crate::markup;
use crate::rules::RuleSet;

/// Counters from one or more scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub nodes_visited: usize,
    pub nodes_rewritten: usize,
    pub links_created: usize,
    /// Planned edits dropped because the node went away or changed.
    pub stale: usize,
}

impl ScanReport {
    pub fn merge(&mut self, other: ScanReport) {
        self.nodes_visited += other.nodes_visited;
        self.nodes_rewritten += other.nodes_rewritten;
        self.links_created += other.links_created;
        self.stale += other.stale;
    }

    /// True when the scan left the document as it was.
    pub fn is_noop(&self) -> bool {
        self.nodes_rewritten == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEdit {
    pub node: NodeId,
    /// Text the plan was computed from; the edit only applies if it still
    /// matches.
    pub original: String,
    pub fragment: AnnotatedFragment,
}

/// Result of the read-only phase of a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPlan {
    visited: usize,
    edits: Vec<PlannedEdit>,
}

impl ScanPlan {
    pub fn edits(&self) -> &[PlannedEdit] {
        &self.edits
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn apply(self, doc: &mut Document) -> ScanReport {
        let mut report = ScanReport {
            nodes_visited: self.visited,
            ..ScanReport::default()
        };

        for edit in self.edits {
            if !doc.is_connected(edit.node) || doc.text(edit.node) != Some(edit.original.as_str()) {
                log::debug!("skipping stale edit for text node {:?}", edit.node);
                report.stale += 1;
                continue;
            }
            // Nodes are only allocated once the edit is known to apply.
            let nodes = edit.fragment.materialize(doc);
            if doc.replace_with(edit.node, &nodes, Origin::Annotator) {
                let links = edit.fragment.link_count();
                log::debug!("rewrote text node {:?} with {links} link(s)", edit.node);
                report.nodes_rewritten += 1;
                report.links_created += links;
            } else {
                log::debug!("replacement of text node {:?} was refused", edit.node);
                report.stale += 1;
            }
        }
        report
    }
}

/// A rule set plus the elements to stay out of.
#[derive(Debug, Clone, Default)]
pub struct Annotator {
    rules: RuleSet,
    skip: SkipPolicy,
}

impl Annotator {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            skip: SkipPolicy::default(),
        }
    }

    pub fn with_skip_policy(mut self, skip: SkipPolicy) -> Self {
        self.skip = skip;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn skip_policy(&self) -> &SkipPolicy {
        &self.skip
    }

    /// Annotates a free-standing string with no surrounding context.
    pub fn annotate_text(&self, text: &str) -> AnnotatedFragment {
        let matches = find_matches(&self.rules, text, TextContext::default());
        AnnotatedFragment::build(text, &matches, &self.rules)
    }

    pub fn plan(&self, doc: &Document, root: NodeId) -> ScanPlan {
        plan(doc, root, &self.rules, &self.skip)
    }

    /// Plans and applies in one go.
    pub fn scan(&self, doc: &mut Document, root: NodeId) -> ScanReport {
        self.plan(doc, root).apply(doc)
    }

    /// Parses `html`, scans from its `<body>` (or the whole document) and
    /// renders the result.
    pub fn linkify_html(&self, html: &str) -> (String, ScanReport) {
        let mut doc = markup::parse(html);
        let root = doc.body();
        let report = self.scan(&mut doc, root);
        (markup::render(&doc, doc.root()), report)
    }
}

/// Scans `root` with `rules` and the default skip list.
pub fn scan(doc: &mut Document, root: NodeId, rules: &RuleSet) -> ScanReport {
    plan(doc, root, rules, &SkipPolicy::default()).apply(doc)
}

fn plan(doc: &Document, root: NodeId, rules: &RuleSet, skip: &SkipPolicy) -> ScanPlan {
    let candidates = walk::candidate_text_nodes(doc, root, skip);
    let mut plan = ScanPlan {
        visited: candidates.len(),
        edits: Vec::new(),
    };

    for node in candidates {
        let Some(text) = doc.text(node) else {
            continue;
        };
        let context = walk::text_context(doc, node);
        let matches = find_matches(rules, text, context);
        if matches.is_empty() {
            continue;
        }
        plan.edits.push(PlannedEdit {
            node,
            original: text.to_string(),
            fragment: AnnotatedFragment::build(text, &matches, rules),
        });
    }
    plan
}
