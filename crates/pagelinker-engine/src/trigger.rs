//! Mutation-driven re-scanning.
//!
//! [`ScanTrigger`] plays the observer: one full scan at start, then one scan
//! per inserted subtree root for each batch of journal records.

use std::collections::HashSet;

use crate::annotate::{Annotator, ScanReport};
use crate::dom::{Document, MutationKind, MutationRecord, NodeId, Origin};

#[derive(Debug, Clone)]
pub struct ScanTrigger {
    annotator: Annotator,
    content_root: Option<NodeId>,
}

impl ScanTrigger {
    pub fn new(annotator: Annotator) -> Self {
        Self {
            annotator,
            content_root: None,
        }
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// The root passed to [`start`](Self::start), if it has run.
    pub fn content_root(&self) -> Option<NodeId> {
        self.content_root
    }

    /// Runs the initial scan of `content_root`. Records already in the
    /// journal are dropped; the full scan covers them.
    pub fn start(&mut self, doc: &mut Document, content_root: NodeId) -> ScanReport {
        let discarded = doc.take_records().len();
        if discarded > 0 {
            log::trace!("dropped {discarded} record(s) queued before start");
        }
        self.content_root = Some(content_root);
        let report = self.annotator.scan(doc, content_root);
        log::debug!(
            "initial scan: {} link(s) in {} node(s)",
            report.links_created,
            report.nodes_rewritten
        );
        report
    }

    /// Drains the journal and scans whatever external changes touched.
    /// Before [`start`](Self::start) the whole document counts as content.
    pub fn on_mutations(&mut self, doc: &mut Document) -> ScanReport {
        let records = doc.take_records();
        let content_root = self.content_root.unwrap_or(doc.root());
        let roots = scan_roots(doc, &records, content_root);

        let mut report = ScanReport::default();
        for root in roots {
            report.merge(self.annotator.scan(doc, root));
        }
        if !report.is_noop() {
            log::debug!(
                "mutation scan: {} link(s) in {} node(s)",
                report.links_created,
                report.nodes_rewritten
            );
        }
        report
    }
}

/// Subtree roots to scan for a batch of records, in order of first
/// appearance, with any root nested in another one dropped.
///
/// Each node is checked against its own ancestors only, so the cost grows
/// with the batch size times the tree depth.
fn scan_roots(doc: &Document, records: &[MutationRecord], content_root: NodeId) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut touched = Vec::new();
    for record in records.iter().filter(|r| r.origin == Origin::External) {
        let nodes: &[NodeId] = match record.kind {
            MutationKind::ChildList => &record.added,
            MutationKind::CharacterData => std::slice::from_ref(&record.target),
        };
        for &node in nodes {
            if seen.insert(node) && doc.is_connected(node) && doc.contains(content_root, node) {
                touched.push(node);
            }
        }
    }

    let candidates: HashSet<NodeId> = touched.iter().copied().collect();
    touched
        .into_iter()
        .filter(|&node| !doc.ancestors(node).any(|a| candidates.contains(&a)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;
    use crate::markup::parse;
    use crate::rules::{PatternRule, RuleSet};
    use pretty_assertions::assert_eq;

    fn trigger() -> ScanTrigger {
        let rules = RuleSet::new([PatternRule::builder("n", r"6[1-9]\d{3}")
            .url_template("/n/{value}")
            .build()
            .unwrap()])
        .unwrap();
        ScanTrigger::new(Annotator::new(rules))
    }

    fn find(doc: &Document, name: &str) -> NodeId {
        doc.descendants(doc.root())
            .find(|&n| doc.element(n).is_some_and(|el| el.is(name)))
            .unwrap()
    }

    #[test]
    fn start_scans_the_content_root_only() {
        let mut doc = parse("<header>61000</header><main>62000</main>");
        let main = find(&doc, "main");
        let mut trigger = trigger();

        let report = trigger.start(&mut doc, main);
        assert_eq!(report.links_created, 1);
        assert_eq!(trigger.content_root(), Some(main));
        assert_eq!(doc.children(find(&doc, "header")).len(), 1);
    }

    #[test]
    fn own_rewrites_do_not_trigger_another_scan() {
        let mut doc = parse("<main>61000</main>");
        let main = find(&doc, "main");
        let mut trigger = trigger();
        trigger.start(&mut doc, main);
        assert!(!doc.pending_records().is_empty());

        let report = trigger.on_mutations(&mut doc);
        assert_eq!(report, ScanReport::default());
    }

    #[test]
    fn scans_an_inserted_subtree_once() {
        let mut doc = parse("<main></main>");
        let main = find(&doc, "main");
        let mut trigger = trigger();
        trigger.start(&mut doc, main);

        let section = doc.create_element(Element::new("section"));
        doc.append_child(main, section).unwrap();
        let p = doc.create_element(Element::new("p"));
        doc.append_child(section, p).unwrap();
        let text = doc.create_text("invoice 63000");
        doc.append_child(p, text).unwrap();

        let report = trigger.on_mutations(&mut doc);
        assert_eq!(report.nodes_visited, 1);
        assert_eq!(report.links_created, 1);
        assert_eq!(report.stale, 0);
    }

    #[test]
    fn character_data_changes_are_rescanned() {
        let mut doc = parse("<main><p>nothing yet</p></main>");
        let main = find(&doc, "main");
        let mut trigger = trigger();
        trigger.start(&mut doc, main);

        let text = doc.children(find(&doc, "p"))[0];
        doc.set_text(text, "now 64000");
        assert_eq!(trigger.on_mutations(&mut doc).links_created, 1);
    }

    #[test]
    fn ignores_removed_and_out_of_root_nodes() {
        let mut doc = parse("<header></header><main></main>");
        let main = find(&doc, "main");
        let header = find(&doc, "header");
        let mut trigger = trigger();
        trigger.start(&mut doc, main);

        let outside = doc.create_text("61000");
        doc.append_child(header, outside).unwrap();
        let gone = doc.create_text("62000");
        doc.append_child(main, gone).unwrap();
        doc.remove(gone);

        assert_eq!(trigger.on_mutations(&mut doc), ScanReport::default());
    }

    #[test]
    fn nested_roots_collapse_to_the_outermost() {
        let mut doc = parse("<main></main>");
        let main = find(&doc, "main");
        let outer = doc.create_element(Element::new("div"));
        let inner = doc.create_text("61000");
        doc.append_child(main, outer).unwrap();
        doc.append_child(outer, inner).unwrap();

        let records = doc.take_records();
        assert_eq!(scan_roots(&doc, &records, doc.root()), vec![outer]);
    }

    #[test]
    fn large_batches_keep_one_root_per_inserted_paragraph() {
        let mut doc = parse("<main></main>");
        let main = find(&doc, "main");
        let mut trigger = trigger();
        trigger.start(&mut doc, main);

        let mut paragraphs = Vec::new();
        for i in 0..5000 {
            let p = doc.create_element(Element::new("p"));
            doc.append_child(main, p).unwrap();
            let text = doc.create_text(format!("invoice {}", 61000 + i % 1000));
            doc.append_child(p, text).unwrap();
            paragraphs.push(p);
        }

        let records = doc.pending_records().to_vec();
        assert_eq!(scan_roots(&doc, &records, main), paragraphs);

        let report = trigger.on_mutations(&mut doc);
        assert_eq!(report.nodes_visited, 5000);
        assert_eq!(report.links_created, 5000);
    }

    #[test]
    fn added_ancestors_outside_the_content_root_do_not_hide_inner_nodes() {
        let mut doc = parse("<div></div>");
        let div = find(&doc, "div");
        let outer = doc.create_element(Element::new("section"));
        let content = doc.create_element(Element::new("article"));
        doc.append_child(outer, content).unwrap();
        doc.take_records();

        doc.append_child(div, outer).unwrap();
        let inner = doc.create_text("61000");
        doc.append_child(content, inner).unwrap();

        let records = doc.take_records();
        assert_eq!(scan_roots(&doc, &records, content), vec![inner]);
    }
}
