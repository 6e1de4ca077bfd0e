use super::matches::Match;
use crate::dom::{Document, Element, NodeId};
use crate::rules::{LinkAttrs, RuleSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRun {
    pub rule_id: String,
    /// Visible text: the full match.
    pub text: String,
    pub href: String,
    pub title: Option<String>,
    pub attrs: LinkAttrs,
}

impl LinkRun {
    fn to_element(&self) -> Element {
        let mut el = Element::new("a").with_attr("href", self.href.as_str());
        if let Some(title) = &self.title {
            el.set_attr("title", title.as_str());
        }
        if let Some(target) = &self.attrs.target {
            el.set_attr("target", target.as_str());
        }
        if let Some(rel) = &self.attrs.rel {
            el.set_attr("rel", rel.as_str());
        }
        if let Some(style) = &self.attrs.style {
            el.set_attr("style", style.as_str());
        }
        el
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run {
    Text(String),
    Link(LinkRun),
}

impl Run {
    pub fn text(&self) -> &str {
        match self {
            Run::Text(t) => t,
            Run::Link(link) => &link.text,
        }
    }
}

/// A text node's content cut into plain and linked runs. Concatenating the
/// runs' text gives back the original string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatedFragment {
    runs: Vec<Run>,
}

impl AnnotatedFragment {
    /// `matches` must be sorted and non-overlapping, as returned by
    /// [`find_matches`](super::matches::find_matches).
    pub fn build(text: &str, matches: &[Match], rules: &RuleSet) -> Self {
        let mut runs = Vec::with_capacity(matches.len() * 2 + 1);
        let mut pos = 0;

        for m in matches {
            if pos < m.span.start {
                runs.push(Run::Text(text[pos..m.span.start].to_string()));
            }
            let rule = rules.by_index(m.rule);
            runs.push(Run::Link(LinkRun {
                rule_id: rule.id().to_string(),
                text: m.full_text.clone(),
                href: rule.href(&m.captured, &m.full_text),
                title: rule.title(&m.captured, &m.full_text),
                attrs: rule.link_attrs().clone(),
            }));
            pos = m.span.end;
        }
        if pos < text.len() {
            runs.push(Run::Text(text[pos..].to_string()));
        }

        Self { runs }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn links(&self) -> impl Iterator<Item = &LinkRun> {
        self.runs.iter().filter_map(|r| match r {
            Run::Link(link) => Some(link),
            Run::Text(_) => None,
        })
    }

    pub fn link_count(&self) -> usize {
        self.links().count()
    }

    /// True when nothing in the text matched.
    pub fn is_plain(&self) -> bool {
        self.link_count() == 0
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(Run::text).collect()
    }

    /// Creates detached nodes for the runs, ready for
    /// [`Document::replace_with`].
    pub(crate) fn materialize(&self, doc: &mut Document) -> Vec<NodeId> {
        self.runs
            .iter()
            .map(|run| match run {
                Run::Text(t) => doc.create_text(t.as_str()),
                Run::Link(link) => {
                    let a = doc.create_element(link.to_element());
                    let label = doc.create_text(link.text.as_str());
                    doc.append_silently(a, label);
                    a
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::matches::{TextContext, find_matches};
    use crate::markup::render;
    use crate::rules::PatternRule;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    fn rules() -> RuleSet {
        RuleSet::new([PatternRule::builder("order", r"(#)?(2[0-6]\d{4}|270000)")
            .capture_group(2)
            .url_template("https://shop.example/post.php?post={value}&action=edit")
            .label_template("Open order {value}")
            .target("_blank")
            .build()
            .unwrap()])
        .unwrap()
    }

    fn fragment(text: &str) -> AnnotatedFragment {
        let rules = rules();
        let matches = find_matches(&rules, text, TextContext::default());
        AnnotatedFragment::build(text, &matches, &rules)
    }

    #[test]
    fn splits_text_around_links() {
        let frag = fragment("Orders #265000 and 200001.");
        let texts: Vec<_> = frag.runs().iter().map(Run::text).collect();
        assert_eq!(texts, vec!["Orders ", "#265000", " and ", "200001", "."]);
        assert_eq!(frag.link_count(), 2);
        assert_eq!(frag.text(), "Orders #265000 and 200001.");
    }

    #[test]
    fn whole_text_match_has_no_empty_runs() {
        let frag = fragment("265000");
        assert_eq!(frag.runs().len(), 1);
        assert!(matches!(&frag.runs()[0], Run::Link(l) if l.text == "265000"));
    }

    #[test]
    fn no_matches_is_a_single_plain_run() {
        let frag = fragment("nothing here");
        assert!(frag.is_plain());
        assert_eq!(frag.runs(), &[Run::Text("nothing here".into())]);
    }

    #[test]
    fn materialized_links_carry_rule_attributes() {
        let frag = fragment("see #265000");
        let mut doc = Document::new();
        let p = doc.create_element(Element::new("p"));
        for node in frag.materialize(&mut doc) {
            doc.append_silently(p, node);
        }
        assert_snapshot!(render(&doc, p), @r#"<p>see <a href="https://shop.example/post.php?post=265000&amp;action=edit" title="Open order 265000" target="_blank">#265000</a></p>"#);
    }
}
