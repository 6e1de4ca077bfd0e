use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use super::template::{Template, TemplateError};

/// Inputs every pattern is tried against before a rule is accepted. A match
/// of zero length on any of them means the pattern can match nothing, which
/// would never make progress through a text node.
const EMPTY_MATCH_PROBES: &[&str] = &["", " ", "a", "A", "0", "-", "a 0", "0 a"];

/// Stands in for "no character" on either side of the scanned text. It is
/// neither a digit nor a word character, so it satisfies every boundary.
pub(crate) const EDGE: char = '\0';

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("rule id must not be empty")]
    EmptyId,
    #[error("rule `{id}`: invalid pattern: {source}")]
    InvalidPattern { id: String, source: regex::Error },
    #[error("rule `{id}`: pattern can match the empty string")]
    EmptyMatch { id: String },
    #[error("rule `{id}`: capture group {group} does not exist (pattern has {available})")]
    MissingCaptureGroup {
        id: String,
        group: usize,
        available: usize,
    },
    #[error("rule `{id}`: no URL template or function")]
    MissingUrl { id: String },
    #[error("rule `{id}`: {source}")]
    Template { id: String, source: TemplateError },
    #[error("duplicate rule id `{0}`")]
    DuplicateId(String),
}

/// What must surround a match for it to count.
///
/// `Digit` rejects a match with a digit immediately before or after it, so a
/// rule for five-digit numbers never fires inside `161000`. `Word` does the
/// same for letters, digits and `_`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Boundary {
    None,
    #[default]
    Digit,
    Word,
}

impl Boundary {
    /// Class matching one character that is allowed next to a match.
    fn guard(self) -> Option<&'static str> {
        match self {
            Boundary::None => None,
            Boundary::Digit => Some("[^0-9]"),
            Boundary::Word => Some("[^0-9A-Za-z_]"),
        }
    }
}

pub type TextFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Produces an href or a title from a match.
#[derive(Clone)]
pub enum TextSource {
    Template(Template),
    /// Called with the captured value.
    Fn(TextFn),
}

impl fmt::Debug for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSource::Template(t) => f.debug_tuple("Template").field(&t.source()).finish(),
            TextSource::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}

impl TextSource {
    fn render(&self, value: &str, full: &str, is_url: bool) -> String {
        match self {
            TextSource::Template(t) => t.expand(value, full, is_url),
            TextSource::Fn(f) => f(value),
        }
    }
}

/// Extra attributes put on every link a rule creates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkAttrs {
    pub target: Option<String>,
    pub style: Option<String>,
    pub rel: Option<String>,
}

impl LinkAttrs {
    /// Fills unset attributes from `defaults`.
    pub fn or(mut self, defaults: &LinkAttrs) -> Self {
        self.target = self.target.or_else(|| defaults.target.clone());
        self.style = self.style.or_else(|| defaults.style.clone());
        self.rel = self.rel.or_else(|| defaults.rel.clone());
        self
    }
}

/// A validated rule: a pattern, the group holding the interesting value, and
/// how to turn that value into a link.
///
/// Patterns should not rely on `^` or `$`: the text handed to the matcher is
/// padded on both sides with the neighbouring characters.
///
/// `\d` and `\w` are Unicode-aware in `regex`, so `\d` also matches digits
/// such as `٦`. Boundaries only treat ASCII `0-9` (and `A-Za-z_` for
/// [`Boundary::Word`]) as part of a token. Write `[0-9]` for ASCII-only
/// numbers, or turn Unicode off with `(?-u:\d)`.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub(crate) id: String,
    pub(crate) pattern: String,
    pub(crate) matcher: Regex,
    pub(crate) capture_group: usize,
    pub(crate) boundary: Boundary,
    pub(crate) url: TextSource,
    pub(crate) label: Option<TextSource>,
    pub(crate) link: LinkAttrs,
}

impl PatternRule {
    pub fn builder(id: impl Into<String>, pattern: impl Into<String>) -> PatternRuleBuilder {
        PatternRuleBuilder {
            id: id.into(),
            pattern: pattern.into(),
            capture_group: 0,
            boundary: Boundary::default(),
            case_insensitive: false,
            url: None,
            label: None,
            link: LinkAttrs::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The pattern as written, before boundary guards were added.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn capture_group(&self) -> usize {
        self.capture_group
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn link_attrs(&self) -> &LinkAttrs {
        &self.link
    }

    pub fn href(&self, value: &str, full: &str) -> String {
        self.url.render(value, full, true)
    }

    pub fn title(&self, value: &str, full: &str) -> Option<String> {
        self.label.as_ref().map(|l| l.render(value, full, false))
    }

    /// Returns a copy with unset link attributes taken from `defaults`.
    pub fn with_default_link_attrs(mut self, defaults: &LinkAttrs) -> Self {
        self.link = self.link.or(defaults);
        self
    }
}

enum PendingText {
    Template(String),
    Fn(TextFn),
}

impl PendingText {
    fn resolve(self, id: &str) -> Result<TextSource, RuleError> {
        match self {
            PendingText::Fn(f) => Ok(TextSource::Fn(f)),
            PendingText::Template(s) => Template::parse(&s)
                .map(TextSource::Template)
                .map_err(|source| RuleError::Template {
                    id: id.to_string(),
                    source,
                }),
        }
    }
}

/// Collects rule settings; nothing is checked until [`build`](Self::build).
#[must_use]
pub struct PatternRuleBuilder {
    id: String,
    pattern: String,
    capture_group: usize,
    boundary: Boundary,
    case_insensitive: bool,
    url: Option<PendingText>,
    label: Option<PendingText>,
    link: LinkAttrs,
}

impl PatternRuleBuilder {
    /// Group whose text becomes `{value}`. `0` is the whole match.
    pub fn capture_group(mut self, group: usize) -> Self {
        self.capture_group = group;
        self
    }

    pub fn boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    pub fn url_template(mut self, template: impl Into<String>) -> Self {
        self.url = Some(PendingText::Template(template.into()));
        self
    }

    pub fn url_fn(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.url = Some(PendingText::Fn(Arc::new(f)));
        self
    }

    pub fn label_template(mut self, template: impl Into<String>) -> Self {
        self.label = Some(PendingText::Template(template.into()));
        self
    }

    pub fn label_fn(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.label = Some(PendingText::Fn(Arc::new(f)));
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.link.target = Some(target.into());
        self
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.link.style = Some(style.into());
        self
    }

    pub fn rel(mut self, rel: impl Into<String>) -> Self {
        self.link.rel = Some(rel.into());
        self
    }

    pub fn build(self) -> Result<PatternRule, RuleError> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(RuleError::EmptyId);
        }

        let raw = RegexBuilder::new(&self.pattern)
            .case_insensitive(self.case_insensitive)
            .build()
            .map_err(|source| RuleError::InvalidPattern {
                id: id.clone(),
                source,
            })?;

        if EMPTY_MATCH_PROBES
            .iter()
            .any(|probe| raw.find_iter(probe).any(|m| m.is_empty()))
        {
            return Err(RuleError::EmptyMatch { id });
        }

        let available = raw.captures_len() - 1;
        if self.capture_group > available {
            return Err(RuleError::MissingCaptureGroup {
                id,
                group: self.capture_group,
                available,
            });
        }

        let url = self
            .url
            .ok_or_else(|| RuleError::MissingUrl { id: id.clone() })?
            .resolve(&id)?;
        let label = self.label.map(|l| l.resolve(&id)).transpose()?;

        let flags = if self.case_insensitive { "(?i)" } else { "" };
        let wrapped = match self.boundary.guard() {
            Some(guard) => format!("{guard}({flags}{}){guard}", self.pattern),
            None => format!("({flags}{})", self.pattern),
        };
        let matcher = Regex::new(&wrapped).map_err(|source| RuleError::InvalidPattern {
            id: id.clone(),
            source,
        })?;

        Ok(PatternRule {
            id,
            pattern: self.pattern,
            matcher,
            capture_group: self.capture_group,
            boundary: self.boundary,
            url,
            label,
            link: self.link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rule(pattern: &str) -> PatternRuleBuilder {
        PatternRule::builder("r", pattern).url_template("/x/{value}")
    }

    #[test]
    fn builds_a_valid_rule() {
        let rule = rule(r"(#)?(2[0-6]\d{4})")
            .capture_group(2)
            .label_template("Order {value}")
            .target("_blank")
            .build()
            .unwrap();
        assert_eq!(rule.id(), "r");
        assert_eq!(rule.capture_group(), 2);
        assert_eq!(rule.boundary(), Boundary::Digit);
        assert_eq!(rule.href("265000", "#265000"), "/x/265000");
        assert_eq!(rule.title("265000", "#265000").as_deref(), Some("Order 265000"));
        assert_eq!(rule.link_attrs().target.as_deref(), Some("_blank"));
    }

    #[test]
    fn empty_id_is_rejected() {
        assert!(matches!(
            PatternRule::builder("  ", "x").url_template("/").build(),
            Err(RuleError::EmptyId)
        ));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        assert!(matches!(
            rule("(unclosed").build(),
            Err(RuleError::InvalidPattern { .. })
        ));
    }

    #[rstest]
    #[case("a*")]
    #[case(r"\b")]
    #[case(r"\d*")]
    #[case("(x)?")]
    #[case("x|")]
    fn patterns_matching_nothing_are_rejected(#[case] pattern: &str) {
        assert!(matches!(
            rule(pattern).build(),
            Err(RuleError::EmptyMatch { .. })
        ));
    }

    #[test]
    fn capture_group_must_exist() {
        let err = rule(r"(\d+)").capture_group(2).build().unwrap_err();
        assert!(matches!(
            err,
            RuleError::MissingCaptureGroup {
                group: 2,
                available: 1,
                ..
            }
        ));
    }

    #[test]
    fn url_is_required() {
        assert!(matches!(
            PatternRule::builder("r", r"\d+").build(),
            Err(RuleError::MissingUrl { .. })
        ));
    }

    #[test]
    fn bad_templates_are_reported_with_the_rule_id() {
        let err = rule(r"\d+").label_template("{nope}").build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "rule `r`: unknown placeholder `{nope}` (expected `{value}` or `{match}`)"
        );
    }

    #[test]
    fn url_fn_receives_the_captured_value() {
        let rule = PatternRule::builder("r", r"\d+")
            .url_fn(|v| format!("app://{}", v.len()))
            .build()
            .unwrap();
        assert_eq!(rule.href("12345", "12345"), "app://5");
        assert_eq!(rule.title("12345", "12345"), None);
    }

    #[test]
    fn default_link_attrs_fill_only_gaps() {
        let defaults = LinkAttrs {
            target: Some("_blank".into()),
            style: Some("color: red".into()),
            rel: None,
        };
        let rule = rule(r"\d+")
            .style("color: blue")
            .build()
            .unwrap()
            .with_default_link_attrs(&defaults);
        assert_eq!(rule.link_attrs().target.as_deref(), Some("_blank"));
        assert_eq!(rule.link_attrs().style.as_deref(), Some("color: blue"));
    }
}
