//! # Rules
//!
//! Pattern rules decide what gets linked and where the link points.
//!
//! - **`rule`**: [`PatternRule`] and its builder. All validation (regex,
//!   empty matches, capture groups, templates) happens in `build()`, so a scan
//!   never meets a broken rule.
//! - **`template`**: `{value}` / `{match}` string templates.
//! - **`presets`**: public parcel tracker rules (UPS, USPS, FedEx).
//!
//! A [`RuleSet`] is an ordered list; earlier rules win ties when two matches
//! start at the same offset.

pub mod presets;
pub mod rule;
pub mod template;

pub use presets::{Preset, UnknownPreset};
pub use rule::{Boundary, LinkAttrs, PatternRule, PatternRuleBuilder, RuleError, TextSource};
pub use template::{Template, TemplateError};

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<PatternRule>,
}

impl RuleSet {
    pub fn new(rules: impl IntoIterator<Item = PatternRule>) -> Result<Self, RuleError> {
        let mut set = Self::default();
        for rule in rules {
            set.push(rule)?;
        }
        Ok(set)
    }

    /// Adds a rule with the lowest priority so far.
    pub fn push(&mut self, rule: PatternRule) -> Result<(), RuleError> {
        if self.get(rule.id()).is_some() {
            return Err(RuleError::DuplicateId(rule.id().to_string()));
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&PatternRule> {
        self.rules.iter().find(|r| r.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatternRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn by_index(&self, index: usize) -> &PatternRule {
        &self.rules[index]
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a PatternRule;
    type IntoIter = std::slice::Iter<'a, PatternRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str) -> PatternRule {
        PatternRule::builder(id, r"\d{5}")
            .url_template("/{value}")
            .build()
            .unwrap()
    }

    #[test]
    fn keeps_insertion_order() {
        let set = RuleSet::new([rule("b"), rule("a")]).unwrap();
        let ids: Vec<_> = set.iter().map(PatternRule::id).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = RuleSet::new([rule("a"), rule("a")]).unwrap_err();
        assert!(matches!(err, RuleError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn lookup_by_id() {
        let set = RuleSet::new(Preset::Tracking.rules()).unwrap();
        assert_eq!(set.get("usps").map(PatternRule::id), Some("usps"));
        assert!(set.get("dhl").is_none());
    }
}
