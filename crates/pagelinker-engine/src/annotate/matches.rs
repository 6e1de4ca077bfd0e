use super::span::Span;
use crate::rules::rule::EDGE;
use crate::rules::{Boundary, PatternRule, RuleSet};

/// One rule hit inside a text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Index of the rule in its [`RuleSet`]; lower wins ties.
    pub rule: usize,
    pub span: Span,
    /// Text covered by `span`, which becomes the link text.
    pub full_text: String,
    /// Text of the rule's capture group, which becomes `{value}`.
    pub captured: String,
}

/// The characters just outside a text node, as the reader would see them.
/// `None` means nothing is there (start of a block, a line break, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextContext {
    pub before: Option<char>,
    pub after: Option<char>,
}

/// Every match of every rule in `text`, with overlaps resolved.
pub fn find_matches(rules: &RuleSet, text: &str, context: TextContext) -> Vec<Match> {
    let all = rules
        .iter()
        .enumerate()
        .flat_map(|(index, rule)| find_rule_matches(rule, index, text, context))
        .collect();
    resolve_overlaps(all)
}

/// Non-overlapping matches of a single rule, left to right.
///
/// For bounded rules the text is padded with the context characters and the
/// search for each match starts one character early, so the leading guard
/// can look at the character before the candidate without consuming text a
/// previous match already claimed.
pub fn find_rule_matches(
    rule: &PatternRule,
    index: usize,
    text: &str,
    context: TextContext,
) -> Vec<Match> {
    let bounded = rule.boundary != Boundary::None;
    let mut haystack = String::with_capacity(text.len() + 8);
    if bounded {
        haystack.push(context.before.unwrap_or(EDGE));
    }
    let offset = haystack.len();
    haystack.push_str(text);
    let text_end = haystack.len();
    if bounded {
        haystack.push(context.after.unwrap_or(EDGE));
    }

    let body_group = 1;
    let value_group = rule.capture_group + 1;
    let mut found = Vec::new();
    let mut allowed = offset;

    while allowed < text_end {
        let search_from = if bounded {
            previous_char_start(&haystack, allowed)
        } else {
            allowed
        };
        let Some(caps) = rule.matcher.captures_at(&haystack, search_from) else {
            break;
        };
        let Some(body) = caps.get(body_group) else {
            break;
        };
        if body.is_empty() || body.end() > text_end {
            allowed = next_char_start(&haystack, body.start().max(allowed));
            continue;
        }

        let captured = caps.get(value_group).map_or(body.as_str(), |m| m.as_str());
        found.push(Match {
            rule: index,
            span: Span::new(body.start() - offset, body.end() - offset),
            full_text: body.as_str().to_string(),
            captured: captured.to_string(),
        });
        allowed = body.end();
    }

    found
}

/// Sorts by start then rule priority and drops any match that starts inside
/// one already kept.
pub fn resolve_overlaps(mut matches: Vec<Match>) -> Vec<Match> {
    matches.sort_by_key(|m| (m.span.start, m.rule));

    let mut kept: Vec<Match> = Vec::with_capacity(matches.len());
    for m in matches {
        if kept.last().is_none_or(|prev| m.span.start >= prev.span.end) {
            kept.push(m);
        }
    }
    kept
}

fn previous_char_start(s: &str, at: usize) -> usize {
    s[..at].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_char_start(s: &str, at: usize) -> usize {
    s[at..].chars().next().map_or(s.len(), |c| at + c.len_utf8())
}
