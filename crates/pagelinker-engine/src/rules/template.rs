use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown placeholder `{{{0}}}` (expected `{{value}}` or `{{match}}`)")]
    UnknownPlaceholder(String),
    #[error("unbalanced `{brace}` at byte {at}")]
    UnbalancedBrace { brace: char, at: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    /// The rule's captured value.
    Value,
    /// The full matched text, including any prefix.
    Match,
}

/// A string with `{value}` / `{match}` placeholders, parsed once up front so
/// that expansion during a scan cannot fail.
///
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((at, c)) = chars.next() {
            match c {
                '{' if chars.peek().is_some_and(|&(_, n)| n == '{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().is_some_and(|&(_, n)| n == '}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let rest = &source[at + 1..];
                    let Some(close) = rest.find('}') else {
                        return Err(TemplateError::UnbalancedBrace { brace: '{', at });
                    };
                    let name = &rest[..close];
                    let piece = match name.trim() {
                        "value" => Piece::Value,
                        "match" => Piece::Match,
                        other => return Err(TemplateError::UnknownPlaceholder(other.to_string())),
                    };
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(piece);
                    // Skip the placeholder body and its closing brace.
                    for _ in 0..name.chars().count() + 1 {
                        chars.next();
                    }
                }
                '}' => return Err(TemplateError::UnbalancedBrace { brace: '}', at }),
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            pieces,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Fills in the placeholders. With `encode_value`, `{value}` is
    /// percent-encoded, which is what URL templates want.
    pub fn expand(&self, value: &str, full: &str, encode_value: bool) -> String {
        let mut out = String::with_capacity(self.source.len() + full.len());
        for piece in &self.pieces {
            match piece {
                Piece::Literal(s) => out.push_str(s),
                Piece::Value if encode_value => out.push_str(&urlencoding::encode(value)),
                Piece::Value => out.push_str(value),
                Piece::Match => out.push_str(full),
            }
        }
        out
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com/orders/{value}", "https://example.com/orders/265000")]
    #[case("post.php?post={value}&action=edit", "post.php?post=265000&action=edit")]
    #[case("Order {match} ({value})", "Order #265000 (265000)")]
    #[case("{{literal}} {value}", "{literal} 265000")]
    #[case("no placeholders", "no placeholders")]
    fn expands_placeholders(#[case] source: &str, #[case] expected: &str) {
        let template = Template::parse(source).unwrap();
        assert_eq!(template.expand("265000", "#265000", false), expected);
    }

    #[test]
    fn value_is_percent_encoded_on_request() {
        let template = Template::parse("/find?q={value}").unwrap();
        assert_eq!(template.expand("a b&c", "a b&c", true), "/find?q=a%20b%26c");
        assert_eq!(template.expand("a b&c", "a b&c", false), "/find?q=a b&c");
    }

    #[test]
    fn unknown_placeholder_is_rejected() {
        assert_eq!(
            Template::parse("/x/{id}"),
            Err(TemplateError::UnknownPlaceholder("id".into()))
        );
    }

    #[rstest]
    #[case("/x/{value", '{', 3)]
    #[case("/x/value}", '}', 8)]
    fn unbalanced_braces_are_rejected(#[case] source: &str, #[case] brace: char, #[case] at: usize) {
        assert_eq!(
            Template::parse(source),
            Err(TemplateError::UnbalancedBrace { brace, at })
        );
    }

    #[test]
    fn display_shows_source() {
        let template: Template = "Track {value}".parse().unwrap();
        assert_eq!(template.to_string(), "Track {value}");
        assert_eq!(template.source(), "Track {value}");
    }
}
