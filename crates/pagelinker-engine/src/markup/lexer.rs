//! # Markup Lexer
//!
//! First stage of reading HTML: a [Logos] tokenizer that splits the source
//! into tags, comments, doctype declarations and text runs.
//!
//! [Logos]: https://docs.rs/logos
//!
//! Like every other byte-preserving lexer, it never drops input: anything
//! Logos cannot classify (a stray `<`, a malformed tag) comes back as
//! [`TokenKind::Text`]. Raw-text elements (`<script>`, `<style>`, …) are not
//! handled here because their end depends on which tag opened them; the tree
//! builder uses [`Lexer::take_raw_text`] for that.

use logos::Logos;

/// Token kinds produced by the Logos lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<!-- ... -->`, or everything to end of input when unterminated.
    #[token("<!--", lex_comment)]
    Comment,

    /// `<!DOCTYPE ...>`
    #[regex(r"<![dD][oO][cC][tT][yY][pP][eE][^>]*>")]
    Doctype,

    /// `</name>`
    #[regex(r"</[A-Za-z][A-Za-z0-9:_-]*[ \t\r\n]*>")]
    EndTag,

    /// `<name attr="v" attr='v' attr=v attr>` with an optional `/` before `>`.
    #[regex(
        r#"<[A-Za-z][A-Za-z0-9:_-]*([ \t\r\n]+[^ \t\r\n"'>/=]+([ \t\r\n]*=[ \t\r\n]*("[^"]*"|'[^']*'|[^ \t\r\n"'=<>`]+))?)*[ \t\r\n]*/?>"#
    )]
    StartTag,

    /// Character data up to the next `<`.
    #[regex(r"[^<]+")]
    Text,
}

fn lex_comment(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let rest = lex.remainder();
    let len = rest.find("-->").map_or(rest.len(), |i| i + 3);
    lex.bump(len);
    true
}

/// A lexed token with its kind and source slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Streaming wrapper around the Logos lexer that can also hand out raw text.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
        }
    }

    /// Consumes everything up to (not including) the first case-insensitive
    /// `</name`, or to end of input, and returns it.
    pub fn take_raw_text(&mut self, name: &str) -> &'a str {
        let rest = self.inner.remainder();
        let needle = format!("</{}", name.to_ascii_lowercase());
        let end = rest
            .char_indices()
            .filter(|&(_, c)| c == '<')
            .map(|(i, _)| i)
            .find(|&i| {
                rest.get(i..i + needle.len())
                    .is_some_and(|s| s.eq_ignore_ascii_case(&needle))
            })
            .unwrap_or(rest.len());
        self.inner.bump(end);
        &rest[..end]
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let result = self.inner.next()?;
        let text = self.inner.slice();
        // Logos error means unrecognised markup - treat as text
        let kind = result.unwrap_or(TokenKind::Text);
        Some(Token { kind, text })
    }
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}
