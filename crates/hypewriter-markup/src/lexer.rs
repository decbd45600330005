//! # Lexer - Tokenizing Chapter HTML
//!
//! Chapter content is stored as a flat sequence of HTML block elements.
//! The lexer splits it into tags, comments and text runs with [Logos].
//!
//! [Logos]: https://docs.rs/logos
//!
//! Like any lossless lexer, every byte of the input ends up in exactly one
//! token:
//!
//! ```
//! use hypewriter_markup::lexer::lex;
//!
//! let input = r#"<p style="margin-left: 2em">Hi &amp; bye</p><hr>"#;
//! let reconstructed: String = lex(input).iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! A `<` that does not open a tag (for example in `a < b`) is not an
//! error: it comes out as text.

use logos::{Lexer, Logos};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<name attr="value">`, including self-closing `<hr/>`
    #[regex(r#"<[a-zA-Z][a-zA-Z0-9]*([^>"']|"[^"]*"|'[^']*')*>"#)]
    StartTag,

    /// `</name>`
    #[regex(r"</[a-zA-Z][a-zA-Z0-9]*[ \t\r\n]*>")]
    EndTag,

    /// `<!-- ... -->`, running to the end of input when unterminated
    #[token("<!--", comment)]
    Comment,

    /// Anything up to the next `<`
    #[regex(r"[^<]+")]
    Text,
}

fn comment(lex: &mut Lexer<TokenKind>) -> bool {
    let rest = lex.remainder();
    let len = rest.find("-->").map_or(rest.len(), |end| end + 3);
    lex.bump(len);
    true
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let text = lexer.slice();
        // Unmatched input (a stray `<`) is text.
        let kind = result.unwrap_or(TokenKind::Text);
        tokens.push(Token { kind, text });
    }

    tokens
}
