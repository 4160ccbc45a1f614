//! Defines the `Token` and `TokenKind` enums.
//!
//! These are the intermediate representation between the `Tokenizer`
//! (lexer) and the `Parser`. Tokens are produced once, consumed once,
//! and discarded; they never escape the crate.

use crate::value::CsonhNumber;
use std::borrow::Cow;

/// The payload of a STRING token.
#[derive(Debug, PartialEq, Clone)]
pub(crate) enum StringToken<'a> {
    /// A single- or double-quoted, single-line string. Escape sequences
    /// are already decoded; escape-free strings borrow from the source.
    Inline(Cow<'a, str>),
    /// A triple-quoted string. The interior is kept raw: the closing
    /// delimiter's indentation decides how much to dedent, so decoding
    /// is deferred to the parser.
    Block { quote: char, raw: &'a str },
}

/// The specific type of a `Token`.
///
/// `Indent` and `Dedent` are synthetic: they mark changes in leading
/// indentation rather than any literal character in the source.
#[derive(Debug, PartialEq, Clone)]
pub(crate) enum TokenKind<'a> {
    /// A step up in leading indentation.
    Indent,
    /// A step down in leading indentation.
    Dedent,
    /// `\n`
    Newline,
    /// A string literal, e.g. `'hello'` or `'''…'''`.
    String(StringToken<'a>),
    /// A number literal, e.g. `8080`, `-0.5`, `0xFF`.
    Number(CsonhNumber),
    /// `true`/`yes`/`on` or `false`/`no`/`off`.
    Boolean(bool),
    /// The `null` literal.
    Null,
    /// An unquoted name, e.g. a key like `server`.
    Identifier(&'a str),
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// End of input, emitted exactly once after all dedents.
    Eof,
}

impl TokenKind<'_> {
    /// Short description used in diagnostics, e.g. "Expected key, got '}'".
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            TokenKind::Indent => "indent",
            TokenKind::Dedent => "dedent",
            TokenKind::Newline => "newline",
            TokenKind::String(_) => "string",
            TokenKind::Number(_) => "number",
            TokenKind::Boolean(_) => "boolean",
            TokenKind::Null => "'null'",
            TokenKind::Identifier(_) => "identifier",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Eof => "end of input",
        }
    }
}

/// A single token produced by the `Tokenizer`.
///
/// It records the token's start location (1-indexed line and column) in
/// the normalized source, which is what error reporting points at.
#[derive(Debug, PartialEq, Clone)]
pub(crate) struct Token<'a> {
    pub(crate) kind: TokenKind<'a>,
    pub(crate) line: usize,
    pub(crate) column: usize,
}

impl<'a> Token<'a> {
    pub(crate) fn new(kind: TokenKind<'a>, line: usize, column: usize) -> Self {
        Token { kind, line, column }
    }
}
