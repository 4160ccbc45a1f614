//! Contains the recursive-descent `Parser`.
//!
//! The parser consumes the token vector and produces one `CsonhValue`
//! tree. Two grammars share the literal and key rules: the *indented*
//! grammar, where nesting is driven by `Indent`/`Dedent` tokens, and the
//! *bracketed* grammar for `{…}` and `[…]` literals, where indentation
//! is purely cosmetic and any stray `Indent`/`Dedent` tokens are
//! silently discarded.

use crate::error::CsonhError;
use crate::strings;
use crate::token::{StringToken, Token, TokenKind};
use crate::value::CsonhValue;
use indexmap::IndexMap;

/// The recursive-descent parser.
pub(crate) struct Parser<'a> {
    /// The token vector; always terminated by an `Eof` token.
    tokens: Vec<Token<'a>>,
    /// Index of the next token to consume.
    pos: usize,
    /// Maximum nesting depth, to keep recursion bounded on hostile input.
    max_depth: usize,
    /// Current nesting depth.
    depth: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: Vec<Token<'a>>, max_depth: usize) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|token| &token.kind),
            Some(TokenKind::Eof)
        ));
        Parser {
            tokens,
            pos: 0,
            max_depth,
            depth: 0,
        }
    }

    /// The token under the cursor; sticks at `Eof` once past the end.
    fn current(&self) -> &Token<'a> {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> &TokenKind<'a> {
        &self.current().kind
    }

    fn peek_kind(&self, offset: usize) -> &TokenKind<'a> {
        let pos = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[pos].kind
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Creates a parse error at the current token.
    fn error(&self, message: impl Into<String>) -> CsonhError {
        let token = self.current();
        CsonhError::parse(message, token.line, token.column)
    }

    fn skip_newlines(&mut self) {
        while matches!(self.kind(), TokenKind::Newline) {
            self.advance();
        }
    }

    /// Skips newlines plus any stray indentation tokens. Only used inside
    /// brackets, where indentation carries no meaning.
    fn skip_layout(&mut self) {
        while matches!(
            self.kind(),
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent
        ) {
            self.advance();
        }
    }

    fn skip_indentation(&mut self) {
        while matches!(self.kind(), TokenKind::Indent | TokenKind::Dedent) {
            self.advance();
        }
    }

    fn expect_colon(&mut self) -> Result<(), CsonhError> {
        if matches!(self.kind(), TokenKind::Colon) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("Expected ':', got {}", self.kind().describe())))
        }
    }

    fn check_depth(&self) -> Result<(), CsonhError> {
        if self.depth >= self.max_depth {
            Err(self.error("Maximum nesting depth exceeded"))
        } else {
            Ok(())
        }
    }

    /// Turns a string token payload into its final text. Triple-quoted
    /// interiors are dedented and decoded here, once the parser owns them.
    fn string_text(payload: StringToken<'a>) -> String {
        match payload {
            StringToken::Inline(text) => text.into_owned(),
            StringToken::Block { raw, .. } => strings::decode_block(raw),
        }
    }

    /// Parses an object key: an identifier or any string form.
    fn parse_key(&mut self) -> Result<String, CsonhError> {
        match self.kind() {
            TokenKind::String(payload) => {
                let payload = payload.clone();
                self.advance();
                Ok(Self::string_text(payload))
            }
            TokenKind::Identifier(name) => {
                let name = (*name).to_string();
                self.advance();
                Ok(name)
            }
            other => Err(self.error(format!("Expected key, got {}", other.describe()))),
        }
    }

    /// Parses a literal or bracketed value. Bare identifiers are not
    /// values: anything unquoted that is not a keyword is rejected.
    fn parse_value(&mut self) -> Result<CsonhValue, CsonhError> {
        match self.kind() {
            TokenKind::String(payload) => {
                let payload = payload.clone();
                self.advance();
                Ok(CsonhValue::String(Self::string_text(payload)))
            }
            TokenKind::Number(number) => {
                let number = *number;
                self.advance();
                Ok(CsonhValue::Number(number))
            }
            TokenKind::Boolean(value) => {
                let value = *value;
                self.advance();
                Ok(CsonhValue::Boolean(value))
            }
            TokenKind::Null => {
                self.advance();
                Ok(CsonhValue::Null)
            }
            TokenKind::LeftBrace => self.parse_braced_object(),
            TokenKind::LeftBracket => self.parse_bracketed_array(),
            TokenKind::Identifier(name) => {
                Err(self.error(format!("Bareword '{name}' rejected as value")))
            }
            other => Err(self.error(format!("Expected value, got {}", other.describe()))),
        }
    }

    /// Parses the value after a `key:`. An `Indent` here means the value
    /// is a nested indented object on the following lines.
    fn parse_value_after_colon(&mut self) -> Result<CsonhValue, CsonhError> {
        match self.kind() {
            TokenKind::Indent => self.parse_indented_object(),
            TokenKind::LeftBrace => self.parse_braced_object(),
            TokenKind::LeftBracket => self.parse_bracketed_array(),
            _ => self.parse_value(),
        }
    }

    /// Parses an indented object: the `Indent` is under the cursor, and
    /// the body runs until the matching `Dedent` (or end of input).
    fn parse_indented_object(&mut self) -> Result<CsonhValue, CsonhError> {
        self.check_depth()?;
        self.depth += 1;
        self.advance(); // the Indent that brought us here
        self.skip_newlines();

        let mut object = IndexMap::new();
        while !matches!(self.kind(), TokenKind::Dedent | TokenKind::Eof) {
            let key = self.parse_key()?;
            self.expect_colon()?;
            self.skip_newlines();
            let value = self.parse_value_after_colon()?;
            object.insert(key, value);
            self.skip_newlines();
        }
        if matches!(self.kind(), TokenKind::Dedent) {
            self.advance();
        }
        self.depth -= 1;
        Ok(CsonhValue::Object(object))
    }

    /// Parses a `{…}` object. Entries are separated by one comma or a
    /// newline run; a trailing comma is allowed.
    fn parse_braced_object(&mut self) -> Result<CsonhValue, CsonhError> {
        self.check_depth()?;
        self.depth += 1;
        self.advance(); // '{'

        let mut object = IndexMap::new();
        loop {
            self.skip_layout();
            match self.kind() {
                TokenKind::RightBrace => break,
                TokenKind::Eof => return Err(self.error("Unclosed object")),
                _ => {}
            }

            let key = self.parse_key()?;
            self.expect_colon()?;
            self.skip_newlines();
            let value = self.parse_value_after_colon()?;
            object.insert(key, value);

            self.skip_indentation();
            match self.kind() {
                TokenKind::Comma => self.advance(),
                TokenKind::Newline | TokenKind::RightBrace | TokenKind::Eof => {}
                _ => {
                    return Err(
                        self.error("Expected comma or newline between object entries")
                    );
                }
            }
        }
        self.advance(); // '}'
        self.depth -= 1;
        Ok(CsonhValue::Object(object))
    }

    /// Parses a `[…]` array with the same separator rules as braced
    /// objects. Items are values; bare indented-object syntax is not
    /// available inside brackets.
    fn parse_bracketed_array(&mut self) -> Result<CsonhValue, CsonhError> {
        self.check_depth()?;
        self.depth += 1;
        self.advance(); // '['

        let mut items = Vec::new();
        loop {
            self.skip_layout();
            match self.kind() {
                TokenKind::RightBracket => break,
                TokenKind::Eof => return Err(self.error("Unclosed array")),
                _ => {}
            }

            items.push(self.parse_value()?);

            self.skip_indentation();
            match self.kind() {
                TokenKind::Comma => self.advance(),
                TokenKind::Newline | TokenKind::RightBracket | TokenKind::Eof => {}
                _ => {
                    return Err(
                        self.error("Expected comma or newline between array elements")
                    );
                }
            }
        }
        self.advance(); // ']'
        self.depth -= 1;
        Ok(CsonhValue::Array(items))
    }

    /// True if the cursor sits on a `key:` pair, the only shape a root
    /// document line may take outside brackets.
    fn at_object_entry(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::String(_) | TokenKind::Identifier(_)
        ) && matches!(self.peek_kind(1), TokenKind::Colon)
    }

    /// Parses one whole document.
    ///
    /// The root must be an object or an array; empty and comment-only
    /// documents yield an empty object. After the root value, only
    /// newlines may remain (the top-level seal).
    pub(crate) fn parse(mut self) -> Result<CsonhValue, CsonhError> {
        self.skip_newlines();

        match self.kind() {
            TokenKind::Eof => return Ok(CsonhValue::Object(IndexMap::new())),
            TokenKind::LeftBracket => {
                let root = self.parse_bracketed_array()?;
                self.skip_newlines();
                if !matches!(self.kind(), TokenKind::Eof) {
                    return Err(self.error("Trailing junk after top-level array"));
                }
                return Ok(root);
            }
            TokenKind::LeftBrace => {
                let root = self.parse_braced_object()?;
                self.skip_newlines();
                if !matches!(self.kind(), TokenKind::Eof) {
                    return Err(self.error("Trailing junk after top-level object"));
                }
                return Ok(root);
            }
            _ => {}
        }

        if !self.at_object_entry() {
            return Err(self.error("Root must be object or array"));
        }

        let mut object = IndexMap::new();
        while self.at_object_entry() {
            let key = self.parse_key()?;
            self.expect_colon()?;
            self.skip_newlines();
            let value = self.parse_value_after_colon()?;
            object.insert(key, value);
            self.skip_newlines();
        }
        if !matches!(self.kind(), TokenKind::Eof) {
            return Err(self.error("Unexpected content at top level"));
        }
        Ok(CsonhValue::Object(object))
    }
}
