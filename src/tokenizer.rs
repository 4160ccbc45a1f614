//! The internal tokenizer (lexer).
//!
//! This module consumes the normalized source text and produces the full
//! token vector, including the synthetic `Indent`/`Dedent` tokens that
//! turn leading whitespace into punctuation the parser can consume with
//! one-token lookahead. It is *not* part of the public API.
//!
//! Scanning is byte-based with `memchr` on the hot paths (closing
//! quotes, comment terminators), falling back to `char` decoding only
//! where multi-byte text can actually appear. Columns count code points,
//! not bytes.

use crate::error::CsonhError;
use crate::token::{StringToken, Token, TokenKind};
use crate::value::CsonhNumber;
use memchr::{memchr, memmem};
use std::borrow::Cow;

/// Which character a document indents with. Fixed by the first indented
/// line and never allowed to change.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum IndentChar {
    Space,
    Tab,
}

/// Normalizes raw input for the tokenizer: strips one leading byte-order
/// mark and rewrites `\r\n` and lone `\r` to `\n`. Borrows the input
/// unchanged in the common case.
pub(crate) fn normalize(input: &str) -> Cow<'_, str> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    if memchr(b'\r', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }

    let mut normalized = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(i) = memchr(b'\r', rest.as_bytes()) {
        normalized.push_str(&rest[..i]);
        normalized.push('\n');
        rest = &rest[i + 1..];
        if rest.as_bytes().first() == Some(&b'\n') {
            rest = &rest[1..];
        }
    }
    normalized.push_str(rest);
    Cow::Owned(normalized)
}

/// The internal tokenizer.
///
/// Owns the source cursor and all indentation state. Its one public
/// operation is [`Tokenizer::tokenize`], which consumes the entire
/// source and returns the token vector or the first lexical error.
pub(crate) struct Tokenizer<'a> {
    /// The normalized source (no `\r`, no BOM).
    src: &'a str,
    /// Byte view of `src`, for `memchr` scans and ASCII peeks.
    bytes: &'a [u8],
    /// Current byte offset into `src`, always on a char boundary.
    cursor: usize,
    /// Current line (1-indexed).
    line: usize,
    /// Current column in code points (1-indexed).
    column: usize,
    /// Stack of active indentation widths; the bottom entry is always 0.
    indent_stack: Vec<usize>,
    /// Width of one indentation level, fixed by the first indent.
    indent_unit: Option<usize>,
    /// Character used for indentation, fixed by the first indent.
    indent_char: Option<IndentChar>,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer over already-normalized source text.
    pub(crate) fn new(src: &'a str) -> Self {
        Tokenizer {
            src,
            bytes: src.as_bytes(),
            cursor: 0,
            line: 1,
            column: 1,
            indent_stack: vec![0],
            indent_unit: None,
            indent_char: None,
        }
    }

    /// Creates a lexer error at the current position.
    fn error(&self, message: impl Into<String>) -> CsonhError {
        CsonhError::lexer(message, self.line, self.column)
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.cursor + offset).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.cursor..].chars().next()
    }

    /// Consumes one character, updating line and column.
    fn advance_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.cursor += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Consumes a slice known to start at the cursor, updating line and
    /// column for every character in it.
    fn advance_str(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.cursor += text.len();
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.advance_char();
        }
    }

    /// Skips to (not past) the next newline or end of input.
    fn skip_to_line_end(&mut self) {
        let src = self.src;
        let rest = &src[self.cursor..];
        let end = memchr(b'\n', rest.as_bytes()).unwrap_or(rest.len());
        self.advance_str(&rest[..end]);
    }

    /// Skips a `### … ###` block comment. The cursor sits on the first
    /// `#` of the opening run. Block comments do not nest; one whose
    /// opening run starts the line also swallows the rest of its closing
    /// line.
    fn skip_block_comment(&mut self) -> Result<(), CsonhError> {
        let start_line = self.line;
        let start_column = self.column;
        let block_style = self.column == 1;
        for _ in 0..3 {
            self.advance_char();
        }

        let src = self.src;
        let rest = &src[self.cursor..];
        match memmem::find(rest.as_bytes(), b"###") {
            Some(i) => {
                self.advance_str(&rest[..i]);
                for _ in 0..3 {
                    self.advance_char();
                }
                if block_style {
                    self.skip_to_line_end();
                }
                Ok(())
            }
            None => Err(CsonhError::lexer(
                "Unterminated block comment",
                start_line,
                start_column,
            )),
        }
    }

    /// Measures the indentation of a fresh line and emits `Indent`/
    /// `Dedent` tokens for any change of level. Blank lines and lines
    /// holding only a comment contribute nothing.
    fn measure_indent(&mut self, tokens: &mut Vec<Token<'a>>) -> Result<(), CsonhError> {
        let mut width = 0usize;
        let mut first: Option<IndentChar> = None;
        let mut mixed = false;
        while let Some(byte) = self.peek() {
            let kind = match byte {
                b' ' => IndentChar::Space,
                b'\t' => IndentChar::Tab,
                _ => break,
            };
            match first {
                None => first = Some(kind),
                Some(seen) if seen != kind => mixed = true,
                _ => {}
            }
            self.advance_char();
            width += 1;
        }

        match self.peek() {
            None | Some(b'#') | Some(b'\n') => return Ok(()),
            _ => {}
        }

        if mixed {
            return Err(self.error("Mixed tabs and spaces"));
        }
        if let Some(kind) = first {
            match self.indent_char {
                None => self.indent_char = Some(kind),
                Some(established) if established != kind => {
                    return Err(self.error("Inconsistent indent character"));
                }
                _ => {}
            }
        }

        let current = self.indent_stack.last().copied().unwrap_or(0);
        if width > current {
            let step = width - current;
            let unit = match self.indent_unit {
                None => {
                    self.indent_unit = Some(step);
                    step
                }
                Some(unit) => {
                    if step % unit != 0 {
                        return Err(self.error(format!(
                            "Inconsistent indentation (unit {unit}, got {step})"
                        )));
                    }
                    unit
                }
            };
            for _ in 0..step / unit {
                let next = self.indent_stack.last().copied().unwrap_or(0) + unit;
                self.indent_stack.push(next);
                tokens.push(Token::new(TokenKind::Indent, self.line, self.column));
            }
        } else if width < current {
            if !self.indent_stack.contains(&width) {
                return Err(self.error("Dedent mismatch"));
            }
            while self.indent_stack.last().copied().unwrap_or(0) > width {
                self.indent_stack.pop();
                tokens.push(Token::new(TokenKind::Dedent, self.line, self.column));
            }
        }
        Ok(())
    }

    /// Scans a string literal. The opening quote has been consumed; its
    /// position is passed in for diagnostics on unterminated literals.
    fn lex_string(
        &mut self,
        quote: u8,
        start_line: usize,
        start_column: usize,
    ) -> Result<StringToken<'a>, CsonhError> {
        if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
            self.advance_char();
            self.advance_char();
            return self.lex_block_string(quote, start_line, start_column);
        }
        self.lex_inline_string(quote)
    }

    /// Scans a single-line string, decoding escapes strictly.
    fn lex_inline_string(&mut self, quote: u8) -> Result<StringToken<'a>, CsonhError> {
        let src = self.src;
        let bytes = self.bytes;
        let start = self.cursor;

        // Find the closing quote, skipping escaped ones.
        let mut search = start;
        let close = loop {
            match memchr(quote, &bytes[search..]) {
                Some(i) => {
                    let at = search + i;
                    let mut backslashes = 0;
                    while at - backslashes > start && bytes[at - backslashes - 1] == b'\\' {
                        backslashes += 1;
                    }
                    if backslashes % 2 == 0 {
                        break at;
                    }
                    search = at + 1;
                }
                None => {
                    let rest = &src[start..];
                    return match memchr(b'\n', rest.as_bytes()) {
                        Some(newline) => {
                            self.advance_str(&rest[..newline]);
                            Err(self.error("Newline in single-line string"))
                        }
                        None => {
                            self.advance_str(rest);
                            Err(self.error("Unterminated string"))
                        }
                    };
                }
            }
        };

        let content = &bytes[start..close];
        if let Some(newline) = memchr(b'\n', content) {
            self.advance_str(&src[start..start + newline]);
            return Err(self.error("Newline in single-line string"));
        }

        if memchr(b'\\', content).is_none() {
            // Hot path: nothing to decode, borrow the source directly.
            let text = &src[start..close];
            if quote == b'"' {
                if let Some(i) = memmem::find(content, b"#{") {
                    self.advance_str(&text[..i]);
                    return Err(self.error("Interpolation #{} not allowed in CSONH"));
                }
            }
            self.advance_str(text);
            self.advance_char();
            return Ok(StringToken::Inline(Cow::Borrowed(text)));
        }

        // Cold path: escapes present, build the decoded string.
        let mut decoded = String::with_capacity(content.len());
        while self.cursor < close {
            match bytes[self.cursor] {
                b'#' if quote == b'"' && self.peek_at(1) == Some(b'{') => {
                    return Err(self.error("Interpolation #{} not allowed in CSONH"));
                }
                b'\\' => {
                    self.advance_char();
                    decoded.push(self.lex_escape()?);
                }
                _ => {
                    if let Some(ch) = self.advance_char() {
                        decoded.push(ch);
                    }
                }
            }
        }
        self.advance_char();
        Ok(StringToken::Inline(Cow::Owned(decoded)))
    }

    /// Scans a triple-quoted string, keeping the interior raw. Dedent and
    /// escape decoding happen in the parser, once the closing delimiter's
    /// indentation is known.
    fn lex_block_string(
        &mut self,
        quote: u8,
        start_line: usize,
        start_column: usize,
    ) -> Result<StringToken<'a>, CsonhError> {
        let src = self.src;
        let bytes = self.bytes;
        let start = self.cursor;

        let mut search = start;
        let close = loop {
            match memchr(quote, &bytes[search..]) {
                Some(i) => {
                    let at = search + i;
                    if bytes.get(at + 1) == Some(&quote) && bytes.get(at + 2) == Some(&quote) {
                        break at;
                    }
                    search = at + 1;
                }
                None => {
                    return Err(CsonhError::lexer(
                        "Unterminated triple-quoted string",
                        start_line,
                        start_column,
                    ));
                }
            }
        };

        let raw = &src[start..close];
        if quote == b'"' {
            if let Some(i) = memmem::find(raw.as_bytes(), b"#{") {
                self.advance_str(&raw[..i]);
                return Err(self.error("Interpolation #{} not allowed in CSONH"));
            }
        }
        self.advance_str(raw);
        for _ in 0..3 {
            self.advance_char();
        }
        Ok(StringToken::Block {
            quote: quote as char,
            raw,
        })
    }

    /// Decodes one escape sequence; the backslash has been consumed.
    fn lex_escape(&mut self) -> Result<char, CsonhError> {
        let Some(escape) = self.advance_char() else {
            return Err(self.error("Incomplete escape sequence"));
        };
        match escape {
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            '\\' => Ok('\\'),
            '\'' => Ok('\''),
            '"' => Ok('"'),
            'u' => self.lex_unicode_escape(),
            other => Err(self.error(format!("Invalid escape sequence: \\{other}"))),
        }
    }

    /// Decodes `\uXXXX`, combining UTF-16 surrogate pairs when a valid
    /// low half follows immediately.
    fn lex_unicode_escape(&mut self) -> Result<char, CsonhError> {
        let high = self.lex_hex4()?;
        if let Some(ch) = char::from_u32(high) {
            return Ok(ch);
        }
        if (0xD800..=0xDBFF).contains(&high)
            && self.peek() == Some(b'\\')
            && self.peek_at(1) == Some(b'u')
        {
            self.advance_char();
            self.advance_char();
            let low = self.lex_hex4()?;
            if (0xDC00..=0xDFFF).contains(&low) {
                let combined = 0x1_0000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                if let Some(ch) = char::from_u32(combined) {
                    return Ok(ch);
                }
            }
        }
        Err(self.error("Invalid unicode escape"))
    }

    fn lex_hex4(&mut self) -> Result<u32, CsonhError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = match self.peek() {
                Some(byte) if byte.is_ascii_hexdigit() => {
                    (byte as char).to_digit(16).unwrap_or(0)
                }
                _ => return Err(self.error("Invalid unicode escape")),
            };
            code = code * 16 + digit;
            self.advance_char();
        }
        Ok(code)
    }

    /// Scans a number. The cursor sits on `-`, `.`, or a digit.
    fn lex_number(&mut self) -> Result<CsonhNumber, CsonhError> {
        let negative = if self.peek() == Some(b'-') {
            self.advance_char();
            true
        } else {
            false
        };

        if self.peek() == Some(b'0') {
            match self.peek_at(1) {
                Some(b'x') | Some(b'X') => {
                    self.advance_char();
                    self.advance_char();
                    return self.lex_radix(16, negative);
                }
                Some(b'b') | Some(b'B') => {
                    self.advance_char();
                    self.advance_char();
                    return self.lex_radix(2, negative);
                }
                Some(b'o') | Some(b'O') => {
                    self.advance_char();
                    self.advance_char();
                    return self.lex_radix(8, negative);
                }
                Some(byte) if byte.is_ascii_digit() => {
                    return Err(self.error("Leading zeros not allowed"));
                }
                _ => {}
            }
        }
        self.lex_decimal(negative)
    }

    /// Scans the digit run of a prefixed integer (`0x`, `0b`, `0o`).
    fn lex_radix(&mut self, radix: u32, negative: bool) -> Result<CsonhNumber, CsonhError> {
        let src = self.src;
        let start = self.cursor;
        while let Some(byte) = self.peek() {
            if (byte as char).is_digit(radix) {
                self.advance_char();
            } else {
                break;
            }
        }
        if self.cursor == start {
            return Err(self.error(format!("Invalid base-{radix} number")));
        }
        let digits = &src[start..self.cursor];
        let value = i64::from_str_radix(digits, radix)
            .map_err(|_| self.error(format!("Invalid base-{radix} number")))?;
        Ok(CsonhNumber::Int(if negative { -value } else { value }))
    }

    fn lex_decimal(&mut self, negative: bool) -> Result<CsonhNumber, CsonhError> {
        let src = self.src;
        let start = self.cursor;
        let mut saw_dot = false;
        let mut saw_exponent = false;

        if self.peek() == Some(b'.') {
            saw_dot = true;
            self.advance_char();
        }
        while matches!(self.peek(), Some(byte) if byte.is_ascii_digit()) {
            self.advance_char();
        }

        if !saw_dot && self.peek() == Some(b'.') {
            if self.peek_at(1) == Some(b'.') {
                return Err(self.error("Range operator '..' not allowed"));
            }
            saw_dot = true;
            self.advance_char();
            while matches!(self.peek(), Some(byte) if byte.is_ascii_digit()) {
                self.advance_char();
            }
        }

        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            saw_exponent = true;
            self.advance_char();
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.advance_char();
            }
            if !matches!(self.peek(), Some(byte) if byte.is_ascii_digit()) {
                return Err(self.error("Invalid scientific notation"));
            }
            while matches!(self.peek(), Some(byte) if byte.is_ascii_digit()) {
                self.advance_char();
            }
        }

        let text = &src[start..self.cursor];
        if saw_dot || saw_exponent {
            let value: f64 = text
                .parse()
                .map_err(|_| self.error(format!("Invalid number '{text}'")))?;
            Ok(CsonhNumber::Float(if negative { -value } else { value }))
        } else {
            match text.parse::<i64>() {
                Ok(value) => Ok(CsonhNumber::Int(if negative { -value } else { value })),
                // Magnitudes beyond i64 fall back to floating point.
                Err(_) => {
                    let value: f64 = text
                        .parse()
                        .map_err(|_| self.error(format!("Invalid number '{text}'")))?;
                    Ok(CsonhNumber::Float(if negative { -value } else { value }))
                }
            }
        }
    }

    /// Scans an identifier `[A-Za-z_$][A-Za-z0-9_$]*`.
    fn lex_identifier(&mut self) -> &'a str {
        let src = self.src;
        let start = self.cursor;
        while matches!(
            self.peek(),
            Some(byte) if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
        ) {
            self.advance_char();
        }
        &src[start..self.cursor]
    }

    /// Consumes the entire source and returns the token vector,
    /// terminated by exactly one `Eof` after all outstanding dedents.
    pub(crate) fn tokenize(mut self) -> Result<Vec<Token<'a>>, CsonhError> {
        let mut tokens = Vec::new();
        let mut at_line_start = true;

        while self.cursor < self.bytes.len() {
            if at_line_start {
                self.measure_indent(&mut tokens)?;
                at_line_start = false;
            }
            self.skip_spaces();
            let Some(byte) = self.peek() else { break };
            let (line, column) = (self.line, self.column);

            match byte {
                b'#' => {
                    if self.peek_at(1) == Some(b'#') && self.peek_at(2) == Some(b'#') {
                        self.skip_block_comment()?;
                    } else {
                        self.advance_char();
                        self.skip_to_line_end();
                    }
                }
                b'\n' => {
                    self.advance_char();
                    tokens.push(Token::new(TokenKind::Newline, line, column));
                    at_line_start = true;
                }
                b'{' => {
                    self.advance_char();
                    tokens.push(Token::new(TokenKind::LeftBrace, line, column));
                }
                b'}' => {
                    self.advance_char();
                    tokens.push(Token::new(TokenKind::RightBrace, line, column));
                }
                b'[' => {
                    self.advance_char();
                    tokens.push(Token::new(TokenKind::LeftBracket, line, column));
                }
                b']' => {
                    self.advance_char();
                    tokens.push(Token::new(TokenKind::RightBracket, line, column));
                }
                b':' => {
                    self.advance_char();
                    tokens.push(Token::new(TokenKind::Colon, line, column));
                }
                b',' => {
                    self.advance_char();
                    tokens.push(Token::new(TokenKind::Comma, line, column));
                }
                b'\'' | b'"' => {
                    self.advance_char();
                    let payload = self.lex_string(byte, line, column)?;
                    tokens.push(Token::new(TokenKind::String(payload), line, column));
                }
                byte if byte.is_ascii_digit() => {
                    let number = self.lex_number()?;
                    tokens.push(Token::new(TokenKind::Number(number), line, column));
                }
                b'.' if matches!(self.peek_at(1), Some(next) if next.is_ascii_digit()) => {
                    let number = self.lex_number()?;
                    tokens.push(Token::new(TokenKind::Number(number), line, column));
                }
                b'-' if matches!(
                    self.peek_at(1),
                    Some(next) if next.is_ascii_digit() || next == b'.'
                ) =>
                {
                    let number = self.lex_number()?;
                    tokens.push(Token::new(TokenKind::Number(number), line, column));
                }
                byte if byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$' => {
                    let ident = self.lex_identifier();
                    let kind = match ident {
                        "true" | "yes" | "on" => TokenKind::Boolean(true),
                        "false" | "no" | "off" => TokenKind::Boolean(false),
                        "null" => TokenKind::Null,
                        _ => TokenKind::Identifier(ident),
                    };
                    tokens.push(Token::new(kind, line, column));
                }
                _ => {
                    let ch = self.peek_char().unwrap_or(char::REPLACEMENT_CHARACTER);
                    return Err(self.error(format!("Unexpected character: {ch}")));
                }
            }
        }

        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            tokens.push(Token::new(TokenKind::Dedent, self.line, self.column));
        }
        tokens.push(Token::new(TokenKind::Eof, self.line, self.column));
        Ok(tokens)
    }
}
