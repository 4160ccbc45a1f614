//! Post-processing for triple-quoted strings.
//!
//! The lexer hands triple-quoted interiors over raw, because the amount
//! to dedent depends on where the closing delimiter sits. This module
//! performs the two deferred steps, in order: auto-dedent keyed on the
//! closing delimiter's indentation, then escape decoding.
//!
//! Escape decoding here is *lenient*: an unrecognized escape is kept
//! verbatim as backslash-plus-character. Single-line strings are decoded
//! strictly in the lexer instead; the split is deliberate.

use std::borrow::Cow;

/// Decodes the raw interior of a triple-quoted string.
pub(crate) fn decode_block(raw: &str) -> String {
    let dedented = dedent(raw);
    decode_escapes(&dedented).into_owned()
}

/// Strips the closing delimiter's indentation from every line.
///
/// If the interior opens with a blank first line it is dropped, and if
/// it closes with a whitespace-only final line that line becomes the
/// *closing indent*: it is removed together with the newline before it,
/// and every line that starts with the same width of spaces (or tabs)
/// loses that prefix. Lines indented differently are left unchanged, and
/// empty lines stay empty.
fn dedent(content: &str) -> Cow<'_, str> {
    let first_blank = !content.is_empty()
        && content.split('\n').next().is_some_and(|line| line.trim().is_empty());
    let last_blank = !content.is_empty()
        && content.rsplit('\n').next().is_some_and(|line| line.trim().is_empty());

    if !last_blank {
        return Cow::Borrowed(content);
    }

    let mut content = content;
    if first_blank {
        if let Some(i) = content.find('\n') {
            content = &content[i + 1..];
        }
    }

    let Some(last_newline) = content.rfind('\n') else {
        return Cow::Borrowed(content);
    };
    let closing = &content[last_newline + 1..];
    if !closing.trim().is_empty() {
        return Cow::Borrowed(content);
    }

    let width = closing.chars().count();
    let body = &content[..last_newline];
    let space_prefix = " ".repeat(width);
    let tab_prefix = "\t".repeat(width);

    let mut lines = Vec::new();
    for line in body.split('\n') {
        if line.is_empty() {
            lines.push(line);
        } else if line.starts_with(space_prefix.as_str()) || line.starts_with(tab_prefix.as_str()) {
            lines.push(&line[width..]);
        } else {
            lines.push(line);
        }
    }
    Cow::Owned(lines.join("\n"))
}

/// Decodes escape sequences, keeping anything unrecognized verbatim.
pub(crate) fn decode_escapes(content: &str) -> Cow<'_, str> {
    if !content.contains('\\') {
        return Cow::Borrowed(content);
    }

    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(i) = rest.find('\\') {
        out.push_str(&rest[..i]);
        rest = &rest[i + 1..];
        let Some(escape) = rest.chars().next() else {
            // A lone trailing backslash is dropped.
            return Cow::Owned(out);
        };
        rest = &rest[escape.len_utf8()..];
        match escape {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'u' => rest = decode_unicode(rest, &mut out),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Handles the tail of a `\u` escape. Consumes what it decodes and
/// returns the remainder; on any malformed input the escape is emitted
/// verbatim instead of failing.
fn decode_unicode<'a>(rest: &'a str, out: &mut String) -> &'a str {
    let hex: String = rest.chars().take(4).collect();
    if hex.chars().count() < 4 {
        out.push_str("\\u");
        return rest;
    }
    let after = &rest[hex.len()..];

    let Ok(code) = u32::from_str_radix(&hex, 16) else {
        out.push_str("\\u");
        out.push_str(&hex);
        return after;
    };
    if let Some(ch) = char::from_u32(code) {
        out.push(ch);
        return after;
    }
    // High surrogate: combine with an immediately following low half.
    if (0xD800..=0xDBFF).contains(&code) {
        if let Some(tail) = after.strip_prefix("\\u") {
            let low_hex: String = tail.chars().take(4).collect();
            if low_hex.chars().count() == 4 {
                if let Ok(low) = u32::from_str_radix(&low_hex, 16) {
                    if (0xDC00..=0xDFFF).contains(&low) {
                        let combined = 0x1_0000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                        if let Some(ch) = char::from_u32(combined) {
                            out.push(ch);
                            return &tail[low_hex.len()..];
                        }
                    }
                }
            }
        }
    }
    out.push_str("\\u");
    out.push_str(&hex);
    after
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedent_with_leading_blank() {
        // msg: '''
        //   Line 1
        //   Line 2
        //   '''
        let raw = "\n  Line 1\n  Line 2\n  ";
        assert_eq!(decode_block(raw), "Line 1\nLine 2");
    }

    #[test]
    fn test_dedent_first_line_on_delimiter() {
        // msg: '''Line 1
        //   Line 2
        //   '''
        let raw = "Line 1\n  Line 2\n  ";
        assert_eq!(decode_block(raw), "Line 1\nLine 2");
    }

    #[test]
    fn test_dedent_preserves_extra_indentation() {
        let raw = "\n  plain\n    nested\n  ";
        assert_eq!(decode_block(raw), "plain\n  nested");
    }

    #[test]
    fn test_dedent_preserves_empty_lines() {
        let raw = "\n  a\n\n  b\n  ";
        assert_eq!(decode_block(raw), "a\n\nb");
    }

    #[test]
    fn test_dedent_tabs() {
        let raw = "\n\tLine 1\n\tLine 2\n\t";
        assert_eq!(decode_block(raw), "Line 1\nLine 2");
    }

    #[test]
    fn test_dedent_no_closing_indent_line() {
        // The closing delimiter sits right after the text, so nothing is
        // dedented.
        let raw = "Line 1\nLine 2";
        assert_eq!(decode_block(raw), "Line 1\nLine 2");
    }

    #[test]
    fn test_dedent_zero_width_closing() {
        // Interior ends with a bare newline: only the trailing newline and
        // leading blank line are trimmed.
        let raw = "\nLine 1\nLine 2\n";
        assert_eq!(decode_block(raw), "Line 1\nLine 2");
    }

    #[test]
    fn test_empty_interior() {
        assert_eq!(decode_block(""), "");
        assert_eq!(decode_block("\n"), "");
        assert_eq!(decode_block("\n  "), "");
    }

    #[test]
    fn test_lenient_escapes() {
        assert_eq!(decode_escapes(r"a\nb"), "a\nb");
        assert_eq!(decode_escapes(r"a\tb\rc"), "a\tb\rc");
        assert_eq!(decode_escapes("quote: \\' and \\\""), "quote: ' and \"");
        assert_eq!(decode_escapes(r"back\\slash"), r"back\slash");
        // Unknown escapes survive verbatim.
        assert_eq!(decode_escapes(r"a\zb"), r"a\zb");
        assert_eq!(decode_escapes(r"win\path"), r"win\path");
    }

    #[test]
    fn test_lenient_unicode_escapes() {
        assert_eq!(decode_escapes("\\u0041"), "A");
        assert_eq!(decode_escapes("\\u00e9"), "\u{e9}");
        // Surrogate pair.
        assert_eq!(decode_escapes("\\ud83d\\ude00"), "\u{1f600}");
        // Malformed sequences come through verbatim.
        assert_eq!(decode_escapes("\\uZZZZ"), "\\uZZZZ");
        assert_eq!(decode_escapes("\\u00"), "\\u00");
        assert_eq!(decode_escapes("\\ud800 alone"), "\\ud800 alone");
    }

    #[test]
    fn test_trailing_backslash_dropped() {
        assert_eq!(decode_escapes("dangling\\"), "dangling");
    }

    #[test]
    fn test_rewrap_reproduces_raw_interior() {
        // Re-indenting the decoded lines with the detected closing indent
        // rebuilds the original interior (minus the blank boundary lines).
        let raw = "\n    alpha\n    beta\n    ";
        let decoded = decode_block(raw);
        let rewrapped: String = decoded
            .split('\n')
            .map(|line| format!("    {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(format!("\n{rewrapped}\n    "), raw);
    }
}
