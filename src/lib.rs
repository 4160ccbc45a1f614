//! # csonh
//!
//! A strict, data-only parser for the CSONH configuration format, built
//! from scratch in pure Rust.
//!
//! CSONH combines JSON's unambiguous typing with indentation-based
//! readability: objects nest by indentation like YAML, while `{…}` and
//! `[…]` literals, quoted strings, and comments keep JSON's explicit
//! punctuation. The parser is strict by design: separators are required
//! inside brackets, unquoted barewords are not values, string
//! interpolation is rejected, and anything after the root value is an
//! error.
//!
//! ## Key Features
//!
//! * **Precise diagnostics:** every error carries a 1-based line and
//!   column pointing at the offending source.
//! * **Indentation as punctuation:** the lexer emits synthetic
//!   indent/dedent tokens, so the parser is plain recursive descent with
//!   one-token lookahead.
//! * **Order-preserving objects:** keys keep the order of their first
//!   appearance; a duplicated key keeps its position but takes its last
//!   value.
//! * **Triple-quoted strings** with auto-dedent keyed on the closing
//!   delimiter's indentation.
//!
//! ## Quick Start
//!
//! ```
//! let source = "
//! server:
//!   host: 'localhost'
//!   port: 8080  # default
//!   tags: ['web', 'prod']
//! ";
//!
//! let config = csonh::parse(source).unwrap();
//! let server = config.get("server").unwrap();
//! assert_eq!(server.get("host").and_then(|v| v.as_str()), Some("localhost"));
//! assert_eq!(server.get("port").and_then(|v| v.as_i64()), Some(8080));
//! ```
//!
//! Errors report where things went wrong:
//!
//! ```
//! let err = csonh::parse("list: [1 2]").unwrap_err();
//! assert_eq!(err.line(), 1);
//! assert_eq!(err.column(), 10);
//! ```

/// Contains the primary `CsonhError` type for the library.
pub mod error;
/// Contains the `CsonhValue` enum, the decoded form of a document.
pub mod value;

mod parser;
mod strings;
mod token;
mod tokenizer;

pub use error::CsonhError;
pub use value::{CsonhNumber, CsonhValue};

use parser::Parser;
use tokenizer::Tokenizer;

/// The default maximum nesting depth, to keep recursion bounded on
/// hostile input like `[[[[…]]]]`.
const DEFAULT_MAX_DEPTH: usize = 100;

/// Parses a CSONH document into a [`CsonhValue`].
///
/// The input is taken as UTF-8 text; a leading byte-order mark is
/// ignored and both `\n` and `\r\n` line endings are accepted. The root
/// of a document is an object or an array, and empty or comment-only
/// input yields an empty object.
///
/// Parsing is a pure function of the input: no I/O, no shared state, and
/// independent calls may run concurrently without coordination.
///
/// # Errors
///
/// Returns a [`CsonhError`] describing the first lexical or syntactic
/// fault, with its 1-based line and column.
///
/// # Examples
///
/// ```
/// use csonh::CsonhValue;
///
/// let value = csonh::parse("key: 'value'").unwrap();
/// assert_eq!(value.get("key").and_then(CsonhValue::as_str), Some("value"));
///
/// let value = csonh::parse("[1, 2, 3]").unwrap();
/// assert_eq!(value.as_array().map(|items| items.len()), Some(3));
/// ```
pub fn parse(input: &str) -> Result<CsonhValue, CsonhError> {
    let source = tokenizer::normalize(input);
    let tokens = Tokenizer::new(&source).tokenize()?;
    Parser::new(tokens, DEFAULT_MAX_DEPTH).parse()
}

// --- Test Module ---
#[cfg(test)]
mod tests {
    use super::{parse, CsonhError, CsonhNumber, CsonhValue};
    use crate::parser::Parser;
    use crate::tokenizer::{self, Tokenizer};
    use indexmap::IndexMap;

    fn parse_with_depth(input: &str, max_depth: usize) -> Result<CsonhValue, CsonhError> {
        let source = tokenizer::normalize(input);
        let tokens = Tokenizer::new(&source).tokenize()?;
        Parser::new(tokens, max_depth).parse()
    }

    fn object(entries: Vec<(&str, CsonhValue)>) -> CsonhValue {
        CsonhValue::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect::<IndexMap<_, _>>(),
        )
    }

    fn string(text: &str) -> CsonhValue {
        CsonhValue::String(text.to_string())
    }

    fn int(value: i64) -> CsonhValue {
        CsonhValue::Number(CsonhNumber::Int(value))
    }

    fn float(value: f64) -> CsonhValue {
        CsonhValue::Number(CsonhNumber::Float(value))
    }

    // --- Basic structures ---

    #[test]
    fn test_empty_input_is_empty_object() {
        assert_eq!(parse("").unwrap(), object(vec![]));
        assert_eq!(parse("{}").unwrap(), object(vec![]));
        assert_eq!(parse("# just a comment").unwrap(), object(vec![]));
        assert_eq!(parse("\n\n  \n").unwrap(), object(vec![]));
        assert_eq!(parse("### block\nonly ###").unwrap(), object(vec![]));
    }

    #[test]
    fn test_basic_object() {
        assert_eq!(
            parse("key: 'value'").unwrap(),
            object(vec![("key", string("value"))])
        );
    }

    #[test]
    fn test_indented_object() {
        let source = "server:\n  host: 'localhost'\n  port: 8080\n";
        let expected = object(vec![(
            "server",
            object(vec![("host", string("localhost")), ("port", int(8080))]),
        )]);
        assert_eq!(parse(source).unwrap(), expected);
    }

    #[test]
    fn test_deeply_indented_objects() {
        let source = "a:\n  b:\n    c: 1\n  d: 2\ne: 3\n";
        let expected = object(vec![
            (
                "a",
                object(vec![("b", object(vec![("c", int(1))])), ("d", int(2))]),
            ),
            ("e", int(3)),
        ]);
        assert_eq!(parse(source).unwrap(), expected);
    }

    #[test]
    fn test_arrays() {
        let expected = CsonhValue::Array(vec![int(1), int(2), int(3)]);
        assert_eq!(parse("[1, 2, 3]").unwrap(), expected);
        assert_eq!(parse("[\n  1,\n  2,\n  3\n]").unwrap(), expected);
        // Newlines alone are valid separators.
        assert_eq!(parse("[1\n2\n3]").unwrap(), expected);
        // Trailing commas are allowed.
        assert_eq!(parse("[1, 2, 3,]").unwrap(), expected);
    }

    #[test]
    fn test_braced_objects() {
        let expected = object(vec![("a", int(1)), ("b", int(2))]);
        assert_eq!(parse("{a: 1, b: 2}").unwrap(), expected);
        assert_eq!(parse("{\n  a: 1\n  b: 2\n}").unwrap(), expected);
        assert_eq!(parse("{a: 1, b: 2,}").unwrap(), expected);
    }

    #[test]
    fn test_mixed_grammars() {
        let source = "\
servers:
  pool: [{id: 1, up: yes}, {id: 2, up: no}]
  fallback:
    host: 'backup'
    ports: [80, 443]
";
        let expected = object(vec![(
            "servers",
            object(vec![
                (
                    "pool",
                    CsonhValue::Array(vec![
                        object(vec![("id", int(1)), ("up", CsonhValue::Boolean(true))]),
                        object(vec![("id", int(2)), ("up", CsonhValue::Boolean(false))]),
                    ]),
                ),
                (
                    "fallback",
                    object(vec![
                        ("host", string("backup")),
                        ("ports", CsonhValue::Array(vec![int(80), int(443)])),
                    ]),
                ),
            ]),
        )]);
        assert_eq!(parse(source).unwrap(), expected);
    }

    #[test]
    fn test_indented_object_inside_braces() {
        let source = "{outer:\n    inner: 1\n}";
        let expected = object(vec![("outer", object(vec![("inner", int(1))]))]);
        assert_eq!(parse(source).unwrap(), expected);
    }

    // --- Strict separation ---

    #[test]
    fn test_reject_space_separated_array() {
        let err = parse("[1 2]").unwrap_err();
        assert_eq!(err.message(), "Expected comma or newline between array elements");
        assert_eq!((err.line(), err.column()), (1, 4));
    }

    #[test]
    fn test_reject_space_separated_object() {
        let err = parse("{a:1 b:2}").unwrap_err();
        assert_eq!(err.message(), "Expected comma or newline between object entries");
    }

    // --- Top-level seal ---

    #[test]
    fn test_reject_trailing_junk_after_entries() {
        let err = parse("key: 1\ngarbage").unwrap_err();
        assert_eq!(err.message(), "Unexpected content at top level");
        assert_eq!((err.line(), err.column()), (2, 1));
    }

    #[test]
    fn test_reject_trailing_junk_after_array() {
        let err = parse("[1, 2] junk").unwrap_err();
        assert_eq!(err.message(), "Trailing junk after top-level array");

        let err = parse("{a: 1} junk").unwrap_err();
        assert_eq!(err.message(), "Trailing junk after top-level object");
    }

    #[test]
    fn test_root_must_be_object_or_array() {
        for source in ["42", "'lone string'", "true", "null"] {
            let err = parse(source).unwrap_err();
            assert_eq!(err.message(), "Root must be object or array", "input: {source}");
        }
    }

    // --- Strings and dedenting ---

    #[test]
    fn test_triple_quote_dedent() {
        let source = "msg: '''\n  Line 1\n  Line 2\n  '''\n";
        assert_eq!(
            parse(source).unwrap(),
            object(vec![("msg", string("Line 1\nLine 2"))])
        );
    }

    #[test]
    fn test_triple_quote_immediate_first_line() {
        let source = "msg: '''Line 1\n  Line 2\n  '''";
        assert_eq!(
            parse(source).unwrap(),
            object(vec![("msg", string("Line 1\nLine 2"))])
        );
    }

    #[test]
    fn test_triple_quote_empty() {
        assert_eq!(parse("msg: ''''''").unwrap(), object(vec![("msg", string(""))]));
    }

    #[test]
    fn test_triple_quote_lenient_escapes() {
        // Unknown escapes survive verbatim in triple-quoted strings, while
        // single-line strings reject them.
        let source = "path: '''C:\\new\\zdir'''";
        assert_eq!(
            parse(source).unwrap(),
            object(vec![("path", string("C:\new\\zdir"))])
        );
        assert!(parse(r"path: 'C:\zdir'").is_err());
    }

    #[test]
    fn test_triple_quoted_key() {
        let source = "'''k''': 1";
        assert_eq!(parse(source).unwrap(), object(vec![("k", int(1))]));
    }

    #[test]
    fn test_string_key_with_spaces() {
        let source = "'spaced key': 1";
        assert_eq!(parse(source).unwrap(), object(vec![("spaced key", int(1))]));
    }

    #[test]
    fn test_unicode_escape() {
        assert_eq!(
            parse(r"char: '\u0041'").unwrap(),
            object(vec![("char", string("A"))])
        );
    }

    // --- Numbers and booleans ---

    #[test]
    fn test_numbers() {
        assert_eq!(parse("i: 42").unwrap(), object(vec![("i", int(42))]));
        assert_eq!(parse("f: 3.14").unwrap(), object(vec![("f", float(3.14))]));
        assert_eq!(parse("n: -.5").unwrap(), object(vec![("n", float(-0.5))]));
        assert_eq!(parse("t: 5.").unwrap(), object(vec![("t", float(5.0))]));
        assert_eq!(parse("z: 0o0").unwrap(), object(vec![("z", int(0))]));
    }

    #[test]
    fn test_radix_numbers_are_numerically_equal() {
        let value = parse("a: 0xFF\nb: 255\nc: 0b11111111\nd: 0o377\n").unwrap();
        for key in ["a", "b", "c", "d"] {
            assert_eq!(value.get(key).and_then(CsonhValue::as_i64), Some(255));
        }
    }

    #[test]
    fn test_number_boundary_failures() {
        assert!(parse("n: 0123").is_err());
        assert!(parse("n: 1e").is_err());
        assert!(parse("n: 1..10").is_err());
    }

    #[test]
    fn test_booleans_and_null() {
        let value = parse("a: yes\nb: 'NO'\nc: off\nd: null\n").unwrap();
        let expected = object(vec![
            ("a", CsonhValue::Boolean(true)),
            ("b", string("NO")),
            ("c", CsonhValue::Boolean(false)),
            ("d", CsonhValue::Null),
        ]);
        assert_eq!(value, expected);
    }

    #[test]
    fn test_barewords_rejected_as_values() {
        for source in ["a: NO", "a: YES", "a: On", "a: OFF", "a: hostname"] {
            let err = parse(source).unwrap_err();
            assert!(
                err.message().starts_with("Bareword"),
                "input {source:?} gave {:?}",
                err.message()
            );
        }
    }

    // --- Security and rejection ---

    #[test]
    fn test_reject_interpolation() {
        let err = parse("a: \"val #{x}\"").unwrap_err();
        assert!(matches!(err, CsonhError::Lexer { .. }));
        assert_eq!(err.message(), "Interpolation #{} not allowed in CSONH");
    }

    #[test]
    fn test_interpolation_literal_in_single_quotes() {
        assert_eq!(
            parse("a: 'val #{x}'").unwrap(),
            object(vec![("a", string("val #{x}"))])
        );
    }

    #[test]
    fn test_reject_arithmetic() {
        let err = parse("a: 1 + 2").unwrap_err();
        assert!(err.line() == 1 && err.column() >= 5);
    }

    #[test]
    fn test_depth_limit() {
        let hostile = "[".repeat(101) + &"]".repeat(101);
        let err = parse_with_depth(&hostile, 100).unwrap_err();
        assert_eq!(err.message(), "Maximum nesting depth exceeded");
        assert_eq!(err.column(), 101);

        let deep_but_fine = "[".repeat(100) + &"]".repeat(100);
        assert!(parse_with_depth(&deep_but_fine, 100).is_ok());
    }

    // --- Object semantics ---

    #[test]
    fn test_key_order_is_first_appearance() {
        let value = parse("z: 1\na: 2\nm: 3\n").unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_duplicate_keys_last_write_wins_in_place() {
        let value = parse("a: 1\nb: 2\na: 3\n").unwrap();
        let entries = value.as_object().unwrap();
        let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(entries["a"], int(3));
        assert_eq!(entries["b"], int(2));
    }

    // --- Input normalization and equivalence ---

    #[test]
    fn test_crlf_and_lf_are_equivalent() {
        let unix = "a: 1\nb:\n  c: 2\n";
        let windows = "a: 1\r\nb:\r\n  c: 2\r\n";
        assert_eq!(parse(unix).unwrap(), parse(windows).unwrap());
    }

    #[test]
    fn test_bom_is_ignored() {
        assert_eq!(parse("\u{feff}a: 1").unwrap(), object(vec![("a", int(1))]));
    }

    #[test]
    fn test_comments_and_trailing_whitespace_do_not_change_result() {
        let plain = "a: 1\nb: 2\n";
        let noisy = "a: 1   # one\n### interlude ###\nb: 2  \n";
        assert_eq!(parse(plain).unwrap(), parse(noisy).unwrap());
    }

    #[test]
    fn test_comment_lines_do_not_disturb_indentation() {
        let source = "a:\n  b: 1\n      # over-indented comment\n  c: 2\n";
        let expected = object(vec![(
            "a",
            object(vec![("b", int(1)), ("c", int(2))]),
        )]);
        assert_eq!(parse(source).unwrap(), expected);
    }

    // --- Error positions ---

    #[test]
    fn test_error_positions() {
        let err = parse("{a: 1").unwrap_err();
        assert_eq!(err.message(), "Unclosed object");

        let err = parse("[1, 2").unwrap_err();
        assert_eq!(err.message(), "Unclosed array");

        let err = parse("{: 1}").unwrap_err();
        assert_eq!(err.message(), "Expected key, got ':'");
        assert_eq!((err.line(), err.column()), (1, 2));

        let err = parse("{a 1}").unwrap_err();
        assert_eq!(err.message(), "Expected ':', got number");

        let err = parse("a:\n  5: 1").unwrap_err();
        assert_eq!(err.message(), "Expected key, got number");
        assert_eq!((err.line(), err.column()), (2, 3));
    }

    #[test]
    fn test_missing_value_at_end() {
        let err = parse("a:").unwrap_err();
        assert_eq!(err.message(), "Expected value, got end of input");
    }
}
