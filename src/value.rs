//! Contains the `CsonhValue` enum, a native Rust representation of any
//! value a CSONH document can hold.

use indexmap::IndexMap;
use std::fmt;

/// A native Rust representation of a CSONH number.
///
/// Integers and floats are kept distinct: `42` and `42.0` decode to
/// different variants, and hex/binary/octal literals always decode to
/// `Int`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CsonhNumber {
    /// A signed 64-bit integer, e.g. `42`, `-7`, `0xFF`.
    Int(i64),
    /// A 64-bit floating-point number, e.g. `3.14`, `-0.5`, `1e10`.
    Float(f64),
}

impl CsonhNumber {
    /// Returns the integer value, or `None` for floats.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CsonhNumber::Int(n) => Some(*n),
            CsonhNumber::Float(_) => None,
        }
    }

    /// Returns the numeric value as `f64`, widening integers.
    pub fn as_f64(&self) -> f64 {
        match self {
            CsonhNumber::Int(n) => *n as f64,
            CsonhNumber::Float(x) => *x,
        }
    }
}

impl fmt::Display for CsonhNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsonhNumber::Int(n) => write!(f, "{}", n),
            CsonhNumber::Float(x) => write!(f, "{}", x),
        }
    }
}

/// A native Rust representation of any valid CSONH value.
///
/// Objects preserve the order in which keys first appeared in the
/// document; a duplicated key keeps its original position but takes the
/// value of its last occurrence.
#[derive(Debug, PartialEq, Clone)]
pub enum CsonhValue {
    /// The `null` literal.
    Null,
    /// `true`/`yes`/`on` or `false`/`no`/`off`.
    Boolean(bool),
    /// An integer or floating-point number.
    Number(CsonhNumber),
    /// A single-line or triple-quoted string, fully decoded.
    String(String),
    /// An ordered sequence of values.
    Array(Vec<CsonhValue>),
    /// A mapping from string keys to values, in first-insertion order.
    Object(IndexMap<String, CsonhValue>),
}

impl CsonhValue {
    /// Returns `true` if the value is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, CsonhValue::Null)
    }

    /// Returns the boolean value, if this is a `Boolean`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CsonhValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer `Number`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CsonhValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Returns the numeric value as `f64`, if this is any `Number`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CsonhValue::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// Returns the string contents, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CsonhValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements, if this is an `Array`.
    pub fn as_array(&self) -> Option<&[CsonhValue]> {
        match self {
            CsonhValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the underlying map, if this is an `Object`.
    pub fn as_object(&self) -> Option<&IndexMap<String, CsonhValue>> {
        match self {
            CsonhValue::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up a field by key, if this is an `Object`.
    ///
    /// ```
    /// let config = csonh::parse("name: 'demo'").unwrap();
    /// assert_eq!(config.get("name").and_then(|v| v.as_str()), Some("demo"));
    /// assert!(config.get("missing").is_none());
    /// ```
    pub fn get(&self, key: &str) -> Option<&CsonhValue> {
        self.as_object().and_then(|entries| entries.get(key))
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        assert_eq!(CsonhNumber::Int(255).to_string(), "255");
        assert_eq!(CsonhNumber::Int(-7).to_string(), "-7");
        assert_eq!(CsonhNumber::Float(-0.5).to_string(), "-0.5");
    }

    #[test]
    fn test_number_accessors() {
        assert_eq!(CsonhNumber::Int(42).as_i64(), Some(42));
        assert_eq!(CsonhNumber::Float(42.0).as_i64(), None);
        assert_eq!(CsonhNumber::Int(2).as_f64(), 2.0);
    }

    #[test]
    fn test_int_and_float_are_distinct() {
        assert_ne!(
            CsonhValue::Number(CsonhNumber::Int(1)),
            CsonhValue::Number(CsonhNumber::Float(1.0))
        );
    }

    #[test]
    fn test_value_accessors() {
        let mut entries = IndexMap::new();
        entries.insert("on".to_string(), CsonhValue::Boolean(true));
        let object = CsonhValue::Object(entries);

        assert_eq!(object.get("on").and_then(CsonhValue::as_bool), Some(true));
        assert!(object.get("off").is_none());
        assert!(CsonhValue::Null.is_null());
        assert_eq!(CsonhValue::String("x".to_string()).as_str(), Some("x"));
        assert!(CsonhValue::Array(vec![]).as_array().is_some());
        assert!(CsonhValue::Null.as_object().is_none());
    }
}
