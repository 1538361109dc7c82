//! Safe navigation over loosely shaped resource trees.
//!
//! Resources arrive as arbitrary JSON. Any intermediate object may be missing, `null`, the
//! wrong shape, or an empty list. [`ValueExt`] reads a dotted path (`"code.coding.0.code"`)
//! and returns `None` at the first gap instead of panicking.
//!
//! Path segments that parse as an integer index into arrays; all other segments are object
//! keys. Empty strings and `null` count as absent, matching how the source system treated
//! falsy values.

use rust_decimal::Decimal;
use serde_json::Value;

const EMPTY: &[Value] = &[];

/// Typed, never-failing path lookups over a [`Value`].
pub trait ValueExt {
    /// Node at `path`, or `None` if any segment is missing or the node is `null`.
    fn at(&self, path: &str) -> Option<&Value>;

    /// Non-empty string at `path`.
    fn str_at(&self, path: &str) -> Option<&str> {
        self.at(path)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Owned non-empty string at `path`.
    fn string_at(&self, path: &str) -> Option<String> {
        self.str_at(path).map(str::to_owned)
    }

    /// Array at `path`; absent or non-array nodes yield an empty slice.
    fn array_at(&self, path: &str) -> &[Value] {
        match self.at(path) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => EMPTY,
        }
    }

    fn f64_at(&self, path: &str) -> Option<f64> {
        self.at(path).and_then(Value::as_f64)
    }

    fn i64_at(&self, path: &str) -> Option<i64> {
        self.at(path).and_then(Value::as_i64)
    }

    fn bool_at(&self, path: &str) -> Option<bool> {
        self.at(path).and_then(Value::as_bool)
    }

    /// String, number or boolean at `path`, rendered as text.
    fn text_at(&self, path: &str) -> Option<String> {
        self.at(path).and_then(scalar_text)
    }

    /// Exact decimal at `path`. Accepts JSON numbers and numeric strings.
    fn decimal_at(&self, path: &str) -> Option<Decimal> {
        match self.at(path)? {
            Value::Number(n) => n
                .to_string()
                .parse::<Decimal>()
                .ok()
                .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
            Value::String(s) => s.trim().parse::<Decimal>().ok(),
            _ => None,
        }
    }
}

impl ValueExt for Value {
    fn at(&self, path: &str) -> Option<&Value> {
        let mut node = self;
        if !path.is_empty() {
            for segment in path.split('.') {
                node = match node {
                    Value::Object(map) => map.get(segment)?,
                    Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                    _ => return None,
                };
            }
        }
        if node.is_null() {
            None
        } else {
            Some(node)
        }
    }
}

/// Render a scalar node as text. Objects, arrays, `null` and empty strings yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
