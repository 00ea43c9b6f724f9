//! Typed parameter values
//!
//! Every mapped query parameter holds exactly one [`ParamValue`] shape. The
//! shape follows from the raw value's syntax: bracketed values become a
//! [`ParamValue::Sequence`], integer-coerced keys become
//! [`ParamValue::Integer`], everything else stays a [`ParamValue::Scalar`].

use serde::{Deserialize, Serialize};

/// A single mapped query parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer-coerced value (`offset`, `limit`, `maxDistance`, scalar `coordinates`)
    Integer(i64),
    /// Trimmed, unquoted string
    Scalar(String),
    /// Array of scalars and nested arrays
    Sequence(Vec<ParamValue>),
}

impl ParamValue {
    /// Build a sequence of scalars.
    #[must_use]
    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Sequence(items.into_iter().map(|s| Self::Scalar(s.into())).collect())
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Number of entries when the value is read as a list.
    ///
    /// A lone scalar or integer counts as a one-element list.
    #[must_use]
    pub fn list_len(&self) -> usize {
        match self {
            Self::Sequence(items) => items.len(),
            Self::Scalar(_) | Self::Integer(_) => 1,
        }
    }

    /// Compact array text with leaves written bare: `[[77.1,28.2]]`.
    ///
    /// Numbers decoded from an array keep their JSON text, so this is the
    /// array as the client sent it, minus whitespace.
    #[must_use]
    pub fn to_compact_string(&self) -> String {
        let mut out = String::new();
        self.write_compact(&mut out);
        out
    }

    fn write_compact(&self, out: &mut String) {
        match self {
            Self::Integer(n) => out.push_str(&n.to_string()),
            Self::Scalar(s) => out.push_str(s),
            Self::Sequence(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_compact(out);
                }
                out.push(']');
            }
        }
    }

    /// Count of `[` among the first `prefix` characters of
    /// [`Self::to_compact_string`]; `None` when the rendering is shorter.
    ///
    /// `[[[1,2]]]` is 3 for a prefix of 5, and so is `[[[]]]`. `[7,[8]]` is 2.
    #[must_use]
    pub fn bracket_depth(&self, prefix: usize) -> Option<usize> {
        let rendered = self.to_compact_string();
        let head: Vec<char> = rendered.chars().take(prefix).collect();
        if head.len() < prefix {
            return None;
        }
        Some(head.iter().filter(|&&c| c == '[').count())
    }

    /// Every non-sequence value, depth-first, in order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Self>) {
        match self {
            Self::Sequence(items) => {
                for item in items {
                    item.collect_leaves(out);
                }
            }
            leaf => out.push(leaf),
        }
    }

    /// Textual form of a leaf (integers rendered in decimal).
    #[must_use]
    pub fn leaf_text(&self) -> Option<String> {
        match self {
            Self::Scalar(s) => Some(s.clone()),
            Self::Integer(n) => Some(n.to_string()),
            Self::Sequence(_) => None,
        }
    }

    /// Convert a decoded JSON array element.
    ///
    /// Numbers and booleans keep their JSON text as a scalar. Returns `None`
    /// for `null` and objects, which have no parameter representation.
    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::Scalar(s)),
            serde_json::Value::Number(n) => Some(Self::Scalar(n.to_string())),
            serde_json::Value::Bool(b) => Some(Self::Scalar(b.to_string())),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Self::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Self::Sequence),
            serde_json::Value::Null | serde_json::Value::Object(_) => None,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Integer(n) => serde_json::Value::from(*n),
            Self::Scalar(s) => serde_json::Value::String(s.clone()),
            Self::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Scalar(s) => f.write_str(s),
            Self::Sequence(_) => write!(f, "{}", self.to_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors_match_shape() {
        let scalar = ParamValue::from("Point");
        assert_eq!(scalar.as_str(), Some("Point"));
        assert_eq!(scalar.as_integer(), None);
        assert!(scalar.as_sequence().is_none());

        let int = ParamValue::from(12_i64);
        assert_eq!(int.as_integer(), Some(12));
        assert_eq!(int.as_str(), None);

        let seq = ParamValue::strings(["a", "b"]);
        assert_eq!(seq.as_sequence().map(<[ParamValue]>::len), Some(2));
    }

    #[test]
    fn list_len_treats_scalars_as_single_entry() {
        assert_eq!(ParamValue::from("x").list_len(), 1);
        assert_eq!(ParamValue::strings(["a", "b", "c"]).list_len(), 3);
        assert_eq!(ParamValue::Sequence(vec![]).list_len(), 0);
    }

    #[test]
    fn compact_rendering_keeps_number_text() {
        let v = ParamValue::from_json(json!([[77.1, 28.2], [77.3, 28]])).unwrap();
        assert_eq!(v.to_compact_string(), "[[77.1,28.2],[77.3,28]]");
        assert_eq!(ParamValue::from(5_i64).to_compact_string(), "5");
        assert_eq!(ParamValue::Sequence(vec![]).to_compact_string(), "[]");
    }

    #[test]
    fn bracket_depth_counts_the_rendered_prefix() {
        let point = ParamValue::from_json(json!([77.1, 28.2])).unwrap();
        let line = ParamValue::from_json(json!([[1, 2], [3, 4]])).unwrap();
        let polygon = ParamValue::from_json(json!([[[1, 2], [3, 4], [1, 2]]])).unwrap();
        assert_eq!(point.bracket_depth(5), Some(1));
        assert_eq!(line.bracket_depth(5), Some(2));
        assert_eq!(polygon.bracket_depth(5), Some(3));

        // a nested second element still shows up in the prefix
        let mixed = ParamValue::from_json(json!([7, [8]])).unwrap();
        assert_eq!(mixed.bracket_depth(5), Some(2));
    }

    #[test]
    fn bracket_depth_needs_a_full_prefix() {
        for short in [json!([]), json!([5]), json!([[]])] {
            let v = ParamValue::from_json(short.clone()).unwrap();
            assert_eq!(v.bracket_depth(5), None, "{short}");
        }
        assert_eq!(ParamValue::from(12_345_i64).bracket_depth(5), Some(0));
    }

    #[test]
    fn leaves_are_depth_first() {
        let v = ParamValue::from_json(json!([["red", "blue"], ["green"]])).unwrap();
        let leaves: Vec<String> = v.leaves().iter().filter_map(|l| l.leaf_text()).collect();
        assert_eq!(leaves, vec!["red", "blue", "green"]);
    }

    #[test]
    fn from_json_keeps_number_text() {
        let v = ParamValue::from_json(json!([77.1, 28, true])).unwrap();
        assert_eq!(
            v,
            ParamValue::Sequence(vec![
                ParamValue::from("77.1"),
                ParamValue::from("28"),
                ParamValue::from("true"),
            ])
        );
    }

    #[test]
    fn from_json_rejects_null_and_objects() {
        assert!(ParamValue::from_json(json!([1, null])).is_none());
        assert!(ParamValue::from_json(json!([{ "a": 1 }])).is_none());
    }

    #[test]
    fn serializes_untagged() {
        let v = ParamValue::Sequence(vec![ParamValue::from("a"), ParamValue::from(3_i64)]);
        assert_eq!(serde_json::to_value(&v).unwrap(), json!(["a", 3]));
        assert_eq!(v.to_json(), json!(["a", 3]));
        assert_eq!(v.to_string(), r#"["a",3]"#);
    }
}
