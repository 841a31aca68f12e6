//! Token-level access to the JSON tree.
//!
//! Decoding works on a parsed `serde_json::Value`; [`Reader`] exposes the
//! handful of operations the resource codec needs (open an object, walk an
//! array, peek for null, read a string) and turns shape mismatches into
//! [`DecodeError`]s. Skipping a value is simply not reading it.
//!
//! [`ObjectWriter`] is the encoding counterpart. Members come out in
//! insertion order.

use serde_json::{Map, Value};

use crate::error::DecodeError;

// =============================================================================
// DECODING
// =============================================================================

/// Returns the JSON kind of a value, for error messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Cursor over one JSON value.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    value: &'a Value,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at `value`.
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// Returns the underlying value.
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Returns true if the current value is JSON `null`.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// Returns the kind of the current value without consuming it.
    pub fn peek(&self) -> &'static str {
        kind_of(self.value)
    }

    /// Opens the current value as an object.
    pub fn read_object(&self, context: &'static str) -> Result<Members<'a>, DecodeError> {
        match self.value {
            Value::Object(map) => Ok(Members { iter: map.iter() }),
            other => Err(DecodeError::UnexpectedType {
                context,
                expected: "object",
                found: kind_of(other),
            }),
        }
    }

    /// Opens the current value as an array.
    pub fn read_array(&self, context: &'static str) -> Result<Elements<'a>, DecodeError> {
        match self.value {
            Value::Array(items) => Ok(Elements { iter: items.iter() }),
            other => Err(DecodeError::UnexpectedType {
                context,
                expected: "array",
                found: kind_of(other),
            }),
        }
    }

    /// Reads the current value as a string.
    #[inline]
    pub fn read_str(&self, context: &'static str) -> Result<&'a str, DecodeError> {
        match self.value {
            Value::String(s) => Ok(s),
            other => Err(DecodeError::UnexpectedType {
                context,
                expected: "string",
                found: kind_of(other),
            }),
        }
    }

    /// Looks up a member of the current object without consuming it.
    ///
    /// Returns `None` if the value is not an object or has no such member.
    pub fn member(&self, name: &str) -> Option<Reader<'a>> {
        self.value.get(name).map(Reader::new)
    }
}

/// Members of an object, in document order.
#[derive(Debug)]
pub struct Members<'a> {
    iter: serde_json::map::Iter<'a>,
}

impl<'a> Iterator for Members<'a> {
    type Item = (&'a str, Reader<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .next()
            .map(|(name, value)| (name.as_str(), Reader::new(value)))
    }
}

/// Elements of an array, in document order.
#[derive(Debug)]
pub struct Elements<'a> {
    iter: std::slice::Iter<'a, Value>,
}

impl<'a> Iterator for Elements<'a> {
    type Item = Reader<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(Reader::new)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for one JSON object.
#[derive(Debug, Clone, Default)]
pub struct ObjectWriter {
    members: Map<String, Value>,
}

impl ObjectWriter {
    /// Creates an empty object writer.
    pub fn new() -> Self {
        Self { members: Map::new() }
    }

    /// Returns true if no members have been written.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Writes a member.
    #[inline]
    pub fn write(&mut self, name: impl Into<String>, value: Value) {
        self.members.insert(name.into(), value);
    }

    /// Writes a string member.
    pub fn write_str(&mut self, name: impl Into<String>, value: &str) {
        self.write(name, Value::String(value.to_owned()));
    }

    /// Writes a string member, or `null` when absent.
    pub fn write_opt_str(&mut self, name: impl Into<String>, value: Option<&str>) {
        let value = value.map_or(Value::Null, |s| Value::String(s.to_owned()));
        self.write(name, value);
    }

    /// Finishes the object.
    pub fn into_value(self) -> Value {
        Value::Object(self.members)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_read_object_in_document_order() {
        let value = json!({"b": 1, "a": null, "c": "x"});
        let names: Vec<_> = Reader::new(&value)
            .read_object("test")
            .unwrap()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn test_shape_mismatch_reports_kinds() {
        let value = json!([1, 2]);
        let err = Reader::new(&value).read_object("relationships").unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedType {
                context: "relationships",
                expected: "object",
                found: "array",
            }
        );

        let value = json!(5);
        assert!(matches!(
            Reader::new(&value).read_str("id"),
            Err(DecodeError::UnexpectedType { found: "number", .. })
        ));
    }

    #[test]
    fn test_peek_null() {
        let value = json!({"x": null});
        let member = Reader::new(&value).member("x").unwrap();
        assert!(member.is_null());
        assert_eq!(member.peek(), "null");
        assert!(Reader::new(&value).member("y").is_none());
    }

    #[test]
    fn test_writer_preserves_insertion_order() {
        let mut writer = ObjectWriter::new();
        assert!(writer.is_empty());
        writer.write_str("type", "article");
        writer.write_opt_str("id", None);
        writer.write("attributes", json!({}));
        let out = serde_json::to_string(&writer.into_value()).unwrap();
        assert_eq!(out, r#"{"type":"article","id":null,"attributes":{}}"#);
    }
}
