//! Schema-flexible JSON documents.
//!
//! Starbound assets are JSON with `//` and `/* */` comments. [`Document`] parses them
//! with `jsonc-parser` into a `serde_json::Value` whose maps keep their key order, so
//! fields the generator does not know about survive a load/save round trip untouched.
//! Typed accessors cover the handful of fields the generator reads.

use serde_json::{Map, Value};
use thiserror::Error;

/// Reasons a file is not a JSON document.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("not UTF-8 text: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error(transparent)]
    Syntax(#[from] jsonc_parser::errors::ParseError),

    #[error("file contains no JSON value")]
    Empty,
}

/// A parsed JSON document.
///
/// A missing field reads as `None`, and so does an explicit `null`. Setting a field
/// creates it, turning a non-object root into an empty object first.
#[derive(Debug, Clone, PartialEq)]
pub struct Document(Value);

impl Default for Document {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Parses JSON-with-comments text. A leading UTF-8 BOM is ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(bytes)?;
        let text = text.trim_start_matches('\u{feff}');
        let value = jsonc_parser::parse_to_serde_value(text, &Default::default())?
            .ok_or(ParseError::Empty)?;
        Ok(Self(value))
    }

    /// Pretty-printed JSON with a trailing newline, keys in document order.
    pub fn to_pretty_bytes(&self) -> serde_json::Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(&self.0)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// `true` for `null`, `{}` and `[]`.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.0 {
            map.insert(key.into(), value.into());
        }
    }

    /// Removes a field, keeping the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        match &mut self.0 {
            Value::Object(map) => map.shift_remove(key),
            _ => None,
        }
    }

    pub fn object_type(&self) -> Option<&str> {
        self.get_str("objectType")
    }

    pub fn is_farmable(&self) -> bool {
        self.object_type() == Some("farmable")
    }

    pub fn orientations(&self) -> Option<&Vec<Value>> {
        self.get("orientations").and_then(Value::as_array)
    }

    pub fn frame_grid(&self) -> Option<&Value> {
        self.get("frameGrid")
    }

    pub fn aliases(&self) -> Option<&Value> {
        self.get("aliases")
    }
}
