use serde::{Serialize, Deserialize};
use std::fmt;

/// A value stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(x as f64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

/// Borrowed view of an entry handed out by `Cache::walk`.
///
/// Full-text entries are exposed as their stored text, without the key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'a> {
    Plain(&'a Value),
    Text(&'a str),
}

impl<'a> ValueRef<'a> {
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            ValueRef::Text(text) => Some(text),
            ValueRef::Plain(value) => value.as_str(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ValueRef::Plain(value) => (*value).clone(),
            ValueRef::Text(text) => Value::Text(text.to_string()),
        }
    }
}

/// Turns a value into the text kept by the full-text store.
pub trait ValueFormatter: Send + Sync {
    fn format(&self, value: &Value) -> String;

    fn name(&self) -> &str;
}

/// Formats values through their `Display` implementation.
pub struct DisplayFormatter;

impl ValueFormatter for DisplayFormatter {
    fn format(&self, value: &Value) -> String {
        match value {
            Value::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn name(&self) -> &str {
        "display"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formatter() {
        let formatter = DisplayFormatter;
        assert_eq!(formatter.format(&Value::from("hello world")), "hello world");
        assert_eq!(formatter.format(&Value::from(42)), "42");
        assert_eq!(formatter.format(&Value::from(2.5)), "2.5");
        assert_eq!(formatter.format(&Value::from(true)), "true");
        assert_eq!(formatter.format(&Value::Null), "");
        assert_eq!(formatter.format(&Value::from(&b"raw"[..])), "raw");
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(7i64).as_int(), Some(7));
        assert_eq!(Value::from(7).as_str(), None);
        assert!(Value::from(()).is_null());
    }

    #[test]
    fn test_value_ref_to_value() {
        let plain = Value::from(3);
        assert_eq!(ValueRef::Plain(&plain).to_value(), Value::Int(3));
        assert_eq!(ValueRef::Text("abc").to_value(), Value::Text("abc".to_string()));
        assert_eq!(ValueRef::Text("abc").as_text(), Some("abc"));
    }
}
