//! JSON value tagging.
//!
//! The database stores untyped JSON; the device cares about the *declared
//! type* of a value so it can ignore writes of the wrong shape.  Tags follow
//! the names the Firebase client libraries report (`"boolean"`, `"int"`, …).

use core::fmt;

use serde_json::Value;

/// Declared type of a value read from the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTag {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Json,
}

impl ValueTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Json => "json",
        }
    }

    /// Classify a decoded JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Json,
        }
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value observed on a watched path together with its type tag.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteValue {
    tag: ValueTag,
    data: Value,
}

impl RemoteValue {
    pub fn from_json(data: Value) -> Self {
        Self {
            tag: ValueTag::of(&data),
            data,
        }
    }

    pub fn boolean(b: bool) -> Self {
        Self::from_json(Value::Bool(b))
    }

    pub fn integer(i: i64) -> Self {
        Self::from_json(Value::from(i))
    }

    pub fn string(s: &str) -> Self {
        Self::from_json(Value::from(s))
    }

    pub fn tag(&self) -> ValueTag {
        self.tag
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// `Some` only for boolean-tagged values.
    pub fn as_bool(&self) -> Option<bool> {
        match (self.tag, &self.data) {
            (ValueTag::Boolean, Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// `Some` only for integer-tagged values that fit `i64`.
    pub fn as_int(&self) -> Option<i64> {
        match self.tag {
            ValueTag::Integer => self.data.as_i64(),
            _ => None,
        }
    }
}

/// Request body for an integer write.
pub fn encode_int(value: i64) -> String {
    value.to_string()
}
