//! # Instance Types
//!
//! The seven JSON Schema primitive types. Every JSON value maps to exactly
//! one of them; the mapping is a pure function of the value.
//!
//! A number is an `integer` when it has no fractional part: `1` and `1.0`
//! are both integers, `1.5` is a number. Non-finite floats cannot occur in
//! a `serde_json::Value`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON Schema primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl InstanceType {
    /// All seven types, alphabetically.
    pub fn all() -> &'static [InstanceType] {
        &[
            Self::Array,
            Self::Boolean,
            Self::Integer,
            Self::Null,
            Self::Number,
            Self::Object,
            Self::String,
        ]
    }

    /// Determine the type of a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Self::Integer
                } else if n.as_f64().is_some_and(|f| f.fract() == 0.0) {
                    Self::Integer
                } else {
                    Self::Number
                }
            }
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// The schema keyword name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Null => "null",
            Self::Number => "number",
            Self::Object => "object",
            Self::String => "string",
        }
    }

    /// Whether a value of type `self` satisfies a `type` constraint naming
    /// `wanted`. `integer` satisfies `number`.
    pub fn satisfies(&self, wanted: InstanceType) -> bool {
        *self == wanted || (*self == Self::Integer && wanted == Self::Number)
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown primitive type {s:?}"))
    }
}
