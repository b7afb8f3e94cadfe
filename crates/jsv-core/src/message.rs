//! # Processing Messages
//!
//! Defines [`LogLevel`], [`Domain`], and [`ProcessingMessage`], the unit of
//! diagnostic output produced by every stage of schema processing.
//!
//! ## Serialization Contract
//!
//! A message serializes to a JSON object whose first two members are always
//! `level` (one of `DEBUG`, `INFO`, `WARNING`, `ERROR`, `FATAL`) and
//! `message`. Optional well-known members follow in insertion order:
//! `domain`, `keyword`, `schema`, `instance`, then keyword-specific fields.
//! Other tooling reads this shape, so field names never change.
//!
//! Level ordering is by severity ordinal, never by the string form:
//! `DEBUG < INFO < WARNING < ERROR < FATAL`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::pointer::JsonPointer;

/// Message severity. Totally ordered by declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Fine-grained tracing of processing decisions.
    Debug,
    /// Informational, never affects success.
    Info,
    /// Suspicious but tolerated (unknown keyword, unsupported format).
    Warning,
    /// A conformance violation; the report is no longer a success.
    Error,
    /// Processing cannot meaningfully continue.
    Fatal,
}

impl LogLevel {
    /// All levels in ascending severity.
    pub fn all() -> &'static [LogLevel] {
        &[
            Self::Debug,
            Self::Info,
            Self::Warning,
            Self::Error,
            Self::Fatal,
        ]
    }

    /// The wire form of this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    /// Case-insensitive; `WARN` is accepted as an alias of `WARNING`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "FATAL" => Ok(Self::Fatal),
            _ => Err(format!(
                "unknown log level {s:?}; expected one of DEBUG, INFO, WARNING, ERROR, FATAL"
            )),
        }
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// The processing stage a message originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// A schema keyword's value has the wrong shape.
    Syntax,
    /// The instance does not conform to a well-formed keyword.
    Validation,
    /// A `$ref` could not be followed.
    Resolution,
    /// An engine invariant was violated (cache, chain, depth, loops).
    Processing,
}

impl Domain {
    /// The wire form of this domain.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Validation => "validation",
            Self::Resolution => "resolution",
            Self::Processing => "processing",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable, ordered set of named fields describing one finding.
///
/// Built with consuming `with_*` methods; once handed to a
/// [`ProcessingReport`](crate::ProcessingReport) only the level is
/// rewritten, to the level it was logged at.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingMessage {
    level: LogLevel,
    message: String,
    fields: Map<String, Value>,
}

impl ProcessingMessage {
    /// A new INFO-level message with the given text and no extra fields.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Info,
            message: message.into(),
            fields: Map::new(),
        }
    }

    /// Set the level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the `domain` field.
    pub fn with_domain(self, domain: Domain) -> Self {
        self.put("domain", domain.as_str())
    }

    /// Set the `keyword` field.
    pub fn with_keyword(self, keyword: &str) -> Self {
        self.put("keyword", keyword)
    }

    /// Set the `instance` field to `{"pointer": "<ptr>"}`.
    pub fn with_instance(self, pointer: &JsonPointer) -> Self {
        let mut node = Map::new();
        node.insert("pointer".to_string(), Value::String(pointer.to_string()));
        self.put("instance", Value::Object(node))
    }

    /// Add an arbitrary field. `level` and `message` are reserved and
    /// are routed to their dedicated slots.
    pub fn put(mut self, key: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match key {
            "level" => {
                if let Some(level) = value.as_str().and_then(|s| s.parse().ok()) {
                    self.level = level;
                }
            }
            "message" => {
                self.message = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
            }
            _ => {
                self.fields.insert(key.to_string(), value);
            }
        }
        self
    }

    /// The severity.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// The human-readable text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Look up a field. `level` and `message` are returned as strings.
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "level" => Some(Value::String(self.level.as_str().to_string())),
            "message" => Some(Value::String(self.message.clone())),
            _ => self.fields.get(key).cloned(),
        }
    }

    /// The `domain` field, if set to a known domain.
    pub fn domain(&self) -> Option<Domain> {
        self.fields
            .get("domain")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// The `keyword` field, if set.
    pub fn keyword(&self) -> Option<&str> {
        self.fields.get("keyword").and_then(Value::as_str)
    }

    /// The JSON form: `level`, `message`, then every other field in
    /// insertion order.
    pub fn as_json(&self) -> Value {
        let mut out = Map::with_capacity(self.fields.len() + 2);
        out.insert("level".to_string(), Value::String(self.level.as_str().to_string()));
        out.insert("message".to_string(), Value::String(self.message.clone()));
        for (k, v) in &self.fields {
            out.insert(k.clone(), v.clone());
        }
        Value::Object(out)
    }

    pub(crate) fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }
}

impl Default for ProcessingMessage {
    fn default() -> Self {
        Self::new("(no message)")
    }
}

impl Serialize for ProcessingMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_json().serialize(serializer)
    }
}

impl fmt::Display for ProcessingMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)?;
        for (k, v) in &self.fields {
            write!(f, "\n    {k}: {v}")?;
        }
        Ok(())
    }
}
