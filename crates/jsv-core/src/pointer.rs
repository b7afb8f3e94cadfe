//! # JSON Pointer: RFC 6901 Addressing
//!
//! Defines `JsonPointer`, an ordered sequence of reference tokens that
//! addresses one node inside a JSON tree.
//!
//! ## Invariant
//!
//! Resolving a pointer against a document either yields exactly one node or
//! fails with [`PointerError::NotFound`]. There are no partial matches: an
//! array token must be a canonical decimal index (no sign, no leading zero)
//! within bounds, and an object token must name an existing member.
//!
//! Pointers are immutable values. [`JsonPointer::append`] returns a new
//! pointer and never modifies the receiver.

use std::fmt;
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::PointerError;

/// An RFC 6901 JSON Pointer.
///
/// The empty pointer addresses the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsonPointer {
    tokens: Vec<String>,
}

impl JsonPointer {
    /// The pointer addressing the document root.
    pub fn root() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Build a pointer from raw (unescaped) tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the RFC 6901 string form (`""`, `"/a/0/b~1c"`).
    ///
    /// # Errors
    ///
    /// Returns [`PointerError::Malformed`] if the text is non-empty and does
    /// not start with `/`, or contains an escape other than `~0` or `~1`.
    pub fn parse(text: &str) -> Result<Self, PointerError> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        let rest = text.strip_prefix('/').ok_or_else(|| PointerError::Malformed {
            input: text.to_string(),
            reason: "pointer must be empty or start with '/'".to_string(),
        })?;

        let tokens = rest
            .split('/')
            .map(|raw| unescape_token(raw).map_err(|reason| PointerError::Malformed {
                input: text.to_string(),
                reason,
            }))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { tokens })
    }

    /// Parse the URI fragment form used after `#` in a `$ref`.
    ///
    /// Percent-escapes are decoded before the RFC 6901 rules apply. A `%`
    /// not followed by two hex digits is kept as is; escapes that decode to
    /// invalid UTF-8 are rejected.
    pub fn from_fragment(fragment: &str) -> Result<Self, PointerError> {
        let decoded = percent_decode_str(fragment)
            .decode_utf8()
            .map_err(|e| PointerError::Malformed {
                input: fragment.to_string(),
                reason: format!("percent-decoded URI fragment is not UTF-8: {e}"),
            })?;
        Self::parse(&decoded)
    }

    /// Return a new pointer with `token` appended.
    pub fn append(&self, token: impl Into<String>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(token.into());
        Self { tokens }
    }

    /// Return a new pointer with an array index appended.
    pub fn append_index(&self, index: usize) -> Self {
        self.append(index.to_string())
    }

    /// The pointer to the parent node, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.tokens.is_empty() {
            return None;
        }
        let mut tokens = self.tokens.clone();
        tokens.pop();
        Some(Self { tokens })
    }

    /// Returns true if this pointer addresses the document root.
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The raw, unescaped tokens.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the pointer has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns true if `self` is `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &JsonPointer) -> bool {
        other.tokens.starts_with(&self.tokens)
    }

    /// Resolve this pointer against `document`.
    ///
    /// # Errors
    ///
    /// Returns [`PointerError::NotFound`] naming the longest prefix that did
    /// resolve when any token fails to match.
    pub fn resolve<'a>(&self, document: &'a Value) -> Result<&'a Value, PointerError> {
        let mut node = document;
        for (depth, token) in self.tokens.iter().enumerate() {
            let next = match node {
                Value::Object(map) => map.get(token),
                Value::Array(items) => parse_index(token).and_then(|i| items.get(i)),
                _ => None,
            };
            node = next.ok_or_else(|| PointerError::NotFound {
                pointer: self.to_string(),
                resolved: Self::from_tokens(self.tokens[..depth].iter().cloned()).to_string(),
            })?;
        }
        Ok(node)
    }

    /// Resolve this pointer, returning `None` instead of an error.
    pub fn get<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.resolve(document).ok()
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            f.write_str("/")?;
            for c in token.chars() {
                match c {
                    '~' => f.write_str("~0")?,
                    '/' => f.write_str("~1")?,
                    other => write!(f, "{other}")?,
                }
            }
        }
        Ok(())
    }
}

impl FromStr for JsonPointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for JsonPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPointer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Canonical array index: `0` or a digit string without a leading zero.
fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    token.parse().ok()
}

fn unescape_token(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            Some(other) => return Err(format!("invalid escape sequence '~{other}'")),
            None => return Err("dangling '~' at end of token".to_string()),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_root() {
        let ptr = JsonPointer::parse("").unwrap();
        assert!(ptr.is_root());
        assert_eq!(ptr.to_string(), "");
    }

    #[test]
    fn test_parse_and_display_escapes() {
        let ptr = JsonPointer::parse("/a~1b/c~0d/0").unwrap();
        assert_eq!(ptr.tokens(), &["a/b", "c~d", "0"]);
        assert_eq!(ptr.to_string(), "/a~1b/c~0d/0");
    }

    #[test]
    fn test_parse_rejects_missing_slash() {
        assert!(matches!(
            JsonPointer::parse("a/b"),
            Err(PointerError::Malformed { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_bad_escape() {
        assert!(JsonPointer::parse("/a~2").is_err());
        assert!(JsonPointer::parse("/a~").is_err());
    }

    #[test]
    fn test_append_does_not_mutate() {
        let base = JsonPointer::parse("/properties").unwrap();
        let child = base.append("name");
        assert_eq!(base.to_string(), "/properties");
        assert_eq!(child.to_string(), "/properties/name");
        assert_eq!(child.parent(), Some(base));
    }

    #[test]
    fn test_resolve_object_and_array() {
        let doc = json!({"a": [10, {"b": true}]});
        let ptr = JsonPointer::parse("/a/1/b").unwrap();
        assert_eq!(ptr.resolve(&doc).unwrap(), &json!(true));
        let ptr = JsonPointer::parse("/a/0").unwrap();
        assert_eq!(ptr.resolve(&doc).unwrap(), &json!(10));
    }

    #[test]
    fn test_resolve_rejects_non_canonical_index() {
        let doc = json!([1, 2, 3]);
        assert!(JsonPointer::parse("/01").unwrap().resolve(&doc).is_err());
        assert!(JsonPointer::parse("/-").unwrap().resolve(&doc).is_err());
        assert!(JsonPointer::parse("/3").unwrap().resolve(&doc).is_err());
    }

    #[test]
    fn test_resolve_not_found_reports_resolved_prefix() {
        let doc = json!({"a": {"b": 1}});
        let err = JsonPointer::parse("/a/x/y").unwrap().resolve(&doc).unwrap_err();
        match err {
            PointerError::NotFound { pointer, resolved } => {
                assert_eq!(pointer, "/a/x/y");
                assert_eq!(resolved, "/a");
            }
            other => panic!("expected NotFound, got {other}"),
        }
    }

    #[test]
    fn test_resolve_through_scalar_fails() {
        let doc = json!({"a": 1});
        assert!(JsonPointer::parse("/a/b").unwrap().resolve(&doc).is_err());
    }

    #[test]
    fn test_from_fragment_percent_decoding() {
        let ptr = JsonPointer::from_fragment("/definitions/a%20b").unwrap();
        assert_eq!(ptr.tokens(), &["definitions", "a b"]);
        assert!(JsonPointer::from_fragment("/bad%FF").is_err());
    }

    #[test]
    fn test_from_fragment_decodes_before_unescaping() {
        // %7E is '~', so "%7E1" only becomes an escape after decoding.
        let ptr = JsonPointer::from_fragment("/a%7E1b/100%25").unwrap();
        assert_eq!(ptr.tokens(), &["a/b", "100%"]);

        let ptr = JsonPointer::from_fragment("/caf%C3%A9/%zz").unwrap();
        assert_eq!(ptr.tokens(), &["café", "%zz"]);

        assert_eq!(JsonPointer::from_fragment("%2Fa").unwrap().tokens(), &["a"]);
        assert!(JsonPointer::from_fragment("/a%7E2").is_err());
    }

    #[test]
    fn test_is_prefix_of() {
        let a = JsonPointer::parse("/a").unwrap();
        let ab = JsonPointer::parse("/a/b").unwrap();
        assert!(a.is_prefix_of(&ab));
        assert!(!ab.is_prefix_of(&a));
        assert!(JsonPointer::root().is_prefix_of(&a));
    }

    #[test]
    fn test_serde_as_string() {
        let ptr = JsonPointer::parse("/x/0").unwrap();
        let json = serde_json::to_value(&ptr).unwrap();
        assert_eq!(json, json!("/x/0"));
        let back: JsonPointer = serde_json::from_value(json).unwrap();
        assert_eq!(back, ptr);
    }
}
