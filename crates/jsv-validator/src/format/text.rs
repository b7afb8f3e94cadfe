//! Formats over free-form strings.

use regex::Regex;
use uuid::Uuid;

use super::FormatAttribute;

/// A string that compiles as a regular expression.
#[derive(Debug, Clone, Copy)]
pub struct RegexAttribute;

impl FormatAttribute for RegexAttribute {
    fn description(&self) -> &str {
        "regular expression"
    }

    fn is_valid(&self, value: &str) -> bool {
        Regex::new(value).is_ok()
    }
}

/// Hyphenated RFC 4122 UUID.
#[derive(Debug, Clone, Copy)]
pub struct UuidAttribute;

impl FormatAttribute for UuidAttribute {
    fn description(&self) -> &str {
        "UUID"
    }

    fn is_valid(&self, value: &str) -> bool {
        // Uuid::parse_str also takes the simple, braced and urn forms.
        value.len() == 36 && Uuid::parse_str(value).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex() {
        assert!(RegexAttribute.is_valid("^a+$"));
        assert!(!RegexAttribute.is_valid("(unclosed"));
    }

    #[test]
    fn test_uuid() {
        assert!(UuidAttribute.is_valid("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(!UuidAttribute.is_valid("67e5504410b1426f9247bb680e5fe0c8"));
        assert!(!UuidAttribute.is_valid("67e55044-10b1-426f-9247-bb680e5fe0cz"));
    }
}
