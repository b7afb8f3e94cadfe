//! Date and time formats.
//!
//! `date` and `time` are fixed-width patterns checked with `chrono`'s
//! strftime parser. The width check rejects the unpadded forms (`2012-1-5`)
//! that `chrono` would otherwise accept. `date-time` is RFC 3339.

use chrono::{DateTime, NaiveDate, NaiveTime};

use super::FormatAttribute;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Date,
    Time,
}

/// A pattern-driven date or time attribute.
#[derive(Debug, Clone, Copy)]
pub struct DateFormatAttribute {
    kind: Kind,
    description: &'static str,
    pattern: &'static str,
    width: usize,
}

impl DateFormatAttribute {
    /// `YYYY-MM-DD`.
    pub fn date() -> Self {
        Self {
            kind: Kind::Date,
            description: "date",
            pattern: "%Y-%m-%d",
            width: 10,
        }
    }

    /// `hh:mm:ss`.
    pub fn time() -> Self {
        Self {
            kind: Kind::Time,
            description: "time",
            pattern: "%H:%M:%S",
            width: 8,
        }
    }
}

impl FormatAttribute for DateFormatAttribute {
    fn description(&self) -> &str {
        self.description
    }

    fn is_valid(&self, value: &str) -> bool {
        if value.len() != self.width || !value.is_ascii() {
            return false;
        }
        match self.kind {
            Kind::Date => NaiveDate::parse_from_str(value, self.pattern).is_ok(),
            Kind::Time => NaiveTime::parse_from_str(value, self.pattern).is_ok(),
        }
    }
}

/// RFC 3339 `date-time`.
#[derive(Debug, Clone, Copy)]
pub struct DateTimeAttribute;

impl FormatAttribute for DateTimeAttribute {
    fn description(&self) -> &str {
        "date-time"
    }

    fn is_valid(&self, value: &str) -> bool {
        DateTime::parse_from_rfc3339(value).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date() {
        let date = DateFormatAttribute::date();
        assert!(date.is_valid("2012-02-29"));
        assert!(!date.is_valid("2011-02-29"));
        assert!(!date.is_valid("2012-13-01"));
        assert!(!date.is_valid("2012-1-5"));
        assert!(!date.is_valid("2012-01-05T00:00:00Z"));
        assert!(!date.is_valid(""));
    }

    #[test]
    fn test_time() {
        let time = DateFormatAttribute::time();
        assert!(time.is_valid("23:59:59"));
        assert!(time.is_valid("00:00:00"));
        assert!(!time.is_valid("24:00:00"));
        assert!(!time.is_valid("1:02:03"));
        assert!(!time.is_valid("12:30"));
    }

    #[test]
    fn test_date_time() {
        assert!(DateTimeAttribute.is_valid("2012-04-01T12:34:56Z"));
        assert!(DateTimeAttribute.is_valid("2012-04-01T12:34:56.789+02:00"));
        assert!(!DateTimeAttribute.is_valid("2012-04-01 12:34"));
        assert!(!DateTimeAttribute.is_valid("2012-04-01"));
    }
}
