//! # Processing Report
//!
//! An ordered log of [`ProcessingMessage`]s with two independent severity
//! knobs:
//!
//! - **log level**: messages below it are discarded (never stored).
//! - **exception threshold**: a message at or above it aborts processing.
//!
//! ## Control Flow
//!
//! [`ProcessingReport::log`] returns `Result<LogOutcome, ProcessingException>`.
//! `Err` means "stored (if not filtered) and processing must stop now";
//! callers propagate it with `?`, so the abort path is visible at every call
//! site. The message that crossed the threshold is appended before the
//! `Err` is returned, so whoever holds the report still sees it along with
//! everything logged earlier.
//!
//! Changing either knob affects only messages logged afterwards.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::ProcessingException;
use crate::message::{LogLevel, ProcessingMessage};

/// What happened to a logged message that did not abort processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutcome {
    /// The level was below the log level; the message was dropped.
    Discarded,
    /// The message was appended.
    Stored,
}

/// The per-call diagnostic log. Not shared between concurrent validations.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingReport {
    messages: Vec<ProcessingMessage>,
    log_level: LogLevel,
    exception_threshold: LogLevel,
}

impl Default for ProcessingReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingReport {
    /// Store everything, throw only on FATAL.
    pub fn new() -> Self {
        Self::with_levels(LogLevel::Debug, LogLevel::Fatal)
    }

    /// A report with explicit log level and exception threshold.
    pub fn with_levels(log_level: LogLevel, exception_threshold: LogLevel) -> Self {
        Self {
            messages: Vec::new(),
            log_level,
            exception_threshold,
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    pub fn exception_threshold(&self) -> LogLevel {
        self.exception_threshold
    }

    pub fn set_exception_threshold(&mut self, level: LogLevel) {
        self.exception_threshold = level;
    }

    /// Log `message` at `level`.
    ///
    /// The message's level is overwritten with `level`. It is stored iff
    /// `level >= log_level`. If `level >= exception_threshold` the call
    /// returns `Err` carrying the message; any storing happens first.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessingException`] when `level` reaches the exception
    /// threshold.
    pub fn log(
        &mut self,
        level: LogLevel,
        mut message: ProcessingMessage,
    ) -> Result<LogOutcome, ProcessingException> {
        message.set_level(level);

        let outcome = if level < self.log_level {
            LogOutcome::Discarded
        } else {
            LogOutcome::Stored
        };
        let aborts = level >= self.exception_threshold;

        match (outcome, aborts) {
            (LogOutcome::Stored, true) => {
                self.messages.push(message.clone());
                Err(ProcessingException(message))
            }
            (LogOutcome::Stored, false) => {
                self.messages.push(message);
                Ok(outcome)
            }
            (LogOutcome::Discarded, true) => Err(ProcessingException(message)),
            (LogOutcome::Discarded, false) => Ok(outcome),
        }
    }

    pub fn debug(&mut self, message: ProcessingMessage) -> Result<LogOutcome, ProcessingException> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&mut self, message: ProcessingMessage) -> Result<LogOutcome, ProcessingException> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&mut self, message: ProcessingMessage) -> Result<LogOutcome, ProcessingException> {
        self.log(LogLevel::Warning, message)
    }

    pub fn error(&mut self, message: ProcessingMessage) -> Result<LogOutcome, ProcessingException> {
        self.log(LogLevel::Error, message)
    }

    pub fn fatal(&mut self, message: ProcessingMessage) -> Result<LogOutcome, ProcessingException> {
        self.log(LogLevel::Fatal, message)
    }

    /// Re-log every message of `other`, in order, through this report's
    /// filter and threshold.
    ///
    /// # Errors
    ///
    /// Stops at the first message reaching this report's threshold.
    pub fn merge(&mut self, other: &ProcessingReport) -> Result<(), ProcessingException> {
        for message in &other.messages {
            self.log(message.level(), message.clone())?;
        }
        Ok(())
    }

    /// True iff no stored message is ERROR or above.
    pub fn is_success(&self) -> bool {
        self.max_level().map_or(true, |level| level < LogLevel::Error)
    }

    /// The highest level among stored messages.
    pub fn max_level(&self) -> Option<LogLevel> {
        self.messages.iter().map(ProcessingMessage::level).max()
    }

    /// Stored messages in logging order.
    pub fn messages(&self) -> &[ProcessingMessage] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProcessingMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<ProcessingMessage> {
        self.messages
    }

    /// The stored messages as a JSON array.
    pub fn as_json(&self) -> Value {
        Value::Array(self.messages.iter().map(ProcessingMessage::as_json).collect())
    }
}

impl<'a> IntoIterator for &'a ProcessingReport {
    type Item = &'a ProcessingMessage;
    type IntoIter = std::slice::Iter<'a, ProcessingMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl Serialize for ProcessingReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_json().serialize(serializer)
    }
}

impl fmt::Display for ProcessingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.is_success() { "success" } else { "failure" };
        write!(f, "--- BEGIN MESSAGES ({verdict}) ---")?;
        for message in &self.messages {
            write!(f, "\n{message}")?;
        }
        write!(f, "\n---  END MESSAGES  ---")
    }
}
