//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout jsv. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Pointer and resolution errors are plain values: the validation engine
//!   converts them into report messages and decides how loudly to fail.
//! - [`ProcessingException`] is the only error that aborts a validation run.
//!   It carries exactly one [`ProcessingMessage`], the one whose level
//!   reached the report's exception threshold.

use thiserror::Error;

use crate::message::ProcessingMessage;

/// Error parsing or resolving a JSON Pointer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// The textual form is not a valid RFC 6901 pointer.
    #[error("malformed JSON Pointer {input:?}: {reason}")]
    Malformed {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A token did not match any node.
    #[error("JSON Pointer {pointer:?} does not resolve (resolved up to {resolved:?})")]
    NotFound {
        /// The full pointer being resolved.
        pointer: String,
        /// The longest prefix that did resolve.
        resolved: String,
    },
}

/// Error following a `$ref` inside a schema tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The `$ref` value is not a usable URI reference.
    #[error("invalid $ref {reference:?}: {reason}")]
    InvalidRef {
        /// The raw `$ref` value.
        reference: String,
        /// Why it could not be used.
        reason: String,
    },

    /// The referenced document is not loaded in the schema store.
    #[error("$ref {reference:?} points to unknown document {uri:?}")]
    UnknownDocument {
        /// The raw `$ref` value.
        reference: String,
        /// The absolute document URI that was looked up.
        uri: String,
    },

    /// The referenced document exists but the pointer does not resolve.
    #[error("$ref {reference:?} cannot be resolved: {source}")]
    NotFound {
        /// The raw `$ref` value.
        reference: String,
        /// The underlying pointer failure.
        #[source]
        source: PointerError,
    },

    /// The reference chain loops back on itself before reaching a non-`$ref` schema.
    #[error("$ref {reference:?} closes a reference cycle: {}", path.join(" -> "))]
    Cycle {
        /// The raw `$ref` value that closed the cycle.
        reference: String,
        /// Every location visited on the resolution path, in order.
        path: Vec<String>,
    },
}

/// Error registering a document in the schema store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The document URI is not a valid absolute URI.
    #[error("invalid document URI {uri:?}: {reason}")]
    InvalidUri {
        /// The rejected URI.
        uri: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A different document is already registered under this URI.
    #[error("a different document is already registered as {uri:?}")]
    DuplicateDocument {
        /// The conflicting URI.
        uri: String,
    },
}

/// Processing aborted because a message reached the exception threshold.
///
/// Messages logged before the abort stay in the report that was being
/// filled; the exception carries only the triggering message.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}: {}", .0.level(), .0.message())]
pub struct ProcessingException(pub ProcessingMessage);

impl ProcessingException {
    /// The message that triggered the abort.
    pub fn message(&self) -> &ProcessingMessage {
        &self.0
    }

    /// Consume the exception, returning the triggering message.
    pub fn into_message(self) -> ProcessingMessage {
        self.0
    }
}
