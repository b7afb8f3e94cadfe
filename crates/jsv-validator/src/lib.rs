//! # jsv-validator: The Validation Engine
//!
//! Validates JSON instances against JSON Schema (draft v4) and reports
//! every finding as a severity-leveled [`ProcessingMessage`].
//!
//! ## Pipeline
//!
//! ```text
//! validate(schema, instance, options)
//!   -> SchemaTree, $ref resolved
//!   -> SchemaContext (tree + instance type)
//!   -> ValidatorCache::get_or_build -> ValidatorChain
//!        (syntax checks, then keyword validators)
//!   -> run validators, recursing for nested instance data
//!   -> ProcessingReport or ProcessingException
//! ```
//!
//! ## Crate Policy
//!
//! - Registries are read-only after construction and shared across threads.
//! - Validator chains are built at most once per equivalence class of
//!   [`SchemaContext`](jsv_core::SchemaContext).
//! - No `unwrap()` outside tests. Aborts travel as
//!   [`ProcessingException`] through `?`.
//!
//! ## Example
//!
//! ```
//! use jsv_validator::{validate, ValidationOptions};
//! use serde_json::json;
//!
//! let schema = json!({"type": "object", "required": ["name"]});
//! let report = validate(&schema, &json!({}), &ValidationOptions::default()).unwrap();
//! assert!(!report.is_success());
//! ```

pub mod cache;
pub mod chain;
pub mod data;
pub mod equality;
pub mod format;
pub mod keywords;
pub mod options;
pub mod processor;
pub mod syntax;

use std::sync::OnceLock;

pub use cache::{BuildOnceCache, CacheError};
pub use chain::{ValidatorCache, ValidatorChain};
pub use data::ValidationData;
pub use format::{FormatAttribute, FormatRegistry, FormatRegistryError};
pub use keywords::{KeywordDescriptor, KeywordLibrary, KeywordValidator};
pub use options::{OptionsError, ValidationOptions, DEFAULT_MAX_DEPTH};
pub use processor::{ValidationProcessor, ValidationProcessorBuilder, ValidationRun};
pub use syntax::{SyntaxChecker, SyntaxCheckerRegistry};

pub use jsv_core::{LogLevel, ProcessingException, ProcessingMessage, ProcessingReport};

use serde_json::Value;

static DEFAULT_PROCESSOR: OnceLock<ValidationProcessor> = OnceLock::new();

/// The process-wide processor with built-in registries, created on first use.
///
/// Its validator cache keeps a chain for every distinct schema validated
/// through [`validate`] for the life of the process. Long-running callers
/// that see unbounded schema variety should call
/// [`ValidationProcessor::clear_cache`] now and then, or own a processor.
pub fn default_processor() -> &'static ValidationProcessor {
    DEFAULT_PROCESSOR.get_or_init(ValidationProcessor::new)
}

/// Validate `instance` against `schema` with the default processor.
///
/// # Errors
///
/// [`ProcessingException`] if a message reaches
/// `options.exception_threshold`.
pub fn validate(
    schema: &Value,
    instance: &Value,
    options: &ValidationOptions,
) -> Result<ProcessingReport, ProcessingException> {
    default_processor().validate(schema, instance, options)
}
