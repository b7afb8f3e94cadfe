//! # Validation Processor
//!
//! The engine entry point. A [`ValidationProcessor`] owns the read-only
//! registries, the preloaded schema documents and the validator cache. It
//! is `Send + Sync`; share one across threads and call it concurrently.
//!
//! ## One Validation Step
//!
//! [`ValidationRun::validate_child`] applies one schema to one instance
//! node:
//!
//! 1. **Depth guard**: more than `max_depth` nested steps is FATAL
//!    (domain `processing`).
//! 2. **Resolve**: follow the `$ref` chain. A reference cycle is FATAL
//!    (domain `resolution`). Any other resolution failure is an ERROR and
//!    the subschema is skipped.
//! 3. **Loop check**: re-entering the same resolved schema location for
//!    the same instance pointer on the current path is FATAL (domain
//!    `processing`).
//! 4. **Chain**: form the [`SchemaContext`] and fetch its chain from the
//!    cache, building it on a miss.
//! 5. **Schema messages**: replay the chain's syntax and configuration
//!    messages, tagged with this location, once per location per run.
//!    Inside a combinator branch they are held back and logged to the
//!    outer report when the branch returns, so they count whatever the
//!    branch outcome.
//! 6. **Keywords**: run each validator; container keywords recurse
//!    through this same method.
//!
//! Every finding goes to the report first. Whether it aborts is decided
//! only by the report's exception threshold.

use std::collections::HashSet;
use std::sync::Arc;

use jsv_core::{
    Domain, InstanceType, JsonPointer, ProcessingException, ProcessingMessage, ProcessingReport,
    ResolutionError, SchemaContext, SchemaLocation, SchemaStore, SchemaTree, StoreError,
    ANONYMOUS_URI,
};
use serde_json::Value;

use crate::chain::{ValidatorCache, ValidatorChain};
use crate::data::ValidationData;
use crate::format::{FormatAttribute, FormatRegistry, FormatRegistryError};
use crate::keywords::{KeywordDescriptor, KeywordLibrary};
use crate::options::ValidationOptions;
use crate::syntax::{SyntaxChecker, SyntaxCheckerRegistry};

fn processing_message(text: impl Into<String>) -> ProcessingMessage {
    ProcessingMessage::new(text).with_domain(Domain::Processing)
}

/// Log `message` at FATAL and return the resulting exception.
fn abort(report: &mut ProcessingReport, message: ProcessingMessage) -> ProcessingException {
    match report.fatal(message.clone()) {
        Err(e) => e,
        Ok(_) => ProcessingException(message),
    }
}

/// Shared validation engine.
#[derive(Debug, Default)]
pub struct ValidationProcessor {
    syntax: SyntaxCheckerRegistry,
    formats: FormatRegistry,
    keywords: KeywordLibrary,
    store: Arc<SchemaStore>,
    cache: ValidatorCache,
}

impl ValidationProcessor {
    /// A processor with the built-in registries and no preloaded documents.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ValidationProcessorBuilder {
        ValidationProcessorBuilder::default()
    }

    /// Preloaded documents available to `$ref`.
    pub fn store(&self) -> &Arc<SchemaStore> {
        &self.store
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    /// Number of validator chains built so far.
    pub fn chains_built(&self) -> usize {
        self.cache.builds()
    }

    /// Number of chains currently cached.
    pub fn cached_chains(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached chain. Later validations rebuild what they need.
    ///
    /// The cache holds one chain per distinct (schema, instance type) pair
    /// ever validated and never evicts on its own.
    pub fn clear_cache(&self) {
        tracing::debug!(chains = self.cache.len(), "clearing validator cache");
        self.cache.clear();
    }

    /// Validate `instance` against an in-memory `schema`.
    ///
    /// The schema is registered under the empty URI alongside the
    /// preloaded documents, so it can `$ref` into them.
    ///
    /// # Errors
    ///
    /// [`ProcessingException`] if a message reaches
    /// `options.exception_threshold`.
    pub fn validate(
        &self,
        schema: &Value,
        instance: &Value,
        options: &ValidationOptions,
    ) -> Result<ProcessingReport, ProcessingException> {
        let mut report = options.new_report();
        let tree = match self.anonymous_tree(schema) {
            Ok(tree) => tree,
            Err(e) => {
                let message =
                    processing_message("cannot register schema document").put("reason", e.to_string());
                return Err(abort(&mut report, message));
            }
        };
        self.validate_into(&tree, instance, options, &mut report)?;
        Ok(report)
    }

    /// Validate against a preloaded document.
    ///
    /// # Errors
    ///
    /// [`ProcessingException`] if `uri` is not loaded, or if a message
    /// reaches `options.exception_threshold`.
    pub fn validate_uri(
        &self,
        uri: &str,
        instance: &Value,
        options: &ValidationOptions,
    ) -> Result<ProcessingReport, ProcessingException> {
        let mut report = options.new_report();
        let tree = match SchemaTree::open(Arc::clone(&self.store), uri) {
            Ok(tree) => tree,
            Err(e) => {
                let message = ProcessingMessage::new("schema document is not loaded")
                    .with_domain(Domain::Resolution)
                    .put("uri", uri)
                    .put("reason", e.to_string());
                return Err(abort(&mut report, message));
            }
        };
        self.validate_into(&tree, instance, options, &mut report)?;
        Ok(report)
    }

    /// Validate against an existing tree into a fresh report.
    ///
    /// # Errors
    ///
    /// See [`ValidationProcessor::validate`].
    pub fn validate_tree(
        &self,
        schema: &SchemaTree,
        instance: &Value,
        options: &ValidationOptions,
    ) -> Result<ProcessingReport, ProcessingException> {
        let mut report = options.new_report();
        self.validate_into(schema, instance, options, &mut report)?;
        Ok(report)
    }

    /// Validate into a caller-owned report. Messages logged before an
    /// abort stay in `report`.
    ///
    /// The report's own levels apply; only `options.max_depth` is read.
    ///
    /// # Errors
    ///
    /// [`ProcessingException`] if a message reaches the report's exception
    /// threshold.
    pub fn validate_into(
        &self,
        schema: &SchemaTree,
        instance: &Value,
        options: &ValidationOptions,
        report: &mut ProcessingReport,
    ) -> Result<(), ProcessingException> {
        let mut run = ValidationRun::new(self, options.max_depth);
        run.validate_child(schema, instance, &JsonPointer::root(), report)
    }

    fn anonymous_tree(&self, schema: &Value) -> Result<SchemaTree, StoreError> {
        if self.store.is_empty() {
            return Ok(SchemaTree::anonymous(schema.clone()));
        }
        let mut store = SchemaStore::clone(&self.store);
        store.register(ANONYMOUS_URI, schema.clone())?;
        SchemaTree::open(Arc::new(store), ANONYMOUS_URI).map_err(|e| StoreError::InvalidUri {
            uri: ANONYMOUS_URI.to_string(),
            reason: e.to_string(),
        })
    }

    fn chain_for(&self, context: &SchemaContext) -> Result<Arc<ValidatorChain>, crate::cache::CacheError> {
        self.cache.get_or_build(context, || {
            Arc::new(ValidatorChain::build(
                context,
                &self.syntax,
                &self.keywords,
                &self.formats,
            ))
        })
    }
}

/// Configures a [`ValidationProcessor`].
#[derive(Debug, Default)]
pub struct ValidationProcessorBuilder {
    syntax: SyntaxCheckerRegistry,
    formats: FormatRegistry,
    keywords: KeywordLibrary,
    store: SchemaStore,
}

impl ValidationProcessorBuilder {
    /// Add a format attribute under a new name.
    ///
    /// # Errors
    ///
    /// [`FormatRegistryError::Duplicate`] if the name is taken.
    pub fn with_format(
        mut self,
        name: impl Into<String>,
        attribute: Arc<dyn FormatAttribute>,
    ) -> Result<Self, FormatRegistryError> {
        self.formats.register(name, attribute)?;
        Ok(self)
    }

    /// Add or replace the syntax checker for a keyword.
    pub fn with_syntax_checker(mut self, checker: Arc<dyn SyntaxChecker>) -> Self {
        self.syntax.register(checker);
        self
    }

    /// Add or replace a keyword descriptor.
    pub fn with_keyword(mut self, descriptor: KeywordDescriptor) -> Self {
        self.keywords.register(descriptor);
        self
    }

    /// Preload a document for cross-document `$ref`.
    ///
    /// # Errors
    ///
    /// [`StoreError`] if a different document already has this URI.
    pub fn with_document(mut self, uri: &str, document: Value) -> Result<Self, StoreError> {
        self.store.register(uri, document)?;
        Ok(self)
    }

    pub fn build(self) -> ValidationProcessor {
        ValidationProcessor {
            syntax: self.syntax,
            formats: self.formats,
            keywords: self.keywords,
            store: Arc::new(self.store),
            cache: ValidatorCache::new(),
        }
    }
}

/// Per-call traversal state: depth, the (schema, instance) pairs on the
/// current path, and the locations whose schema messages were already
/// reported.
///
/// Schema messages met inside a combinator branch are held back until the
/// outermost branch returns, then logged to the report that branch was
/// evaluated for. Branch reports may be discarded; schema messages never
/// are.
pub struct ValidationRun<'p> {
    processor: &'p ValidationProcessor,
    max_depth: usize,
    depth: usize,
    active: HashSet<(SchemaLocation, JsonPointer)>,
    reported: HashSet<SchemaLocation>,
    branches: usize,
    deferred: Vec<ProcessingMessage>,
}

impl<'p> ValidationRun<'p> {
    fn new(processor: &'p ValidationProcessor, max_depth: usize) -> Self {
        Self {
            processor,
            max_depth,
            depth: 0,
            active: HashSet::new(),
            reported: HashSet::new(),
            branches: 0,
            deferred: Vec::new(),
        }
    }

    pub fn formats(&self) -> &'p FormatRegistry {
        &self.processor.formats
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Mark the start of a branch evaluated into a private report.
    pub(crate) fn enter_branch(&mut self) {
        self.branches += 1;
    }

    /// Mark the end of a branch. Leaving the outermost branch flushes the
    /// held-back schema messages into `report`.
    ///
    /// # Errors
    ///
    /// [`ProcessingException`] if a flushed message reaches the report's
    /// exception threshold.
    pub(crate) fn leave_branch(&mut self, report: &mut ProcessingReport) -> Result<(), ProcessingException> {
        self.branches = self.branches.saturating_sub(1);
        if self.branches > 0 {
            return Ok(());
        }
        for message in std::mem::take(&mut self.deferred) {
            report.log(message.level(), message)?;
        }
        Ok(())
    }

    /// Apply `schema` to `instance`, found at `pointer`.
    ///
    /// # Errors
    ///
    /// [`ProcessingException`] if a message reaches the report's exception
    /// threshold.
    pub fn validate_child(
        &mut self,
        schema: &SchemaTree,
        instance: &Value,
        pointer: &JsonPointer,
        report: &mut ProcessingReport,
    ) -> Result<(), ProcessingException> {
        if self.depth >= self.max_depth {
            return self.depth_exceeded(schema, pointer, report);
        }

        let resolved = match schema.resolve() {
            Ok(resolved) => resolved,
            Err(e) => return self.resolution_failure(schema, pointer, e, report),
        };

        let key = (resolved.schema_location(), pointer.clone());
        if self.active.contains(&key) {
            return Self::loop_detected(&resolved, pointer, report);
        }

        let context = SchemaContext::new(&resolved, InstanceType::of(instance));
        let chain = match self.processor.chain_for(&context) {
            Ok(chain) => chain,
            Err(e) => return Self::chain_failure(&resolved, pointer, &e, report),
        };
        tracing::trace!(schema = %resolved, instance = %pointer, validators = chain.validators().len(), "validation step");

        if !chain.messages().is_empty() && self.reported.insert(key.0.clone()) {
            for message in chain.messages() {
                let message = message.clone().put("schema", resolved.as_json());
                if self.branches > 0 {
                    self.deferred.push(message);
                } else {
                    report.log(message.level(), message)?;
                }
            }
        }

        self.active.insert(key.clone());
        self.depth += 1;
        let data = ValidationData::new(&resolved, instance, pointer);
        let mut result = Ok(());
        for validator in chain.validators() {
            result = validator.validate(self, report, &data);
            if result.is_err() {
                break;
            }
        }
        self.depth -= 1;
        self.active.remove(&key);
        result
    }

    // The failure paths below live outside `validate_child` to keep its
    // stack frame small; every nesting level costs one frame.

    #[cold]
    #[inline(never)]
    fn depth_exceeded(
        &self,
        schema: &SchemaTree,
        pointer: &JsonPointer,
        report: &mut ProcessingReport,
    ) -> Result<(), ProcessingException> {
        tracing::warn!(schema = %schema, instance = %pointer, max_depth = self.max_depth, "validation depth exceeded");
        report.fatal(
            processing_message("maximum validation depth exceeded")
                .put("schema", schema.as_json())
                .with_instance(pointer)
                .put("maxDepth", self.max_depth),
        )?;
        Ok(())
    }

    #[cold]
    #[inline(never)]
    fn loop_detected(
        resolved: &SchemaTree,
        pointer: &JsonPointer,
        report: &mut ProcessingReport,
    ) -> Result<(), ProcessingException> {
        tracing::warn!(schema = %resolved, instance = %pointer, "validation loop detected");
        report.fatal(
            processing_message("validation loop: schema is already being applied to this instance")
                .put("schema", resolved.as_json())
                .with_instance(pointer),
        )?;
        Ok(())
    }

    #[cold]
    #[inline(never)]
    fn chain_failure(
        resolved: &SchemaTree,
        pointer: &JsonPointer,
        error: &crate::cache::CacheError,
        report: &mut ProcessingReport,
    ) -> Result<(), ProcessingException> {
        report.fatal(
            processing_message(error.to_string())
                .put("schema", resolved.as_json())
                .with_instance(pointer),
        )?;
        Ok(())
    }

    #[cold]
    #[inline(never)]
    fn resolution_failure(
        &mut self,
        schema: &SchemaTree,
        pointer: &JsonPointer,
        error: ResolutionError,
        report: &mut ProcessingReport,
    ) -> Result<(), ProcessingException> {
        let reference = schema.reference().cloned().unwrap_or(Value::Null);
        let message = ProcessingMessage::new(match &error {
            ResolutionError::Cycle { .. } => "JSON reference cycle detected",
            _ => "unresolvable JSON reference",
        })
        .with_domain(Domain::Resolution)
        .with_keyword("$ref")
        .put("schema", schema.as_json())
        .with_instance(pointer)
        .put("ref", reference)
        .put("reason", error.to_string());

        match error {
            ResolutionError::Cycle { path, .. } => {
                report.fatal(message.put("path", path))?;
            }
            _ => {
                report.error(message)?;
            }
        }
        Ok(())
    }
}
