//! # Validator Chains
//!
//! A [`ValidatorChain`] is everything needed to validate instances of one
//! type against one schema node: the keyword validators to run, in library
//! order, plus the schema-level messages found while building them.
//!
//! Building runs every keyword's syntax checker first. Keywords with
//! syntax errors, and keywords no checker knows, are left out of the set
//! handed to validator builders. Schema-level messages are recorded without
//! a `schema` member, because one chain serves every location with
//! equivalent content. The processor adds the location when it replays
//! them.

use std::fmt;
use std::sync::Arc;

use jsv_core::{
    Domain, InstanceType, LogLevel, ProcessingMessage, ProcessingReport, SchemaContext,
};
use serde_json::{Map, Value};

use crate::cache::BuildOnceCache;
use crate::format::FormatRegistry;
use crate::keywords::{KeywordLibrary, KeywordValidator};
use crate::syntax::SyntaxCheckerRegistry;

/// The validator cache: one chain per equivalence class of contexts.
pub type ValidatorCache = BuildOnceCache<SchemaContext, Arc<ValidatorChain>>;

/// Built validators for one schema context.
pub struct ValidatorChain {
    messages: Vec<ProcessingMessage>,
    validators: Vec<Arc<dyn KeywordValidator>>,
}

impl ValidatorChain {
    /// Build the chain for `context`.
    pub fn build(
        context: &SchemaContext,
        syntax: &SyntaxCheckerRegistry,
        keywords: &KeywordLibrary,
        formats: &FormatRegistry,
    ) -> Self {
        let schema = context.schema();
        tracing::debug!(
            schema = %schema,
            instance_type = %context.instance_type(),
            "building validator chain"
        );

        let Some(node) = schema.object() else {
            let found = InstanceType::of(schema.node());
            let message = ProcessingMessage::new("schema is not a JSON object")
                .with_level(LogLevel::Error)
                .with_domain(Domain::Syntax)
                .put("found", found.as_str());
            return Self {
                messages: vec![message],
                validators: Vec::new(),
            };
        };

        // Checkers only log at ERROR, which never reaches the FATAL
        // threshold of this report.
        let mut scratch = ProcessingReport::new();
        let mut clean = Map::new();
        let mut unknown: Vec<&str> = Vec::new();

        for (keyword, value) in node {
            let Some(checker) = syntax.get(keyword) else {
                unknown.push(keyword.as_str());
                continue;
            };
            let before = scratch.len();
            if checker.check(value, &mut scratch).is_err() {
                continue;
            }
            let failed = scratch.messages()[before..]
                .iter()
                .any(|m| m.level() >= LogLevel::Error);
            if !failed {
                clean.insert(keyword.clone(), value.clone());
            }
        }

        let mut messages = scratch.into_messages();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            messages.push(
                ProcessingMessage::new("the following keywords are unknown and will be ignored")
                    .with_level(LogLevel::Warning)
                    .with_domain(Domain::Syntax)
                    .put("ignored", unknown.into_iter().map(Value::from).collect::<Vec<_>>()),
            );
        }

        let instance_type = context.instance_type();
        if let Some(name) = clean.get("format").and_then(Value::as_str) {
            if instance_type == InstanceType::String && !formats.contains(name) {
                messages.push(
                    ProcessingMessage::new("format attribute not supported")
                        .with_level(LogLevel::Warning)
                        .with_domain(Domain::Validation)
                        .with_keyword("format")
                        .put("attribute", name),
                );
            }
        }

        let validators: Vec<Arc<dyn KeywordValidator>> = keywords
            .descriptors()
            .iter()
            .filter(|d| d.applies_to(instance_type) && d.is_triggered_by(&clean))
            .filter_map(|d| (d.build)(&clean))
            .collect();

        Self {
            messages,
            validators,
        }
    }

    /// Schema-level messages, without a `schema` member.
    pub fn messages(&self) -> &[ProcessingMessage] {
        &self.messages
    }

    pub fn validators(&self) -> &[Arc<dyn KeywordValidator>] {
        &self.validators
    }
}

impl fmt::Debug for ValidatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keywords: Vec<&str> = self.validators.iter().map(|v| v.keyword()).collect();
        f.debug_struct("ValidatorChain")
            .field("messages", &self.messages.len())
            .field("validators", &keywords)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsv_core::SchemaTree;
    use serde_json::json;

    fn build(schema: Value, instance_type: InstanceType) -> ValidatorChain {
        let tree = SchemaTree::anonymous(schema);
        ValidatorChain::build(
            &SchemaContext::new(&tree, instance_type),
            &SyntaxCheckerRegistry::draft4(),
            &KeywordLibrary::draft4(),
            &FormatRegistry::draft4(),
        )
    }

    fn keywords(chain: &ValidatorChain) -> Vec<&'static str> {
        chain.validators().iter().map(|v| v.keyword()).collect()
    }

    #[test]
    fn test_only_applicable_keywords_built() {
        let schema = json!({"type": "string", "minLength": 2, "minimum": 3, "required": ["a"]});
        assert_eq!(keywords(&build(schema.clone(), InstanceType::String)), ["type", "minLength"]);
        assert_eq!(keywords(&build(schema.clone(), InstanceType::Integer)), ["type", "minimum"]);
        assert_eq!(keywords(&build(schema, InstanceType::Object)), ["type", "required"]);
    }

    #[test]
    fn test_bad_syntax_drops_only_that_keyword() {
        let chain = build(json!({"minLength": "2", "maxLength": 3}), InstanceType::String);
        assert_eq!(keywords(&chain), ["maxLength"]);
        assert_eq!(chain.messages().len(), 1);
        assert_eq!(chain.messages()[0].keyword(), Some("minLength"));
        assert!(chain.messages()[0].get("schema").is_none());
    }

    #[test]
    fn test_unknown_keywords_warned_sorted() {
        let chain = build(json!({"zeta": 1, "alpha": 2, "type": "null"}), InstanceType::Null);
        let warning = &chain.messages()[0];
        assert_eq!(warning.level(), LogLevel::Warning);
        assert_eq!(warning.domain(), Some(Domain::Syntax));
        assert_eq!(warning.get("ignored"), Some(json!(["alpha", "zeta"])));
    }

    #[test]
    fn test_unsupported_format_warned_for_strings_only() {
        let schema = json!({"format": "no-such-format"});
        let chain = build(schema.clone(), InstanceType::String);
        assert_eq!(chain.messages().len(), 1);
        assert_eq!(chain.messages()[0].message(), "format attribute not supported");
        assert!(build(schema, InstanceType::Integer).messages().is_empty());
    }

    #[test]
    fn test_non_object_schema() {
        let chain = build(json!(["not", "a", "schema"]), InstanceType::Null);
        assert!(chain.validators().is_empty());
        assert_eq!(chain.messages()[0].level(), LogLevel::Error);
        assert_eq!(chain.messages()[0].get("found"), Some(json!("array")));
    }

    #[test]
    fn test_property_group_built_once() {
        let chain = build(
            json!({"properties": {}, "patternProperties": {}, "additionalProperties": false}),
            InstanceType::Object,
        );
        assert_eq!(keywords(&chain), ["properties"]);
    }
}
