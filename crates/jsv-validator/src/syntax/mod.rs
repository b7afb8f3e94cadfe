//! # Syntax Checking
//!
//! Every schema keyword has one stateless [`SyntaxChecker`] that verifies
//! the keyword's *value* has the right JSON shape before any validator
//! tries to interpret it. A `minLength` of `"3"` or a `pattern` that is not
//! a regular expression is caught here.
//!
//! ## Contract
//!
//! - A checker never fails by itself. Problems are logged to the report at
//!   ERROR with domain `syntax`, the keyword name, and the offending value.
//!   Whether that aborts is the report's decision.
//! - A syntax error disables only that keyword's validator. Sibling
//!   keywords at the same schema location are still evaluated.
//! - Checkers hold no mutable state. The [`SyntaxCheckerRegistry`] is built
//!   once and shared read-only across threads.

mod checkers;

use std::collections::HashMap;
use std::sync::Arc;

use jsv_core::{Domain, InstanceType, ProcessingException, ProcessingMessage, ProcessingReport};
use serde_json::Value;

pub use checkers::{
    DependenciesChecker, EnumChecker, ItemsChecker, NonNegativeIntegerChecker,
    PatternChecker, PatternPropertiesChecker, PositiveNumberChecker, RequiredChecker,
    SchemaArrayChecker, SchemaMapChecker, TypeKeywordChecker, TypeOnlyChecker,
};

/// Shape check for one keyword's value.
pub trait SyntaxChecker: Send + Sync {
    /// The keyword this checker owns.
    fn keyword(&self) -> &'static str;

    /// JSON node kinds the value may have. `number` admits integers.
    fn valid_types(&self) -> &'static [InstanceType];

    /// Checks beyond the node kind. Called only when the kind is valid.
    fn check_value(
        &self,
        _value: &Value,
        _report: &mut ProcessingReport,
    ) -> Result<(), ProcessingException> {
        Ok(())
    }

    /// Check the node kind, then the value.
    fn check(&self, value: &Value, report: &mut ProcessingReport) -> Result<(), ProcessingException> {
        let found = InstanceType::of(value);
        if !self.valid_types().iter().any(|t| found.satisfies(*t)) {
            let expected: Vec<Value> = self
                .valid_types()
                .iter()
                .map(|t| Value::String(t.as_str().to_string()))
                .collect();
            report.error(
                syntax_message(self.keyword(), "value has incorrect type")
                    .put("found", found.as_str())
                    .put("expected", expected)
                    .put("value", value.clone()),
            )?;
            return Ok(());
        }
        self.check_value(value, report)
    }
}

/// A syntax-domain message for `keyword`.
pub fn syntax_message(keyword: &str, text: impl Into<String>) -> ProcessingMessage {
    ProcessingMessage::new(text)
        .with_domain(Domain::Syntax)
        .with_keyword(keyword)
}

/// Read-only lookup table from keyword name to checker.
#[derive(Clone)]
pub struct SyntaxCheckerRegistry {
    checkers: HashMap<&'static str, Arc<dyn SyntaxChecker>>,
}

impl SyntaxCheckerRegistry {
    /// A registry with no checkers.
    pub fn empty() -> Self {
        Self {
            checkers: HashMap::new(),
        }
    }

    /// Checkers for every keyword the engine understands.
    pub fn draft4() -> Self {
        use InstanceType::{Boolean, Number, Object, String};

        let mut registry = Self::empty();

        // Annotations and identifiers.
        for keyword in ["$schema", "id", "$id", "$ref", "title", "description", "format"] {
            registry.register(Arc::new(TypeOnlyChecker::new(keyword, &[String])));
        }
        registry.register(Arc::new(TypeOnlyChecker::new("default", InstanceType::all())));
        registry.register(Arc::new(SchemaMapChecker::new("definitions")));

        // Numbers.
        registry.register(Arc::new(TypeOnlyChecker::new("minimum", &[Number])));
        registry.register(Arc::new(TypeOnlyChecker::new("maximum", &[Number])));
        registry.register(Arc::new(TypeOnlyChecker::new("exclusiveMinimum", &[Boolean])));
        registry.register(Arc::new(TypeOnlyChecker::new("exclusiveMaximum", &[Boolean])));
        registry.register(Arc::new(PositiveNumberChecker::new("multipleOf")));

        // Strings.
        registry.register(Arc::new(NonNegativeIntegerChecker::new("minLength")));
        registry.register(Arc::new(NonNegativeIntegerChecker::new("maxLength")));
        registry.register(Arc::new(PatternChecker));

        // Arrays.
        registry.register(Arc::new(NonNegativeIntegerChecker::new("minItems")));
        registry.register(Arc::new(NonNegativeIntegerChecker::new("maxItems")));
        registry.register(Arc::new(TypeOnlyChecker::new("uniqueItems", &[Boolean])));
        registry.register(Arc::new(ItemsChecker));
        registry.register(Arc::new(TypeOnlyChecker::new("additionalItems", &[Boolean, Object])));

        // Objects.
        registry.register(Arc::new(NonNegativeIntegerChecker::new("minProperties")));
        registry.register(Arc::new(NonNegativeIntegerChecker::new("maxProperties")));
        registry.register(Arc::new(RequiredChecker));
        registry.register(Arc::new(SchemaMapChecker::new("properties")));
        registry.register(Arc::new(PatternPropertiesChecker));
        registry.register(Arc::new(TypeOnlyChecker::new("additionalProperties", &[Boolean, Object])));
        registry.register(Arc::new(DependenciesChecker));

        // Any type.
        registry.register(Arc::new(TypeKeywordChecker));
        registry.register(Arc::new(EnumChecker));
        registry.register(Arc::new(SchemaArrayChecker::new("allOf")));
        registry.register(Arc::new(SchemaArrayChecker::new("anyOf")));
        registry.register(Arc::new(SchemaArrayChecker::new("oneOf")));
        registry.register(Arc::new(TypeOnlyChecker::new("not", &[Object])));

        registry
    }

    /// Add or replace the checker for its keyword.
    pub fn register(&mut self, checker: Arc<dyn SyntaxChecker>) {
        self.checkers.insert(checker.keyword(), checker);
    }

    pub fn get(&self, keyword: &str) -> Option<&Arc<dyn SyntaxChecker>> {
        self.checkers.get(keyword)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.checkers.contains_key(keyword)
    }

    /// Known keywords, sorted.
    pub fn keywords(&self) -> Vec<&'static str> {
        let mut keywords: Vec<&'static str> = self.checkers.keys().copied().collect();
        keywords.sort_unstable();
        keywords
    }

    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }
}

impl Default for SyntaxCheckerRegistry {
    fn default() -> Self {
        Self::draft4()
    }
}

impl std::fmt::Debug for SyntaxCheckerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxCheckerRegistry")
            .field("keywords", &self.keywords())
            .finish()
    }
}
