//! # Keyword Validators
//!
//! Semantic checks for each schema keyword. A [`KeywordDescriptor`] says
//! which instance types a keyword constrains and how to build its
//! [`KeywordValidator`] from a schema node; the [`KeywordLibrary`] is the
//! ordered, read-only set of descriptors a chain is assembled from.
//!
//! ## Building
//!
//! Builders receive only the keywords at the current location whose syntax
//! checked clean. A keyword with malformed syntax is simply absent, so its
//! validator is never built while its siblings are. Keywords that read each
//! other (`items` with `additionalItems`, `minimum` with `exclusiveMinimum`,
//! the three property keywords) are built by one descriptor.
//!
//! ## Sharing
//!
//! A built validator is cached and reused for every schema location with
//! equivalent content, possibly in other documents. Validators therefore
//! keep only values derived from keyword content (limits, names, compiled
//! patterns) and navigate to child schemas from [`ValidationData::schema`]
//! at validation time, never from a tree captured at build time.
//!
//! ## Combinators
//!
//! `anyOf`, `oneOf` and `not` evaluate each branch into a private report
//! (see [`evaluate_branch`]). Failures embed each branch's messages under a
//! `reports` member keyed by the branch's schema pointer.

mod array;
mod combinators;
mod common;
mod numeric;
mod object;
mod string;

use std::fmt;
use std::sync::Arc;

use jsv_core::{
    InstanceType, LogLevel, ProcessingException, ProcessingMessage, ProcessingReport, SchemaTree,
};
use serde_json::{Map, Value};

use crate::data::ValidationData;
use crate::processor::ValidationRun;

pub use array::{ItemsValidator, MaxItemsValidator, MinItemsValidator, UniqueItemsValidator};
pub use combinators::{AllOfValidator, AnyOfValidator, NotValidator, OneOfValidator};
pub use common::{EnumValidator, TypeValidator};
pub use numeric::{MaximumValidator, MinimumValidator, MultipleOfValidator};
pub use object::{
    DependenciesValidator, MaxPropertiesValidator, MinPropertiesValidator, PropertiesValidator,
    RequiredValidator,
};
pub use string::{FormatValidator, MaxLengthValidator, MinLengthValidator, PatternValidator};

/// The semantic check for one keyword (or keyword group) at one schema.
pub trait KeywordValidator: Send + Sync + fmt::Debug {
    /// The keyword this validator reports under.
    fn keyword(&self) -> &'static str;

    /// Check `data.instance`, logging findings to `report`. Child schemas
    /// are validated through `run`.
    fn validate(
        &self,
        run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException>;
}

/// Builds a validator from the syntax-clean keywords of a schema node.
/// `None` means the keyword is present but imposes no constraint.
pub type BuildFn = fn(&Map<String, Value>) -> Option<Arc<dyn KeywordValidator>>;

/// How a keyword is wired into validator chains.
#[derive(Clone, Copy)]
pub struct KeywordDescriptor {
    /// Unique name in the library.
    pub name: &'static str,
    /// The descriptor is built when any of these keywords is present.
    pub triggers: &'static [&'static str],
    /// Instance types the keyword constrains. `number` admits integers.
    pub types: &'static [InstanceType],
    pub build: BuildFn,
}

impl KeywordDescriptor {
    pub fn applies_to(&self, instance_type: InstanceType) -> bool {
        self.types.iter().any(|t| instance_type.satisfies(*t))
    }

    pub fn is_triggered_by(&self, keywords: &Map<String, Value>) -> bool {
        self.triggers.iter().any(|k| keywords.contains_key(*k))
    }
}

impl fmt::Debug for KeywordDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordDescriptor")
            .field("name", &self.name)
            .field("triggers", &self.triggers)
            .field("types", &self.types)
            .finish()
    }
}

/// Ordered keyword descriptors. Chains run validators in this order.
#[derive(Debug, Clone)]
pub struct KeywordLibrary {
    descriptors: Vec<KeywordDescriptor>,
}

impl KeywordLibrary {
    pub fn empty() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// The draft-v4 keyword set.
    pub fn draft4() -> Self {
        use InstanceType::{Array, Number, Object, String};
        let any = InstanceType::all();

        let mut library = Self::empty();
        for descriptor in [
            KeywordDescriptor { name: "type", triggers: &["type"], types: any, build: TypeValidator::build },
            KeywordDescriptor { name: "enum", triggers: &["enum"], types: any, build: EnumValidator::build },
            KeywordDescriptor { name: "allOf", triggers: &["allOf"], types: any, build: AllOfValidator::build },
            KeywordDescriptor { name: "anyOf", triggers: &["anyOf"], types: any, build: AnyOfValidator::build },
            KeywordDescriptor { name: "oneOf", triggers: &["oneOf"], types: any, build: OneOfValidator::build },
            KeywordDescriptor { name: "not", triggers: &["not"], types: any, build: NotValidator::build },
            KeywordDescriptor { name: "minimum", triggers: &["minimum"], types: &[Number], build: MinimumValidator::build },
            KeywordDescriptor { name: "maximum", triggers: &["maximum"], types: &[Number], build: MaximumValidator::build },
            KeywordDescriptor { name: "multipleOf", triggers: &["multipleOf"], types: &[Number], build: MultipleOfValidator::build },
            KeywordDescriptor { name: "minLength", triggers: &["minLength"], types: &[String], build: MinLengthValidator::build },
            KeywordDescriptor { name: "maxLength", triggers: &["maxLength"], types: &[String], build: MaxLengthValidator::build },
            KeywordDescriptor { name: "pattern", triggers: &["pattern"], types: &[String], build: PatternValidator::build },
            KeywordDescriptor { name: "format", triggers: &["format"], types: &[String], build: FormatValidator::build },
            KeywordDescriptor { name: "minItems", triggers: &["minItems"], types: &[Array], build: MinItemsValidator::build },
            KeywordDescriptor { name: "maxItems", triggers: &["maxItems"], types: &[Array], build: MaxItemsValidator::build },
            KeywordDescriptor { name: "uniqueItems", triggers: &["uniqueItems"], types: &[Array], build: UniqueItemsValidator::build },
            KeywordDescriptor { name: "items", triggers: &["items"], types: &[Array], build: ItemsValidator::build },
            KeywordDescriptor { name: "required", triggers: &["required"], types: &[Object], build: RequiredValidator::build },
            KeywordDescriptor { name: "minProperties", triggers: &["minProperties"], types: &[Object], build: MinPropertiesValidator::build },
            KeywordDescriptor { name: "maxProperties", triggers: &["maxProperties"], types: &[Object], build: MaxPropertiesValidator::build },
            KeywordDescriptor {
                name: "properties",
                triggers: &["properties", "patternProperties", "additionalProperties"],
                types: &[Object],
                build: PropertiesValidator::build,
            },
            KeywordDescriptor { name: "dependencies", triggers: &["dependencies"], types: &[Object], build: DependenciesValidator::build },
        ] {
            library.register(descriptor);
        }
        library
    }

    /// Append a descriptor, replacing any with the same name in place.
    pub fn register(&mut self, descriptor: KeywordDescriptor) {
        match self.descriptors.iter_mut().find(|d| d.name == descriptor.name) {
            Some(slot) => *slot = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    pub fn get(&self, name: &str) -> Option<&KeywordDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn descriptors(&self) -> &[KeywordDescriptor] {
        &self.descriptors
    }
}

impl Default for KeywordLibrary {
    fn default() -> Self {
        Self::draft4()
    }
}

/// Validate `data.instance` against `schema` into a fresh private report.
///
/// The branch report stores ERROR and above even when the parent filters
/// them out, so branch success can always be judged, and only throws on
/// FATAL. A FATAL raised inside the branch is logged to `report` as well
/// and propagated.
///
/// Schema messages (syntax errors, unknown keywords, unsupported formats)
/// never land in the branch report. They reach `report` once the
/// outermost branch returns, so they do not decide branch success.
pub(crate) fn evaluate_branch(
    run: &mut ValidationRun<'_>,
    report: &mut ProcessingReport,
    schema: &SchemaTree,
    data: &ValidationData<'_>,
) -> Result<ProcessingReport, ProcessingException> {
    let mut branch =
        ProcessingReport::with_levels(report.log_level().min(LogLevel::Error), LogLevel::Fatal);
    run.enter_branch();
    let outcome = run.validate_child(schema, data.instance, data.pointer, &mut branch);
    run.leave_branch(report)?;
    match outcome {
        Ok(()) => Ok(branch),
        Err(e) => {
            let message = e.into_message();
            report.log(message.level(), message.clone())?;
            Err(ProcessingException(message))
        }
    }
}

/// The `reports` member of a combinator failure: branch schema pointer to
/// the branch's messages at or above `log_level`.
pub(crate) fn branch_reports<'a>(
    branches: impl IntoIterator<Item = (&'a SchemaTree, &'a ProcessingReport)>,
    log_level: LogLevel,
) -> Value {
    let mut reports = Map::new();
    for (schema, branch) in branches {
        let messages: Vec<Value> = branch
            .iter()
            .filter(|m| m.level() >= log_level)
            .map(ProcessingMessage::as_json)
            .collect();
        reports.insert(schema.location().to_string(), Value::Array(messages));
    }
    Value::Object(reports)
}

/// `["a","b"]`-style rendering for message text.
pub(crate) fn json_list<T: Into<Value> + Clone>(items: &[T]) -> Value {
    Value::Array(items.iter().cloned().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_library_order_and_lookup() {
        let library = KeywordLibrary::draft4();
        assert_eq!(library.descriptors()[0].name, "type");
        assert!(library.get("properties").is_some());
        assert!(library.get("additionalProperties").is_none());
    }

    #[test]
    fn test_properties_descriptor_triggers() {
        let library = KeywordLibrary::draft4();
        let descriptor = library.get("properties").unwrap();
        let keywords = json!({"additionalProperties": false});
        assert!(descriptor.is_triggered_by(keywords.as_object().unwrap()));
        assert!(descriptor.applies_to(InstanceType::Object));
        assert!(!descriptor.applies_to(InstanceType::Array));
    }

    #[test]
    fn test_number_keywords_apply_to_integers() {
        let library = KeywordLibrary::draft4();
        assert!(library.get("minimum").unwrap().applies_to(InstanceType::Integer));
        assert!(!library.get("minimum").unwrap().applies_to(InstanceType::String));
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut library = KeywordLibrary::draft4();
        let count = library.descriptors().len();
        let mut custom = *library.get("enum").unwrap();
        custom.types = &[InstanceType::String];
        library.register(custom);
        assert_eq!(library.descriptors().len(), count);
        assert_eq!(library.descriptors()[1].types, &[InstanceType::String]);
    }
}
