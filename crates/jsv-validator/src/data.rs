//! The immutable input to one keyword validator.

use jsv_core::{Domain, JsonPointer, ProcessingMessage, SchemaTree};
use serde_json::Value;

/// A resolved schema location paired with the instance node it applies to.
#[derive(Debug, Clone, Copy)]
pub struct ValidationData<'a> {
    /// The schema, with any `$ref` chain already followed.
    pub schema: &'a SchemaTree,
    /// The instance node being validated.
    pub instance: &'a Value,
    /// Where `instance` lives in the instance document.
    pub pointer: &'a JsonPointer,
}

impl<'a> ValidationData<'a> {
    pub fn new(schema: &'a SchemaTree, instance: &'a Value, pointer: &'a JsonPointer) -> Self {
        Self {
            schema,
            instance,
            pointer,
        }
    }

    /// A validation-domain message carrying `keyword`, the schema location
    /// and the instance pointer.
    pub fn message(&self, keyword: &str, text: impl Into<String>) -> ProcessingMessage {
        ProcessingMessage::new(text)
            .with_domain(Domain::Validation)
            .with_keyword(keyword)
            .put("schema", self.schema.as_json())
            .with_instance(self.pointer)
    }
}
