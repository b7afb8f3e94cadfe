//! Concrete syntax checkers for the draft-v4 keyword set.

use jsv_core::{InstanceType, ProcessingException, ProcessingReport};
use regex::Regex;
use serde_json::Value;

use super::{syntax_message, SyntaxChecker};
use crate::equality::first_duplicate;

use InstanceType::{Array, Integer, Number, Object, String as Str};

const SIMPLE_TYPES: &[&str] = &[
    "array", "boolean", "integer", "null", "number", "object", "string",
];

/// Indices of array elements that are not objects.
fn non_schema_indices(items: &[Value]) -> Vec<Value> {
    items
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_object())
        .map(|(i, _)| Value::from(i))
        .collect()
}

/// Names of object members whose value is not an object, sorted.
fn non_schema_members(value: &Value) -> Vec<Value> {
    let mut names: Vec<&str> = value
        .as_object()
        .into_iter()
        .flatten()
        .filter(|(_, v)| !v.is_object())
        .map(|(k, _)| k.as_str())
        .collect();
    names.sort_unstable();
    names.into_iter().map(Value::from).collect()
}

fn check_unique(
    keyword: &str,
    items: &[Value],
    report: &mut ProcessingReport,
) -> Result<(), ProcessingException> {
    if let Some((first, second)) = first_duplicate(items) {
        report.error(
            syntax_message(keyword, "elements in the array are not unique")
                .put("duplicates", vec![Value::from(first), Value::from(second)]),
        )?;
    }
    Ok(())
}

fn check_not_empty(
    keyword: &str,
    items: &[Value],
    report: &mut ProcessingReport,
) -> Result<bool, ProcessingException> {
    if items.is_empty() {
        report.error(syntax_message(keyword, "array must have at least one element"))?;
        return Ok(false);
    }
    Ok(true)
}

/// Checks only the node kind.
#[derive(Debug, Clone, Copy)]
pub struct TypeOnlyChecker {
    keyword: &'static str,
    types: &'static [InstanceType],
}

impl TypeOnlyChecker {
    pub fn new(keyword: &'static str, types: &'static [InstanceType]) -> Self {
        Self { keyword, types }
    }
}

impl SyntaxChecker for TypeOnlyChecker {
    fn keyword(&self) -> &'static str {
        self.keyword
    }

    fn valid_types(&self) -> &'static [InstanceType] {
        self.types
    }
}

/// `minLength`, `maxItems` and friends: an integer that is not negative.
#[derive(Debug, Clone, Copy)]
pub struct NonNegativeIntegerChecker {
    keyword: &'static str,
}

impl NonNegativeIntegerChecker {
    pub fn new(keyword: &'static str) -> Self {
        Self { keyword }
    }
}

impl SyntaxChecker for NonNegativeIntegerChecker {
    fn keyword(&self) -> &'static str {
        self.keyword
    }

    fn valid_types(&self) -> &'static [InstanceType] {
        &[Integer]
    }

    fn check_value(&self, value: &Value, report: &mut ProcessingReport) -> Result<(), ProcessingException> {
        if value.as_f64().map_or(false, |n| n < 0.0) {
            report.error(
                syntax_message(self.keyword, "value must not be negative").put("value", value.clone()),
            )?;
        }
        Ok(())
    }
}

/// `multipleOf`: a number strictly greater than zero.
#[derive(Debug, Clone, Copy)]
pub struct PositiveNumberChecker {
    keyword: &'static str,
}

impl PositiveNumberChecker {
    pub fn new(keyword: &'static str) -> Self {
        Self { keyword }
    }
}

impl SyntaxChecker for PositiveNumberChecker {
    fn keyword(&self) -> &'static str {
        self.keyword
    }

    fn valid_types(&self) -> &'static [InstanceType] {
        &[Number]
    }

    fn check_value(&self, value: &Value, report: &mut ProcessingReport) -> Result<(), ProcessingException> {
        if value.as_f64().map_or(true, |n| n <= 0.0) {
            report.error(
                syntax_message(self.keyword, "value must be strictly greater than 0")
                    .put("value", value.clone()),
            )?;
        }
        Ok(())
    }
}

/// `pattern`: a string that compiles as a regular expression.
#[derive(Debug, Clone, Copy)]
pub struct PatternChecker;

impl SyntaxChecker for PatternChecker {
    fn keyword(&self) -> &'static str {
        "pattern"
    }

    fn valid_types(&self) -> &'static [InstanceType] {
        &[Str]
    }

    fn check_value(&self, value: &Value, report: &mut ProcessingReport) -> Result<(), ProcessingException> {
        let text = value.as_str().unwrap_or_default();
        if let Err(e) = Regex::new(text) {
            report.error(
                syntax_message("pattern", "value is not a valid regular expression")
                    .put("value", text)
                    .put("error", e.to_string()),
            )?;
        }
        Ok(())
    }
}

/// `properties` and `definitions`: an object whose members are schemas.
#[derive(Debug, Clone, Copy)]
pub struct SchemaMapChecker {
    keyword: &'static str,
}

impl SchemaMapChecker {
    pub fn new(keyword: &'static str) -> Self {
        Self { keyword }
    }
}

impl SyntaxChecker for SchemaMapChecker {
    fn keyword(&self) -> &'static str {
        self.keyword
    }

    fn valid_types(&self) -> &'static [InstanceType] {
        &[Object]
    }

    fn check_value(&self, value: &Value, report: &mut ProcessingReport) -> Result<(), ProcessingException> {
        let invalid = non_schema_members(value);
        if !invalid.is_empty() {
            report.error(
                syntax_message(self.keyword, "member values must be schemas (JSON objects)")
                    .put("invalid", invalid),
            )?;
        }
        Ok(())
    }
}

/// `patternProperties`: member names are regular expressions, member
/// values are schemas.
#[derive(Debug, Clone, Copy)]
pub struct PatternPropertiesChecker;

impl SyntaxChecker for PatternPropertiesChecker {
    fn keyword(&self) -> &'static str {
        "patternProperties"
    }

    fn valid_types(&self) -> &'static [InstanceType] {
        &[Object]
    }

    fn check_value(&self, value: &Value, report: &mut ProcessingReport) -> Result<(), ProcessingException> {
        let mut bad_patterns: Vec<&str> = value
            .as_object()
            .into_iter()
            .flatten()
            .map(|(k, _)| k.as_str())
            .filter(|k| Regex::new(k).is_err())
            .collect();
        bad_patterns.sort_unstable();
        if !bad_patterns.is_empty() {
            report.error(
                syntax_message("patternProperties", "member names must be valid regular expressions")
                    .put("invalid", bad_patterns.into_iter().map(Value::from).collect::<Vec<_>>()),
            )?;
        }
        SchemaMapChecker::new("patternProperties").check_value(value, report)
    }
}

/// `items`: a schema or an array of schemas.
#[derive(Debug, Clone, Copy)]
pub struct ItemsChecker;

impl SyntaxChecker for ItemsChecker {
    fn keyword(&self) -> &'static str {
        "items"
    }

    fn valid_types(&self) -> &'static [InstanceType] {
        &[Array, Object]
    }

    fn check_value(&self, value: &Value, report: &mut ProcessingReport) -> Result<(), ProcessingException> {
        if let Some(items) = value.as_array() {
            let invalid = non_schema_indices(items);
            if !invalid.is_empty() {
                report.error(
                    syntax_message("items", "array elements must be schemas (JSON objects)")
                        .put("invalid", invalid),
                )?;
            }
        }
        Ok(())
    }
}

/// `allOf`, `anyOf`, `oneOf`: a non-empty array of schemas.
#[derive(Debug, Clone, Copy)]
pub struct SchemaArrayChecker {
    keyword: &'static str,
}

impl SchemaArrayChecker {
    pub fn new(keyword: &'static str) -> Self {
        Self { keyword }
    }
}

impl SyntaxChecker for SchemaArrayChecker {
    fn keyword(&self) -> &'static str {
        self.keyword
    }

    fn valid_types(&self) -> &'static [InstanceType] {
        &[Array]
    }

    fn check_value(&self, value: &Value, report: &mut ProcessingReport) -> Result<(), ProcessingException> {
        let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
        if !check_not_empty(self.keyword, items, report)? {
            return Ok(());
        }
        let invalid = non_schema_indices(items);
        if !invalid.is_empty() {
            report.error(
                syntax_message(self.keyword, "array elements must be schemas (JSON objects)")
                    .put("invalid", invalid),
            )?;
        }
        Ok(())
    }
}

/// `enum`: a non-empty array of unique values.
#[derive(Debug, Clone, Copy)]
pub struct EnumChecker;

impl SyntaxChecker for EnumChecker {
    fn keyword(&self) -> &'static str {
        "enum"
    }

    fn valid_types(&self) -> &'static [InstanceType] {
        &[Array]
    }

    fn check_value(&self, value: &Value, report: &mut ProcessingReport) -> Result<(), ProcessingException> {
        let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
        if check_not_empty("enum", items, report)? {
            check_unique("enum", items, report)?;
        }
        Ok(())
    }
}

/// `required`: a non-empty array of unique strings.
#[derive(Debug, Clone, Copy)]
pub struct RequiredChecker;

impl SyntaxChecker for RequiredChecker {
    fn keyword(&self) -> &'static str {
        "required"
    }

    fn valid_types(&self) -> &'static [InstanceType] {
        &[Array]
    }

    fn check_value(&self, value: &Value, report: &mut ProcessingReport) -> Result<(), ProcessingException> {
        let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
        if !check_not_empty("required", items, report)? {
            return Ok(());
        }
        string_array_elements("required", items, report)
    }
}

/// Shared by `required` and property dependencies.
fn string_array_elements(
    keyword: &str,
    items: &[Value],
    report: &mut ProcessingReport,
) -> Result<(), ProcessingException> {
    let invalid: Vec<Value> = items
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_string())
        .map(|(i, _)| Value::from(i))
        .collect();
    if !invalid.is_empty() {
        report.error(syntax_message(keyword, "array elements must be strings").put("invalid", invalid))?;
        return Ok(());
    }
    check_unique(keyword, items, report)
}

/// `type`: a primitive type name, or a non-empty array of unique names.
#[derive(Debug, Clone, Copy)]
pub struct TypeKeywordChecker;

impl TypeKeywordChecker {
    fn check_name(value: &Value, report: &mut ProcessingReport) -> Result<(), ProcessingException> {
        match value.as_str() {
            Some(name) if SIMPLE_TYPES.contains(&name) => Ok(()),
            Some(name) => {
                report.error(
                    syntax_message("type", "unknown simple type")
                        .put("found", name)
                        .put("valid", SIMPLE_TYPES.to_vec()),
                )?;
                Ok(())
            }
            None => {
                report.error(
                    syntax_message("type", "array elements must be strings")
                        .put("value", value.clone()),
                )?;
                Ok(())
            }
        }
    }
}

impl SyntaxChecker for TypeKeywordChecker {
    fn keyword(&self) -> &'static str {
        "type"
    }

    fn valid_types(&self) -> &'static [InstanceType] {
        &[Array, Str]
    }

    fn check_value(&self, value: &Value, report: &mut ProcessingReport) -> Result<(), ProcessingException> {
        let Some(items) = value.as_array() else {
            return Self::check_name(value, report);
        };
        if !check_not_empty("type", items, report)? {
            return Ok(());
        }
        for item in items {
            Self::check_name(item, report)?;
        }
        check_unique("type", items, report)
    }
}

/// `dependencies`: each member is a schema or a non-empty array of unique
/// property names.
#[derive(Debug, Clone, Copy)]
pub struct DependenciesChecker;

impl SyntaxChecker for DependenciesChecker {
    fn keyword(&self) -> &'static str {
        "dependencies"
    }

    fn valid_types(&self) -> &'static [InstanceType] {
        &[Object]
    }

    fn check_value(&self, value: &Value, report: &mut ProcessingReport) -> Result<(), ProcessingException> {
        for (property, dependency) in value.as_object().into_iter().flatten() {
            match dependency {
                Value::Object(_) => {}
                Value::Array(names) if names.is_empty() => {
                    report.error(
                        syntax_message("dependencies", "array must have at least one element")
                            .put("property", property.as_str()),
                    )?;
                }
                Value::Array(names) => string_array_elements("dependencies", names, report)?,
                other => {
                    report.error(
                        syntax_message(
                            "dependencies",
                            "dependency value must be a schema or an array of property names",
                        )
                        .put("property", property.as_str())
                        .put("found", InstanceType::of(other).as_str()),
                    )?;
                }
            }
        }
        Ok(())
    }
}
