//! Object keywords.

use std::collections::BTreeSet;
use std::sync::Arc;

use jsv_core::{ProcessingException, ProcessingReport};
use regex::Regex;
use serde_json::{Map, Value};

use super::{json_list, KeywordValidator};
use crate::data::ValidationData;
use crate::processor::ValidationRun;

fn count(keywords: &Map<String, Value>, keyword: &str) -> Option<u64> {
    keywords.get(keyword)?.as_f64().map(|n| n as u64)
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// `required`.
#[derive(Debug, Clone)]
pub struct RequiredValidator {
    required: Vec<String>,
}

impl RequiredValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let required = string_list(keywords.get("required")?);
        Some(Arc::new(Self { required }))
    }
}

impl KeywordValidator for RequiredValidator {
    fn keyword(&self) -> &'static str {
        "required"
    }

    fn validate(
        &self,
        _run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(object) = data.instance.as_object() else {
            return Ok(());
        };
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|name| !object.contains_key(name.as_str()))
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        let missing = json_list(&missing);
        report.error(
            data.message("required", format!("object has missing required properties ({missing})"))
                .put("required", json_list(&self.required))
                .put("missing", missing),
        )?;
        Ok(())
    }
}

/// `minProperties`.
#[derive(Debug, Clone, Copy)]
pub struct MinPropertiesValidator {
    limit: u64,
}

impl MinPropertiesValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let limit = count(keywords, "minProperties")?;
        Some(Arc::new(Self { limit }))
    }
}

impl KeywordValidator for MinPropertiesValidator {
    fn keyword(&self) -> &'static str {
        "minProperties"
    }

    fn validate(
        &self,
        _run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(object) = data.instance.as_object() else {
            return Ok(());
        };
        let found = object.len() as u64;
        if found < self.limit {
            report.error(
                data.message(
                    "minProperties",
                    format!(
                        "object has too few properties (found {found} but schema requires at least {})",
                        self.limit
                    ),
                )
                .put("minProperties", self.limit)
                .put("found", found),
            )?;
        }
        Ok(())
    }
}

/// `maxProperties`.
#[derive(Debug, Clone, Copy)]
pub struct MaxPropertiesValidator {
    limit: u64,
}

impl MaxPropertiesValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let limit = count(keywords, "maxProperties")?;
        Some(Arc::new(Self { limit }))
    }
}

impl KeywordValidator for MaxPropertiesValidator {
    fn keyword(&self) -> &'static str {
        "maxProperties"
    }

    fn validate(
        &self,
        _run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(object) = data.instance.as_object() else {
            return Ok(());
        };
        let found = object.len() as u64;
        if found > self.limit {
            report.error(
                data.message(
                    "maxProperties",
                    format!(
                        "object has too many properties (found {found} but schema requires at most {})",
                        self.limit
                    ),
                )
                .put("maxProperties", self.limit)
                .put("found", found),
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Additional {
    Allowed,
    Forbidden,
    Schema,
}

/// `properties`, `patternProperties` and `additionalProperties`.
///
/// Each member is validated against its `properties` entry and every
/// matching `patternProperties` entry. Members matched by neither fall to
/// `additionalProperties`.
#[derive(Debug, Clone)]
pub struct PropertiesValidator {
    properties: BTreeSet<String>,
    patterns: Vec<(String, Regex)>,
    additional: Additional,
}

impl PropertiesValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let properties = keywords
            .get("properties")
            .and_then(Value::as_object)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        let patterns = keywords
            .get("patternProperties")
            .and_then(Value::as_object)
            .map(|m| {
                m.keys()
                    .filter_map(|p| Regex::new(p).ok().map(|r| (p.clone(), r)))
                    .collect()
            })
            .unwrap_or_default();
        let additional = match keywords.get("additionalProperties") {
            Some(Value::Bool(false)) => Additional::Forbidden,
            Some(Value::Object(_)) => Additional::Schema,
            _ => Additional::Allowed,
        };
        Some(Arc::new(Self {
            properties,
            patterns,
            additional,
        }))
    }
}

impl KeywordValidator for PropertiesValidator {
    fn keyword(&self) -> &'static str {
        "properties"
    }

    fn validate(
        &self,
        run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(object) = data.instance.as_object() else {
            return Ok(());
        };

        let mut unwanted: Vec<&str> = Vec::new();
        for (name, member) in object {
            let pointer = data.pointer.append(name.as_str());
            let mut matched = false;

            if self.properties.contains(name) {
                matched = true;
                let schema = data.schema.navigate("properties").navigate(name.as_str());
                run.validate_child(&schema, member, &pointer, report)?;
            }
            for (pattern, regex) in &self.patterns {
                if regex.is_match(name) {
                    matched = true;
                    let schema = data
                        .schema
                        .navigate("patternProperties")
                        .navigate(pattern.as_str());
                    run.validate_child(&schema, member, &pointer, report)?;
                }
            }
            if matched {
                continue;
            }
            match self.additional {
                Additional::Allowed => {}
                Additional::Forbidden => unwanted.push(name.as_str()),
                Additional::Schema => {
                    let schema = data.schema.navigate("additionalProperties");
                    run.validate_child(&schema, member, &pointer, report)?;
                }
            }
        }

        if !unwanted.is_empty() {
            unwanted.sort_unstable();
            let unwanted = json_list(&unwanted);
            report.error(
                data.message(
                    "additionalProperties",
                    format!("object instance has properties which are not allowed by the schema: {unwanted}"),
                )
                .put("unwanted", unwanted),
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Dependency {
    Schema,
    Properties(Vec<String>),
}

/// `dependencies`: schema and property dependencies.
#[derive(Debug, Clone)]
pub struct DependenciesValidator {
    dependencies: Vec<(String, Dependency)>,
}

impl DependenciesValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let dependencies = keywords
            .get("dependencies")?
            .as_object()?
            .iter()
            .filter_map(|(name, value)| {
                let dependency = match value {
                    Value::Object(_) => Dependency::Schema,
                    Value::Array(_) => Dependency::Properties(string_list(value)),
                    _ => return None,
                };
                Some((name.clone(), dependency))
            })
            .collect();
        Some(Arc::new(Self { dependencies }))
    }
}

impl KeywordValidator for DependenciesValidator {
    fn keyword(&self) -> &'static str {
        "dependencies"
    }

    fn validate(
        &self,
        run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(object) = data.instance.as_object() else {
            return Ok(());
        };
        for (name, dependency) in &self.dependencies {
            if !object.contains_key(name.as_str()) {
                continue;
            }
            match dependency {
                Dependency::Schema => {
                    let schema = data.schema.navigate("dependencies").navigate(name.as_str());
                    run.validate_child(&schema, data.instance, data.pointer, report)?;
                }
                Dependency::Properties(required) => {
                    let missing: Vec<String> = required
                        .iter()
                        .filter(|r| !object.contains_key(r.as_str()))
                        .cloned()
                        .collect();
                    if missing.is_empty() {
                        continue;
                    }
                    let missing = json_list(&missing);
                    report.error(
                        data.message(
                            "dependencies",
                            format!(
                                "property \"{name}\" of object has missing property dependencies (missing: {missing})"
                            ),
                        )
                        .put("property", name.as_str())
                        .put("required", json_list(required))
                        .put("missing", missing),
                    )?;
                }
            }
        }
        Ok(())
    }
}
