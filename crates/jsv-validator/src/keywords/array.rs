//! Array keywords.

use std::sync::Arc;

use jsv_core::{ProcessingException, ProcessingReport};
use serde_json::{Map, Value};

use super::KeywordValidator;
use crate::data::ValidationData;
use crate::equality::first_duplicate;
use crate::processor::ValidationRun;

fn count(keywords: &Map<String, Value>, keyword: &str) -> Option<u64> {
    keywords.get(keyword)?.as_f64().map(|n| n as u64)
}

/// `minItems`.
#[derive(Debug, Clone, Copy)]
pub struct MinItemsValidator {
    limit: u64,
}

impl MinItemsValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let limit = count(keywords, "minItems")?;
        Some(Arc::new(Self { limit }))
    }
}

impl KeywordValidator for MinItemsValidator {
    fn keyword(&self) -> &'static str {
        "minItems"
    }

    fn validate(
        &self,
        _run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(items) = data.instance.as_array() else {
            return Ok(());
        };
        let found = items.len() as u64;
        if found < self.limit {
            report.error(
                data.message(
                    "minItems",
                    format!(
                        "array is too short: must have at least {} elements but instance has {found} elements",
                        self.limit
                    ),
                )
                .put("minItems", self.limit)
                .put("found", found),
            )?;
        }
        Ok(())
    }
}

/// `maxItems`.
#[derive(Debug, Clone, Copy)]
pub struct MaxItemsValidator {
    limit: u64,
}

impl MaxItemsValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let limit = count(keywords, "maxItems")?;
        Some(Arc::new(Self { limit }))
    }
}

impl KeywordValidator for MaxItemsValidator {
    fn keyword(&self) -> &'static str {
        "maxItems"
    }

    fn validate(
        &self,
        _run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(items) = data.instance.as_array() else {
            return Ok(());
        };
        let found = items.len() as u64;
        if found > self.limit {
            report.error(
                data.message(
                    "maxItems",
                    format!(
                        "array is too long: must have at most {} elements but instance has {found} elements",
                        self.limit
                    ),
                )
                .put("maxItems", self.limit)
                .put("found", found),
            )?;
        }
        Ok(())
    }
}

/// `uniqueItems: true`. `false` builds nothing.
#[derive(Debug, Clone, Copy)]
pub struct UniqueItemsValidator;

impl UniqueItemsValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        keywords
            .get("uniqueItems")?
            .as_bool()?
            .then(|| Arc::new(Self) as Arc<dyn KeywordValidator>)
    }
}

impl KeywordValidator for UniqueItemsValidator {
    fn keyword(&self) -> &'static str {
        "uniqueItems"
    }

    fn validate(
        &self,
        _run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(items) = data.instance.as_array() else {
            return Ok(());
        };
        if let Some((first, second)) = first_duplicate(items) {
            report.error(
                data.message("uniqueItems", "array must not contain duplicate elements")
                    .put("duplicates", vec![first, second]),
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Items {
    /// One schema for every element.
    Single,
    /// One schema per position, for this many positions.
    Tuple(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Additional {
    Allowed,
    Forbidden,
    Schema,
}

/// `items` together with `additionalItems`.
///
/// `additionalItems` only matters when `items` is an array.
#[derive(Debug, Clone, Copy)]
pub struct ItemsValidator {
    items: Items,
    additional: Additional,
}

impl ItemsValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let items = match keywords.get("items")? {
            Value::Object(_) => Items::Single,
            Value::Array(schemas) => Items::Tuple(schemas.len()),
            _ => return None,
        };
        let additional = match keywords.get("additionalItems") {
            Some(Value::Bool(false)) => Additional::Forbidden,
            Some(Value::Object(_)) => Additional::Schema,
            _ => Additional::Allowed,
        };
        Some(Arc::new(Self { items, additional }))
    }
}

impl KeywordValidator for ItemsValidator {
    fn keyword(&self) -> &'static str {
        "items"
    }

    fn validate(
        &self,
        run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(elements) = data.instance.as_array() else {
            return Ok(());
        };

        let items = data.schema.navigate("items");
        let tuple_len = match self.items {
            Items::Single => {
                for (index, element) in elements.iter().enumerate() {
                    run.validate_child(&items, element, &data.pointer.append_index(index), report)?;
                }
                return Ok(());
            }
            Items::Tuple(len) => len,
        };

        for (index, element) in elements.iter().enumerate().take(tuple_len) {
            let schema = items.navigate_index(index);
            run.validate_child(&schema, element, &data.pointer.append_index(index), report)?;
        }

        if elements.len() <= tuple_len {
            return Ok(());
        }
        match self.additional {
            Additional::Allowed => {}
            Additional::Schema => {
                let schema = data.schema.navigate("additionalItems");
                for (index, element) in elements.iter().enumerate().skip(tuple_len) {
                    run.validate_child(&schema, element, &data.pointer.append_index(index), report)?;
                }
            }
            Additional::Forbidden => {
                report.error(
                    data.message(
                        "additionalItems",
                        format!(
                            "array is too long: must have at most {tuple_len} elements but instance has {} elements",
                            elements.len()
                        ),
                    )
                    .put("allowed", tuple_len)
                    .put("found", elements.len()),
                )?;
            }
        }
        Ok(())
    }
}
