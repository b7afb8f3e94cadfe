//! Keywords that apply to every instance type.

use std::sync::Arc;

use jsv_core::{InstanceType, ProcessingException, ProcessingReport};
use serde_json::{Map, Value};

use super::{json_list, KeywordValidator};
use crate::data::ValidationData;
use crate::equality::json_equal;
use crate::processor::ValidationRun;

/// `type`: the instance's primitive type must be one of the allowed ones.
#[derive(Debug, Clone)]
pub struct TypeValidator {
    allowed: Vec<InstanceType>,
}

impl TypeValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let allowed: Vec<InstanceType> = match keywords.get("type")? {
            Value::String(name) => vec![name.parse().ok()?],
            Value::Array(names) => names
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|n| n.parse().ok())
                .collect(),
            _ => return None,
        };
        Some(Arc::new(Self { allowed }))
    }
}

impl KeywordValidator for TypeValidator {
    fn keyword(&self) -> &'static str {
        "type"
    }

    fn validate(
        &self,
        _run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let found = InstanceType::of(data.instance);
        if self.allowed.iter().any(|t| found.satisfies(*t)) {
            return Ok(());
        }
        let expected: Vec<&str> = self.allowed.iter().map(InstanceType::as_str).collect();
        let expected = json_list(&expected);
        report.error(
            data.message(
                "type",
                format!(
                    "instance type ({found}) does not match any allowed primitive type (allowed: {expected})"
                ),
            )
            .put("found", found.as_str())
            .put("expected", expected),
        )?;
        Ok(())
    }
}

/// `enum`: the instance must equal one of the listed values.
#[derive(Debug, Clone)]
pub struct EnumValidator {
    values: Vec<Value>,
}

impl EnumValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let values = keywords.get("enum")?.as_array()?.clone();
        Some(Arc::new(Self { values }))
    }
}

impl KeywordValidator for EnumValidator {
    fn keyword(&self) -> &'static str {
        "enum"
    }

    fn validate(
        &self,
        _run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        if self.values.iter().any(|v| json_equal(v, data.instance)) {
            return Ok(());
        }
        let possible = Value::Array(self.values.clone());
        report.error(
            data.message(
                "enum",
                format!(
                    "instance value ({}) not found in enum (possible values: {possible})",
                    data.instance
                ),
            )
            .put("value", data.instance.clone())
            .put("enum", possible),
        )?;
        Ok(())
    }
}
