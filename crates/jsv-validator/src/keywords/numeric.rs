//! `minimum`, `maximum` and `multipleOf`.
//!
//! Integers are compared exactly; anything involving a fraction falls back
//! to `f64`.

use std::cmp::Ordering;
use std::sync::Arc;

use jsv_core::{ProcessingException, ProcessingReport};
use serde_json::{Map, Number, Value};

use super::KeywordValidator;
use crate::data::ValidationData;
use crate::processor::ValidationRun;

fn compare(a: &Number, b: &Number) -> Option<Ordering> {
    match (as_i128(a), as_i128(b)) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

fn as_i128(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn exclusive(keywords: &Map<String, Value>, keyword: &str) -> bool {
    keywords.get(keyword).and_then(Value::as_bool).unwrap_or(false)
}

/// `minimum`, with `exclusiveMinimum`.
#[derive(Debug, Clone)]
pub struct MinimumValidator {
    limit: Number,
    exclusive: bool,
}

impl MinimumValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let limit = keywords.get("minimum")?.as_number()?.clone();
        Some(Arc::new(Self {
            limit,
            exclusive: exclusive(keywords, "exclusiveMinimum"),
        }))
    }
}

impl KeywordValidator for MinimumValidator {
    fn keyword(&self) -> &'static str {
        "minimum"
    }

    fn validate(
        &self,
        _run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(found) = data.instance.as_number() else {
            return Ok(());
        };
        let message = match compare(found, &self.limit) {
            Some(Ordering::Less) => data.message(
                "minimum",
                format!(
                    "numeric instance is lower than the required minimum (minimum: {}, found: {found})",
                    self.limit
                ),
            ),
            Some(Ordering::Equal) if self.exclusive => data
                .message(
                    "minimum",
                    format!(
                        "numeric instance is not strictly greater than the required minimum {}",
                        self.limit
                    ),
                )
                .put("exclusiveMinimum", true),
            _ => return Ok(()),
        };
        report.error(
            message
                .put("minimum", self.limit.clone())
                .put("found", found.clone()),
        )?;
        Ok(())
    }
}

/// `maximum`, with `exclusiveMaximum`.
#[derive(Debug, Clone)]
pub struct MaximumValidator {
    limit: Number,
    exclusive: bool,
}

impl MaximumValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let limit = keywords.get("maximum")?.as_number()?.clone();
        Some(Arc::new(Self {
            limit,
            exclusive: exclusive(keywords, "exclusiveMaximum"),
        }))
    }
}

impl KeywordValidator for MaximumValidator {
    fn keyword(&self) -> &'static str {
        "maximum"
    }

    fn validate(
        &self,
        _run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(found) = data.instance.as_number() else {
            return Ok(());
        };
        let message = match compare(found, &self.limit) {
            Some(Ordering::Greater) => data.message(
                "maximum",
                format!(
                    "numeric instance is greater than the required maximum (maximum: {}, found: {found})",
                    self.limit
                ),
            ),
            Some(Ordering::Equal) if self.exclusive => data
                .message(
                    "maximum",
                    format!(
                        "numeric instance is not strictly lower than the required maximum {}",
                        self.limit
                    ),
                )
                .put("exclusiveMaximum", true),
            _ => return Ok(()),
        };
        report.error(
            message
                .put("maximum", self.limit.clone())
                .put("found", found.clone()),
        )?;
        Ok(())
    }
}

/// `multipleOf`.
#[derive(Debug, Clone)]
pub struct MultipleOfValidator {
    divisor: Number,
}

impl MultipleOfValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let divisor = keywords.get("multipleOf")?.as_number()?.clone();
        Some(Arc::new(Self { divisor }))
    }

    fn divides(&self, value: &Number) -> bool {
        if let (Some(v), Some(d)) = (as_i128(value), as_i128(&self.divisor)) {
            return d != 0 && v % d == 0;
        }
        let (Some(v), Some(d)) = (value.as_f64(), self.divisor.as_f64()) else {
            return false;
        };
        if d == 0.0 {
            return false;
        }
        let quotient = v / d;
        if !quotient.is_finite() {
            return false;
        }
        (quotient - quotient.round()).abs() <= 1e-10 * quotient.abs().max(1.0)
    }
}

impl KeywordValidator for MultipleOfValidator {
    fn keyword(&self) -> &'static str {
        "multipleOf"
    }

    fn validate(
        &self,
        _run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(value) = data.instance.as_number() else {
            return Ok(());
        };
        if self.divides(value) {
            return Ok(());
        }
        report.error(
            data.message(
                "multipleOf",
                format!("remainder of division is not zero ({value} / {})", self.divisor),
            )
            .put("value", value.clone())
            .put("divisor", self.divisor.clone()),
        )?;
        Ok(())
    }
}
