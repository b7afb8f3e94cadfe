//! `allOf`, `anyOf`, `oneOf` and `not`.

use std::sync::Arc;

use jsv_core::{ProcessingException, ProcessingReport, SchemaTree};
use serde_json::{Map, Value};

use super::{branch_reports, evaluate_branch, KeywordValidator};
use crate::data::ValidationData;
use crate::processor::ValidationRun;

fn branch_count(keywords: &Map<String, Value>, keyword: &str) -> Option<usize> {
    keywords.get(keyword)?.as_array().map(Vec::len)
}

fn branches(schema: &SchemaTree, keyword: &str, count: usize) -> Vec<SchemaTree> {
    let parent = schema.navigate(keyword);
    (0..count).map(|i| parent.navigate_index(i)).collect()
}

/// `allOf`: every branch is validated straight into the parent report.
#[derive(Debug, Clone, Copy)]
pub struct AllOfValidator {
    count: usize,
}

impl AllOfValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let count = branch_count(keywords, "allOf")?;
        Some(Arc::new(Self { count }))
    }
}

impl KeywordValidator for AllOfValidator {
    fn keyword(&self) -> &'static str {
        "allOf"
    }

    fn validate(
        &self,
        run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        for branch in branches(data.schema, "allOf", self.count) {
            run.validate_child(&branch, data.instance, data.pointer, report)?;
        }
        Ok(())
    }
}

/// `anyOf`: at least one branch must succeed.
#[derive(Debug, Clone, Copy)]
pub struct AnyOfValidator {
    count: usize,
}

impl AnyOfValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let count = branch_count(keywords, "anyOf")?;
        Some(Arc::new(Self { count }))
    }
}

impl KeywordValidator for AnyOfValidator {
    fn keyword(&self) -> &'static str {
        "anyOf"
    }

    fn validate(
        &self,
        run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let schemas = branches(data.schema, "anyOf", self.count);
        let mut results = Vec::with_capacity(schemas.len());
        for schema in &schemas {
            let branch = evaluate_branch(run, report, schema, data)?;
            if branch.is_success() {
                return Ok(());
            }
            results.push(branch);
        }
        report.error(
            data.message(
                "anyOf",
                format!(
                    "instance failed to match at least one required schema among {}",
                    self.count
                ),
            )
            .put("nrSchemas", self.count)
            .put("reports", branch_reports(schemas.iter().zip(&results), report.log_level())),
        )?;
        Ok(())
    }
}

/// `oneOf`: exactly one branch must succeed.
#[derive(Debug, Clone, Copy)]
pub struct OneOfValidator {
    count: usize,
}

impl OneOfValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let count = branch_count(keywords, "oneOf")?;
        Some(Arc::new(Self { count }))
    }
}

impl KeywordValidator for OneOfValidator {
    fn keyword(&self) -> &'static str {
        "oneOf"
    }

    fn validate(
        &self,
        run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let schemas = branches(data.schema, "oneOf", self.count);
        let mut results = Vec::with_capacity(schemas.len());
        for schema in &schemas {
            results.push(evaluate_branch(run, report, schema, data)?);
        }
        let matched = results.iter().filter(|r| r.is_success()).count();
        if matched == 1 {
            return Ok(());
        }
        report.error(
            data.message(
                "oneOf",
                format!(
                    "instance failed to match exactly one schema (matched {matched} out of {})",
                    self.count
                ),
            )
            .put("matched", matched)
            .put("nrSchemas", self.count)
            .put("reports", branch_reports(schemas.iter().zip(&results), report.log_level())),
        )?;
        Ok(())
    }
}

/// `not`: the single branch must fail.
#[derive(Debug, Clone, Copy)]
pub struct NotValidator;

impl NotValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        keywords.get("not")?.as_object()?;
        Some(Arc::new(Self))
    }
}

impl KeywordValidator for NotValidator {
    fn keyword(&self) -> &'static str {
        "not"
    }

    fn validate(
        &self,
        run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let schema = data.schema.navigate("not");
        let branch = evaluate_branch(run, report, &schema, data)?;
        if branch.is_success() {
            report.error(data.message("not", "instance matched a schema which it should not have"))?;
        }
        Ok(())
    }
}
