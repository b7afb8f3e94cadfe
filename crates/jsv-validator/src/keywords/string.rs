//! String keywords. Lengths count Unicode code points.

use std::sync::Arc;

use jsv_core::{ProcessingException, ProcessingReport};
use regex::Regex;
use serde_json::{Map, Value};

use super::KeywordValidator;
use crate::data::ValidationData;
use crate::processor::ValidationRun;

fn limit(keywords: &Map<String, Value>, keyword: &str) -> Option<u64> {
    keywords.get(keyword)?.as_f64().map(|n| n as u64)
}

/// `minLength`.
#[derive(Debug, Clone, Copy)]
pub struct MinLengthValidator {
    limit: u64,
}

impl MinLengthValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let limit = limit(keywords, "minLength")?;
        Some(Arc::new(Self { limit }))
    }
}

impl KeywordValidator for MinLengthValidator {
    fn keyword(&self) -> &'static str {
        "minLength"
    }

    fn validate(
        &self,
        _run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(text) = data.instance.as_str() else {
            return Ok(());
        };
        let length = text.chars().count() as u64;
        if length < self.limit {
            report.error(
                data.message(
                    "minLength",
                    format!(
                        "string \"{text}\" is too short (length: {length}, required minimum: {})",
                        self.limit
                    ),
                )
                .put("value", text)
                .put("found", length)
                .put("minLength", self.limit),
            )?;
        }
        Ok(())
    }
}

/// `maxLength`.
#[derive(Debug, Clone, Copy)]
pub struct MaxLengthValidator {
    limit: u64,
}

impl MaxLengthValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let limit = limit(keywords, "maxLength")?;
        Some(Arc::new(Self { limit }))
    }
}

impl KeywordValidator for MaxLengthValidator {
    fn keyword(&self) -> &'static str {
        "maxLength"
    }

    fn validate(
        &self,
        _run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(text) = data.instance.as_str() else {
            return Ok(());
        };
        let length = text.chars().count() as u64;
        if length > self.limit {
            report.error(
                data.message(
                    "maxLength",
                    format!(
                        "string \"{text}\" is too long (length: {length}, maximum allowed: {})",
                        self.limit
                    ),
                )
                .put("value", text)
                .put("found", length)
                .put("maxLength", self.limit),
            )?;
        }
        Ok(())
    }
}

/// `pattern`: an unanchored regular-expression search.
#[derive(Debug, Clone)]
pub struct PatternValidator {
    regex: Regex,
}

impl PatternValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let regex = Regex::new(keywords.get("pattern")?.as_str()?).ok()?;
        Some(Arc::new(Self { regex }))
    }
}

impl KeywordValidator for PatternValidator {
    fn keyword(&self) -> &'static str {
        "pattern"
    }

    fn validate(
        &self,
        _run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        let Some(text) = data.instance.as_str() else {
            return Ok(());
        };
        if !self.regex.is_match(text) {
            report.error(
                data.message(
                    "pattern",
                    format!(
                        "regex \"{}\" does not match input string \"{text}\"",
                        self.regex.as_str()
                    ),
                )
                .put("regex", self.regex.as_str())
                .put("string", text),
            )?;
        }
        Ok(())
    }
}

/// `format`: delegates to the attribute registered under the name.
///
/// Unknown names are warned about once per schema location when the chain
/// is built, so this validator stays silent for them.
#[derive(Debug, Clone)]
pub struct FormatValidator {
    attribute: String,
}

impl FormatValidator {
    pub fn build(keywords: &Map<String, Value>) -> Option<Arc<dyn KeywordValidator>> {
        let attribute = keywords.get("format")?.as_str()?.to_string();
        Some(Arc::new(Self { attribute }))
    }
}

impl KeywordValidator for FormatValidator {
    fn keyword(&self) -> &'static str {
        "format"
    }

    fn validate(
        &self,
        run: &mut ValidationRun<'_>,
        report: &mut ProcessingReport,
        data: &ValidationData<'_>,
    ) -> Result<(), ProcessingException> {
        match run.formats().get(&self.attribute) {
            Some(attribute) => attribute.check(&self.attribute, data, report),
            None => Ok(()),
        }
    }
}
