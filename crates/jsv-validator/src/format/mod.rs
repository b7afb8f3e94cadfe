//! # Format Attributes
//!
//! The `format` keyword names a semantic check on string instances. Each
//! name maps to one [`FormatAttribute`] in a [`FormatRegistry`].
//!
//! ## Semantics
//!
//! - Formats only constrain strings. Any other instance type passes.
//! - A failed check is logged at ERROR with keyword `format`, the
//!   `attribute` name and the offending `value`, and the message text
//!   `"string is not a valid <description>"`.
//! - A format name with no registered attribute is not an error. The
//!   validator logs a WARNING and moves on.
//!
//! Attributes are stateless and shared across threads.

mod date;
mod network;
mod text;

use std::collections::HashMap;
use std::sync::Arc;

use jsv_core::{ProcessingException, ProcessingReport};
use thiserror::Error;

use crate::data::ValidationData;

pub use date::{DateFormatAttribute, DateTimeAttribute};
pub use network::{EmailAttribute, HostnameAttribute, Ipv4Attribute, Ipv6Attribute, UriAttribute};
pub use text::{RegexAttribute, UuidAttribute};

/// Error registering a format attribute.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatRegistryError {
    /// The name already has an attribute.
    #[error("format attribute '{name}' is already registered")]
    Duplicate {
        /// The conflicting format name.
        name: String,
    },
}

/// One named string format.
pub trait FormatAttribute: Send + Sync {
    /// Human description used in failure messages, e.g. `"date"`.
    fn description(&self) -> &str;

    /// Whether `value` conforms.
    fn is_valid(&self, value: &str) -> bool;

    /// Validate a string instance, logging an ERROR if it does not conform.
    fn check(
        &self,
        attribute: &str,
        data: &ValidationData<'_>,
        report: &mut ProcessingReport,
    ) -> Result<(), ProcessingException> {
        let Some(value) = data.instance.as_str() else {
            return Ok(());
        };
        if !self.is_valid(value) {
            report.error(
                data.message("format", format!("string is not a valid {}", self.description()))
                    .put("attribute", attribute)
                    .put("value", value),
            )?;
        }
        Ok(())
    }
}

/// Format name to attribute. Built once, read-only afterwards.
#[derive(Clone)]
pub struct FormatRegistry {
    attributes: HashMap<String, Arc<dyn FormatAttribute>>,
}

impl FormatRegistry {
    /// A registry with no attributes.
    pub fn empty() -> Self {
        Self {
            attributes: HashMap::new(),
        }
    }

    /// The built-in attributes.
    pub fn draft4() -> Self {
        let mut attributes: HashMap<String, Arc<dyn FormatAttribute>> = HashMap::new();
        let builtin: [(&str, Arc<dyn FormatAttribute>); 10] = [
            ("date-time", Arc::new(DateTimeAttribute)),
            ("date", Arc::new(DateFormatAttribute::date())),
            ("time", Arc::new(DateFormatAttribute::time())),
            ("email", Arc::new(EmailAttribute)),
            ("hostname", Arc::new(HostnameAttribute)),
            ("ipv4", Arc::new(Ipv4Attribute)),
            ("ipv6", Arc::new(Ipv6Attribute)),
            ("uri", Arc::new(UriAttribute)),
            ("regex", Arc::new(RegexAttribute)),
            ("uuid", Arc::new(UuidAttribute)),
        ];
        for (name, attribute) in builtin {
            attributes.insert(name.to_string(), attribute);
        }
        Self { attributes }
    }

    /// Add an attribute under a new name.
    ///
    /// # Errors
    ///
    /// Returns [`FormatRegistryError::Duplicate`] if `name` is taken; use
    /// [`FormatRegistry::replace`] to override a built-in.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        attribute: Arc<dyn FormatAttribute>,
    ) -> Result<(), FormatRegistryError> {
        let name = name.into();
        if self.attributes.contains_key(&name) {
            return Err(FormatRegistryError::Duplicate { name });
        }
        self.attributes.insert(name, attribute);
        Ok(())
    }

    /// Add or override an attribute.
    pub fn replace(&mut self, name: impl Into<String>, attribute: Arc<dyn FormatAttribute>) {
        self.attributes.insert(name.into(), attribute);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn FormatAttribute>> {
        self.attributes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.attributes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::draft4()
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("names", &self.names())
            .finish()
    }
}
