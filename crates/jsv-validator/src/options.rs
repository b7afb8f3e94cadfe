//! # Validation Options
//!
//! Per-call configuration: what to store, when to abort, and how deep to
//! recurse. Loadable from YAML or JSON so front ends can keep it in a file.
//!
//! ```yaml
//! log_level: warning
//! exception_threshold: error
//! max_depth: 64
//! ```
//!
//! Every field is optional; missing fields take the defaults below.

use std::path::Path;

use jsv_core::{LogLevel, ProcessingReport};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default nesting limit for validation steps.
///
/// Each step is a native call frame. This value fits a 2 MiB thread stack
/// in an unoptimised build; raise it only for threads with bigger stacks.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Error loading options.
#[derive(Error, Debug)]
pub enum OptionsError {
    /// The file could not be read.
    #[error("cannot read options file '{path}': {source}")]
    Io {
        /// The file that failed.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid YAML for this structure.
    #[error("invalid YAML options: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The text is not valid JSON for this structure.
    #[error("invalid JSON options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for one top-level validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationOptions {
    /// Messages below this level are not stored. Default: DEBUG.
    pub log_level: LogLevel,
    /// Messages at or above this level abort processing. Default: FATAL.
    pub exception_threshold: LogLevel,
    /// Maximum nested validation steps before a FATAL depth error.
    pub max_depth: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Debug,
            exception_threshold: LogLevel::Fatal,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ValidationOptions {
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_exception_threshold(mut self, level: LogLevel) -> Self {
        self.exception_threshold = level;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Parse options from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, OptionsError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse options from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load options from a file; `.json` is parsed as JSON, anything else
    /// as YAML.
    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        let text = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    /// An empty report configured with these levels.
    pub fn new_report(&self) -> ProcessingReport {
        ProcessingReport::with_levels(self.log_level, self.exception_threshold)
    }
}
