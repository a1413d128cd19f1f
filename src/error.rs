use std::fmt;

use thiserror::Error;

/// A single field-level rule broken during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path to the offending field, e.g. `mapColorConfig.minValue`.
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Reported when a map configuration fails validation. Carries every rule
/// that was broken, in the order the rules were checked, not just the first.
#[derive(Debug, Error)]
#[error("invalid map configuration: {}", .violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct ConfigValidationError {
    pub violations: Vec<Violation>,
}

impl ConfigValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

/// Failures raised by data sources and the factory that selects them.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file extension does not map to any known source variant.
    #[error("unsupported file format '{extension}'")]
    UnsupportedFormat { extension: String },
    /// The query engine refused the dataset bytes at registration time.
    #[error("failed to register dataset '{handle}' with the query engine")]
    Registration {
        handle: String,
        #[source]
        source: anyhow::Error,
    },
    /// The query engine failed to execute a constructed query. Tagged with
    /// the column or operation the query was built for.
    #[error("query failed for {operation}")]
    Query {
        operation: String,
        #[source]
        source: anyhow::Error,
    },
}
