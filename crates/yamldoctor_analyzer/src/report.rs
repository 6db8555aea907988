//! Raw analyzer report.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AnalyzerError;

/// Unnormalized analyzer output.
///
/// The document is kept as a JSON value because backends disagree on its
/// shape: the embedded library wraps everything in a `result` object while
/// the CLI writes a bare `{ score, files }` document. Only the top level is
/// checked here; field-level interpretation happens during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawReport(Value);

impl RawReport {
    /// Wraps an already parsed document.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parses a report document.
    ///
    /// Fails when the text is not JSON or when the top level is not an object.
    pub fn from_json(json: &str) -> Result<Self, AnalyzerError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| AnalyzerError::malformed(format!("invalid JSON: {}", e)))?;

        if !value.is_object() {
            return Err(AnalyzerError::malformed(
                "top-level value must be an object",
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying document.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Consumes the report, returning the underlying document.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for RawReport {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
