//! Analyzer error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while invoking an analyzer.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The backend cannot be reached (e.g. container runtime missing).
    #[error("Analyzer unavailable: {0}")]
    Unavailable(String),

    /// The backend ran but did not succeed.
    #[error("Analyzer execution failed: {0}")]
    ExecutionFailed(String),

    /// The backend did not finish in time and was killed.
    #[error("Analyzer execution failed: timed out after {0:?}")]
    Timeout(Duration),

    /// The backend produced output that is not a report document.
    #[error("Analyzer execution failed: malformed report: {0}")]
    MalformedOutput(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`AnalyzerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerErrorKind {
    /// The backend could not be reached at all.
    Unavailable,
    /// The backend was reached but the run failed.
    ExecutionFailed,
}

impl AnalyzerError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates an execution failure.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::ExecutionFailed(message.into())
    }

    /// Creates a malformed output error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedOutput(message.into())
    }

    /// Returns the taxonomy bucket of this error.
    pub fn kind(&self) -> AnalyzerErrorKind {
        match self {
            Self::Unavailable(_) => AnalyzerErrorKind::Unavailable,
            Self::ExecutionFailed(_) | Self::Timeout(_) | Self::MalformedOutput(_) | Self::Io(_) => {
                AnalyzerErrorKind::ExecutionFailed
            }
        }
    }
}
