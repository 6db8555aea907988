//! Error types.

use std::path::PathBuf;

use thiserror::Error;
use yamldoctor_analyzer::AnalyzerError;

/// Errors that can occur while configuring or running an analysis.
#[derive(Debug, Error)]
pub enum DoctorError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested path does not exist or is neither file nor directory.
    #[error("Target not found: {}", .0.display())]
    TargetNotFound(PathBuf),

    /// The requested file is not inside any workspace root.
    #[error("File must be in a workspace to analyze: {}", .0.display())]
    NoWorkspace(PathBuf),

    /// No workspace root is configured.
    #[error("No workspace folder found")]
    EmptyWorkspace,

    /// Analyzer error.
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DoctorError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns true when the analyzer was never invoked.
    pub fn is_rejected_before_analysis(&self) -> bool {
        matches!(
            self,
            Self::TargetNotFound(_) | Self::NoWorkspace(_) | Self::EmptyWorkspace
        )
    }
}
