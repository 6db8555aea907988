//! Analyzer abstraction.
//!
//! This module provides the `Analyzer` trait which separates how linting
//! happens from how its results are reconciled and displayed. Callers only
//! see a root path going in and a [`RawReport`] coming out:
//!
//! - `EmbeddedAnalyzer`: in-process scan through a [`ScanEngine`](crate::ScanEngine)
//! - `ContainerAnalyzer`: out-of-process scan through a container runtime

use std::future::Future;
use std::path::Path;

use crate::{AnalyzerError, ContainerAnalyzer, EmbeddedAnalyzer, RawReport};

/// A backend that produces a score and per-file issues for a root path.
pub trait Analyzer: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &str;

    /// Analyzes every file under `root`.
    ///
    /// This may suspend for as long as the backend needs (a container run or
    /// a long in-process scan). It is the only suspension point of an
    /// analysis run.
    fn analyze(
        &self,
        root: &Path,
    ) -> impl Future<Output = Result<RawReport, AnalyzerError>> + Send;
}

/// The analyzer selected at startup.
#[derive(Debug, Clone)]
pub enum AnalyzerBackend {
    /// In-process engine.
    Embedded(EmbeddedAnalyzer),
    /// Containerized CLI.
    Container(ContainerAnalyzer),
}

impl Analyzer for AnalyzerBackend {
    fn name(&self) -> &str {
        match self {
            Self::Embedded(analyzer) => analyzer.name(),
            Self::Container(analyzer) => analyzer.name(),
        }
    }

    async fn analyze(&self, root: &Path) -> Result<RawReport, AnalyzerError> {
        match self {
            Self::Embedded(analyzer) => analyzer.analyze(root).await,
            Self::Container(analyzer) => analyzer.analyze(root).await,
        }
    }
}

impl From<EmbeddedAnalyzer> for AnalyzerBackend {
    fn from(analyzer: EmbeddedAnalyzer) -> Self {
        Self::Embedded(analyzer)
    }
}

impl From<ContainerAnalyzer> for AnalyzerBackend {
    fn from(analyzer: ContainerAnalyzer) -> Self {
        Self::Container(analyzer)
    }
}
