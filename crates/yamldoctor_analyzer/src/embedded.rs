//! In-process analyzer backend.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::{Analyzer, AnalyzerError, BasicEngine, RawReport, ScanEngine};

/// Runs a [`ScanEngine`] on the blocking thread pool.
///
/// The report is returned in the library shape: the scan result wrapped in a
/// `result` object, with absolute file paths and no column information
/// unless the engine provides it.
#[derive(Clone)]
pub struct EmbeddedAnalyzer {
    engine: Arc<dyn ScanEngine>,
}

impl fmt::Debug for EmbeddedAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedAnalyzer")
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl EmbeddedAnalyzer {
    /// Creates an analyzer around the given engine.
    pub fn new(engine: impl ScanEngine + 'static) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

impl Default for EmbeddedAnalyzer {
    fn default() -> Self {
        Self::new(BasicEngine::default())
    }
}

impl Analyzer for EmbeddedAnalyzer {
    fn name(&self) -> &str {
        "embedded"
    }

    async fn analyze(&self, root: &Path) -> Result<RawReport, AnalyzerError> {
        let engine = Arc::clone(&self.engine);
        let root = root.to_path_buf();

        debug!("Running {} engine on {}", engine.name(), root.display());

        let result = tokio::task::spawn_blocking(move || engine.scan(&root))
            .await
            .map_err(|e| AnalyzerError::execution(format!("engine task failed: {}", e)))??;

        let result = serde_json::to_value(result)
            .map_err(|e| AnalyzerError::malformed(format!("unserializable scan result: {}", e)))?;

        Ok(RawReport::new(json!({ "result": result })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScanResult, ScannedFile, ScannedIssue};
    use std::path::PathBuf;

    struct FixedEngine;

    impl ScanEngine for FixedEngine {
        fn name(&self) -> &str {
            "fixed"
        }

        fn scan(&self, root: &Path) -> Result<ScanResult, AnalyzerError> {
            Ok(ScanResult {
                score: 90.0,
                files: vec![ScannedFile {
                    path: root.join("a.yaml"),
                    issues: vec![ScannedIssue {
                        line: Some(2),
                        column: None,
                        severity: "warning".to_string(),
                        message: "tab indentation".to_string(),
                        code: Some("W001".to_string()),
                    }],
                }],
            })
        }
    }

    struct FailingEngine;

    impl ScanEngine for FailingEngine {
        fn name(&self) -> &str {
            "failing"
        }

        fn scan(&self, _root: &Path) -> Result<ScanResult, AnalyzerError> {
            Err(AnalyzerError::execution("engine crashed"))
        }
    }

    #[tokio::test]
    async fn test_embedded_wraps_result() {
        let analyzer = EmbeddedAnalyzer::new(FixedEngine);
        let root = PathBuf::from("/ws");

        let report = analyzer.analyze(&root).await.unwrap();
        let value = report.value();

        assert_eq!(value["result"]["score"], 90.0);
        assert_eq!(value["result"]["files"][0]["path"], "/ws/a.yaml");
        assert_eq!(value["result"]["files"][0]["issues"][0]["code"], "W001");
        assert!(value["result"]["files"][0]["issues"][0].get("column").is_none());
    }

    #[tokio::test]
    async fn test_embedded_propagates_engine_error() {
        let analyzer = EmbeddedAnalyzer::new(FailingEngine);
        let err = analyzer.analyze(Path::new("/ws")).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::ExecutionFailed(_)));
    }
}
