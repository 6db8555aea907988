//! LSP Backend state management.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tower_lsp::lsp_types::Url;
use tracing::error;

use yamldoctor_core::{AnalyzerBackend, DiagnosticStore, DoctorConfig, RootLocks};

/// Shared backend state.
pub(crate) struct BackendState {
    /// Published diagnostics, keyed by file identity.
    pub store: DiagnosticStore,
    /// Active configuration.
    pub config: RwLock<DoctorConfig>,
    /// Analyzer built from the active configuration.
    pub analyzer: RwLock<Arc<AnalyzerBackend>>,
    /// Workspace roots, primary root first.
    pub workspace_roots: RwLock<Vec<PathBuf>>,
    /// Language ids of open documents.
    pub documents: RwLock<HashMap<Url, String>>,
    /// Serializes runs over the same root.
    pub locks: RootLocks,
}

impl fmt::Debug for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendState")
            .field("store", &format_args!("<{} files>", self.store.len()))
            .field("config", &self.config)
            .field("workspace_roots", &self.workspace_roots)
            .finish_non_exhaustive()
    }
}

impl BackendState {
    /// Creates a state with the default configuration.
    pub fn new() -> Self {
        let config = DoctorConfig::new();
        let analyzer = config
            .analyzer_backend()
            .unwrap_or_else(|_| AnalyzerBackend::Embedded(Default::default()));

        Self {
            store: DiagnosticStore::new(),
            config: RwLock::new(config),
            analyzer: RwLock::new(Arc::new(analyzer)),
            workspace_roots: RwLock::new(Vec::new()),
            documents: RwLock::new(HashMap::new()),
            locks: RootLocks::new(),
        }
    }

    /// Returns a copy of the workspace roots.
    pub fn roots(&self) -> Vec<PathBuf> {
        match self.workspace_roots.read() {
            Ok(roots) => roots.clone(),
            Err(e) => {
                error!("Workspace roots lock poisoned: {}", e);
                Vec::new()
            }
        }
    }

    /// Replaces the workspace roots.
    pub fn set_roots(&self, roots: Vec<PathBuf>) {
        match self.workspace_roots.write() {
            Ok(mut guard) => *guard = roots,
            Err(e) => error!("Workspace roots lock poisoned: {}", e),
        }
    }

    /// Returns the current analyzer.
    pub fn analyzer(&self) -> Option<Arc<AnalyzerBackend>> {
        match self.analyzer.read() {
            Ok(analyzer) => Some(Arc::clone(&analyzer)),
            Err(e) => {
                error!("Analyzer lock poisoned: {}", e);
                None
            }
        }
    }

    /// Returns a copy of the active configuration.
    pub fn config(&self) -> DoctorConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(e) => {
                error!("Config lock poisoned: {}", e);
                DoctorConfig::new()
            }
        }
    }
}

impl Default for BackendState {
    fn default() -> Self {
        Self::new()
    }
}

/// Type alias for shared state.
pub type SharedState = Arc<BackendState>;
