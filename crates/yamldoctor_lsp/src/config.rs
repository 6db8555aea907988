//! Configuration management for LSP server.

use std::sync::Arc;

use tracing::{error, info};

use yamldoctor_core::{DoctorConfig, DoctorError};

use crate::state::BackendState;

/// Reloads configuration from the primary workspace root.
///
/// A missing file restores the defaults. On error the previous
/// configuration stays active.
pub fn reload_config(state: &BackendState) -> Result<(), DoctorError> {
    let Some(root) = state.roots().into_iter().next() else {
        return Ok(());
    };

    let config = match DoctorConfig::discover(&root) {
        Some(config_path) => {
            info!("Found config file: {}", config_path.display());
            DoctorConfig::from_file(&config_path)?
        }
        None => DoctorConfig::new(),
    };
    let analyzer = config.analyzer_backend()?;

    match state.analyzer.write() {
        Ok(mut guard) => *guard = Arc::new(analyzer),
        Err(e) => {
            error!("Analyzer lock poisoned: {}", e);
            return Ok(());
        }
    }
    match state.config.write() {
        Ok(mut guard) => *guard = config,
        Err(e) => error!("Config lock poisoned: {}", e),
    }

    info!("Analyzer re-initialized with new config");
    Ok(())
}
