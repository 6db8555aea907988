//! Watched files and workspace folder handlers.

use tower_lsp::lsp_types::*;
use tracing::{debug, error, info};

use yamldoctor_core::{DoctorConfig, FileId};

use crate::config::reload_config;
use crate::state::BackendState;

/// Handles the `workspace/didChangeWatchedFiles` notification.
///
/// Returns the number of store entries dropped for deleted files.
pub async fn handle_did_change_watched_files(
    state: &BackendState,
    params: DidChangeWatchedFilesParams,
) -> usize {
    debug!("Watched files changed: {:?}", params.changes);

    let config_changed = params.changes.iter().any(|change| {
        let path = change.uri.path();
        DoctorConfig::CONFIG_FILES
            .iter()
            .any(|name| path.ends_with(name))
    });

    if config_changed {
        info!("Configuration file changed, reloading...");
        if let Err(e) = reload_config(state) {
            error!("Failed to reload config: {}", e);
        }
    }

    params
        .changes
        .iter()
        .filter(|change| change.typ == FileChangeType::DELETED)
        .filter_map(|change| change.uri.to_file_path().ok())
        .filter(|path| state.store.remove(&FileId::from_path(path)).is_some())
        .count()
}

/// Handles the `workspace/didChangeWorkspaceFolders` notification.
pub async fn handle_did_change_workspace_folders(
    state: &BackendState,
    params: DidChangeWorkspaceFoldersParams,
) {
    let mut roots = state.roots();

    for removed in &params.event.removed {
        if let Ok(path) = removed.uri.to_file_path() {
            roots.retain(|root| root != &path);
        }
    }
    for added in &params.event.added {
        if let Ok(path) = added.uri.to_file_path()
            && !roots.contains(&path)
        {
            roots.push(path);
        }
    }

    info!("Workspace folders changed: {} roots", roots.len());
    state.set_roots(roots);
    if let Err(e) = reload_config(state) {
        error!("Failed to reload config: {}", e);
    }
}
