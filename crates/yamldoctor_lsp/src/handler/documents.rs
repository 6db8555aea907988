//! Document lifecycle handlers (open, save, close).

use std::path::PathBuf;

use tower_lsp::lsp_types::*;
use tracing::{debug, error};

use crate::state::BackendState;

const YAML_LANGUAGE_ID: &str = "yaml";

/// Handles the `textDocument/didOpen` notification.
pub async fn handle_did_open(state: &BackendState, params: DidOpenTextDocumentParams) {
    debug!("Document opened: {}", params.text_document.uri);

    match state.documents.write() {
        Ok(mut docs) => {
            docs.insert(params.text_document.uri, params.text_document.language_id);
        }
        Err(e) => error!("Documents lock poisoned: {}", e),
    }
}

/// Handles the `textDocument/didSave` notification.
///
/// Returns the file to analyze when the save should trigger a run.
pub async fn handle_did_save(
    state: &BackendState,
    params: DidSaveTextDocumentParams,
) -> Option<PathBuf> {
    let uri = params.text_document.uri;
    debug!("Document saved: {}", uri);

    let config = state.config();
    if !config.auto_analyze {
        return None;
    }

    let Ok(path) = uri.to_file_path() else {
        debug!("Skipping analysis for non-file URI: {}", uri);
        return None;
    };

    let is_yaml_document = match state.documents.read() {
        Ok(docs) => docs
            .get(&uri)
            .is_some_and(|language| language == YAML_LANGUAGE_ID),
        Err(e) => {
            error!("Documents lock poisoned: {}", e);
            false
        }
    };

    (is_yaml_document || config.is_yaml_path(&path)).then_some(path)
}

/// Handles the `textDocument/didClose` notification.
pub async fn handle_did_close(state: &BackendState, params: DidCloseTextDocumentParams) {
    debug!("Document closed: {}", params.text_document.uri);

    match state.documents.write() {
        Ok(mut docs) => {
            docs.remove(&params.text_document.uri);
        }
        Err(e) => error!("Documents lock poisoned: {}", e),
    }
}
