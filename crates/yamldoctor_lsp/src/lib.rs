//! YAML Doctor LSP Server
//!
//! Language Server Protocol implementation for YAML Doctor.
//! Re-analyzes YAML files on save and publishes the reconciled diagnostics.

use std::sync::{Arc, Weak};

use serde_json::{Value, json};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{debug, error, info};

use yamldoctor_core::{AnalysisOutcome, AnalysisScope, AnalysisSession, FileId, StoreEvent};

mod config;
pub mod conversion;
mod handler;
mod queue;
mod state;

pub use handler::{ANALYZE_FILE_COMMAND, ANALYZE_WORKSPACE_COMMAND, DoctorCommand};
pub use queue::AnalysisQueue;

use handler::*;
use state::{BackendState, SharedState};

/// The LSP backend for YAML Doctor.
#[derive(Clone)]
pub struct Backend {
    /// LSP client for sending notifications.
    client: Client,
    /// Shared state
    state: SharedState,
    /// Save-triggered runs.
    queue: AnalysisQueue,
}

impl Backend {
    /// Creates a new backend with the given client.
    ///
    /// Must be called from within a Tokio runtime: the save queue and the
    /// diagnostics publisher are spawned here.
    pub fn new(client: Client) -> Self {
        let state: SharedState = Arc::new(BackendState::new());
        let debounce = state.config().debounce();

        spawn_publisher(client.clone(), Arc::downgrade(&state));

        let queue = {
            let client = client.clone();
            let state = Arc::downgrade(&state);
            AnalysisQueue::spawn(debounce, move |path| {
                let client = client.clone();
                let state = state.clone();
                async move {
                    if let Some(state) = state.upgrade() {
                        analyze(&client, &state, AnalysisScope::SingleFile(path)).await;
                    }
                }
            })
        };

        Self {
            client,
            state,
            queue,
        }
    }
}

/// Runs one analysis and reports the outcome to the client.
async fn analyze(client: &Client, state: &BackendState, scope: AnalysisScope) -> AnalysisOutcome {
    let outcome = match state.analyzer() {
        Some(analyzer) => {
            let session = AnalysisSession::new(&state.store, state.roots());
            session.run_exclusive(scope, &*analyzer, &state.locks).await
        }
        None => AnalysisOutcome::Failed(yamldoctor_core::DoctorError::config(
            "Analyzer is not available",
        )),
    };

    match &outcome {
        AnalysisOutcome::Completed(summary) => {
            client
                .show_message(
                    MessageType::INFO,
                    format!("YAML Doctor analysis complete. Score: {}/100", summary.score),
                )
                .await;
        }
        AnalysisOutcome::Failed(err) => {
            client
                .show_message(
                    MessageType::ERROR,
                    format!("YAML Doctor analysis failed: {}", err),
                )
                .await;
        }
    }

    outcome
}

/// Forwards store changes to the client as `publishDiagnostics`.
///
/// The task ends once the state is dropped.
fn spawn_publisher(client: Client, state: Weak<BackendState>) {
    let Some(mut events) = state.upgrade().map(|s| s.store.subscribe()) else {
        return;
    };

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let Some(state) = state.upgrade() else {
                break;
            };
            match event {
                StoreEvent::Updated(ids) => {
                    for id in ids {
                        let diagnostics = state
                            .store
                            .get(&id)
                            .map(|report| conversion::report_diagnostics(&report))
                            .unwrap_or_default();
                        publish(&client, &id, diagnostics).await;
                    }
                }
                StoreEvent::Removed(id) => publish(&client, &id, Vec::new()).await,
            }
        }
        debug!("Diagnostics publisher stopped");
    });
}

async fn publish(client: &Client, id: &FileId, diagnostics: Vec<Diagnostic>) {
    match Url::from_file_path(id.as_path()) {
        Ok(uri) => client.publish_diagnostics(uri, diagnostics, None).await,
        Err(()) => debug!("Skipping publish for non-absolute identity: {}", id),
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let result = handle_initialize(&self.state, params).await;
        self.queue.set_debounce(self.state.config().debounce());
        result
    }

    async fn initialized(&self, _: InitializedParams) {
        handle_initialized(&self.client).await;
    }

    async fn shutdown(&self) -> Result<()> {
        handle_shutdown().await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        handle_did_open(&self.state, params).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        if let Some(path) = handle_did_save(&self.state, params).await {
            self.queue.enqueue(path);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        handle_did_close(&self.state, params).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let removed = handle_did_change_watched_files(&self.state, params).await;
        self.queue.set_debounce(self.state.config().debounce());
        if removed > 0 {
            debug!("Dropped diagnostics for {} deleted files", removed);
        }
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        handle_did_change_workspace_folders(&self.state, params).await;
        self.queue.set_debounce(self.state.config().debounce());
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        debug!("Execute command request: {}", params.command);

        let scope = match parse_execute_command(&params)? {
            DoctorCommand::AnalyzeTarget(path) => match AnalysisScope::for_target(&path) {
                Ok(scope) => scope,
                Err(e) => {
                    error!("Cannot analyze {}: {}", path.display(), e);
                    self.client
                        .show_message(MessageType::ERROR, format!("YAML Doctor: {}", e))
                        .await;
                    return Ok(None);
                }
            },
            DoctorCommand::AnalyzeWorkspace => AnalysisScope::Workspace(self.state.roots()),
        };

        match analyze(&self.client, &self.state, scope).await {
            AnalysisOutcome::Completed(summary) => Ok(Some(json!({
                "score": summary.score,
                "filesAnalyzed": summary.files_analyzed(),
            }))),
            AnalysisOutcome::Failed(_) => Ok(None),
        }
    }
}

/// Starts the LSP server.
///
/// This function does not return unless an error occurs or the server shuts down.
pub async fn run() {
    info!("YAML Doctor LSP server starting...");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
