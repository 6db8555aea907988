//! LSP request/notification handlers.

mod commands;
mod documents;
mod files;
mod initialize;

pub use commands::{
    ANALYZE_FILE_COMMAND, ANALYZE_WORKSPACE_COMMAND, DoctorCommand, parse_execute_command,
};
pub use documents::{handle_did_close, handle_did_open, handle_did_save};
pub use files::{handle_did_change_watched_files, handle_did_change_workspace_folders};
pub use initialize::{handle_initialize, handle_initialized, handle_shutdown};
