//! Command implementations

mod analyze;
mod init;
mod lsp;

pub use analyze::{run_analyze, run_workspace};
pub use init::run_init;
pub use lsp::run_lsp;
