//! `workspace/executeCommand` parsing.

use std::path::PathBuf;

use serde_json::Value;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::{ExecuteCommandParams, Url};

/// Analyzes the file or directory given as the first argument.
pub const ANALYZE_FILE_COMMAND: &str = "yamlDoctor.analyzeFile";

/// Analyzes the primary workspace root.
pub const ANALYZE_WORKSPACE_COMMAND: &str = "yamlDoctor.analyzeWorkspace";

/// A parsed workspace command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoctorCommand {
    /// Analyze a file or directory.
    AnalyzeTarget(PathBuf),
    /// Analyze the workspace.
    AnalyzeWorkspace,
}

/// Parses an `ExecuteCommandParams` into a [`DoctorCommand`].
pub fn parse_execute_command(params: &ExecuteCommandParams) -> Result<DoctorCommand> {
    match params.command.as_str() {
        ANALYZE_FILE_COMMAND => {
            let target = params
                .arguments
                .first()
                .and_then(argument_path)
                .ok_or_else(|| {
                    Error::invalid_params(format!(
                        "{} expects a file or directory URI",
                        ANALYZE_FILE_COMMAND
                    ))
                })?;
            Ok(DoctorCommand::AnalyzeTarget(target))
        }
        ANALYZE_WORKSPACE_COMMAND => Ok(DoctorCommand::AnalyzeWorkspace),
        other => Err(Error::invalid_params(format!("Unknown command: {}", other))),
    }
}

/// Accepts a `file://` URI, a plain path, or an object with a `uri` or
/// `fsPath` field.
fn argument_path(arg: &Value) -> Option<PathBuf> {
    let raw = match arg {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map
            .get("uri")
            .or_else(|| map.get("fsPath"))
            .and_then(Value::as_str)?,
        _ => return None,
    };

    if raw.starts_with("file:") {
        Url::parse(raw).ok()?.to_file_path().ok()
    } else {
        Some(PathBuf::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn params(command: &str, arguments: Vec<Value>) -> ExecuteCommandParams {
        ExecuteCommandParams {
            command: command.to_string(),
            arguments,
            work_done_progress_params: Default::default(),
        }
    }

    #[test]
    fn test_analyze_file_with_uri() {
        let cmd = parse_execute_command(&params(
            ANALYZE_FILE_COMMAND,
            vec![json!("file:///ws/k8s/deploy.yaml")],
        ))
        .unwrap();
        assert_eq!(
            cmd,
            DoctorCommand::AnalyzeTarget(PathBuf::from("/ws/k8s/deploy.yaml"))
        );
    }

    #[test]
    fn test_analyze_file_with_object_argument() {
        let cmd = parse_execute_command(&params(
            ANALYZE_FILE_COMMAND,
            vec![json!({ "fsPath": "/ws/k8s" })],
        ))
        .unwrap();
        assert_eq!(cmd, DoctorCommand::AnalyzeTarget(PathBuf::from("/ws/k8s")));
    }

    #[test]
    fn test_analyze_file_requires_argument() {
        assert!(parse_execute_command(&params(ANALYZE_FILE_COMMAND, vec![])).is_err());
        assert!(parse_execute_command(&params(ANALYZE_FILE_COMMAND, vec![json!(3)])).is_err());
    }

    #[test]
    fn test_analyze_workspace_and_unknown() {
        assert_eq!(
            parse_execute_command(&params(ANALYZE_WORKSPACE_COMMAND, vec![])).unwrap(),
            DoctorCommand::AnalyzeWorkspace
        );
        assert!(parse_execute_command(&params("yamlDoctor.viewReport", vec![])).is_err());
    }
}
