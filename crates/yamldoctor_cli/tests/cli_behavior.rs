//! Integration tests for CLI behavior
//!
//! These tests verify the external behavior of the CLI tool,
//! following behavior-driven testing principles.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to create a command for the ydoc CLI
fn ydoc_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ydoc"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

mod help_command {
    use super::*;

    #[test]
    fn shows_help_with_flag() {
        ydoc_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"));
    }

    #[test]
    fn shows_version_with_flag() {
        ydoc_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}

mod analyze_command {
    use super::*;

    #[test]
    fn clean_file_succeeds_with_full_score() {
        let target = fixtures_dir().join("k8s/configmap.yaml");

        ydoc_cmd()
            .arg("analyze")
            .arg(&target)
            .arg("--root")
            .arg(fixtures_dir().join("k8s"))
            .assert()
            .success()
            .stdout(predicate::str::contains("Checked 1 files, found 0 issues"));
    }

    #[test]
    fn syntax_error_exits_with_one() {
        let target = fixtures_dir().join("broken.yaml");

        ydoc_cmd()
            .arg("analyze")
            .arg(&target)
            .arg("--root")
            .arg(fixtures_dir())
            .assert()
            .code(1)
            .stdout(predicate::str::contains("broken.yaml:"))
            .stdout(predicate::str::contains("[E001]"));
    }

    #[test]
    fn directory_reports_every_file() {
        ydoc_cmd()
            .arg("analyze")
            .arg(fixtures_dir().join("k8s"))
            .assert()
            .success()
            .stdout(predicate::str::contains("Checked 2 files"))
            .stdout(predicate::str::contains("deployment.yml:"))
            .stdout(predicate::str::contains("[I001]"))
            .stdout(predicate::str::contains("Score: 100/100"));
    }

    #[test]
    fn json_output_is_machine_readable() {
        let output = ydoc_cmd()
            .arg("analyze")
            .arg(fixtures_dir().join("k8s"))
            .arg("--format")
            .arg("json")
            .output()
            .unwrap();

        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["score"], 100.0);

        let files = value["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        let deployment = files
            .iter()
            .find(|f| f["path"] == "deployment.yml")
            .unwrap();
        assert_eq!(deployment["issues"][0]["ruleId"], "I001");
        assert_eq!(deployment["issues"][0]["severity"], "info");
        assert_eq!(deployment["issues"][0]["line"], 1);
    }

    #[test]
    fn missing_target_exits_with_two() {
        ydoc_cmd()
            .arg("analyze")
            .arg(fixtures_dir().join("missing.yaml"))
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Target not found"));
    }

    #[test]
    fn file_outside_roots_is_rejected() {
        let temp = tempfile::tempdir().unwrap();

        ydoc_cmd()
            .arg("analyze")
            .arg(fixtures_dir().join("k8s/configmap.yaml"))
            .arg("--root")
            .arg(temp.path())
            .assert()
            .code(2)
            .stderr(predicate::str::contains("must be in a workspace"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("a.yaml"), "key: value\n").unwrap();
        fs::write(
            temp.path().join(".yamldoctor.json"),
            r#"{ "analyzer": "remote" }"#,
        )
        .unwrap();

        ydoc_cmd()
            .current_dir(temp.path())
            .arg("analyze")
            .arg("a.yaml")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Config validation failed"));
    }

    #[test]
    fn missing_container_runtime_is_unavailable() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("a.yaml"), "key: value\n").unwrap();
        fs::write(
            temp.path().join(".yamldoctor.json"),
            r#"{ "container": { "runtime": "ydoc-no-such-runtime" } }"#,
        )
        .unwrap();

        ydoc_cmd()
            .current_dir(temp.path())
            .arg("--analyzer")
            .arg("container")
            .arg("analyze")
            .arg(".")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Analyzer unavailable"));
    }
}

mod workspace_command {
    use super::*;

    #[test]
    fn analyzes_primary_root_only() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("a.yaml"), "key: value\n").unwrap();
        fs::write(second.path().join("b.yaml"), "root:\n\tchild: 1\n").unwrap();

        ydoc_cmd()
            .arg("workspace")
            .arg(first.path())
            .arg(second.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Checked 1 files, found 0 issues"));
    }
}

mod init_command {
    use super::*;

    #[test]
    fn creates_config_file() {
        let temp = tempfile::tempdir().unwrap();

        ydoc_cmd()
            .current_dir(temp.path())
            .arg("init")
            .assert()
            .success();

        let content = fs::read_to_string(temp.path().join(".yamldoctor.jsonc")).unwrap();
        assert!(content.contains("\"analyzer\""));
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(".yamldoctor.jsonc"), "{}").unwrap();

        ydoc_cmd()
            .current_dir(temp.path())
            .arg("init")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("already exists"));

        ydoc_cmd()
            .current_dir(temp.path())
            .arg("init")
            .arg("--force")
            .assert()
            .success();

        let content = fs::read_to_string(temp.path().join(".yamldoctor.jsonc")).unwrap();
        assert!(content.contains("debounceMs"));
    }
}
