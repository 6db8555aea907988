//! YAML Doctor configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use jsonc_parser::ParseOptions;
use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use yamldoctor_analyzer::{
    AnalyzerBackend, BasicEngine, ContainerAnalyzer, ContainerOptions, EmbeddedAnalyzer,
};

use crate::DoctorError;

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Which analyzer backend to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    /// In-process engine.
    #[default]
    Embedded,
    /// Containerized CLI.
    Container,
}

/// Settings for the containerized analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerConfig {
    /// Container runtime executable.
    pub runtime: String,
    /// Image providing the YAML Doctor CLI.
    pub image: String,
    /// Seconds before the container is killed; 0 disables the limit.
    pub timeout_secs: u64,
    /// Report file written under the root.
    pub report_file: String,
    /// Extra CLI flags.
    pub args: Vec<String>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        let defaults = ContainerOptions::default();
        Self {
            runtime: defaults.runtime,
            image: defaults.image,
            timeout_secs: defaults.timeout.map(|t| t.as_secs()).unwrap_or(0),
            report_file: defaults.report_file,
            args: defaults.extra_args,
        }
    }
}

impl ContainerConfig {
    /// Converts into analyzer options.
    pub fn to_options(&self) -> ContainerOptions {
        ContainerOptions {
            runtime: self.runtime.clone(),
            image: self.image.clone(),
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
            report_file: self.report_file.clone(),
            extra_args: self.args.clone(),
        }
    }
}

/// Configuration for YAML Doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorConfig {
    /// Analyzer backend.
    #[serde(default)]
    pub analyzer: AnalyzerKind,

    /// Container backend settings.
    #[serde(default)]
    pub container: ContainerConfig,

    /// Whether saving a YAML file triggers analysis.
    #[serde(default)]
    pub auto_analyze: bool,

    /// Save burst coalescing window in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// File extensions treated as YAML.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns skipped by the embedded engine.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Directory containing the configuration file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_extensions() -> Vec<String> {
    vec!["yaml".to_string(), "yml".to_string()]
}

impl DoctorConfig {
    /// Configuration file names, in lookup order.
    pub const CONFIG_FILES: &'static [&'static str] = &[".yamldoctor.jsonc", ".yamldoctor.json"];

    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            analyzer: AnalyzerKind::default(),
            container: ContainerConfig::default(),
            auto_analyze: false,
            debounce_ms: default_debounce_ms(),
            extensions: default_extensions(),
            exclude: Vec::new(),
            base_dir: None,
        }
    }

    /// Looks for a configuration file directly inside `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        let dir = dir.as_ref();
        Self::CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DoctorError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| DoctorError::config(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_json(&content)?;

        if let Some(parent) = path.parent() {
            config.base_dir = Some(parent.to_path_buf());
        }

        Ok(config)
    }

    /// Loads the configuration found in `dir`, or the defaults.
    pub fn load_or_default(dir: impl AsRef<Path>) -> Result<Self, DoctorError> {
        match Self::discover(dir) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::new()),
        }
    }

    /// Parses configuration from JSON (comments allowed) with schema validation.
    pub fn from_json(json: &str) -> Result<Self, DoctorError> {
        let value: serde_json::Value = jsonc_parser::parse_to_serde_value(json, &ParseOptions::default())
            .map_err(|e| DoctorError::config(format!("Invalid JSON: {}", e)))?
            .unwrap_or(serde_json::Value::Object(serde_json::Map::new()));

        let schema = CONFIG_SCHEMA.get_or_init(|| {
            let schema_json: serde_json::Value =
                serde_json::from_str(SCHEMA_JSON).expect("Invalid embedded config schema");
            Validator::new(&schema_json).expect("Invalid config schema compilation")
        });

        if let Err(e) = schema.validate(&value) {
            let error_msg = format!("{} at {}", e, e.instance_path());
            return Err(DoctorError::config(format!(
                "Config validation failed: {}",
                error_msg
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| DoctorError::config(format!("Invalid config: {}", e)))
    }

    /// Builds the configured analyzer backend.
    pub fn analyzer_backend(&self) -> Result<AnalyzerBackend, DoctorError> {
        match self.analyzer {
            AnalyzerKind::Embedded => {
                let engine = BasicEngine::new(&self.extensions, &self.exclude)
                    .map_err(|e| DoctorError::config(e.to_string()))?;
                Ok(EmbeddedAnalyzer::new(engine).into())
            }
            AnalyzerKind::Container => {
                Ok(ContainerAnalyzer::new(self.container.to_options()).into())
            }
        }
    }

    /// Returns true when `path` has one of the configured YAML extensions.
    pub fn is_yaml_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// The coalescing window as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for DoctorConfig {
    fn default() -> Self {
        Self::new()
    }
}
