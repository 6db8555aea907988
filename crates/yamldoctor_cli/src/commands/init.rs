//! Init command implementation

use std::path::PathBuf;

use miette::{IntoDiagnostic, Result};
use tracing::info;
use yamldoctor_core::DoctorConfig;

const DEFAULT_CONFIG: &str = r#"{
  // "embedded" runs in-process, "container" runs the YAML Doctor image
  "analyzer": "embedded",
  "container": {
    "runtime": "docker",
    "image": "darioajr/yaml-doctor:latest",
    "timeoutSecs": 120
  },
  "autoAnalyze": false,
  "debounceMs": 300,
  "extensions": ["yaml", "yml"],
  "exclude": []
}
"#;

pub fn run_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(DoctorConfig::CONFIG_FILES[0]);

    loop {
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.custom_flags(libc::O_NOFOLLOW);
        }

        match options.open(&config_path) {
            Ok(mut file) => {
                use std::io::Write;
                file.write_all(DEFAULT_CONFIG.as_bytes())
                    .into_diagnostic()?;
                info!("Created {}", config_path.display());
                return Ok(());
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if !force {
                    return Err(miette::miette!(
                        "Config file already exists. Use --force to overwrite."
                    ));
                }

                match std::fs::remove_file(&config_path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e).into_diagnostic(),
                }
            }
            Err(e) => return Err(e).into_diagnostic(),
        }
    }
}
