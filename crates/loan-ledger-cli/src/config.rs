//! `loanctl` settings.
//!
//! Looked up in order: `--config <path>`, `$LOANCTL_CONFIG`, `./loanctl.yaml`.
//! With none of them present every field takes its default. Command-line
//! flags override whatever the file says.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use loan_ledger_core::reconciliation::ReconcilerConfig;

use crate::OutputFormat;

const CONFIG_ENV: &str = "LOANCTL_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "loanctl.yaml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub store_path: String,
    pub owner: String,
    pub output: Option<OutputFormat>,
    pub reconciliation: ReconcilerConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            store_path: "loans.json".to_string(),
            owner: "local".to_string(),
            output: None,
            reconciliation: ReconcilerConfig::default(),
        }
    }
}

impl CliConfig {
    pub fn load(explicit: Option<&str>) -> Result<CliConfig, Box<dyn std::error::Error>> {
        match locate(explicit) {
            Some(path) => Self::from_file(&path),
            None => Ok(CliConfig::default()),
        }
    }

    fn from_file(path: &Path) -> Result<CliConfig, Box<dyn std::error::Error>> {
        let yaml = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
        let config = Self::from_yaml(&yaml)
            .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn from_yaml(yaml: &str) -> Result<CliConfig, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(CliConfig::default());
        }
        serde_yaml::from_str(yaml)
    }
}

/// An explicit path must exist; the fallbacks are optional.
fn locate(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.is_file().then_some(local)
}
