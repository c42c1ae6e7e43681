//! Optional TOML configuration.
//!
//! Looked up at `--config`, then `./mosaicflow.toml`, then
//! `<config dir>/mosaicflow/config.toml`. A missing file means defaults.
//!
//! ```toml
//! outputDir = "workflows"
//! workflowName = "montage"
//! defaultFormats = ["hyperflow", "wfformat"]
//! dataDir = "data"
//! engineFunction = "{{function}}"
//! estimateSizes = true
//! ```

use crate::errors::CliError;
use mosaicflow_core::OutputFormat;
use mosaicflow_formats::engine::schema::DEFAULT_FUNCTION;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Local configuration file name
pub const LOCAL_CONFIG: &str = "mosaicflow.toml";

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Base directory for generated workflow directories
    pub output_dir: PathBuf,
    /// Name given to planned workflows
    pub workflow_name: String,
    /// Formats generated when none are requested
    pub default_formats: Vec<OutputFormat>,
    /// Where local tables and headers are fetched from
    pub data_dir: PathBuf,
    /// Job function written into engine documents
    pub engine_function: String,
    /// Give unknown file sizes an extension-based estimate
    pub estimate_sizes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("workflows"),
            workflow_name: "montage".to_string(),
            default_formats: vec![OutputFormat::Engine, OutputFormat::Interchange],
            data_dir: PathBuf::from("data"),
            engine_function: DEFAULT_FUNCTION.to_string(),
            estimate_sizes: true,
        }
    }
}

impl Config {
    /// Load configuration, falling back to defaults when no file exists.
    ///
    /// An explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        for candidate in Self::candidates() {
            if candidate.is_file() {
                return Self::from_path(&candidate);
            }
        }
        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    fn candidates() -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("mosaicflow").join("config.toml"));
        }
        candidates
    }

    /// Parse one configuration file.
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::file_error("read configuration", path, e))?;
        let config = Self::parse(&content).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
