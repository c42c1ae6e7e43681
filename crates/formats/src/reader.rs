//! Parse serialized artifacts back into a [`RawWorkflow`].

use crate::raw::RawWorkflow;
use crate::{engine, interchange, legacy};
use miette::Diagnostic;
use mosaicflow_core::{OutputFormat, Workflow};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised when an artifact cannot be read at all.
#[derive(Debug, Error, Diagnostic)]
pub enum ReadError {
    /// Not valid YAML, or not the legacy shape
    #[error("Invalid legacy YAML: {0}")]
    #[diagnostic(code(mosaicflow::read::yaml))]
    Yaml(#[from] serde_yaml::Error),

    /// Not valid JSON, or not the expected shape
    #[error("Invalid {format} JSON: {source}")]
    #[diagnostic(code(mosaicflow::read::json))]
    Json {
        /// Format being read
        format: OutputFormat,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// Interchange document of a version this reader does not know
    #[error("Unsupported schema version '{found}' (expected {expected})")]
    #[diagnostic(
        code(mosaicflow::read::schema_version),
        help("Regenerate the document with a current WfFormat writer")
    )]
    UnsupportedSchemaVersion {
        /// Version in the document
        found: String,
        /// Version this reader understands
        expected: &'static str,
    },

    /// Document references something it never declares
    #[error("Malformed {format} document: {message}")]
    #[diagnostic(code(mosaicflow::read::malformed))]
    Malformed {
        /// Format being read
        format: OutputFormat,
        /// What is wrong
        message: String,
    },

    /// The parsed tasks break IR invariants
    #[error(transparent)]
    #[diagnostic(transparent)]
    Workflow(#[from] mosaicflow_core::Error),

    /// File could not be read
    #[error("Failed to read '{path}': {source}")]
    #[diagnostic(code(mosaicflow::read::io))]
    Io {
        /// Path being read
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ReadError {
    pub(crate) fn json(format: OutputFormat, source: serde_json::Error) -> Self {
        Self::Json { format, source }
    }

    pub(crate) fn malformed(format: OutputFormat, message: impl Into<String>) -> Self {
        Self::Malformed {
            format,
            message: message.into(),
        }
    }
}

/// Result type for readers
pub type ReadResult<T> = std::result::Result<T, ReadError>;

/// Parse `content` as the given format.
///
/// # Errors
/// Returns `ReadError` if the content does not parse as that format.
pub fn read(format: OutputFormat, content: &str) -> ReadResult<RawWorkflow> {
    let raw = match format {
        OutputFormat::Legacy => legacy::read(content)?,
        OutputFormat::Engine => engine::read(content)?,
        OutputFormat::Interchange => interchange::read(content)?,
    };
    debug!(
        format = %format,
        tasks = raw.tasks.len(),
        files = raw.files.len(),
        "Parsed workflow artifact"
    );
    Ok(raw)
}

/// Read a file, detecting the format unless one is given.
///
/// # Errors
/// Returns `ReadError` if the file cannot be read or parsed.
pub fn read_path(path: &Path, format: Option<OutputFormat>) -> ReadResult<(OutputFormat, RawWorkflow)> {
    let content = std::fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let format = format.unwrap_or_else(|| OutputFormat::detect(Some(path), &content));
    Ok((format, read(format, &content)?))
}

/// Parse and freeze in one step.
///
/// # Errors
/// Returns `ReadError` if parsing fails or the tasks break IR invariants.
pub fn read_workflow(format: OutputFormat, content: &str) -> ReadResult<Workflow> {
    Ok(read(format, content)?.into_workflow()?)
}
