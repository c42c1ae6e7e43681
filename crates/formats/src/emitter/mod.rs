//! Workflow Emitter Trait
//!
//! Defines the interface shared by every format compiler. An emitter turns a
//! resolved workflow into one serialized artifact plus the auxiliary sidecar
//! files the output directory needs.
//!
//! ## Emitter Registry
//!
//! The [`EmitterRegistry`] provides a central registry for all available
//! emitters, enabling lookup by format name and enumeration for the CLI.

mod registry;

pub use registry::{EmitterInfo, EmitterRegistry, EmitterRegistryBuilder};

use crate::sidecar::{self, SidecarFile};
use miette::Diagnostic;
use mosaicflow_core::{OutputFormat, ResolvedWorkflow};
use thiserror::Error;

/// Error types for emitter operations
#[derive(Debug, Error, Diagnostic)]
pub enum EmitterError {
    /// YAML/JSON serialization failed
    #[error("Serialization failed: {0}")]
    #[diagnostic(code(mosaicflow::emit::serialization))]
    Serialization(String),

    /// The workflow lacks data this format requires
    #[error("Cannot compile '{subject}' to {format}: {message}")]
    #[diagnostic(code(mosaicflow::emit::compilation))]
    Compilation {
        /// Target format
        format: OutputFormat,
        /// Offending task or file
        subject: String,
        /// What is missing
        message: String,
    },

    /// No emitter is registered under the name
    #[error("Unknown format '{name}'. Available: {available}")]
    #[diagnostic(code(mosaicflow::emit::unknown_format))]
    UnknownFormat {
        /// Requested name
        name: String,
        /// Comma-separated registered names
        available: String,
    },

    /// The artifact could not be written to its final location
    #[error("Failed to write '{}': {source}", .path.display())]
    #[diagnostic(code(mosaicflow::emit::write))]
    Write {
        /// Target path
        path: std::path::PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// IO error during emission
    #[error("IO error: {0}")]
    #[diagnostic(code(mosaicflow::emit::io))]
    Io(#[from] std::io::Error),
}

impl EmitterError {
    /// Create a compilation error for one format
    pub fn compilation(
        format: OutputFormat,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Compilation {
            format,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

/// Result type for emitter operations
pub type EmitterResult<T> = std::result::Result<T, EmitterError>;

/// A compiled artifact, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Format that produced it
    pub format: OutputFormat,
    /// File name inside an output directory
    pub file_name: String,
    /// Serialized content
    pub content: String,
    /// Auxiliary files that accompany the artifact
    pub sidecars: Vec<SidecarFile>,
}

impl Artifact {
    /// Serialized size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Trait for workflow format emitters
///
/// Implementations map the IR onto one target schema. They read the shared
/// [`ResolvedWorkflow`] and never modify it, so several emitters can run
/// against the same workflow concurrently.
///
/// # Example
///
/// ```ignore
/// use mosaicflow_formats::emitter::{Emitter, EmitterResult};
///
/// struct CountEmitter;
///
/// impl Emitter for CountEmitter {
///     fn emit(&self, workflow: &ResolvedWorkflow) -> EmitterResult<String> {
///         Ok(format!("{}\n", workflow.workflow().tasks().len()))
///     }
///
///     fn format(&self) -> OutputFormat {
///         OutputFormat::Legacy
///     }
/// }
/// ```
pub trait Emitter: Send + Sync {
    /// Serialize the workflow.
    ///
    /// # Errors
    /// Returns `EmitterError` if the workflow cannot be expressed in this
    /// format or serialization fails
    fn emit(&self, workflow: &ResolvedWorkflow) -> EmitterResult<String>;

    /// The format this emitter produces
    fn format(&self) -> OutputFormat;

    /// Get the format identifier for this emitter
    ///
    /// Used for CLI flag matching (e.g., "yaml", "hyperflow", "wfformat")
    fn format_name(&self) -> &'static str {
        self.format().name()
    }

    /// Get the file extension for output files
    fn file_extension(&self) -> &'static str {
        self.format().extension()
    }

    /// File name of the primary artifact
    fn artifact_name(&self) -> &'static str {
        self.format().artifact_name()
    }

    /// Get a human-readable description of this emitter
    fn description(&self) -> &'static str {
        "Workflow emitter"
    }

    /// Validate the workflow before emission
    ///
    /// Override this to check format-specific requirements up front.
    ///
    /// # Errors
    /// Returns `EmitterError::Compilation` naming the offending task or file
    fn validate(&self, workflow: &ResolvedWorkflow) -> EmitterResult<()> {
        let _ = workflow;
        Ok(())
    }

    /// Auxiliary files written next to the artifact
    fn sidecars(&self, workflow: &ResolvedWorkflow) -> Vec<SidecarFile> {
        sidecar::standard_sidecars(workflow.workflow())
    }

    /// Validate, emit and gather sidecars.
    ///
    /// # Errors
    /// Propagates errors from [`Emitter::validate`] and [`Emitter::emit`]
    fn compile(&self, workflow: &ResolvedWorkflow) -> EmitterResult<Artifact> {
        self.validate(workflow)?;
        let content = self.emit(workflow)?;
        Ok(Artifact {
            format: self.format(),
            file_name: self.artifact_name().to_string(),
            content,
            sidecars: self.sidecars(workflow),
        })
    }
}
