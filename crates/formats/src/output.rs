//! Large-output policy and atomic file writes.
//!
//! Small artifacts are handed back inline. Artifacts at or above
//! [`LARGE_OUTPUT_THRESHOLD`] are written under their fixed artifact name and
//! the caller gets the path plus a summary instead of the content.

use crate::emitter::{Artifact, EmitterResult};
use mosaicflow_core::{OutputFormat, ResolvedWorkflow};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Serialized size at which an artifact is no longer returned inline (1 MiB)
pub const LARGE_OUTPUT_THRESHOLD: usize = 1024 * 1024;

/// Summary returned in place of a large artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactSummary {
    /// Format of the artifact
    pub format: OutputFormat,
    /// Number of tasks
    pub tasks: usize,
    /// Number of files
    pub files: usize,
    /// Number of dependency edges
    pub edges: usize,
    /// Serialized size
    pub bytes: usize,
    /// Hex SHA-256 of the content
    pub sha256: String,
}

impl ArtifactSummary {
    /// Summarize an artifact of `workflow`.
    #[must_use]
    pub fn of(artifact: &Artifact, workflow: &ResolvedWorkflow) -> Self {
        Self {
            format: artifact.format,
            tasks: workflow.workflow().tasks().len(),
            files: workflow.workflow().files().len(),
            edges: workflow.dag().edge_count(),
            bytes: artifact.size(),
            sha256: digest(&artifact.content),
        }
    }
}

/// How an artifact reaches its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "delivery", rename_all = "camelCase")]
pub enum Delivery {
    /// Content returned directly
    Inline {
        /// Serialized artifact
        content: String,
    },
    /// Content written to disk
    Stored {
        /// Where it was written
        path: PathBuf,
        /// What was written
        summary: ArtifactSummary,
    },
}

impl Delivery {
    /// Whether the content was returned inline.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }

    /// Path of a stored artifact.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Inline { .. } => None,
            Self::Stored { path, .. } => Some(path),
        }
    }
}

/// Whether content of this size must be stored rather than returned.
#[must_use]
pub const fn is_large(bytes: usize) -> bool {
    bytes >= LARGE_OUTPUT_THRESHOLD
}

/// Apply the large-output policy to one artifact.
///
/// # Errors
/// Returns `EmitterError::Io` if a large artifact cannot be written.
pub fn deliver(
    artifact: Artifact,
    workflow: &ResolvedWorkflow,
    output_dir: &Path,
) -> EmitterResult<Delivery> {
    if !is_large(artifact.size()) {
        return Ok(Delivery::Inline {
            content: artifact.content,
        });
    }
    let summary = ArtifactSummary::of(&artifact, workflow);
    let path = write_atomic(output_dir, &artifact.file_name, &artifact.content)?;
    info!(
        format = %artifact.format,
        path = %path.display(),
        bytes = summary.bytes,
        "Artifact exceeds inline threshold, stored on disk"
    );
    Ok(Delivery::Stored { path, summary })
}

/// Policy outcome for an artifact that has already been written to `path`.
#[must_use]
pub fn delivered_at(artifact: &Artifact, workflow: &ResolvedWorkflow, path: PathBuf) -> Delivery {
    if is_large(artifact.size()) {
        Delivery::Stored {
            path,
            summary: ArtifactSummary::of(artifact, workflow),
        }
    } else {
        Delivery::Inline {
            content: artifact.content.clone(),
        }
    }
}

/// Write `content` to `dir/name` through a temporary file and a rename.
///
/// # Errors
/// Returns the IO error if the directory, temp file or rename fails.
pub fn write_atomic(dir: &Path, name: &str, content: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let target = dir.join(name);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(&target).map_err(|e| e.error)?;
    Ok(target)
}

/// Hex SHA-256 of `content`.
#[must_use]
pub fn digest(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
