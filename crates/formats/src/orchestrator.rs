//! Multi-format Orchestration
//!
//! Compiles one resolved workflow to several formats at once. Every
//! compiler runs in parallel in its own scratch directory; the first
//! successful format's auxiliary files become the reference that every
//! other format must match byte for byte. Final files land in one shared
//! output directory under a lock, each written atomically.

use crate::emitter::{Artifact, EmitterError, EmitterRegistry};
use crate::lock::{LockError, OutputLock};
use crate::output::{self, Delivery};
use crate::summary::{self, INFO_FILE, ListedArtifact};
use miette::Diagnostic;
use mosaicflow_core::{OutputFormat, ResolvedWorkflow, Workflow, WorkflowStats};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort a whole generation
#[derive(Debug, Error, Diagnostic)]
pub enum OrchestratorError {
    /// Two formats produced different auxiliary files
    #[error("Auxiliary file '{file}' differs between {first} and {other}")]
    #[diagnostic(
        code(mosaicflow::generate::auxiliary_mismatch),
        help("The planning step is not deterministic; the generated directories cannot be trusted")
    )]
    AuxiliaryMismatch {
        /// Diverging sidecar
        file: String,
        /// Reference format
        first: OutputFormat,
        /// Format that disagrees
        other: OutputFormat,
    },

    /// Nothing to generate
    #[error("No output formats requested")]
    #[diagnostic(code(mosaicflow::generate::no_formats))]
    NoFormats,

    /// Output directory lock failed
    #[error(transparent)]
    #[diagnostic(code(mosaicflow::generate::lock))]
    Lock(#[from] LockError),

    /// Filesystem error
    #[error("Failed to write '{}': {source}", .path.display())]
    #[diagnostic(code(mosaicflow::generate::io))]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl OrchestratorError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result of one format in a generation
#[derive(Debug)]
pub struct FormatOutcome {
    /// Requested format
    pub format: OutputFormat,
    /// Where the artifact went, or why it failed
    pub result: Result<Delivery, EmitterError>,
}

/// Result of a multi-format generation
#[derive(Debug)]
pub struct GenerationReport {
    /// Shared output directory
    pub output_dir: PathBuf,
    /// One entry per requested format, in request order
    pub outcomes: Vec<FormatOutcome>,
    /// Auxiliary files written once into the output directory
    pub sidecars: Vec<PathBuf>,
    /// Written `WORKFLOW-INFO.txt`, if any format succeeded
    pub summary: Option<PathBuf>,
}

impl GenerationReport {
    /// Formats that compiled.
    pub fn succeeded(&self) -> impl Iterator<Item = OutputFormat> + '_ {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.format)
    }

    /// Formats that failed, with their errors.
    pub fn failed(&self) -> impl Iterator<Item = (OutputFormat, &EmitterError)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.format, e)))
    }

    /// Every requested format compiled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

/// An artifact compiled and written into a private scratch area.
struct Staged {
    artifact: Artifact,
    workdir: TempDir,
}

impl Staged {
    fn stage(artifact: Artifact) -> Result<Self, EmitterError> {
        let workdir = tempfile::Builder::new()
            .prefix(&format!("mosaicflow-{}-", artifact.format.name()))
            .tempdir()?;
        std::fs::write(workdir.path().join(&artifact.file_name), &artifact.content)?;
        for sidecar in &artifact.sidecars {
            std::fs::write(workdir.path().join(&sidecar.name), &sidecar.content)?;
        }
        Ok(Self { artifact, workdir })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.workdir.path().join(name)
    }

    fn sidecar_digests(&self) -> BTreeMap<&str, String> {
        self.artifact
            .sidecars
            .iter()
            .map(|s| (s.name.as_str(), output::digest(&s.content)))
            .collect()
    }
}

/// Drives the compilers for one generation.
pub struct Orchestrator {
    registry: EmitterRegistry,
    base_dir: PathBuf,
    lock_timeout: Duration,
}

impl Orchestrator {
    /// Orchestrator writing under `base_dir`.
    pub fn new(registry: EmitterRegistry, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            base_dir: base_dir.into(),
            lock_timeout: crate::lock::DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Set how long to wait for the output directory lock.
    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Output directory for a workflow:
    /// `<sanitized center>_<degrees>deg_<YYYYmmdd_HHMMSS>`.
    #[must_use]
    pub fn output_dir(&self, workflow: &Workflow) -> PathBuf {
        self.base_dir.join(directory_name(workflow))
    }

    /// Compile `workflow` to every requested format.
    ///
    /// A format that fails to compile or to write is reported in its
    /// outcome and does not stop the others.
    ///
    /// # Errors
    ///
    /// - [`OrchestratorError::NoFormats`] if `formats` is empty
    /// - [`OrchestratorError::AuxiliaryMismatch`] if two formats disagree on
    ///   an auxiliary file; nothing is written in that case
    /// - [`OrchestratorError::Lock`] / [`OrchestratorError::Io`] on
    ///   filesystem failures
    pub fn generate(
        &self,
        workflow: &ResolvedWorkflow,
        formats: &[OutputFormat],
    ) -> Result<GenerationReport, OrchestratorError> {
        let mut requested = Vec::new();
        for format in formats {
            if !requested.contains(format) {
                requested.push(*format);
            }
        }
        if requested.is_empty() {
            return Err(OrchestratorError::NoFormats);
        }

        let staged: Vec<(OutputFormat, Result<Staged, EmitterError>)> = requested
            .par_iter()
            .map(|&format| {
                let result = self
                    .registry
                    .for_format(format)
                    .and_then(|emitter| emitter.compile(workflow))
                    .and_then(Staged::stage);
                (format, result)
            })
            .collect();

        for (format, result) in &staged {
            match result {
                Ok(s) => debug!(format = %format, bytes = s.artifact.size(), "Compiled artifact"),
                Err(e) => warn!(format = %format, error = %e, "Format failed to compile"),
            }
        }

        let reference = reconcile(&staged)?;

        let output_dir = self.output_dir(workflow.workflow());
        let _guard = OutputLock::new(&output_dir)
            .with_timeout(self.lock_timeout)
            .acquire("generate")?;

        let mut sidecars = Vec::new();
        if let Some(first) = reference {
            for sidecar in &first.artifact.sidecars {
                let source = first.path(&sidecar.name);
                let content = std::fs::read_to_string(&source)
                    .map_err(|e| OrchestratorError::io(&source, e))?;
                let path = output::write_atomic(&output_dir, &sidecar.name, &content)
                    .map_err(|e| OrchestratorError::io(output_dir.join(&sidecar.name), e))?;
                sidecars.push(path);
            }
        }

        let mut outcomes = Vec::with_capacity(staged.len());
        let mut listed = Vec::new();
        for (format, result) in staged {
            let result = result.and_then(|staged| {
                let artifact = &staged.artifact;
                let path =
                    output::write_atomic(&output_dir, &artifact.file_name, &artifact.content)
                        .map_err(|source| EmitterError::Write {
                            path: output_dir.join(&artifact.file_name),
                            source,
                        })?;
                info!(format = %format, path = %path.display(), bytes = artifact.size(), "Wrote workflow artifact");
                listed.push(ListedArtifact {
                    format,
                    file_name: artifact.file_name.clone(),
                    bytes: artifact.size(),
                });
                Ok(output::delivered_at(artifact, workflow, path))
            });
            if let Err(e @ EmitterError::Write { .. }) = &result {
                warn!(format = %format, error = %e, "Format failed to write");
            }
            outcomes.push(FormatOutcome { format, result });
        }

        let summary = if listed.is_empty() {
            None
        } else {
            let names: Vec<String> = sidecars
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect();
            let text = summary::render(
                workflow.workflow(),
                &WorkflowStats::of_resolved(workflow),
                &listed,
                &names,
            );
            Some(
                output::write_atomic(&output_dir, INFO_FILE, &text)
                    .map_err(|e| OrchestratorError::io(output_dir.join(INFO_FILE), e))?,
            )
        };

        Ok(GenerationReport {
            output_dir,
            outcomes,
            sidecars,
            summary,
        })
    }
}

/// Check every successful format's sidecars against the first one's.
fn reconcile(
    staged: &[(OutputFormat, Result<Staged, EmitterError>)],
) -> Result<Option<&Staged>, OrchestratorError> {
    let mut succeeded = staged
        .iter()
        .filter_map(|(format, result)| result.as_ref().ok().map(|s| (*format, s)));
    let Some((first_format, first)) = succeeded.next() else {
        return Ok(None);
    };
    let expected = first.sidecar_digests();

    for (format, other) in succeeded {
        let actual = other.sidecar_digests();
        let names: BTreeSet<&str> = expected.keys().chain(actual.keys()).copied().collect();
        for name in names {
            if expected.get(name) != actual.get(name) {
                return Err(OrchestratorError::AuxiliaryMismatch {
                    file: name.to_string(),
                    first: first_format,
                    other: format,
                });
            }
        }
        debug!(first = %first_format, other = %format, "Auxiliary files agree");
    }
    Ok(Some(first))
}

fn directory_name(workflow: &Workflow) -> String {
    let params = workflow.params();
    let center = if params.center.is_empty() {
        workflow.name()
    } else {
        params.center.as_str()
    };
    let safe: String = center
        .replace(' ', "_")
        .replace(':', "")
        .replace('/', "_")
        .chars()
        .take(50)
        .collect();
    format!(
        "{safe}_{:?}deg_{}",
        params.degrees,
        workflow.created_at().format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mosaicflow_core::{Coordinates, File, GenerationParams, Task, WorkflowBuilder};

    fn workflow() -> Workflow {
        let mut builder = WorkflowBuilder::new("m17");
        builder.created_at(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap());
        builder.params(GenerationParams {
            center: "275.196 -16.171".to_string(),
            coordinates: Coordinates::parse("275.196 -16.171"),
            degrees: 0.5,
            bands: vec!["dss:DSS2B:blue".to_string()],
            formats: vec![],
        });
        builder.build()
    }

    #[test]
    fn test_directory_name() {
        let name = directory_name(&workflow());
        assert_eq!(name, "275.196_-16.171_0.5deg_20260102_030405");
    }

    #[test]
    fn test_directory_name_sanitizes() {
        let mut builder = WorkflowBuilder::new("w");
        builder.created_at(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap());
        builder.params(GenerationParams {
            center: "M 17/a:b".to_string(),
            degrees: 1.0,
            ..GenerationParams::default()
        });
        assert_eq!(directory_name(&builder.build()), "M_17_ab_1.0deg_20260102_030405");
    }

    #[test]
    fn test_no_formats() {
        let tmp = TempDir::new().unwrap();
        let orchestrator = Orchestrator::new(EmitterRegistry::with_defaults(), tmp.path());
        let mut builder = WorkflowBuilder::new("w");
        builder.add_file(File::local("m"));
        builder.add_task(Task::new("t", "mAdd").output("m")).unwrap();
        let resolved = ResolvedWorkflow::resolve(builder.build()).unwrap();
        assert!(matches!(
            orchestrator.generate(&resolved, &[]),
            Err(OrchestratorError::NoFormats)
        ));
    }
}
