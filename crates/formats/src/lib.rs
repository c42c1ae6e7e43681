//! Workflow compilers and readers for mosaicflow.
//!
//! Every output format is an [`Emitter`] that turns a [`ResolvedWorkflow`]
//! into one serialized document plus the shared auxiliary files. Each
//! format module also carries the reader that turns its documents back
//! into a [`RawWorkflow`].
//!
//! # Formats
//!
//! - [`legacy`]: flat YAML listing of files and tasks
//! - [`engine`]: HyperFlow-style process/signal graph
//! - [`interchange`]: WfFormat 1.5 specification and execution sections
//!
//! # Example
//!
//! ```ignore
//! use mosaicflow_formats::{EmitterRegistry, Orchestrator};
//! use mosaicflow_core::OutputFormat;
//!
//! let orchestrator = Orchestrator::new(EmitterRegistry::with_defaults(), "output");
//! let report = orchestrator.generate(&resolved, &OutputFormat::ALL)?;
//! println!("{}", report.output_dir.display());
//! ```
//!
//! [`ResolvedWorkflow`]: mosaicflow_core::ResolvedWorkflow

pub mod emitter;
pub mod engine;
pub mod interchange;
pub mod legacy;
pub mod lock;
pub mod orchestrator;
pub mod output;
pub mod raw;
pub mod reader;
pub mod sidecar;
pub mod summary;
pub mod validator;

pub use emitter::{
    Artifact, Emitter, EmitterError, EmitterInfo, EmitterRegistry, EmitterRegistryBuilder,
    EmitterResult,
};
pub use engine::EngineEmitter;
pub use interchange::InterchangeEmitter;
pub use legacy::LegacyEmitter;
pub use lock::{LockError, OutputLock};
pub use orchestrator::{FormatOutcome, GenerationReport, Orchestrator, OrchestratorError};
pub use output::{ArtifactSummary, Delivery, LARGE_OUTPUT_THRESHOLD};
pub use raw::RawWorkflow;
pub use reader::{ReadError, ReadResult, read, read_path, read_workflow};
pub use sidecar::SidecarFile;
pub use validator::{ValidationReport, Violation, Warning, validate_document, validate_workflow};
