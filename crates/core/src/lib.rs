//! Workflow intermediate representation for mosaicflow.
//!
//! A [`Workflow`] is a frozen set of tasks and files. Task-to-task edges are
//! never stored; [`ResolvedWorkflow`] derives them from producer/consumer
//! declarations and carries the resulting [`Dag`] alongside the workflow so
//! that every compiler reads the same ordering.
//!
//! ```ignore
//! use mosaicflow_core::{File, ResolvedWorkflow, Task, WorkflowBuilder};
//!
//! let mut builder = WorkflowBuilder::new("montage");
//! builder.add_file(File::remote("raw.fits", "https://example.org/raw.fits"));
//! builder.add_file(File::local("p.fits"));
//! builder.add_task(Task::new("mProject_000001", "mProject").input("raw.fits").output("p.fits"))?;
//! let resolved = ResolvedWorkflow::resolve(builder.build())?;
//! assert_eq!(resolved.dag().order(), ["mProject_000001"]);
//! ```

pub mod analyze;
pub mod error;
pub mod format;
pub mod model;
pub mod resolve;

pub use analyze::{FileRoleCounts, LocalityCounts, WorkflowStats};
pub use error::{Error, Result};
pub use format::OutputFormat;
pub use model::{
    Coordinates, ExecutionMetadata, File, GenerationParams, Locality, Task, Workflow,
    WorkflowBuilder,
};
pub use resolve::{Dag, ResolvedWorkflow};
