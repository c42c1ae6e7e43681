//! Error types for workflow construction and resolution.

use miette::Diagnostic;
use thiserror::Error;

/// Structural errors in the workflow IR.
///
/// Every variant aborts generation as a whole; a broken DAG cannot be
/// partially trusted.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum Error {
    /// Two tasks declare the same output file.
    #[error("File '{file}' is produced by both '{existing}' and '{task}'")]
    #[diagnostic(
        code(mosaicflow::ir::duplicate_producer),
        help("Each file may be written by at most one task")
    )]
    DuplicateProducer {
        /// The file claimed twice
        file: String,
        /// The task already producing it
        existing: String,
        /// The task that tried to produce it again
        task: String,
    },

    /// Two tasks share a name.
    #[error("Task '{name}' is defined more than once")]
    #[diagnostic(code(mosaicflow::ir::duplicate_task))]
    DuplicateTask {
        /// The repeated name
        name: String,
    },

    /// Tasks reference files missing from the file collection.
    #[error("Undeclared files referenced: {}", format_references(.references))]
    #[diagnostic(
        code(mosaicflow::resolve::dangling_reference),
        help("Declare every file a task reads or writes before resolving")
    )]
    DanglingReference {
        /// Sorted `(task, file)` pairs
        references: Vec<(String, String)>,
    },

    /// The data-flow graph has no topological order.
    #[error("Cyclic dependency between tasks: {}", .tasks.join(", "))]
    #[diagnostic(
        code(mosaicflow::resolve::cycle),
        help("A task must not consume a file produced, directly or transitively, by itself")
    )]
    CyclicDependency {
        /// Every task on a cycle, sorted
        tasks: Vec<String>,
    },

    /// Generation parameters are out of range.
    #[error("Invalid generation parameters: {message}")]
    #[diagnostic(code(mosaicflow::ir::invalid_parameters))]
    InvalidParameters {
        /// What is wrong
        message: String,
    },
}

fn format_references(references: &[(String, String)]) -> String {
    references
        .iter()
        .map(|(task, file)| format!("'{file}' (from task '{task}')"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Create an invalid parameters error
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }
}

impl From<mosaicflow_task_graph::Error> for Error {
    fn from(err: mosaicflow_task_graph::Error) -> Self {
        use mosaicflow_task_graph::Error as GraphError;
        match err {
            GraphError::DuplicateTask { name } => Self::DuplicateTask { name },
            GraphError::DuplicateProducer {
                file,
                existing,
                task,
            } => Self::DuplicateProducer {
                file,
                existing,
                task,
            },
            GraphError::DanglingReferences { missing } => Self::DanglingReference {
                references: missing,
            },
            GraphError::CycleDetected { tasks } => Self::CyclicDependency { tasks },
        }
    }
}

/// Result type for IR operations
pub type Result<T> = std::result::Result<T, Error>;
