//! Error types for task graph operations.

use std::fmt;

/// Result type for task graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during task graph operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A task with the same name was already added.
    DuplicateTask {
        /// The repeated task name.
        name: String,
    },

    /// Two tasks declare the same output file.
    DuplicateProducer {
        /// The file claimed twice.
        file: String,
        /// The task that already produces the file.
        existing: String,
        /// The task that tried to produce it again.
        task: String,
    },

    /// Tasks reference files that were never declared.
    DanglingReferences {
        /// List of (task, file) pairs, sorted.
        missing: Vec<(String, String)>,
    },

    /// A dependency cycle was detected in the graph.
    CycleDetected {
        /// Every task that sits on a cycle, sorted by name.
        tasks: Vec<String>,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTask { name } => {
                write!(f, "Task '{name}' is defined more than once")
            }
            Self::DuplicateProducer {
                file,
                existing,
                task,
            } => {
                write!(
                    f,
                    "File '{file}' is produced by both '{existing}' and '{task}'"
                )
            }
            Self::DanglingReferences { missing } => {
                let list = missing
                    .iter()
                    .map(|(task, file)| format!("Task '{task}' references undeclared file '{file}'"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Dangling file references: {list}")
            }
            Self::CycleDetected { tasks } => {
                write!(f, "Cycle detected between tasks: {}", tasks.join(", "))
            }
        }
    }
}

impl std::error::Error for Error {}
