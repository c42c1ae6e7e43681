//! Invariant-free workflow shape produced by artifact readers.

use chrono::{DateTime, Utc};
use mosaicflow_core::{ExecutionMetadata, File, GenerationParams, Task, Workflow, WorkflowBuilder};

/// Tasks and files exactly as a document listed them.
///
/// Nothing is checked here; [`RawWorkflow::into_workflow`] applies the
/// builder's producer and name uniqueness rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawWorkflow {
    /// Workflow name
    pub name: String,
    /// Creation time recorded in the document
    pub created_at: Option<DateTime<Utc>>,
    /// Generation parameters, when the document carries them
    pub params: Option<GenerationParams>,
    /// Tasks in document order
    pub tasks: Vec<Task>,
    /// Files in document order
    pub files: Vec<File>,
    /// Execution data, when the document carries it
    pub execution: Option<ExecutionMetadata>,
}

impl RawWorkflow {
    /// Freeze into a workflow.
    ///
    /// # Errors
    ///
    /// Returns the first `DuplicateTask` or `DuplicateProducer` met while
    /// inserting tasks in document order.
    pub fn into_workflow(self) -> mosaicflow_core::Result<Workflow> {
        let mut builder = WorkflowBuilder::new(self.name);
        if let Some(params) = self.params {
            builder.params(params);
        }
        if let Some(at) = self.created_at {
            builder.created_at(at);
        }
        if let Some(execution) = self.execution {
            builder.execution(execution);
        }
        for file in self.files {
            builder.add_file(file);
        }
        for task in self.tasks {
            builder.add_task(task)?;
        }
        Ok(builder.build())
    }
}
