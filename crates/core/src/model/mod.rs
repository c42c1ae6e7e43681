//! The workflow IR: tasks, files and the frozen aggregate.
//!
//! [`WorkflowBuilder`] is the only mutable stage. Producer uniqueness is
//! enforced as tasks are inserted; file references are checked later, at
//! resolution, so tasks may name files that are declared afterwards.

mod file;
mod params;
mod task;

pub use file::{File, Locality};
pub use params::{Coordinates, ExecutionMetadata, GenerationParams, MAX_DEGREES};
pub use task::Task;

use crate::{Error, Result};
use chrono::{DateTime, SubsecRound, Utc};
use std::collections::HashMap;
use tracing::debug;

/// A frozen workflow.
///
/// Tasks and files keep insertion order. Nothing can be added or changed
/// once built; derived structure lives in [`crate::ResolvedWorkflow`].
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    name: String,
    params: GenerationParams,
    tasks: Vec<Task>,
    files: Vec<File>,
    task_index: HashMap<String, usize>,
    file_index: HashMap<String, usize>,
    created_at: DateTime<Utc>,
    execution: Option<ExecutionMetadata>,
}

impl Workflow {
    /// Workflow name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters the workflow was generated from.
    #[must_use]
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Tasks in insertion order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Files in declaration order.
    #[must_use]
    pub fn files(&self) -> &[File] {
        &self.files
    }

    /// Look up a task by name.
    #[must_use]
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.task_index.get(name).map(|&i| &self.tasks[i])
    }

    /// Look up a file by name.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&File> {
        self.file_index.get(name).map(|&i| &self.files[i])
    }

    /// Build timestamp, fixed when the workflow was frozen.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Measured execution data, if any was attached.
    #[must_use]
    pub fn execution(&self) -> Option<&ExecutionMetadata> {
        self.execution.as_ref()
    }
}

/// Mutable construction stage for a [`Workflow`].
#[derive(Debug, Default)]
pub struct WorkflowBuilder {
    name: String,
    params: GenerationParams,
    tasks: Vec<Task>,
    files: Vec<File>,
    task_index: HashMap<String, usize>,
    file_index: HashMap<String, usize>,
    producers: HashMap<String, String>,
    created_at: Option<DateTime<Utc>>,
    execution: Option<ExecutionMetadata>,
}

impl WorkflowBuilder {
    /// Start an empty workflow.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the generation parameters.
    pub fn params(&mut self, params: GenerationParams) -> &mut Self {
        self.params = params;
        self
    }

    /// Pin the creation timestamp instead of using the build time.
    pub fn created_at(&mut self, at: DateTime<Utc>) -> &mut Self {
        self.created_at = Some(at);
        self
    }

    /// Attach measured execution data.
    pub fn execution(&mut self, execution: ExecutionMetadata) -> &mut Self {
        self.execution = Some(execution);
        self
    }

    /// Declare a file. The first declaration of a name wins.
    ///
    /// Returns `true` if the file was new.
    pub fn add_file(&mut self, file: File) -> bool {
        if self.file_index.contains_key(&file.name) {
            debug!(file = %file.name, "Ignoring repeated file declaration");
            return false;
        }
        self.file_index.insert(file.name.clone(), self.files.len());
        self.files.push(file);
        true
    }

    /// Whether a file name has been declared.
    #[must_use]
    pub fn has_file(&self, name: &str) -> bool {
        self.file_index.contains_key(name)
    }

    /// Number of tasks added so far.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Insert a task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTask`] when the name is taken and
    /// [`Error::DuplicateProducer`] when another task already writes one of
    /// its outputs. The builder is unchanged on error.
    pub fn add_task(&mut self, task: Task) -> Result<&mut Self> {
        if self.task_index.contains_key(&task.name) {
            return Err(Error::DuplicateTask { name: task.name });
        }
        for output in &task.outputs {
            if let Some(existing) = self.producers.get(output) {
                return Err(Error::DuplicateProducer {
                    file: output.clone(),
                    existing: existing.clone(),
                    task: task.name,
                });
            }
        }

        for output in &task.outputs {
            self.producers.insert(output.clone(), task.name.clone());
        }
        self.task_index.insert(task.name.clone(), self.tasks.len());
        self.tasks.push(task);
        Ok(self)
    }

    /// Freeze into an immutable workflow.
    #[must_use]
    pub fn build(self) -> Workflow {
        let created_at = self
            .created_at
            .unwrap_or_else(|| Utc::now().trunc_subsecs(0));
        debug!(
            workflow = %self.name,
            tasks = self.tasks.len(),
            files = self.files.len(),
            "Froze workflow"
        );
        Workflow {
            name: self.name,
            params: self.params,
            tasks: self.tasks,
            files: self.files,
            task_index: self.task_index,
            file_index: self.file_index,
            created_at,
            execution: self.execution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_producer_caught_at_insert() {
        let mut builder = WorkflowBuilder::new("w");
        builder
            .add_task(Task::new("a", "mProject").output("p.fits"))
            .unwrap();
        let err = builder
            .add_task(Task::new("b", "mProject").output("p.fits"))
            .unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateProducer {
                file: "p.fits".to_string(),
                existing: "a".to_string(),
                task: "b".to_string(),
            }
        );
        assert_eq!(builder.task_count(), 1);
    }

    #[test]
    fn test_duplicate_task_name() {
        let mut builder = WorkflowBuilder::new("w");
        builder.add_task(Task::new("a", "x")).unwrap();
        assert!(matches!(
            builder.add_task(Task::new("a", "y")),
            Err(Error::DuplicateTask { .. })
        ));
    }

    #[test]
    fn test_forward_reference_allowed() {
        let mut builder = WorkflowBuilder::new("w");
        builder
            .add_task(Task::new("a", "mAdd").input("later.tbl"))
            .unwrap();
        builder.add_file(File::local("later.tbl"));
        let workflow = builder.build();
        assert!(workflow.file("later.tbl").is_some());
    }

    #[test]
    fn test_first_file_declaration_wins() {
        let mut builder = WorkflowBuilder::new("w");
        assert!(builder.add_file(File::local("a").with_size(1)));
        assert!(!builder.add_file(File::remote("a", "http://x/a")));
        let workflow = builder.build();
        assert_eq!(workflow.files().len(), 1);
        assert_eq!(workflow.file("a").unwrap().size_bytes, Some(1));
    }

    #[test]
    fn test_lookups_and_pinned_timestamp() {
        let at = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut builder = WorkflowBuilder::new("montage");
        builder.created_at(at);
        builder.add_task(Task::new("t", "mViewer")).unwrap();
        let workflow = builder.build();
        assert_eq!(workflow.name(), "montage");
        assert_eq!(workflow.created_at(), at);
        assert_eq!(workflow.task("t").unwrap().executable, "mViewer");
        assert!(workflow.task("missing").is_none());
        assert!(workflow.execution().is_none());
    }
}
