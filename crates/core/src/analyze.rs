//! Read-only statistics over a workflow.

use crate::model::{Locality, Workflow};
use crate::resolve::ResolvedWorkflow;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// How many entry files are listed before the rest is elided.
const LISTED_INPUTS: usize = 10;

/// How many of the most consumed files are reported.
const TOP_CONSUMED: usize = 5;

/// Files counted by locality tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LocalityCounts {
    /// Local files
    pub local: usize,
    /// Remote files
    pub remote: usize,
}

/// Files counted by data-flow role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileRoleCounts {
    /// No producer
    pub input: usize,
    /// Produced, never consumed
    pub output: usize,
    /// Produced and consumed
    pub intermediate: usize,
}

/// Summary statistics of one workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStats {
    /// Workflow name
    pub name: String,
    /// Number of tasks
    pub total_tasks: usize,
    /// Number of declared files
    pub total_files: usize,
    /// Task counts keyed by executable
    pub tasks_by_executable: BTreeMap<String, usize>,
    /// File counts by locality
    pub files_by_locality: LocalityCounts,
    /// File counts by role
    pub files_by_role: FileRoleCounts,
    /// Files with no producer, in declaration order
    pub workflow_inputs: Vec<String>,
    /// Produced files nobody consumes, in declaration order
    pub workflow_outputs: Vec<String>,
    /// The most consumed files with their consumer counts
    pub most_consumed: Vec<(String, usize)>,
    /// Number of DAG edges, when resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<usize>,
    /// Number of parallel levels, when resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<usize>,
}

impl WorkflowStats {
    /// Compute statistics from task and file declarations alone.
    #[must_use]
    pub fn of(workflow: &Workflow) -> Self {
        let mut tasks_by_executable = BTreeMap::new();
        let mut produced: HashSet<&str> = HashSet::new();
        let mut consumers: HashMap<&str, HashSet<&str>> = HashMap::new();

        for task in workflow.tasks() {
            *tasks_by_executable
                .entry(task.executable.clone())
                .or_insert(0) += 1;
            produced.extend(task.outputs.iter().map(String::as_str));
            for input in &task.inputs {
                consumers
                    .entry(input.as_str())
                    .or_default()
                    .insert(task.name.as_str());
            }
        }

        let mut files_by_locality = LocalityCounts::default();
        let mut files_by_role = FileRoleCounts::default();
        let mut workflow_inputs = Vec::new();
        let mut workflow_outputs = Vec::new();

        for file in workflow.files() {
            match file.locality {
                Locality::Local => files_by_locality.local += 1,
                Locality::Remote => files_by_locality.remote += 1,
            }
            let name = file.name.as_str();
            let is_consumed = consumers.contains_key(name);
            if !produced.contains(name) {
                files_by_role.input += 1;
                workflow_inputs.push(file.name.clone());
            } else if is_consumed {
                files_by_role.intermediate += 1;
            } else {
                files_by_role.output += 1;
                workflow_outputs.push(file.name.clone());
            }
        }

        let mut most_consumed: Vec<(String, usize)> = consumers
            .iter()
            .map(|(file, tasks)| ((*file).to_string(), tasks.len()))
            .collect();
        most_consumed.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        most_consumed.truncate(TOP_CONSUMED);

        Self {
            name: workflow.name().to_string(),
            total_tasks: workflow.tasks().len(),
            total_files: workflow.files().len(),
            tasks_by_executable,
            files_by_locality,
            files_by_role,
            workflow_inputs,
            workflow_outputs,
            most_consumed,
            edges: None,
            levels: None,
        }
    }

    /// Compute statistics including DAG shape.
    #[must_use]
    pub fn of_resolved(resolved: &ResolvedWorkflow) -> Self {
        let mut stats = Self::of(resolved.workflow());
        stats.edges = Some(resolved.dag().edge_count());
        stats.levels = Some(resolved.dag().levels().len());
        stats
    }
}

impl fmt::Display for WorkflowStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Workflow: {}", self.name)?;
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f)?;

        writeln!(f, "Files:")?;
        writeln!(f, "  Total: {}", self.total_files)?;
        writeln!(f, "  Inputs: {}", self.files_by_role.input)?;
        writeln!(f, "  Outputs: {}", self.files_by_role.output)?;
        writeln!(f, "  Intermediate: {}", self.files_by_role.intermediate)?;
        writeln!(f, "  Local: {}", self.files_by_locality.local)?;
        writeln!(f, "  Remote: {}", self.files_by_locality.remote)?;
        writeln!(f)?;

        writeln!(f, "Tasks:")?;
        writeln!(f, "  Total: {}", self.total_tasks)?;
        writeln!(f, "  By executable:")?;
        for (executable, count) in &self.tasks_by_executable {
            writeln!(f, "    {executable}: {count}")?;
        }
        writeln!(f)?;

        writeln!(f, "Workflow Inputs ({}):", self.workflow_inputs.len())?;
        for input in self.workflow_inputs.iter().take(LISTED_INPUTS) {
            writeln!(f, "  - {input}")?;
        }
        if self.workflow_inputs.len() > LISTED_INPUTS {
            writeln!(
                f,
                "  ... and {} more",
                self.workflow_inputs.len() - LISTED_INPUTS
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Workflow Outputs ({}):", self.workflow_outputs.len())?;
        for output in &self.workflow_outputs {
            writeln!(f, "  - {output}")?;
        }
        writeln!(f)?;

        writeln!(f, "Most used files:")?;
        for (file, count) in &self.most_consumed {
            writeln!(f, "  {file}: used by {count} tasks")?;
        }

        if let (Some(edges), Some(levels)) = (self.edges, self.levels) {
            writeln!(f)?;
            writeln!(f, "Dependencies:")?;
            writeln!(f, "  Edges: {edges}")?;
            writeln!(f, "  Parallel levels: {levels}")?;
        }
        Ok(())
    }
}
