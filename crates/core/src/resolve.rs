//! Dependency resolution: derive the task DAG from file data-flow.
//!
//! Edges are recomputed from the frozen workflow every time; nothing here is
//! authored state. Resolving the same workflow twice yields identical
//! adjacency and ordering.

use crate::model::{Task, Workflow};
use crate::Result;
use mosaicflow_task_graph::TaskGraph;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// The derived dependency structure of a workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dag {
    order: Vec<String>,
    children: BTreeMap<String, BTreeSet<String>>,
    parents: BTreeMap<String, BTreeSet<String>>,
    producers: BTreeMap<String, String>,
    consumers: BTreeMap<String, BTreeSet<String>>,
    levels: Vec<Vec<String>>,
    entry_files: Vec<String>,
    terminal_files: Vec<String>,
}

impl Dag {
    /// Build the DAG for a workflow.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::DuplicateProducer`] / [`crate::Error::DuplicateTask`] if the task
    ///   list violates IR invariants
    /// - [`crate::Error::DanglingReference`] naming every undeclared file
    /// - [`crate::Error::CyclicDependency`] naming every task on a cycle
    pub fn resolve(workflow: &Workflow) -> Result<Self> {
        let mut graph: TaskGraph<Task> = TaskGraph::new();
        for task in workflow.tasks() {
            graph.add_task(&task.name, task.clone())?;
        }
        graph.add_data_flow_edges(|file| workflow.file(file).is_some())?;

        let order: Vec<String> = graph
            .topological_sort()?
            .into_iter()
            .map(|node| node.name)
            .collect();

        let levels: Vec<Vec<String>> = graph
            .get_parallel_groups()?
            .into_iter()
            .map(|group| group.into_iter().map(|node| node.name).collect())
            .collect();

        let mut children = BTreeMap::new();
        let mut parents = BTreeMap::new();
        for name in &order {
            let down: BTreeSet<String> = graph
                .downstream(name)
                .into_iter()
                .map(str::to_string)
                .collect();
            let up: BTreeSet<String> = graph
                .upstream(name)
                .into_iter()
                .map(str::to_string)
                .collect();
            children.insert(name.clone(), down);
            parents.insert(name.clone(), up);
        }

        let producers: BTreeMap<String, String> = graph
            .producers()
            .map(|(file, task)| (file.to_string(), task.to_string()))
            .collect();

        let mut consumers: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for task in workflow.tasks() {
            for input in &task.inputs {
                consumers
                    .entry(input.clone())
                    .or_default()
                    .insert(task.name.clone());
            }
        }

        let entry_files = workflow
            .files()
            .iter()
            .filter(|f| !producers.contains_key(&f.name))
            .map(|f| f.name.clone())
            .collect();
        let terminal_files = workflow
            .files()
            .iter()
            .filter(|f| !consumers.contains_key(&f.name))
            .map(|f| f.name.clone())
            .collect();

        debug!(
            workflow = %workflow.name(),
            tasks = order.len(),
            edges = graph.edge_count(),
            levels = levels.len(),
            "Resolved workflow DAG"
        );

        Ok(Self {
            order,
            children,
            parents,
            producers,
            consumers,
            levels,
            entry_files,
            terminal_files,
        })
    }

    /// Task names in topological order with lexical tie-breaking.
    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Tasks consuming an output of `task`.
    pub fn children(&self, task: &str) -> impl Iterator<Item = &str> {
        self.children
            .get(task)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Tasks producing an input of `task`.
    pub fn parents(&self, task: &str) -> impl Iterator<Item = &str> {
        self.parents
            .get(task)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// All `(producer, consumer)` edges, sorted.
    #[must_use]
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.children
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (from.as_str(), to.as_str())))
            .collect()
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.children.values().map(BTreeSet::len).sum()
    }

    /// Task writing `file`, if any.
    #[must_use]
    pub fn producer(&self, file: &str) -> Option<&str> {
        self.producers.get(file).map(String::as_str)
    }

    /// Tasks reading `file`.
    pub fn consumers(&self, file: &str) -> impl Iterator<Item = &str> {
        self.consumers
            .get(file)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Tasks with no parents: the initially schedulable set, in order.
    pub fn initial_tasks(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter(|name| self.parents.get(*name).is_none_or(BTreeSet::is_empty))
            .map(String::as_str)
    }

    /// Parallel levels; every task's parents sit in earlier levels.
    #[must_use]
    pub fn levels(&self) -> &[Vec<String>] {
        &self.levels
    }

    /// Files with no producer, in declaration order.
    #[must_use]
    pub fn entry_files(&self) -> &[String] {
        &self.entry_files
    }

    /// Files with no consumer, in declaration order.
    #[must_use]
    pub fn terminal_files(&self) -> &[String] {
        &self.terminal_files
    }

    /// Longest runtime-weighted path through the DAG.
    ///
    /// Returns `None` unless every task has a runtime in `runtimes`.
    #[must_use]
    pub fn critical_path(&self, runtimes: &BTreeMap<String, f64>) -> Option<f64> {
        let mut finish: BTreeMap<&str, f64> = BTreeMap::new();
        for task in &self.order {
            let runtime = *runtimes.get(task)?;
            let start = self
                .parents(task)
                .filter_map(|parent| finish.get(parent).copied())
                .fold(0.0_f64, f64::max);
            finish.insert(task.as_str(), start + runtime);
        }
        Some(finish.values().copied().fold(0.0_f64, f64::max))
    }
}

/// A frozen workflow together with its derived DAG.
///
/// Cheap to clone and safe to share between concurrently running compilers;
/// neither half can be mutated.
#[derive(Debug, Clone)]
pub struct ResolvedWorkflow {
    workflow: Arc<Workflow>,
    dag: Arc<Dag>,
}

impl ResolvedWorkflow {
    /// Resolve a frozen workflow.
    ///
    /// # Errors
    ///
    /// Propagates any structural error from [`Dag::resolve`].
    pub fn resolve(workflow: impl Into<Arc<Workflow>>) -> Result<Self> {
        let workflow = workflow.into();
        let dag = Dag::resolve(&workflow)?;
        Ok(Self {
            workflow,
            dag: Arc::new(dag),
        })
    }

    /// The underlying workflow.
    #[must_use]
    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// The derived DAG.
    #[must_use]
    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    /// Tasks in topological order.
    pub fn ordered_tasks(&self) -> impl Iterator<Item = &Task> {
        self.dag
            .order()
            .iter()
            .filter_map(|name| self.workflow.task(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::model::{File, WorkflowBuilder};

    fn scenario() -> Workflow {
        let mut builder = WorkflowBuilder::new("scenario");
        for name in ["F1", "F2", "F3"] {
            builder.add_file(File::local(name));
        }
        builder
            .add_task(Task::new("T3", "c").input("F1").input("F2").output("F3"))
            .unwrap();
        builder
            .add_task(Task::new("T1", "a").output("F1"))
            .unwrap();
        builder
            .add_task(Task::new("T2", "b").input("F1").output("F2"))
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_scenario_edges_and_order() {
        let dag = Dag::resolve(&scenario()).unwrap();
        assert_eq!(
            dag.edges(),
            vec![("T1", "T2"), ("T1", "T3"), ("T2", "T3")]
        );
        assert_eq!(dag.order(), ["T1", "T2", "T3"]);
        assert_eq!(dag.children("T1").collect::<Vec<_>>(), vec!["T2", "T3"]);
        assert_eq!(dag.parents("T3").collect::<Vec<_>>(), vec!["T1", "T2"]);
        assert_eq!(dag.children("T3").count(), 0);
        assert_eq!(dag.initial_tasks().collect::<Vec<_>>(), vec!["T1"]);
        assert_eq!(dag.terminal_files(), ["F3"]);
        assert_eq!(dag.producer("F2"), Some("T2"));
        assert_eq!(dag.consumers("F1").collect::<Vec<_>>(), vec!["T2", "T3"]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let workflow = scenario();
        assert_eq!(
            Dag::resolve(&workflow).unwrap(),
            Dag::resolve(&workflow).unwrap()
        );
    }

    #[test]
    fn test_dangling_reference() {
        let mut builder = WorkflowBuilder::new("w");
        builder
            .add_task(Task::new("t", "mAdd").input("ghost.tbl"))
            .unwrap();
        let err = Dag::resolve(&builder.build()).unwrap_err();
        assert_eq!(
            err,
            Error::DanglingReference {
                references: vec![("t".to_string(), "ghost.tbl".to_string())]
            }
        );
    }

    #[test]
    fn test_cycle_reported() {
        let mut builder = WorkflowBuilder::new("w");
        builder.add_file(File::local("a"));
        builder.add_file(File::local("b"));
        builder
            .add_task(Task::new("x", "e").input("b").output("a"))
            .unwrap();
        builder
            .add_task(Task::new("y", "e").input("a").output("b"))
            .unwrap();
        let err = Dag::resolve(&builder.build()).unwrap_err();
        assert_eq!(
            err,
            Error::CyclicDependency {
                tasks: vec!["x".to_string(), "y".to_string()]
            }
        );
    }

    #[test]
    fn test_entry_files_have_no_producer() {
        let mut builder = WorkflowBuilder::new("w");
        builder.add_file(File::remote("raw.fits", "https://x/raw.fits"));
        builder.add_file(File::local("p.fits"));
        builder
            .add_task(Task::new("p", "mProject").input("raw.fits").output("p.fits"))
            .unwrap();
        let dag = Dag::resolve(&builder.build()).unwrap();
        assert_eq!(dag.entry_files(), ["raw.fits"]);
        assert_eq!(dag.terminal_files(), ["p.fits"]);
        assert_eq!(dag.edge_count(), 0);
    }

    #[test]
    fn test_critical_path() {
        let dag = Dag::resolve(&scenario()).unwrap();
        let mut runtimes = BTreeMap::from([
            ("T1".to_string(), 2.0),
            ("T2".to_string(), 3.0),
            ("T3".to_string(), 1.5),
        ]);
        assert_eq!(dag.critical_path(&runtimes), Some(6.5));
        runtimes.remove("T2");
        assert_eq!(dag.critical_path(&runtimes), None);
    }

    #[test]
    fn test_ordered_tasks() {
        let resolved = ResolvedWorkflow::resolve(scenario()).unwrap();
        let names: Vec<&str> = resolved.ordered_tasks().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["T1", "T2", "T3"]);
        assert_eq!(resolved.dag().levels().len(), 3);
    }
}
