//! Data-flow task graph built on petgraph.
//!
//! Tasks are added together with their declared inputs and outputs. Once all
//! tasks are present, [`TaskGraph::add_data_flow_edges`] connects every
//! producer of a file to each of its consumers.

use crate::traversal::{Edge, ParallelGroups, TopologicalOrder};
use crate::{Error, Result, TaskNodeData};
use petgraph::Direction;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::IntoNodeReferences;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use tracing::debug;

/// A node in the task graph.
#[derive(Debug, Clone)]
pub struct GraphNode<T> {
    /// Name of the task.
    pub name: String,
    /// The task data.
    pub task: T,
}

/// Task graph for data-flow dependency resolution and execution ordering.
///
/// This is a generic graph that can hold any task type implementing
/// [`TaskNodeData`]. Producer ownership of files is enforced as tasks are
/// added, so a graph never holds two producers for one file.
pub struct TaskGraph<T: TaskNodeData> {
    /// The directed graph of tasks.
    graph: DiGraph<GraphNode<T>, ()>,
    /// Map from task names to node indices.
    name_to_node: HashMap<String, NodeIndex>,
    /// Map from file names to the task producing them.
    producers: BTreeMap<String, String>,
}

impl<T: TaskNodeData> TaskGraph<T> {
    /// Create a new empty task graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            name_to_node: HashMap::new(),
            producers: BTreeMap::new(),
        }
    }

    /// Add a single task to the graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTask`] if the name is taken, or
    /// [`Error::DuplicateProducer`] if one of the task's outputs is already
    /// produced by another task. The graph is unchanged on error.
    pub fn add_task(&mut self, name: &str, task: T) -> Result<NodeIndex> {
        if self.name_to_node.contains_key(name) {
            return Err(Error::DuplicateTask {
                name: name.to_string(),
            });
        }

        for output in task.output_names() {
            if let Some(existing) = self.producers.get(output) {
                return Err(Error::DuplicateProducer {
                    file: output.to_string(),
                    existing: existing.clone(),
                    task: name.to_string(),
                });
            }
        }

        for output in task.output_names() {
            self.producers
                .entry(output.to_string())
                .or_insert_with(|| name.to_string());
        }

        let node_index = self.graph.add_node(GraphNode {
            name: name.to_string(),
            task,
        });
        self.name_to_node.insert(name.to_string(), node_index);
        debug!(task = %name, "Added task node");

        Ok(node_index)
    }

    /// Name of the task producing `file`, if any.
    #[must_use]
    pub fn producer_of(&self, file: &str) -> Option<&str> {
        self.producers.get(file).map(String::as_str)
    }

    /// Iterate over `(file, producer)` pairs in file-name order.
    pub fn producers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.producers
            .iter()
            .map(|(file, task)| (file.as_str(), task.as_str()))
    }

    /// Get a reference to a task node by name.
    #[must_use]
    pub fn get_node_by_name(&self, name: &str) -> Option<&GraphNode<T>> {
        self.name_to_node
            .get(name)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Add producer-to-consumer edges after all tasks have been added.
    ///
    /// `is_declared` reports whether a file name exists in the surrounding
    /// file collection. Inputs without a producer are entry files and add no
    /// edge. A task reading its own output gets a self edge, which later
    /// counts as a cycle. Calling this twice does not duplicate edges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingReferences`] listing every `(task, file)` pair
    /// whose file is not declared. No edges are added in that case.
    pub fn add_data_flow_edges(&mut self, is_declared: impl Fn(&str) -> bool) -> Result<()> {
        let mut missing = Vec::new();
        let mut edges_to_add = Vec::new();

        for (node_index, node) in self.graph.node_references() {
            for file in node.task.output_names() {
                if !is_declared(file) {
                    missing.push((node.name.clone(), file.to_string()));
                }
            }
            for file in node.task.input_names() {
                if let Some(producer) = self.producers.get(file) {
                    if let Some(&from) = self.name_to_node.get(producer) {
                        edges_to_add.push((from, node_index));
                    }
                } else if !is_declared(file) {
                    missing.push((node.name.clone(), file.to_string()));
                }
            }
        }

        if !missing.is_empty() {
            missing.sort();
            missing.dedup();
            return Err(Error::DanglingReferences { missing });
        }

        for (from, to) in edges_to_add {
            self.graph.update_edge(from, to, ());
        }
        debug!(edges = self.graph.edge_count(), "Added data-flow edges");

        Ok(())
    }

    /// Check if the graph has cycles, including self edges.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Names of every task sitting on a cycle, sorted.
    #[must_use]
    pub fn cycle_members(&self) -> Vec<String> {
        let mut members: Vec<String> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&idx| self.graph.contains_edge(idx, idx))
            })
            .flatten()
            .map(|idx| self.graph[idx].name.clone())
            .collect();
        members.sort();
        members
    }

    /// Get the topologically sorted list of tasks.
    ///
    /// Uses Kahn's algorithm with a min-heap keyed on task name, so ties
    /// between ready tasks are broken lexically and the order is stable for
    /// a given set of tasks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CycleDetected`] naming the tasks on cycles.
    pub fn topological_sort(&self) -> Result<TopologicalOrder<T>> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                let degree = self
                    .graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .count();
                (idx, degree)
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<(&str, NodeIndex)>> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&idx, _)| Reverse((self.graph[idx].name.as_str(), idx)))
            .collect();

        let mut sorted = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse((_, idx))) = ready.pop() {
            sorted.push(self.graph[idx].clone());
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(degree) = in_degree.get_mut(&next) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse((self.graph[next].name.as_str(), next)));
                    }
                }
            }
        }

        if sorted.len() != self.graph.node_count() {
            return Err(Error::CycleDetected {
                tasks: self.cycle_members(),
            });
        }

        Ok(sorted)
    }

    /// Get all tasks that can run in parallel (no dependencies between them).
    ///
    /// Returns a vector of parallel groups, where each group contains tasks
    /// that can execute concurrently. A task's level is one more than the
    /// deepest of its upstream tasks. Tasks inside a group are sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn get_parallel_groups(&self) -> Result<ParallelGroups<T>> {
        let sorted = self.topological_sort()?;

        let mut groups: ParallelGroups<T> = vec![];
        let mut levels: HashMap<&str, usize> = HashMap::new();

        for node in &sorted {
            let level = self
                .upstream(&node.name)
                .into_iter()
                .filter_map(|dep| levels.get(dep).map(|&l| l + 1))
                .max()
                .unwrap_or(0);

            if level >= groups.len() {
                groups.resize(level + 1, vec![]);
            }
            groups[level].push(node.clone());
            levels.insert(node.name.as_str(), level);
        }

        for group in &mut groups {
            group.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(groups)
    }

    /// Names of tasks consuming something `name` produces, sorted.
    #[must_use]
    pub fn downstream(&self, name: &str) -> Vec<&str> {
        self.neighbor_names(name, Direction::Outgoing)
    }

    /// Names of tasks producing something `name` consumes, sorted.
    #[must_use]
    pub fn upstream(&self, name: &str) -> Vec<&str> {
        self.neighbor_names(name, Direction::Incoming)
    }

    fn neighbor_names(&self, name: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.name_to_node.get(name) else {
            return vec![];
        };
        let mut names: Vec<&str> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// All edges as `(producer, consumer)` name pairs, sorted.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(from, to)| (self.graph[from].name.clone(), self.graph[to].name.clone()))
            .collect();
        edges.sort();
        edges
    }

    /// Get the number of tasks in the graph.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of distinct edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check if a task exists in the graph.
    #[must_use]
    pub fn contains_task(&self, name: &str) -> bool {
        self.name_to_node.contains_key(name)
    }

    /// Iterate over all nodes in insertion order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeIndex, &GraphNode<T>)> {
        self.graph.node_references()
    }
}

impl<T: TaskNodeData> Default for TaskGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}
