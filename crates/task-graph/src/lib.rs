//! Data-flow DAG algorithms for mosaicflow.
//!
//! This crate infers task-to-task edges from file producer/consumer
//! declarations and derives execution ordering using petgraph.
//!
//! # Key Types
//!
//! - [`TaskGraph`]: The graph structure for building and querying data-flow dependencies
//! - [`TaskNodeData`]: Trait that task types must implement to be stored in the graph
//! - [`GraphNode`]: A node in the graph containing the task name and data
//!
//! # Example
//!
//! ```ignore
//! use mosaicflow_task_graph::{TaskGraph, TaskNodeData};
//!
//! #[derive(Clone)]
//! struct Step {
//!     inputs: Vec<String>,
//!     outputs: Vec<String>,
//! }
//!
//! impl TaskNodeData for Step {
//!     fn input_names(&self) -> impl Iterator<Item = &str> {
//!         self.inputs.iter().map(String::as_str)
//!     }
//!     fn output_names(&self) -> impl Iterator<Item = &str> {
//!         self.outputs.iter().map(String::as_str)
//!     }
//! }
//!
//! let mut graph = TaskGraph::new();
//! graph.add_task("project", Step { inputs: vec!["raw.fits".into()], outputs: vec!["p.fits".into()] })?;
//! graph.add_task("add", Step { inputs: vec!["p.fits".into()], outputs: vec!["mosaic.fits".into()] })?;
//! graph.add_data_flow_edges(|_| true)?;
//!
//! let sorted = graph.topological_sort()?;
//! ```

mod error;
mod graph;
mod traversal;

pub use error::{Error, Result};
pub use graph::{GraphNode, TaskGraph};
pub use traversal::{Edge, ParallelGroups, TopologicalOrder};

/// Trait for task data that can be stored in the task graph.
///
/// Edges are never declared directly. A task `A` precedes task `B` exactly
/// when `B` lists among its inputs a file that `A` lists among its outputs.
pub trait TaskNodeData: Clone {
    /// Returns the file names this task reads.
    fn input_names(&self) -> impl Iterator<Item = &str>;

    /// Returns the file names this task writes.
    fn output_names(&self) -> impl Iterator<Item = &str>;
}
