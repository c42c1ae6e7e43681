//! Engine Job Graph Schema Types
//!
//! HyperFlow-style workflow JSON: processes exchange numbered signals and
//! carry explicit `after` links to their upstream processes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Function name used by generic command executors
pub const DEFAULT_FUNCTION: &str = "{{function}}";

/// Process type for data-driven firing
pub const DATAFLOW: &str = "dataflow";

/// An engine workflow document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineDocument {
    /// Workflow name
    pub name: String,

    /// Job nodes
    #[serde(default)]
    pub processes: Vec<Process>,

    /// Data nodes, indexed by position
    #[serde(default)]
    pub signals: Vec<Signal>,

    /// Entry signals consumed by some process
    #[serde(default)]
    pub ins: Vec<usize>,

    /// Terminal signals produced by some process
    #[serde(default)]
    pub outs: Vec<usize>,
}

/// A job node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    /// Unique process name
    pub name: String,

    /// Firing model
    #[serde(rename = "type", default = "dataflow")]
    pub kind: String,

    /// Engine function invoked for the job
    #[serde(default)]
    pub function: String,

    /// Number of times the process may fire
    #[serde(default = "one")]
    pub firing_limit: u32,

    /// Executor configuration
    #[serde(default)]
    pub config: ProcessConfig,

    /// Consumed signal indices
    #[serde(default)]
    pub ins: Vec<usize>,

    /// Produced signal indices
    #[serde(default)]
    pub outs: Vec<usize>,

    /// Upstream process names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,
}

/// Process configuration block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Command to run
    pub executor: Executor,
}

/// Command executed by a process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executor {
    /// Executable name
    pub executable: String,

    /// Argument list
    #[serde(default)]
    pub args: Vec<String>,
}

/// A data node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    /// File name
    pub name: String,

    /// `local` or `remote`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,

    /// Size estimate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_in_bytes: Option<u64>,

    /// Where the file is fetched from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Initial data; present only on entry signals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Value>>,
}

fn dataflow() -> String {
    DATAFLOW.to_string()
}

const fn one() -> u32 {
    1
}
