//! WfFormat Interchange Schema Types
//!
//! Field names follow WfFormat 1.5 exactly.
//! See: <https://github.com/wfcommons/wfformat>

use serde::{Deserialize, Serialize};

/// Schema version written and accepted
pub const SCHEMA_VERSION: &str = "1.5";

/// Name recorded as author and machine
pub const GENERATOR: &str = "mosaicflow";

/// A WfFormat document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterchangeDocument {
    /// Workflow name
    pub name: String,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// RFC 3339 creation time
    #[serde(default)]
    pub created_at: String,

    /// Schema version, e.g. `1.5`
    pub schema_version: String,

    /// Who produced the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,

    /// Specification and execution sections
    pub workflow: WorkflowSection,
}

/// Document author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Author name
    pub name: String,
}

/// The `workflow` object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSection {
    /// Static structure
    pub specification: Specification,

    /// Execution metadata block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<Execution>,
}

/// Tasks and files of the workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    /// Task entries
    #[serde(default)]
    pub tasks: Vec<SpecTask>,

    /// File entries
    #[serde(default)]
    pub files: Vec<SpecFile>,
}

/// A task in an interchange document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecTask {
    /// Task name
    pub name: String,

    /// Task identifier
    pub id: String,

    /// Executable family
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Upstream task ids
    #[serde(default)]
    pub parents: Vec<String>,

    /// Downstream task ids
    #[serde(default)]
    pub children: Vec<String>,

    /// Consumed file ids
    #[serde(default)]
    pub input_files: Vec<String>,

    /// Produced file ids
    #[serde(default)]
    pub output_files: Vec<String>,
}

/// A file in an interchange document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecFile {
    /// File identifier
    pub id: String,

    /// Size in bytes
    pub size_in_bytes: u64,

    /// Producing task ids
    #[serde(default)]
    pub producers: Vec<String>,

    /// Consuming task ids
    #[serde(default)]
    pub consumers: Vec<String>,
}

/// Execution metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    /// Workflow wall-clock span; `0.0` when unknown
    pub makespan_in_seconds: f64,

    /// RFC 3339 execution time
    pub executed_at: String,

    /// Per-task execution records
    #[serde(default)]
    pub tasks: Vec<ExecTask>,

    /// Machines the tasks ran on
    #[serde(default)]
    pub machines: Vec<Machine>,
}

/// Execution record of one task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecTask {
    /// Task identifier
    pub id: String,

    /// Runtime; `0.0` when unknown
    pub runtime_in_seconds: f64,

    /// Command that ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
}

/// Program and arguments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Executable
    pub program: String,

    /// Argument list
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// A machine entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    /// Host name
    pub node_name: String,

    /// CPU description
    pub cpu: Cpu,
}

/// CPU description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    /// Core count
    pub count: u32,

    /// Clock speed in MHz; `0` when unknown
    pub speed: u64,
}
