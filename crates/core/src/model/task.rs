//! Tasks: one invocation of an external binary.

use mosaicflow_task_graph::TaskNodeData;
use serde::{Deserialize, Serialize};

/// A unit of pipeline work.
///
/// The executable is an opaque name; nothing in this crate runs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique name, stable across formats
    pub name: String,
    /// Binary to invoke
    pub executable: String,
    /// Ordered argument list
    #[serde(default)]
    pub arguments: Vec<String>,
    /// Files read by this task
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Files written by this task
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl Task {
    /// Create a task with no arguments or files.
    pub fn new(name: impl Into<String>, executable: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            executable: executable.into(),
            arguments: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    /// Declare an input file.
    #[must_use]
    pub fn input(mut self, file: impl Into<String>) -> Self {
        self.inputs.push(file.into());
        self
    }

    /// Declare an output file.
    #[must_use]
    pub fn output(mut self, file: impl Into<String>) -> Self {
        self.outputs.push(file.into());
        self
    }
}

impl TaskNodeData for Task {
    fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(String::as_str)
    }

    fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(String::as_str)
    }
}
