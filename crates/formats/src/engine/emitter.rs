//! Engine Job Graph Emitter
//!
//! Transforms a resolved workflow into HyperFlow-style JSON. The target
//! engine schedules from an explicit graph, so every process lists the
//! processes it runs `after`, taken from the resolved DAG.

use super::schema::{DATAFLOW, DEFAULT_FUNCTION, EngineDocument, Executor, Process, ProcessConfig, Signal};
use crate::emitter::{Emitter, EmitterError, EmitterResult};
use crate::raw::RawWorkflow;
use crate::reader::{ReadError, ReadResult};
use mosaicflow_core::{File, Locality, OutputFormat, ResolvedWorkflow, Task};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Engine job graph emitter
#[derive(Debug, Clone)]
pub struct EngineEmitter {
    /// Function name written on every process
    pub function: String,
}

impl Default for EngineEmitter {
    fn default() -> Self {
        Self {
            function: DEFAULT_FUNCTION.to_string(),
        }
    }
}

impl EngineEmitter {
    /// Create a new engine emitter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine function invoked by each process
    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    /// Convert the workflow to an engine document
    #[must_use]
    pub fn build_document(&self, resolved: &ResolvedWorkflow) -> EngineDocument {
        let workflow = resolved.workflow();
        let dag = resolved.dag();

        let index: HashMap<&str, usize> = workflow
            .files()
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.as_str(), i))
            .collect();

        let signals = workflow
            .files()
            .iter()
            .map(|file| Signal {
                name: file.name.clone(),
                locality: Some(file.locality.to_string()),
                size_in_bytes: file.size_bytes,
                source: file.source_url.clone(),
                data: dag
                    .producer(&file.name)
                    .is_none()
                    .then(|| vec![Value::Object(Map::new())]),
            })
            .collect();

        let signal_ids = |names: &[String]| -> Vec<usize> {
            names.iter().filter_map(|n| index.get(n.as_str()).copied()).collect()
        };

        let processes = resolved
            .ordered_tasks()
            .map(|task| Process {
                name: task.name.clone(),
                kind: DATAFLOW.to_string(),
                function: self.function.clone(),
                firing_limit: 1,
                config: ProcessConfig {
                    executor: Executor {
                        executable: task.executable.clone(),
                        args: task.arguments.clone(),
                    },
                },
                ins: signal_ids(&task.inputs),
                outs: signal_ids(&task.outputs),
                after: dag.parents(&task.name).map(str::to_string).collect(),
            })
            .collect();

        let ins = dag
            .entry_files()
            .iter()
            .filter(|name| dag.consumers(name).next().is_some())
            .filter_map(|name| index.get(name.as_str()).copied())
            .collect();

        let outs = dag
            .terminal_files()
            .iter()
            .filter(|name| dag.producer(name).is_some())
            .filter_map(|name| index.get(name.as_str()).copied())
            .collect();

        EngineDocument {
            name: workflow.name().to_string(),
            processes,
            signals,
            ins,
            outs,
        }
    }
}

impl Emitter for EngineEmitter {
    fn emit(&self, workflow: &ResolvedWorkflow) -> EmitterResult<String> {
        let document = self.build_document(workflow);
        let mut json = serde_json::to_string_pretty(&document)
            .map_err(|e| EmitterError::Serialization(e.to_string()))?;
        json.push('\n');
        Ok(json)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Engine
    }

    fn description(&self) -> &'static str {
        "HyperFlow job graph JSON with explicit dependencies"
    }
}

/// Parse an engine document.
///
/// # Errors
/// Returns `ReadError::Json` if the document does not parse and
/// `ReadError::Malformed` if a process names a signal index that does not
/// exist.
pub fn read(content: &str) -> ReadResult<RawWorkflow> {
    let document: EngineDocument =
        serde_json::from_str(content).map_err(|e| ReadError::json(OutputFormat::Engine, e))?;
    from_document(document)
}

/// Convert a parsed engine document.
///
/// # Errors
/// Returns `ReadError::Malformed` on out-of-range signal indices.
pub fn from_document(document: EngineDocument) -> ReadResult<RawWorkflow> {
    let names: Vec<&str> = document.signals.iter().map(|s| s.name.as_str()).collect();
    let resolve = |process: &str, ids: &[usize]| -> ReadResult<Vec<String>> {
        ids.iter()
            .map(|&id| {
                names.get(id).map(|n| (*n).to_string()).ok_or_else(|| {
                    ReadError::malformed(
                        OutputFormat::Engine,
                        format!("process '{process}' references missing signal {id}"),
                    )
                })
            })
            .collect()
    };

    let mut tasks = Vec::with_capacity(document.processes.len());
    for process in &document.processes {
        tasks.push(Task {
            name: process.name.clone(),
            executable: process.config.executor.executable.clone(),
            arguments: process.config.executor.args.clone(),
            inputs: resolve(&process.name, &process.ins)?,
            outputs: resolve(&process.name, &process.outs)?,
        });
    }

    let files = document
        .signals
        .into_iter()
        .map(|signal| {
            let locality = match signal.locality.as_deref() {
                Some("remote") => Locality::Remote,
                Some(_) => Locality::Local,
                None if signal.data.is_some() => Locality::Remote,
                None => Locality::Local,
            };
            File {
                name: signal.name,
                locality,
                size_bytes: signal.size_in_bytes,
                source_url: signal.source,
            }
        })
        .collect();

    Ok(RawWorkflow {
        name: document.name,
        tasks,
        files,
        ..RawWorkflow::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaicflow_core::WorkflowBuilder;

    fn scenario() -> ResolvedWorkflow {
        let mut builder = WorkflowBuilder::new("scenario");
        builder.add_file(File::remote("raw.fits", "https://example.org/raw.fits"));
        for name in ["F1", "F2", "F3"] {
            builder.add_file(File::local(name));
        }
        builder
            .add_task(Task::new("T3", "c").input("F1").input("F2").output("F3"))
            .unwrap();
        builder
            .add_task(Task::new("T1", "a").arg("raw.fits").input("raw.fits").output("F1"))
            .unwrap();
        builder
            .add_task(Task::new("T2", "b").input("F1").output("F2"))
            .unwrap();
        ResolvedWorkflow::resolve(builder.build()).unwrap()
    }

    #[test]
    fn test_processes_follow_topological_order() {
        let document = EngineEmitter::new().build_document(&scenario());
        let names: Vec<_> = document.processes.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["T1", "T2", "T3"]);
    }

    #[test]
    fn test_after_links_match_dag() {
        let document = EngineEmitter::new().build_document(&scenario());
        assert!(document.processes[0].after.is_empty());
        assert_eq!(document.processes[1].after, vec!["T1"]);
        assert_eq!(document.processes[2].after, vec!["T1", "T2"]);
    }

    #[test]
    fn test_signals_and_io() {
        let document = EngineEmitter::new().build_document(&scenario());
        assert_eq!(document.signals.len(), 4);
        assert!(document.signals[0].data.is_some());
        assert!(document.signals[1].data.is_none());
        assert_eq!(document.ins, vec![0]);
        assert_eq!(document.outs, vec![3]);
        assert_eq!(document.processes[2].ins, vec![1, 2]);
        assert_eq!(document.processes[0].config.executor.args, vec!["raw.fits"]);
    }

    #[test]
    fn test_custom_function() {
        let json = EngineEmitter::new()
            .with_function("k8sCommand")
            .emit(&scenario())
            .unwrap();
        assert!(json.contains("\"function\": \"k8sCommand\""));
        assert!(json.contains("\"firingLimit\": 1"));
        assert!(json.contains("\"type\": \"dataflow\""));
        assert!(json.ends_with("}\n"));
    }

    #[test]
    fn test_read_back() {
        let json = EngineEmitter::new().emit(&scenario()).unwrap();
        let raw = read(&json).unwrap();
        assert_eq!(raw.tasks.len(), 3);
        assert_eq!(raw.files.len(), 4);
        assert_eq!(raw.tasks[2].inputs, vec!["F1", "F2"]);
        assert_eq!(raw.files[0].locality, Locality::Remote);
    }

    #[test]
    fn test_read_rejects_missing_signal() {
        let json = r#"{"name": "bad", "processes": [{"name": "p", "config": {"executor": {"executable": "x"}}, "ins": [4]}], "signals": []}"#;
        let err = read(json).unwrap_err();
        assert!(err.to_string().contains("missing signal 4"));
    }
}
