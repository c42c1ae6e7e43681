//! WfFormat Interchange Emitter
//!
//! Parent and child lists come straight from the resolved DAG. Every file
//! must carry a size estimate; the execution block records a makespan or a
//! `0.0` placeholder, never a guess.

use super::schema::{
    Author, Command, Cpu, ExecTask, Execution, GENERATOR, InterchangeDocument, Machine,
    SCHEMA_VERSION, SpecFile, SpecTask, Specification, WorkflowSection,
};
use crate::emitter::{Emitter, EmitterError, EmitterResult};
use crate::raw::RawWorkflow;
use crate::reader::{ReadError, ReadResult};
use chrono::{DateTime, SecondsFormat, Utc};
use mosaicflow_core::{ExecutionMetadata, File, Locality, OutputFormat, ResolvedWorkflow, Task};
use std::collections::{BTreeMap, HashMap, HashSet};

/// WfFormat interchange emitter
#[derive(Debug, Clone, Copy, Default)]
pub struct InterchangeEmitter;

impl InterchangeEmitter {
    /// Create a new interchange emitter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Convert the workflow to a WfFormat document.
    ///
    /// # Errors
    /// Returns `EmitterError::Compilation` naming the first file without a
    /// size estimate.
    pub fn build_document(&self, resolved: &ResolvedWorkflow) -> EmitterResult<InterchangeDocument> {
        let workflow = resolved.workflow();
        let dag = resolved.dag();

        let tasks = resolved
            .ordered_tasks()
            .map(|task| SpecTask {
                name: task.name.clone(),
                id: task.name.clone(),
                category: Some(task.executable.clone()),
                parents: dag.parents(&task.name).map(str::to_string).collect(),
                children: dag.children(&task.name).map(str::to_string).collect(),
                input_files: task.inputs.clone(),
                output_files: task.outputs.clone(),
            })
            .collect();

        let mut files = Vec::with_capacity(workflow.files().len());
        for file in workflow.files() {
            let size = file.size_bytes.ok_or_else(|| {
                EmitterError::compilation(
                    OutputFormat::Interchange,
                    &file.name,
                    "file has no size estimate (sizeInBytes is required)",
                )
            })?;
            files.push(SpecFile {
                id: file.name.clone(),
                size_in_bytes: size,
                producers: dag.producer(&file.name).map(str::to_string).into_iter().collect(),
                consumers: dag.consumers(&file.name).map(str::to_string).collect(),
            });
        }

        let empty = BTreeMap::new();
        let execution = workflow.execution();
        let runtimes = execution.map_or(&empty, |e| &e.task_runtimes);
        let makespan = execution
            .and_then(|e| e.makespan_seconds)
            .or_else(|| dag.critical_path(runtimes))
            .unwrap_or(0.0);
        let executed_at = execution
            .and_then(|e| e.executed_at)
            .unwrap_or_else(|| workflow.created_at());

        let exec_tasks = resolved
            .ordered_tasks()
            .map(|task| ExecTask {
                id: task.name.clone(),
                runtime_in_seconds: runtimes.get(&task.name).copied().unwrap_or(0.0),
                command: Some(Command {
                    program: task.executable.clone(),
                    arguments: task.arguments.clone(),
                }),
            })
            .collect();

        let params = workflow.params();
        let description = if params.center.is_empty() {
            "Montage mosaic workflow".to_string()
        } else {
            format!(
                "Montage mosaic workflow centered on {} covering {} degrees",
                params.center, params.degrees
            )
        };

        Ok(InterchangeDocument {
            name: workflow.name().to_string(),
            description: Some(description),
            created_at: timestamp(workflow.created_at()),
            schema_version: SCHEMA_VERSION.to_string(),
            author: Some(Author {
                name: GENERATOR.to_string(),
            }),
            workflow: WorkflowSection {
                specification: Specification { tasks, files },
                execution: Some(Execution {
                    makespan_in_seconds: makespan,
                    executed_at: timestamp(executed_at),
                    tasks: exec_tasks,
                    machines: vec![Machine {
                        node_name: GENERATOR.to_string(),
                        cpu: Cpu { count: 1, speed: 0 },
                    }],
                }),
            },
        })
    }
}

impl Emitter for InterchangeEmitter {
    fn emit(&self, workflow: &ResolvedWorkflow) -> EmitterResult<String> {
        let document = self.build_document(workflow)?;
        let mut json = serde_json::to_string_pretty(&document)
            .map_err(|e| EmitterError::Serialization(e.to_string()))?;
        json.push('\n');
        Ok(json)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Interchange
    }

    fn description(&self) -> &'static str {
        "WfFormat 1.5 interchange JSON with execution metadata"
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a WfFormat document.
///
/// # Errors
/// Returns `ReadError::Json` if the document does not parse and
/// `ReadError::UnsupportedSchemaVersion` for any version other than 1.5.
pub fn read(content: &str) -> ReadResult<RawWorkflow> {
    let document: InterchangeDocument = serde_json::from_str(content)
        .map_err(|e| ReadError::json(OutputFormat::Interchange, e))?;
    from_document(document)
}

/// Convert a parsed WfFormat document.
///
/// Executables come from the recorded command, then the category, then the
/// task name up to its first `_`. Files some task produces are local; the
/// rest are remote. Zero runtimes and makespans are placeholders and are
/// not carried over.
///
/// # Errors
/// Returns `ReadError::UnsupportedSchemaVersion` for unknown versions.
pub fn from_document(document: InterchangeDocument) -> ReadResult<RawWorkflow> {
    if document.schema_version != SCHEMA_VERSION {
        return Err(ReadError::UnsupportedSchemaVersion {
            found: document.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    let section = document.workflow;
    let commands: HashMap<&str, &Command> = section
        .execution
        .iter()
        .flat_map(|e| e.tasks.iter())
        .filter_map(|t| t.command.as_ref().map(|c| (t.id.as_str(), c)))
        .collect();

    let tasks: Vec<Task> = section
        .specification
        .tasks
        .iter()
        .map(|spec| {
            let command = commands.get(spec.id.as_str());
            let executable = command
                .map(|c| c.program.clone())
                .or_else(|| spec.category.clone())
                .unwrap_or_else(|| {
                    spec.name
                        .split('_')
                        .next()
                        .unwrap_or(&spec.name)
                        .to_string()
                });
            Task {
                name: spec.id.clone(),
                executable,
                arguments: command.map(|c| c.arguments.clone()).unwrap_or_default(),
                inputs: spec.input_files.clone(),
                outputs: spec.output_files.clone(),
            }
        })
        .collect();

    let produced: HashSet<&str> = tasks
        .iter()
        .flat_map(|t| t.outputs.iter().map(String::as_str))
        .collect();
    let files = section
        .specification
        .files
        .iter()
        .map(|spec| File {
            name: spec.id.clone(),
            locality: if produced.contains(spec.id.as_str()) {
                Locality::Local
            } else {
                Locality::Remote
            },
            size_bytes: Some(spec.size_in_bytes),
            source_url: None,
        })
        .collect();

    let execution = section.execution.as_ref().map(|e| ExecutionMetadata {
        makespan_seconds: (e.makespan_in_seconds > 0.0).then_some(e.makespan_in_seconds),
        task_runtimes: e
            .tasks
            .iter()
            .filter(|t| t.runtime_in_seconds > 0.0)
            .map(|t| (t.id.clone(), t.runtime_in_seconds))
            .collect(),
        executed_at: parse_timestamp(&e.executed_at),
    });

    Ok(RawWorkflow {
        name: document.name,
        created_at: parse_timestamp(&document.created_at),
        params: None,
        tasks,
        files,
        execution,
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mosaicflow_core::WorkflowBuilder;

    fn scenario(execution: Option<ExecutionMetadata>) -> ResolvedWorkflow {
        let mut builder = WorkflowBuilder::new("scenario");
        builder.created_at(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
        if let Some(execution) = execution {
            builder.execution(execution);
        }
        for name in ["F1", "F2", "F3"] {
            builder.add_file(File::local(name).with_size(100));
        }
        builder
            .add_task(Task::new("T3", "c").input("F1").input("F2").output("F3"))
            .unwrap();
        builder
            .add_task(Task::new("T1", "a").output("F1"))
            .unwrap();
        builder
            .add_task(Task::new("T2", "b").arg("-v").input("F1").output("F2"))
            .unwrap();
        ResolvedWorkflow::resolve(builder.build()).unwrap()
    }

    #[test]
    fn test_parents_and_children() {
        let document = InterchangeEmitter::new().build_document(&scenario(None)).unwrap();
        let tasks = &document.workflow.specification.tasks;
        assert_eq!(tasks[0].id, "T1");
        assert!(tasks[0].parents.is_empty());
        assert_eq!(tasks[0].children, vec!["T2", "T3"]);
        assert_eq!(tasks[1].parents, vec!["T1"]);
        assert_eq!(tasks[1].children, vec!["T3"]);
        assert_eq!(tasks[2].parents, vec!["T1", "T2"]);
        assert!(tasks[2].children.is_empty());
    }

    #[test]
    fn test_files_list_producers_and_consumers() {
        let document = InterchangeEmitter::new().build_document(&scenario(None)).unwrap();
        let f1 = &document.workflow.specification.files[0];
        assert_eq!(f1.producers, vec!["T1"]);
        assert_eq!(f1.consumers, vec!["T2", "T3"]);
        assert_eq!(f1.size_in_bytes, 100);
    }

    #[test]
    fn test_unknown_makespan_is_zero() {
        let document = InterchangeEmitter::new().build_document(&scenario(None)).unwrap();
        let execution = document.workflow.execution.unwrap();
        assert!(execution.makespan_in_seconds.abs() < f64::EPSILON);
        assert_eq!(execution.executed_at, "2026-03-01T12:00:00Z");
        assert_eq!(document.created_at, "2026-03-01T12:00:00Z");
        assert_eq!(execution.machines[0].node_name, "mosaicflow");
    }

    #[test]
    fn test_makespan_from_critical_path() {
        let execution = ExecutionMetadata {
            task_runtimes: BTreeMap::from([
                ("T1".to_string(), 2.0),
                ("T2".to_string(), 3.0),
                ("T3".to_string(), 1.5),
            ]),
            ..ExecutionMetadata::default()
        };
        let document = InterchangeEmitter::new()
            .build_document(&scenario(Some(execution)))
            .unwrap();
        let execution = document.workflow.execution.unwrap();
        assert!((execution.makespan_in_seconds - 6.5).abs() < f64::EPSILON);
        assert!((execution.tasks[1].runtime_in_seconds - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recorded_makespan_wins() {
        let execution = ExecutionMetadata {
            makespan_seconds: Some(42.0),
            ..ExecutionMetadata::default()
        };
        let document = InterchangeEmitter::new()
            .build_document(&scenario(Some(execution)))
            .unwrap();
        let makespan = document.workflow.execution.unwrap().makespan_in_seconds;
        assert!((makespan - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_size_names_file() {
        let mut builder = WorkflowBuilder::new("w");
        builder.add_file(File::local("sized").with_size(1));
        builder.add_file(File::local("unsized"));
        builder
            .add_task(Task::new("t", "mAdd").input("sized").output("unsized"))
            .unwrap();
        let resolved = ResolvedWorkflow::resolve(builder.build()).unwrap();
        let err = InterchangeEmitter::new().compile(&resolved).unwrap_err();
        assert!(matches!(
            &err,
            EmitterError::Compilation { subject, .. } if subject == "unsized"
        ));
        assert!(InterchangeEmitter::new().emit(&resolved).is_err());
    }

    #[test]
    fn test_schema_field_names() {
        let json = InterchangeEmitter::new().emit(&scenario(None)).unwrap();
        for key in [
            "\"schemaVersion\": \"1.5\"",
            "\"createdAt\"",
            "\"inputFiles\"",
            "\"outputFiles\"",
            "\"sizeInBytes\"",
            "\"makespanInSeconds\"",
            "\"runtimeInSeconds\"",
            "\"nodeName\"",
        ] {
            assert!(json.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_read_back() {
        let json = InterchangeEmitter::new().emit(&scenario(None)).unwrap();
        let raw = read(&json).unwrap();
        assert_eq!(raw.tasks.len(), 3);
        assert_eq!(raw.files.len(), 3);
        assert_eq!(raw.tasks[1].executable, "b");
        assert_eq!(raw.tasks[1].arguments, vec!["-v"]);
        assert!(raw.execution.unwrap().makespan_seconds.is_none());
        assert_eq!(
            raw.created_at,
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_read_rejects_other_versions() {
        let json = r#"{"name": "x", "schemaVersion": "1.3", "workflow": {"specification": {}}}"#;
        assert!(matches!(
            read(json),
            Err(ReadError::UnsupportedSchemaVersion { .. })
        ));
    }

    #[test]
    fn test_read_falls_back_to_name_prefix() {
        let json = r#"{
            "name": "x",
            "schemaVersion": "1.5",
            "workflow": {"specification": {
                "tasks": [{"name": "mAdd_1", "id": "mAdd_1", "outputFiles": ["m.fits"]}],
                "files": [{"id": "m.fits", "sizeInBytes": 5}]
            }}
        }"#;
        let raw = read(json).unwrap();
        assert_eq!(raw.tasks[0].executable, "mAdd");
        assert_eq!(raw.files[0].locality, Locality::Local);
    }
}
