//! Workflow Validation
//!
//! Checks a live workflow or a serialized artifact of any supported format
//! and returns a structured report. Structural problems are reported, never
//! raised; only input that does not parse at all is an error.

use crate::raw::RawWorkflow;
use crate::reader::{ReadError, ReadResult};
use crate::{engine, interchange, legacy};
use mosaicflow_core::{File, Locality, OutputFormat, Task, Workflow};
use mosaicflow_task_graph::{TaskGraph, TaskNodeData};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// A structural error
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Violation {
    /// A task references a file the workflow never declares
    #[error("Task '{task}' references undefined file '{file}'")]
    UndeclaredFile {
        /// Referencing task
        task: String,
        /// Missing file
        file: String,
    },

    /// More than one task writes the same file
    #[error("File '{file}' is produced by several tasks: {}", .tasks.join(", "))]
    MultipleProducers {
        /// Contested file
        file: String,
        /// Every producer, in document order
        tasks: Vec<String>,
    },

    /// The derived graph has a cycle
    #[error("Task graph contains cycle between tasks: {}", .tasks.join(", "))]
    Cycle {
        /// Every task on a cycle, sorted
        tasks: Vec<String>,
    },

    /// A required field is absent
    #[error("{location}: missing required field '{field}'")]
    MissingField {
        /// Where in the document
        location: String,
        /// Field name
        field: String,
    },

    /// A field has the wrong JSON/YAML type
    #[error("{location}: '{field}' should be {expected}")]
    WrongType {
        /// Where in the document
        location: String,
        /// Field name
        field: String,
        /// Expected type
        expected: String,
    },

    /// Interchange version this tool does not understand
    #[error("Unsupported schema version '{found}' (expected {expected})")]
    UnsupportedSchemaVersion {
        /// Version in the document
        found: String,
        /// Supported version
        expected: String,
    },

    /// Explicit edges disagree with data flow
    #[error("Task '{task}' declares {relation} [{}] but data flow gives [{}]", .declared.join(", "), .derived.join(", "))]
    InconsistentEdges {
        /// Task whose edges disagree
        task: String,
        /// `after`, `parents` or `children`
        relation: String,
        /// What the document says
        declared: Vec<String>,
        /// What data flow implies
        derived: Vec<String>,
    },

    /// Two tasks share a name
    #[error("Duplicate task name '{name}'")]
    DuplicateTask {
        /// Repeated name
        name: String,
    },

    /// No tasks at all
    #[error("No tasks defined in workflow")]
    EmptyWorkflow,
}

/// A non-fatal finding
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Warning {
    /// Declared but never read or written
    #[error("File '{file}' is defined but never used")]
    UnusedFile {
        /// Unused file
        file: String,
    },

    /// Remote entry file with no location to fetch it from
    #[error("Input file '{file}' has no source URL")]
    EntryWithoutSource {
        /// Entry file
        file: String,
    },

    /// A task that writes nothing
    #[error("Task '{task}' has no outputs")]
    TaskWithoutOutputs {
        /// Task name
        task: String,
    },

    /// Legacy file key differs from its `name` field
    #[error("File key '{key}' does not match name '{name}'")]
    NameMismatch {
        /// Map key
        key: String,
        /// `name` field
        name: String,
    },
}

/// Outcome of validating one workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Workflow name, if one could be read
    pub workflow: String,
    /// Format that was validated; `None` for a live workflow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    /// Number of tasks seen
    pub tasks: usize,
    /// Number of files seen
    pub files: usize,
    /// Structural errors
    pub errors: Vec<Violation>,
    /// Non-fatal findings
    pub warnings: Vec<Warning>,
}

impl ValidationReport {
    /// No errors were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Valid, and under `strict` also free of warnings.
    #[must_use]
    pub fn passes(&self, strict: bool) -> bool {
        self.is_valid() && !(strict && !self.warnings.is_empty())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            Some(format) => writeln!(f, "Validating {format} workflow: {}", self.workflow)?,
            None => writeln!(f, "Validating workflow: {}", self.workflow)?,
        }
        writeln!(f, "  {} tasks, {} files", self.tasks, self.files)?;
        writeln!(f)?;

        if !self.errors.is_empty() {
            writeln!(f, "VALIDATION FAILED")?;
            writeln!(f)?;
            writeln!(f, "Errors ({}):", self.errors.len())?;
            for error in &self.errors {
                writeln!(f, "  - {error}")?;
            }
        }
        if !self.warnings.is_empty() {
            if !self.errors.is_empty() {
                writeln!(f)?;
            }
            writeln!(f, "Warnings ({}):", self.warnings.len())?;
            for warning in &self.warnings {
                writeln!(f, "  - {warning}")?;
            }
        }
        if self.errors.is_empty() {
            if !self.warnings.is_empty() {
                writeln!(f)?;
            }
            writeln!(f, "VALIDATION PASSED")?;
        }
        Ok(())
    }
}

/// Validate a live workflow.
#[must_use]
pub fn validate_workflow(workflow: &Workflow) -> ValidationReport {
    let mut report = ValidationReport {
        workflow: workflow.name().to_string(),
        format: None,
        tasks: workflow.tasks().len(),
        files: workflow.files().len(),
        errors: Vec::new(),
        warnings: Vec::new(),
    };
    GraphValidator::new(workflow.tasks(), workflow.files()).check(&mut report, true);
    report
}

/// Validate a serialized artifact.
///
/// # Errors
/// Returns `ReadError` only if `content` is not valid YAML/JSON at all.
pub fn validate_document(format: OutputFormat, content: &str) -> ReadResult<ValidationReport> {
    let value: Value = match format {
        OutputFormat::Legacy => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
            serde_json::to_value(yaml).map_err(|e| ReadError::json(format, e))?
        }
        OutputFormat::Engine | OutputFormat::Interchange => {
            serde_json::from_str(content).map_err(|e| ReadError::json(format, e))?
        }
    };

    let mut report = ValidationReport {
        workflow: value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        format: Some(format),
        tasks: 0,
        files: 0,
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    let mut schema = SchemaChecker::default();
    match format {
        OutputFormat::Legacy => schema.legacy(&value, &mut report.warnings),
        OutputFormat::Engine => schema.engine(&value),
        OutputFormat::Interchange => schema.interchange(&value),
    }
    if !schema.errors.is_empty() {
        report.errors = schema.errors;
        return Ok(report);
    }

    let raw = match typed(format, value.clone()) {
        Ok(raw) => raw,
        Err(message) => {
            report.errors.push(Violation::WrongType {
                location: "document".to_string(),
                field: format.name().to_string(),
                expected: message,
            });
            return Ok(report);
        }
    };

    report.tasks = raw.tasks.len();
    report.files = raw.files.len();
    let graph = GraphValidator::new(&raw.tasks, &raw.files);
    graph.check(&mut report, format != OutputFormat::Interchange);

    match format {
        OutputFormat::Legacy => {}
        OutputFormat::Engine => graph.check_engine_edges(&value, &mut report.errors),
        OutputFormat::Interchange => graph.check_interchange_edges(&value, &mut report.errors),
    }
    Ok(report)
}

fn typed(format: OutputFormat, value: Value) -> Result<RawWorkflow, String> {
    match format {
        OutputFormat::Legacy => serde_json::from_value(value)
            .map(legacy::emitter::from_document)
            .map_err(|e| e.to_string()),
        OutputFormat::Engine => serde_json::from_value(value)
            .map_err(|e| e.to_string())
            .and_then(|doc| engine::emitter::from_document(doc).map_err(|e| e.to_string())),
        OutputFormat::Interchange => serde_json::from_value(value)
            .map_err(|e| e.to_string())
            .and_then(|doc| interchange::emitter::from_document(doc).map_err(|e| e.to_string())),
    }
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    String,
    Array,
    Object,
    Integer,
    Number,
}

impl Kind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Integer => value.is_u64(),
            Self::Number => value.is_number(),
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Array => "a list",
            Self::Object => "a mapping",
            Self::Integer => "a non-negative integer",
            Self::Number => "a number",
        }
    }
}

/// Field presence and type checks on the untyped document.
#[derive(Default)]
struct SchemaChecker {
    errors: Vec<Violation>,
}

impl SchemaChecker {
    fn require<'v>(&mut self, value: &'v Value, location: &str, field: &str, kind: Kind) -> Option<&'v Value> {
        let Some(found) = value.get(field) else {
            self.errors.push(Violation::MissingField {
                location: location.to_string(),
                field: field.to_string(),
            });
            return None;
        };
        self.typed(found, location, field, kind)
    }

    fn optional<'v>(&mut self, value: &'v Value, location: &str, field: &str, kind: Kind) -> Option<&'v Value> {
        value
            .get(field)
            .filter(|v| !v.is_null())
            .and_then(|found| self.typed(found, location, field, kind))
    }

    fn typed<'v>(&mut self, found: &'v Value, location: &str, field: &str, kind: Kind) -> Option<&'v Value> {
        if kind.matches(found) {
            Some(found)
        } else {
            self.errors.push(Violation::WrongType {
                location: location.to_string(),
                field: field.to_string(),
                expected: kind.describe().to_string(),
            });
            None
        }
    }

    fn array_of(&mut self, value: &Value, location: &str, field: &str, kind: Kind, required: bool) {
        let list = if required {
            self.require(value, location, field, Kind::Array)
        } else {
            self.optional(value, location, field, Kind::Array)
        };
        if let Some(items) = list.and_then(Value::as_array)
            && items.iter().any(|item| !kind.matches(item))
        {
            self.errors.push(Violation::WrongType {
                location: location.to_string(),
                field: field.to_string(),
                expected: format!("a list of {}s", kind.describe().trim_start_matches("a ")),
            });
        }
    }

    fn legacy(&mut self, doc: &Value, warnings: &mut Vec<Warning>) {
        self.require(doc, "workflow", "name", Kind::String);
        if let Some(files) = self.require(doc, "workflow", "files", Kind::Object).and_then(Value::as_object) {
            for (key, entry) in files {
                let location = format!("file '{key}'");
                if !entry.is_object() {
                    self.errors.push(Violation::WrongType {
                        location,
                        field: key.clone(),
                        expected: Kind::Object.describe().to_string(),
                    });
                    continue;
                }
                if let Some(name) = self.require(entry, &location, "name", Kind::String).and_then(Value::as_str)
                    && name != key.as_str()
                {
                    warnings.push(Warning::NameMismatch {
                        key: key.clone(),
                        name: name.to_string(),
                    });
                }
                self.optional(entry, &location, "source", Kind::String);
                self.optional(entry, &location, "size_in_bytes", Kind::Integer);
            }
        }
        if let Some(tasks) = self.require(doc, "workflow", "tasks", Kind::Array).and_then(Value::as_array) {
            for (i, task) in tasks.iter().enumerate() {
                let location = task_location(i, task);
                if !task.is_object() {
                    self.errors.push(Violation::WrongType {
                        location,
                        field: "tasks".to_string(),
                        expected: Kind::Object.describe().to_string(),
                    });
                    continue;
                }
                self.require(task, &location, "name", Kind::String);
                self.require(task, &location, "executable", Kind::String);
                self.array_of(task, &location, "arguments", Kind::String, false);
                self.array_of(task, &location, "inputs", Kind::String, true);
                self.array_of(task, &location, "outputs", Kind::String, true);
            }
        }
    }

    fn engine(&mut self, doc: &Value) {
        self.require(doc, "workflow", "name", Kind::String);
        if let Some(processes) = self.require(doc, "workflow", "processes", Kind::Array).and_then(Value::as_array) {
            for (i, process) in processes.iter().enumerate() {
                let location = task_location(i, process);
                if !process.is_object() {
                    self.errors.push(Violation::WrongType {
                        location,
                        field: "processes".to_string(),
                        expected: Kind::Object.describe().to_string(),
                    });
                    continue;
                }
                self.require(process, &location, "name", Kind::String);
                let executor = self
                    .require(process, &location, "config", Kind::Object)
                    .and_then(|config| self.require(config, &location, "executor", Kind::Object));
                if let Some(executor) = executor {
                    self.require(executor, &location, "executable", Kind::String);
                    self.array_of(executor, &location, "args", Kind::String, false);
                }
                self.array_of(process, &location, "ins", Kind::Integer, true);
                self.array_of(process, &location, "outs", Kind::Integer, true);
                self.array_of(process, &location, "after", Kind::String, false);
            }
        }
        if let Some(signals) = self.require(doc, "workflow", "signals", Kind::Array).and_then(Value::as_array) {
            for (i, signal) in signals.iter().enumerate() {
                let location = format!("signal {i}");
                if signal.is_object() {
                    self.require(signal, &location, "name", Kind::String);
                    self.optional(signal, &location, "sizeInBytes", Kind::Integer);
                } else {
                    self.errors.push(Violation::WrongType {
                        location,
                        field: "signals".to_string(),
                        expected: Kind::Object.describe().to_string(),
                    });
                }
            }
        }
    }

    fn interchange(&mut self, doc: &Value) {
        self.require(doc, "workflow", "name", Kind::String);
        if let Some(version) = self.require(doc, "workflow", "schemaVersion", Kind::String).and_then(Value::as_str)
            && version != interchange::SCHEMA_VERSION
        {
            self.errors.push(Violation::UnsupportedSchemaVersion {
                found: version.to_string(),
                expected: interchange::SCHEMA_VERSION.to_string(),
            });
        }
        let Some(section) = self.require(doc, "workflow", "workflow", Kind::Object) else {
            return;
        };
        if let Some(spec) = self.require(section, "workflow", "specification", Kind::Object) {
            if let Some(tasks) = self.require(spec, "specification", "tasks", Kind::Array).and_then(Value::as_array) {
                for (i, task) in tasks.iter().enumerate() {
                    let location = task_location(i, task);
                    self.require(task, &location, "name", Kind::String);
                    self.require(task, &location, "id", Kind::String);
                    for field in ["parents", "children", "inputFiles", "outputFiles"] {
                        self.array_of(task, &location, field, Kind::String, true);
                    }
                }
            }
            if let Some(files) = self.require(spec, "specification", "files", Kind::Array).and_then(Value::as_array) {
                for (i, file) in files.iter().enumerate() {
                    let location = file
                        .get("id")
                        .and_then(Value::as_str)
                        .map_or_else(|| format!("file {i}"), |id| format!("file '{id}'"));
                    self.require(file, &location, "id", Kind::String);
                    self.require(file, &location, "sizeInBytes", Kind::Integer);
                }
            }
        }
        if let Some(execution) = self.optional(section, "workflow", "execution", Kind::Object) {
            self.require(execution, "execution", "makespanInSeconds", Kind::Number);
            self.require(execution, "execution", "executedAt", Kind::String);
        }
    }
}

fn task_location(index: usize, task: &Value) -> String {
    match task.get("name").and_then(Value::as_str) {
        Some(name) => format!("task {index} ({name})"),
        None => format!("task {index}"),
    }
}

/// Borrowed task view fed to the task graph.
#[derive(Clone)]
struct FlowNode<'a> {
    inputs: Vec<&'a str>,
    outputs: Vec<&'a str>,
}

impl TaskNodeData for FlowNode<'_> {
    fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|name| &**name)
    }

    fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|name| &**name)
    }
}

/// Data-flow checks shared by every input kind.
struct GraphValidator<'a> {
    tasks: &'a [Task],
    files: &'a [File],
    producers: HashMap<&'a str, &'a str>,
}

impl<'a> GraphValidator<'a> {
    fn new(tasks: &'a [Task], files: &'a [File]) -> Self {
        let mut producers = HashMap::new();
        for task in tasks {
            for output in &task.outputs {
                producers.entry(output.as_str()).or_insert(task.name.as_str());
            }
        }
        Self {
            tasks,
            files,
            producers,
        }
    }

    fn check(&self, report: &mut ValidationReport, sources_expected: bool) {
        if self.tasks.is_empty() {
            report.errors.push(Violation::EmptyWorkflow);
        }

        let mut seen = HashSet::new();
        for task in self.tasks {
            if !seen.insert(task.name.as_str()) {
                report.errors.push(Violation::DuplicateTask {
                    name: task.name.clone(),
                });
            }
        }

        let declared: HashSet<&str> = self.files.iter().map(|f| f.name.as_str()).collect();
        for task in self.tasks {
            for file in task.inputs.iter().chain(&task.outputs) {
                if !declared.contains(file.as_str()) {
                    report.errors.push(Violation::UndeclaredFile {
                        task: task.name.clone(),
                        file: file.clone(),
                    });
                }
            }
        }

        let mut writers: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for task in self.tasks {
            for output in &task.outputs {
                writers.entry(output.as_str()).or_default().push(task.name.clone());
            }
        }
        for (file, tasks) in writers {
            if tasks.len() > 1 {
                report.errors.push(Violation::MultipleProducers {
                    file: file.to_string(),
                    tasks,
                });
            }
        }

        let tasks = self.cycle_members();
        if !tasks.is_empty() {
            report.errors.push(Violation::Cycle { tasks });
        }

        let referenced: HashSet<&str> = self
            .tasks
            .iter()
            .flat_map(|t| t.inputs.iter().chain(&t.outputs))
            .map(String::as_str)
            .collect();
        for file in self.files {
            let name = file.name.as_str();
            if !referenced.contains(name) {
                report.warnings.push(Warning::UnusedFile {
                    file: file.name.clone(),
                });
            } else if sources_expected
                && !self.producers.contains_key(name)
                && file.locality == Locality::Remote
                && file.source_url.is_none()
            {
                report.warnings.push(Warning::EntryWithoutSource {
                    file: file.name.clone(),
                });
            }
        }
        for task in self.tasks {
            if task.outputs.is_empty() {
                report.warnings.push(Warning::TaskWithoutOutputs {
                    task: task.name.clone(),
                });
            }
        }
    }

    /// Upstream tasks of `task` implied by data flow.
    fn parents_of(&self, task: &Task) -> BTreeSet<String> {
        task.inputs
            .iter()
            .filter_map(|input| self.producers.get(input.as_str()))
            .map(|p| (*p).to_string())
            .collect()
    }

    fn derived_parents(&self) -> BTreeMap<&'a str, BTreeSet<String>> {
        self.tasks
            .iter()
            .map(|t| (t.name.as_str(), self.parents_of(t)))
            .collect()
    }

    /// Tasks on a cycle of the data-flow graph.
    ///
    /// Problems reported elsewhere (repeated names, second producers,
    /// undeclared files) are left out of the graph so the remaining tasks
    /// are still checked.
    fn cycle_members(&self) -> Vec<String> {
        let mut graph: TaskGraph<FlowNode<'a>> = TaskGraph::new();
        let mut names = HashSet::new();
        let mut produced = HashSet::new();
        for task in self.tasks {
            if !names.insert(task.name.as_str()) {
                continue;
            }
            let outputs = task
                .outputs
                .iter()
                .map(String::as_str)
                .filter(|output| produced.insert(*output))
                .collect();
            let node = FlowNode {
                inputs: task.inputs.iter().map(String::as_str).collect(),
                outputs,
            };
            let _ = graph.add_task(&task.name, node);
        }
        if graph.add_data_flow_edges(|_| true).is_err() {
            return Vec::new();
        }
        graph.cycle_members()
    }

    fn check_engine_edges(&self, doc: &Value, errors: &mut Vec<Violation>) {
        let Some(processes) = doc.get("processes").and_then(Value::as_array) else {
            return;
        };
        if !processes.iter().any(|p| p.get("after").is_some()) {
            return;
        }
        let derived = self.derived_parents();
        for process in processes {
            let Some(name) = process.get("name").and_then(Value::as_str) else {
                continue;
            };
            let declared = string_set(process.get("after"));
            compare(name, "after", declared, derived.get(name), errors);
        }
    }

    fn check_interchange_edges(&self, doc: &Value, errors: &mut Vec<Violation>) {
        let Some(tasks) = doc
            .pointer("/workflow/specification/tasks")
            .and_then(Value::as_array)
        else {
            return;
        };
        let parents = self.derived_parents();
        let mut children: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
        for (task, ups) in &parents {
            for up in ups {
                children.entry(up.as_str()).or_default().insert((*task).to_string());
            }
        }
        for task in tasks {
            let Some(id) = task.get("id").and_then(Value::as_str) else {
                continue;
            };
            compare(id, "parents", string_set(task.get("parents")), parents.get(id), errors);
            compare(id, "children", string_set(task.get("children")), children.get(id), errors);
        }
    }
}

fn string_set(value: Option<&Value>) -> BTreeSet<String> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn compare(
    task: &str,
    relation: &str,
    declared: BTreeSet<String>,
    derived: Option<&BTreeSet<String>>,
    errors: &mut Vec<Violation>,
) {
    let derived = derived.cloned().unwrap_or_default();
    if declared != derived {
        errors.push(Violation::InconsistentEdges {
            task: task.to_string(),
            relation: relation.to_string(),
            declared: declared.into_iter().collect(),
            derived: derived.into_iter().collect(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Emitter;
    use crate::{EngineEmitter, InterchangeEmitter, LegacyEmitter};
    use mosaicflow_core::{ResolvedWorkflow, WorkflowBuilder};

    fn resolved() -> ResolvedWorkflow {
        let mut builder = WorkflowBuilder::new("v");
        builder.add_file(File::remote("raw.fits", "https://example.org/raw.fits").with_size(10));
        builder.add_file(File::local("p.fits").with_size(10));
        builder.add_file(File::local("m.fits").with_size(10));
        builder
            .add_task(Task::new("p", "mProject").input("raw.fits").output("p.fits"))
            .unwrap();
        builder
            .add_task(Task::new("a", "mAdd").input("p.fits").output("m.fits"))
            .unwrap();
        ResolvedWorkflow::resolve(builder.build()).unwrap()
    }

    #[test]
    fn test_live_workflow_passes() {
        let report = validate_workflow(resolved().workflow());
        assert!(report.is_valid());
        assert!(report.passes(true));
        assert!(report.to_string().contains("VALIDATION PASSED"));
    }

    #[test]
    fn test_emitted_documents_pass() {
        let workflow = resolved();
        let cases: [(OutputFormat, &dyn Emitter); 3] = [
            (OutputFormat::Legacy, &LegacyEmitter),
            (OutputFormat::Engine, &EngineEmitter::new()),
            (OutputFormat::Interchange, &InterchangeEmitter),
        ];
        for (format, emitter) in cases {
            let content = emitter.emit(&workflow).unwrap();
            let report = validate_document(format, &content).unwrap();
            assert!(report.is_valid(), "{format}: {report}");
            assert_eq!(report.tasks, 2);
            assert_eq!(report.files, 3);
        }
    }

    #[test]
    fn test_legacy_structural_errors() {
        let yaml = r"
name: broken
files:
  a.fits:
    name: b.fits
  c.fits: 12
tasks:
  - name: t
    inputs: [a.fits]
";
        let report = validate_document(OutputFormat::Legacy, yaml).unwrap();
        assert!(!report.is_valid());
        assert!(report.errors.contains(&Violation::MissingField {
            location: "task 0 (t)".to_string(),
            field: "executable".to_string(),
        }));
        assert!(report.errors.contains(&Violation::MissingField {
            location: "task 0 (t)".to_string(),
            field: "outputs".to_string(),
        }));
        assert!(report.errors.iter().any(|e| matches!(e, Violation::WrongType { location, .. } if location == "file 'c.fits'")));
        assert!(report.warnings.contains(&Warning::NameMismatch {
            key: "a.fits".to_string(),
            name: "b.fits".to_string(),
        }));
    }

    #[test]
    fn test_undeclared_and_multiple_producers() {
        let yaml = r"
name: w
files:
  a: {name: a}
tasks:
  - {name: t1, executable: x, inputs: [ghost], outputs: [a]}
  - {name: t2, executable: x, inputs: [], outputs: [a]}
";
        let report = validate_document(OutputFormat::Legacy, yaml).unwrap();
        assert!(report.errors.contains(&Violation::UndeclaredFile {
            task: "t1".to_string(),
            file: "ghost".to_string(),
        }));
        assert!(report.errors.contains(&Violation::MultipleProducers {
            file: "a".to_string(),
            tasks: vec!["t1".to_string(), "t2".to_string()],
        }));
    }

    #[test]
    fn test_cycle_reported_with_members() {
        let yaml = r"
name: w
files:
  a: {name: a}
  b: {name: b}
tasks:
  - {name: x, executable: e, inputs: [b], outputs: [a]}
  - {name: y, executable: e, inputs: [a], outputs: [b]}
";
        let report = validate_document(OutputFormat::Legacy, yaml).unwrap();
        assert!(report.errors.contains(&Violation::Cycle {
            tasks: vec!["x".to_string(), "y".to_string()],
        }));
        assert!(
            report
                .to_string()
                .contains("Task graph contains cycle between tasks: x, y")
        );
    }

    #[test]
    fn test_self_consumption_is_a_cycle() {
        let yaml = r"
name: w
files:
  a: {name: a}
tasks:
  - {name: x, executable: e, inputs: [a], outputs: [a]}
";
        let report = validate_document(OutputFormat::Legacy, yaml).unwrap();
        assert!(report.errors.contains(&Violation::Cycle {
            tasks: vec!["x".to_string()],
        }));
    }

    #[test]
    fn test_empty_workflow_and_warnings() {
        let yaml = "name: w\nfiles:\n  a: {name: a}\ntasks: []\n";
        let report = validate_document(OutputFormat::Legacy, yaml).unwrap();
        assert_eq!(report.errors, vec![Violation::EmptyWorkflow]);
        assert_eq!(
            report.warnings,
            vec![Warning::UnusedFile {
                file: "a".to_string()
            }]
        );
    }

    #[test]
    fn test_strict_fails_on_warnings() {
        let yaml = r"
name: w
files:
  raw: {name: raw, is_input: true, locality: remote}
tasks:
  - {name: t, executable: e, inputs: [raw], outputs: []}
";
        let report = validate_document(OutputFormat::Legacy, yaml).unwrap();
        assert!(report.is_valid());
        assert!(!report.passes(true));
        assert!(report.warnings.contains(&Warning::EntryWithoutSource {
            file: "raw".to_string()
        }));
        assert!(report.warnings.contains(&Warning::TaskWithoutOutputs {
            task: "t".to_string()
        }));
    }

    #[test]
    fn test_engine_inconsistent_after() {
        let mut doc: Value =
            serde_json::from_str(&EngineEmitter::new().emit(&resolved()).unwrap()).unwrap();
        doc["processes"][1]["after"] = serde_json::json!(["nobody"]);
        let report = validate_document(OutputFormat::Engine, &doc.to_string()).unwrap();
        assert_eq!(
            report.errors,
            vec![Violation::InconsistentEdges {
                task: "a".to_string(),
                relation: "after".to_string(),
                declared: vec!["nobody".to_string()],
                derived: vec!["p".to_string()],
            }]
        );
    }

    #[test]
    fn test_engine_wrong_types() {
        let json = r#"{"name": "e", "processes": [{"name": "p", "config": {"executor": {}}, "ins": ["0"], "outs": []}], "signals": []}"#;
        let report = validate_document(OutputFormat::Engine, json).unwrap();
        assert!(report.errors.iter().any(|e| matches!(e, Violation::MissingField { field, .. } if field == "executable")));
        assert!(report.errors.iter().any(|e| matches!(e, Violation::WrongType { field, .. } if field == "ins")));
    }

    #[test]
    fn test_interchange_version_and_children() {
        let mut doc: Value =
            serde_json::from_str(&InterchangeEmitter.emit(&resolved()).unwrap()).unwrap();
        doc["workflow"]["specification"]["tasks"][0]["children"] = serde_json::json!([]);
        let report = validate_document(OutputFormat::Interchange, &doc.to_string()).unwrap();
        assert!(report.errors.iter().any(|e| matches!(
            e,
            Violation::InconsistentEdges { relation, .. } if relation == "children"
        )));

        doc["schemaVersion"] = serde_json::json!("1.2");
        let report = validate_document(OutputFormat::Interchange, &doc.to_string()).unwrap();
        assert_eq!(
            report.errors,
            vec![Violation::UnsupportedSchemaVersion {
                found: "1.2".to_string(),
                expected: "1.5".to_string(),
            }]
        );
    }

    #[test]
    fn test_unparseable_input_is_an_error() {
        assert!(validate_document(OutputFormat::Engine, "{not json").is_err());
        assert!(validate_document(OutputFormat::Legacy, "a: [b").is_err());
    }

    #[test]
    fn test_report_serializes() {
        let report = validate_document(OutputFormat::Legacy, "name: w\nfiles: {}\ntasks: []\n").unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["format"], "yaml");
        assert_eq!(json["errors"][0]["kind"], "emptyWorkflow");
    }
}
