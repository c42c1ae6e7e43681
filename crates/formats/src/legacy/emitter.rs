//! Legacy YAML Emitter
//!
//! Writes the flat task/file listing and reads it back. Dependencies are not
//! written; readers recover them from input/output names.

use super::schema::{LegacyDocument, LegacyFile, LegacyTask};
use crate::emitter::{Emitter, EmitterError, EmitterResult};
use crate::raw::RawWorkflow;
use crate::reader::ReadResult;
use mosaicflow_core::{File, Locality, OutputFormat, ResolvedWorkflow, Task};

/// Legacy workflow emitter
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyEmitter;

impl LegacyEmitter {
    /// Create a new legacy emitter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Convert the workflow to a legacy document
    #[must_use]
    pub fn build_document(&self, resolved: &ResolvedWorkflow) -> LegacyDocument {
        let workflow = resolved.workflow();
        let dag = resolved.dag();

        let files = workflow
            .files()
            .iter()
            .map(|file| {
                let produced = dag.producer(&file.name).is_some();
                let entry = LegacyFile {
                    name: file.name.clone(),
                    source: file.source_url.clone(),
                    is_input: !produced,
                    is_output: produced,
                    locality: Some(file.locality.to_string()),
                    size_in_bytes: file.size_bytes,
                };
                (file.name.clone(), entry)
            })
            .collect();

        let tasks = workflow
            .tasks()
            .iter()
            .map(|task| LegacyTask {
                name: task.name.clone(),
                executable: task.executable.clone(),
                arguments: task.arguments.clone(),
                inputs: task.inputs.clone(),
                outputs: task.outputs.clone(),
            })
            .collect();

        let inputs = dag
            .entry_files()
            .iter()
            .filter(|name| {
                workflow
                    .file(name)
                    .is_some_and(|f| f.source_url.is_some())
            })
            .cloned()
            .collect();

        let outputs = dag
            .terminal_files()
            .iter()
            .filter(|name| dag.producer(name).is_some())
            .cloned()
            .collect();

        LegacyDocument {
            name: workflow.name().to_string(),
            files,
            tasks,
            inputs,
            outputs,
        }
    }
}

impl Emitter for LegacyEmitter {
    fn emit(&self, workflow: &ResolvedWorkflow) -> EmitterResult<String> {
        let document = self.build_document(workflow);
        serde_yaml::to_string(&document).map_err(|e| EmitterError::Serialization(e.to_string()))
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Legacy
    }

    fn description(&self) -> &'static str {
        "Legacy flat YAML task/file listing"
    }
}

/// Parse a legacy YAML document.
///
/// A missing `locality` is inferred: files fetched from a non-`file://`
/// source are remote, everything else is local.
///
/// # Errors
/// Returns `ReadError::Yaml` if the document does not parse.
pub fn read(content: &str) -> ReadResult<RawWorkflow> {
    let document: LegacyDocument = serde_yaml::from_str(content)?;
    Ok(from_document(document))
}

/// Convert a parsed legacy document.
#[must_use]
pub fn from_document(document: LegacyDocument) -> RawWorkflow {
    let files = document
        .files
        .into_iter()
        .map(|(key, entry)| {
            let name = if entry.name.is_empty() { key } else { entry.name };
            let locality = match entry.locality.as_deref() {
                Some("remote") => Locality::Remote,
                Some(_) => Locality::Local,
                None => match &entry.source {
                    Some(url) if !url.starts_with("file://") => Locality::Remote,
                    _ => Locality::Local,
                },
            };
            File {
                name,
                locality,
                size_bytes: entry.size_in_bytes,
                source_url: entry.source,
            }
        })
        .collect();

    let tasks = document
        .tasks
        .into_iter()
        .map(|task| Task {
            name: task.name,
            executable: task.executable,
            arguments: task.arguments,
            inputs: task.inputs,
            outputs: task.outputs,
        })
        .collect();

    RawWorkflow {
        name: document.name,
        tasks,
        files,
        ..RawWorkflow::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaicflow_core::WorkflowBuilder;

    fn resolved() -> ResolvedWorkflow {
        let mut builder = WorkflowBuilder::new("m31");
        builder.add_file(File::remote("raw.fits", "https://irsa.ipac.caltech.edu/raw.fits"));
        builder.add_file(File::local("region.hdr").with_source("file:///data/region.hdr"));
        builder.add_file(File::local("p.fits").with_size(4096));
        builder.add_file(File::local("mosaic.fits"));
        builder
            .add_task(
                Task::new("mProject_000001", "mProject")
                    .args(["-X", "raw.fits", "p.fits", "region.hdr"])
                    .input("raw.fits")
                    .input("region.hdr")
                    .output("p.fits"),
            )
            .unwrap();
        builder
            .add_task(
                Task::new("mAdd_000002", "mAdd")
                    .input("p.fits")
                    .output("mosaic.fits"),
            )
            .unwrap();
        ResolvedWorkflow::resolve(builder.build()).unwrap()
    }

    #[test]
    fn test_document_sections() {
        let document = LegacyEmitter::new().build_document(&resolved());
        assert_eq!(document.inputs, vec!["raw.fits", "region.hdr"]);
        assert_eq!(document.outputs, vec!["mosaic.fits"]);
        let keys: Vec<_> = document.files.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["raw.fits", "region.hdr", "p.fits", "mosaic.fits"]);
        let p = &document.files[2].1;
        assert!(p.is_output && !p.is_input);
        assert_eq!(p.size_in_bytes, Some(4096));
    }

    #[test]
    fn test_emit_has_no_dependency_section() {
        let yaml = LegacyEmitter::new().emit(&resolved()).unwrap();
        assert!(yaml.starts_with("name: m31\n"));
        assert!(yaml.contains("executable: mProject"));
        assert!(!yaml.contains("parents"));
        assert!(!yaml.contains("after"));
    }

    #[test]
    fn test_read_back() {
        let yaml = LegacyEmitter::new().emit(&resolved()).unwrap();
        let raw = read(&yaml).unwrap();
        assert_eq!(raw.name, "m31");
        assert_eq!(raw.tasks.len(), 2);
        assert_eq!(raw.files.len(), 4);
        assert_eq!(raw.files[0].locality, Locality::Remote);
        assert_eq!(raw.tasks[0].arguments[0], "-X");
    }

    #[test]
    fn test_read_infers_locality() {
        let yaml = r#"
name: old
files:
  a.fits:
    name: a.fits
    source: https://example.org/a.fits
    is_input: true
    is_output: false
  images.tbl:
    name: images.tbl
    source: file:///data/images.tbl
    is_input: true
    is_output: false
tasks: []
inputs: [a.fits, images.tbl]
outputs: []
"#;
        let raw = read(yaml).unwrap();
        assert_eq!(raw.files[0].locality, Locality::Remote);
        assert_eq!(raw.files[1].locality, Locality::Local);
    }
}
