//! Human-readable `WORKFLOW-INFO.txt` for a generated output directory.

use mosaicflow_core::{OutputFormat, Workflow, WorkflowStats};
use std::fmt::Write as _;

/// Summary file name inside an output directory
pub const INFO_FILE: &str = "WORKFLOW-INFO.txt";

const RULE_WIDTH: usize = 70;

/// One written artifact as listed in the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedArtifact {
    /// Producing format
    pub format: OutputFormat,
    /// File name
    pub file_name: String,
    /// Size in bytes
    pub bytes: usize,
}

/// Render the summary for a generated directory.
///
/// The timestamp is the workflow's creation time, so rendering the same
/// workflow twice gives the same text.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn render(
    workflow: &Workflow,
    stats: &WorkflowStats,
    artifacts: &[ListedArtifact],
    sidecars: &[String],
) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let params = workflow.params();
    let mut out = String::new();

    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, "Montage Workflow Information");
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Generated: {}",
        workflow.created_at().format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "Generator: mosaicflow v{}", env!("CARGO_PKG_VERSION"));
    let _ = writeln!(out);

    let formats: Vec<&str> = artifacts.iter().map(|a| a.format.name()).collect();
    let _ = writeln!(out, "Generation Parameters");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "  Center:         {}", params.center);
    let _ = writeln!(out, "  Size:           {} degrees", params.degrees);
    let _ = writeln!(out, "  Bands:          {}", params.bands.join(", "));
    let _ = writeln!(out, "  Formats:        {}", formats.join(", "));
    let _ = writeln!(out);

    let _ = writeln!(out, "Workflow Statistics");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "  Total Tasks:    {}", stats.total_tasks);
    let _ = writeln!(out, "  Total Files:    {}", stats.total_files);
    let _ = writeln!(out, "  Input Files:    {}", stats.files_by_role.input);
    let _ = writeln!(out, "  Output Files:   {}", stats.files_by_role.output);
    let _ = writeln!(out, "  Intermediate:   {}", stats.files_by_role.intermediate);
    if let Some(levels) = stats.levels {
        let _ = writeln!(out, "  Levels:         {levels}");
    }
    let _ = writeln!(out);

    let mut by_count: Vec<(&String, &usize)> = stats.tasks_by_executable.iter().collect();
    by_count.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let _ = writeln!(out, "Tasks by Executable");
    let _ = writeln!(out, "{rule}");
    for (executable, count) in by_count {
        let _ = writeln!(out, "  {executable:20} {count:4} tasks");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Generated Files");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Workflow Files:");
    for artifact in artifacts {
        let _ = writeln!(
            out,
            "  - {} ({:.1} KB)",
            artifact.file_name,
            artifact.bytes as f64 / 1024.0
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Auxiliary Files: ({} files)", sidecars.len());
    for sidecar in sidecars {
        let _ = writeln!(out, "  - {sidecar}");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Workflow Inputs ({})", stats.workflow_inputs.len());
    let _ = writeln!(out, "{rule}");
    for input in &stats.workflow_inputs {
        let _ = writeln!(out, "  - {input}");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Workflow Outputs ({})", stats.workflow_outputs.len());
    let _ = writeln!(out, "{rule}");
    for output in &stats.workflow_outputs {
        let _ = writeln!(out, "  - {output}");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Usage");
    let _ = writeln!(out, "{rule}");
    for artifact in artifacts {
        match artifact.format {
            OutputFormat::Engine => {
                let _ = writeln!(out, "Execute with HyperFlow:");
                let _ = writeln!(out, "  hflow run {}", artifact.file_name);
            }
            OutputFormat::Interchange => {
                let _ = writeln!(out, "WfFormat JSON for workflow research and analysis");
                let _ = writeln!(out, "  Compatible with WfCommons tools and benchmarks");
            }
            OutputFormat::Legacy => {
                let _ = writeln!(out, "YAML workflow (legacy format)");
            }
        }
        let _ = writeln!(out);
    }
    out
}
