//! `mosaicflow compile`

use super::{Output, load, registry};
use crate::config::Config;
use crate::errors::CliError;
use mosaicflow_core::OutputFormat;
use mosaicflow_formats::output::{self, ArtifactSummary, Delivery};
use std::path::Path;

/// Convert `input` to `to`.
///
/// With `-o` the artifact is always written to that file. Without it, small
/// artifacts go to stdout and large ones are stored under the configured
/// output directory.
pub fn execute(
    input: &Path,
    from: Option<OutputFormat>,
    to: OutputFormat,
    output: Option<&Path>,
    config: &Config,
) -> miette::Result<Output> {
    let (source, workflow) = load(input, from)?;
    let artifact = registry(config).compile(to.name(), &workflow)?;
    tracing::info!(from = %source, to = %to, bytes = artifact.size(), "Compiled workflow");

    if let Some(target) = output {
        let dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = target
            .file_name()
            .ok_or_else(|| CliError::invalid_argument("--output", "expected a file path"))?
            .to_string_lossy();
        let path = output::write_atomic(dir, &name, &artifact.content)
            .map_err(|e| CliError::file_error("write", target, e))?;
        let summary = ArtifactSummary::of(&artifact, &workflow);
        return Ok(Output::success(describe_stored(&path, &summary)));
    }

    match output::deliver(artifact, &workflow, &config.output_dir)? {
        Delivery::Inline { content } => Ok(Output::success(content)),
        Delivery::Stored { path, summary } => Ok(Output::success(describe_stored(&path, &summary))),
    }
}

fn describe_stored(path: &Path, summary: &ArtifactSummary) -> String {
    format!(
        "Wrote {} workflow to {}\n  tasks:  {}\n  files:  {}\n  edges:  {}\n  bytes:  {}\n  sha256: {}\n",
        summary.format,
        path.display(),
        summary.tasks,
        summary.files,
        summary.edges,
        summary.bytes,
        summary.sha256
    )
}
