//! `mosaicflow stats`

use super::{Output, load};
use mosaicflow_core::{OutputFormat, WorkflowStats};
use std::path::Path;

/// Summarize one artifact
pub fn execute(file: &Path, format: Option<OutputFormat>, json: bool) -> miette::Result<Output> {
    let (_, workflow) = load(file, format)?;
    let stats = WorkflowStats::of_resolved(&workflow);
    if json {
        let mut text = serde_json::to_string_pretty(&stats)
            .map_err(|e| miette::miette!("Failed to serialize statistics: {e}"))?;
        text.push('\n');
        return Ok(Output::success(text));
    }
    Ok(Output::success(stats.to_string()))
}
