//! `mosaicflow generate`

use super::{Output, registry};
use crate::config::Config;
use crate::errors::CliError;
use mosaicflow_core::{OutputFormat, ResolvedWorkflow};
use mosaicflow_formats::{Delivery, GenerationReport, Orchestrator};
use mosaicflow_montage::{BandCatalog, BandSpec, MosaicRequest, Planner};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Flags of the generate command
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub center: String,
    pub degrees: f64,
    pub bands: Vec<String>,
    pub catalogs: Vec<PathBuf>,
    pub formats: Vec<OutputFormat>,
    pub output: Option<PathBuf>,
    pub name: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub estimate_sizes: bool,
}

/// Plan the mosaic and write every requested format
pub fn execute(args: &GenerateArgs, config: &Config) -> miette::Result<Output> {
    if args.catalogs.len() != args.bands.len() {
        return Err(CliError::invalid_argument(
            "--catalog",
            format!(
                "expected one catalog per band ({} bands, {} catalogs)",
                args.bands.len(),
                args.catalogs.len()
            ),
        )
        .into());
    }

    let bands = args
        .bands
        .iter()
        .map(|spec| spec.parse::<BandSpec>())
        .collect::<Result<Vec<_>, _>>()?;
    let formats = if args.formats.is_empty() {
        config.default_formats.clone()
    } else {
        args.formats.clone()
    };
    let request = MosaicRequest::new(
        args.name.clone().unwrap_or_else(|| config.workflow_name.clone()),
        args.center.clone(),
        args.degrees,
        bands,
    )
    .with_formats(formats.clone());

    let catalogs = args
        .catalogs
        .iter()
        .map(|path| BandCatalog::from_path(path))
        .collect::<Result<Vec<_>, _>>()?;

    let data_dir = args.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());
    let data_dir = std::path::absolute(&data_dir)
        .map_err(|e| CliError::file_error("resolve data directory", &data_dir, e))?;
    let planner =
        Planner::new(data_dir).with_size_estimates(args.estimate_sizes && config.estimate_sizes);
    let workflow = ResolvedWorkflow::resolve(planner.plan(&request, &catalogs)?)?;

    let base_dir = args.output.clone().unwrap_or_else(|| config.output_dir.clone());
    let report = Orchestrator::new(registry(config), base_dir).generate(&workflow, &formats)?;

    for (format, error) in report.failed() {
        tracing::warn!(format = %format, error = %error, "Format was not generated");
    }
    if report.succeeded().next().is_none() {
        return Err(CliError::GenerationFailed.into());
    }
    Ok(Output::success(render(&report)))
}

fn render(report: &GenerationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Workflow directory: {}", report.output_dir.display());
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(Delivery::Stored { path, summary }) => {
                let _ = writeln!(
                    out,
                    "  {:10} {} ({} bytes, sha256 {})",
                    outcome.format.name(),
                    path.display(),
                    summary.bytes,
                    summary.sha256
                );
            }
            Ok(Delivery::Inline { content }) => {
                let _ = writeln!(
                    out,
                    "  {:10} {} ({} bytes)",
                    outcome.format.name(),
                    outcome.format.artifact_name(),
                    content.len()
                );
            }
            Err(error) => {
                let _ = writeln!(out, "  {:10} FAILED: {error}", outcome.format.name());
            }
        }
    }
    for sidecar in &report.sidecars {
        if let Some(name) = sidecar.file_name() {
            let _ = writeln!(out, "  {:10} {}", "auxiliary", name.to_string_lossy());
        }
    }
    if let Some(summary) = &report.summary {
        let _ = writeln!(out, "Summary: {}", summary.display());
    }
    out
}
