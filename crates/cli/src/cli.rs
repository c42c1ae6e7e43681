use crate::tracing::{LogLevel, TracingFormat};
use clap::{Parser, Subcommand};
use mosaicflow_core::OutputFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mosaicflow")]
#[command(about = "Generate, convert and validate Montage mosaic workflows")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    #[arg(long, global = true, help = "Configuration file")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Plan a mosaic and write it in one or more formats")]
    Generate {
        #[arg(long, help = "Mosaic center as decimal degrees, e.g. \"275.196 -16.171\"")]
        center: String,
        #[arg(long, help = "Side of the mosaic in degrees")]
        degrees: f64,
        #[arg(
            long = "band",
            required = true,
            help = "Band as survey:band:color (repeatable)"
        )]
        bands: Vec<String>,
        #[arg(
            long = "catalog",
            required = true,
            help = "Image catalog JSON, one per --band in the same order"
        )]
        catalogs: Vec<PathBuf>,
        #[arg(
            long = "format",
            short = 'f',
            help = "Output format: yaml, hyperflow or wfformat (repeatable)"
        )]
        formats: Vec<OutputFormat>,
        #[arg(
            long,
            short = 'o',
            env = "MOSAICFLOW_OUTPUT_DIR",
            help = "Base directory for the generated workflow directory"
        )]
        output: Option<PathBuf>,
        #[arg(long, help = "Workflow name")]
        name: Option<String>,
        #[arg(long, help = "Directory holding the local tables and headers")]
        data_dir: Option<PathBuf>,
        #[arg(long, help = "Leave unknown file sizes unset")]
        no_size_estimates: bool,
    },
    #[command(about = "Convert a workflow artifact to another format")]
    Compile {
        #[arg(help = "Workflow artifact to read")]
        input: PathBuf,
        #[arg(long, help = "Input format (detected when omitted)")]
        from: Option<OutputFormat>,
        #[arg(long, help = "Target format")]
        to: OutputFormat,
        #[arg(long, short = 'o', help = "Write the result to this file")]
        output: Option<PathBuf>,
    },
    #[command(about = "Check a workflow artifact for structural errors")]
    Validate {
        #[arg(help = "Workflow artifact to check")]
        file: PathBuf,
        #[arg(long, help = "Artifact format (detected when omitted)")]
        format: Option<OutputFormat>,
        #[arg(long, help = "Treat warnings as failures")]
        strict: bool,
        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },
    #[command(about = "Print statistics about a workflow artifact")]
    Stats {
        #[arg(help = "Workflow artifact to analyze")]
        file: PathBuf,
        #[arg(long, help = "Artifact format (detected when omitted)")]
        format: Option<OutputFormat>,
        #[arg(long, help = "Print the statistics as JSON")]
        json: bool,
    },
    #[command(about = "List the available output formats")]
    Formats,
    #[command(about = "List the supported surveys and their bands")]
    Surveys {
        #[arg(long, help = "Print the surveys as JSON")]
        json: bool,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
