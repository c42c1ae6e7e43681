//! Command implementations.
//!
//! Commands never print. They return the text destined for stdout together
//! with an [`Outcome`]; `main` does the printing and picks the exit code.

pub mod compile;
pub mod formats;
pub mod generate;
pub mod stats;
pub mod surveys;
pub mod validate;

use crate::cli::Commands;
use crate::config::Config;
use mosaicflow_core::{OutputFormat, ResolvedWorkflow};
use mosaicflow_formats::{EmitterRegistry, EngineEmitter, read_path};
use std::path::Path;

/// Exit code for success
pub const EXIT_OK: i32 = 0;
/// Exit code for a command error
pub const EXIT_ERROR: i32 = 1;
/// Exit code for a workflow that fails validation
pub const EXIT_INVALID: i32 = 2;

/// How a command finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything went as asked
    Success,
    /// The checked workflow is invalid
    Invalid,
}

impl Outcome {
    /// Process exit code
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => EXIT_OK,
            Self::Invalid => EXIT_INVALID,
        }
    }
}

/// Text for stdout plus the outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Text to print
    pub text: String,
    /// Outcome
    pub outcome: Outcome,
}

impl Output {
    /// Successful output
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            outcome: Outcome::Success,
        }
    }
}

/// Run one command
pub fn execute(command: Commands, config: &Config) -> miette::Result<Output> {
    match command {
        Commands::Generate {
            center,
            degrees,
            bands,
            catalogs,
            formats,
            output,
            name,
            data_dir,
            no_size_estimates,
        } => generate::execute(
            &generate::GenerateArgs {
                center,
                degrees,
                bands,
                catalogs,
                formats,
                output,
                name,
                data_dir,
                estimate_sizes: !no_size_estimates,
            },
            config,
        ),
        Commands::Compile {
            input,
            from,
            to,
            output,
        } => compile::execute(&input, from, to, output.as_deref(), config),
        Commands::Validate {
            file,
            format,
            strict,
            json,
        } => validate::execute(&file, format, strict, json),
        Commands::Stats { file, format, json } => stats::execute(&file, format, json),
        Commands::Formats => Ok(formats::execute(config)),
        Commands::Surveys { json } => surveys::execute(json),
    }
}

/// Default emitters, with the engine function taken from configuration
pub fn registry(config: &Config) -> EmitterRegistry {
    let mut registry = EmitterRegistry::with_defaults();
    registry.register(EngineEmitter::new().with_function(config.engine_function.clone()));
    registry
}

/// Read and resolve a workflow artifact
pub fn load(path: &Path, format: Option<OutputFormat>) -> miette::Result<(OutputFormat, ResolvedWorkflow)> {
    let (format, raw) = read_path(path, format)?;
    let workflow = raw.into_workflow()?;
    let resolved = ResolvedWorkflow::resolve(workflow)?;
    tracing::debug!(
        path = %path.display(),
        format = %format,
        tasks = resolved.workflow().tasks().len(),
        "Loaded workflow"
    );
    Ok((format, resolved))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Outcome::Success.exit_code(), 0);
        assert_eq!(Outcome::Invalid.exit_code(), 2);
    }

    #[test]
    fn test_registry_uses_configured_function() {
        let config = Config {
            engine_function: "command".to_string(),
            ..Config::default()
        };
        let registry = registry(&config);
        assert_eq!(registry.len(), 3);
        assert!(registry.has("hyperflow"));
    }
}
