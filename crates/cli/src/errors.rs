//! CLI-specific error types with miette diagnostics

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the command layer itself
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Configuration file could not be parsed
    #[error("Invalid configuration in '{}'", .path.display())]
    #[diagnostic(
        code(mosaicflow::cli::config),
        help("Keys are camelCase: outputDir, workflowName, defaultFormats, dataDir, engineFunction, estimateSizes")
    )]
    Config {
        /// Configuration file
        path: PathBuf,
        /// Parse error
        #[source]
        source: toml::de::Error,
    },

    /// Invalid command line argument
    #[error("Invalid argument {argument}: {message}")]
    #[diagnostic(
        code(mosaicflow::cli::invalid_argument),
        help("Run 'mosaicflow --help' to see available options")
    )]
    InvalidArgument {
        /// Offending flag
        argument: String,
        /// What is wrong with it
        message: String,
    },

    /// File operation failed
    #[error("Failed to {operation} '{}'", .path.display())]
    #[diagnostic(
        code(mosaicflow::cli::file_error),
        help("Check file permissions and ensure the path exists")
    )]
    FileError {
        /// What was being done
        operation: String,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Every requested format failed to compile
    #[error("No workflow format could be generated")]
    #[diagnostic(code(mosaicflow::cli::generation_failed))]
    GenerationFailed,
}

impl CliError {
    /// Wrap a filesystem error
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileError {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Reject a flag value
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }
}
