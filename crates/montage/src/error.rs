//! Error types for mosaic planning.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a mosaic request into a workflow.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A band specification is not `survey:band:color`.
    #[error("Invalid band '{spec}': expected survey:band:color")]
    #[diagnostic(
        code(mosaicflow::montage::invalid_band),
        help("For example: dss:DSS2B:blue or 2mass:j:red")
    )]
    InvalidBand {
        /// The rejected specification
        spec: String,
    },

    /// The survey is not in the catalog.
    #[error("Unknown survey '{survey}' (known: {known})")]
    #[diagnostic(
        code(mosaicflow::montage::unknown_survey),
        help("Run `mosaicflow surveys` to list the supported surveys")
    )]
    UnknownSurvey {
        /// Survey as given
        survey: String,
        /// Supported survey names
        known: String,
    },

    /// The survey has no such band.
    #[error("Survey {survey} has no band '{band}' (bands: {known})")]
    #[diagnostic(
        code(mosaicflow::montage::unknown_survey_band),
        help("Run `mosaicflow surveys` to list each survey's bands")
    )]
    UnknownSurveyBand {
        /// Survey name
        survey: String,
        /// Band as given
        band: String,
        /// Bands the survey offers
        known: String,
    },

    /// The center is not a coordinate pair.
    #[error("Cannot resolve center '{center}' to coordinates")]
    #[diagnostic(
        code(mosaicflow::montage::unresolved_center),
        help("Give the center as decimal degrees, e.g. \"275.196 -16.171\"")
    )]
    UnresolvedCenter {
        /// The center as given
        center: String,
    },

    /// Catalogs and bands do not line up.
    #[error("Expected {expected} band catalog(s), got {found}")]
    #[diagnostic(
        code(mosaicflow::montage::catalog_count),
        help("Pass one catalog per --band, in the same order")
    )]
    CatalogCount {
        /// Number of bands requested
        expected: usize,
        /// Number of catalogs supplied
        found: usize,
    },

    /// A catalog document is malformed.
    #[error("Invalid band catalog{}: {source}", .path.as_ref().map(|p| format!(" '{}'", p.display())).unwrap_or_default())]
    #[diagnostic(code(mosaicflow::montage::catalog))]
    Catalog {
        /// Where the catalog was read from
        path: Option<PathBuf>,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },

    /// A catalog file could not be read.
    #[error("Failed to read band catalog '{}': {source}", .path.display())]
    #[diagnostic(code(mosaicflow::montage::io))]
    Io {
        /// Catalog path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The planned workflow violates an IR rule.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Workflow(#[from] mosaicflow_core::Error),
}

/// Result type for planning operations
pub type Result<T> = std::result::Result<T, Error>;
