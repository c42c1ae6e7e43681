//! Generation parameters and execution metadata.

use crate::{Error, OutputFormat, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Largest mosaic extent accepted, in degrees.
pub const MAX_DEGREES: f64 = 10.0;

/// Sky position in decimal degrees (J2000).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Right ascension
    pub ra: f64,
    /// Declination
    pub dec: f64,
}

impl Coordinates {
    /// Parse `"<ra> <dec>"` in decimal degrees.
    ///
    /// Returns `None` for anything that is not two numbers, such as an
    /// object name that would need an external resolver.
    #[must_use]
    pub fn parse(center: &str) -> Option<Self> {
        let mut parts = center.split_whitespace();
        let ra = parts.next()?.parse::<f64>().ok()?;
        let dec = parts.next()?.parse::<f64>().ok()?;
        if parts.next().is_some() || !ra.is_finite() || !dec.is_finite() {
            return None;
        }
        Some(Self { ra, dec })
    }
}

/// The request a workflow was generated from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    /// Object name or coordinate string as given
    pub center: String,
    /// Resolved coordinates, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Angular extent of the mosaic
    pub degrees: f64,
    /// Band specifications, e.g. `dss:DSS2B:blue`
    pub bands: Vec<String>,
    /// Formats requested for this generation
    #[serde(default)]
    pub formats: Vec<OutputFormat>,
}

impl GenerationParams {
    /// Check ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameters`] for an empty band list or an
    /// extent outside `(0, 10]` degrees.
    pub fn validate(&self) -> Result<()> {
        if !(self.degrees > 0.0 && self.degrees <= MAX_DEGREES) {
            return Err(Error::invalid_parameters(format!(
                "degrees must be in (0, {MAX_DEGREES}], got {}",
                self.degrees
            )));
        }
        if self.bands.is_empty() {
            return Err(Error::invalid_parameters("at least one band is required"));
        }
        Ok(())
    }
}

/// Execution data carried only by formats with an execution block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetadata {
    /// Total wall-clock span, when measured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub makespan_seconds: Option<f64>,
    /// Measured runtime per task name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub task_runtimes: BTreeMap<String, f64>,
    /// When the workflow ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
}
