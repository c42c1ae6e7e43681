//! Mosaic requests and band specifications.

use crate::{Error, Result, surveys};
use mosaicflow_core::{Coordinates, GenerationParams, OutputFormat};
use std::fmt;
use std::str::FromStr;

/// Colour channel a band contributes to.
pub const RED: &str = "red";
/// Green channel
pub const GREEN: &str = "green";
/// Blue channel
pub const BLUE: &str = "blue";

/// One survey band, parsed from `survey:band:color`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandSpec {
    /// Archive survey, e.g. `2mass`
    pub survey: String,
    /// Band within the survey, e.g. `j`
    pub band: String,
    /// Colour channel, e.g. `red`
    pub color: String,
}

impl FromStr for BandSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [survey, band, color]
                if !survey.is_empty() && !band.is_empty() && !color.is_empty() =>
            {
                Ok(Self {
                    survey: (*survey).to_string(),
                    band: (*band).to_string(),
                    color: (*color).to_string(),
                })
            }
            _ => Err(Error::InvalidBand {
                spec: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for BandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.survey, self.band, self.color)
    }
}

/// What to build a mosaic of.
#[derive(Debug, Clone, PartialEq)]
pub struct MosaicRequest {
    /// Workflow name
    pub name: String,
    /// Center as given by the user
    pub center: String,
    /// Side of the mosaic in degrees
    pub degrees: f64,
    /// Bands, in request order
    pub bands: Vec<BandSpec>,
    /// Formats the workflow is destined for
    pub formats: Vec<OutputFormat>,
}

impl MosaicRequest {
    /// Request with no formats recorded.
    pub fn new(
        name: impl Into<String>,
        center: impl Into<String>,
        degrees: f64,
        bands: Vec<BandSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            center: center.into(),
            degrees,
            bands,
            formats: Vec::new(),
        }
    }

    /// Record the output formats in the generation parameters.
    #[must_use]
    pub fn with_formats(mut self, formats: Vec<OutputFormat>) -> Self {
        self.formats = formats;
        self
    }

    /// Resolved center.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedCenter`] for anything but two decimal
    /// numbers; object names need an external name resolver.
    pub fn coordinates(&self) -> Result<Coordinates> {
        Coordinates::parse(&self.center).ok_or_else(|| Error::UnresolvedCenter {
            center: self.center.clone(),
        })
    }

    /// Generation parameters recorded on the planned workflow.
    ///
    /// # Errors
    ///
    /// Fails on an unresolvable center, a band no supported survey offers,
    /// an empty band list or degrees outside `(0, 10]`.
    pub fn params(&self) -> Result<GenerationParams> {
        for band in &self.bands {
            surveys::check_band(&band.survey, &band.band)?;
        }
        let params = GenerationParams {
            center: self.center.clone(),
            coordinates: Some(self.coordinates()?),
            degrees: self.degrees,
            bands: self.bands.iter().map(ToString::to_string).collect(),
            formats: self.formats.clone(),
        };
        params.validate()?;
        Ok(params)
    }
}
