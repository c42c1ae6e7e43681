//! Format-independent auxiliary files.
//!
//! The region headers describe the mosaic footprint; `rc.txt` maps every
//! sourced entry file to where it is fetched from. All of them are derived
//! from the workflow alone, so every emitter yields identical bytes.

use mosaicflow_core::{Coordinates, Workflow};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write as _;

/// Header for the final mosaic footprint
pub const REGION_HEADER: &str = "region.hdr";

/// Header padded for reprojection
pub const OVERSIZED_REGION_HEADER: &str = "region-oversized.hdr";

/// Input-location table
pub const REPLICA_CATALOG: &str = "rc.txt";

/// Degrees per pixel
pub const CDELT: f64 = 0.000_277_778;

/// Pixels added on each axis of the oversized header
const OVERSIZE_PIXELS: u64 = 3000;

/// An auxiliary file written next to the primary artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidecarFile {
    /// File name inside the output directory
    pub name: String,
    /// File content
    pub content: String,
}

impl SidecarFile {
    /// Create a sidecar.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A TAN-projected region of the sky.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionHeader {
    /// Center right ascension and declination
    pub center: Coordinates,
    /// Side length in degrees
    pub degrees: f64,
}

impl RegionHeader {
    /// Pixels per axis.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn naxis(&self) -> u64 {
        (self.degrees / CDELT + 0.5) as u64
    }

    /// Render the header, optionally with the oversize padding.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn render(&self, oversized: bool) -> String {
        let naxis = self.naxis();
        let crpix = (naxis as f64 + 1.0) / 2.0;
        let (naxis, crpix) = if oversized {
            (naxis + OVERSIZE_PIXELS, crpix + (OVERSIZE_PIXELS / 2) as f64)
        } else {
            (naxis, crpix)
        };

        let mut out = String::new();
        let _ = writeln!(out, "SIMPLE  = T");
        let _ = writeln!(out, "BITPIX  = -64");
        let _ = writeln!(out, "NAXIS   = 2");
        let _ = writeln!(out, "NAXIS1  = {naxis}");
        let _ = writeln!(out, "NAXIS2  = {naxis}");
        let _ = writeln!(out, "CTYPE1  = 'RA---TAN'");
        let _ = writeln!(out, "CTYPE2  = 'DEC--TAN'");
        let _ = writeln!(out, "CRVAL1  = {:.6}", self.center.ra);
        let _ = writeln!(out, "CRVAL2  = {:.6}", self.center.dec);
        let _ = writeln!(out, "CRPIX1  = {crpix:.6}");
        let _ = writeln!(out, "CRPIX2  = {crpix:.6}");
        let _ = writeln!(out, "CDELT1  = {:.9}", -CDELT);
        let _ = writeln!(out, "CDELT2  = {CDELT:.9}");
        let _ = writeln!(out, "CROTA2  = {:.6}", 0.0);
        let _ = writeln!(out, "EQUINOX = 2000");
        let _ = writeln!(out, "END");
        out
    }
}

/// Site label for a source URL.
#[must_use]
pub fn site_label(url: &str) -> &'static str {
    if url.starts_with("file://") {
        "local"
    } else if url.contains("irsa.ipac.caltech.edu") || url.contains("montage.ipac.caltech.edu") {
        "ipac"
    } else {
        "remote"
    }
}

/// Render the input-location table: one line per sourced entry file.
#[must_use]
pub fn replica_catalog(workflow: &Workflow) -> String {
    let produced: HashSet<&str> = workflow
        .tasks()
        .iter()
        .flat_map(|t| t.outputs.iter().map(String::as_str))
        .collect();

    let mut out = String::new();
    for file in workflow.files() {
        if produced.contains(file.name.as_str()) {
            continue;
        }
        if let Some(url) = &file.source_url {
            let _ = writeln!(out, "{} \"{url}\"  pool=\"{}\"", file.name, site_label(url));
        }
    }
    out
}

/// The sidecars every emitter writes.
///
/// Region headers need known coordinates; the table is written whenever
/// some entry file carries a source.
#[must_use]
pub fn standard_sidecars(workflow: &Workflow) -> Vec<SidecarFile> {
    let mut sidecars = Vec::new();
    let params = workflow.params();
    if let Some(center) = params.coordinates {
        let header = RegionHeader {
            center,
            degrees: params.degrees,
        };
        sidecars.push(SidecarFile::new(REGION_HEADER, header.render(false)));
        sidecars.push(SidecarFile::new(OVERSIZED_REGION_HEADER, header.render(true)));
    }
    let catalog = replica_catalog(workflow);
    if !catalog.is_empty() {
        sidecars.push(SidecarFile::new(REPLICA_CATALOG, catalog));
    }
    sidecars
}
