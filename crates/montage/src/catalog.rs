//! Per-band image catalogs.
//!
//! A catalog is what the archive search and overlap tools report for one
//! band: the raw images covering the region, the pairs of images that
//! overlap, and optionally the names of the background-corrected images.
//!
//! ```json
//! {
//!   "images": [{"file": "2mass-atlas-990502s-j1420186.fits.gz", "url": "https://...", "sizeBytes": 2110080}],
//!   "overlaps": [{"plus": "a.fits", "minus": "b.fits", "diff": "diff.000000.000001.fits"}],
//!   "corrected": ["ca.fits", "cb.fits"]
//! }
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One raw image found by the archive search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogImage {
    /// File name as listed by the archive, possibly compressed
    pub file: String,
    /// Where to fetch it from
    pub url: String,
    /// Size reported by the archive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl CatalogImage {
    /// File name with everything from `.fits` on stripped.
    #[must_use]
    pub fn base_name(&self) -> &str {
        strip_fits(&self.file)
    }
}

/// A pair of overlapping images and the name of their difference image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlap {
    /// Image added in the difference
    pub plus: String,
    /// Image subtracted in the difference
    pub minus: String,
    /// Difference image name, e.g. `diff.000000.000001.fits`
    pub diff: String,
}

impl Overlap {
    /// Difference name without the `diff.` marker and `.fits` suffix.
    #[must_use]
    pub fn base_name(&self) -> String {
        strip_fits(&self.diff).replace("diff.", "")
    }
}

/// Everything the planner needs to know about one band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCatalog {
    /// Raw images, in archive order
    pub images: Vec<CatalogImage>,
    /// Overlapping image pairs
    #[serde(default)]
    pub overlaps: Vec<Overlap>,
    /// Corrected image names; derived from `images` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected: Option<Vec<String>>,
}

impl BandCatalog {
    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Catalog`] on malformed JSON.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|source| Error::Catalog { path: None, source })
    }

    /// Read a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Catalog`] if it is not a catalog.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::Catalog {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// Base names of the background-corrected images.
    #[must_use]
    pub fn corrected_bases(&self) -> Vec<String> {
        match &self.corrected {
            Some(files) => files
                .iter()
                .map(|file| strip_fits(file).replace("diff.", ""))
                .collect(),
            None => self
                .images
                .iter()
                .map(|image| format!("c{}", image.base_name()))
                .collect(),
        }
    }
}

fn strip_fits(name: &str) -> &str {
    name.find(".fits").map_or(name, |at| &name[..at])
}
