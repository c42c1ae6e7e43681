//! Montage mosaic planning for mosaicflow.
//!
//! Turns a [`MosaicRequest`] plus one [`BandCatalog`] per band into a
//! populated [`Workflow`](mosaicflow_core::Workflow). Archive queries and
//! overlap detection happen outside this crate; their results arrive as
//! catalogs.
//!
//! ```ignore
//! use mosaicflow_montage::{BandCatalog, MosaicRequest, Planner};
//!
//! let request = MosaicRequest::new("montage", "275.196 -16.171", 0.5, vec!["2mass:j:red".parse()?]);
//! let catalog = BandCatalog::from_path(Path::new("data/1-catalog.json"))?;
//! let workflow = Planner::new("data").plan(&request, &[catalog])?;
//! ```

pub mod catalog;
pub mod error;
pub mod estimate;
pub mod planner;
pub mod request;
pub mod surveys;

pub use catalog::{BandCatalog, CatalogImage, Overlap};
pub use error::{Error, Result};
pub use estimate::estimate_size;
pub use planner::Planner;
pub use request::{BandSpec, MosaicRequest};
pub use surveys::{SURVEYS, Survey, SurveyBand};
