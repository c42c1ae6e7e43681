//! Mosaic pipeline planning.
//!
//! Each band becomes the standard Montage chain:
//!
//! ```text
//! mProject (per image) -> mDiffFit (per overlap) -> mConcatFit -> mBgModel
//!     -> mBackground (per image) -> mImgtbl -> mAdd -> mViewer
//! ```
//!
//! When red, green and blue bands are all present, a final mViewer task
//! combines the three mosaics into a colour preview.

use crate::catalog::BandCatalog;
use crate::estimate::estimate_size;
use crate::request::{BLUE, BandSpec, GREEN, MosaicRequest, RED};
use crate::{Error, Result};
use mosaicflow_core::{File, Task, Workflow, WorkflowBuilder};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Region header used by the final co-addition
pub const REGION_HEADER: &str = "region.hdr";
/// Enlarged region header used for projection and fitting
pub const OVERSIZED_REGION_HEADER: &str = "region-oversized.hdr";
/// Colour preview produced from three bands
pub const COLOR_PREVIEW: &str = "mosaic-color.png";

/// Turns mosaic requests into workflows.
#[derive(Debug, Clone)]
pub struct Planner {
    data_dir: PathBuf,
    estimate_sizes: bool,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new("data")
    }
}

impl Planner {
    /// Planner whose local tables and headers live in `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            estimate_sizes: true,
        }
    }

    /// Whether unknown file sizes get extension-based estimates.
    #[must_use]
    pub const fn with_size_estimates(mut self, enabled: bool) -> Self {
        self.estimate_sizes = enabled;
        self
    }

    /// `file://` URL of a file in the data directory.
    #[must_use]
    pub fn file_url(&self, name: &str) -> String {
        format!("file://{}", self.data_dir.join(name).display())
    }

    /// Plan the workflow for `request`, one catalog per band in order.
    ///
    /// # Errors
    ///
    /// - [`Error::UnresolvedCenter`] / [`Error::Workflow`] for bad parameters
    /// - [`Error::CatalogCount`] if catalogs and bands differ in number
    /// - [`Error::Workflow`] if two bands would produce the same file
    pub fn plan(&self, request: &MosaicRequest, catalogs: &[BandCatalog]) -> Result<Workflow> {
        let params = request.params()?;
        if catalogs.len() != request.bands.len() {
            return Err(Error::CatalogCount {
                expected: request.bands.len(),
                found: catalogs.len(),
            });
        }

        let mut builder = WorkflowBuilder::new(&request.name);
        builder.params(params);
        let mut plan = Plan {
            planner: self,
            builder,
            sequence: 0,
        };

        plan.sourced(REGION_HEADER);
        plan.sourced(OVERSIZED_REGION_HEADER);

        let mut channels: HashMap<&str, usize> = HashMap::new();
        for (index, (band, catalog)) in request.bands.iter().zip(catalogs).enumerate() {
            let band_id = index + 1;
            plan.add_band(band_id, band, catalog)?;
            channels.insert(band.color.as_str(), band_id);
        }

        if let (Some(&red), Some(&green), Some(&blue)) =
            (channels.get(RED), channels.get(GREEN), channels.get(BLUE))
        {
            plan.add_color_preview(red, green, blue)?;
        }

        let tasks = plan.builder.task_count();
        let workflow = plan.builder.build();
        info!(
            workflow = %workflow.name(),
            bands = request.bands.len(),
            tasks,
            files = workflow.files().len(),
            "Planned mosaic workflow"
        );
        Ok(workflow)
    }
}

struct Plan<'a> {
    planner: &'a Planner,
    builder: WorkflowBuilder,
    sequence: usize,
}

impl Plan<'_> {
    fn declare(&mut self, mut file: File) {
        if self.planner.estimate_sizes && file.size_bytes.is_none() {
            file.size_bytes = Some(estimate_size(&file.name));
        }
        self.builder.add_file(file);
    }

    /// A file shipped in the data directory.
    fn sourced(&mut self, name: &str) -> String {
        let url = self.planner.file_url(name);
        self.declare(File::local(name).with_source(url));
        name.to_string()
    }

    /// A file produced inside the workflow.
    fn local(&mut self, name: String) -> String {
        self.declare(File::local(name.clone()));
        name
    }

    fn task(
        &mut self,
        executable: &str,
        args: Vec<String>,
        inputs: Vec<String>,
        outputs: Vec<String>,
    ) -> Result<()> {
        for name in inputs.iter().chain(&outputs) {
            if !self.builder.has_file(name) {
                self.declare(File::local(name.clone()));
            }
        }
        self.sequence += 1;
        let mut task = Task::new(format!("{executable}_{:06}", self.sequence), executable).args(args);
        task.inputs = inputs;
        task.outputs = outputs;
        self.builder.add_task(task)?;
        Ok(())
    }

    fn add_band(&mut self, band_id: usize, band: &BandSpec, catalog: &BandCatalog) -> Result<()> {
        debug!(
            band = band_id,
            spec = %band,
            images = catalog.images.len(),
            overlaps = catalog.overlaps.len(),
            "Adding band"
        );
        let header = OVERSIZED_REGION_HEADER.to_string();

        let images_tbl = self.sourced(&format!("{band_id}-images.tbl"));
        let projected_tbl = self.sourced(&format!("{band_id}-projected.tbl"));
        let corrected_tbl = self.sourced(&format!("{band_id}-corrected.tbl"));
        let stat_tbl = self.sourced(&format!("{band_id}-stat.tbl"));

        for image in &catalog.images {
            let base = image.base_name();
            let raw = format!("{base}.fits");
            let mut file = File::remote(raw.clone(), image.url.clone());
            file.size_bytes = image.size_bytes;
            self.declare(file);

            let projected = self.local(format!("p{base}.fits"));
            let area = self.local(format!("p{base}_area.fits"));
            self.task(
                "mProject",
                vec!["-X".into(), raw.clone(), projected.clone(), header.clone()],
                vec![header.clone(), raw],
                vec![projected, area],
            )?;
        }

        let mut fits = Vec::with_capacity(catalog.overlaps.len());
        for overlap in &catalog.overlaps {
            let base = overlap.base_name();
            let plus = format!("p{}", overlap.plus);
            let minus = format!("p{}", overlap.minus);
            let fit = self.local(format!("{band_id}-fit.{base}.txt"));
            let diff = format!("{band_id}-diff.{base}.fits");
            self.task(
                "mDiffFit",
                vec![
                    "-d".into(),
                    "-s".into(),
                    fit.clone(),
                    plus.clone(),
                    minus.clone(),
                    diff,
                    header.clone(),
                ],
                vec![
                    plus.clone(),
                    plus.replace(".fits", "_area.fits"),
                    minus.clone(),
                    minus.replace(".fits", "_area.fits"),
                    header.clone(),
                ],
                vec![fit.clone()],
            )?;
            fits.push(fit);
        }

        let fits_tbl = self.local(format!("{band_id}-fits.tbl"));
        let mut inputs = vec![stat_tbl.clone()];
        inputs.extend(fits);
        self.task(
            "mConcatFit",
            vec![stat_tbl, fits_tbl.clone(), ".".into()],
            inputs,
            vec![fits_tbl.clone()],
        )?;

        let corrections_tbl = self.local(format!("{band_id}-corrections.tbl"));
        self.task(
            "mBgModel",
            vec![
                "-i".into(),
                "100000".into(),
                images_tbl.clone(),
                fits_tbl.clone(),
                corrections_tbl.clone(),
            ],
            vec![images_tbl, fits_tbl],
            vec![corrections_tbl.clone()],
        )?;

        for image in &catalog.images {
            let base = image.base_name();
            let projected = format!("p{base}.fits");
            let corrected = self.local(format!("c{base}.fits"));
            let corrected_area = self.local(format!("c{base}_area.fits"));
            self.task(
                "mBackground",
                vec![
                    "-t".into(),
                    projected.clone(),
                    corrected.clone(),
                    projected_tbl.clone(),
                    corrections_tbl.clone(),
                ],
                vec![
                    projected,
                    format!("p{base}_area.fits"),
                    projected_tbl.clone(),
                    corrections_tbl.clone(),
                ],
                vec![corrected, corrected_area],
            )?;
        }

        let corrected_bases = catalog.corrected_bases();
        let updated_tbl = self.local(format!("{band_id}-updated-corrected.tbl"));
        let mut inputs = vec![corrected_tbl.clone()];
        inputs.extend(corrected_bases.iter().map(|base| format!("{base}.fits")));
        self.task(
            "mImgtbl",
            vec![".".into(), "-t".into(), corrected_tbl, updated_tbl.clone()],
            inputs,
            vec![updated_tbl.clone()],
        )?;

        let mosaic = self.local(format!("{band_id}-mosaic.fits"));
        let mosaic_area = self.local(format!("{band_id}-mosaic_area.fits"));
        let mut inputs = vec![updated_tbl.clone(), REGION_HEADER.to_string()];
        for base in &corrected_bases {
            inputs.push(format!("{base}.fits"));
            inputs.push(format!("{base}_area.fits"));
        }
        self.task(
            "mAdd",
            vec![
                "-e".into(),
                updated_tbl,
                REGION_HEADER.into(),
                mosaic.clone(),
            ],
            inputs,
            vec![mosaic.clone(), mosaic_area],
        )?;

        let preview = self.local(format!("{band_id}-mosaic.png"));
        self.task(
            "mViewer",
            vec![
                "-ct".into(),
                "1".into(),
                "-gray".into(),
                mosaic.clone(),
                "-1s".into(),
                "max".into(),
                "gaussian".into(),
                "-png".into(),
                preview.clone(),
            ],
            vec![mosaic],
            vec![preview],
        )
    }

    fn add_color_preview(&mut self, red: usize, green: usize, blue: usize) -> Result<()> {
        debug!(red, green, blue, "Adding colour preview");
        let preview = self.local(COLOR_PREVIEW.to_string());
        let mut args = Vec::new();
        let mut inputs = Vec::new();
        for (flag, band_id) in [("-red", red), ("-green", green), ("-blue", blue)] {
            let mosaic = format!("{band_id}-mosaic.fits");
            args.extend([
                flag.to_string(),
                mosaic.clone(),
                "-0.5s".to_string(),
                "max".to_string(),
                "gaussian-log".to_string(),
            ]);
            inputs.push(mosaic);
        }
        args.extend(["-png".to_string(), preview.clone()]);
        self.task("mViewer", args, inputs, vec![preview])
    }
}
