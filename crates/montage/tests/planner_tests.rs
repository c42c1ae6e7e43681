//! Planned workflows compile to every format and validate cleanly.

use mosaicflow_core::{OutputFormat, ResolvedWorkflow};
use mosaicflow_formats::{EmitterRegistry, Orchestrator, validate_document, validate_workflow};
use mosaicflow_montage::{BandCatalog, MosaicRequest, Planner};
use tempfile::TempDir;

const CATALOG: &str = r#"{
  "images": [
    {"file": "2mass-atlas-990502s-j1420186.fits.gz", "url": "https://irsa.ipac.caltech.edu/2mass/j1420186.fits.gz", "sizeBytes": 2110080},
    {"file": "2mass-atlas-990502s-j1420198.fits.gz", "url": "https://irsa.ipac.caltech.edu/2mass/j1420198.fits.gz", "sizeBytes": 2110080},
    {"file": "2mass-atlas-990502s-j1430080.fits.gz", "url": "https://irsa.ipac.caltech.edu/2mass/j1430080.fits.gz"}
  ],
  "overlaps": [
    {"plus": "2mass-atlas-990502s-j1420186.fits", "minus": "2mass-atlas-990502s-j1420198.fits", "diff": "diff.000000.000001.fits"},
    {"plus": "2mass-atlas-990502s-j1420198.fits", "minus": "2mass-atlas-990502s-j1430080.fits", "diff": "diff.000001.000002.fits"}
  ]
}"#;

fn planned() -> ResolvedWorkflow {
    let request = MosaicRequest::new(
        "montage",
        "56.5 23.75",
        0.2,
        vec!["2mass:j:red".parse().unwrap()],
    )
    .with_formats(OutputFormat::ALL.to_vec());
    let catalog = BandCatalog::from_json(CATALOG).unwrap();
    let workflow = Planner::new("/srv/montage/data")
        .plan(&request, &[catalog])
        .unwrap();
    ResolvedWorkflow::resolve(workflow).unwrap()
}

#[test]
fn test_planned_workflow_is_valid() {
    let resolved = planned();
    let report = validate_workflow(resolved.workflow());
    assert!(report.is_valid(), "{report}");
    assert!(report.warnings.is_empty(), "{report}");
    // 3 mProject, 2 mDiffFit, mConcatFit, mBgModel, 3 mBackground, mImgtbl, mAdd, mViewer
    assert_eq!(resolved.workflow().tasks().len(), 13);
}

#[test]
fn test_planned_workflow_compiles_everywhere() {
    let resolved = planned();
    let registry = EmitterRegistry::with_defaults();
    for format in OutputFormat::ALL {
        let artifact = registry.compile(format.name(), &resolved).unwrap();
        let report = validate_document(format, &artifact.content).unwrap();
        assert!(report.is_valid(), "{format}: {report}");
    }
}

#[test]
fn test_generate_writes_replica_catalog() {
    let tmp = TempDir::new().unwrap();
    let report = Orchestrator::new(EmitterRegistry::with_defaults(), tmp.path())
        .generate(&planned(), &OutputFormat::ALL)
        .unwrap();
    assert!(report.is_complete());

    let rc = std::fs::read_to_string(report.output_dir.join("rc.txt")).unwrap();
    assert!(rc.starts_with(
        "region.hdr \"file:///srv/montage/data/region.hdr\"  pool=\"local\"\n"
    ));
    assert!(rc.contains(
        "2mass-atlas-990502s-j1420186.fits \"https://irsa.ipac.caltech.edu/2mass/j1420186.fits.gz\"  pool=\"ipac\"\n"
    ));
}
