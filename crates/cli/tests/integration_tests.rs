//! Integration tests for the mosaicflow CLI
//!
//! These run the built binary inside a scratch directory so that neither a
//! local `mosaicflow.toml` nor the user's configuration leaks in.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const CATALOG: &str = r#"{
  "images": [
    {"file": "a.fits", "url": "https://irsa.ipac.caltech.edu/a.fits", "sizeBytes": 1000},
    {"file": "b.fits", "url": "https://irsa.ipac.caltech.edu/b.fits", "sizeBytes": 1000}
  ],
  "overlaps": [{"plus": "a.fits", "minus": "b.fits", "diff": "diff.000000.000001.fits"}]
}"#;

const BROKEN: &str = "\
name: broken
files:
  a.fits: {name: a.fits, source: 'https://x/a.fits', is_input: true}
tasks:
- {name: t, executable: mAdd, inputs: [a.fits, ghost.fits], outputs: []}
";

/// Run the binary in `dir`, returning stdout, stderr and the exit code
fn run_mosaicflow(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_mosaicflow"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("MOSAICFLOW_OUTPUT_DIR")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn mosaicflow");
    (
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
        output.status.code().unwrap_or(-1),
    )
}

#[test]
fn test_formats_command() {
    let tmp = TempDir::new().unwrap();
    let (stdout, _stderr, code) = run_mosaicflow(tmp.path(), &["formats"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("yaml"));
    assert!(stdout.contains("hyperflow"));
    assert!(stdout.contains("wfformat"));
}

#[test]
fn test_surveys_command() {
    let tmp = TempDir::new().unwrap();
    let (stdout, _stderr, code) = run_mosaicflow(tmp.path(), &["surveys"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("2MASS"));
    assert!(stdout.contains("DSS2B"));
    assert!(stdout.contains("SDSS"));
}

#[test]
fn test_generate_rejects_unknown_band() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("j.json"), CATALOG).unwrap();
    let (_stdout, stderr, code) = run_mosaicflow(
        tmp.path(),
        &[
            "generate", "--center", "56.5 23.75", "--degrees", "0.5", "--band", "2mass:x:red",
            "--catalog", "j.json", "-o", "out",
        ],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("no band 'x'"), "{stderr}");
    assert!(!tmp.path().join("out").exists());
}

#[test]
fn test_generate_then_validate_and_convert() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("j.json"), CATALOG).unwrap();

    let (stdout, stderr, code) = run_mosaicflow(
        tmp.path(),
        &[
            "generate",
            "--center",
            "56.5 23.75",
            "--degrees",
            "0.5",
            "--band",
            "2mass:j:red",
            "--catalog",
            "j.json",
            "-f",
            "yaml",
            "-o",
            "out",
        ],
    );
    assert_eq!(code, 0, "generate failed: {stderr}");
    assert!(stdout.contains("Workflow directory:"));

    let dir = std::fs::read_dir(tmp.path().join("out"))
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    let legacy = dir.join("workflow.yml");
    assert!(legacy.is_file());
    let legacy = legacy.to_string_lossy().into_owned();

    let (stdout, _stderr, code) = run_mosaicflow(tmp.path(), &["validate", &legacy]);
    assert_eq!(code, 0);
    assert!(stdout.contains("VALIDATION PASSED"));

    let (stdout, _stderr, code) =
        run_mosaicflow(tmp.path(), &["compile", &legacy, "--to", "hyperflow"]);
    assert_eq!(code, 0);
    let document: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(document["processes"].as_array().is_some_and(|p| !p.is_empty()));

    let (stdout, _stderr, code) = run_mosaicflow(tmp.path(), &["stats", &legacy, "--json"]);
    assert_eq!(code, 0);
    let stats: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(stats["totalTasks"].as_u64().is_some_and(|n| n > 0));
}

#[test]
fn test_invalid_workflow_exit_code() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("broken.yml"), BROKEN).unwrap();
    let (stdout, _stderr, code) = run_mosaicflow(tmp.path(), &["validate", "broken.yml"]);
    assert_eq!(code, 2);
    assert!(stdout.contains("ghost.fits"));
}

#[test]
fn test_missing_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let (stdout, stderr, code) = run_mosaicflow(tmp.path(), &["stats", "nope.yml"]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(!stderr.is_empty());
}

#[test]
fn test_bad_local_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("mosaicflow.toml"), "bogusKey = 1\n").unwrap();
    let (_stdout, stderr, code) = run_mosaicflow(tmp.path(), &["formats"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("mosaicflow.toml"));
}
