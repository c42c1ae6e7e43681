//! `mosaicflow validate`

use super::{Outcome, Output};
use crate::errors::CliError;
use mosaicflow_core::OutputFormat;
use mosaicflow_formats::validate_document;
use std::path::Path;

/// Validate one artifact
pub fn execute(
    file: &Path,
    format: Option<OutputFormat>,
    strict: bool,
    json: bool,
) -> miette::Result<Output> {
    let content =
        std::fs::read_to_string(file).map_err(|e| CliError::file_error("read", file, e))?;
    let format = format.unwrap_or_else(|| OutputFormat::detect(Some(file), &content));
    let report = validate_document(format, &content)?;

    tracing::info!(
        file = %file.display(),
        format = %format,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "Validated workflow"
    );

    let text = if json {
        let mut text = serde_json::to_string_pretty(&report)
            .map_err(|e| miette::miette!("Failed to serialize report: {e}"))?;
        text.push('\n');
        text
    } else {
        report.to_string()
    };
    let outcome = if report.passes(strict) {
        Outcome::Success
    } else {
        Outcome::Invalid
    };
    Ok(Output { text, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const UNUSED_FILE: &str = "\
name: w
files:
  a.fits: {name: a.fits, source: 'https://x/a.fits', is_input: true}
  b.fits: {name: b.fits}
  stray.fits: {name: stray.fits, source: 'https://x/stray.fits', is_input: true}
tasks:
- {name: t, executable: mAdd, inputs: [a.fits], outputs: [b.fits]}
";

    const UNDECLARED: &str = "\
name: w
files:
  a.fits: {name: a.fits, source: 'https://x/a.fits'}
tasks:
- {name: t, executable: mAdd, inputs: [a.fits, ghost.fits], outputs: []}
";

    fn write(tmp: &TempDir, content: &str) -> std::path::PathBuf {
        let path = tmp.path().join("w.yml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_warnings_pass_unless_strict() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, UNUSED_FILE);

        let lenient = execute(&path, None, false, false).unwrap();
        assert_eq!(lenient.outcome, Outcome::Success);
        assert!(lenient.text.contains("VALIDATION PASSED"));
        assert!(lenient.text.contains("stray.fits"));

        let strict = execute(&path, None, true, false).unwrap();
        assert_eq!(strict.outcome, Outcome::Invalid);
    }

    #[test]
    fn test_errors_fail() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, UNDECLARED);
        let output = execute(&path, None, false, false).unwrap();
        assert_eq!(output.outcome, Outcome::Invalid);
        assert!(output.text.contains("VALIDATION FAILED"));
        assert!(output.text.contains("ghost.fits"));
    }

    #[test]
    fn test_json_report() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, UNDECLARED);
        let output = execute(&path, Some(OutputFormat::Legacy), false, true).unwrap();
        let report: serde_json::Value = serde_json::from_str(&output.text).unwrap();
        assert_eq!(report["errors"][0]["kind"], "undeclaredFile");
        assert_eq!(report["errors"][0]["file"], "ghost.fits");
    }
}
