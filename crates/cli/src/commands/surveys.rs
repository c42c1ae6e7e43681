//! `mosaicflow surveys`

use super::Output;
use mosaicflow_montage::surveys::{COLOR_CHANNELS, SURVEYS};
use std::fmt::Write as _;

/// Supported surveys, their bands and the colour mapping
pub fn execute(json: bool) -> miette::Result<Output> {
    if json {
        let mut text = serde_json::to_string_pretty(SURVEYS)
            .map_err(|e| miette::miette!("Failed to serialize surveys: {e}"))?;
        text.push('\n');
        return Ok(Output::success(text));
    }

    let mut out = String::from("Supported surveys:\n\n");
    for survey in SURVEYS {
        let _ = writeln!(out, "{}: {}", survey.name, survey.title);
        let _ = writeln!(out, "  {}", survey.description);
        for band in survey.bands {
            let _ = writeln!(out, "    - {}: {}", band.name, band.description);
        }
        let _ = writeln!(out, "  Example: {}\n", survey.example);
    }
    out.push_str("Colors (third part of --band):\n");
    for (color, meaning) in COLOR_CHANNELS {
        let _ = writeln!(out, "  {color:6} {meaning}");
    }
    Ok(Output::success(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Outcome;

    #[test]
    fn test_lists_surveys_and_bands() {
        let output = execute(false).unwrap();
        assert_eq!(output.outcome, Outcome::Success);
        assert!(output.text.contains("2MASS: Two Micron All-Sky Survey\n"));
        assert!(output.text.contains("    - DSS2IR: DSS2 Infrared (I-band)\n"));
        assert!(output.text.contains("  Example: sdss:g:green\n"));
        assert!(output.text.contains("  blue   Blue channel in final color image\n"));
    }

    #[test]
    fn test_json_listing() {
        let output = execute(true).unwrap();
        let surveys: serde_json::Value = serde_json::from_str(&output.text).unwrap();
        assert_eq!(surveys.as_array().map(Vec::len), Some(3));
        assert_eq!(surveys[2]["name"], "SDSS");
        assert_eq!(surveys[2]["bands"][4]["name"], "z");
    }
}
