//! `mosaicflow formats`

use super::{Output, registry};
use crate::config::Config;
use std::fmt::Write as _;

/// Table of registered output formats
pub fn execute(config: &Config) -> Output {
    let infos = registry(config).info();
    let mut out = String::from("Available formats:\n");
    for info in &infos {
        let _ = writeln!(
            out,
            "  {:10} {:24} {}",
            info.format, info.artifact, info.description
        );
    }
    let defaults: Vec<&str> = config.default_formats.iter().map(|f| f.name()).collect();
    let _ = writeln!(out, "\nDefault: {}", defaults.join(", "));
    Output::success(out)
}
