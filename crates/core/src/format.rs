//! Output format identities.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The serialized schemas a workflow can be compiled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Flat human-editable YAML listing
    #[serde(rename = "yaml")]
    Legacy,
    /// HyperFlow-style job graph with explicit edges
    #[serde(rename = "hyperflow")]
    Engine,
    /// WfFormat community interchange schema
    #[serde(rename = "wfformat")]
    Interchange,
}

impl OutputFormat {
    /// All formats in a fixed order.
    pub const ALL: [Self; 3] = [Self::Legacy, Self::Engine, Self::Interchange];

    /// Wire name used on the command line and in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Legacy => "yaml",
            Self::Engine => "hyperflow",
            Self::Interchange => "wfformat",
        }
    }

    /// File name of the primary artifact inside an output directory.
    #[must_use]
    pub const fn artifact_name(self) -> &'static str {
        match self {
            Self::Legacy => "workflow.yml",
            Self::Engine => "workflow.json",
            Self::Interchange => "workflow-wfformat.json",
        }
    }

    /// Extension of the primary artifact.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Legacy => "yml",
            Self::Engine | Self::Interchange => "json",
        }
    }

    /// Guess the format of an artifact from its path and content.
    ///
    /// JSON documents with a top-level `schemaVersion` key are interchange
    /// documents, those with a top-level `processes` key are engine
    /// documents. Anything else is treated as legacy YAML.
    #[must_use]
    pub fn detect(path: Option<&std::path::Path>, content: &str) -> Self {
        let is_yaml_path = path
            .and_then(|p| p.extension())
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"));
        if is_yaml_path {
            return Self::Legacy;
        }

        match serde_json::from_str::<TopLevelKeys>(content) {
            Ok(keys) if keys.schema_version.is_some() => Self::Interchange,
            Ok(keys) if keys.processes.is_some() => Self::Engine,
            _ => Self::Legacy,
        }
    }
}

#[derive(Deserialize)]
struct TopLevelKeys {
    #[serde(rename = "schemaVersion")]
    schema_version: Option<IgnoredAny>,
    processes: Option<IgnoredAny>,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" | "legacy" => Ok(Self::Legacy),
            "hyperflow" | "engine" => Ok(Self::Engine),
            "wfformat" | "interchange" => Ok(Self::Interchange),
            other => Err(format!(
                "unknown format '{other}' (expected one of: yaml, hyperflow, wfformat)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("legacy".parse::<OutputFormat>(), Ok(OutputFormat::Legacy));
        assert_eq!("HyperFlow".parse::<OutputFormat>(), Ok(OutputFormat::Engine));
        assert_eq!(
            "interchange".parse::<OutputFormat>(),
            Ok(OutputFormat::Interchange)
        );
        assert!("pegasus".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_names_round_trip() {
        for format in OutputFormat::ALL {
            assert_eq!(format.name().parse::<OutputFormat>(), Ok(format));
        }
    }

    #[test]
    fn test_detect() {
        assert_eq!(
            OutputFormat::detect(Some(Path::new("w.yml")), "{\"processes\": []}"),
            OutputFormat::Legacy
        );
        assert_eq!(
            OutputFormat::detect(None, "{\n  \"schemaVersion\": \"1.5\"\n}"),
            OutputFormat::Interchange
        );
        assert_eq!(
            OutputFormat::detect(None, "{\"processes\": []}"),
            OutputFormat::Engine
        );
        assert_eq!(OutputFormat::detect(None, "name: x\n"), OutputFormat::Legacy);
    }

    #[test]
    fn test_detect_ignores_nested_keys() {
        let engine_with_nested_version = r#"{
  "name": "w",
  "processes": [{"name": "p", "config": {"schemaVersion": "x"}}]
}"#;
        assert_eq!(
            OutputFormat::detect(None, engine_with_nested_version),
            OutputFormat::Engine
        );
        assert_eq!(
            OutputFormat::detect(None, r#"{"name": "\"processes\""}"#),
            OutputFormat::Legacy
        );
    }
}
