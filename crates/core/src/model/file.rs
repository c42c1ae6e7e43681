//! Files flowing between tasks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a file comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locality {
    /// Produced or kept within this workflow
    Local,
    /// Must be staged from outside before execution
    Remote,
}

impl fmt::Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// A data artifact with a unique path-like name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Unique logical name
    pub name: String,
    /// Locality tag
    pub locality: Locality,
    /// Size estimate, required by the interchange schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Where an entry file can be fetched from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl File {
    /// A file produced within the workflow.
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locality: Locality::Local,
            size_bytes: None,
            source_url: None,
        }
    }

    /// A file staged in from `url`.
    pub fn remote(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locality: Locality::Remote,
            size_bytes: None,
            source_url: Some(url.into()),
        }
    }

    /// Attach a size estimate.
    #[must_use]
    pub fn with_size(mut self, bytes: u64) -> Self {
        self.size_bytes = Some(bytes);
        self
    }

    /// Attach a source location without changing locality.
    #[must_use]
    pub fn with_source(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}
