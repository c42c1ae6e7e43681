//! Legacy Workflow Schema Types
//!
//! The flat, hand-editable YAML listing. Files are a map keyed by name whose
//! key order is the declaration order; there is no dependency section.

use serde::{Deserialize, Serialize};

/// A legacy workflow document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyDocument {
    /// Workflow name
    pub name: String,

    /// Files keyed by name, in declaration order
    #[serde(with = "ordered_map", default)]
    pub files: Vec<(String, LegacyFile)>,

    /// Tasks in insertion order
    #[serde(default)]
    pub tasks: Vec<LegacyTask>,

    /// Entry files that carry a source location
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Produced files nobody consumes
    #[serde(default)]
    pub outputs: Vec<String>,
}

/// One file entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyFile {
    /// File name, repeated from the map key
    pub name: String,

    /// Where the file is fetched from
    #[serde(default)]
    pub source: Option<String>,

    /// No task produces it
    #[serde(default)]
    pub is_input: bool,

    /// Some task produces it
    #[serde(default)]
    pub is_output: bool,

    /// `local` or `remote`; absent in older documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,

    /// Size estimate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_in_bytes: Option<u64>,
}

/// One task entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyTask {
    /// Task name
    pub name: String,

    /// Executable name
    pub executable: String,

    /// Argument list
    #[serde(default)]
    pub arguments: Vec<String>,

    /// Input file names
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Output file names
    #[serde(default)]
    pub outputs: Vec<String>,
}

/// (De)serialize a `Vec<(K, V)>` as a map, keeping entry order.
mod ordered_map {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    pub fn serialize<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = Vec<(String, V)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of file entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry()? {
                    entries.push((key, value));
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}
