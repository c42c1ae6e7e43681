//! Emitter Registry
//!
//! Lookup of workflow emitters by format name, and enumeration of the
//! registered formats for `mosaicflow formats`.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Artifact, Emitter, EmitterError, EmitterResult};
use crate::engine::EngineEmitter;
use crate::interchange::InterchangeEmitter;
use crate::legacy::LegacyEmitter;
use mosaicflow_core::{OutputFormat, ResolvedWorkflow};

/// Registry for workflow emitters.
///
/// # Example
///
/// ```ignore
/// use mosaicflow_formats::emitter::EmitterRegistry;
///
/// let registry = EmitterRegistry::with_defaults();
/// let emitter = registry.get("wfformat").unwrap();
/// let json = emitter.emit(&resolved)?;
/// ```
#[derive(Default)]
pub struct EmitterRegistry {
    emitters: HashMap<&'static str, Arc<dyn Emitter>>,
}

impl EmitterRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            emitters: HashMap::new(),
        }
    }

    /// Registry holding the legacy, engine and interchange emitters.
    #[must_use]
    pub fn with_defaults() -> Self {
        EmitterRegistryBuilder::new()
            .with_emitter(LegacyEmitter::new())
            .with_emitter(EngineEmitter::new())
            .with_emitter(InterchangeEmitter::new())
            .build()
    }

    /// Register an emitter.
    ///
    /// The emitter's `format_name()` is used as the key.
    /// If an emitter with the same name already exists, it is replaced.
    pub fn register(&mut self, emitter: impl Emitter + 'static) {
        let name = emitter.format_name();
        self.emitters.insert(name, Arc::new(emitter));
    }

    /// Get an emitter by format name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Emitter>> {
        self.emitters.get(name).cloned()
    }

    /// Get the emitter for a format.
    ///
    /// # Errors
    /// Returns `EmitterError::UnknownFormat` if nothing is registered for it
    pub fn for_format(&self, format: OutputFormat) -> EmitterResult<Arc<dyn Emitter>> {
        self.lookup(format.name())
    }

    /// Check if an emitter is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.emitters.contains_key(name)
    }

    /// Get all registered format names.
    #[must_use]
    pub fn formats(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.emitters.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered emitters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    /// Emit using a specific format.
    ///
    /// # Errors
    /// Returns error if the format is not found or emission fails.
    pub fn emit(&self, format: &str, workflow: &ResolvedWorkflow) -> EmitterResult<String> {
        let emitter = self.lookup(format)?;
        emitter.validate(workflow)?;
        emitter.emit(workflow)
    }

    /// Compile using a specific format, sidecars included.
    ///
    /// # Errors
    /// Returns error if the format is not found or compilation fails.
    pub fn compile(&self, format: &str, workflow: &ResolvedWorkflow) -> EmitterResult<Artifact> {
        self.lookup(format)?.compile(workflow)
    }

    fn lookup(&self, format: &str) -> EmitterResult<Arc<dyn Emitter>> {
        self.get(format).ok_or_else(|| EmitterError::UnknownFormat {
            name: format.to_string(),
            available: self.formats().join(", "),
        })
    }
}

/// Information about a registered emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterInfo {
    /// Format name (CLI flag value).
    pub format: &'static str,
    /// File extension.
    pub extension: &'static str,
    /// Primary artifact file name.
    pub artifact: &'static str,
    /// Human-readable description.
    pub description: &'static str,
}

impl EmitterInfo {
    /// Create emitter info from an emitter.
    #[must_use]
    pub fn from_emitter(emitter: &dyn Emitter) -> Self {
        Self {
            format: emitter.format_name(),
            extension: emitter.file_extension(),
            artifact: emitter.artifact_name(),
            description: emitter.description(),
        }
    }
}

impl EmitterRegistry {
    /// Get information about all registered emitters.
    #[must_use]
    pub fn info(&self) -> Vec<EmitterInfo> {
        let mut infos: Vec<_> = self
            .emitters
            .values()
            .map(|e| EmitterInfo::from_emitter(e.as_ref()))
            .collect();
        infos.sort_by_key(|i| i.format);
        infos
    }
}

/// Builder for creating an emitter registry.
#[derive(Default)]
pub struct EmitterRegistryBuilder {
    registry: EmitterRegistry,
}

impl EmitterRegistryBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an emitter.
    #[must_use]
    pub fn with_emitter(mut self, emitter: impl Emitter + 'static) -> Self {
        self.registry.register(emitter);
        self
    }

    /// Build the registry.
    #[must_use]
    pub fn build(self) -> EmitterRegistry {
        self.registry
    }
}
