//! Plugin sources - where the registry finds installable plugins

use std::fmt;
use std::sync::Arc;

use crate::application::errors::PluginError;
use super::trait_def::PluginEntry;

/// Function that builds a plugin entry on demand
pub type Resolver = Arc<dyn Fn() -> Result<PluginEntry, PluginError> + Send + Sync>;

/// One installable plugin: a name plus a way to resolve it
#[derive(Clone)]
pub struct SourceEntry {
    pub name: String,
    /// Identifier of the unit the plugin lives in
    pub module: String,
    resolver: Resolver,
}

impl SourceEntry {
    pub fn new<F>(name: impl Into<String>, module: impl Into<String>, resolver: F) -> Self
    where
        F: Fn() -> Result<PluginEntry, PluginError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            module: module.into(),
            resolver: Arc::new(resolver),
        }
    }

    pub fn resolve(&self) -> Result<PluginEntry, PluginError> {
        (self.resolver)()
    }
}

impl fmt::Debug for SourceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceEntry")
            .field("name", &self.name)
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}

/// Source of plugins the registry loads from
pub trait PluginSource: Send + Sync {
    /// All installable plugins, in discovery order
    fn entries(&self) -> Vec<SourceEntry>;

    /// Module identifier a named plugin lives in
    fn locate(&self, name: &str) -> Option<String>;

    /// Resolve a named plugin again, returning a fresh object
    fn refresh(&self, name: &str) -> Result<PluginEntry, PluginError>;
}

/// In-process plugin source backed by factory functions
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    entries: Vec<SourceEntry>,
}

impl CatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin living in its own module
    pub fn with<F>(self, name: &str, factory: F) -> Self
    where
        F: Fn() -> Result<PluginEntry, PluginError> + Send + Sync + 'static,
    {
        let module = format!("catalog::{}", name);
        self.with_entry(SourceEntry::new(name, module, factory))
    }

    pub fn with_entry(mut self, entry: SourceEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, name: &str) -> Option<&SourceEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

impl PluginSource for CatalogSource {
    fn entries(&self) -> Vec<SourceEntry> {
        self.entries.clone()
    }

    fn locate(&self, name: &str) -> Option<String> {
        self.find(name).map(|e| e.module.clone())
    }

    fn refresh(&self, name: &str) -> Result<PluginEntry, PluginError> {
        let entry = self
            .find(name)
            .ok_or_else(|| PluginError::Resolve(format!("no source entry for '{}'", name)))?;

        tracing::debug!(plugin = %name, module = %entry.module, "Refreshing plugin");
        entry.resolve()
    }
}
