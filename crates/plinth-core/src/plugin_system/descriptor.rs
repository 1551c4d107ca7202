use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::plugin_system::dependency::{PluginDependency, RuntimeDependency};
use crate::plugin_system::error::PluginSystemError;

/// Snapshot of one discoverable plugin module.
///
/// The name is fixed at construction; `active` and `installed` are only
/// mutated by the lifecycle orchestrator during a resolution run.
#[derive(Debug, Clone, Serialize)]
pub struct PluginDescriptor {
    name: String,

    /// Declared semantic version of this plugin
    pub version: String,

    /// Filesystem location the plugin was discovered at
    pub path: PathBuf,

    /// Whether this plugin enters the next resolution run
    pub active: bool,

    /// Whether the install hook has already completed for this plugin
    pub installed: bool,

    /// Tie-break ordering value; lower weight loads first among
    /// dependency-unconstrained plugins
    pub weight: i64,

    /// Declared dependencies on other plugins, in declaration order
    pub plugin_dependencies: Vec<PluginDependency>,

    /// Declared external runtime modules, in declaration order
    pub external_dependencies: Vec<RuntimeDependency>,
}

impl PluginDescriptor {
    /// Create a descriptor with default flags: active, not yet installed.
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            path: PathBuf::new(),
            active: true,
            installed: false,
            weight: 0,
            plugin_dependencies: Vec::new(),
            external_dependencies: Vec::new(),
        }
    }

    /// The unique plugin name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the filesystem location
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Set the ordering weight
    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    /// Declare a dependency on another plugin
    pub fn with_dependency(mut self, dependency: PluginDependency) -> Self {
        self.plugin_dependencies.push(dependency);
        self
    }

    /// Declare a dependency on an external runtime module
    pub fn with_external_dependency(mut self, dependency: RuntimeDependency) -> Self {
        self.external_dependencies.push(dependency);
        self
    }
}

/// In-memory collection of discovered plugin descriptors.
///
/// Iteration follows admission order, which downstream components rely on for
/// deterministic diagnostics and DFS root selection. Descriptors are
/// read-only snapshots to every component except the orchestrator, which is
/// the sole writer of `installed` transitions.
#[derive(Debug, Default)]
pub struct DescriptorStore {
    descriptors: Vec<PluginDescriptor>,
    index: HashMap<String, usize>,
}

impl DescriptorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a descriptor. Names are unique within a store.
    pub fn insert(&mut self, descriptor: PluginDescriptor) -> Result<(), PluginSystemError> {
        if self.index.contains_key(descriptor.name()) {
            return Err(PluginSystemError::RegistrationError {
                plugin: descriptor.name().to_string(),
                message: "a plugin with this name is already registered".to_string(),
            });
        }
        self.index.insert(descriptor.name().to_string(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Lookup by name
    pub fn get(&self, name: &str) -> Option<&PluginDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    /// Whether a descriptor with this name is present
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All descriptors, in admission order
    pub fn iter(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.descriptors.iter()
    }

    /// The active descriptors, in admission order
    pub fn active(&self) -> Vec<&PluginDescriptor> {
        self.descriptors.iter().filter(|d| d.active).collect()
    }

    /// Number of descriptors in the store
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the store holds no descriptors
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Flip the active flag ahead of the next resolution run.
    /// Returns false when no such plugin exists.
    pub fn set_active(&mut self, name: &str, active: bool) -> bool {
        match self.index.get(name) {
            Some(&i) => {
                self.descriptors[i].active = active;
                true
            }
            None => false,
        }
    }

    /// Apply a freshly parsed manifest descriptor. For a known plugin the
    /// host-controlled fields (active, installed, weight, path) are
    /// overridden, keeping the admission slot; the module's own
    /// declarations — version and dependency lists — stay authoritative.
    /// An unknown name is admitted as-is.
    pub fn merge(&mut self, descriptor: PluginDescriptor) -> Result<(), PluginSystemError> {
        match self.index.get(descriptor.name()) {
            Some(&i) => {
                let existing = &mut self.descriptors[i];
                existing.active = descriptor.active;
                existing.installed = descriptor.installed;
                existing.weight = descriptor.weight;
                if !descriptor.path.as_os_str().is_empty() {
                    existing.path = descriptor.path;
                }
                Ok(())
            }
            None => self.insert(descriptor),
        }
    }

    /// Record a completed install. Orchestrator-only.
    pub(crate) fn mark_installed(&mut self, name: &str) -> bool {
        match self.index.get(name) {
            Some(&i) => {
                self.descriptors[i].installed = true;
                true
            }
            None => false,
        }
    }
}
