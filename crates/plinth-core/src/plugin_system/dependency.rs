use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::plugin_system::version::VersionRange;

/// Represents a dependency on another plugin
#[derive(Debug, Clone, Serialize)]
pub struct PluginDependency {
    /// The name of the required plugin
    pub plugin_name: String,

    /// The version range that is acceptable; `None` accepts any version
    pub version_range: Option<VersionRange>,
}

impl PluginDependency {
    /// Create a new dependency with a specific version range
    pub fn new(plugin_name: &str, version_range: VersionRange) -> Self {
        Self {
            plugin_name: plugin_name.to_string(),
            version_range: Some(version_range),
        }
    }

    /// Create a new dependency accepting any version
    pub fn any(plugin_name: &str) -> Self {
        Self {
            plugin_name: plugin_name.to_string(),
            version_range: None,
        }
    }

    /// Check if this dependency is compatible with the given plugin version string
    pub fn is_compatible_with(&self, version_str: &str) -> bool {
        match &self.version_range {
            Some(range) => match semver::Version::parse(version_str) {
                Ok(v) => range.includes(&v),
                Err(_) => {
                    log::warn!(
                        "Could not parse version string '{}' for compatibility check with plugin '{}'",
                        version_str,
                        self.plugin_name
                    );
                    false
                }
            },
            // No version range means any version is acceptable
            None => true,
        }
    }
}

impl fmt::Display for PluginDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version_range {
            Some(range) => write!(
                f,
                "Requires plugin: {} (version: {})",
                self.plugin_name,
                range.constraint_string()
            ),
            None => write!(f, "Requires plugin: {} (any version)", self.plugin_name),
        }
    }
}

/// A dependency on an external runtime module.
///
/// Validated for presence through the host's [`RuntimeProbe`] at graph
/// admission; never a node in the plugin graph.
///
/// [`RuntimeProbe`]: crate::plugin_system::graph::RuntimeProbe
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeDependency {
    /// The external runtime module name
    pub module: String,

    /// The version range that is acceptable; `None` accepts any version
    pub version_range: Option<VersionRange>,
}

impl RuntimeDependency {
    /// Create a new runtime dependency with a specific version range
    pub fn new(module: &str, version_range: VersionRange) -> Self {
        Self {
            module: module.to_string(),
            version_range: Some(version_range),
        }
    }

    /// Create a new runtime dependency accepting any version
    pub fn any(module: &str) -> Self {
        Self {
            module: module.to_string(),
            version_range: None,
        }
    }

    /// Check whether the resolved module version satisfies this dependency
    pub fn is_satisfied_by(&self, version_str: &str) -> bool {
        match &self.version_range {
            Some(range) => match semver::Version::parse(version_str) {
                Ok(v) => range.includes(&v),
                Err(_) => false,
            },
            None => true,
        }
    }
}

impl fmt::Display for RuntimeDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version_range {
            Some(range) => write!(
                f,
                "Requires runtime module: {} (version: {})",
                self.module,
                range.constraint_string()
            ),
            None => write!(f, "Requires runtime module: {} (any version)", self.module),
        }
    }
}

/// Error that can occur when resolving dependencies
#[derive(Debug, Error)]
pub enum DependencyError {
    /// The required plugin was not found among active plugins
    #[error("Required plugin not found: {0}")]
    MissingPlugin(String),

    /// The plugin was found, but the version is incompatible
    #[error("Plugin version mismatch: '{plugin_name}' requires version '{required_range}' but found '{actual_version}'")]
    IncompatibleVersion {
        plugin_name: String,
        required_range: VersionRange,
        actual_version: String,
    },

    /// A required external runtime module is absent
    #[error("Required runtime module not found: {0}")]
    MissingRuntime(String),

    /// Dependency cycle detected
    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    /// Other dependency resolution error
    #[error("Dependency error: {0}")]
    Other(String),
}
