//! # Plinth Core Plugin System Errors
//!
//! Defines error types specific to the plinth plugin system.
//!
//! [`PluginSystemError`] is the primary enum covering manifest parsing,
//! descriptor registration, and dependency resolution failures. Hook-level
//! failures (install/load) are not errors at this level: the orchestrator
//! recovers from them locally by excluding the plugin and its transitive
//! dependents; only a dependency cycle aborts a whole resolution run.
use std::path::PathBuf;

use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin manifest error for '{path}': {message}")]
    ManifestError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Plugin registration error for '{plugin}': {message}")]
    RegistrationError {
        plugin: String,
        message: String,
    },

    #[error("Dependency resolution failed: {0}")]
    DependencyResolution(#[from] DependencyError),

    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] VersionError),

    #[error("Internal plugin system error: {0}")]
    InternalError(String),
}
