//! Plugin manifest parsing and discovery.
//!
//! Each plugin directory carries a `plugin.json` describing the module:
//!
//! ```json
//! {
//!     "version": "1.2.0",
//!     "active": true,
//!     "weight": 10,
//!     "pluginDependencies": { "core-logging": "^0.1" },
//!     "externalDependencies": { "image-magick": "~7.1" }
//! }
//! ```
//!
//! The plugin name is derived from the directory name. Dependency maps keep
//! their declaration order for diagnostics.
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::fs;

use crate::plugin_system::dependency::{PluginDependency, RuntimeDependency};
use crate::plugin_system::descriptor::PluginDescriptor;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::version::VersionRange;

/// Manifest file name expected inside every plugin directory
pub const MANIFEST_FILE: &str = "plugin.json";

fn default_active() -> bool {
    true
}

/// Intermediate struct for deserialization; converted into a validated
/// [`PluginDescriptor`] after version ranges parse.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawManifest {
    /// Optional; when present it must match the directory name.
    #[serde(default)]
    name: Option<String>,
    version: String,
    #[serde(default = "default_active")]
    active: bool,
    #[serde(default)]
    installed: bool,
    #[serde(default)]
    weight: i64,
    #[serde(default)]
    plugin_dependencies: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    external_dependencies: serde_json::Map<String, serde_json::Value>,
}

fn manifest_error(path: &Path, message: String) -> PluginSystemError {
    PluginSystemError::ManifestError {
        path: path.to_path_buf(),
        message,
        source: None,
    }
}

/// Parses one dependency map entry: a range string, or `"*"` / `null` for
/// any version.
fn parse_range_entry(
    path: &Path,
    name: &str,
    value: &serde_json::Value,
) -> Result<Option<VersionRange>, PluginSystemError> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) if s == "*" || s.is_empty() => Ok(None),
        serde_json::Value::String(s) => VersionRange::from_constraint(s).map(Some).map_err(|e| {
            manifest_error(
                path,
                format!("invalid version range '{}' for dependency '{}': {}", s, name, e),
            )
        }),
        other => Err(manifest_error(
            path,
            format!("dependency '{}' must map to a version range string, got {}", name, other),
        )),
    }
}

/// Load a plugin manifest from `dir/plugin.json` asynchronously.
///
/// The descriptor's name is the directory name; a `name` field in the
/// manifest, if present, must agree with it.
pub async fn load_manifest(dir: &Path) -> Result<PluginDescriptor, PluginSystemError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let content = fs::read_to_string(&manifest_path).await.map_err(|e| {
        PluginSystemError::ManifestError {
            path: manifest_path.clone(),
            message: format!("failed to read manifest: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    let raw: RawManifest =
        serde_json::from_str(&content).map_err(|e| PluginSystemError::ManifestError {
            path: manifest_path.clone(),
            message: format!("failed to parse manifest JSON: {}", e),
            source: Some(Box::new(e)),
        })?;

    let dir_name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| manifest_error(&manifest_path, "plugin directory has no usable name".to_string()))?;

    if let Some(declared) = &raw.name {
        if declared != dir_name {
            return Err(manifest_error(
                &manifest_path,
                format!("manifest name '{}' does not match directory name '{}'", declared, dir_name),
            ));
        }
    }

    let mut descriptor = PluginDescriptor::new(dir_name, &raw.version).with_path(dir.to_path_buf());
    descriptor.active = raw.active;
    descriptor.installed = raw.installed;
    descriptor.weight = raw.weight;

    for (dep_name, value) in &raw.plugin_dependencies {
        let range = parse_range_entry(&manifest_path, dep_name, value)?;
        descriptor.plugin_dependencies.push(match range {
            Some(range) => PluginDependency::new(dep_name, range),
            None => PluginDependency::any(dep_name),
        });
    }

    for (module, value) in &raw.external_dependencies {
        let range = parse_range_entry(&manifest_path, module, value)?;
        descriptor.external_dependencies.push(match range {
            Some(range) => RuntimeDependency::new(module, range),
            None => RuntimeDependency::any(module),
        });
    }

    Ok(descriptor)
}

/// Scan a plugins directory for manifests, one level deep: every
/// subdirectory containing a `plugin.json` yields a descriptor.
///
/// Subdirectories without a manifest are skipped silently; a malformed
/// manifest is logged and skipped so one broken plugin cannot block
/// discovery of the rest.
pub async fn discover_manifests(dir: &Path) -> Result<Vec<PluginDescriptor>, PluginSystemError> {
    let mut descriptors = Vec::new();

    let mut entries = fs::read_dir(dir).await.map_err(|e| PluginSystemError::ManifestError {
        path: dir.to_path_buf(),
        message: format!("failed to read plugins directory: {}", e),
        source: Some(Box::new(e)),
    })?;

    while let Some(entry) = entries.next_entry().await.map_err(|e| {
        PluginSystemError::ManifestError {
            path: dir.to_path_buf(),
            message: format!("failed to read plugins directory entry: {}", e),
            source: Some(Box::new(e)),
        }
    })? {
        let entry_path = entry.path();

        let metadata = match fs::metadata(&entry_path).await {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("Failed to get metadata for {}: {}", entry_path.display(), e);
                continue;
            }
        };
        if !metadata.is_dir() {
            continue;
        }

        let manifest_path = entry_path.join(MANIFEST_FILE);
        match fs::try_exists(&manifest_path).await {
            Ok(true) => match load_manifest(&entry_path).await {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(e) => {
                    log::warn!("Skipping plugin directory {}: {}", entry_path.display(), e);
                }
            },
            Ok(false) => {}
            Err(e) => {
                log::warn!("Error checking for {}: {}", manifest_path.display(), e);
            }
        }
    }

    // Directory iteration order is platform-dependent; admission order must
    // not be.
    descriptors.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(descriptors)
}
