use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::plugin_system::broker::SharedObjectRegistry;
use crate::plugin_system::descriptor::{DescriptorStore, PluginDescriptor};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::graph::RuntimeProbe;
use crate::plugin_system::manifest;
use crate::plugin_system::orchestrator::{LifecycleOrchestrator, ResolutionPlan, ResolutionResult};
use crate::plugin_system::traits::Plugin;

/// Host application wiring the plugin system together.
///
/// Owns the descriptor store, the live plugin implementations, the
/// shared-object registry and the orchestrator. `boot` takes `&mut self`,
/// which is what serializes resolution passes: a second pass cannot start
/// while one is in progress.
pub struct Application {
    descriptors: DescriptorStore,
    plugins: HashMap<String, Arc<dyn Plugin>>,
    shared: SharedObjectRegistry,
    orchestrator: LifecycleOrchestrator,
    probe: Option<Box<dyn RuntimeProbe>>,
}

impl Application {
    /// Creates a new application instance with no hook timeout.
    pub fn new() -> Self {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);
        Self {
            descriptors: DescriptorStore::new(),
            plugins: HashMap::new(),
            shared: SharedObjectRegistry::new(),
            orchestrator: LifecycleOrchestrator::new(),
            probe: None,
        }
    }

    /// Bound every lifecycle hook invocation during boot.
    pub fn with_hook_timeout(timeout: Duration) -> Self {
        let mut app = Self::new();
        app.orchestrator = LifecycleOrchestrator::with_hook_timeout(timeout);
        app
    }

    /// Supply the probe used to validate external runtime dependencies.
    pub fn set_runtime_probe(&mut self, probe: Box<dyn RuntimeProbe>) {
        self.probe = Some(probe);
    }

    /// Statically register a plugin implementation.
    ///
    /// A descriptor is derived from the plugin's own declarations: active,
    /// not yet installed, so the install hook runs once per process. Names
    /// must be unique.
    pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) -> Result<()> {
        let name = plugin.name();
        if self.plugins.contains_key(name) {
            return Err(PluginSystemError::RegistrationError {
                plugin: name.to_string(),
                message: "a plugin with this name is already registered".to_string(),
            }
            .into());
        }

        let mut descriptor = PluginDescriptor::new(name, plugin.version())
            .with_weight(plugin.weight());
        for dep in plugin.dependencies() {
            descriptor = descriptor.with_dependency(dep);
        }
        for ext in plugin.external_dependencies() {
            descriptor = descriptor.with_external_dependency(ext);
        }

        self.descriptors.insert(descriptor)?;
        self.plugins.insert(name.to_string(), plugin);
        Ok(())
    }

    /// Discover `plugin.json` manifests under `dir` and merge them into the
    /// descriptor store. A manifest for an already-registered plugin
    /// overrides its flags and weight; a manifest without a registered
    /// implementation is admitted and will be excluded at its turn during
    /// boot. Returns the number of manifests merged.
    pub async fn load_manifest_dir(&mut self, dir: &Path) -> Result<usize> {
        let discovered = manifest::discover_manifests(dir).await?;
        let count = discovered.len();
        for descriptor in discovered {
            log::debug!(
                "Discovered manifest for '{}' at {}",
                descriptor.name(),
                descriptor.path.display()
            );
            self.descriptors.merge(descriptor)?;
        }
        Ok(count)
    }

    /// Flip a plugin's active flag ahead of the next boot.
    pub fn set_plugin_active(&mut self, name: &str, active: bool) -> Result<()> {
        if !self.descriptors.set_active(name, active) {
            return Err(PluginSystemError::RegistrationError {
                plugin: name.to_string(),
                message: "no such plugin".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// All known plugin names, in admission order.
    pub fn plugin_names(&self) -> Vec<String> {
        self.descriptors.iter().map(|d| d.name().to_string()).collect()
    }

    /// Descriptor lookup for diagnostics.
    pub fn descriptor(&self, name: &str) -> Option<&PluginDescriptor> {
        self.descriptors.get(name)
    }

    /// Read-only view of the shared-object registry.
    pub fn shared(&self) -> &SharedObjectRegistry {
        &self.shared
    }

    /// Resolve the activation order without running any lifecycle hook.
    pub fn plan(&self) -> Result<ResolutionPlan> {
        Ok(self.orchestrator.plan(&self.descriptors, self.probe.as_deref())?)
    }

    /// Run a full resolution-and-orchestration pass.
    pub async fn boot(&mut self) -> Result<ResolutionResult> {
        let result = self
            .orchestrator
            .run(
                &mut self.descriptors,
                &self.plugins,
                &mut self.shared,
                self.probe.as_deref(),
            )
            .await?;
        Ok(result)
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}
