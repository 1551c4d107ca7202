use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::plugin_system::broker::SharedObjectRegistry;
use crate::plugin_system::dependency::{PluginDependency, RuntimeDependency};

/// Opaque object a plugin publishes for other plugins or the renderer.
///
/// Consumers downcast to the concrete type they agreed on with the
/// publisher.
pub type SharedObject = Arc<dyn Any + Send + Sync>;

/// Error a lifecycle hook reports back to the orchestrator
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("install failed: {0}")]
    Install(String),
    #[error("load failed: {0}")]
    Load(String),
    #[error("uninstall failed: {0}")]
    Uninstall(String),
    #[error("upgrade failed: {0}")]
    Upgrade(String),
    #[error("{0}")]
    Other(String),
}

/// HTTP route definition, forwarded verbatim to the router collaborator.
/// The orchestrator never interprets the contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDef {
    /// HTTP method, e.g. "GET"
    pub method: String,
    /// Route path, e.g. "/status"
    pub path: String,
    /// Handler identifier the router resolves
    pub handler: String,
}

/// Middleware registration, forwarded verbatim to the request pipeline
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MiddlewareDef {
    pub name: String,
    /// Handler identifier the pipeline resolves
    pub handler: String,
}

/// Page-lifecycle hook registration, keyed by template region, forwarded to
/// the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageHook {
    /// Template region this hook attaches to, e.g. "header"
    pub region: String,
    /// Handler identifier the renderer resolves
    pub handler: String,
}

/// Read-only view handed to a plugin's load hook.
///
/// Every plugin earlier in the activation order has already loaded, and its
/// shared object — if it published one — is visible here.
pub struct LoadContext<'a> {
    shared: &'a SharedObjectRegistry,
    loaded: &'a [String],
}

impl<'a> LoadContext<'a> {
    pub(crate) fn new(shared: &'a SharedObjectRegistry, loaded: &'a [String]) -> Self {
        Self { shared, loaded }
    }

    /// The object `plugin` published, if it loaded earlier in this run and
    /// chose to publish one.
    pub fn shared_object(&self, plugin: &str) -> Option<SharedObject> {
        self.shared.lookup(plugin)
    }

    /// Names of the plugins already loaded this run, in activation order
    pub fn loaded(&self) -> &[String] {
        self.loaded
    }
}

/// Core trait every loadable module implements.
///
/// Only `name` and `version` are required; every other capability defaults
/// to a no-op, and absence of a capability is a valid variant, not an
/// error. Lifecycle hooks may suspend internally; the orchestrator awaits
/// each hook to completion before moving to the next plugin in the order.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// The stable, unique name of the plugin
    fn name(&self) -> &'static str;

    /// The semantic version of the plugin
    fn version(&self) -> &str;

    /// Tie-break ordering value among plugins with no ordering constraint;
    /// lower weight loads first
    fn weight(&self) -> i64 {
        0
    }

    /// Dependencies on other plugins
    fn dependencies(&self) -> Vec<PluginDependency> {
        Vec::new()
    }

    /// Dependencies on external runtime modules
    fn external_dependencies(&self) -> Vec<RuntimeDependency> {
        Vec::new()
    }

    /// One-time installation work, run before the first load
    async fn install(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Bring the plugin into service. Dependencies have completed loading
    /// and their shared objects are readable through `ctx`.
    async fn load(&self, _ctx: &LoadContext<'_>) -> Result<(), PluginError> {
        Ok(())
    }

    /// Undo installation work
    async fn uninstall(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Migrate persisted state from an older installed version
    async fn upgrade(&self, _from_version: &str) -> Result<(), PluginError> {
        Ok(())
    }

    /// Route definitions for the request-routing collaborator
    fn routes(&self) -> Vec<RouteDef> {
        Vec::new()
    }

    /// Middleware to register with the request pipeline collaborator
    fn middleware(&self) -> Vec<MiddlewareDef> {
        Vec::new()
    }

    /// Page-lifecycle hooks for the rendering collaborator
    fn page_hooks(&self) -> Vec<PageHook> {
        Vec::new()
    }

    /// Object to expose to the web-page rendering context; published in the
    /// shared-object registry under this plugin's name
    fn render_object(&self) -> Option<SharedObject> {
        None
    }

    /// Object to expose to one named other plugin
    fn object_for(&self, _requester: &str) -> Option<SharedObject> {
        None
    }

    /// Setter the orchestrator calls to hand this plugin an object another
    /// plugin published to it
    fn receive_object(&self, _publisher: &str, _object: SharedObject) {}
}
