use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info};

use plinth_core::plugin_system::dependency::PluginDependency;
use plinth_core::plugin_system::traits::{
    LoadContext, MiddlewareDef, PageHook, Plugin, PluginError, RouteDef, SharedObject,
};
use plinth_core::plugin_system::version::VersionRange;

/// Snapshot other plugins (and the renderer) can read from the shared-object
/// registry under the `status-pages` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub plugin: String,
    pub version: String,
    pub healthy: bool,
}

/// Plugin exposing a `/status` route, a request-timing middleware, a header
/// page hook and a shared status snapshot. Depends on `core-logging` so the
/// process logger exists before it loads.
#[derive(Default)]
pub struct StatusPagesPlugin;

impl StatusPagesPlugin {
    const LOGGING_REQ: &'static str = "^0.1";
}

#[async_trait]
impl Plugin for StatusPagesPlugin {
    fn name(&self) -> &'static str {
        "status-pages"
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    fn dependencies(&self) -> Vec<PluginDependency> {
        match VersionRange::from_constraint(Self::LOGGING_REQ) {
            Ok(range) => vec![PluginDependency::new("core-logging", range)],
            Err(e) => {
                error!(
                    "Failed to parse dependency requirement ('{}') for {}: {}",
                    Self::LOGGING_REQ,
                    self.name(),
                    e
                );
                vec![]
            }
        }
    }

    async fn load(&self, ctx: &LoadContext<'_>) -> Result<(), PluginError> {
        info!(
            "Status pages plugin loaded after {:?}",
            ctx.loaded()
        );
        Ok(())
    }

    fn routes(&self) -> Vec<RouteDef> {
        vec![RouteDef {
            method: "GET".to_string(),
            path: "/status".to_string(),
            handler: "status-pages::status".to_string(),
        }]
    }

    fn middleware(&self) -> Vec<MiddlewareDef> {
        vec![MiddlewareDef {
            name: "request-timer".to_string(),
            handler: "status-pages::request_timer".to_string(),
        }]
    }

    fn page_hooks(&self) -> Vec<PageHook> {
        vec![PageHook {
            region: "header".to_string(),
            handler: "status-pages::header_badge".to_string(),
        }]
    }

    fn render_object(&self) -> Option<SharedObject> {
        Some(Arc::new(StatusSnapshot {
            plugin: self.name().to_string(),
            version: self.version().to_string(),
            healthy: true,
        }))
    }
}
