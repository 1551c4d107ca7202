use async_trait::async_trait;
use log::info;

use plinth_core::plugin_system::traits::{LoadContext, Plugin, PluginError};

/// Core plugin that brings up the `env_logger` backend for the `log` facade.
///
/// Runs at a strongly negative weight so the logger exists before any other
/// dependency-unconstrained plugin loads.
#[derive(Default)]
pub struct LoggingPlugin;

#[async_trait]
impl Plugin for LoggingPlugin {
    fn name(&self) -> &'static str {
        "core-logging"
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    fn weight(&self) -> i64 {
        -100
    }

    async fn load(&self, _ctx: &LoadContext<'_>) -> Result<(), PluginError> {
        // A second boot in the same process finds the logger already
        // installed; that is not a failure.
        if env_logger::try_init().is_ok() {
            info!("Core logging plugin installed the process logger");
        }
        info!("Core logging plugin v{} loaded", self.version());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let plugin = LoggingPlugin;
        assert_eq!(plugin.name(), "core-logging");
        assert_eq!(plugin.version(), "0.1.0");
        assert!(plugin.weight() < 0);
        assert!(plugin.dependencies().is_empty());
    }
}
