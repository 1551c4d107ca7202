/// Application name used in logs and CLI output
pub const APP_NAME: &str = "plinth";

/// Application version reported at boot
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default directory scanned for plugin manifests, relative to the working
/// directory
pub const DEFAULT_PLUGIN_DIR: &str = "plugins";
