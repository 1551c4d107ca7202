//! # plinth-core
//!
//! Plugin dependency resolution and lifecycle orchestration for the plinth
//! host: semantic-version constraint checking, dependency graph
//! construction with cascading exclusions, cycle detection, deterministic
//! topological sequencing, and a sequential lifecycle pass that brokers the
//! objects plugins explicitly share with one another.
pub mod kernel;
pub mod plugin_system;

// Re-export key public types for the binary and for plugin crates.
pub use kernel::Application;
pub use kernel::error::Error as KernelError;
pub use plugin_system::{
    DescriptorStore, Exclusion, ExclusionReason, LifecycleOrchestrator, LoadContext,
    MiddlewareDef, PageHook, Plugin, PluginDependency, PluginDescriptor, PluginError,
    ResolutionResult, RouteDef, RuntimeDependency, SharedObject, SharedObjectRegistry,
    VersionRange,
};
