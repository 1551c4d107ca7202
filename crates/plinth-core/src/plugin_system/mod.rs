//! # Plinth Core Plugin System
//!
//! Infrastructure for extending a plinth host with independently authored,
//! versioned plugin modules: descriptor discovery, semantic-version
//! constraint checking, dependency graph resolution with cycle rejection,
//! deterministic activation ordering, and lifecycle orchestration with a
//! shared-object broker.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`broker`]**: Process-wide registry of objects plugins explicitly
//!   publish for one another ([`SharedObjectRegistry`]).
//! - **[`cycle`]**: Three-color depth-first cycle detection over the
//!   dependency graph, reporting the full loop for diagnostics.
//! - **[`dependency`]**: Dependency declarations on other plugins and on
//!   external runtime modules, with version-range compatibility checks.
//! - **[`descriptor`]**: The [`PluginDescriptor`] snapshot and the
//!   [`DescriptorStore`] holding everything discovered at boot.
//! - **[`error`]**: Typed errors ([`PluginSystemError`](error::PluginSystemError))
//!   for manifest, registration, and resolution failures.
//! - **[`graph`]**: Builds the directed "requires" graph from the active
//!   descriptor set and cascades exclusions to a fixed point.
//! - **[`manifest`]**: `plugin.json` parsing and on-disk discovery.
//! - **[`orchestrator`]**: The [`LifecycleOrchestrator`] driving
//!   install/load/registration/sharing in resolved order.
//! - **[`order`]**: Deterministic topological sequencing (Kahn's algorithm
//!   with weight/name tie-breaks).
//! - **[`traits`]**: The [`Plugin`] trait every loadable module implements,
//!   plus the registration payload types forwarded to collaborators.
//! - **[`version`]**: Semantic-version ranges and the pure satisfaction
//!   check used at graph admission.
pub mod broker;
pub mod cycle;
pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod order;
pub mod orchestrator;
pub mod traits;
pub mod version;

pub use broker::SharedObjectRegistry;
pub use dependency::{PluginDependency, RuntimeDependency};
pub use descriptor::{DescriptorStore, PluginDescriptor};
pub use graph::{DependencyGraph, Exclusion, ExclusionReason, GraphBuilder, RuntimeProbe};
pub use orchestrator::{LifecycleOrchestrator, ResolutionPlan, ResolutionResult};
pub use traits::{
    LoadContext, MiddlewareDef, PageHook, Plugin, PluginError, RouteDef, SharedObject,
};
pub use version::{satisfies, VersionRange};

// Test module declaration
#[cfg(test)]
mod tests;
