//! Dependency graph construction over the active descriptor snapshot.
//!
//! One node per active plugin, one edge per satisfied dependency
//! declaration. A dependency that is missing or fails its version range
//! never becomes an edge: the dependent plugin is excluded instead, and the
//! exclusion cascades through its transitive dependents to a fixed point
//! before cycle detection runs.
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::Serialize;

use crate::plugin_system::descriptor::PluginDescriptor;

/// Why a plugin was removed from a resolution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExclusionReason {
    /// A declared plugin dependency is not present among active plugins
    MissingDependency { dependency: String },
    /// A declared dependency is present but its version fails the range check
    VersionMismatch {
        dependency: String,
        required: String,
        found: String,
    },
    /// A declared external runtime module could not be resolved
    MissingRuntime { module: String },
    /// A plugin this one depends on (directly or transitively) was excluded
    DependencyExcluded { dependency: String },
    /// The install hook failed
    InstallFailed { message: String },
    /// The load hook failed
    LoadFailed { message: String },
    /// A lifecycle hook exceeded the configured bound
    HookTimeout { hook: String },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::MissingDependency { dependency } => {
                write!(f, "required plugin '{}' is not active", dependency)
            }
            ExclusionReason::VersionMismatch { dependency, required, found } => write!(
                f,
                "dependency '{}' requires version '{}' but found '{}'",
                dependency, required, found
            ),
            ExclusionReason::MissingRuntime { module } => {
                write!(f, "required runtime module '{}' could not be resolved", module)
            }
            ExclusionReason::DependencyExcluded { dependency } => {
                write!(f, "dependency '{}' was excluded", dependency)
            }
            ExclusionReason::InstallFailed { message } => write!(f, "install hook failed: {}", message),
            ExclusionReason::LoadFailed { message } => write!(f, "load hook failed: {}", message),
            ExclusionReason::HookTimeout { hook } => {
                write!(f, "hook '{}' exceeded the configured time bound", hook)
            }
        }
    }
}

/// One excluded plugin with its recorded reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exclusion {
    pub plugin: String,
    pub reason: ExclusionReason,
}

/// Capability for resolving external runtime modules.
///
/// The host supplies an implementation that knows how runtime modules are
/// located (system packages, bundled tools, ...). Returns the installed
/// version string, or `None` when the module is absent.
pub trait RuntimeProbe: Send + Sync {
    fn resolve(&self, module: &str) -> Option<String>;
}

/// Directed "requires" graph among active plugins.
///
/// An edge `A -> B` means "A requires B to be resolved before A". Built
/// fresh per resolution run from the descriptor snapshot; never mutated
/// incrementally, except for node removal when exclusions cascade.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Node names in admission order; drives deterministic DFS roots
    nodes: Vec<String>,
    /// dependent -> required
    requires: HashMap<String, Vec<String>>,
    /// required -> dependents
    dependents: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Surviving node names, in admission order
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Whether a node survives in the graph
    pub fn contains(&self, name: &str) -> bool {
        self.requires.contains_key(name)
    }

    /// Plugins `name` requires (outgoing edges)
    pub fn requires(&self, name: &str) -> &[String] {
        self.requires.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Plugins that require `name` (incoming edges)
    pub fn dependents(&self, name: &str) -> &[String] {
        self.dependents.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of surviving nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no nodes survive
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn add_node(&mut self, name: &str) {
        if !self.requires.contains_key(name) {
            self.nodes.push(name.to_string());
            self.requires.insert(name.to_string(), Vec::new());
            self.dependents.insert(name.to_string(), Vec::new());
        }
    }

    fn add_edge(&mut self, dependent: &str, required: &str) {
        if let Some(out) = self.requires.get_mut(dependent) {
            out.push(required.to_string());
        }
        if let Some(inc) = self.dependents.get_mut(required) {
            inc.push(dependent.to_string());
        }
    }

    fn remove_node(&mut self, name: &str) {
        self.nodes.retain(|n| n != name);
        if let Some(required) = self.requires.remove(name) {
            for r in required {
                if let Some(inc) = self.dependents.get_mut(&r) {
                    inc.retain(|n| n != name);
                }
            }
        }
        if let Some(dependents) = self.dependents.remove(name) {
            for d in dependents {
                if let Some(out) = self.requires.get_mut(&d) {
                    out.retain(|n| n != name);
                }
            }
        }
    }

    /// Removes `root` and every node that transitively depends on it.
    ///
    /// Returns `(dependent, via)` pairs in breadth-first order, where `via`
    /// is the removed dependency that caused the dependent's removal. `root`
    /// itself is removed but not reported. Explicit work list; the node set
    /// strictly shrinks, so the walk terminates.
    pub fn remove_with_dependents(&mut self, root: &str) -> Vec<(String, String)> {
        let mut removed = Vec::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        queue.push_back(root.to_string());

        while let Some(current) = queue.pop_front() {
            if !self.contains(&current) {
                continue;
            }
            let dependents: Vec<String> = self.dependents(&current).to_vec();
            self.remove_node(&current);
            for dependent in dependents {
                if self.contains(&dependent) {
                    removed.push((dependent.clone(), current.clone()));
                    queue.push_back(dependent);
                }
            }
        }
        removed
    }
}

/// Builds the dependency graph for one resolution run.
pub struct GraphBuilder<'a> {
    probe: Option<&'a dyn RuntimeProbe>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new() -> Self {
        Self { probe: None }
    }

    /// Validate external runtime modules through `probe` during admission.
    /// Without a probe, external dependencies are not validated.
    pub fn with_probe(mut self, probe: &'a dyn RuntimeProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Construct the graph from the active descriptor snapshot.
    ///
    /// Returns the surviving graph plus every exclusion gathered during edge
    /// construction, cascades included, in the order they were decided.
    pub fn build(&self, active: &[&PluginDescriptor]) -> (DependencyGraph, Vec<Exclusion>) {
        let mut graph = DependencyGraph::default();
        let mut exclusions: Vec<Exclusion> = Vec::new();
        let mut excluded: HashSet<String> = HashSet::new();

        let versions: HashMap<&str, &str> = active
            .iter()
            .map(|d| (d.name(), d.version.as_str()))
            .collect();

        for descriptor in active {
            graph.add_node(descriptor.name());
        }

        for descriptor in active {
            if let Some(reason) = self.admission_failure(descriptor, &versions) {
                log::warn!("Excluding plugin '{}': {}", descriptor.name(), reason);
                excluded.insert(descriptor.name().to_string());
                exclusions.push(Exclusion {
                    plugin: descriptor.name().to_string(),
                    reason,
                });
                continue;
            }
            for dep in &descriptor.plugin_dependencies {
                graph.add_edge(descriptor.name(), &dep.plugin_name);
            }
        }

        // Cascade: anything depending on an excluded plugin goes too,
        // repeated to a fixed point. Each plugin is excluded at most once.
        for exclusion in std::mem::take(&mut exclusions) {
            let removed = graph.remove_with_dependents(&exclusion.plugin);
            exclusions.push(exclusion);
            for (dependent, via) in removed {
                if excluded.insert(dependent.clone()) {
                    log::warn!(
                        "Excluding plugin '{}': dependency '{}' was excluded",
                        dependent,
                        via
                    );
                    exclusions.push(Exclusion {
                        plugin: dependent,
                        reason: ExclusionReason::DependencyExcluded { dependency: via },
                    });
                }
            }
        }

        (graph, exclusions)
    }

    /// First failing dependency check for a descriptor, if any.
    fn admission_failure(
        &self,
        descriptor: &PluginDescriptor,
        versions: &HashMap<&str, &str>,
    ) -> Option<ExclusionReason> {
        for dep in &descriptor.plugin_dependencies {
            match versions.get(dep.plugin_name.as_str()) {
                None => {
                    return Some(ExclusionReason::MissingDependency {
                        dependency: dep.plugin_name.clone(),
                    });
                }
                Some(found) => {
                    if !dep.is_compatible_with(found) {
                        return Some(ExclusionReason::VersionMismatch {
                            dependency: dep.plugin_name.clone(),
                            required: dep
                                .version_range
                                .as_ref()
                                .map(|r| r.constraint_string().to_string())
                                .unwrap_or_else(|| "*".to_string()),
                            found: (*found).to_string(),
                        });
                    }
                }
            }
        }

        if let Some(probe) = self.probe {
            for ext in &descriptor.external_dependencies {
                match probe.resolve(&ext.module) {
                    None => {
                        return Some(ExclusionReason::MissingRuntime {
                            module: ext.module.clone(),
                        });
                    }
                    Some(found) => {
                        if !ext.is_satisfied_by(&found) {
                            return Some(ExclusionReason::VersionMismatch {
                                dependency: ext.module.clone(),
                                required: ext
                                    .version_range
                                    .as_ref()
                                    .map(|r| r.constraint_string().to_string())
                                    .unwrap_or_else(|| "*".to_string()),
                                found,
                            });
                        }
                    }
                }
            }
        }

        None
    }
}

impl Default for GraphBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}
