//! Lifecycle orchestration: one sequential pass over the resolved order.
//!
//! The orchestrator snapshots the active descriptors, builds the graph,
//! rejects cycles, sequences the survivors, and then drives each plugin
//! through install -> load -> registration -> sharing. A single plugin's
//! hook failure excludes that plugin and its transitive dependents and the
//! pass continues; only a dependency cycle is fatal to the whole run.
//!
//! Ordering guarantee: a plugin's load hook runs strictly after every
//! earlier-ordered plugin has loaded and published, and strictly before any
//! later-ordered plugin is touched. Hooks may suspend internally, but the
//! orchestrator awaits each one to completion — suspension points exist only
//! within a hook invocation, never between two plugins. Concurrent passes
//! are unsupported; the `&mut` borrows on the store and broker serialize
//! callers at compile time.
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::plugin_system::broker::SharedObjectRegistry;
use crate::plugin_system::cycle;
use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::descriptor::{DescriptorStore, PluginDescriptor};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::graph::{
    DependencyGraph, Exclusion, ExclusionReason, GraphBuilder, RuntimeProbe,
};
use crate::plugin_system::order;
use crate::plugin_system::traits::{
    LoadContext, MiddlewareDef, PageHook, Plugin, PluginError, RouteDef,
};

/// Output of one resolution-and-orchestration pass.
#[derive(Debug, Default)]
pub struct ResolutionResult {
    /// Successfully activated plugins, in load order
    pub activated: Vec<String>,
    /// Plugins excluded this run, with reasons, in the order decided
    pub excluded: Vec<Exclusion>,
    /// Route registrations to forward to the router collaborator
    pub routes: Vec<(String, RouteDef)>,
    /// Middleware registrations to forward to the pipeline collaborator
    pub middleware: Vec<(String, MiddlewareDef)>,
    /// Page-hook registrations to forward to the rendering collaborator
    pub page_hooks: Vec<(String, PageHook)>,
}

impl ResolutionResult {
    /// Whether `plugin` was excluded this run
    pub fn is_excluded(&self, plugin: &str) -> bool {
        self.excluded.iter().any(|e| e.plugin == plugin)
    }

    /// The recorded reason `plugin` was excluded, if it was
    pub fn exclusion_reason(&self, plugin: &str) -> Option<&ExclusionReason> {
        self.excluded
            .iter()
            .find(|e| e.plugin == plugin)
            .map(|e| &e.reason)
    }
}

/// Planned order and exclusions, without running any lifecycle hook.
#[derive(Debug, Default)]
pub struct ResolutionPlan {
    pub order: Vec<String>,
    pub excluded: Vec<Exclusion>,
}

enum HookOutcome {
    Ok,
    Failed(PluginError),
    TimedOut,
}

/// Drives the resolution pass and the per-plugin lifecycle.
#[derive(Debug, Clone, Default)]
pub struct LifecycleOrchestrator {
    hook_timeout: Option<Duration>,
}

impl LifecycleOrchestrator {
    pub fn new() -> Self {
        Self { hook_timeout: None }
    }

    /// Bound every lifecycle hook invocation; a hook exceeding the bound is
    /// treated as having failed.
    pub fn with_hook_timeout(timeout: Duration) -> Self {
        Self {
            hook_timeout: Some(timeout),
        }
    }

    /// Resolve only: snapshot, graph, cycle check, sequence. No hook runs,
    /// no state changes. Suitable for dry-run diagnostics.
    pub fn plan(
        &self,
        store: &DescriptorStore,
        probe: Option<&dyn RuntimeProbe>,
    ) -> Result<ResolutionPlan, PluginSystemError> {
        let snapshot: Vec<_> = store.active().into_iter().cloned().collect();
        let (graph, excluded) = self.resolve(&snapshot, probe)?;
        let weights = weight_map(&snapshot);
        let order = order::sequence(&graph, &weights)?;
        Ok(ResolutionPlan { order, excluded })
    }

    /// Run a full resolution-and-orchestration pass.
    ///
    /// `plugins` maps plugin names to their live implementations; a
    /// descriptor without an implementation is excluded at its turn. On a
    /// dependency cycle no plugin is activated and the cycle path is
    /// returned as the error.
    pub async fn run(
        &self,
        store: &mut DescriptorStore,
        plugins: &HashMap<String, Arc<dyn Plugin>>,
        shared: &mut SharedObjectRegistry,
        probe: Option<&dyn RuntimeProbe>,
    ) -> Result<ResolutionResult, PluginSystemError> {
        // Atomic snapshot: the run never observes store mutations besides
        // its own installed transitions.
        let snapshot: Vec<_> = store.active().into_iter().cloned().collect();
        let (mut graph, excluded) = self.resolve(&snapshot, probe)?;
        let weights = weight_map(&snapshot);
        let order = order::sequence(&graph, &weights)?;

        info!("Activation order resolved: {:?}", order);

        let mut result = ResolutionResult {
            excluded,
            ..ResolutionResult::default()
        };
        let mut dropped: HashSet<String> = HashSet::new();
        let mut loaded: Vec<String> = Vec::new();

        for name in &order {
            if dropped.contains(name) {
                continue;
            }

            let Some(plugin) = plugins.get(name).cloned() else {
                warn!("Plugin '{}' has a descriptor but no implementation", name);
                self.exclude(
                    &mut graph,
                    &mut result,
                    &mut dropped,
                    name,
                    ExclusionReason::LoadFailed {
                        message: "no implementation registered".to_string(),
                    },
                );
                continue;
            };

            // Install step for active-but-uninstalled plugins.
            let needs_install = store.get(name).is_some_and(|d| !d.installed);
            if needs_install {
                match self.bounded(plugin.install()).await {
                    HookOutcome::Ok => {
                        store.mark_installed(name);
                        info!("Installed plugin '{}'", name);
                    }
                    HookOutcome::Failed(e) => {
                        self.exclude(
                            &mut graph,
                            &mut result,
                            &mut dropped,
                            name,
                            ExclusionReason::InstallFailed {
                                message: e.to_string(),
                            },
                        );
                        continue;
                    }
                    HookOutcome::TimedOut => {
                        self.exclude(
                            &mut graph,
                            &mut result,
                            &mut dropped,
                            name,
                            ExclusionReason::HookTimeout {
                                hook: "install".to_string(),
                            },
                        );
                        continue;
                    }
                }
            }

            // Load step. Every dependency is already loaded and published.
            let outcome = {
                let ctx = LoadContext::new(shared, &loaded);
                self.bounded(plugin.load(&ctx)).await
            };
            match outcome {
                HookOutcome::Ok => {}
                HookOutcome::Failed(e) => {
                    self.exclude(
                        &mut graph,
                        &mut result,
                        &mut dropped,
                        name,
                        ExclusionReason::LoadFailed {
                            message: e.to_string(),
                        },
                    );
                    continue;
                }
                HookOutcome::TimedOut => {
                    self.exclude(
                        &mut graph,
                        &mut result,
                        &mut dropped,
                        name,
                        ExclusionReason::HookTimeout {
                            hook: "load".to_string(),
                        },
                    );
                    continue;
                }
            }

            // Registration forwarding: contents are opaque to the
            // orchestrator.
            for route in plugin.routes() {
                result.routes.push((name.clone(), route));
            }
            for mw in plugin.middleware() {
                result.middleware.push((name.clone(), mw));
            }
            for hook in plugin.page_hooks() {
                result.page_hooks.push((name.clone(), hook));
            }

            // Sharing step: the registry entry for this plugin is fully
            // populated before any later-ordered plugin's load hook runs.
            if let Some(object) = plugin.render_object() {
                shared.publish(name, object);
            }
            for other_name in &loaded {
                let Some(other) = plugins.get(other_name) else {
                    continue;
                };
                if let Some(object) = plugin.object_for(other_name) {
                    other.receive_object(name, object);
                }
                if let Some(object) = other.object_for(name) {
                    plugin.receive_object(other_name, object);
                }
            }

            loaded.push(name.clone());
            info!("Loaded plugin '{}'", name);
        }

        if !result.excluded.is_empty() {
            warn!(
                "{} plugin(s) excluded this run: {:?}",
                result.excluded.len(),
                result.excluded.iter().map(|e| e.plugin.as_str()).collect::<Vec<_>>()
            );
        }
        info!("Activated {} plugin(s): {:?}", loaded.len(), loaded);

        result.activated = loaded;
        Ok(result)
    }

    /// Shared resolution front half: graph construction plus cycle check.
    fn resolve(
        &self,
        snapshot: &[PluginDescriptor],
        probe: Option<&dyn RuntimeProbe>,
    ) -> Result<(DependencyGraph, Vec<Exclusion>), PluginSystemError> {
        let active: Vec<_> = snapshot.iter().collect();
        let mut builder = GraphBuilder::new();
        if let Some(probe) = probe {
            builder = builder.with_probe(probe);
        }
        let (graph, excluded) = builder.build(&active);

        if let Some(path) = cycle::find_cycle(&graph) {
            log::error!(
                "Circular dependency detected, aborting resolution: {}",
                path.join(" -> ")
            );
            return Err(DependencyError::CyclicDependency(path).into());
        }

        Ok((graph, excluded))
    }

    /// Exclude `name` mid-run and cascade through its surviving dependents.
    fn exclude(
        &self,
        graph: &mut DependencyGraph,
        result: &mut ResolutionResult,
        dropped: &mut HashSet<String>,
        name: &str,
        reason: ExclusionReason,
    ) {
        warn!("Excluding plugin '{}': {}", name, reason);
        dropped.insert(name.to_string());
        result.excluded.push(Exclusion {
            plugin: name.to_string(),
            reason,
        });
        for (dependent, via) in graph.remove_with_dependents(name) {
            if dropped.insert(dependent.clone()) {
                result.excluded.push(Exclusion {
                    plugin: dependent,
                    reason: ExclusionReason::DependencyExcluded { dependency: via },
                });
            }
        }
    }

    /// Await a hook, bounded by the configured timeout when one is set.
    async fn bounded<F>(&self, hook: F) -> HookOutcome
    where
        F: Future<Output = Result<(), PluginError>>,
    {
        let outcome = match self.hook_timeout {
            Some(limit) => match tokio::time::timeout(limit, hook).await {
                Ok(outcome) => outcome,
                Err(_) => return HookOutcome::TimedOut,
            },
            None => hook.await,
        };
        match outcome {
            Ok(()) => HookOutcome::Ok,
            Err(e) => HookOutcome::Failed(e),
        }
    }
}

fn weight_map(snapshot: &[PluginDescriptor]) -> HashMap<String, i64> {
    snapshot
        .iter()
        .map(|d| (d.name().to_string(), d.weight))
        .collect()
}
