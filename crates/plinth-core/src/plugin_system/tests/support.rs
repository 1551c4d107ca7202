// Shared test fixtures for the plugin_system test suite.
#![cfg(test)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::plugin_system::dependency::PluginDependency;
use crate::plugin_system::descriptor::{DescriptorStore, PluginDescriptor};
use crate::plugin_system::traits::{
    LoadContext, MiddlewareDef, PageHook, Plugin, PluginError, RouteDef, SharedObject,
};
use crate::plugin_system::version::VersionRange;

/// Records every hook invocation across a run, in order.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn logged(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Configurable plugin for orchestrator tests.
pub struct TestPlugin {
    name: &'static str,
    version: &'static str,
    weight: i64,
    deps: Vec<PluginDependency>,
    fail_install: bool,
    fail_load: bool,
    load_delay: Option<Duration>,
    render: Option<SharedObject>,
    offers: HashMap<String, SharedObject>,
    routes: Vec<RouteDef>,
    middleware: Vec<MiddlewareDef>,
    page_hooks: Vec<PageHook>,
    calls: Option<CallLog>,
    pub received: Arc<Mutex<Vec<String>>>,
    pub seen_at_load: Arc<Mutex<Vec<String>>>,
}

impl TestPlugin {
    pub fn new(name: &'static str, version: &'static str) -> Self {
        Self {
            name,
            version,
            weight: 0,
            deps: Vec::new(),
            fail_install: false,
            fail_load: false,
            load_delay: None,
            render: None,
            offers: HashMap::new(),
            routes: Vec::new(),
            middleware: Vec::new(),
            page_hooks: Vec::new(),
            calls: None,
            received: Arc::new(Mutex::new(Vec::new())),
            seen_at_load: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    pub fn depends_on(mut self, name: &str, range: &str) -> Self {
        let range = VersionRange::from_constraint(range).unwrap();
        self.deps.push(PluginDependency::new(name, range));
        self
    }

    pub fn depends_on_any(mut self, name: &str) -> Self {
        self.deps.push(PluginDependency::any(name));
        self
    }

    pub fn failing_install(mut self) -> Self {
        self.fail_install = true;
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn slow_load(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    pub fn publishing(mut self, object: SharedObject) -> Self {
        self.render = Some(object);
        self
    }

    pub fn offering(mut self, requester: &str, object: SharedObject) -> Self {
        self.offers.insert(requester.to_string(), object);
        self
    }

    pub fn with_route(mut self, method: &str, path: &str, handler: &str) -> Self {
        self.routes.push(RouteDef {
            method: method.to_string(),
            path: path.to_string(),
            handler: handler.to_string(),
        });
        self
    }

    pub fn with_middleware(mut self, name: &str, handler: &str) -> Self {
        self.middleware.push(MiddlewareDef {
            name: name.to_string(),
            handler: handler.to_string(),
        });
        self
    }

    pub fn with_page_hook(mut self, region: &str, handler: &str) -> Self {
        self.page_hooks.push(PageHook {
            region: region.to_string(),
            handler: handler.to_string(),
        });
        self
    }

    pub fn tracking(mut self, calls: &CallLog) -> Self {
        self.calls = Some(calls.clone());
        self
    }

    fn record(&self, hook: &str) {
        if let Some(calls) = &self.calls {
            calls.lock().unwrap().push(format!("{}:{}", hook, self.name));
        }
    }
}

#[async_trait]
impl Plugin for TestPlugin {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &str {
        self.version
    }

    fn weight(&self) -> i64 {
        self.weight
    }

    fn dependencies(&self) -> Vec<PluginDependency> {
        self.deps.clone()
    }

    async fn install(&self) -> Result<(), PluginError> {
        self.record("install");
        if self.fail_install {
            return Err(PluginError::Install("refused by test".to_string()));
        }
        Ok(())
    }

    async fn load(&self, ctx: &LoadContext<'_>) -> Result<(), PluginError> {
        self.record("load");
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }
        *self.seen_at_load.lock().unwrap() = ctx.loaded().to_vec();
        if self.fail_load {
            return Err(PluginError::Load("refused by test".to_string()));
        }
        Ok(())
    }

    fn routes(&self) -> Vec<RouteDef> {
        self.routes.clone()
    }

    fn middleware(&self) -> Vec<MiddlewareDef> {
        self.middleware.clone()
    }

    fn page_hooks(&self) -> Vec<PageHook> {
        self.page_hooks.clone()
    }

    fn render_object(&self) -> Option<SharedObject> {
        self.render.clone()
    }

    fn object_for(&self, requester: &str) -> Option<SharedObject> {
        self.offers.get(requester).cloned()
    }

    fn receive_object(&self, publisher: &str, _object: SharedObject) {
        self.received.lock().unwrap().push(publisher.to_string());
    }
}

/// Builds the (store, plugins) pair the orchestrator consumes from a set of
/// test plugins, descriptors derived the same way the Application does it.
pub fn host(plugins: Vec<TestPlugin>) -> (DescriptorStore, HashMap<String, Arc<dyn Plugin>>) {
    let mut store = DescriptorStore::new();
    let mut map: HashMap<String, Arc<dyn Plugin>> = HashMap::new();
    for plugin in plugins {
        let mut descriptor = PluginDescriptor::new(plugin.name(), plugin.version())
            .with_weight(plugin.weight());
        for dep in plugin.dependencies() {
            descriptor = descriptor.with_dependency(dep);
        }
        store.insert(descriptor).unwrap();
        map.insert(plugin.name().to_string(), Arc::new(plugin));
    }
    (store, map)
}

/// Descriptor shorthand for graph/order tests.
pub fn descriptor(name: &str, version: &str) -> PluginDescriptor {
    PluginDescriptor::new(name, version)
}

pub fn dep(name: &str, range: &str) -> PluginDependency {
    PluginDependency::new(name, VersionRange::from_constraint(range).unwrap())
}

pub fn dep_any(name: &str) -> PluginDependency {
    PluginDependency::any(name)
}
