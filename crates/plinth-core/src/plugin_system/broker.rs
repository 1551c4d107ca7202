use std::collections::HashMap;
use std::fmt;

use crate::plugin_system::traits::SharedObject;

/// Process-wide registry of objects plugins publish for one another.
///
/// Keyed by publishing plugin name. Only the orchestrator writes entries, on
/// behalf of the named plugin, from its single sequential pass; readers are
/// hooks invoked synchronously within that same pass, so no locking is
/// required — the `&mut` receiver serializes access. Lifetime spans the host
/// process; a fresh instance per test gives isolated runs.
#[derive(Default)]
pub struct SharedObjectRegistry {
    objects: HashMap<String, SharedObject>,
}

impl SharedObjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `object` under `plugin`, replacing any prior publication for
    /// that name within the same process lifetime.
    pub fn publish(&mut self, plugin: &str, object: SharedObject) {
        self.objects.insert(plugin.to_string(), object);
    }

    /// The current publication for `plugin`, or `None` if the plugin never
    /// published one or has not yet loaded.
    pub fn lookup(&self, plugin: &str) -> Option<SharedObject> {
        self.objects.get(plugin).cloned()
    }

    /// Whether `plugin` has a current publication
    pub fn contains(&self, plugin: &str) -> bool {
        self.objects.contains_key(plugin)
    }

    /// Number of publications
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no plugin has published yet
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl fmt::Debug for SharedObjectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The objects themselves are opaque; show only who published.
        f.debug_struct("SharedObjectRegistry")
            .field("published", &self.objects.keys().collect::<Vec<_>>())
            .finish()
    }
}
