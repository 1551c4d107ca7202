#![cfg(test)]

use std::path::PathBuf;

use crate::plugin_system::descriptor::{DescriptorStore, PluginDescriptor};
use crate::plugin_system::tests::support::{dep, dep_any};

#[test]
fn test_descriptor_defaults() {
    let d = PluginDescriptor::new("pages", "1.2.0");
    assert_eq!(d.name(), "pages");
    assert_eq!(d.version, "1.2.0");
    assert!(d.active);
    assert!(!d.installed);
    assert_eq!(d.weight, 0);
    assert!(d.plugin_dependencies.is_empty());
    assert!(d.external_dependencies.is_empty());
}

#[test]
fn test_descriptor_builder_methods() {
    let d = PluginDescriptor::new("gallery", "0.3.1")
        .with_path(PathBuf::from("/srv/plugins/gallery"))
        .with_weight(25)
        .with_dependency(dep("pages", "^1.0"))
        .with_dependency(dep_any("core-logging"));

    assert_eq!(d.path, PathBuf::from("/srv/plugins/gallery"));
    assert_eq!(d.weight, 25);
    // Declaration order is preserved for diagnostics
    assert_eq!(d.plugin_dependencies[0].plugin_name, "pages");
    assert_eq!(d.plugin_dependencies[1].plugin_name, "core-logging");
}

#[test]
fn test_store_insert_and_lookup() {
    let mut store = DescriptorStore::new();
    store.insert(PluginDescriptor::new("a", "1.0.0")).unwrap();
    store.insert(PluginDescriptor::new("b", "2.0.0")).unwrap();

    assert_eq!(store.len(), 2);
    assert!(store.contains("a"));
    assert!(!store.contains("z"));
    assert_eq!(store.get("b").map(|d| d.version.as_str()), Some("2.0.0"));
}

#[test]
fn test_store_rejects_duplicate_names() {
    let mut store = DescriptorStore::new();
    store.insert(PluginDescriptor::new("a", "1.0.0")).unwrap();
    let err = store.insert(PluginDescriptor::new("a", "2.0.0"));
    assert!(err.is_err());
    // The original descriptor is untouched
    assert_eq!(store.get("a").map(|d| d.version.as_str()), Some("1.0.0"));
}

#[test]
fn test_store_iteration_follows_admission_order() {
    let mut store = DescriptorStore::new();
    for name in ["zeta", "alpha", "mu"] {
        store.insert(PluginDescriptor::new(name, "1.0.0")).unwrap();
    }
    let names: Vec<&str> = store.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mu"]);
}

#[test]
fn test_store_active_filter() {
    let mut store = DescriptorStore::new();
    store.insert(PluginDescriptor::new("on", "1.0.0")).unwrap();
    store.insert(PluginDescriptor::new("off", "1.0.0")).unwrap();
    assert!(store.set_active("off", false));

    let active: Vec<&str> = store.active().iter().map(|d| d.name()).collect();
    assert_eq!(active, vec!["on"]);

    assert!(!store.set_active("ghost", true));
}

#[test]
fn test_store_merge_overrides_host_fields_only() {
    let mut store = DescriptorStore::new();
    store
        .insert(
            PluginDescriptor::new("a", "1.0.0").with_dependency(dep("pages", "^1.0")),
        )
        .unwrap();
    store.insert(PluginDescriptor::new("b", "1.0.0")).unwrap();

    let mut manifest = PluginDescriptor::new("a", "9.9.9").with_weight(5);
    manifest.installed = true;
    manifest.active = false;
    store.merge(manifest).unwrap();

    let merged = store.get("a").unwrap();
    // Host-controlled fields follow the manifest
    assert_eq!(merged.weight, 5);
    assert!(merged.installed);
    assert!(!merged.active);
    // The module's own declarations are untouched
    assert_eq!(merged.version, "1.0.0");
    assert_eq!(merged.plugin_dependencies.len(), 1);

    // Admission slot is kept
    let names: Vec<&str> = store.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["a", "b"]);

    // Merging an unknown name admits it
    store.merge(PluginDescriptor::new("c", "0.1.0")).unwrap();
    assert_eq!(store.len(), 3);
}

#[test]
fn test_mark_installed() {
    let mut store = DescriptorStore::new();
    store.insert(PluginDescriptor::new("a", "1.0.0")).unwrap();
    assert!(!store.get("a").unwrap().installed);
    assert!(store.mark_installed("a"));
    assert!(store.get("a").unwrap().installed);
    assert!(!store.mark_installed("ghost"));
}
