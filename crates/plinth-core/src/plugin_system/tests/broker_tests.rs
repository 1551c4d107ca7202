#![cfg(test)]

use std::sync::Arc;

use crate::plugin_system::broker::SharedObjectRegistry;
use crate::plugin_system::traits::SharedObject;

fn object(value: &str) -> SharedObject {
    Arc::new(value.to_string())
}

#[test]
fn test_lookup_before_publish_is_none() {
    let registry = SharedObjectRegistry::new();
    assert!(registry.lookup("pages").is_none());
    assert!(!registry.contains("pages"));
    assert!(registry.is_empty());
}

#[test]
fn test_publish_then_lookup() {
    let mut registry = SharedObjectRegistry::new();
    registry.publish("pages", object("page index"));

    let found = registry.lookup("pages").expect("published object");
    let text = found.downcast_ref::<String>().expect("downcast to String");
    assert_eq!(text, "page index");
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_publish_overwrites_prior_publication() {
    let mut registry = SharedObjectRegistry::new();
    registry.publish("pages", object("first"));
    registry.publish("pages", object("second"));

    let found = registry.lookup("pages").unwrap();
    assert_eq!(found.downcast_ref::<String>().unwrap(), "second");
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_entries_are_independent_per_publisher() {
    let mut registry = SharedObjectRegistry::new();
    registry.publish("a", object("from a"));
    registry.publish("b", object("from b"));

    assert_eq!(
        registry.lookup("a").unwrap().downcast_ref::<String>().unwrap(),
        "from a"
    );
    assert_eq!(
        registry.lookup("b").unwrap().downcast_ref::<String>().unwrap(),
        "from b"
    );
}

#[test]
fn test_lookup_hands_out_clones_of_the_same_object() {
    let mut registry = SharedObjectRegistry::new();
    let original: SharedObject = Arc::new(42_i64);
    registry.publish("answer", original.clone());

    let first = registry.lookup("answer").unwrap();
    let second = registry.lookup("answer").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*first.downcast_ref::<i64>().unwrap(), 42);
}

#[test]
fn test_fresh_registries_are_isolated() {
    let mut one = SharedObjectRegistry::new();
    one.publish("pages", object("isolated"));
    let two = SharedObjectRegistry::new();
    assert!(two.lookup("pages").is_none());
}
