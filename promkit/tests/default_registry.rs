use std::sync::Arc;

use promkit::{default_registry, set_default_registry, Counter, Error, Gauge, Registry};

#[test]
fn default_registry_can_only_be_replaced_before_first_use() {
    let registry = Arc::new(Registry::with_prefix("myapp").unwrap());
    set_default_registry(registry.clone()).unwrap();
    assert!(Arc::ptr_eq(&default_registry(), &registry));

    // Metrics that stay out of the default registry don't pin it.
    Gauge::builder("scratch", "Scratch space.").unregistered().build().unwrap();
    set_default_registry(registry.clone()).unwrap();

    let counter = Counter::builder("requests_total", "Requests served.").build().unwrap();
    counter.inc().unwrap();

    let families = registry.collect().unwrap();
    assert_eq!(families.len(), 1);
    assert_eq!(families[0].name, "myapp_requests_total");
    assert_eq!(families[0].samples[0].value, 1.0);

    assert!(matches!(set_default_registry(Registry::new()), Err(Error::DefaultRegistryInUse)));
    assert!(Arc::ptr_eq(&default_registry(), &registry));

    let err = Counter::builder("requests_total", "Requests served, again.").build().unwrap_err();
    assert!(matches!(err, Error::DuplicateName(name) if name == "requests_total"));
}
