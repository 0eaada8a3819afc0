// Construction tracking for registered types

use parking_lot::Mutex;
use rivet_core::{Arguments, BoxError, Instance, TypeDescriptor};
use std::collections::HashMap;
use std::sync::Arc;

/// Counts constructor invocations per identifier
#[derive(Clone, Default)]
pub struct ConstructionSpy {
    counts: Arc<Mutex<HashMap<String, usize>>>,
    order: Arc<Mutex<Vec<String>>>,
}

impl ConstructionSpy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the descriptor's constructor so each call is recorded.
    ///
    /// Descriptors without a constructor are returned unchanged.
    pub fn instrument(&self, descriptor: TypeDescriptor) -> TypeDescriptor {
        let Some(inner) = descriptor.constructor_fn().cloned() else {
            return descriptor;
        };

        let spy = self.clone();
        let id = descriptor.id().to_string();
        descriptor.with_raw_constructor(Arc::new(
            move |args: Arguments| -> Result<Instance, BoxError> {
                spy.record(&id);
                inner(args)
            },
        ))
    }

    /// Record a construction of `id`
    pub fn record(&self, id: &str) {
        *self.counts.lock().entry(id.to_string()).or_insert(0) += 1;
        self.order.lock().push(id.to_string());
    }

    pub fn count(&self, id: &str) -> usize {
        self.counts.lock().get(id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.order.lock().len()
    }

    pub fn was_constructed(&self, id: &str) -> bool {
        self.count(id) > 0
    }

    /// Identifiers in the order their constructors ran
    pub fn order(&self) -> Vec<String> {
        self.order.lock().clone()
    }

    pub fn reset(&self) {
        self.counts.lock().clear();
        self.order.lock().clear();
    }
}

impl std::fmt::Debug for ConstructionSpy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructionSpy")
            .field("counts", &*self.counts.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrumented_constructor_records_calls() {
        let spy = ConstructionSpy::new();
        let descriptor = spy.instrument(TypeDescriptor::concrete("Repo").constructor(|_| Ok(7_u8)));
        let constructor = descriptor.constructor_fn().unwrap();

        constructor(Arguments::new("Repo", Vec::new())).unwrap();
        constructor(Arguments::new("Repo", Vec::new())).unwrap();

        assert_eq!(spy.count("Repo"), 2);
        assert_eq!(spy.count("Other"), 0);
        assert_eq!(spy.order(), vec!["Repo", "Repo"]);
    }

    #[test]
    fn test_failed_construction_still_counted() {
        let spy = ConstructionSpy::new();
        let descriptor = spy.instrument(
            TypeDescriptor::concrete("Db").constructor::<(), _>(|_| Err("down".into())),
        );

        let constructor = descriptor.constructor_fn().unwrap();
        assert!(constructor(Arguments::new("Db", Vec::new())).is_err());
        assert!(spy.was_constructed("Db"));
    }

    #[test]
    fn test_interface_left_untouched() {
        let spy = ConstructionSpy::new();
        let descriptor = spy.instrument(TypeDescriptor::interface("LoggerInterface"));
        assert!(descriptor.constructor_fn().is_none());
    }

    #[test]
    fn test_reset() {
        let spy = ConstructionSpy::new();
        spy.record("A");
        spy.reset();
        assert_eq!(spy.total(), 0);
        assert!(!spy.was_constructed("A"));
    }
}
