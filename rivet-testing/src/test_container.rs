// Test Container for Dependency Injection

use crate::spy::ConstructionSpy;
use rivet_core::{Container, ContainerBuilder, Instance, Result, TypeDescriptor};
use std::any::Any;
use std::sync::Arc;

/// Container whose registered types report their constructions to a spy
pub struct TestContainer {
    container: Container,
    spy: ConstructionSpy,
}

impl TestContainer {
    /// Create a new test container with the default chains
    pub fn new() -> Self {
        Self::from_builder(ContainerBuilder::new())
    }

    /// Build from a prepared builder; its types are instrumented first
    pub fn from_builder(mut builder: ContainerBuilder) -> Self {
        let spy = ConstructionSpy::new();

        let descriptors: Vec<_> = builder
            .types()
            .ids()
            .filter_map(|id| builder.types().get(id))
            .collect();
        for descriptor in descriptors {
            builder
                .registry_mut()
                .register(spy.instrument((*descriptor).clone()));
        }

        Self {
            container: builder.build(),
            spy,
        }
    }

    /// Register a type; its constructor is tracked by the spy
    pub fn register(&self, descriptor: TypeDescriptor) -> &Self {
        self.container.register_type(self.spy.instrument(descriptor));
        self
    }

    /// Register a ready-made replacement under `id`
    pub fn register_mock<T: Any + Send + Sync>(&self, id: &str, mock: T) -> Arc<T> {
        self.container.share_value(id, mock)
    }

    pub fn get(&self, id: &str) -> Result<Instance> {
        self.container.get(id)
    }

    pub fn get_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        self.container.get_as(id)
    }

    /// Number of times the constructor of `id` ran
    pub fn constructions(&self, id: &str) -> usize {
        self.spy.count(id)
    }

    pub fn spy(&self) -> &ConstructionSpy {
        &self.spy
    }

    /// Start over with an empty container and spy
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Get the underlying container
    pub fn inner(&self) -> &Container {
        &self.container
    }
}

impl Default for TestContainer {
    fn default() -> Self {
        Self::new()
    }
}
