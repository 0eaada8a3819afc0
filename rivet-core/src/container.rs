//! The dependency injection container.
//!
//! Each `get(id)` call walks a fixed sequence of stages:
//!
//! 1. **cycle check**: `id` is pushed on the call's [`ResolutionStack`];
//!    finding it already there fails with [`DiError::CircularDependency`].
//! 2. **cache**: the container itself and shared instances return at once.
//! 3. **require**: the require chain confirms `id` names an instantiable type.
//! 4. **resolve**: the resolver chain runs once per constructor parameter.
//! 5. **factory**: the factory chain builds the instance.
//! 6. **aware**: post-construction injection methods run.
//! 7. **lifecycle**: shared instances are cached.
//!
//! The stack frame is popped on every exit path, so a failed resolution never
//! leaves phantom entries behind.
//!
//! ```
//! use rivet_core::{Container, Parameter, TypeDescriptor};
//! use std::sync::Arc;
//!
//! struct Repository;
//! struct Service {
//!     repo: Arc<Repository>,
//! }
//!
//! let container = Container::builder()
//!     .register_type(TypeDescriptor::concrete("Repository").constructor(|_| Ok(Repository)))
//!     .register_type(
//!         TypeDescriptor::concrete("Service")
//!             .parameter(Parameter::service("repo", "Repository"))
//!             .constructor(|args| Ok(Service { repo: args.get::<Repository>(0)? })),
//!     )
//!     .build();
//!
//! let service = container.get_as::<Service>("Service").unwrap();
//! let _repo: &Repository = &service.repo;
//! ```

use crate::aware::{self, MethodInjector};
use crate::context::{Context, ResolutionStack};
use crate::descriptor::TypeDescriptor;
use crate::error::{DiError, Result};
use crate::factory::{self, LazyFactory, StandardFactory};
use crate::lazy::{Lazy, downcast_instance};
use crate::lifecycle::{self, SharedLifecycle};
use crate::logging::{debug, trace};
use crate::plugin::{Plugin, PluginChain};
use crate::registry::TypeRegistry;
use crate::require::{self, InstantiableRequirement, RegisteredRequirement, Requirement};
use crate::resolver::{
    self, BoundValueResolver, ClassPreferenceResolver, DefaultValueResolver, DirectTypeResolver,
    InterfaceConventionResolver, ParameterPreferenceResolver,
};
use crate::Instance;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Suffix stripped by the interface naming convention unless configured otherwise
pub const DEFAULT_INTERFACE_SUFFIX: &str = "Interface";

type Bindings = HashMap<String, HashMap<String, Instance>>;

struct Chains {
    resolvers: PluginChain<Context, Instance>,
    factories: PluginChain<Context, Instance>,
    injectors: PluginChain<Context, ()>,
    lifecycles: PluginChain<Context, ()>,
    requirements: PluginChain<Requirement, Arc<TypeDescriptor>>,
}

impl Chains {
    fn empty() -> Self {
        Self {
            resolvers: PluginChain::new("resolver").with_terminal(resolver::unresolvable),
            factories: PluginChain::new("factory").with_terminal(factory::no_factory),
            injectors: PluginChain::new("aware").with_terminal(aware::done),
            lifecycles: PluginChain::new("lifecycle").with_terminal(lifecycle::prototype),
            requirements: PluginChain::new("require").with_terminal(require::accept),
        }
    }

    fn with_defaults() -> Self {
        let mut chains = Self::empty();

        chains
            .resolvers
            .register(BoundValueResolver, resolver::priority::BOUND_VALUE);
        chains.resolvers.register(
            ParameterPreferenceResolver,
            resolver::priority::PARAMETER_PREFERENCE,
        );
        chains
            .resolvers
            .register(ClassPreferenceResolver, resolver::priority::CLASS_PREFERENCE);
        chains.resolvers.register(
            InterfaceConventionResolver,
            resolver::priority::INTERFACE_CONVENTION,
        );
        chains
            .resolvers
            .register(DirectTypeResolver, resolver::priority::DIRECT_TYPE);
        chains
            .resolvers
            .register(DefaultValueResolver, resolver::priority::DEFAULT_VALUE);

        chains.factories.register(LazyFactory, factory::priority::LAZY);
        chains
            .factories
            .register(StandardFactory, factory::priority::STANDARD);

        chains
            .injectors
            .register(MethodInjector, aware::priority::METHOD_INJECTOR);

        chains
            .lifecycles
            .register(SharedLifecycle, lifecycle::priority::SHARED);

        chains
            .requirements
            .register(RegisteredRequirement, require::priority::REGISTERED);
        chains
            .requirements
            .register(InstantiableRequirement, require::priority::INSTANTIABLE);

        chains
    }
}

struct ContainerState {
    registry: RwLock<TypeRegistry>,
    shared: RwLock<HashMap<String, Instance>>,
    bindings: RwLock<Bindings>,
    interface_suffix: String,
    chains: Chains,
}

/// The dependency injection container.
///
/// Cloning is cheap and yields a handle to the same registry and cache.
#[derive(Clone)]
pub struct Container {
    state: Arc<ContainerState>,
}

/// Non-owning handle to a [`Container`].
///
/// This is what the container's own identifier resolves to, so a shared
/// instance holding it does not keep the container (and its cache) alive.
#[derive(Clone)]
pub struct ContainerRef(Weak<ContainerState>);

impl ContainerRef {
    pub fn upgrade(&self) -> Option<Container> {
        self.0.upgrade().map(|state| Container { state })
    }

    /// The container, or [`DiError::ContainerDropped`] once it is gone
    pub fn container(&self) -> Result<Container> {
        self.upgrade().ok_or(DiError::ContainerDropped)
    }

    pub fn get(&self, id: &str) -> Result<Instance> {
        self.container()?.get(id)
    }

    pub fn get_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        self.container()?.get_as::<T>(id)
    }

    /// False once the container is dropped
    pub fn has(&self, id: &str) -> bool {
        self.upgrade().is_some_and(|container| container.has(id))
    }
}

impl std::fmt::Debug for ContainerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerRef")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}

impl Container {
    /// Identifier under which the container resolves to itself
    pub const SELF_ID: &'static str = "Container";

    /// Container with the default plugin chains and an empty registry
    pub fn new() -> Self {
        debug!("Creating new DI container");
        ContainerBuilder::new().build()
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub fn with_registry(registry: TypeRegistry) -> Self {
        ContainerBuilder::new().registry(registry).build()
    }

    /// Register (or replace) a type descriptor at runtime
    pub fn register_type(&self, descriptor: TypeDescriptor) {
        let id = descriptor.id().to_string();
        self.state.registry.write().register(descriptor);
        debug!(id = %id, "Type registered in DI container");
    }

    /// Resolve `id`, building it and its dependencies as needed
    pub fn get(&self, id: &str) -> Result<Instance> {
        let stack = ResolutionStack::new();
        self.resolve_within(id, &stack)
    }

    /// Resolve and downcast; a lazy proxy is forced
    pub fn get_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        downcast_instance::<T>(id, self.get(id)?)
    }

    /// Resolve without forcing a lazy proxy
    pub fn get_lazy<T: Any + Send + Sync>(&self, id: &str) -> Result<Lazy<T>> {
        Ok(Lazy::from_instance(id, self.get(id)?))
    }

    /// Whether `get(id)` can be expected to succeed.
    ///
    /// True for the container's own identifier, cached instances and any
    /// identifier the require chain accepts. Nothing is instantiated and
    /// probing errors are swallowed.
    pub fn has(&self, id: &str) -> bool {
        let found = id == Self::SELF_ID || self.cached(id).is_some() || self.require(id).is_ok();
        trace!(id, found, "Checked identifier");
        found
    }

    /// Register a pre-built shared instance, replacing any previous entry
    pub fn share(&self, id: impl Into<String>, instance: Instance) {
        let id = id.into();
        debug!(id = %id, "Shared instance registered manually");
        self.state.shared.write().insert(id, instance);
    }

    /// Typed [`Container::share`]; returns the shared handle
    pub fn share_value<T: Any + Send + Sync>(&self, id: impl Into<String>, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.share(id, value.clone());
        value
    }

    /// Drop a shared entry; the next `get` resolves afresh
    pub fn forget(&self, id: &str) -> Option<Instance> {
        self.state.shared.write().remove(id)
    }

    /// Identifiers currently held in the shared cache
    pub fn shared_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.state.shared.read().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Bind a value to one constructor parameter of one type
    pub fn bind_parameter(
        &self,
        class: impl Into<String>,
        parameter: impl Into<String>,
        value: Instance,
    ) {
        self.state
            .bindings
            .write()
            .entry(class.into())
            .or_default()
            .insert(parameter.into(), value);
    }

    pub fn bind_value<T: Any + Send + Sync>(
        &self,
        class: impl Into<String>,
        parameter: impl Into<String>,
        value: T,
    ) {
        self.bind_parameter(class, parameter, Arc::new(value));
    }

    pub fn parameter_binding(&self, class: &str, parameter: &str) -> Option<Instance> {
        self.state
            .bindings
            .read()
            .get(class)
            .and_then(|parameters| parameters.get(parameter))
            .cloned()
    }

    pub fn descriptor(&self, id: &str) -> Option<Arc<TypeDescriptor>> {
        self.state.registry.read().get(id)
    }

    pub fn is_instantiable(&self, id: &str) -> bool {
        self.state.registry.read().is_instantiable(id)
    }

    /// See [`TypeRegistry::satisfies`]
    pub fn satisfies(&self, implementation: &str, required: &str) -> bool {
        self.state.registry.read().satisfies(implementation, required)
    }

    pub fn interface_suffix(&self) -> &str {
        &self.state.interface_suffix
    }

    /// Snapshot of the registered type identifiers
    pub fn registered_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.state.registry.read().ids().map(String::from).collect();
        ids.sort_unstable();
        ids
    }

    /// Non-owning handle, the value behind [`Container::SELF_ID`]
    pub fn downgrade(&self) -> ContainerRef {
        ContainerRef(Arc::downgrade(&self.state))
    }

    /// Resolve `id` as part of an ongoing resolution tracked by `stack`
    pub(crate) fn resolve_within(&self, id: &str, stack: &ResolutionStack) -> Result<Instance> {
        let _frame = stack.enter(id)?;

        if id == Self::SELF_ID {
            return Ok(Arc::new(self.downgrade()));
        }

        if let Some(instance) = self.cached(id) {
            debug!(id, "Shared instance served from cache");
            return Ok(instance);
        }

        let depth = stack.depth();
        trace!(id, depth, "Resolving");
        let result = self.build(id, stack);

        match &result {
            Ok(_) => trace!(id, depth, "Resolved"),
            Err(err) if depth == 1 => debug!(id, error = %err, "Resolution failed"),
            Err(_) => {}
        }
        result
    }

    fn build(&self, id: &str, stack: &ResolutionStack) -> Result<Instance> {
        let chains = &self.state.chains;
        let descriptor = self.require(id)?;

        let mut ctx = Context::new(id, descriptor.clone(), self.clone(), stack.clone());
        for parameter in descriptor.parameters() {
            ctx.begin_parameter(parameter);
            let value = chains.resolvers.process(&mut ctx)?;
            ctx.push_dependency(value);
        }
        ctx.end_parameters();

        let instance = chains.factories.process(&mut ctx)?;
        ctx.set_instance(instance);

        chains.injectors.process(&mut ctx)?;
        chains.lifecycles.process(&mut ctx)?;

        ctx.into_instance()
    }

    fn require(&self, id: &str) -> Result<Arc<TypeDescriptor>> {
        let mut requirement = Requirement::new(id, self.descriptor(id));
        self.state.chains.requirements.process(&mut requirement)
    }

    fn cached(&self, id: &str) -> Option<Instance> {
        self.state.shared.read().get(id).cloned()
    }

    /// Cache a shared instance unless one is already there; returns the cached one
    pub(crate) fn cache_shared(&self, id: &str, instance: Instance) -> Instance {
        self.state
            .shared
            .write()
            .entry(id.to_string())
            .or_insert(instance)
            .clone()
    }

    /// Finish a lazily constructed instance: run the aware chain on it
    pub(crate) fn complete_deferred(
        &self,
        descriptor: &Arc<TypeDescriptor>,
        instance: Instance,
    ) -> Result<Instance> {
        let stack = ResolutionStack::new();
        let _frame = stack.enter(descriptor.id())?;

        let mut ctx = Context::new(descriptor.id(), descriptor.clone(), self.clone(), stack.clone());
        ctx.set_instance(instance);
        self.state.chains.injectors.process(&mut ctx)?;
        ctx.into_instance()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("types", &self.state.registry.read().len())
            .field("shared", &self.state.shared.read().len())
            .field("interface_suffix", &self.state.interface_suffix)
            .field("resolvers", &self.state.chains.resolvers)
            .field("factories", &self.state.chains.factories)
            .finish()
    }
}

impl std::fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("types", &self.registry.len())
            .field("shared", &self.shared.len())
            .field("interface_suffix", &self.interface_suffix)
            .field("resolvers", &self.chains.resolvers)
            .field("factories", &self.chains.factories)
            .finish()
    }
}

/// Assembles a [`Container`]: types, bindings, pre-shared instances and chains
pub struct ContainerBuilder {
    registry: TypeRegistry,
    shared: HashMap<String, Instance>,
    bindings: Bindings,
    interface_suffix: String,
    chains: Chains,
}

impl ContainerBuilder {
    /// Builder with the default plugins in every chain
    pub fn new() -> Self {
        Self::with_chains(Chains::with_defaults())
    }

    /// Builder whose chains hold only their terminals
    pub fn bare() -> Self {
        Self::with_chains(Chains::empty())
    }

    fn with_chains(chains: Chains) -> Self {
        Self {
            registry: TypeRegistry::new(),
            shared: HashMap::new(),
            bindings: HashMap::new(),
            interface_suffix: DEFAULT_INTERFACE_SUFFIX.to_string(),
            chains,
        }
    }

    pub fn registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Types registered so far
    pub fn types(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    pub fn register_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.registry.register(descriptor);
        self
    }

    pub fn interface_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.interface_suffix = suffix.into();
        self
    }

    pub fn share(mut self, id: impl Into<String>, instance: Instance) -> Self {
        self.shared.insert(id.into(), instance);
        self
    }

    pub fn share_value<T: Any + Send + Sync>(self, id: impl Into<String>, value: T) -> Self {
        self.share(id, Arc::new(value))
    }

    pub fn bind_parameter(
        mut self,
        class: impl Into<String>,
        parameter: impl Into<String>,
        value: Instance,
    ) -> Self {
        self.bindings
            .entry(class.into())
            .or_default()
            .insert(parameter.into(), value);
        self
    }

    pub fn bind_value<T: Any + Send + Sync>(
        self,
        class: impl Into<String>,
        parameter: impl Into<String>,
        value: T,
    ) -> Self {
        self.bind_parameter(class, parameter, Arc::new(value))
    }

    pub fn register_resolver<P>(mut self, plugin: P, priority: i32) -> Self
    where
        P: Plugin<Context, Instance> + 'static,
    {
        self.chains.resolvers.register(plugin, priority);
        self
    }

    pub fn register_factory<P>(mut self, plugin: P, priority: i32) -> Self
    where
        P: Plugin<Context, Instance> + 'static,
    {
        self.chains.factories.register(plugin, priority);
        self
    }

    pub fn register_aware<P>(mut self, plugin: P, priority: i32) -> Self
    where
        P: Plugin<Context, ()> + 'static,
    {
        self.chains.injectors.register(plugin, priority);
        self
    }

    pub fn register_lifecycle<P>(mut self, plugin: P, priority: i32) -> Self
    where
        P: Plugin<Context, ()> + 'static,
    {
        self.chains.lifecycles.register(plugin, priority);
        self
    }

    pub fn register_requirement<P>(mut self, plugin: P, priority: i32) -> Self
    where
        P: Plugin<Requirement, Arc<TypeDescriptor>> + 'static,
    {
        self.chains.requirements.register(plugin, priority);
        self
    }

    pub fn resolvers_mut(&mut self) -> &mut PluginChain<Context, Instance> {
        &mut self.chains.resolvers
    }

    pub fn factories_mut(&mut self) -> &mut PluginChain<Context, Instance> {
        &mut self.chains.factories
    }

    pub fn injectors_mut(&mut self) -> &mut PluginChain<Context, ()> {
        &mut self.chains.injectors
    }

    pub fn lifecycles_mut(&mut self) -> &mut PluginChain<Context, ()> {
        &mut self.chains.lifecycles
    }

    pub fn requirements_mut(&mut self) -> &mut PluginChain<Requirement, Arc<TypeDescriptor>> {
        &mut self.chains.requirements
    }

    pub fn build(self) -> Container {
        debug!(
            types = self.registry.len(),
            shared = self.shared.len(),
            resolvers = self.chains.resolvers.len(),
            "Building DI container"
        );
        Container {
            state: Arc::new(ContainerState {
                registry: RwLock::new(self.registry),
                shared: RwLock::new(self.shared),
                bindings: RwLock::new(self.bindings),
                interface_suffix: self.interface_suffix,
                chains: self.chains,
            }),
        }
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
