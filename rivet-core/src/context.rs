//! Per-resolution state.
//!
//! One [`Context`] exists for each identifier being built. It carries the
//! target descriptor, the constructor arguments gathered so far, transient
//! attributes (the parameter currently being resolved, a swallowed not-found
//! error) and, once the factory stage ran, the produced instance.
//!
//! The [`ResolutionStack`] is shared by every context spawned from one
//! top-level `get` call and is what detects cycles.

use crate::container::Container;
use crate::descriptor::{Parameter, TypeDescriptor};
use crate::error::{DiError, Result};
use crate::Instance;
use smallvec::SmallVec;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Well-known attribute names
pub mod attributes {
    /// The [`Parameter`](crate::Parameter) the resolver chain is working on
    pub const PARAMETER: &str = "rivet.parameter";
    /// A not-found error swallowed by a resolver on its way to the next stage
    pub const SUPPRESSED: &str = "rivet.suppressed";
}

/// Identifiers currently being resolved within one top-level call
#[derive(Clone, Default)]
pub struct ResolutionStack {
    frames: Rc<RefCell<Vec<String>>>,
}

impl ResolutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `id`, failing with the full trail if it is already in flight.
    ///
    /// The returned frame pops `id` when dropped, so every exit path, error
    /// or not, leaves the stack as it found it.
    pub fn enter(&self, id: &str) -> Result<StackFrame> {
        let mut frames = self.frames.borrow_mut();
        if frames.iter().any(|frame| frame == id) {
            let mut trail = frames.clone();
            trail.push(id.to_string());
            return Err(DiError::CircularDependency {
                id: id.to_string(),
                trail,
            });
        }
        frames.push(id.to_string());
        Ok(StackFrame {
            stack: self.clone(),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.frames.borrow().iter().any(|frame| frame == id)
    }

    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn trail(&self) -> Vec<String> {
        self.frames.borrow().clone()
    }
}

impl std::fmt::Debug for ResolutionStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.frames.borrow().iter()).finish()
    }
}

/// Guard returned by [`ResolutionStack::enter`]
#[must_use = "dropping the frame pops the identifier immediately"]
pub struct StackFrame {
    stack: ResolutionStack,
}

impl Drop for StackFrame {
    fn drop(&mut self) {
        self.stack.frames.borrow_mut().pop();
    }
}

/// Mutable record for one identifier being built
pub struct Context {
    id: String,
    descriptor: Arc<TypeDescriptor>,
    dependencies: SmallVec<[Instance; 4]>,
    attributes: HashMap<String, Box<dyn Any + Send + Sync>>,
    instance: Option<Instance>,
    container: Container,
    stack: ResolutionStack,
}

impl Context {
    pub fn new(
        id: impl Into<String>,
        descriptor: Arc<TypeDescriptor>,
        container: Container,
        stack: ResolutionStack,
    ) -> Self {
        Self {
            id: id.into(),
            descriptor,
            dependencies: SmallVec::new(),
            attributes: HashMap::new(),
            instance: None,
            container,
            stack,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn stack(&self) -> &ResolutionStack {
        &self.stack
    }

    /// Resolve another identifier as part of this resolution
    pub fn get(&self, id: &str) -> Result<Instance> {
        self.container.resolve_within(id, &self.stack)
    }

    pub fn dependencies(&self) -> &[Instance] {
        &self.dependencies
    }

    pub fn push_dependency(&mut self, value: Instance) {
        self.dependencies.push(value);
    }

    pub fn set_attribute<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.attributes.insert(name.into(), Box::new(value));
    }

    pub fn attribute<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.attributes.get(name)?.downcast_ref::<T>()
    }

    /// Remove an attribute, returning it if it had type `T`
    pub fn take_attribute<T: Any + Send + Sync>(&mut self, name: &str) -> Option<T> {
        let value = self.attributes.remove(name)?;
        value.downcast::<T>().ok().map(|boxed| *boxed)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// The parameter currently being resolved
    pub fn current_parameter(&self) -> Result<Parameter> {
        self.attribute::<Parameter>(attributes::PARAMETER)
            .cloned()
            .ok_or(DiError::NoHandler("resolver"))
    }

    pub(crate) fn begin_parameter(&mut self, parameter: &Parameter) {
        self.attributes.remove(attributes::SUPPRESSED);
        self.set_attribute(attributes::PARAMETER, parameter.clone());
    }

    pub(crate) fn end_parameters(&mut self) {
        self.attributes.remove(attributes::PARAMETER);
        self.attributes.remove(attributes::SUPPRESSED);
    }

    pub fn instance(&self) -> Option<&Instance> {
        self.instance.as_ref()
    }

    pub(crate) fn instance_mut(&mut self) -> Option<&mut Instance> {
        self.instance.as_mut()
    }

    /// Store the factory result; set once per resolution
    pub(crate) fn set_instance(&mut self, instance: Instance) {
        debug_assert!(self.instance.is_none(), "instance produced twice for {}", self.id);
        self.instance = Some(instance);
    }

    /// Swap the produced instance, e.g. for the cached winner of a race
    pub fn replace_instance(&mut self, instance: Instance) -> Option<Instance> {
        self.instance.replace(instance)
    }

    pub(crate) fn into_instance(self) -> Result<Instance> {
        let id = self.id;
        self.instance.ok_or(DiError::NoFactory(id))
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies.len())
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .field("has_instance", &self.instance.is_some())
            .field("stack", &self.stack)
            .finish()
    }
}
