//! Type descriptors.
//!
//! Rust has no runtime reflection, so every type the container can build is
//! described up front by a [`TypeDescriptor`]: its kind, the abstractions it
//! satisfies, its constructor parameters in declaration order, the metadata
//! that steers resolution (preferences, shared/lazy flags) and any
//! post-construction injection methods.
//!
//! ```
//! use rivet_core::{Parameter, TypeDescriptor};
//!
//! struct Repository;
//! struct Service {
//!     repo: std::sync::Arc<Repository>,
//! }
//!
//! let repo = TypeDescriptor::concrete("Repository").constructor(|_| Ok(Repository));
//! let service = TypeDescriptor::concrete("Service")
//!     .parameter(Parameter::service("repo", "Repository"))
//!     .constructor(|args| Ok(Service { repo: args.get::<Repository>(0)? }));
//!
//! assert!(repo.is_instantiable());
//! assert_eq!(service.parameters().len(), 1);
//! ```

use crate::arguments::Arguments;
use crate::error::BoxError;
use crate::Instance;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What sort of type a descriptor names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Concrete,
    Abstract,
    Interface,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Concrete => "concrete",
            TypeKind::Abstract => "abstract",
            TypeKind::Interface => "interface",
        }
    }
}

/// Built-in scalar/pseudo types a parameter may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Bool,
    Int,
    Float,
    String,
    Array,
    Callable,
    Mixed,
}

impl Builtin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Builtin::Bool => "bool",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::String => "string",
            Builtin::Array => "array",
            Builtin::Callable => "callable",
            Builtin::Mixed => "mixed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(Builtin::Bool),
            "int" => Some(Builtin::Int),
            "float" => Some(Builtin::Float),
            "string" => Some(Builtin::String),
            "array" => Some(Builtin::Array),
            "callable" => Some(Builtin::Callable),
            "mixed" => Some(Builtin::Mixed),
            _ => None,
        }
    }
}

/// Declared type of a parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    Builtin(Builtin),
    /// Identifier of a registered (or conventionally derivable) type
    Named(String),
    /// No type hint at all
    Untyped,
}

impl DeclaredType {
    /// Parse a type name; built-in names map to [`DeclaredType::Builtin`].
    pub fn parse(name: &str) -> Self {
        if name.is_empty() {
            return DeclaredType::Untyped;
        }
        match Builtin::from_name(name) {
            Some(builtin) => DeclaredType::Builtin(builtin),
            None => DeclaredType::Named(name.to_string()),
        }
    }

    pub fn named(&self) -> Option<&str> {
        match self {
            DeclaredType::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Builtin(builtin) => f.write_str(builtin.as_str()),
            DeclaredType::Named(name) => f.write_str(name),
            DeclaredType::Untyped => f.write_str("(untyped)"),
        }
    }
}

/// One constructor (or injection method) parameter
#[derive(Clone)]
pub struct Parameter {
    name: String,
    declared: DeclaredType,
    default: Option<Instance>,
    preference: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, declared: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared,
            default: None,
            preference: None,
        }
    }

    /// Parameter typed with a class or interface identifier
    pub fn service(name: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self::new(name, DeclaredType::Named(type_id.into()))
    }

    pub fn builtin(name: impl Into<String>, builtin: Builtin) -> Self {
        Self::new(name, DeclaredType::Builtin(builtin))
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, DeclaredType::Untyped)
    }

    /// Declare a default value
    pub fn with_default<T: Any + Send + Sync>(self, value: T) -> Self {
        self.with_default_instance(Arc::new(value))
    }

    pub fn with_default_instance(mut self, value: Instance) -> Self {
        self.default = Some(value);
        self
    }

    /// Parameter-level override: always resolve this implementation
    pub fn prefer(mut self, implementation: impl Into<String>) -> Self {
        self.preference = Some(implementation.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared(&self) -> &DeclaredType {
        &self.declared
    }

    pub fn default_value(&self) -> Option<&Instance> {
        self.default.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn preference(&self) -> Option<&str> {
        self.preference.as_deref()
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("declared", &self.declared)
            .field("has_default", &self.default.is_some())
            .field("preference", &self.preference)
            .finish()
    }
}

/// Type-erased constructor
pub type Constructor =
    Arc<dyn Fn(Arguments) -> Result<Instance, BoxError> + Send + Sync + 'static>;

type InjectFn = Arc<
    dyn Fn(&mut (dyn Any + Send + Sync), Arguments) -> Result<(), BoxError> + Send + Sync + 'static,
>;

/// A post-construction injection method ("aware" hook).
///
/// Runs once on the freshly built instance, before it can be shared, with its
/// own parameters resolved through the container.
#[derive(Clone)]
pub struct AwareMethod {
    name: String,
    parameters: Vec<Parameter>,
    invoke: InjectFn,
}

impl AwareMethod {
    pub fn new<T, F>(name: impl Into<String>, parameters: Vec<Parameter>, method: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&mut T, Arguments) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let invoke: InjectFn = Arc::new(
            move |target: &mut (dyn Any + Send + Sync), args: Arguments| -> Result<(), BoxError> {
                let target = target
                    .downcast_mut::<T>()
                    .ok_or_else(|| format!("instance is not a {}", std::any::type_name::<T>()))?;
                method(target, args)
            },
        );
        Self {
            name: name.into(),
            parameters,
            invoke,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub(crate) fn invoke(
        &self,
        target: &mut (dyn Any + Send + Sync),
        args: Arguments,
    ) -> Result<(), BoxError> {
        (self.invoke)(target, args)
    }
}

impl fmt::Debug for AwareMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwareMethod")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Registration record for one type
#[derive(Clone)]
pub struct TypeDescriptor {
    id: String,
    kind: TypeKind,
    rust_type: Option<&'static str>,
    implements: Vec<String>,
    parameters: Vec<Parameter>,
    constructor: Option<Constructor>,
    preferences: HashMap<String, String>,
    shared_marker: bool,
    shared: Option<bool>,
    lazy: bool,
    aware: Vec<AwareMethod>,
}

impl TypeDescriptor {
    fn with_kind(id: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            rust_type: None,
            implements: Vec::new(),
            parameters: Vec::new(),
            constructor: None,
            preferences: HashMap::new(),
            shared_marker: false,
            shared: None,
            lazy: false,
            aware: Vec::new(),
        }
    }

    pub fn concrete(id: impl Into<String>) -> Self {
        Self::with_kind(id, TypeKind::Concrete)
    }

    pub fn abstract_type(id: impl Into<String>) -> Self {
        Self::with_kind(id, TypeKind::Abstract)
    }

    pub fn interface(id: impl Into<String>) -> Self {
        Self::with_kind(id, TypeKind::Interface)
    }

    /// Declare an interface or parent this type satisfies
    pub fn implements(mut self, abstraction: impl Into<String>) -> Self {
        self.implements.push(abstraction.into());
        self
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn parameters_from(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Set a typed constructor; arguments arrive in parameter order.
    pub fn constructor<T, F>(mut self, build: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.rust_type = Some(std::any::type_name::<T>());
        self.constructor = Some(Arc::new(move |args: Arguments| {
            build(args).map(|value| Arc::new(value) as Instance)
        }));
        self
    }

    /// Replace the constructor with an already type-erased one
    pub fn with_raw_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Class-level preference: parameters declaring `declared` get `implementation`
    pub fn prefer(mut self, declared: impl Into<String>, implementation: impl Into<String>) -> Self {
        self.preferences.insert(declared.into(), implementation.into());
        self
    }

    /// Capability marker: instances are shared unless the flag says otherwise
    pub fn shared_marker(mut self) -> Self {
        self.shared_marker = true;
        self
    }

    /// Declarative shared flag; authoritative over the marker
    pub fn shared_flag(mut self, shared: bool) -> Self {
        self.shared = Some(shared);
        self
    }

    pub fn shared(self) -> Self {
        self.shared_flag(true)
    }

    pub fn prototype(self) -> Self {
        self.shared_flag(false)
    }

    /// Construct behind a [`LazyProxy`](crate::LazyProxy) until first use
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    pub fn aware(mut self, method: AwareMethod) -> Self {
        self.aware.push(method);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Rust type produced by the constructor, when set through [`Self::constructor`]
    pub fn rust_type(&self) -> Option<&'static str> {
        self.rust_type
    }

    pub fn implemented(&self) -> &[String] {
        &self.implements
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn constructor_fn(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }

    pub fn preferences(&self) -> &HashMap<String, String> {
        &self.preferences
    }

    pub fn preference_for(&self, declared: &str) -> Option<&str> {
        self.preferences.get(declared).map(String::as_str)
    }

    pub fn is_shared(&self) -> bool {
        self.shared.unwrap_or(self.shared_marker)
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    pub fn aware_methods(&self) -> &[AwareMethod] {
        &self.aware
    }

    pub fn is_instantiable(&self) -> bool {
        self.kind == TypeKind::Concrete && self.constructor.is_some()
    }

    /// Override the shared flag; `None` leaves it untouched
    pub fn set_shared_flag(&mut self, shared: Option<bool>) {
        if shared.is_some() {
            self.shared = shared;
        }
    }

    pub fn set_lazy(&mut self, lazy: bool) {
        self.lazy = lazy;
    }

    pub fn insert_preference(&mut self, declared: String, implementation: String) {
        self.preferences.insert(declared, implementation);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("rust_type", &self.rust_type)
            .field("implements", &self.implements)
            .field("parameters", &self.parameters)
            .field("has_constructor", &self.constructor.is_some())
            .field("preferences", &self.preferences)
            .field("shared", &self.is_shared())
            .field("lazy", &self.lazy)
            .field("aware", &self.aware)
            .finish()
    }
}
