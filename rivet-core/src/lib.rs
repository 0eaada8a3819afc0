// Core of the Rivet dependency injection container
// Resolution runs through five plugin chains: require, resolve, factory, aware, lifecycle

use std::any::Any;
use std::sync::Arc;

pub mod arguments;
pub mod aware;
pub mod container;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod lazy;
pub mod lifecycle;
pub mod logging;
pub mod plugin;
pub mod registry;
pub mod require;
pub mod resolver;

/// A resolved value, shared and type-erased
pub type Instance = Arc<dyn Any + Send + Sync>;

// Re-export commonly used types
pub use arguments::Arguments;
pub use container::{Container, ContainerBuilder, ContainerRef, DEFAULT_INTERFACE_SUFFIX};
pub use context::{Context, ResolutionStack};
pub use descriptor::{
    AwareMethod, Builtin, Constructor, DeclaredType, Parameter, TypeDescriptor, TypeKind,
};
pub use error::{BoxError, DiError, Result};
pub use lazy::{Lazy, LazyProxy};
pub use lifecycle::Lifecycle;
pub use plugin::{Next, Plugin, PluginChain};
pub use registry::TypeRegistry;
pub use require::Requirement;
