// Rivet - a plugin-pipelined dependency injection container
//
// Every resolution runs through prioritized chains of interceptors: require,
// resolver (one pass per constructor parameter), factory, aware and lifecycle.

// Re-export core functionality
pub use rivet_core::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use rivet_config;

#[cfg(feature = "testing")]
pub use rivet_testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use rivet_core::{
        Arguments, AwareMethod, Builtin, Container, ContainerBuilder, ContainerRef, Context,
        DiError, Instance, Lazy, Next, Parameter, Plugin, Result, TypeDescriptor,
    };

    #[cfg(feature = "config")]
    pub use rivet_config::{ConfigLoader, ContainerConfig, FileFormat};
}
