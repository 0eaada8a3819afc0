//! Deferred construction.
//!
//! A type registered as lazy is not built when it is resolved. The factory
//! chain hands out a [`LazyProxy`] instead, holding a thunk that runs the real
//! constructor (and the deferred injection pass) on first access. The result
//! is memoized: every later access observes the same instance.

use crate::error::{DiError, Result};
use crate::Instance;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) type Thunk = Box<dyn Fn() -> Result<Instance> + Send + Sync + 'static>;

/// Type-erased, memoizing placeholder for a not-yet-built instance
pub struct LazyProxy {
    id: String,
    cell: OnceCell<Instance>,
    init: Thunk,
}

impl LazyProxy {
    pub(crate) fn new(id: impl Into<String>, init: Thunk) -> Self {
        Self {
            id: id.into(),
            cell: OnceCell::new(),
            init,
        }
    }

    /// Identifier the proxy stands in for
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Build the real instance on first call; return the memoized one afterwards.
    ///
    /// A failed initialisation leaves the proxy empty, so the next call runs
    /// the thunk again.
    pub fn force(&self) -> Result<Instance> {
        self.cell
            .get_or_try_init(|| {
                crate::logging::debug!(id = %self.id, "Initializing lazy proxy");
                (self.init)()
            })
            .cloned()
            .map_err(|cause| DiError::LazyInitialization {
                id: self.id.clone(),
                cause: Box::new(cause),
            })
    }
}

impl fmt::Debug for LazyProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyProxy")
            .field("id", &self.id)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// Downcast a resolved instance, forcing it first if it is a lazy proxy.
pub(crate) fn downcast_instance<T: Any + Send + Sync>(id: &str, instance: Instance) -> Result<Arc<T>> {
    let mismatch = || DiError::TypeMismatch {
        id: id.to_string(),
        expected: std::any::type_name::<T>(),
    };

    match instance.downcast::<T>() {
        Ok(value) => Ok(value),
        Err(other) => match other.downcast::<LazyProxy>() {
            Ok(proxy) => proxy.force()?.downcast::<T>().map_err(|_| mismatch()),
            Err(_) => Err(mismatch()),
        },
    }
}

/// Typed handle to a possibly deferred instance.
///
/// Obtained from [`Arguments::lazy`](crate::Arguments::lazy) or
/// [`Container::get_lazy`](crate::Container::get_lazy). Holding one does not
/// build anything; [`Lazy::get`] does.
pub struct Lazy<T> {
    id: String,
    instance: Instance,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> Lazy<T> {
    pub(crate) fn from_instance(id: impl Into<String>, instance: Instance) -> Self {
        Self {
            id: id.into(),
            instance,
            _marker: PhantomData,
        }
    }

    /// Wrap an already built value
    pub fn ready(id: impl Into<String>, value: Arc<T>) -> Self {
        Self::from_instance(id, value)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// True once the underlying value exists
    pub fn is_initialized(&self) -> bool {
        match self.instance.downcast_ref::<LazyProxy>() {
            Some(proxy) => proxy.is_initialized(),
            None => true,
        }
    }

    pub fn get(&self) -> Result<Arc<T>> {
        downcast_instance::<T>(&self.id, self.instance.clone())
    }
}

impl<T> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            instance: self.instance.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("id", &self.id)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}
