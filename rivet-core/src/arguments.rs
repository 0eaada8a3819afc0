// Positional arguments handed to constructors and injection methods

use crate::error::{DiError, Result};
use crate::lazy::{Lazy, downcast_instance};
use crate::Instance;
use smallvec::SmallVec;
use std::any::Any;
use std::sync::Arc;

/// Resolved values in declared parameter order
#[derive(Clone)]
pub struct Arguments {
    owner: String,
    values: SmallVec<[Instance; 4]>,
}

impl Arguments {
    pub fn new(owner: impl Into<String>, values: impl IntoIterator<Item = Instance>) -> Self {
        Self {
            owner: owner.into(),
            values: values.into_iter().collect(),
        }
    }

    /// Identifier of the type (or `Type::method`) being invoked
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw instance at `index`
    pub fn instance(&self, index: usize) -> Result<Instance> {
        self.values
            .get(index)
            .cloned()
            .ok_or_else(|| DiError::MissingArgument {
                class: self.owner.clone(),
                index,
            })
    }

    /// Typed argument; a lazy proxy is forced
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
        let instance = self.instance(index)?;
        downcast_instance::<T>(&self.argument_label(index), instance)
    }

    /// Typed argument by value, for scalars and other cheap clones
    pub fn value<T: Any + Send + Sync + Clone>(&self, index: usize) -> Result<T> {
        self.get::<T>(index).map(|value| (*value).clone())
    }

    /// Typed handle that leaves a lazy proxy untouched until used
    pub fn lazy<T: Any + Send + Sync>(&self, index: usize) -> Result<Lazy<T>> {
        let instance = self.instance(index)?;
        Ok(Lazy::from_instance(self.argument_label(index), instance))
    }

    fn argument_label(&self, index: usize) -> String {
        format!("{}#{}", self.owner, index)
    }
}

impl std::fmt::Debug for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arguments")
            .field("owner", &self.owner)
            .field("len", &self.values.len())
            .finish()
    }
}
