// Type registry: the container's introspection facility

use crate::descriptor::TypeDescriptor;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Descriptors keyed by identifier, populated during bootstrap
#[derive(Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any previous one with the same id
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Option<Arc<TypeDescriptor>> {
        self.types
            .insert(descriptor.id().to_string(), Arc::new(descriptor))
    }

    pub fn get(&self, id: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    pub fn is_instantiable(&self, id: &str) -> bool {
        self.types
            .get(id)
            .is_some_and(|descriptor| descriptor.is_instantiable())
    }

    /// Edit a registered descriptor in place; false if `id` is unknown
    pub fn update<F>(&mut self, id: &str, edit: F) -> bool
    where
        F: FnOnce(&mut TypeDescriptor),
    {
        match self.types.get_mut(id) {
            Some(descriptor) => {
                edit(Arc::make_mut(descriptor));
                true
            }
            None => false,
        }
    }

    /// Whether `implementation` can stand in for `required`.
    ///
    /// Reflexive, and transitive over each descriptor's `implements` list.
    /// An unregistered implementation satisfies only itself.
    pub fn satisfies(&self, implementation: &str, required: &str) -> bool {
        if implementation == required {
            return true;
        }

        let mut seen = HashSet::new();
        let mut pending = vec![implementation];
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(descriptor) = self.types.get(current) else {
                continue;
            };
            for parent in descriptor.implemented() {
                if parent == required {
                    return true;
                }
                pending.push(parent);
            }
        }
        false
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&str> = self.ids().collect();
        ids.sort_unstable();
        f.debug_struct("TypeRegistry").field("types", &ids).finish()
    }
}
