// Require chain: can an identifier be built at all?

use crate::descriptor::TypeDescriptor;
use crate::error::{DiError, Result};
use crate::plugin::{Next, Plugin};
use std::sync::Arc;

pub mod priority {
    pub const REGISTERED: i32 = 100;
    pub const INSTANTIABLE: i32 = 50;
}

/// Subject of the require chain
#[derive(Debug, Clone)]
pub struct Requirement {
    pub id: String,
    pub descriptor: Option<Arc<TypeDescriptor>>,
}

impl Requirement {
    pub fn new(id: impl Into<String>, descriptor: Option<Arc<TypeDescriptor>>) -> Self {
        Self {
            id: id.into(),
            descriptor,
        }
    }
}

pub type RequireNext<'a> = Next<'a, Requirement, Arc<TypeDescriptor>>;

/// The identifier must have a descriptor
pub struct RegisteredRequirement;

impl Plugin<Requirement, Arc<TypeDescriptor>> for RegisteredRequirement {
    fn name(&self) -> &'static str {
        "registered"
    }

    fn handle(
        &self,
        requirement: &mut Requirement,
        next: RequireNext<'_>,
    ) -> Result<Arc<TypeDescriptor>> {
        if requirement.descriptor.is_none() {
            return Err(DiError::not_found(&requirement.id, "no type registered"));
        }
        next.run(requirement)
    }
}

/// The descriptor must name a concrete type with a constructor
pub struct InstantiableRequirement;

impl Plugin<Requirement, Arc<TypeDescriptor>> for InstantiableRequirement {
    fn name(&self) -> &'static str {
        "instantiable"
    }

    fn handle(
        &self,
        requirement: &mut Requirement,
        next: RequireNext<'_>,
    ) -> Result<Arc<TypeDescriptor>> {
        if let Some(descriptor) = &requirement.descriptor {
            if !descriptor.is_instantiable() {
                let reason = match descriptor.constructor_fn() {
                    Some(_) => format!("{} type is not instantiable", descriptor.kind().as_str()),
                    None => "type has no constructor".to_string(),
                };
                return Err(DiError::not_found(&requirement.id, reason));
            }
        }
        next.run(requirement)
    }
}

/// Terminal of the require chain: hand back the descriptor
pub fn accept(requirement: &mut Requirement) -> Result<Arc<TypeDescriptor>> {
    requirement
        .descriptor
        .clone()
        .ok_or_else(|| DiError::not_found(&requirement.id, "no type registered"))
}
