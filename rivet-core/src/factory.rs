// Factory chain: how a fully resolved type is instantiated

use crate::arguments::Arguments;
use crate::context::Context;
use crate::descriptor::TypeDescriptor;
use crate::error::{DiError, Result};
use crate::lazy::LazyProxy;
use crate::logging::{debug, trace};
use crate::plugin::{Next, Plugin};
use crate::Instance;
use std::sync::Arc;

/// Default priorities of the built-in factories
pub mod priority {
    pub const LAZY: i32 = 100;
    pub const STANDARD: i32 = 0;
}

pub type FactoryNext<'a> = Next<'a, Context, Instance>;

/// Call the descriptor's constructor, wrapping any failure with the type id
pub(crate) fn construct(descriptor: &TypeDescriptor, dependencies: &[Instance]) -> Result<Instance> {
    let constructor = descriptor
        .constructor_fn()
        .ok_or_else(|| DiError::NoFactory(descriptor.id().to_string()))?;

    let expected = descriptor.parameters().len();
    if dependencies.len() != expected {
        return Err(DiError::Construction {
            type_id: descriptor.id().to_string(),
            source: format!(
                "expected {} argument(s), got {}",
                expected,
                dependencies.len()
            )
            .into(),
        });
    }

    let args = Arguments::new(descriptor.id(), dependencies.iter().cloned());
    constructor(args).map_err(|source| DiError::Construction {
        type_id: descriptor.id().to_string(),
        source,
    })
}

/// Defers construction behind a [`LazyProxy`] for types marked lazy
pub struct LazyFactory;

impl Plugin<Context, Instance> for LazyFactory {
    fn name(&self) -> &'static str {
        "lazy"
    }

    fn handle(&self, ctx: &mut Context, next: FactoryNext<'_>) -> Result<Instance> {
        let descriptor = ctx.descriptor().clone();
        if !descriptor.is_lazy() || !descriptor.is_instantiable() {
            return next.run(ctx);
        }

        let container = ctx.container().downgrade();
        let dependencies = ctx.dependencies().to_vec();
        debug!(id = ctx.id(), "Deferring construction behind lazy proxy");
        let proxy = LazyProxy::new(
            ctx.id(),
            Box::new(move || {
                let container = container.container()?;
                let instance = construct(&descriptor, &dependencies)?;
                container.complete_deferred(&descriptor, instance)
            }),
        );

        Ok(Arc::new(proxy))
    }
}

/// Invokes the constructor with the resolved dependencies, in declared order
pub struct StandardFactory;

impl Plugin<Context, Instance> for StandardFactory {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn handle(&self, ctx: &mut Context, next: FactoryNext<'_>) -> Result<Instance> {
        if ctx.descriptor().constructor_fn().is_none() {
            return next.run(ctx);
        }

        trace!(
            id = ctx.id(),
            arguments = ctx.dependencies().len(),
            "Invoking constructor"
        );
        construct(ctx.descriptor(), ctx.dependencies())
    }
}

/// Terminal of the factory chain
pub fn no_factory(ctx: &mut Context) -> Result<Instance> {
    Err(DiError::NoFactory(ctx.descriptor().id().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Parameter;

    #[test]
    fn test_construct_wraps_constructor_error() {
        let descriptor = TypeDescriptor::concrete("Db")
            .constructor::<(), _>(|_| Err("connection refused".into()));

        match construct(&descriptor, &[]) {
            Err(DiError::Construction { type_id, source }) => {
                assert_eq!(type_id, "Db");
                assert_eq!(source.to_string(), "connection refused");
            }
            other => panic!("unexpected: {:?}", other.err()),
        }
    }

    #[test]
    fn test_construct_checks_arity() {
        let descriptor = TypeDescriptor::concrete("Pair")
            .parameter(Parameter::untyped("a"))
            .parameter(Parameter::untyped("b"))
            .constructor(|_| Ok(()));

        let err = construct(&descriptor, &[Arc::new(1_u8) as Instance]).unwrap_err();
        assert!(err.to_string().contains("expected 2 argument(s), got 1"));
    }

    #[test]
    fn test_construct_without_constructor() {
        let descriptor = TypeDescriptor::interface("LoggerInterface");
        assert!(matches!(
            construct(&descriptor, &[]),
            Err(DiError::NoFactory(id)) if id == "LoggerInterface"
        ));
    }
}
