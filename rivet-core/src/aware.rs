// Aware chain: post-construction method injection

use crate::arguments::Arguments;
use crate::context::Context;
use crate::descriptor::{AwareMethod, DeclaredType, Parameter};
use crate::error::{BoxError, DiError, Result};
use crate::lazy::LazyProxy;
use crate::logging::trace;
use crate::plugin::{Next, Plugin};
use crate::Instance;
use std::sync::Arc;

pub mod priority {
    pub const METHOD_INJECTOR: i32 = 0;
}

pub type AwareNext<'a> = Next<'a, Context, ()>;

fn injector_error(
    ctx: &Context,
    method: &AwareMethod,
    parameter: &str,
    reason: impl Into<String>,
    cause: Option<DiError>,
) -> DiError {
    DiError::Injector {
        class: ctx.id().to_string(),
        method: method.name().to_string(),
        parameter: parameter.to_string(),
        reason: reason.into(),
        cause: cause.map(Box::new),
    }
}

fn resolve_argument(ctx: &Context, method: &AwareMethod, parameter: &Parameter) -> Result<Instance> {
    match parameter.declared() {
        DeclaredType::Untyped => Err(injector_error(
            ctx,
            method,
            parameter.name(),
            "parameter has no type hint",
            None,
        )),
        DeclaredType::Builtin(builtin) => parameter.default_value().cloned().ok_or_else(|| {
            injector_error(
                ctx,
                method,
                parameter.name(),
                format!("built-in type {} has no default", builtin.as_str()),
                None,
            )
        }),
        DeclaredType::Named(declared) => ctx.get(declared).map_err(|err| {
            injector_error(
                ctx,
                method,
                parameter.name(),
                format!("cannot resolve {}", declared),
                Some(err),
            )
        }),
    }
}

/// Calls every [`AwareMethod`] of the built type with container-resolved arguments.
///
/// Lazy proxies are skipped: their methods run when the proxy is forced.
pub struct MethodInjector;

impl Plugin<Context, ()> for MethodInjector {
    fn name(&self) -> &'static str {
        "method-injector"
    }

    fn handle(&self, ctx: &mut Context, next: AwareNext<'_>) -> Result<()> {
        let deferred = ctx
            .instance()
            .is_some_and(|instance| instance.is::<LazyProxy>());
        let descriptor = ctx.descriptor().clone();
        if deferred || descriptor.aware_methods().is_empty() {
            return next.run(ctx);
        }

        for method in descriptor.aware_methods() {
            let values = method
                .parameters()
                .iter()
                .map(|parameter| resolve_argument(ctx, method, parameter))
                .collect::<Result<Vec<_>>>()?;

            trace!(id = ctx.id(), method = method.name(), "Invoking injection method");

            let owner = format!("{}::{}", ctx.id(), method.name());
            let method_error = |source: BoxError| DiError::InjectionMethod {
                class: descriptor.id().to_string(),
                method: method.name().to_string(),
                source,
            };
            let target = ctx
                .instance_mut()
                .and_then(Arc::get_mut)
                .ok_or_else(|| method_error("instance is no longer exclusively owned".into()))?;

            method
                .invoke(target, Arguments::new(owner, values))
                .map_err(method_error)?;
        }

        next.run(ctx)
    }
}

/// Terminal of the aware chain
pub fn done(_ctx: &mut Context) -> Result<()> {
    Ok(())
}
