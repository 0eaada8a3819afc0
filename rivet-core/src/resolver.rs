//! Resolver chain: what value satisfies one constructor parameter.
//!
//! The chain runs once per parameter with the parameter stored on the
//! [`Context`] under [`attributes::PARAMETER`]. Default stages, highest
//! priority first:
//!
//! | Priority | Plugin | Decides by |
//! |---|---|---|
//! | 500 | [`BoundValueResolver`] | explicit `(type, parameter)` binding |
//! | 400 | [`ParameterPreferenceResolver`] | override declared on the parameter |
//! | 300 | [`ClassPreferenceResolver`] | preference table of the declaring type |
//! | 200 | [`InterfaceConventionResolver`] | `FooInterface` -> `Foo` |
//! | 100 | [`DirectTypeResolver`] | the declared type itself / built-in default |
//! | 50 | [`DefaultValueResolver`] | declared default of an optional dependency |
//!
//! If every stage delegates, [`unresolvable`] fails with
//! [`DiError::UnresolvableParameter`].

use crate::context::{Context, attributes};
use crate::descriptor::{DeclaredType, Parameter, TypeKind};
use crate::error::{DiError, Result};
use crate::logging::trace;
use crate::plugin::{Next, Plugin};
use crate::Instance;

/// Default priorities of the built-in resolvers
pub mod priority {
    pub const BOUND_VALUE: i32 = 500;
    pub const PARAMETER_PREFERENCE: i32 = 400;
    pub const CLASS_PREFERENCE: i32 = 300;
    pub const INTERFACE_CONVENTION: i32 = 200;
    pub const DIRECT_TYPE: i32 = 100;
    pub const DEFAULT_VALUE: i32 = 50;
}

pub type ResolverNext<'a> = Next<'a, Context, Instance>;

/// Resolve a preferred implementation after checking it fits the parameter
fn resolve_preferred(ctx: &Context, parameter: &Parameter, preferred: &str) -> Result<Instance> {
    let fits = match parameter.declared() {
        DeclaredType::Named(required) => ctx.container().satisfies(preferred, required),
        DeclaredType::Untyped => true,
        DeclaredType::Builtin(_) => false,
    };

    if !fits {
        return Err(DiError::MisconfiguredPreference {
            class: ctx.id().to_string(),
            parameter: parameter.name().to_string(),
            required: parameter.declared().to_string(),
            preferred: preferred.to_string(),
        });
    }

    trace!(
        class = ctx.id(),
        parameter = parameter.name(),
        implementation = preferred,
        "Resolving preferred implementation"
    );
    ctx.get(preferred)
}

/// Values bound explicitly with `Container::bind_parameter`
pub struct BoundValueResolver;

impl Plugin<Context, Instance> for BoundValueResolver {
    fn name(&self) -> &'static str {
        "bound-value"
    }

    fn handle(&self, ctx: &mut Context, next: ResolverNext<'_>) -> Result<Instance> {
        let parameter = ctx.current_parameter()?;
        match ctx.container().parameter_binding(ctx.id(), parameter.name()) {
            Some(value) => Ok(value),
            None => next.run(ctx),
        }
    }
}

/// Parameter-level "use this implementation" override
pub struct ParameterPreferenceResolver;

impl Plugin<Context, Instance> for ParameterPreferenceResolver {
    fn name(&self) -> &'static str {
        "parameter-preference"
    }

    fn handle(&self, ctx: &mut Context, next: ResolverNext<'_>) -> Result<Instance> {
        let parameter = ctx.current_parameter()?;
        match parameter.preference() {
            Some(preferred) => resolve_preferred(ctx, &parameter, preferred),
            None => next.run(ctx),
        }
    }
}

/// Preference table carried by the declaring type
pub struct ClassPreferenceResolver;

impl Plugin<Context, Instance> for ClassPreferenceResolver {
    fn name(&self) -> &'static str {
        "class-preference"
    }

    fn handle(&self, ctx: &mut Context, next: ResolverNext<'_>) -> Result<Instance> {
        let parameter = ctx.current_parameter()?;
        let preferred = parameter
            .declared()
            .named()
            .and_then(|declared| ctx.descriptor().preference_for(declared))
            .map(str::to_string);

        match preferred {
            Some(preferred) => resolve_preferred(ctx, &parameter, &preferred),
            None => next.run(ctx),
        }
    }
}

/// `LoggerInterface` resolves to a concrete `Logger` when one is registered
pub struct InterfaceConventionResolver;

impl InterfaceConventionResolver {
    fn candidate(ctx: &Context, declared: &str) -> Option<String> {
        let container = ctx.container();
        let stripped = declared.strip_suffix(container.interface_suffix())?;
        if stripped.is_empty() {
            return None;
        }

        // only interfaces, or names nobody registered at all
        let applies = match container.descriptor(declared) {
            Some(descriptor) => descriptor.kind() == TypeKind::Interface,
            None => true,
        };

        (applies && container.is_instantiable(stripped)).then(|| stripped.to_string())
    }
}

impl Plugin<Context, Instance> for InterfaceConventionResolver {
    fn name(&self) -> &'static str {
        "interface-convention"
    }

    fn handle(&self, ctx: &mut Context, next: ResolverNext<'_>) -> Result<Instance> {
        let parameter = ctx.current_parameter()?;
        let candidate = parameter
            .declared()
            .named()
            .and_then(|declared| Self::candidate(ctx, declared));

        match candidate {
            Some(concrete) => {
                trace!(
                    class = ctx.id(),
                    parameter = parameter.name(),
                    implementation = %concrete,
                    "Resolving by interface naming convention"
                );
                ctx.get(&concrete)
            }
            None => next.run(ctx),
        }
    }
}

/// Built-in default, or a container lookup of the declared type.
///
/// A not-found result from that lookup is parked on the context and the next
/// stage gets a chance; any other failure aborts the resolution.
pub struct DirectTypeResolver;

impl Plugin<Context, Instance> for DirectTypeResolver {
    fn name(&self) -> &'static str {
        "direct-type"
    }

    fn handle(&self, ctx: &mut Context, next: ResolverNext<'_>) -> Result<Instance> {
        let parameter = ctx.current_parameter()?;
        match parameter.declared() {
            DeclaredType::Builtin(_) => match parameter.default_value() {
                Some(value) => Ok(value.clone()),
                None => next.run(ctx),
            },
            DeclaredType::Named(declared) => match ctx.get(declared) {
                Ok(value) => Ok(value),
                Err(err) if err.is_not_found() => {
                    trace!(
                        class = ctx.id(),
                        parameter = parameter.name(),
                        error = %err,
                        "Direct lookup not found, trying next resolver"
                    );
                    ctx.set_attribute(attributes::SUPPRESSED, err);
                    next.run(ctx)
                }
                Err(err) => Err(err),
            },
            DeclaredType::Untyped => next.run(ctx),
        }
    }
}

/// Declared default for an optional dependency nothing else could provide
pub struct DefaultValueResolver;

impl Plugin<Context, Instance> for DefaultValueResolver {
    fn name(&self) -> &'static str {
        "default-value"
    }

    fn handle(&self, ctx: &mut Context, next: ResolverNext<'_>) -> Result<Instance> {
        let parameter = ctx.current_parameter()?;
        match parameter.default_value() {
            Some(value) => Ok(value.clone()),
            None => next.run(ctx),
        }
    }
}

/// Terminal of the resolver chain
pub fn unresolvable(ctx: &mut Context) -> Result<Instance> {
    let parameter = ctx.current_parameter()?;
    let cause = ctx.take_attribute::<DiError>(attributes::SUPPRESSED);
    Err(DiError::UnresolvableParameter {
        class: ctx.id().to_string(),
        parameter: parameter.name().to_string(),
        declared: parameter.declared().to_string(),
        cause: cause.map(Box::new),
    })
}
