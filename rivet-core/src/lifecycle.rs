//! Lifecycle chain: whether a freshly built instance is reused.
//!
//! - **Shared** types are cached under their identifier; later `get` calls
//!   return the cached instance without touching any other chain.
//! - **Prototype** types (the default) are returned as built and never cached.
//!
//! A type is shared when its declarative flag says so, or, without a flag,
//! when it carries the shared capability marker:
//!
//! ```
//! use rivet_core::TypeDescriptor;
//!
//! assert!(TypeDescriptor::concrete("Config").shared_marker().is_shared());
//! assert!(!TypeDescriptor::concrete("Config").shared_marker().shared_flag(false).is_shared());
//! ```

use crate::context::Context;
use crate::error::{DiError, Result};
use crate::logging::debug;
use crate::plugin::{Next, Plugin};

pub mod priority {
    pub const SHARED: i32 = 100;
}

pub type LifecycleNext<'a> = Next<'a, Context, ()>;

/// Lifecycle mode of a resolved type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Shared,
    Prototype,
}

impl Lifecycle {
    pub fn of(ctx: &Context) -> Self {
        if ctx.descriptor().is_shared() {
            Lifecycle::Shared
        } else {
            Lifecycle::Prototype
        }
    }
}

/// Registers shared instances in the container's cache.
///
/// When two resolutions race, the first instance cached wins and the loser's
/// context is switched to it, so every caller observes the same object.
pub struct SharedLifecycle;

impl Plugin<Context, ()> for SharedLifecycle {
    fn name(&self) -> &'static str {
        "shared"
    }

    fn handle(&self, ctx: &mut Context, next: LifecycleNext<'_>) -> Result<()> {
        if Lifecycle::of(ctx) != Lifecycle::Shared {
            return next.run(ctx);
        }

        let instance = ctx
            .instance()
            .cloned()
            .ok_or_else(|| DiError::NoFactory(ctx.id().to_string()))?;
        let cached = ctx.container().cache_shared(ctx.id(), instance);
        debug!(id = ctx.id(), "Registered shared instance");
        ctx.replace_instance(cached);
        Ok(())
    }
}

/// Terminal of the lifecycle chain: prototype, nothing to do
pub fn prototype(_ctx: &mut Context) -> Result<()> {
    Ok(())
}
