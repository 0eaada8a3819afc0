//! Ordered interceptor chains.
//!
//! A [`PluginChain`] is a priority-sorted list of [`Plugin`]s over a subject.
//! Each plugin receives the subject and a [`Next`] cursor: it may return a
//! result straight away, or call [`Next::run`] to hand the subject to the rest
//! of the chain and post-process whatever comes back. When the cursor runs off
//! the end, the chain's terminal decides the outcome; a chain without a
//! terminal fails with [`DiError::NoHandler`] instead of returning an
//! ambiguous empty value.
//!
//! ```
//! use rivet_core::plugin::{Next, Plugin, PluginChain};
//! use rivet_core::Result;
//!
//! struct Double;
//!
//! impl Plugin<i32, i32> for Double {
//!     fn handle(&self, subject: &mut i32, next: Next<'_, i32, i32>) -> Result<i32> {
//!         Ok(next.run(subject)? * 2)
//!     }
//! }
//!
//! let mut chain = PluginChain::new("demo").with_terminal(|n: &mut i32| Ok(*n));
//! chain.register(Double, 0);
//! assert_eq!(chain.process(&mut 21).unwrap(), 42);
//! ```

use crate::error::{DiError, Result};
use std::sync::Arc;

/// One link in a chain of responsibility
pub trait Plugin<S, R>: Send + Sync {
    /// Name used in logs and introspection
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn handle(&self, subject: &mut S, next: Next<'_, S, R>) -> Result<R>;
}

/// Fallback run when every plugin delegated
pub type Terminal<S, R> = Arc<dyn Fn(&mut S) -> Result<R> + Send + Sync>;

struct Entry<S, R> {
    priority: i32,
    plugin: Arc<dyn Plugin<S, R>>,
}

impl<S, R> Clone for Entry<S, R> {
    fn clone(&self) -> Self {
        Self {
            priority: self.priority,
            plugin: self.plugin.clone(),
        }
    }
}

/// Cursor over the plugins that have not run yet
pub struct Next<'a, S, R> {
    chain: &'static str,
    remaining: &'a [Entry<S, R>],
    terminal: Option<&'a Terminal<S, R>>,
}

impl<'a, S, R> Next<'a, S, R> {
    /// Pass the subject to the next plugin, or to the terminal
    pub fn run(self, subject: &mut S) -> Result<R> {
        match self.remaining.split_first() {
            Some((head, rest)) => head.plugin.handle(
                subject,
                Next {
                    chain: self.chain,
                    remaining: rest,
                    terminal: self.terminal,
                },
            ),
            None => match self.terminal {
                Some(terminal) => terminal(subject),
                None => Err(DiError::NoHandler(self.chain)),
            },
        }
    }

    /// Plugins still ahead of this cursor
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

/// Priority-ordered interceptor list.
///
/// Higher priority runs first; equal priorities keep registration order.
pub struct PluginChain<S, R> {
    name: &'static str,
    entries: Vec<Entry<S, R>>,
    terminal: Option<Terminal<S, R>>,
}

impl<S, R> PluginChain<S, R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
            terminal: None,
        }
    }

    pub fn with_terminal<F>(mut self, terminal: F) -> Self
    where
        F: Fn(&mut S) -> Result<R> + Send + Sync + 'static,
    {
        self.terminal = Some(Arc::new(terminal));
        self
    }

    pub fn set_terminal(&mut self, terminal: Terminal<S, R>) {
        self.terminal = Some(terminal);
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn register<P>(&mut self, plugin: P, priority: i32)
    where
        P: Plugin<S, R> + 'static,
    {
        self.register_arc(Arc::new(plugin), priority);
    }

    pub fn register_arc(&mut self, plugin: Arc<dyn Plugin<S, R>>, priority: i32) {
        // insert after every entry with priority >= ours to keep buckets stable
        let position = self
            .entries
            .partition_point(|entry| entry.priority >= priority);
        self.entries.insert(position, Entry { priority, plugin });
    }

    /// Run the chain from its highest-priority plugin
    pub fn process(&self, subject: &mut S) -> Result<R> {
        Next {
            chain: self.name,
            remaining: &self.entries,
            terminal: self.terminal.as_ref(),
        }
        .run(subject)
    }

    /// Plugin names in execution order
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.plugin.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S, R> Clone for PluginChain<S, R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            entries: self.entries.clone(),
            terminal: self.terminal.clone(),
        }
    }
}

impl<S, R> std::fmt::Debug for PluginChain<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginChain")
            .field("name", &self.name)
            .field("plugins", &self.plugin_names())
            .field("has_terminal", &self.terminal.is_some())
            .finish()
    }
}
