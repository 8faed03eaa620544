//! Ambient, task-scoped context.
//!
//! A [`Context`] installed with [`run`] (async) or [`run_sync`] is visible
//! through [`current`] from anywhere inside that unit of work, without being
//! passed along explicitly. Contexts live on a per-thread stack: futures
//! wrapped by [`run`] push their payload at the start of every poll and pop
//! it when the poll returns, so tasks that interleave on the same thread
//! never observe each other's payload.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use ctxlog_core::Metadata;
use serde::Serialize;
use serde_json::Value;

pub mod future;
mod stack;

pub use future::{FutureExt, Scoped, spawn};
pub use stack::{ContextGuard, clear, current, depth, enter};

/// An immutable key/value payload bound to one logical task.
#[derive(Clone, Default, PartialEq)]
pub struct Context {
    fields: Arc<Metadata>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K, V>(self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Serialize + fmt::Debug,
    {
        let mut fields = Arc::unwrap_or_clone(self.fields);
        fields.insert(key, value);
        Self {
            fields: Arc::new(fields),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Metadata {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields.iter()).finish()
    }
}

impl Serialize for Context {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl From<Metadata> for Context {
    fn from(fields: Metadata) -> Self {
        Self {
            fields: Arc::new(fields),
        }
    }
}

impl From<Value> for Context {
    fn from(value: Value) -> Self {
        Self::from(Metadata::from(value))
    }
}

/// Runs `task` with `ctx` installed for every poll of it.
pub fn run<F>(ctx: impl Into<Context>, task: F) -> Scoped<F>
where
    F: Future,
{
    Scoped::new(ctx.into(), task)
}

/// Runs `f` with `ctx` installed; the previous context is restored afterwards,
/// also when `f` panics.
pub fn run_sync<R>(ctx: impl Into<Context>, f: impl FnOnce() -> R) -> R {
    let _guard = stack::enter_scoped(ctx.into());
    f()
}
