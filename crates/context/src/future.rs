use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use tokio::task::JoinHandle;

use crate::Context;
use crate::stack::{current, enter_scoped};

/// A future that runs with a fixed context installed during each poll.
pub struct Scoped<F> {
    ctx: Context,
    inner: Pin<Box<F>>,
}

impl<F: Future> Scoped<F> {
    pub fn new(ctx: Context, inner: F) -> Self {
        Self {
            ctx,
            inner: Box::pin(inner),
        }
    }
}

impl<F: Future> Future for Scoped<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        let _guard = enter_scoped(this.ctx.clone());
        this.inner.as_mut().poll(cx)
    }
}

pub trait FutureExt: Future + Sized {
    fn with_context(self, ctx: impl Into<Context>) -> Scoped<Self> {
        Scoped::new(ctx.into(), self)
    }

    /// Binds the caller's current context (or an empty one) to this future.
    fn in_current_context(self) -> Scoped<Self> {
        Scoped::new(current().unwrap_or_default(), self)
    }
}

impl<F: Future> FutureExt for F {}

/// Spawns `task` on the tokio runtime, inheriting the caller's context.
pub fn spawn<F>(task: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(task.in_current_context())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{depth, run};

    #[tokio::test]
    async fn run_covers_awaited_continuations() {
        let seen = run(json!({"requestId": "r-1"}), async {
            tokio::task::yield_now().await;
            let first = current().and_then(|c| c.get("requestId").cloned());
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            let second = current().and_then(|c| c.get("requestId").cloned());
            (first, second)
        })
        .await;
        assert_eq!(seen.0, Some(json!("r-1")));
        assert_eq!(seen.1, Some(json!("r-1")));
        assert!(current().is_none());
        assert_eq!(depth(), 0);
    }

    #[tokio::test]
    async fn spawn_inherits_but_tokio_spawn_does_not() {
        run(json!({"requestId": "parent"}), async {
            let inherited = spawn(async { current().and_then(|c| c.get("requestId").cloned()) })
                .await
                .unwrap();
            assert_eq!(inherited, Some(json!("parent")));

            let detached = tokio::spawn(async { current() }).await.unwrap();
            assert!(detached.is_none());
        })
        .await;
    }

    #[tokio::test]
    async fn with_context_overrides_for_one_future() {
        let value = async { current().and_then(|c| c.get("k").cloned()) }
            .with_context(json!({"k": "v"}))
            .await;
        assert_eq!(value, Some(json!("v")));
    }
}
