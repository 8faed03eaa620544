use std::cell::RefCell;
use std::marker::PhantomData;

use crate::Context;

struct Entry {
    ctx: Context,
    id: u64,
    // owned by `run`/`run_sync`, which always pop it again
    scoped: bool,
}

#[derive(Default)]
struct Stack {
    entries: Vec<Entry>,
    next_id: u64,
}

thread_local! {
    static CONTEXT_STACK: RefCell<Stack> = RefCell::new(Stack::default());
}

/// Restores the previously installed context when dropped.
#[must_use = "the context is uninstalled as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    depth: usize,
    id: u64,
    _not_send: PhantomData<*const ()>,
}

/// Installs `ctx` on the calling thread until the returned guard is dropped.
///
/// Prefer [`crate::run`] in async code: a guard held across an `.await` would
/// leak the context into whatever else the thread polls in the meantime.
pub fn enter(ctx: impl Into<Context>) -> ContextGuard {
    push(ctx.into(), false)
}

pub(crate) fn enter_scoped(ctx: Context) -> ContextGuard {
    push(ctx, true)
}

fn push(ctx: Context, scoped: bool) -> ContextGuard {
    let (depth, id) = CONTEXT_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let depth = stack.entries.len();
        let id = stack.next_id;
        stack.next_id = stack.next_id.wrapping_add(1);
        stack.entries.push(Entry { ctx, id, scoped });
        (depth, id)
    });
    ContextGuard {
        depth,
        id,
        _not_send: PhantomData,
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let _ = CONTEXT_STACK.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.entries.get(self.depth).is_some_and(|e| e.id == self.id) {
                stack.entries.truncate(self.depth);
            }
        });
    }
}

/// The innermost non-empty context installed for the calling task.
pub fn current() -> Option<Context> {
    CONTEXT_STACK
        .try_with(|stack| stack.borrow().entries.last().map(|e| e.ctx.clone()))
        .ok()
        .flatten()
        .filter(|ctx| !ctx.is_empty())
}

/// Number of contexts installed on the calling thread.
pub fn depth() -> usize {
    CONTEXT_STACK
        .try_with(|stack| stack.borrow().entries.len())
        .unwrap_or(0)
}

/// Discards contexts left installed on the calling thread by [`enter`] guards
/// that were leaked or are still held.
///
/// Contexts owned by an enclosing [`crate::run`] or [`crate::run_sync`] stay in
/// place; only entries above the innermost of them are dropped. Guards for
/// discarded entries become no-ops.
pub fn clear() {
    let _ = CONTEXT_STACK.try_with(|stack| {
        let mut stack = stack.borrow_mut();
        let keep = stack
            .entries
            .iter()
            .rposition(|e| e.scoped)
            .map_or(0, |i| i + 1);
        stack.entries.truncate(keep);
    });
}
