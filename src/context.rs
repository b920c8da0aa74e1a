//! The process-wide binding between threads and their current call stack.
//!
//! The binding lives in a [`ContextRegistry`] created in const context, so
//! there is nothing to initialize. A slot is created by the first
//! installation on a thread and removed when:
//!
//! - the thread exits, through a thread-local guard registered on first
//!   installation,
//! - [`CallStack::release_current`](crate::CallStack::release_current) is
//!   called,
//! - a decorated job finishes and its [`ScopedInstall`] puts the slot back the
//!   way it found it.

use std::thread::{self, AccessError, ThreadId};

use pannkaka_internals::{ContextRegistry, RawCallStack};
use triomphe::Arc;

use crate::Frame;

pub(crate) type Raw = RawCallStack<Frame>;

static CONTEXTS: ContextRegistry<Raw> = ContextRegistry::new();

/// Removes the owning thread's slot when the thread's locals are destroyed.
struct ExitGuard(ThreadId);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        if CONTEXTS.remove(self.0).is_some() {
            tracing::trace!(context = ?self.0, "released call stack on thread exit");
        }
    }
}

thread_local! {
    static EXIT_GUARD: ExitGuard = ExitGuard(thread::current().id());
}

pub(crate) fn current_context() -> ThreadId {
    thread::current().id()
}

/// Looks up the instance installed on the calling thread.
pub(crate) fn current() -> Option<Arc<Raw>> {
    CONTEXTS.get(current_context())
}

pub(crate) fn is_current(stack: &Arc<Raw>) -> bool {
    CONTEXTS.is_current(current_context(), stack)
}

/// Makes `stack` the calling thread's current instance and returns the one it
/// shadows.
///
/// The caller is responsible for binding `stack` first.
///
/// Fails without touching the registry if the thread's exit guard is already
/// gone, because nothing would remove the slot afterwards.
pub(crate) fn register(stack: Arc<Raw>) -> Result<Option<Arc<Raw>>, AccessError> {
    // Touching the guard registers its destructor.
    EXIT_GUARD.try_with(|_| ())?;
    Ok(CONTEXTS.replace(current_context(), stack))
}

pub(crate) fn release() -> Option<Arc<Raw>> {
    CONTEXTS.remove(current_context())
}

pub(crate) fn for_each(f: impl FnMut(ThreadId, &Arc<Raw>)) {
    CONTEXTS.for_each(f);
}

/// Restores the calling thread's slot to its previous state when dropped.
///
/// Used around decorated jobs so that a snapshot installed on a pooled worker
/// does not outlive the job that needed it, even if the job panics.
pub(crate) struct ScopedInstall {
    context: ThreadId,
    previous: Option<Arc<Raw>>,
}

impl ScopedInstall {
    pub(crate) fn new(previous: Option<Arc<Raw>>) -> Self {
        Self {
            context: current_context(),
            previous,
        }
    }
}

impl Drop for ScopedInstall {
    fn drop(&mut self) {
        CONTEXTS.restore(self.context, self.previous.take());
    }
}
