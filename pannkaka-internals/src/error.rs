use std::thread::ThreadId;

/// A violated call stack invariant.
///
/// Every variant signals a logic bug in the calling code rather than a
/// transient fault, so there is nothing to retry. The operation that returned
/// the error did not modify the stack.
///
/// The variants are listed in the order the mutation checks run: a locked
/// stack reports [`Locked`](Self::Locked) even when it is also unbound or used
/// from the wrong thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum CallStackError {
    /// The stack already has an owning thread and cannot be installed again.
    ///
    /// Installation is not idempotent: installing twice on the same thread is
    /// reported too.
    #[error("cannot replace the owning thread of a call stack (owned by {owner:?})")]
    AlreadyInstalled {
        /// The thread the stack was originally installed on.
        owner: ThreadId,
    },

    /// The stack has not been installed on any thread yet.
    #[error("the call stack has not been associated with a thread")]
    Unbound,

    /// The calling thread's current call stack is a different instance.
    #[error("the call stack has not been associated with the current thread")]
    NotCurrent,

    /// The calling thread is not the thread that owns the stack.
    #[error("the calling thread {caller:?} does not own this call stack (owned by {owner:?})")]
    ForeignThread {
        /// The thread that owns the stack.
        owner: ThreadId,
        /// The thread that attempted the mutation.
        caller: ThreadId,
    },

    /// The stack was migrated away and no longer accepts mutation.
    #[error("cannot mutate a locked call stack")]
    Locked,

    /// There are no frames left to pop.
    #[error("cannot pop from an empty call stack")]
    Empty,
}

impl CallStackError {
    /// Returns `true` if the error was caused by mutating a stack from a
    /// context that does not own it.
    ///
    /// This groups [`NotCurrent`](Self::NotCurrent) and
    /// [`ForeignThread`](Self::ForeignThread), which are redundant under
    /// correct usage but can diverge when one thread holds more than one
    /// installed instance.
    pub fn is_foreign_context(&self) -> bool {
        matches!(self, Self::NotCurrent | Self::ForeignThread { .. })
    }
}
