//! The per-instance call stack state machine.
//!
//! A [`RawCallStack`] goes through two orthogonal transitions:
//!
//! - `Unbound → Installed`, recorded by [`RawCallStack::bind`]. The owner is a
//!   set-once cell, so an instance is bound to at most one thread in its
//!   lifetime.
//! - `Unlocked → Locked`, recorded by [`RawCallStack::lock_and_snapshot`]. The
//!   flag is never cleared.
//!
//! # Mutation checks
//!
//! [`push`](RawCallStack::push) and [`pop`](RawCallStack::pop) run the
//! following checks, in order, while holding the frame mutex:
//!
//! 1. the instance is not locked ([`CallStackError::Locked`]),
//! 2. the instance has an owner ([`CallStackError::Unbound`]),
//! 3. the caller-supplied registry check passes ([`CallStackError::NotCurrent`]),
//! 4. the calling thread is the owner ([`CallStackError::ForeignThread`]).
//!
//! The registry check is a closure because this type does not know where it is
//! registered. A failed check returns before the frames are touched.

use std::{
    sync::{
        OnceLock,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, ThreadId},
};

use spin::Mutex;

use crate::CallStackError;

/// Frames, owner and lock flag of a single call stack instance.
///
/// Frames are appended and removed at the tail. [`snapshot`](Self::snapshot)
/// returns them in insertion order, which is the reverse of the order in which
/// [`pop`](Self::pop) returns them.
pub struct RawCallStack<F> {
    /// Frame sequence, oldest first.
    ///
    /// Every state transition that must be linearizable with respect to the
    /// frames (mutation, snapshot, locking) happens while this is held.
    frames: Mutex<Vec<F>>,
    /// The thread allowed to mutate this instance, once installed.
    owner: OnceLock<ThreadId>,
    /// Set by [`lock_and_snapshot`](Self::lock_and_snapshot), never cleared.
    locked: AtomicBool,
}

impl<F> RawCallStack<F> {
    /// Creates an unbound, unlocked instance without frames.
    #[must_use]
    pub const fn new() -> Self {
        Self::from_frames(Vec::new())
    }

    /// Creates an unbound, unlocked instance that takes ownership of `frames`.
    ///
    /// The last element of `frames` is the first one to be popped.
    #[must_use]
    pub const fn from_frames(frames: Vec<F>) -> Self {
        Self {
            frames: Mutex::new(frames),
            owner: OnceLock::new(),
            locked: AtomicBool::new(false),
        }
    }

    /// Records `context` as the owning thread.
    ///
    /// Fails if an owner has already been recorded, even if it is `context`
    /// itself.
    pub fn bind(&self, context: ThreadId) -> Result<(), CallStackError> {
        self.owner.set(context).map_err(|_| {
            let owner = self.owner.get().copied().unwrap_or(context);
            CallStackError::AlreadyInstalled { owner }
        })
    }

    /// Returns the owning thread, if the instance has been bound.
    pub fn owner(&self) -> Option<ThreadId> {
        self.owner.get().copied()
    }

    /// Returns `true` once the instance has been locked.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Returns the number of frames.
    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    /// Returns `true` if there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    /// Appends `frame` after running the mutation checks.
    ///
    /// `is_current` must return `true` if the calling thread's registry entry
    /// is this exact instance.
    pub fn push(&self, frame: F, is_current: impl FnOnce() -> bool) -> Result<(), CallStackError> {
        let mut frames = self.frames.lock();
        self.check_write(is_current)?;
        frames.push(frame);
        Ok(())
    }

    /// Removes and returns the newest frame after running the mutation checks.
    ///
    /// `is_current` has the same meaning as for [`push`](Self::push). An
    /// ownership failure takes precedence over [`CallStackError::Empty`].
    pub fn pop(&self, is_current: impl FnOnce() -> bool) -> Result<F, CallStackError> {
        let mut frames = self.frames.lock();
        self.check_write(is_current)?;
        frames.pop().ok_or(CallStackError::Empty)
    }

    /// Removes and returns the newest frame if `predicate` accepts it.
    ///
    /// Runs the same checks as [`pop`](Self::pop). The predicate sees the
    /// newest frame under the frame mutex; if it rejects it, `Ok(None)` is
    /// returned and the frames are unchanged.
    pub fn pop_if(
        &self,
        is_current: impl FnOnce() -> bool,
        predicate: impl FnOnce(&F) -> bool,
    ) -> Result<Option<F>, CallStackError> {
        let mut frames = self.frames.lock();
        self.check_write(is_current)?;
        let newest = frames.last().ok_or(CallStackError::Empty)?;
        if predicate(newest) {
            Ok(frames.pop())
        } else {
            Ok(None)
        }
    }

    fn check_write(&self, is_current: impl FnOnce() -> bool) -> Result<(), CallStackError> {
        if self.is_locked() {
            return Err(CallStackError::Locked);
        }
        let Some(&owner) = self.owner.get() else {
            return Err(CallStackError::Unbound);
        };
        if !is_current() {
            return Err(CallStackError::NotCurrent);
        }
        let caller = thread::current().id();
        if caller != owner {
            return Err(CallStackError::ForeignThread { owner, caller });
        }
        Ok(())
    }
}

impl<F: Clone> RawCallStack<F> {
    /// Copies the frames, oldest first.
    ///
    /// The copy is taken under the frame mutex and shares no storage with the
    /// instance. No ownership is required.
    pub fn snapshot(&self) -> Vec<F> {
        self.frames.lock().clone()
    }

    /// Locks the instance permanently and copies its frames.
    ///
    /// Both happen under the frame mutex, so no mutation can land between the
    /// copy and the lock.
    pub fn lock_and_snapshot(&self) -> Vec<F> {
        let frames = self.frames.lock();
        self.locked.store(true, Ordering::Release);
        frames.clone()
    }
}

impl<F> Default for RawCallStack<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: core::fmt::Debug> core::fmt::Debug for RawCallStack<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawCallStack")
            .field("frames", &*self.frames.lock())
            .field("owner", &self.owner())
            .field("locked", &self.is_locked())
            .finish()
    }
}
