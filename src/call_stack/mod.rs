//! The thread-affine diagnostic call stack.
//!
//! See [`CallStack`] for the ownership model and the available operations.

mod guard;
mod iter;

use core::fmt;
use std::thread::ThreadId;

pub use pannkaka_internals::CallStackError;
use triomphe::Arc;

pub use self::{guard::FrameGuard, iter::Iter};
use crate::{
    Frame,
    context::{self, Raw, ScopedInstall},
    description::{Adapted, Descriptive},
    formatter::StackFormatter,
    scheduler::{Decorated, Scheduler},
};

/// An ordered sequence of diagnostic frames owned by a single thread.
///
/// # Ownership
///
/// A call stack starts out *unbound*. [`install`](Self::install) binds it to
/// the calling thread for the rest of its life and makes it that thread's
/// current stack. From then on only that thread can [`push`](Self::push) and
/// [`pop`](Self::pop), and only while the stack is still its current one.
/// Every other combination fails with a [`CallStackError`] and leaves the
/// frames untouched.
///
/// [`CallStack::current`] returns the calling thread's stack, creating and
/// installing an empty one on first use.
///
/// # Handles and copies
///
/// `CallStack` is a handle: [`Clone`] produces another handle to the *same*
/// instance, with the same owner. To get an independent copy of the frames
/// use [`split`](Self::split), or [`migrate`](Self::migrate) to also lock the
/// source for good. Copies are unbound and must be installed before use, which
/// is usually done on the thread that receives them.
///
/// # Order
///
/// [`pop`](Self::pop) returns the newest frame first, while
/// [`iter`](Self::iter) yields the oldest frame first.
///
/// # Examples
///
/// ```
/// use pannkaka::CallStack;
///
/// let stack = CallStack::current();
/// stack.push("loading config").unwrap();
/// stack.push("parsing section [server]").unwrap();
///
/// let frames: Vec<String> = stack.iter().map(|frame| frame.to_string()).collect();
/// assert_eq!(frames, ["loading config", "parsing section [server]"]);
///
/// assert_eq!(stack.pop().unwrap().to_string(), "parsing section [server]");
/// assert_eq!(stack.pop().unwrap().to_string(), "loading config");
/// ```
///
/// Handing the context to another thread:
///
/// ```
/// use pannkaka::CallStack;
///
/// let stack = CallStack::empty();
/// stack.push("request #42").unwrap();
///
/// let handoff = stack.migrate();
/// let frame = std::thread::spawn(move || {
///     handoff.install().unwrap();
///     handoff.pop().unwrap().to_string()
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(frame, "request #42");
/// assert!(stack.push("too late").is_err());
/// ```
#[derive(Clone)]
pub struct CallStack {
    raw: Arc<Raw>,
}

impl CallStack {
    fn detached(frames: Vec<Frame>) -> Self {
        Self {
            raw: Arc::new(Raw::from_frames(frames)),
        }
    }

    /// Creates an empty call stack and installs it on the calling thread.
    ///
    /// The new stack shadows whatever stack the thread had installed before.
    pub fn empty() -> Self {
        let stack = Self::detached(Vec::new());
        if let Err(error) = stack.install() {
            tracing::error!(%error, "failed to install a new call stack");
        }
        stack
    }

    /// Returns the call stack installed on the calling thread, creating and
    /// installing an empty one if there is none.
    pub fn current() -> Self {
        match context::current() {
            Some(raw) => Self { raw },
            None => Self::empty(),
        }
    }

    /// Removes the calling thread's current call stack binding and returns
    /// the stack that was bound.
    ///
    /// Bindings are released automatically when a thread exits. Calling this
    /// earlier is useful on long-lived threads that are done with their
    /// diagnostic context. Calling it again returns `None`.
    ///
    /// The released stack keeps its owner, so it cannot be installed again;
    /// the next [`current`](Self::current) creates a new one.
    ///
    /// ```
    /// use pannkaka::CallStack;
    ///
    /// let stack = CallStack::empty();
    /// let released = CallStack::release_current().unwrap();
    /// assert!(released.ptr_eq(&stack));
    /// assert!(CallStack::release_current().is_none());
    /// ```
    pub fn release_current() -> Option<Self> {
        let raw = context::release()?;
        tracing::trace!(context = ?context::current_context(), "released call stack");
        Some(Self { raw })
    }

    /// Binds this stack to the calling thread and makes it the thread's
    /// current stack.
    ///
    /// # Errors
    ///
    /// Fails with [`CallStackError::AlreadyInstalled`] if the stack already has
    /// an owner, including when it was installed on this very thread.
    ///
    /// A thread that is already destroying its thread-locals has no slot left
    /// to install into. There the stack is bound but never becomes current.
    pub fn install(&self) -> Result<&Self, CallStackError> {
        let context = context::current_context();
        self.raw.bind(context)?;
        match context::register(self.raw.clone()) {
            Ok(_) => tracing::trace!(
                context = ?context,
                frames = self.raw.len(),
                "installed call stack"
            ),
            Err(_) => tracing::debug!(
                context = ?context,
                "thread is exiting; call stack left unregistered"
            ),
        }
        Ok(self)
    }

    /// Like [`install`](Self::install), but the previous binding of the
    /// calling thread comes back when the returned guard drops.
    pub(crate) fn install_scoped(&self) -> Result<ScopedInstall, CallStackError> {
        self.raw.bind(context::current_context())?;
        // An exiting thread keeps no slot, so there is nothing to restore.
        let previous = context::register(self.raw.clone()).unwrap_or_default();
        Ok(ScopedInstall::new(previous))
    }

    /// Pushes a frame.
    ///
    /// Anything convertible into a [`Frame`] is accepted: string slices and
    /// strings, [`StaticDescription`](crate::description::StaticDescription)
    /// and [`Adapted`].
    ///
    /// # Errors
    ///
    /// The checks run in this order and the first failure is returned:
    ///
    /// 1. [`CallStackError::Locked`] if the stack has been migrated,
    /// 2. [`CallStackError::Unbound`] if it has not been installed,
    /// 3. [`CallStackError::NotCurrent`] if it is not the calling thread's
    ///    current stack,
    /// 4. [`CallStackError::ForeignThread`] if the calling thread does not own
    ///    it.
    pub fn push(&self, frame: impl Into<Frame>) -> Result<(), CallStackError> {
        self.raw.push(frame.into(), || context::is_current(&self.raw))
    }

    /// Pushes a value that does not describe itself, rendered as
    /// `[TypeName] value`.
    ///
    /// ```
    /// use pannkaka::CallStack;
    ///
    /// let stack = CallStack::empty();
    /// stack.push_value(10).unwrap();
    /// assert_eq!(stack.pop().unwrap().to_string(), "[i32] 10");
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`push`](Self::push).
    pub fn push_value<T>(&self, value: T) -> Result<(), CallStackError>
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        self.push(Adapted::new(value))
    }

    /// Pushes the description of a [`Descriptive`] value.
    ///
    /// # Errors
    ///
    /// Same as [`push`](Self::push).
    pub fn push_descriptive<D>(&self, descriptive: &D) -> Result<(), CallStackError>
    where
        D: Descriptive + ?Sized,
    {
        self.push(descriptive.description())
    }

    /// Removes and returns the newest frame.
    ///
    /// # Errors
    ///
    /// Runs the same checks as [`push`](Self::push), then fails with
    /// [`CallStackError::Empty`] if there is no frame left.
    pub fn pop(&self) -> Result<Frame, CallStackError> {
        self.raw.pop(|| context::is_current(&self.raw))
    }

    /// Pops the newest frame only if it is `frame` itself.
    fn pop_exact(&self, frame: &Frame) -> Result<Option<Frame>, CallStackError> {
        self.raw.pop_if(|| context::is_current(&self.raw), |newest| newest.ptr_eq(frame))
    }

    /// Pushes a frame that is popped again when the returned guard drops.
    ///
    /// ```
    /// use pannkaka::CallStack;
    ///
    /// let stack = CallStack::empty();
    /// {
    ///     let _frame = stack.enter("connecting to database").unwrap();
    ///     assert_eq!(stack.len(), 1);
    /// }
    /// assert!(stack.is_empty());
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`push`](Self::push).
    pub fn enter(&self, frame: impl Into<Frame>) -> Result<FrameGuard<'_>, CallStackError> {
        let frame = frame.into();
        self.push(frame.clone())?;
        Ok(FrameGuard::new(self, frame))
    }

    /// Returns an independent, unbound copy of this stack.
    ///
    /// The copy holds the frames present at the time of the call. Later
    /// changes to either stack are invisible to the other. Any thread may split
    /// a stack, ownership is not required.
    pub fn split(&self) -> Self {
        Self::detached(self.raw.snapshot())
    }

    /// Locks this stack permanently and returns an unbound copy of it.
    ///
    /// After a migration no thread can push to or pop from this stack again,
    /// not even its owner. Use this for a one-shot handoff where exactly one
    /// thread should continue with the diagnostic context.
    pub fn migrate(&self) -> Self {
        let frames = self.raw.lock_and_snapshot();
        tracing::debug!(
            context = ?context::current_context(),
            frames = frames.len(),
            "migrated call stack; the source is now locked"
        );
        Self::detached(frames)
    }

    /// Wraps `scheduler` so that every job submitted through the wrapper runs
    /// with a snapshot of this stack installed.
    ///
    /// The snapshot is taken with [`split`](Self::split) when the job is
    /// submitted, not when it runs. Frames pushed after submission are not
    /// seen by the job, and frames the job pushes are not seen by this stack.
    ///
    /// See [`Decorated`] for details.
    pub fn decorate<S: Scheduler>(&self, scheduler: S) -> Decorated<S> {
        Decorated::new(self.clone(), scheduler)
    }

    /// Returns an iterator over a snapshot of the frames, oldest first.
    ///
    /// The snapshot is taken up front, so the iterator never observes
    /// mutations made while it is being consumed.
    pub fn iter(&self) -> Iter {
        Iter::new(self.raw.snapshot())
    }

    /// Returns the number of frames.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the stack has no frames.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the thread that owns this stack, if it has been installed.
    pub fn owner(&self) -> Option<ThreadId> {
        self.raw.owner()
    }

    /// Returns `true` if the stack has been installed on some thread.
    pub fn is_installed(&self) -> bool {
        self.owner().is_some()
    }

    /// Returns `true` if the stack has been locked by
    /// [`migrate`](Self::migrate).
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Returns `true` if this stack is the calling thread's current stack.
    pub fn is_current(&self) -> bool {
        context::is_current(&self.raw)
    }

    /// Returns `true` if both handles refer to the same instance.
    ///
    /// Structurally equal stacks are still different instances:
    ///
    /// ```
    /// use pannkaka::CallStack;
    ///
    /// let stack = CallStack::empty();
    /// assert!(stack.ptr_eq(&stack.clone()));
    /// assert!(!stack.ptr_eq(&stack.split()));
    /// ```
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.raw, &other.raw)
    }

    pub(crate) fn from_raw(raw: Arc<Raw>) -> Self {
        Self { raw }
    }
}

impl<'a> IntoIterator for &'a CallStack {
    type Item = Frame;
    type IntoIter = Iter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for CallStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        StackFormatter::from_env().format(&self.raw.snapshot(), f)
    }
}

impl fmt::Debug for CallStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallStack")
            .field("frames", &self.raw.snapshot())
            .field("owner", &self.owner())
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// Calls `f` with every thread that has a call stack installed, and that
/// stack.
///
/// This is a debugging aid.
///
/// # Warning
///
/// The internal registry is locked for reading while `f` runs. Installing or
/// releasing a call stack from inside `f`, on any thread that `f` waits for,
/// deadlocks. Reading the stacks is fine.
///
/// # Examples
///
/// ```
/// use pannkaka::{CallStack, debug_installed_stacks};
///
/// let stack = CallStack::current();
/// stack.push("serving").unwrap();
///
/// debug_installed_stacks(|thread, stack| {
///     println!("{thread:?}:\n{stack}");
/// });
/// ```
pub fn debug_installed_stacks(mut f: impl FnMut(ThreadId, &CallStack)) {
    context::for_each(|thread, raw| f(thread, &CallStack::from_raw(raw.clone())));
}
