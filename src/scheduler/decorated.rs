use core::{fmt, time::Duration};

use super::{Job, Rejected, Scheduler};
use crate::CallStack;

/// A [`Scheduler`] that runs every job with a snapshot of a call stack
/// installed.
///
/// Created by [`CallStack::decorate`]. For each job passed to
/// [`execute`](Scheduler::execute):
///
/// 1. the decorating stack is [`split`](CallStack::split) on the submitting
///    thread, before the job is handed to the inner scheduler;
/// 2. when the inner scheduler runs the job, the snapshot is installed on the
///    executing thread and becomes its current stack;
/// 3. when the job returns (or panics), the executing thread's previous
///    current stack is put back.
///
/// Jobs submitted at different times get independent snapshots of the frames
/// present at their submission, whatever order they end up running in. The
/// last step keeps a pooled worker from handing one job's snapshot to the next
/// job it runs.
///
/// All other operations are forwarded to the inner scheduler unchanged.
/// [`shutdown_now`](Scheduler::shutdown_now) returns the wrapped jobs, which
/// still install their snapshot when run.
pub struct Decorated<S> {
    stack: CallStack,
    inner: S,
}

impl<S> Decorated<S> {
    pub(crate) fn new(stack: CallStack, inner: S) -> Self {
        Self { stack, inner }
    }

    /// Returns the call stack that is snapshotted on every submission.
    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    /// Returns the wrapped scheduler.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwraps the scheduler.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Scheduler> Scheduler for Decorated<S> {
    fn execute(&self, job: Job) -> Result<(), Rejected> {
        let snapshot = self.stack.split();
        tracing::trace!(frames = snapshot.len(), "snapshotted call stack for job");

        self.inner.execute(Box::new(move || {
            let _scope = match snapshot.install_scoped() {
                Ok(scope) => Some(scope),
                Err(error) => {
                    tracing::error!(%error, "failed to install call stack snapshot for job");
                    None
                }
            };
            job();
        }))
    }

    fn shutdown(&self) {
        self.inner.shutdown();
    }

    fn shutdown_now(&self) -> Vec<Job> {
        self.inner.shutdown_now()
    }

    fn is_shutdown(&self) -> bool {
        self.inner.is_shutdown()
    }

    fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        self.inner.await_termination(timeout)
    }
}

impl<S: fmt::Debug> fmt::Debug for Decorated<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorated")
            .field("stack", &self.stack)
            .field("inner", &self.inner)
            .finish()
    }
}
