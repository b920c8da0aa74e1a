use core::time::Duration;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};

use super::{Rejected, Scheduler};

/// The result of a submitted job can no longer arrive.
///
/// The job was dropped without running (for example by
/// [`Scheduler::shutdown_now`]), or it panicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("the submitted job was dropped before producing a result")]
pub struct JobLost;

/// A pending result of a job scheduled with [`SchedulerExt::submit`].
#[must_use = "dropping a `Submitted` discards the job's result"]
#[derive(Debug)]
pub struct Submitted<T> {
    receiver: Receiver<T>,
}

impl<T> Submitted<T> {
    /// Blocks until the job has produced its result.
    ///
    /// # Errors
    ///
    /// Fails with [`JobLost`] if the job will never produce a result.
    pub fn wait(self) -> Result<T, JobLost> {
        self.receiver.recv().map_err(|_| JobLost)
    }

    /// Blocks until the job has produced its result or `timeout` elapses.
    ///
    /// Returns `Ok(None)` on timeout, in which case the result can still be
    /// awaited again.
    ///
    /// # Errors
    ///
    /// Fails with [`JobLost`] if the job will never produce a result.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Option<T>, JobLost> {
        match self.receiver.recv_timeout(timeout) {
            Ok(value) => Ok(Some(value)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(JobLost),
        }
    }
}

/// Extension methods available on every [`Scheduler`].
pub trait SchedulerExt: Scheduler {
    /// Schedules a job that produces a value.
    ///
    /// # Errors
    ///
    /// Returns the wrapped job inside [`Rejected`] if the scheduler does not
    /// accept it.
    fn submit<T, F>(&self, job: F) -> Result<Submitted<T>, Rejected>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(1);
        self.execute(Box::new(move || {
            // The receiver may be gone if the caller lost interest.
            let _ = sender.send(job());
        }))?;
        Ok(Submitted { receiver })
    }
}

impl<S: Scheduler + ?Sized> SchedulerExt for S {}
