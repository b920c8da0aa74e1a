//! The work-scheduling capability and the call stack decorator around it.
//!
//! # Overview
//!
//! [`Scheduler`] describes an executor: something that accepts jobs and runs
//! them eventually, possibly on another thread, possibly on a pooled thread
//! that has run other jobs before. This crate does not ship an executor; you
//! implement [`Scheduler`] for the one you already have.
//!
//! [`CallStack::decorate`] wraps a scheduler in a [`Decorated`] scheduler that
//! carries the diagnostic context across: every submitted job runs with a
//! snapshot of the decorating stack installed on its worker thread.
//!
//! [`SchedulerExt::submit`] adds value-returning jobs on top of any scheduler,
//! decorated or not.
//!
//! # Examples
//!
//! ```
//! use std::{thread, time::Duration};
//!
//! use pannkaka::{
//!     CallStack,
//!     scheduler::{Job, Rejected, Scheduler, SchedulerExt},
//! };
//!
//! /// Runs every job on a fresh thread.
//! struct ThreadPerJob;
//!
//! impl Scheduler for ThreadPerJob {
//!     fn execute(&self, job: Job) -> Result<(), Rejected> {
//!         thread::spawn(job);
//!         Ok(())
//!     }
//!
//!     fn shutdown(&self) {}
//!
//!     fn shutdown_now(&self) -> Vec<Job> {
//!         Vec::new()
//!     }
//!
//!     fn is_shutdown(&self) -> bool {
//!         false
//!     }
//!
//!     fn is_terminated(&self) -> bool {
//!         false
//!     }
//!
//!     fn await_termination(&self, _timeout: Duration) -> bool {
//!         false
//!     }
//! }
//!
//! let stack = CallStack::empty();
//! stack.push("handling request").unwrap();
//!
//! let scheduler = stack.decorate(ThreadPerJob);
//! let frame = scheduler
//!     .submit(|| CallStack::current().pop().unwrap().to_string())
//!     .unwrap()
//!     .wait()
//!     .unwrap();
//!
//! assert_eq!(frame, "handling request");
//! ```
//!
//! [`CallStack::decorate`]: crate::CallStack::decorate

mod decorated;
mod submitted;

use core::{fmt, time::Duration};
use std::sync::Arc;

pub use self::{
    decorated::Decorated,
    submitted::{JobLost, SchedulerExt, Submitted},
};

/// A unit of work handed to a [`Scheduler`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A job the scheduler refused to accept, typically because it has been shut
/// down.
///
/// Contains the job so that the caller can run it elsewhere or drop it.
#[derive(thiserror::Error)]
#[error("the scheduler rejected the job")]
pub struct Rejected(pub Job);

impl fmt::Debug for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected").finish_non_exhaustive()
    }
}

/// Something that runs jobs eventually, possibly on another thread.
///
/// The lifecycle operations mirror a typical executor service: once
/// [`shutdown`](Self::shutdown) has been requested no new jobs are accepted,
/// and the scheduler is *terminated* once every accepted job has finished.
pub trait Scheduler {
    /// Schedules `job` for execution.
    ///
    /// # Errors
    ///
    /// Returns the job inside [`Rejected`] if the scheduler does not accept
    /// it.
    fn execute(&self, job: Job) -> Result<(), Rejected>;

    /// Stops accepting new jobs. Already accepted jobs still run.
    fn shutdown(&self);

    /// Stops accepting new jobs and returns the accepted jobs that have not
    /// started yet, without running them.
    fn shutdown_now(&self) -> Vec<Job>;

    /// Returns `true` once a shutdown has been requested.
    fn is_shutdown(&self) -> bool;

    /// Returns `true` once the scheduler is shut down and all of its jobs have
    /// finished.
    fn is_terminated(&self) -> bool;

    /// Blocks until the scheduler terminates or `timeout` elapses. Returns
    /// `true` if it terminated.
    fn await_termination(&self, timeout: Duration) -> bool;
}

macro_rules! forward_scheduler {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<S: Scheduler + ?Sized> Scheduler for $ty {
                fn execute(&self, job: Job) -> Result<(), Rejected> {
                    (**self).execute(job)
                }

                fn shutdown(&self) {
                    (**self).shutdown()
                }

                fn shutdown_now(&self) -> Vec<Job> {
                    (**self).shutdown_now()
                }

                fn is_shutdown(&self) -> bool {
                    (**self).is_shutdown()
                }

                fn is_terminated(&self) -> bool {
                    (**self).is_terminated()
                }

                fn await_termination(&self, timeout: Duration) -> bool {
                    (**self).await_termination(timeout)
                }
            }
        )*
    };
}

forward_scheduler!(&S, Box<S>, Arc<S>);
