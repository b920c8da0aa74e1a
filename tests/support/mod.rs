//! Test helpers shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Condvar, Mutex, MutexGuard, mpsc},
    thread::{self, ThreadId},
    time::Duration,
};

use pannkaka::scheduler::{Job, Rejected, Scheduler};

/// Runs `f` on a thread of its own, so that it starts without a current call
/// stack and its bindings disappear when it returns.
pub fn isolated<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::spawn(f).join().expect("isolated test thread panicked")
}

/// A fixed-size pool of worker threads that reuses its threads across jobs.
///
/// Workers survive panicking jobs.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<ThreadId>,
}

struct Shared {
    state: Mutex<State>,
    work_available: Condvar,
    terminated: Condvar,
}

struct State {
    queue: VecDeque<Job>,
    shutdown: bool,
    live_workers: usize,
}

impl State {
    fn is_terminated(&self) -> bool {
        self.shutdown && self.live_workers == 0
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                shutdown: false,
                live_workers: workers,
            }),
            work_available: Condvar::new(),
            terminated: Condvar::new(),
        });

        let workers = (0..workers)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || worker_loop(&shared)).thread().id()
            })
            .collect();

        Self { shared, workers }
    }

    /// A pool with a single worker, so consecutive jobs share a thread.
    pub fn single() -> Self {
        Self::new(1)
    }

    pub fn worker_ids(&self) -> &[ThreadId] {
        &self.workers
    }

    /// Occupies one worker until the returned sender is used or dropped.
    pub fn block_worker(&self) -> mpsc::Sender<()> {
        let (release, blocked) = mpsc::channel::<()>();
        let (started, wait_started) = mpsc::channel();
        self.execute(Box::new(move || {
            started.send(()).unwrap();
            let _ = blocked.recv();
        }))
        .expect("pool rejected the blocking job");
        wait_started.recv().unwrap();
        release
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut state = shared.lock();
            loop {
                if let Some(job) = state.queue.pop_front() {
                    break Some(job);
                }
                if state.shutdown {
                    break None;
                }
                state = shared
                    .work_available
                    .wait(state)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
        };

        match job {
            // A panicking job must not take the worker down with it.
            Some(job) => {
                let _ = panic::catch_unwind(AssertUnwindSafe(job));
            }
            None => break,
        }
    }

    let mut state = shared.lock();
    state.live_workers -= 1;
    if state.live_workers == 0 {
        shared.terminated.notify_all();
    }
}

impl Scheduler for WorkerPool {
    fn execute(&self, job: Job) -> Result<(), Rejected> {
        let mut state = self.shared.lock();
        if state.shutdown {
            return Err(Rejected(job));
        }
        state.queue.push_back(job);
        self.shared.work_available.notify_one();
        Ok(())
    }

    fn shutdown(&self) {
        self.shared.lock().shutdown = true;
        self.shared.work_available.notify_all();
    }

    fn shutdown_now(&self) -> Vec<Job> {
        let pending = {
            let mut state = self.shared.lock();
            state.shutdown = true;
            state.queue.drain(..).collect()
        };
        self.shared.work_available.notify_all();
        pending
    }

    fn is_shutdown(&self) -> bool {
        self.shared.lock().shutdown
    }

    fn is_terminated(&self) -> bool {
        self.shared.lock().is_terminated()
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        let state = self.shared.lock();
        let (state, _) = self
            .shared
            .terminated
            .wait_timeout_while(state, timeout, |state| !state.is_terminated())
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.is_terminated()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
