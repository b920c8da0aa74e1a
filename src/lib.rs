#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Thread-affine diagnostic call stacks.
//!
//! ## Overview
//!
//! This crate keeps a per-thread stack of human-readable frames that you push
//! before entering a risky operation and pop on the way out. When something
//! fails far away from the code that triggered it, for example in a job running
//! on a worker pool, the stack tells the story of how the work got there.
//!
//! The interesting part is ownership. A [`CallStack`] belongs to exactly one
//! thread: mutating it from anywhere else is a bug, and it is reported as one.
//! Handing the diagnostic context to another thread is done explicitly, by
//! copying it.
//!
//! ## Quick Example
//!
//! ```
//! use pannkaka::CallStack;
//!
//! fn load_user(id: u64) -> Result<(), pannkaka::CallStackError> {
//!     let stack = CallStack::current();
//!     let _frame = stack.enter(format!("loading user {id}"))?;
//!     // ... risky work; on failure, render `stack` into the error report
//!     Ok(())
//! }
//!
//! load_user(7).unwrap();
//! ```
//!
//! ## Core Concepts
//!
//! - A **frame** ([`Frame`]) is an immutable, text-renderable entry. Any
//!   [`Description`] can be a frame; plain values are wrapped in [`Adapted`]
//!   and render as `[TypeName] value`.
//! - **Installation** binds a stack to the calling thread, once and for all,
//!   and makes it the thread's *current* stack. [`CallStack::current`]
//!   installs an empty stack on first use.
//! - A **snapshot** ([`CallStack::split`]) is an independent, unbound copy.
//!   Install it on the thread that should continue the work.
//! - A **handoff** ([`CallStack::migrate`]) is a snapshot that also locks the
//!   source forever, so that only the receiving thread can carry on.
//! - A **decorated scheduler** ([`CallStack::decorate`]) does the snapshotting
//!   for you: every job submitted through it runs with a snapshot taken at
//!   submission time.
//!
//! ## Errors
//!
//! Every violated invariant is a distinct [`CallStackError`] variant, so tests
//! can assert on exactly which rule was broken. A failed operation never
//! changes the stack.
//!
//! ## Logging
//!
//! Installation, release and migration emit [`tracing`] events at the `trace`
//! and `debug` levels. The crate never installs a subscriber.
//!
//! ## Configuration
//!
//! The `PANNKAKA_CALLSTACK` environment variable selects the default layout
//! used by [`Display`](core::fmt::Display) for [`CallStack`]. See
//! [`formatter`] for the options.
//!
//! For implementation details, see the [`pannkaka-internals`] crate.
//!
//! [`pannkaka-internals`]: pannkaka_internals
//! [`Description`]: description::Description
//! [`Adapted`]: description::Adapted

mod call_stack;
mod config;
mod context;
pub mod description;
mod frame;
pub mod formatter;
pub mod prelude;
pub mod scheduler;

pub use self::{
    call_stack::{CallStack, CallStackError, FrameGuard, Iter, debug_installed_stacks},
    frame::Frame,
};
