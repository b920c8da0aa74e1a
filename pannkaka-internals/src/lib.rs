#![forbid(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`pannkaka`].
//!
//! # Overview
//!
//! This crate contains the low-level, generic building blocks that power the
//! [`pannkaka`] call stack library. They know nothing about frames or
//! descriptions: the frame type is a type parameter, and the identity of an
//! execution context is the [`ThreadId`] of the calling thread.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`pannkaka`] crate, not
//! this one.
//!
//! # Architecture
//!
//! - **[`stack`]**: the per-instance state machine
//!   - [`RawCallStack`]: frames behind a mutex, a set-once owner, and a
//!     one-way lock flag
//!
//! - **[`registry`]**: the process-wide "current instance per thread" store
//!   - [`ContextRegistry`]: a keyed store from [`ThreadId`] to a shared
//!     instance, compared by pointer identity
//!
//! - **[`CallStackError`]**: the failure taxonomy shared by both
//!
//! # Locking
//!
//! A [`RawCallStack`] serializes every state transition behind its own frame
//! mutex. The ownership check performed by [`RawCallStack::push`] and
//! [`RawCallStack::pop`] consults the registry while that mutex is held, so the
//! lock order for mutations is *instance, then registry*.
//!
//! [`ContextRegistry::for_each`] runs its closure under the registry's read
//! lock, and that closure may lock instances, which is the opposite order.
//! This cannot deadlock only because a mutation takes the registry lock for
//! reading too, and readers never block each other. The registry's write lock
//! is taken only by installation and release, which never hold an instance
//! lock.
//!
//! [`pannkaka`]: https://docs.rs/pannkaka/latest/pannkaka/
//! [`ThreadId`]: std::thread::ThreadId

mod error;
pub mod registry;
pub mod stack;

pub use error::CallStackError;
pub use registry::ContextRegistry;
pub use stack::RawCallStack;
