//! Text-renderable values that make up the frames of a call stack.
//!
//! # Overview
//!
//! A [`Description`] is anything that can render itself as text and be shared
//! between threads. The call stack stores descriptions type-erased as
//! [`Frame`]s, so a frame pushed on one thread can be rendered on another after
//! a [`split`](crate::CallStack::split) or [`migrate`](crate::CallStack::migrate).
//!
//! Two descriptions are built in:
//!
//! - [`StaticDescription`]: a fixed string, compared by content.
//! - [`Adapted`]: wraps an arbitrary displayable value and renders it as
//!   `[TypeName] value`.
//!
//! Types that know how to describe themselves implement [`Descriptive`] and can
//! be pushed with [`CallStack::push_descriptive`].
//!
//! # Examples
//!
//! ```
//! use pannkaka::description::{Adapted, StaticDescription};
//!
//! assert_eq!(StaticDescription::new("loading config").to_string(), "loading config");
//! assert_eq!(Adapted::new(10).to_string(), "[i32] 10");
//! ```
//!
//! [`Frame`]: crate::Frame
//! [`CallStack::push_descriptive`]: crate::CallStack::push_descriptive

mod adapted;

use core::fmt;
use std::borrow::Cow;

pub use self::adapted::Adapted;
use crate::Frame;

/// A value that renders itself as a human-readable frame.
///
/// Implementing this trait only requires [`Display`](fmt::Display); the
/// rendered text is what appears in traces.
///
/// # Examples
///
/// ```
/// use core::fmt;
///
/// use pannkaka::{Frame, description::Description};
///
/// struct Query {
///     table: &'static str,
/// }
///
/// impl fmt::Display for Query {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "querying {}", self.table)
///     }
/// }
///
/// impl Description for Query {}
///
/// let frame = Frame::new(Query { table: "users" });
/// assert_eq!(frame.to_string(), "querying users");
/// ```
pub trait Description: fmt::Display + Send + Sync + 'static {}

/// A value that can produce a [`Description`] of itself.
///
/// This is the hook for types whose frame text differs from their
/// [`Display`](fmt::Display) output, or that do not implement it at all.
///
/// # Examples
///
/// ```
/// use pannkaka::{CallStack, Frame, description::Descriptive};
///
/// struct Request {
///     id: u64,
/// }
///
/// impl Descriptive for Request {
///     fn description(&self) -> Frame {
///         Frame::from(format!("handling request #{}", self.id))
///     }
/// }
///
/// let stack = CallStack::empty();
/// stack.push_descriptive(&Request { id: 7 }).unwrap();
/// assert_eq!(stack.pop().unwrap().to_string(), "handling request #7");
/// ```
pub trait Descriptive {
    /// Returns the frame that describes `self`.
    fn description(&self) -> Frame;
}

/// A description backed by a fixed string.
///
/// Equality and hashing use the string content, so two descriptions created
/// from equal strings compare equal.
///
/// # Examples
///
/// ```
/// use pannkaka::description::StaticDescription;
///
/// let borrowed = StaticDescription::new("parsing header");
/// let owned = StaticDescription::new(String::from("parsing header"));
/// assert_eq!(borrowed, owned);
/// assert_eq!(owned.as_str(), "parsing header");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StaticDescription {
    text: Cow<'static, str>,
}

impl StaticDescription {
    /// Creates a description that renders as `text`.
    pub fn new(text: impl Into<Cow<'static, str>>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the description text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for StaticDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Description for StaticDescription {}

impl From<&'static str> for StaticDescription {
    fn from(text: &'static str) -> Self {
        Self::new(text)
    }
}

impl From<String> for StaticDescription {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
