use core::fmt;
use std::borrow::Cow;

use triomphe::Arc;
use unsize::CoerceUnsize;

use crate::description::{Adapted, Description, StaticDescription};

/// A single entry of a [`CallStack`](crate::CallStack).
///
/// A frame is an immutable, type-erased [`Description`]. Cloning a frame is a
/// reference count increment, which is what keeps
/// [`split`](crate::CallStack::split) cheap: the copied sequence is
/// independent, the frames inside it are shared.
///
/// Frames are usually created implicitly through the [`From`] conversions
/// accepted by [`CallStack::push`](crate::CallStack::push).
///
/// # Examples
///
/// ```
/// use pannkaka::{Frame, description::Adapted};
///
/// let frame = Frame::from("opening socket");
/// assert_eq!(frame.to_string(), "opening socket");
///
/// let frame = Frame::from(Adapted::new(8080_u16));
/// assert_eq!(frame.to_string(), "[u16] 8080");
/// ```
#[derive(Clone)]
pub struct Frame {
    description: Arc<dyn Description>,
}

impl Frame {
    /// Creates a frame from any description.
    pub fn new<D: Description>(description: D) -> Self {
        let description: Arc<D> = Arc::new(description);
        Self {
            description: description.unsize(unsize::Coercion!(to dyn Description)),
        }
    }

    /// Returns the description behind this frame.
    pub fn description(&self) -> &dyn Description {
        &*self.description
    }

    /// Returns `true` if both frames share the same description.
    ///
    /// Frames copied by [`split`](crate::CallStack::split) are pointer-equal to
    /// the frames of their source.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.description, &other.description)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.description, f)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Frame")
            .field(&format_args!("{}", self.description))
            .finish()
    }
}

impl From<StaticDescription> for Frame {
    fn from(description: StaticDescription) -> Self {
        Self::new(description)
    }
}

impl<T> From<Adapted<T>> for Frame
where
    Adapted<T>: Description,
{
    fn from(description: Adapted<T>) -> Self {
        Self::new(description)
    }
}

impl From<&'static str> for Frame {
    fn from(text: &'static str) -> Self {
        Self::new(StaticDescription::new(text))
    }
}

impl From<String> for Frame {
    fn from(text: String) -> Self {
        Self::new(StaticDescription::new(text))
    }
}

impl From<Cow<'static, str>> for Frame {
    fn from(text: Cow<'static, str>) -> Self {
        Self::new(StaticDescription::new(text))
    }
}
