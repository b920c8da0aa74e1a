use core::iter::FusedIterator;

use crate::Frame;

/// An iterator over a snapshot of a call stack's frames, oldest first.
///
/// Created by [`CallStack::iter`](crate::CallStack::iter). Reversing it yields
/// the frames in the order [`pop`](crate::CallStack::pop) would return them.
///
/// # Examples
///
/// ```
/// use pannkaka::{CallStack, Iter};
///
/// let stack = CallStack::empty();
/// stack.push("outer").unwrap();
/// stack.push("inner").unwrap();
///
/// let iter: Iter = stack.iter();
/// let newest_first: Vec<String> = iter.rev().map(|frame| frame.to_string()).collect();
/// assert_eq!(newest_first, ["inner", "outer"]);
/// ```
#[must_use]
#[derive(Clone, Debug)]
pub struct Iter {
    iter: std::vec::IntoIter<Frame>,
}

impl Iter {
    pub(super) fn new(frames: Vec<Frame>) -> Self {
        Self {
            iter: frames.into_iter(),
        }
    }
}

impl Iterator for Iter {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl DoubleEndedIterator for Iter {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back()
    }
}

impl ExactSizeIterator for Iter {
    fn len(&self) -> usize {
        self.iter.len()
    }
}

impl FusedIterator for Iter {}
