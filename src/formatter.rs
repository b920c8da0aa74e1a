//! Rendering of call stacks as human-readable traces.
//!
//! [`Display`](core::fmt::Display) for [`CallStack`] uses
//! [`StackFormatter::from_env`]. Use a [`StackFormatter`] directly to pick the
//! layout explicitly:
//!
//! ```
//! use pannkaka::{CallStack, formatter::StackFormatter};
//!
//! let stack = CallStack::empty();
//! stack.push("First").unwrap();
//! stack.push("Second").unwrap();
//!
//! assert_eq!(
//!     StackFormatter::UNICODE.render(&stack).to_string(),
//!     "● call stack (2 frames)\n├ Second\n╰ First"
//! );
//! assert_eq!(
//!     StackFormatter::ASCII.render(&stack).to_string(),
//!     "* call stack (2 frames)\n|- Second\n`- First"
//! );
//! ```
//!
//! # Environment Variables
//!
//! - `PANNKAKA_CALLSTACK` - Comma-separated options for the default layout:
//!   - `ascii` - Use [`StackFormatter::ASCII`] instead of
//!     [`StackFormatter::UNICODE`]
//!   - `oldest-first` - List frames in push order instead of newest first
//!
//! [`CallStack`]: crate::CallStack

use core::fmt;

use crate::{CallStack, Frame, config::CallStackEnvOptions};

/// Order in which a [`StackFormatter`] lists frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameOrder {
    /// The most recently pushed frame comes first, like a backtrace.
    NewestFirst,
    /// Frames are listed in the order they were pushed.
    OldestFirst,
}

/// Layout for rendering a call stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackFormatter {
    /// Prefix of the header line.
    pub header: &'static str,
    /// Prefix of every frame line but the last.
    pub frame: &'static str,
    /// Prefix of the last frame line.
    pub last_frame: &'static str,
    /// Order of the frame lines.
    pub order: FrameOrder,
}

impl StackFormatter {
    /// Box-drawing layout, newest frame first.
    pub const UNICODE: Self = Self {
        header: "● ",
        frame: "├ ",
        last_frame: "╰ ",
        order: FrameOrder::NewestFirst,
    };

    /// ASCII-only layout, newest frame first.
    pub const ASCII: Self = Self {
        header: "* ",
        frame: "|- ",
        last_frame: "`- ",
        order: FrameOrder::NewestFirst,
    };

    /// Returns the layout selected by the `PANNKAKA_CALLSTACK` environment
    /// variable.
    pub fn from_env() -> Self {
        let options = CallStackEnvOptions::get();
        let formatter = if options.ascii {
            Self::ASCII
        } else {
            Self::UNICODE
        };
        if options.oldest_first {
            formatter.with_order(FrameOrder::OldestFirst)
        } else {
            formatter
        }
    }

    /// Returns a copy of this layout with a different frame order.
    #[must_use]
    pub const fn with_order(mut self, order: FrameOrder) -> Self {
        self.order = order;
        self
    }

    /// Renders `frames`, given oldest first.
    pub fn format(&self, frames: &[Frame], f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match frames.len() {
            0 => return write!(f, "{}call stack (empty)", self.header),
            1 => write!(f, "{}call stack (1 frame)", self.header)?,
            n => write!(f, "{}call stack ({n} frames)", self.header)?,
        }

        let last = frames.len() - 1;
        let mut write_line = |index: usize, frame: &Frame| {
            let prefix = if index == last {
                self.last_frame
            } else {
                self.frame
            };
            write!(f, "\n{prefix}{frame}")
        };

        match self.order {
            FrameOrder::NewestFirst => {
                for (index, frame) in frames.iter().rev().enumerate() {
                    write_line(index, frame)?;
                }
            }
            FrameOrder::OldestFirst => {
                for (index, frame) in frames.iter().enumerate() {
                    write_line(index, frame)?;
                }
            }
        }
        Ok(())
    }

    /// Returns a [`Display`](fmt::Display) adapter rendering a snapshot of
    /// `stack` with this layout.
    pub fn render(&self, stack: &CallStack) -> Rendered {
        Rendered {
            formatter: *self,
            frames: stack.iter().collect(),
        }
    }
}

impl Default for StackFormatter {
    fn default() -> Self {
        Self::from_env()
    }
}

/// A call stack snapshot paired with a layout. Created by
/// [`StackFormatter::render`].
#[derive(Debug, Clone)]
pub struct Rendered {
    formatter: StackFormatter,
    frames: Vec<Frame>,
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.formatter.format(&self.frames, f)
    }
}
