use crate::{CallStack, Frame};

/// Pops the frame pushed by [`CallStack::enter`] when dropped.
///
/// The frame is only popped if it is still the newest one. Otherwise, or if
/// the stack cannot be mutated any more (it was migrated in the meantime),
/// a warning is emitted through [`tracing`] and the stack is left as it is.
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard<'a> {
    stack: &'a CallStack,
    frame: Frame,
}

impl<'a> FrameGuard<'a> {
    pub(super) fn new(stack: &'a CallStack, frame: Frame) -> Self {
        Self { stack, frame }
    }

    /// Returns the frame this guard pushed.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        match self.stack.pop_exact(&self.frame) {
            Ok(Some(_)) => {}
            Ok(None) => tracing::warn!(
                frame = %self.frame,
                "scoped frame was not the newest frame when its guard dropped; stack left unchanged"
            ),
            Err(error) => tracing::warn!(
                %error,
                frame = %self.frame,
                "failed to pop scoped call stack frame"
            ),
        }
    }
}

impl core::fmt::Debug for FrameGuard<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameGuard")
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}
