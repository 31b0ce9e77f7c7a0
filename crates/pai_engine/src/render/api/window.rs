//! Window seam

/// Host window driving the frame loop
pub trait WindowHost {
    /// Whether the user asked to close the window
    fn should_close(&self) -> bool;

    /// Process pending window and input events
    fn poll_events(&mut self);
}
