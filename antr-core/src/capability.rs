use crate::error::CapabilityError;
use crate::response::{KeyId, ResponseOutcome};
use crate::stimulus::VisualState;
use std::time::Duration;

/// Presents whole frames.
pub trait DisplaySurface {
    /// Draws `state` and returns once the frame has been committed to the
    /// screen. All layers of a state appear together.
    fn render(&mut self, state: &VisualState) -> Result<(), CapabilityError>;
}

/// Blocking keyboard access.
pub trait InputChannel {
    /// Waits for the first key in `recognized`, or until `timeout` elapses.
    /// `None` waits indefinitely. The elapsed time is measured from the call.
    /// Keys outside `recognized` are ignored and the wait continues.
    fn wait_for_key(
        &mut self,
        timeout: Option<Duration>,
        recognized: &[KeyId],
    ) -> Result<ResponseOutcome, CapabilityError>;
}

impl<D: DisplaySurface + ?Sized> DisplaySurface for &mut D {
    fn render(&mut self, state: &VisualState) -> Result<(), CapabilityError> {
        (**self).render(state)
    }
}

impl<D: DisplaySurface + ?Sized> DisplaySurface for Box<D> {
    fn render(&mut self, state: &VisualState) -> Result<(), CapabilityError> {
        (**self).render(state)
    }
}

impl<I: InputChannel + ?Sized> InputChannel for &mut I {
    fn wait_for_key(
        &mut self,
        timeout: Option<Duration>,
        recognized: &[KeyId],
    ) -> Result<ResponseOutcome, CapabilityError> {
        (**self).wait_for_key(timeout, recognized)
    }
}

impl<I: InputChannel + ?Sized> InputChannel for Box<I> {
    fn wait_for_key(
        &mut self,
        timeout: Option<Duration>,
        recognized: &[KeyId],
    ) -> Result<ResponseOutcome, CapabilityError> {
        (**self).wait_for_key(timeout, recognized)
    }
}
