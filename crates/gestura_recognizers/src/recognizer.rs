//! The contract every recognizer implements

use gestura_core::events::{EventResponse, InputEvent};
use gestura_core::time::Timestamp;

/// Callback with no payload
pub type Callback = Box<dyn FnMut() + Send>;

/// Callback receiving a value, e.g. progress
pub type ValueCallback<T> = Box<dyn FnMut(T) + Send>;

/// A gesture recognizer bound to one interactive element.
///
/// The host forwards raw input through [`Recognizer::handle_event`] and
/// drives time through [`Recognizer::advance`], at least once per animation
/// frame while [`Recognizer::next_deadline`] returns a value.
pub trait Recognizer {
    /// Feed one input event. Work that is due before the event's timestamp
    /// runs first.
    fn handle_event(&mut self, event: &InputEvent) -> EventResponse;

    /// Run every timer and frame due at or before `now`
    fn advance(&mut self, now: Timestamp);

    /// Drop the session and all pending work without firing callbacks
    fn reset(&mut self);

    /// Whether a gesture session currently exists
    fn is_active(&self) -> bool;

    /// When the recognizer next needs `advance`
    fn next_deadline(&self) -> Option<Timestamp>;
}

/// Invoke an optional callback slot
pub(crate) fn emit(slot: &mut Option<Callback>) {
    if let Some(callback) = slot.as_mut() {
        callback();
    }
}

/// Invoke an optional value callback slot
pub(crate) fn emit_with<T>(slot: &mut Option<ValueCallback<T>>, value: T) {
    if let Some(callback) = slot.as_mut() {
        callback(value);
    }
}
