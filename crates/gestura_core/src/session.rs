//! Gesture sessions
//!
//! A [`GestureSession`] is the mutable record of one in-progress interaction,
//! from its start event to its terminal outcome. Each recognizer owns at most
//! one session and drops it on completion, cancellation, or reset.

use crate::events::{Point, PointerKind};
use crate::time::Timestamp;

/// Where the interaction came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOrigin {
    /// Keyboard activation; coordinates are meaningless
    Keyboard,
    Pointer(PointerKind),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSession {
    pub start_position: Point,
    pub start_time: Timestamp,
    pub last_position: Point,
    pub last_time: Timestamp,
    pub origin: InputOrigin,
}

impl GestureSession {
    pub fn new(position: Point, time: Timestamp, origin: InputOrigin) -> Self {
        Self {
            start_position: position,
            start_time: time,
            last_position: position,
            last_time: time,
            origin,
        }
    }

    pub fn pointer(position: Point, time: Timestamp, pointer: PointerKind) -> Self {
        Self::new(position, time, InputOrigin::Pointer(pointer))
    }

    pub fn keyboard(time: Timestamp) -> Self {
        Self::new(Point::ORIGIN, time, InputOrigin::Keyboard)
    }

    pub fn is_keyboard(&self) -> bool {
        self.origin == InputOrigin::Keyboard
    }

    /// Record a new sample
    pub fn update(&mut self, position: Point, time: Timestamp) {
        self.last_position = position;
        self.last_time = time;
    }

    /// Offset of `position` from the start position
    pub fn offset_to(&self, position: Point) -> (f32, f32) {
        (
            position.x - self.start_position.x,
            position.y - self.start_position.y,
        )
    }

    /// Euclidean distance of `position` from the start position
    pub fn distance_from_start(&self, position: Point) -> f32 {
        self.start_position.distance_to(position)
    }

    /// Milliseconds since the session started
    pub fn elapsed(&self, now: Timestamp) -> u64 {
        now.saturating_since(self.start_time)
    }
}
