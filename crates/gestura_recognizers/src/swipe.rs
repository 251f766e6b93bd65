//! Swipe recognizer
//!
//! Single-shot classification of a drag. While the pointer moves the
//! dominant axis picks a tentative direction; on release the gesture counts
//! as a swipe if it finished within `timeout_ms` and either travelled
//! `threshold_px` or moved faster than `velocity_threshold`.

use gestura_core::error::{ensure_positive, GestureError, Result};
use gestura_core::events::{EventResponse, InputEvent, InputKind, Point, PointerKind};
use gestura_core::session::GestureSession;
use gestura_core::time::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::recognizer::{emit, emit_with, Callback, Recognizer, ValueCallback};

/// Jitter below this many pixels never claims a direction
pub const DEAD_ZONE_PX: f32 = 10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    #[default]
    None,
    Left,
    Right,
    Up,
    Down,
}

/// Axes a swipe may travel along
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeAxis {
    X,
    Y,
    #[default]
    Both,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    /// Minimum travel for a distance-qualified swipe
    pub threshold_px: f32,
    /// Longest gesture that can still be a swipe
    pub timeout_ms: u64,
    /// Minimum speed (px/ms) for a velocity-qualified swipe
    pub velocity_threshold: f32,
    pub axis: SwipeAxis,
    pub dead_zone_px: f32,
    pub disabled: bool,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            threshold_px: 50.0,
            timeout_ms: 300,
            velocity_threshold: 0.3,
            axis: SwipeAxis::Both,
            dead_zone_px: DEAD_ZONE_PX,
            disabled: false,
        }
    }
}

impl SwipeConfig {
    pub fn axis(mut self, axis: SwipeAxis) -> Self {
        self.axis = axis;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("threshold_px", self.threshold_px)?;
        ensure_positive("velocity_threshold", self.velocity_threshold)?;
        if self.timeout_ms == 0 {
            return Err(GestureError::invalid("timeout_ms", "must be > 0"));
        }
        if !(self.dead_zone_px.is_finite() && self.dead_zone_px >= 0.0) {
            return Err(GestureError::invalid("dead_zone_px", "must be >= 0"));
        }
        Ok(())
    }
}

/// Result of one gesture, computed once at release
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwipeOutcome {
    pub direction: SwipeDirection,
    /// Average speed over the gesture, px/ms
    pub velocity: f32,
    pub offset: (f32, f32),
    pub distance: f32,
    pub duration_ms: u64,
    /// Whether the gesture qualified as a swipe
    pub valid: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SwipeSnapshot {
    pub is_swiping: bool,
    pub direction: SwipeDirection,
    pub offset: (f32, f32),
    pub last_outcome: Option<SwipeOutcome>,
}

/// Direction of an offset, honoring axis constraints and the dead zone.
///
/// With both axes allowed the larger component wins; a tie goes to the
/// vertical axis.
pub fn classify(dx: f32, dy: f32, axis: SwipeAxis, dead_zone: f32) -> SwipeDirection {
    let horizontal = |dx: f32| {
        if dx.abs() <= dead_zone {
            SwipeDirection::None
        } else if dx > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        }
    };
    let vertical = |dy: f32| {
        if dy.abs() <= dead_zone {
            SwipeDirection::None
        } else if dy > 0.0 {
            SwipeDirection::Down
        } else {
            SwipeDirection::Up
        }
    };

    match axis {
        SwipeAxis::X => horizontal(dx),
        SwipeAxis::Y => vertical(dy),
        SwipeAxis::Both if dy.abs() >= dx.abs() => vertical(dy),
        SwipeAxis::Both => horizontal(dx),
    }
}

pub struct Swipe {
    config: SwipeConfig,
    session: Option<GestureSession>,
    offset: (f32, f32),
    direction: SwipeDirection,
    last_outcome: Option<SwipeOutcome>,
    on_swipe_start: Option<Callback>,
    on_swipe: Option<ValueCallback<SwipeOutcome>>,
    on_swipe_left: Option<Callback>,
    on_swipe_right: Option<Callback>,
    on_swipe_up: Option<Callback>,
    on_swipe_down: Option<Callback>,
    on_swipe_end: Option<ValueCallback<SwipeOutcome>>,
}

impl Swipe {
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            config,
            session: None,
            offset: (0.0, 0.0),
            direction: SwipeDirection::None,
            last_outcome: None,
            on_swipe_start: None,
            on_swipe: None,
            on_swipe_left: None,
            on_swipe_right: None,
            on_swipe_up: None,
            on_swipe_down: None,
            on_swipe_end: None,
        }
    }

    pub fn on_swipe_start<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_swipe_start = Some(Box::new(callback));
        self
    }

    /// Fired for every valid swipe with a direction, before the
    /// direction-specific callback
    pub fn on_swipe<F: FnMut(SwipeOutcome) + Send + 'static>(mut self, callback: F) -> Self {
        self.on_swipe = Some(Box::new(callback));
        self
    }

    pub fn on_swipe_left<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_swipe_left = Some(Box::new(callback));
        self
    }

    pub fn on_swipe_right<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_swipe_right = Some(Box::new(callback));
        self
    }

    pub fn on_swipe_up<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_swipe_up = Some(Box::new(callback));
        self
    }

    pub fn on_swipe_down<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_swipe_down = Some(Box::new(callback));
        self
    }

    /// Fired at every release, valid or not
    pub fn on_swipe_end<F: FnMut(SwipeOutcome) + Send + 'static>(mut self, callback: F) -> Self {
        self.on_swipe_end = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }

    pub fn direction(&self) -> SwipeDirection {
        self.direction
    }

    pub fn offset(&self) -> (f32, f32) {
        self.offset
    }

    pub fn is_swiping(&self) -> bool {
        self.session.is_some()
    }

    pub fn last_outcome(&self) -> Option<SwipeOutcome> {
        self.last_outcome
    }

    pub fn snapshot(&self) -> SwipeSnapshot {
        SwipeSnapshot {
            is_swiping: self.is_swiping(),
            direction: self.direction,
            offset: self.offset,
            last_outcome: self.last_outcome,
        }
    }

    pub fn start(&mut self, x: f32, y: f32, now: Timestamp) -> bool {
        self.begin(GestureSession::pointer(Point::new(x, y), now, PointerKind::Mouse))
    }

    fn begin(&mut self, session: GestureSession) -> bool {
        if self.config.disabled || self.session.is_some() {
            return false;
        }
        self.session = Some(session);
        self.offset = (0.0, 0.0);
        self.direction = SwipeDirection::None;
        trace!(at = %session.start_time, "swipe started");
        emit(&mut self.on_swipe_start);
        true
    }

    pub fn move_to(&mut self, x: f32, y: f32, now: Timestamp) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let position = Point::new(x, y);
        session.update(position, now);

        let (dx, dy) = session.offset_to(position);
        self.offset = match self.config.axis {
            SwipeAxis::X => (dx, 0.0),
            SwipeAxis::Y => (0.0, dy),
            SwipeAxis::Both => (dx, dy),
        };
        self.direction = classify(
            self.offset.0,
            self.offset.1,
            self.config.axis,
            self.config.dead_zone_px,
        );
    }

    /// Release. Classifies the gesture, fires callbacks, and resets.
    pub fn end(&mut self, now: Timestamp) -> Option<SwipeOutcome> {
        let session = self.session?;

        let duration_ms = session.elapsed(now);
        let (dx, dy) = self.offset;
        let distance = dx.hypot(dy);
        let velocity = distance / duration_ms.max(1) as f32;
        let valid = duration_ms <= self.config.timeout_ms
            && (distance >= self.config.threshold_px || velocity >= self.config.velocity_threshold);

        let outcome = SwipeOutcome {
            direction: self.direction,
            velocity,
            offset: self.offset,
            distance,
            duration_ms,
            valid,
        };
        debug!(direction = ?outcome.direction, distance, velocity, valid, "swipe released");

        if valid && outcome.direction != SwipeDirection::None {
            emit_with(&mut self.on_swipe, outcome);
            match outcome.direction {
                SwipeDirection::Left => emit(&mut self.on_swipe_left),
                SwipeDirection::Right => emit(&mut self.on_swipe_right),
                SwipeDirection::Up => emit(&mut self.on_swipe_up),
                SwipeDirection::Down => emit(&mut self.on_swipe_down),
                SwipeDirection::None => {}
            }
        }
        emit_with(&mut self.on_swipe_end, outcome);

        self.last_outcome = Some(outcome);
        self.clear_session();
        Some(outcome)
    }

    fn clear_session(&mut self) {
        self.session = None;
        self.offset = (0.0, 0.0);
        self.direction = SwipeDirection::None;
    }
}

impl Recognizer for Swipe {
    fn handle_event(&mut self, event: &InputEvent) -> EventResponse {
        let now = event.timestamp;
        match event.kind {
            InputKind::PointerDown { position, pointer } => {
                if self.begin(GestureSession::pointer(position, now, pointer)) {
                    EventResponse::CapturePointer
                } else {
                    EventResponse::Ignored
                }
            }
            InputKind::PointerMove { position, .. } if self.is_swiping() => {
                self.move_to(position.x, position.y, now);
                EventResponse::Handled
            }
            InputKind::PointerUp { position, .. } if self.is_swiping() => {
                self.move_to(position.x, position.y, now);
                self.end(now);
                EventResponse::Handled
            }
            InputKind::PointerCancel if self.is_swiping() => {
                self.clear_session();
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    fn advance(&mut self, _now: Timestamp) {}

    fn reset(&mut self) {
        self.clear_session();
        self.last_outcome = None;
    }

    fn is_active(&self) -> bool {
        self.is_swiping()
    }

    fn next_deadline(&self) -> Option<Timestamp> {
        None
    }
}
