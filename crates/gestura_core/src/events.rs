//! Input event model
//!
//! Unified input handling across hosts. Hosts without pointer events map
//! mouse and touch input onto the pointer variants with the matching
//! [`PointerKind`].

use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// A position in host coordinates (pixels)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The device a pointer event originated from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    /// Touch input has no hover phase
    pub fn can_hover(&self) -> bool {
        !matches!(self, PointerKind::Touch)
    }
}

/// Virtual key codes the recognizers care about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCode {
    Enter,
    Space,
    Escape,
    Tab,
    /// Any other key, by platform code
    Other(u32),
}

impl KeyCode {
    /// Keys that activate a focused control
    pub fn is_activation(&self) -> bool {
        matches!(self, KeyCode::Enter | KeyCode::Space)
    }
}

/// Event-specific data
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputKind {
    PointerDown {
        position: Point,
        #[serde(default)]
        pointer: PointerKind,
    },
    PointerMove {
        position: Point,
        #[serde(default)]
        pointer: PointerKind,
    },
    PointerUp {
        position: Point,
        #[serde(default)]
        pointer: PointerKind,
    },
    PointerCancel,
    PointerEnter {
        position: Point,
        #[serde(default)]
        pointer: PointerKind,
    },
    PointerLeave,
    KeyDown {
        key: KeyCode,
        /// Whether this is an auto-repeat event
        #[serde(default)]
        repeat: bool,
    },
    KeyUp {
        key: KeyCode,
    },
    Focus,
    Blur,
    ContextMenu,
}

/// A timestamped input event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub kind: InputKind,
}

impl InputEvent {
    /// An event at `at` milliseconds of virtual time
    pub fn new(at: u64, kind: InputKind) -> Self {
        Self::at(Timestamp::from_millis(at), kind)
    }

    pub fn at(timestamp: Timestamp, kind: InputKind) -> Self {
        Self { timestamp, kind }
    }

    pub fn pointer_down(at: u64, x: f32, y: f32, pointer: PointerKind) -> Self {
        Self::new(
            at,
            InputKind::PointerDown {
                position: Point::new(x, y),
                pointer,
            },
        )
    }

    pub fn pointer_move(at: u64, x: f32, y: f32, pointer: PointerKind) -> Self {
        Self::new(
            at,
            InputKind::PointerMove {
                position: Point::new(x, y),
                pointer,
            },
        )
    }

    pub fn pointer_up(at: u64, x: f32, y: f32, pointer: PointerKind) -> Self {
        Self::new(
            at,
            InputKind::PointerUp {
                position: Point::new(x, y),
                pointer,
            },
        )
    }

    pub fn pointer_enter(at: u64, x: f32, y: f32, pointer: PointerKind) -> Self {
        Self::new(
            at,
            InputKind::PointerEnter {
                position: Point::new(x, y),
                pointer,
            },
        )
    }

    pub fn key_down(at: u64, key: KeyCode) -> Self {
        Self::new(at, InputKind::KeyDown { key, repeat: false })
    }

    pub fn key_up(at: u64, key: KeyCode) -> Self {
        Self::new(at, InputKind::KeyUp { key })
    }

    /// Position carried by pointer events
    pub fn position(&self) -> Option<Point> {
        match self.kind {
            InputKind::PointerDown { position, .. }
            | InputKind::PointerMove { position, .. }
            | InputKind::PointerUp { position, .. }
            | InputKind::PointerEnter { position, .. } => Some(position),
            _ => None,
        }
    }
}

/// What the host should do with an event after a recognizer saw it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventResponse {
    /// The recognizer did not use the event
    #[default]
    Ignored,
    /// The event was consumed; stop propagating it
    Handled,
    /// Consumed, and the host should capture the pointer for the drag
    CapturePointer,
    /// Consumed, and the platform default action must be suppressed
    PreventDefault,
}

impl EventResponse {
    pub fn is_handled(&self) -> bool {
        !matches!(self, EventResponse::Ignored)
    }
}
