//! Gestura Recognizers
//!
//! Gesture recognizers that turn raw pointer, touch, and keyboard input into
//! staged interaction outcomes.
//!
//! # Recognizers
//!
//! - **Long Press**: Staged hold (`pressing → preview → ready → revealed`)
//! - **Swipe**: Direction and velocity classification on release
//! - **Hover Intent**: Velocity-sampled hover with open/close delays
//! - **Drag Confirm**: Slide-to-confirm with elastic edges and flick completion
//! - **Long Press Reveal**: Long press driving a reveal/dismiss lifecycle
//!
//! Every recognizer implements [`Recognizer`]. Hosts forward input events and
//! call [`Recognizer::advance`] with the current virtual time; recognizers
//! never read a clock and never render.
//!
//! # Example
//!
//! ```rust
//! use gestura_core::{InputEvent, PointerKind, Timestamp};
//! use gestura_recognizers::{LongPress, LongPressConfig, Recognizer, Stage};
//!
//! let mut press = LongPress::new(LongPressConfig::default());
//! press.handle_event(&InputEvent::pointer_down(0, 10.0, 10.0, PointerKind::Touch));
//! press.advance(Timestamp::from_millis(500));
//!
//! assert_eq!(press.stage(), Stage::Revealed);
//! assert_eq!(press.progress(), 1.0);
//! ```

pub mod drag_confirm;
pub mod hover_intent;
pub mod long_press;
pub mod long_press_reveal;
pub mod recognizer;
pub mod swipe;

pub use drag_confirm::{
    DragConfirm, DragConfirmConfig, DragConfirmSnapshot, DragPhase, TrackGeometry,
};
pub use hover_intent::{HoverIntent, HoverIntentConfig, HoverIntentSnapshot};
pub use long_press::{LongPress, LongPressConfig, LongPressSnapshot, Stage};
pub use long_press_reveal::{LongPressReveal, LongPressRevealConfig, RevealSnapshot};
pub use recognizer::{Callback, Recognizer, ValueCallback};
pub use swipe::{Swipe, SwipeAxis, SwipeConfig, SwipeDirection, SwipeOutcome, SwipeSnapshot};
