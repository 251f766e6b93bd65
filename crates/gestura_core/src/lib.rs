//! Gestura Core Runtime
//!
//! This crate provides the foundational primitives shared by every Gestura
//! recognizer:
//!
//! - **Input Events**: A platform-agnostic model of pointer, key, and focus input
//! - **Virtual Time**: Host-supplied millisecond timestamps, never a wall clock
//! - **Scheduler**: Cooperative timers and a fixed-cadence frame loop
//! - **Gesture Sessions**: The per-gesture record of start and last positions
//! - **Haptics**: Fire-and-forget pulse patterns over an optional actuator
//! - **Dismiss Stack**: An owned registry of dismissible layers
//!
//! # Example
//!
//! ```rust
//! use gestura_core::scheduler::{Due, Scheduler};
//! use gestura_core::time::Timestamp;
//!
//! let mut scheduler: Scheduler<&'static str> = Scheduler::new();
//! scheduler.schedule(Timestamp::from_millis(500), "complete");
//! scheduler.request_frames(Timestamp::ZERO);
//!
//! let mut fired = Vec::new();
//! while let Some((at, due)) = scheduler.pop_due(Timestamp::from_millis(40)) {
//!     fired.push((at.as_millis(), due));
//! }
//!
//! assert_eq!(fired, vec![(16, Due::Frame), (32, Due::Frame)]);
//! ```

pub mod dismiss;
pub mod error;
pub mod events;
pub mod haptics;
pub mod scheduler;
pub mod session;
pub mod time;

pub use dismiss::{DismissStack, LayerToken, SharedDismissStack};
pub use error::{GestureError, Result};
pub use events::{EventResponse, InputEvent, InputKind, KeyCode, Point, PointerKind};
pub use haptics::{
    HapticActuator, HapticDispatcher, HapticIntensity, HapticPattern, RecordingActuator,
};
pub use scheduler::{Due, Scheduler, TimerId};
pub use session::{GestureSession, InputOrigin};
pub use time::Timestamp;
