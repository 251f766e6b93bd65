//! Gestura Animation
//!
//! Motion primitives shared by the recognizers.
//!
//! # Features
//!
//! - **Spring Physics**: RK4-integrated springs with stiffness, damping, mass
//! - **Easing**: Curves that shape linear progress for rendering
//!
//! Both are pure data; the owner steps them from its own frame loop.

pub mod easing;
pub mod spring;

pub use easing::Easing;
pub use spring::{Spring, SpringConfig};
