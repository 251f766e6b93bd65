//! Spring physics
//!
//! A damped harmonic oscillator integrated with RK4. Springs are stepped by
//! the owner with a frame delta in seconds; they carry their velocity, so a
//! retargeted spring continues smoothly from where it was.

use serde::{Deserialize, Serialize};

/// Spring parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl SpringConfig {
    pub const fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Fast and nearly critically damped
    pub const fn stiff() -> Self {
        Self::new(400.0, 30.0, 1.0)
    }

    pub const fn snappy() -> Self {
        Self::new(300.0, 20.0, 1.0)
    }

    pub const fn gentle() -> Self {
        Self::new(120.0, 14.0, 1.0)
    }

    pub const fn wobbly() -> Self {
        Self::new(180.0, 12.0, 1.0)
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::stiff()
    }
}

/// Distance and speed below which a spring counts as at rest
const REST_EPSILON: f32 = 0.01;

/// Largest integration step; longer frames are subdivided
const MAX_STEP: f32 = 1.0 / 120.0;

#[derive(Clone, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
}

impl Spring {
    /// A spring resting at `value`
    pub fn new(config: SpringConfig, value: f32) -> Self {
        Self {
            config,
            value,
            velocity: 0.0,
            target: value,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Give the spring an initial velocity, e.g. from a released drag
    pub fn set_velocity(&mut self, velocity: f32) {
        self.velocity = velocity;
    }

    /// Jump to a value and stop
    pub fn snap_to(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < REST_EPSILON && self.velocity.abs() < REST_EPSILON
    }

    /// Advance by `dt` seconds. A settled spring snaps exactly onto its target.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 || self.is_settled() {
            if self.is_settled() {
                self.value = self.target;
                self.velocity = 0.0;
            }
            return;
        }

        let steps = (dt / MAX_STEP).ceil().max(1.0) as u32;
        let h = dt / steps as f32;
        for _ in 0..steps {
            self.rk4(h);
        }

        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }

    fn acceleration(&self, x: f32, v: f32) -> f32 {
        let SpringConfig {
            stiffness,
            damping,
            mass,
        } = self.config;
        (-stiffness * (x - self.target) - damping * v) / mass.max(f32::EPSILON)
    }

    fn rk4(&mut self, h: f32) {
        let (x, v) = (self.value, self.velocity);

        let k1x = v;
        let k1v = self.acceleration(x, v);

        let k2x = v + 0.5 * h * k1v;
        let k2v = self.acceleration(x + 0.5 * h * k1x, k2x);

        let k3x = v + 0.5 * h * k2v;
        let k3v = self.acceleration(x + 0.5 * h * k2x, k3x);

        let k4x = v + h * k3v;
        let k4v = self.acceleration(x + h * k3x, k4x);

        self.value = x + h / 6.0 * (k1x + 2.0 * k2x + 2.0 * k3x + k4x);
        self.velocity = v + h / 6.0 * (k1v + 2.0 * k2v + 2.0 * k3v + k4v);
    }
}
