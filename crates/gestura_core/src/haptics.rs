//! Haptic dispatch
//!
//! Fire-and-forget pulse patterns. The dispatcher wraps an optional
//! [`HapticActuator`]; on hosts without vibration support every call is a
//! silent no-op.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// An ordered sequence of pulse durations in milliseconds
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HapticPattern(SmallVec<[u32; 4]>);

impl HapticPattern {
    pub fn new(pulses: &[u32]) -> Self {
        Self(SmallVec::from_slice(pulses))
    }

    /// Short confirmation pattern: tap, pause, firmer tap
    pub fn success() -> Self {
        Self::new(&[10, 50, 20])
    }

    pub fn warning() -> Self {
        Self::new(&[30, 40, 30])
    }

    pub fn pulses(&self) -> &[u32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HapticIntensity> for HapticPattern {
    fn from(intensity: HapticIntensity) -> Self {
        intensity.pattern()
    }
}

/// Intensity levels that select a single-pulse pattern
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticIntensity {
    Light,
    #[default]
    Medium,
    Heavy,
}

impl HapticIntensity {
    pub fn pattern(&self) -> HapticPattern {
        match self {
            HapticIntensity::Light => HapticPattern::new(&[10]),
            HapticIntensity::Medium => HapticPattern::new(&[20]),
            HapticIntensity::Heavy => HapticPattern::new(&[30]),
        }
    }
}

/// The platform vibration primitive
pub trait HapticActuator: Send + Sync {
    /// Play a pattern. Returns false if the platform refused it.
    fn vibrate(&self, pulses: &[u32]) -> bool;
}

/// Dispatches patterns to an optional actuator
#[derive(Clone)]
pub struct HapticDispatcher {
    actuator: Option<Arc<dyn HapticActuator>>,
    enabled: bool,
}

impl HapticDispatcher {
    pub fn new(actuator: Arc<dyn HapticActuator>) -> Self {
        Self {
            actuator: Some(actuator),
            enabled: true,
        }
    }

    /// A dispatcher with no actuator; every pattern is dropped
    pub fn unsupported() -> Self {
        Self {
            actuator: None,
            enabled: true,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.actuator.is_some()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit a pattern. Never fails; unsupported or disabled is a no-op.
    pub fn fire_pattern(&self, pattern: &HapticPattern) {
        if !self.enabled || pattern.is_empty() {
            return;
        }
        if let Some(actuator) = &self.actuator {
            if !actuator.vibrate(pattern.pulses()) {
                tracing::trace!(pulses = ?pattern.pulses(), "haptic pattern refused");
            }
        }
    }

    pub fn fire(&self, intensity: HapticIntensity) {
        self.fire_pattern(&intensity.pattern());
    }
}

impl Default for HapticDispatcher {
    fn default() -> Self {
        Self::unsupported()
    }
}

impl std::fmt::Debug for HapticDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HapticDispatcher")
            .field("supported", &self.is_supported())
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Actuator that records every pattern it is asked to play.
///
/// Used by tests and by replay tooling to observe haptic output.
#[derive(Default)]
pub struct RecordingActuator {
    played: Mutex<Vec<Vec<u32>>>,
}

impl RecordingActuator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn played(&self) -> Vec<Vec<u32>> {
        self.played.lock().clone()
    }

    /// Drain recorded patterns
    pub fn take(&self) -> Vec<Vec<u32>> {
        std::mem::take(&mut *self.played.lock())
    }

    pub fn count(&self) -> usize {
        self.played.lock().len()
    }
}

impl HapticActuator for RecordingActuator {
    fn vibrate(&self, pulses: &[u32]) -> bool {
        self.played.lock().push(pulses.to_vec());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_is_silent() {
        let dispatcher = HapticDispatcher::unsupported();
        assert!(!dispatcher.is_supported());
        dispatcher.fire(HapticIntensity::Heavy);
        dispatcher.fire_pattern(&HapticPattern::success());
    }

    #[test]
    fn test_patterns_by_intensity() {
        let actuator = RecordingActuator::new();
        let dispatcher = HapticDispatcher::new(actuator.clone());

        dispatcher.fire(HapticIntensity::Light);
        dispatcher.fire(HapticIntensity::Medium);
        dispatcher.fire(HapticIntensity::Heavy);
        dispatcher.fire_pattern(&HapticPattern::success());

        assert_eq!(
            actuator.played(),
            vec![vec![10], vec![20], vec![30], vec![10, 50, 20]]
        );
    }

    #[test]
    fn test_disabled_dispatcher_drops_patterns() {
        let actuator = RecordingActuator::new();
        let mut dispatcher = HapticDispatcher::new(actuator.clone());
        dispatcher.set_enabled(false);
        dispatcher.fire(HapticIntensity::Medium);
        dispatcher.fire_pattern(&HapticPattern::new(&[]));
        assert_eq!(actuator.count(), 0);
    }
}
