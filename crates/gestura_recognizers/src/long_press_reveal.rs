//! Long-press-reveal
//!
//! Wraps a [`LongPress`] and turns its completion into a reveal/dismiss
//! lifecycle. Revealed content is dismissed by the auto-dismiss timeout, by
//! Escape while it is the topmost layer of the shared [`DismissStack`], or by
//! the host calling [`LongPressReveal::dismiss`] (e.g. on a pointer down
//! outside the content).
//!
//! [`DismissStack`]: gestura_core::DismissStack

use gestura_core::dismiss::{LayerToken, SharedDismissStack};
use gestura_core::error::Result;
use gestura_core::events::{EventResponse, InputEvent, InputKind, KeyCode};
use gestura_core::haptics::HapticDispatcher;
use gestura_core::scheduler::{Due, Scheduler};
use gestura_core::time::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::long_press::{LongPress, LongPressConfig, LongPressSnapshot, Stage};
use crate::recognizer::{emit, Callback, Recognizer};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongPressRevealConfig {
    pub press: LongPressConfig,
    /// Hide revealed content after this long. `None` or 0 keeps it until
    /// dismissed.
    pub auto_dismiss_ms: Option<u64>,
    pub dismiss_on_escape: bool,
}

impl Default for LongPressRevealConfig {
    fn default() -> Self {
        Self {
            press: LongPressConfig::default(),
            auto_dismiss_ms: Some(3000),
            dismiss_on_escape: true,
        }
    }
}

impl LongPressRevealConfig {
    pub fn validate(&self) -> Result<()> {
        self.press.validate()
    }

    fn auto_dismiss(&self) -> Option<u64> {
        self.auto_dismiss_ms.filter(|ms| *ms > 0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealSnapshot {
    pub press: LongPressSnapshot,
    pub is_revealed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RevealTimer {
    AutoDismiss,
}

pub struct LongPressReveal {
    config: LongPressRevealConfig,
    press: LongPress,
    revealed: bool,
    stack: Option<SharedDismissStack>,
    layer: Option<LayerToken>,
    scheduler: Scheduler<RevealTimer>,
    on_reveal: Option<Callback>,
    on_dismiss: Option<Callback>,
}

impl LongPressReveal {
    pub fn new(config: LongPressRevealConfig) -> Self {
        let press = LongPress::new(config.press.clone());
        Self {
            config,
            press,
            revealed: false,
            stack: None,
            layer: None,
            scheduler: Scheduler::new(),
            on_reveal: None,
            on_dismiss: None,
        }
    }

    /// Register revealed content on a dismiss stack shared with other layers
    pub fn with_dismiss_stack(mut self, stack: SharedDismissStack) -> Self {
        self.stack = Some(stack);
        self
    }

    pub fn with_haptics(self, haptics: HapticDispatcher) -> Self {
        self.map_press(|press| press.with_haptics(haptics))
    }

    /// Configure the inner long press, e.g. to observe its progress
    pub fn map_press(mut self, f: impl FnOnce(LongPress) -> LongPress) -> Self {
        let press = std::mem::replace(&mut self.press, LongPress::new(self.config.press.clone()));
        self.press = f(press);
        self
    }

    pub fn on_reveal<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_reveal = Some(Box::new(callback));
        self
    }

    pub fn on_dismiss<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_dismiss = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &LongPressRevealConfig {
        &self.config
    }

    pub fn press(&self) -> &LongPress {
        &self.press
    }

    pub fn stage(&self) -> Stage {
        self.press.stage()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn layer(&self) -> Option<LayerToken> {
        self.layer
    }

    pub fn snapshot(&self) -> RevealSnapshot {
        RevealSnapshot {
            press: self.press.snapshot(),
            is_revealed: self.revealed,
        }
    }

    /// Hide revealed content. Returns false if nothing was revealed.
    pub fn dismiss(&mut self) -> bool {
        if !self.revealed {
            return false;
        }
        self.revealed = false;
        self.scheduler.clear();
        self.release_layer();
        self.press.reset();
        debug!("reveal dismissed");
        emit(&mut self.on_dismiss);
        true
    }

    fn is_topmost(&self) -> bool {
        match (&self.stack, self.layer) {
            (Some(stack), Some(layer)) => stack.lock().is_top(layer),
            _ => true,
        }
    }

    fn release_layer(&mut self) {
        if let (Some(stack), Some(layer)) = (&self.stack, self.layer.take()) {
            stack.lock().remove(layer);
        }
    }

    fn sync_reveal(&mut self) {
        if self.revealed || !self.press.is_complete() {
            return;
        }
        let Some(session) = self.press.session() else {
            return;
        };
        let at = session.start_time + self.config.press.threshold_ms.max(1);

        self.revealed = true;
        self.layer = self.stack.as_ref().map(|stack| stack.lock().push());
        if let Some(delay) = self.config.auto_dismiss() {
            self.scheduler.schedule(at + delay, RevealTimer::AutoDismiss);
        }
        debug!(at = %at, "content revealed");
        emit(&mut self.on_reveal);
    }
}

impl Recognizer for LongPressReveal {
    fn handle_event(&mut self, event: &InputEvent) -> EventResponse {
        let now = event.timestamp;
        self.advance(now);

        match event.kind {
            InputKind::KeyDown {
                key: KeyCode::Escape,
                ..
            } => {
                if self.revealed && self.config.dismiss_on_escape && self.is_topmost() {
                    self.dismiss();
                    EventResponse::Handled
                } else {
                    EventResponse::Ignored
                }
            }
            // Revealed content stays put until dismissed
            InputKind::PointerDown { .. } if self.revealed && !self.press.is_pressing() => {
                EventResponse::Ignored
            }
            InputKind::KeyDown { key, .. }
                if key.is_activation() && self.revealed && !self.press.is_pressing() =>
            {
                EventResponse::Ignored
            }
            _ => {
                let response = self.press.handle_event(event);
                self.sync_reveal();
                response
            }
        }
    }

    fn advance(&mut self, now: Timestamp) {
        self.press.advance(now);
        self.sync_reveal();
        while let Some((at, due)) = self.scheduler.pop_due(now) {
            match due {
                Due::Timer(RevealTimer::AutoDismiss) => {
                    debug!(at = %at, "auto dismiss");
                    self.dismiss();
                }
                Due::Frame => self.scheduler.stop_frames(),
            }
        }
    }

    fn reset(&mut self) {
        self.scheduler.clear();
        self.release_layer();
        self.press.reset();
        self.revealed = false;
    }

    fn is_active(&self) -> bool {
        self.revealed || self.press.is_active()
    }

    fn next_deadline(&self) -> Option<Timestamp> {
        match (self.press.next_deadline(), self.scheduler.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

impl Drop for LongPressReveal {
    fn drop(&mut self) {
        self.release_layer();
    }
}
