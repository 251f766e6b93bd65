//! Hover-intent recognizer
//!
//! Tells deliberate hovering apart from a pointer passing over the trigger.
//! While the pointer is over the trigger its position is sampled every
//! `sample_interval_ms`; once two consecutive samples are closer than
//! `sensitivity` pixels, opening is scheduled `open_delay_ms` later. Sampling
//! goes on meanwhile, and a sample that moved too far withdraws the pending
//! open. A pointer that keeps moving fast never opens, however long it stays.
//!
//! Content attached to the trigger (an interactive tooltip, a menu) is
//! sticky: while it is hovered or focused, leaving the trigger does not
//! close. Focus on the trigger opens at once; touch pointers bypass hover
//! and toggle on pointer down instead.

use gestura_core::error::{ensure_positive, GestureError, Result};
use gestura_core::events::{EventResponse, InputEvent, InputKind, KeyCode, Point, PointerKind};
use gestura_core::scheduler::{Due, Scheduler, TimerId};
use gestura_core::session::GestureSession;
use gestura_core::time::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::recognizer::{emit, emit_with, Callback, Recognizer, ValueCallback};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverIntentConfig {
    /// Delay from the pointer settling to opening
    pub open_delay_ms: u64,
    /// Delay from leaving to closing
    pub close_delay_ms: u64,
    /// Travel between two samples (px) below which the pointer counts as settled
    pub sensitivity: f32,
    pub sample_interval_ms: u64,
    pub disabled: bool,
}

impl Default for HoverIntentConfig {
    fn default() -> Self {
        Self {
            open_delay_ms: 300,
            close_delay_ms: 100,
            sensitivity: 6.0,
            sample_interval_ms: 100,
            disabled: false,
        }
    }
}

impl HoverIntentConfig {
    pub fn delays(mut self, open_delay_ms: u64, close_delay_ms: u64) -> Self {
        self.open_delay_ms = open_delay_ms;
        self.close_delay_ms = close_delay_ms;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("sensitivity", self.sensitivity)?;
        if self.sample_interval_ms == 0 {
            return Err(GestureError::invalid("sample_interval_ms", "must be > 0"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoverIntentSnapshot {
    pub is_open: bool,
    pub is_hovering: bool,
    pub content_hovered: bool,
    pub content_focused: bool,
    pub open_pending: bool,
    pub close_pending: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HoverTimer {
    Sample,
    Open,
    Close,
}

pub struct HoverIntent {
    config: HoverIntentConfig,
    /// Pointer over the trigger, if any
    session: Option<GestureSession>,
    last_sample: Point,
    is_open: bool,
    content_hovered: bool,
    content_focused: bool,
    scheduler: Scheduler<HoverTimer>,
    sample_timer: Option<TimerId>,
    open_timer: Option<TimerId>,
    close_timer: Option<TimerId>,
    on_open: Option<Callback>,
    on_close: Option<Callback>,
    on_open_change: Option<ValueCallback<bool>>,
}

impl HoverIntent {
    pub fn new(config: HoverIntentConfig) -> Self {
        Self {
            config,
            session: None,
            last_sample: Point::ORIGIN,
            is_open: false,
            content_hovered: false,
            content_focused: false,
            scheduler: Scheduler::new(),
            sample_timer: None,
            open_timer: None,
            close_timer: None,
            on_open: None,
            on_close: None,
            on_open_change: None,
        }
    }

    pub fn on_open<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_open = Some(Box::new(callback));
        self
    }

    pub fn on_close<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }

    pub fn on_open_change<F: FnMut(bool) + Send + 'static>(mut self, callback: F) -> Self {
        self.on_open_change = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &HoverIntentConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_hovering(&self) -> bool {
        self.session.is_some()
    }

    pub fn snapshot(&self) -> HoverIntentSnapshot {
        HoverIntentSnapshot {
            is_open: self.is_open,
            is_hovering: self.is_hovering(),
            content_hovered: self.content_hovered,
            content_focused: self.content_focused,
            open_pending: self.open_timer.is_some(),
            close_pending: self.close_timer.is_some(),
        }
    }

    pub fn pointer_enter(&mut self, x: f32, y: f32, now: Timestamp) {
        self.advance(now);
        if self.config.disabled || self.session.is_some() {
            return;
        }

        let position = Point::new(x, y);
        self.session = Some(GestureSession::pointer(position, now, PointerKind::Mouse));
        self.scheduler.cancel_slot(&mut self.close_timer);

        if !self.is_open {
            self.last_sample = position;
            let interval = self.config.sample_interval_ms.max(1);
            self.sample_timer = Some(self.scheduler.schedule_repeating(
                now + interval,
                interval,
                HoverTimer::Sample,
            ));
        }
        trace!(x, y, at = %now, "hover entered");
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, now: Timestamp) {
        self.advance(now);
        if let Some(session) = self.session.as_mut() {
            session.update(Point::new(x, y), now);
        }
    }

    pub fn pointer_leave(&mut self, now: Timestamp) {
        self.advance(now);
        if self.session.take().is_none() {
            return;
        }
        self.scheduler.cancel_slot(&mut self.sample_timer);
        self.scheduler.cancel_slot(&mut self.open_timer);

        if self.is_open {
            self.schedule_close(now);
        }
        trace!(at = %now, "hover left");
    }

    /// Pointer entered the attached content
    pub fn content_enter(&mut self, now: Timestamp) {
        self.advance(now);
        self.content_hovered = true;
        self.scheduler.cancel_slot(&mut self.close_timer);
    }

    pub fn content_leave(&mut self, now: Timestamp) {
        self.advance(now);
        self.content_hovered = false;
        if self.is_open && self.session.is_none() {
            self.schedule_close(now);
        }
    }

    pub fn content_focus(&mut self, now: Timestamp) {
        self.advance(now);
        self.content_focused = true;
        self.scheduler.cancel_slot(&mut self.close_timer);
    }

    pub fn content_blur(&mut self, now: Timestamp) {
        self.advance(now);
        self.content_focused = false;
        if self.is_open && self.session.is_none() {
            self.schedule_close(now);
        }
    }

    /// Keyboard focus on the trigger opens without intent filtering
    pub fn focus(&mut self, now: Timestamp) {
        self.advance(now);
        if self.config.disabled {
            return;
        }
        self.open(now);
    }

    /// Blur closes at once unless the content holds hover or focus
    pub fn blur(&mut self, now: Timestamp) {
        self.advance(now);
        if self.content_hovered || self.content_focused {
            return;
        }
        self.close(now);
    }

    /// Touch has no hover; a tap toggles instead
    pub fn toggle(&mut self, now: Timestamp) {
        self.advance(now);
        if self.config.disabled {
            return;
        }
        if self.is_open {
            self.close(now);
        } else {
            self.open(now);
        }
    }

    /// Close immediately, e.g. on Escape or an outside click
    pub fn dismiss(&mut self, now: Timestamp) {
        self.advance(now);
        self.close(now);
    }

    /// Tear down every timer without callbacks
    pub fn unmount(&mut self) {
        self.reset();
    }

    fn schedule_close(&mut self, now: Timestamp) {
        if self.content_hovered || self.content_focused || self.close_timer.is_some() {
            return;
        }
        self.close_timer = Some(
            self.scheduler
                .schedule(now + self.config.close_delay_ms, HoverTimer::Close),
        );
    }

    fn open(&mut self, at: Timestamp) {
        self.scheduler.cancel_slot(&mut self.sample_timer);
        self.scheduler.cancel_slot(&mut self.open_timer);
        self.scheduler.cancel_slot(&mut self.close_timer);
        if self.is_open {
            return;
        }
        self.is_open = true;
        debug!(at = %at, "hover intent opened");
        emit(&mut self.on_open);
        emit_with(&mut self.on_open_change, true);
    }

    fn close(&mut self, at: Timestamp) {
        self.scheduler.cancel_slot(&mut self.sample_timer);
        self.scheduler.cancel_slot(&mut self.open_timer);
        self.scheduler.cancel_slot(&mut self.close_timer);
        if !self.is_open {
            return;
        }
        self.is_open = false;
        debug!(at = %at, "hover intent closed");
        emit(&mut self.on_close);
        emit_with(&mut self.on_open_change, false);
    }

    fn on_sample(&mut self, at: Timestamp) {
        let Some(session) = self.session else {
            self.scheduler.cancel_slot(&mut self.sample_timer);
            return;
        };

        let current = session.last_position;
        let travelled = self.last_sample.distance_to(current);
        self.last_sample = current;
        trace!(travelled, at = %at, "hover sample");

        // Sampling continues until open; renewed transit withdraws a pending open
        if travelled >= self.config.sensitivity {
            if self.open_timer.is_some() {
                trace!(travelled, at = %at, "hover open withdrawn");
            }
            self.scheduler.cancel_slot(&mut self.open_timer);
        } else if self.open_timer.is_none() {
            self.open_timer = Some(
                self.scheduler
                    .schedule(at + self.config.open_delay_ms, HoverTimer::Open),
            );
        }
    }
}

impl Recognizer for HoverIntent {
    fn handle_event(&mut self, event: &InputEvent) -> EventResponse {
        let now = event.timestamp;
        match event.kind {
            InputKind::PointerEnter { position, pointer } if pointer.can_hover() => {
                self.pointer_enter(position.x, position.y, now);
                EventResponse::Handled
            }
            // Passive: hover tracking must not swallow movement
            InputKind::PointerMove { position, pointer } if pointer.can_hover() => {
                self.pointer_move(position.x, position.y, now);
                EventResponse::Ignored
            }
            InputKind::PointerLeave => {
                let hovering = self.is_hovering();
                self.pointer_leave(now);
                if hovering {
                    EventResponse::Handled
                } else {
                    EventResponse::Ignored
                }
            }
            InputKind::PointerDown {
                pointer: PointerKind::Touch,
                ..
            } if !self.config.disabled => {
                self.toggle(now);
                EventResponse::Handled
            }
            InputKind::Focus => {
                self.focus(now);
                EventResponse::Handled
            }
            InputKind::Blur => {
                self.blur(now);
                EventResponse::Handled
            }
            InputKind::KeyDown {
                key: KeyCode::Escape,
                ..
            } if self.is_open => {
                self.dismiss(now);
                EventResponse::Handled
            }
            _ => {
                self.advance(now);
                EventResponse::Ignored
            }
        }
    }

    fn advance(&mut self, now: Timestamp) {
        while let Some((at, due)) = self.scheduler.pop_due(now) {
            match due {
                Due::Timer(HoverTimer::Sample) => self.on_sample(at),
                Due::Timer(HoverTimer::Open) => {
                    self.open_timer = None;
                    self.open(at);
                }
                Due::Timer(HoverTimer::Close) => {
                    self.close_timer = None;
                    self.close(at);
                }
                Due::Frame => self.scheduler.stop_frames(),
            }
        }
    }

    fn reset(&mut self) {
        self.scheduler.clear();
        self.sample_timer = None;
        self.open_timer = None;
        self.close_timer = None;
        self.session = None;
        self.is_open = false;
        self.content_hovered = false;
        self.content_focused = false;
    }

    fn is_active(&self) -> bool {
        self.session.is_some() || self.is_open
    }

    fn next_deadline(&self) -> Option<Timestamp> {
        self.scheduler.next_deadline()
    }
}
