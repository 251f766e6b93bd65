//! Drag-to-confirm ("slide to confirm") recognizer
//!
//! A thumb dragged along a horizontal track. Releasing far enough along, or
//! with enough speed, confirms; anything else springs the thumb back to the
//! start. Dragging past either end meets elastic resistance instead of a hard
//! stop.
//!
//! Confirmation enters `Loading` while the host runs its confirm action and
//! leaves it on every outcome: success is terminal until [`Recognizer::reset`],
//! failure snaps back and hands the error back unchanged.
//!
//! With `reduced_motion` set, dragging is replaced by press-and-hold: progress
//! accumulates linearly over `hold_duration_ms` and confirms at 100%.

use std::future::Future;

use gestura_animation::{Spring, SpringConfig};
use gestura_core::error::{ensure_positive, ensure_range, GestureError, Result};
use gestura_core::events::{EventResponse, InputEvent, InputKind, Point, PointerKind};
use gestura_core::haptics::{HapticDispatcher, HapticIntensity, HapticPattern};
use gestura_core::scheduler::{Due, Scheduler};
use gestura_core::session::GestureSession;
use gestura_core::time::{Timestamp, FRAME_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::recognizer::{emit, emit_with, Callback, Recognizer, ValueCallback};

/// Progress marks that fire a haptic pulse once per attempt
pub const MILESTONES: [f32; 3] = [0.5, 0.85, 1.0];

/// Scale applied to a drag below zero
const UNDERSCROLL_RESISTANCE: f32 = 0.2;

/// Multiplier on the square root of the overscroll past the end
const OVERSCROLL_CUSHION: f32 = 3.0;

fn milestone_intensity(milestone: f32) -> HapticIntensity {
    if milestone >= 1.0 {
        HapticIntensity::Heavy
    } else if milestone >= 0.85 {
        HapticIntensity::Medium
    } else {
        HapticIntensity::Light
    }
}

/// Rubber-band response for a proposed thumb position
pub fn elastic(proposed: f32, max: f32) -> f32 {
    if proposed < 0.0 {
        proposed * UNDERSCROLL_RESISTANCE
    } else if proposed > max {
        max + (proposed - max).sqrt() * OVERSCROLL_CUSHION
    } else {
        proposed
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
    SnappingBack,
    /// Reduced-motion press-and-hold
    Holding,
    /// Waiting for the host confirm action
    Loading,
    Confirmed,
}

/// Measured track dimensions (px)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackGeometry {
    pub track_width: f32,
    pub thumb_size: f32,
    pub padding: f32,
}

impl TrackGeometry {
    pub const fn new(track_width: f32, thumb_size: f32, padding: f32) -> Self {
        Self {
            track_width,
            thumb_size,
            padding,
        }
    }

    /// Travel available to the thumb
    pub fn max_slide_distance(&self) -> f32 {
        (self.track_width - self.thumb_size - 2.0 * self.padding).max(0.0)
    }
}

impl Default for TrackGeometry {
    fn default() -> Self {
        Self::new(300.0, 48.0, 4.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfirmConfig {
    /// Fraction of the track that confirms on release
    pub threshold: f32,
    /// Release speed (px/ms) that confirms regardless of position
    pub velocity_threshold: f32,
    pub spring: SpringConfig,
    pub geometry: TrackGeometry,
    pub enable_haptics: bool,
    pub enable_velocity_complete: bool,
    pub reduced_motion: bool,
    pub hold_duration_ms: u64,
    pub disabled: bool,
    pub frame_interval_ms: u64,
}

impl Default for DragConfirmConfig {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            velocity_threshold: 0.8,
            spring: SpringConfig::stiff(),
            geometry: TrackGeometry::default(),
            enable_haptics: true,
            enable_velocity_complete: true,
            reduced_motion: false,
            hold_duration_ms: 1500,
            disabled: false,
            frame_interval_ms: FRAME_INTERVAL_MS,
        }
    }
}

impl DragConfirmConfig {
    pub fn geometry(mut self, geometry: TrackGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn reduced_motion(mut self, hold_duration_ms: u64) -> Self {
        self.reduced_motion = true;
        self.hold_duration_ms = hold_duration_ms;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_range("threshold", self.threshold, f32::EPSILON, 1.0)?;
        ensure_positive("velocity_threshold", self.velocity_threshold)?;
        ensure_positive("spring.stiffness", self.spring.stiffness)?;
        ensure_positive("spring.mass", self.spring.mass)?;
        if self.hold_duration_ms == 0 {
            return Err(GestureError::invalid("hold_duration_ms", "must be > 0"));
        }
        if self.geometry.max_slide_distance() <= 0.0 {
            return Err(GestureError::invalid(
                "geometry",
                "track leaves no room for the thumb",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragConfirmSnapshot {
    pub phase: DragPhase,
    /// Thumb offset (px), including transient elastic excursions
    pub position: f32,
    pub progress: f32,
    pub velocity_px_per_sec: f32,
    pub is_confirmed: bool,
    pub milestones_fired: SmallVec<[f32; 3]>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DragTimer {
    HoldComplete,
}

pub struct DragConfirm {
    config: DragConfirmConfig,
    phase: DragPhase,
    session: Option<GestureSession>,
    /// Pointer x minus thumb position at drag start
    start_offset: f32,
    position: f32,
    progress: f32,
    /// px/ms
    velocity: f32,
    milestones: SmallVec<[f32; 3]>,
    spring: Spring,
    last_frame: Timestamp,
    now: Timestamp,
    scheduler: Scheduler<DragTimer>,
    haptics: HapticDispatcher,
    on_slide_start: Option<Callback>,
    on_slide_end: Option<Callback>,
    on_progress_change: Option<ValueCallback<f32>>,
    on_confirm: Option<Callback>,
    on_complete: Option<Callback>,
    on_cancel: Option<Callback>,
    on_error: Option<Callback>,
}

impl DragConfirm {
    pub fn new(config: DragConfirmConfig) -> Self {
        let scheduler = Scheduler::with_frame_interval(config.frame_interval_ms);
        let spring = Spring::new(config.spring, 0.0);
        Self {
            config,
            phase: DragPhase::Idle,
            session: None,
            start_offset: 0.0,
            position: 0.0,
            progress: 0.0,
            velocity: 0.0,
            milestones: SmallVec::new(),
            spring,
            last_frame: Timestamp::ZERO,
            now: Timestamp::ZERO,
            scheduler,
            haptics: HapticDispatcher::unsupported(),
            on_slide_start: None,
            on_slide_end: None,
            on_progress_change: None,
            on_confirm: None,
            on_complete: None,
            on_cancel: None,
            on_error: None,
        }
    }

    pub fn with_haptics(mut self, haptics: HapticDispatcher) -> Self {
        self.haptics = haptics;
        self
    }

    pub fn on_slide_start<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_slide_start = Some(Box::new(callback));
        self
    }

    pub fn on_slide_end<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_slide_end = Some(Box::new(callback));
        self
    }

    pub fn on_progress_change<F: FnMut(f32) + Send + 'static>(mut self, callback: F) -> Self {
        self.on_progress_change = Some(Box::new(callback));
        self
    }

    /// Fired when a release (or a completed hold) enters `Loading`. The host
    /// starts its confirm action here.
    pub fn on_confirm<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_confirm = Some(Box::new(callback));
        self
    }

    /// Fired once the confirm action succeeded
    pub fn on_complete<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn on_cancel<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_cancel = Some(Box::new(callback));
        self
    }

    /// Fired when the confirm action failed or was abandoned
    pub fn on_error<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &DragConfirmConfig {
        &self.config
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// The current attempt, held from pointer-down until the thumb is back
    /// at rest or confirmed
    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn velocity_px_per_sec(&self) -> f32 {
        self.velocity * 1000.0
    }

    pub fn is_confirmed(&self) -> bool {
        self.phase == DragPhase::Confirmed
    }

    pub fn is_loading(&self) -> bool {
        self.phase == DragPhase::Loading
    }

    pub fn max_slide_distance(&self) -> f32 {
        self.config.geometry.max_slide_distance()
    }

    pub fn snapshot(&self) -> DragConfirmSnapshot {
        DragConfirmSnapshot {
            phase: self.phase,
            position: self.position,
            progress: self.progress,
            velocity_px_per_sec: self.velocity_px_per_sec(),
            is_confirmed: self.is_confirmed(),
            milestones_fired: self.milestones.clone(),
        }
    }

    /// Update the measured track. A loading or confirmed thumb stays pinned
    /// to the end.
    pub fn set_geometry(&mut self, geometry: TrackGeometry) {
        self.config.geometry = geometry;
        if matches!(self.phase, DragPhase::Loading | DragPhase::Confirmed) {
            self.position = self.max_slide_distance();
        }
    }

    fn accepts_input(&self) -> bool {
        !self.config.disabled && !matches!(self.phase, DragPhase::Loading | DragPhase::Confirmed)
    }

    /// Press on the thumb. Starts a drag, or a hold in reduced-motion mode.
    pub fn pointer_down(&mut self, x: f32, now: Timestamp) -> bool {
        self.advance(now);
        if !self.accepts_input() || matches!(self.phase, DragPhase::Dragging | DragPhase::Holding) {
            return false;
        }
        if self.config.reduced_motion {
            return self.start_hold(GestureSession::pointer(
                Point::new(x, 0.0),
                now,
                PointerKind::Mouse,
            ));
        }

        // Catch a thumb that is still springing back
        self.scheduler.stop_frames();
        self.session = Some(GestureSession::pointer(Point::new(x, 0.0), now, PointerKind::Mouse));
        self.start_offset = x - self.position;
        self.velocity = 0.0;
        self.milestones.clear();
        self.phase = DragPhase::Dragging;
        debug!(x, at = %now, "slide started");
        emit(&mut self.on_slide_start);
        true
    }

    pub fn pointer_move(&mut self, x: f32, now: Timestamp) {
        self.advance(now);
        if self.phase != DragPhase::Dragging {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let dt = now.saturating_since(session.last_time);
        session.update(Point::new(x, 0.0), now);

        let position = elastic(x - self.start_offset, self.max_slide_distance());
        if dt > 0 {
            self.velocity = (position - self.position) / dt as f32;
        }
        self.position = position;

        let raw = self.raw_progress();
        self.fire_milestones(raw);
        self.publish_progress(raw);
    }

    /// Release. Confirms or springs back.
    pub fn pointer_up(&mut self, x: f32, now: Timestamp) {
        match self.phase {
            DragPhase::Dragging => {
                // An up at the last sampled x keeps the velocity of the last move
                let moved = self
                    .session
                    .as_ref()
                    .map_or(true, |session| session.last_position.x != x);
                if moved {
                    self.pointer_move(x, now);
                } else {
                    self.advance(now);
                }
                self.release(now);
            }
            DragPhase::Holding => {
                self.advance(now);
                self.release_hold();
            }
            _ => self.advance(now),
        }
    }

    /// Abort a drag or hold in progress
    pub fn cancel(&mut self, now: Timestamp) -> bool {
        self.advance(now);
        match self.phase {
            DragPhase::Dragging => {
                emit(&mut self.on_slide_end);
                self.snap_back(now);
                emit(&mut self.on_cancel);
                true
            }
            DragPhase::Holding => {
                self.release_hold();
                true
            }
            _ => false,
        }
    }

    /// Resolve a pending confirmation with the host action's result.
    ///
    /// `Ok` confirms; `Err` springs the thumb back. The result is returned
    /// unchanged either way. Outside `Loading` nothing changes.
    pub fn settle<E>(&mut self, result: std::result::Result<(), E>) -> std::result::Result<(), E> {
        if self.phase != DragPhase::Loading {
            return result;
        }
        match &result {
            Ok(()) => {
                self.phase = DragPhase::Confirmed;
                self.session = None;
                debug!("slide confirmed");
                self.fire_haptic(&HapticPattern::success());
                emit(&mut self.on_complete);
            }
            Err(_) => self.fail_loading(),
        }
        result
    }

    /// Run the host confirm action and settle with its result.
    ///
    /// Dropping the returned future before it completes also leaves
    /// `Loading`, as a failure.
    pub fn confirm_with<'a, F, E>(
        &'a mut self,
        action: F,
    ) -> impl Future<Output = std::result::Result<(), E>> + 'a
    where
        F: Future<Output = std::result::Result<(), E>> + 'a,
        E: 'a,
    {
        let mut guard = LoadingGuard { confirm: self };
        async move {
            let result = action.await;
            guard.confirm.settle(result)
        }
    }

    fn fail_loading(&mut self) {
        warn!("confirm action failed");
        self.fire_haptic(&HapticPattern::warning());
        self.snap_back(self.now);
        emit(&mut self.on_error);
    }

    fn raw_progress(&self) -> f32 {
        let max = self.max_slide_distance();
        if max <= 0.0 {
            return 0.0;
        }
        self.position.max(0.0) / max
    }

    fn publish_progress(&mut self, raw: f32) {
        let progress = raw.clamp(0.0, 1.0);
        if progress != self.progress {
            self.progress = progress;
            emit_with(&mut self.on_progress_change, progress);
        }
    }

    fn fire_milestones(&mut self, raw: f32) {
        for milestone in MILESTONES {
            if raw >= milestone && !self.milestones.contains(&milestone) {
                self.milestones.push(milestone);
                trace!(milestone, "slide milestone");
                self.fire_haptic(&milestone_intensity(milestone).pattern());
            }
        }
    }

    fn fire_haptic(&self, pattern: &HapticPattern) {
        if self.config.enable_haptics {
            self.haptics.fire_pattern(pattern);
        }
    }

    fn release(&mut self, now: Timestamp) {
        let raw = self.raw_progress();
        let velocity = self.velocity;
        let threshold = self.config.velocity_threshold;
        let flick = self.config.enable_velocity_complete
            && (velocity >= threshold || (raw >= 0.5 && velocity >= threshold / 2.0));
        let confirm = raw >= self.config.threshold || flick;

        debug!(progress = raw, velocity, confirm, "slide released");
        emit(&mut self.on_slide_end);
        if confirm {
            self.begin_loading(now);
        } else {
            self.snap_back(now);
            emit(&mut self.on_cancel);
        }
    }

    fn begin_loading(&mut self, at: Timestamp) {
        self.scheduler.clear();
        self.phase = DragPhase::Loading;
        self.velocity = 0.0;
        self.position = self.max_slide_distance();
        self.spring.snap_to(self.position);
        self.publish_progress(1.0);
        debug!(at = %at, "slide confirming");
        emit(&mut self.on_confirm);
    }

    fn snap_back(&mut self, now: Timestamp) {
        self.milestones.clear();
        self.phase = DragPhase::SnappingBack;
        self.spring = Spring::new(self.config.spring, self.position);
        self.spring.set_velocity(self.velocity_px_per_sec());
        self.spring.set_target(0.0);
        self.velocity = 0.0;
        self.last_frame = now;
        self.scheduler.request_frames(now);
    }

    fn start_hold(&mut self, session: GestureSession) -> bool {
        let now = session.start_time;
        self.scheduler.clear();
        self.session = Some(session);
        self.position = 0.0;
        self.velocity = 0.0;
        self.milestones.clear();
        self.phase = DragPhase::Holding;
        self.scheduler.schedule(
            now + self.config.hold_duration_ms.max(1),
            DragTimer::HoldComplete,
        );
        self.scheduler.request_frames(now);
        debug!(at = %now, "hold started");
        emit(&mut self.on_slide_start);
        true
    }

    fn release_hold(&mut self) {
        self.scheduler.clear();
        self.session = None;
        self.position = 0.0;
        self.milestones.clear();
        self.phase = DragPhase::Idle;
        self.publish_progress(0.0);
        debug!("hold released early");
        emit(&mut self.on_slide_end);
        emit(&mut self.on_cancel);
    }

    fn on_frame(&mut self, at: Timestamp) {
        match self.phase {
            DragPhase::SnappingBack => {
                let dt = at.saturating_since(self.last_frame) as f32 / 1000.0;
                self.last_frame = at;
                self.spring.step(dt);
                self.position = self.spring.value();
                let raw = self.raw_progress();
                self.publish_progress(raw);

                if self.spring.is_settled() {
                    self.scheduler.stop_frames();
                    self.session = None;
                    self.position = 0.0;
                    self.phase = DragPhase::Idle;
                    self.publish_progress(0.0);
                    trace!(at = %at, "snap back settled");
                }
            }
            DragPhase::Holding => {
                let Some(session) = self.session else {
                    self.scheduler.stop_frames();
                    return;
                };
                let hold = self.config.hold_duration_ms.max(1);
                let raw = (session.elapsed(at) as f32 / hold as f32).clamp(0.0, 1.0);
                self.position = raw * self.max_slide_distance();
                self.fire_milestones(raw);
                self.publish_progress(raw);
            }
            _ => self.scheduler.stop_frames(),
        }
    }

    fn complete_hold(&mut self, at: Timestamp) {
        if self.phase != DragPhase::Holding {
            return;
        }
        self.fire_milestones(1.0);
        emit(&mut self.on_slide_end);
        self.begin_loading(at);
    }
}

/// Leaves `Loading` as a failure if the confirm future is dropped unsettled
struct LoadingGuard<'a> {
    confirm: &'a mut DragConfirm,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.confirm.phase == DragPhase::Loading {
            self.confirm.fail_loading();
        }
    }
}

impl Recognizer for DragConfirm {
    fn handle_event(&mut self, event: &InputEvent) -> EventResponse {
        let now = event.timestamp;
        match event.kind {
            InputKind::PointerDown { position, .. } => {
                if self.pointer_down(position.x, now) {
                    EventResponse::CapturePointer
                } else {
                    EventResponse::Ignored
                }
            }
            InputKind::PointerMove { position, .. } if self.phase == DragPhase::Dragging => {
                self.pointer_move(position.x, now);
                EventResponse::Handled
            }
            InputKind::PointerUp { position, .. }
                if matches!(self.phase, DragPhase::Dragging | DragPhase::Holding) =>
            {
                self.pointer_up(position.x, now);
                EventResponse::Handled
            }
            InputKind::PointerCancel => {
                if self.cancel(now) {
                    EventResponse::Handled
                } else {
                    EventResponse::Ignored
                }
            }
            InputKind::KeyDown { key, repeat }
                if key.is_activation() && self.config.reduced_motion =>
            {
                self.advance(now);
                if repeat {
                    return if self.phase == DragPhase::Holding {
                        EventResponse::PreventDefault
                    } else {
                        EventResponse::Ignored
                    };
                }
                if self.accepts_input()
                    && self.phase != DragPhase::Holding
                    && self.start_hold(GestureSession::keyboard(now))
                {
                    EventResponse::PreventDefault
                } else {
                    EventResponse::Ignored
                }
            }
            InputKind::KeyUp { key } if key.is_activation() => {
                self.advance(now);
                let keyboard_hold = self.phase == DragPhase::Holding
                    && self.session.map_or(false, |s| s.is_keyboard());
                if keyboard_hold {
                    self.release_hold();
                    EventResponse::Handled
                } else {
                    EventResponse::Ignored
                }
            }
            _ => {
                self.advance(now);
                EventResponse::Ignored
            }
        }
    }

    fn advance(&mut self, now: Timestamp) {
        if now > self.now {
            self.now = now;
        }
        while let Some((at, due)) = self.scheduler.pop_due(now) {
            match due {
                Due::Timer(DragTimer::HoldComplete) => self.complete_hold(at),
                Due::Frame => self.on_frame(at),
            }
        }
    }

    fn reset(&mut self) {
        self.scheduler.clear();
        self.session = None;
        self.phase = DragPhase::Idle;
        self.position = 0.0;
        self.progress = 0.0;
        self.velocity = 0.0;
        self.milestones.clear();
        self.spring.snap_to(0.0);
    }

    fn is_active(&self) -> bool {
        !matches!(self.phase, DragPhase::Idle | DragPhase::Confirmed)
    }

    fn next_deadline(&self) -> Option<Timestamp> {
        self.scheduler.next_deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestura_core::events::KeyCode;
    use gestura_core::haptics::RecordingActuator;
    use std::sync::{Arc, Mutex};

    fn ms(v: u64) -> Timestamp {
        Timestamp::from_millis(v)
    }

    /// 200 px of travel
    fn track() -> TrackGeometry {
        TrackGeometry::new(248.0, 40.0, 4.0)
    }

    #[derive(Default)]
    struct Counts {
        confirm: u32,
        complete: u32,
        cancel: u32,
        error: u32,
    }

    fn observed(config: DragConfirmConfig) -> (DragConfirm, Arc<Mutex<Counts>>) {
        let counts = Arc::new(Mutex::new(Counts::default()));
        let (c1, c2, c3, c4) = (
            counts.clone(),
            counts.clone(),
            counts.clone(),
            counts.clone(),
        );
        let slider = DragConfirm::new(config.geometry(track()))
            .on_confirm(move || c1.lock().unwrap().confirm += 1)
            .on_complete(move || c2.lock().unwrap().complete += 1)
            .on_cancel(move || c3.lock().unwrap().cancel += 1)
            .on_error(move || c4.lock().unwrap().error += 1);
        (slider, counts)
    }

    #[test]
    fn test_geometry() {
        assert_eq!(track().max_slide_distance(), 200.0);
        assert_eq!(TrackGeometry::new(40.0, 48.0, 4.0).max_slide_distance(), 0.0);
    }

    #[test]
    fn test_elastic_edges() {
        assert_eq!(elastic(-50.0, 200.0), -10.0);
        assert_eq!(elastic(120.0, 200.0), 120.0);
        assert_eq!(elastic(216.0, 200.0), 212.0);
    }

    #[test]
    fn test_release_at_threshold_confirms() {
        let (mut slider, counts) = observed(DragConfirmConfig::default());
        assert!(slider.pointer_down(0.0, ms(0)));
        slider.pointer_move(100.0, ms(1_000));
        slider.pointer_move(170.0, ms(2_000));
        assert_eq!(slider.progress(), 0.85);
        slider.pointer_up(170.0, ms(2_000));

        assert_eq!(slider.phase(), DragPhase::Loading);
        assert_eq!(slider.position(), 200.0);
        assert_eq!(slider.progress(), 1.0);
        assert_eq!(counts.lock().unwrap().confirm, 1);

        assert_eq!(slider.settle(Ok::<(), ()>(())), Ok(()));
        assert!(slider.is_confirmed());
        assert_eq!(counts.lock().unwrap().complete, 1);
    }

    #[test]
    fn test_slow_partial_release_snaps_back() {
        let (mut slider, counts) = observed(DragConfirmConfig::default());
        slider.pointer_down(0.0, ms(0));
        slider.pointer_move(120.0, ms(1_000));
        slider.pointer_up(120.0, ms(1_100));

        assert_eq!(slider.phase(), DragPhase::SnappingBack);
        assert_eq!(counts.lock().unwrap().cancel, 1);

        slider.advance(ms(5_000));
        assert_eq!(slider.phase(), DragPhase::Idle);
        assert_eq!(slider.position(), 0.0);
        assert_eq!(slider.progress(), 0.0);
        assert!(slider.next_deadline().is_none());
        assert_eq!(counts.lock().unwrap().confirm, 0);
    }

    #[test]
    fn test_velocity_flick_confirms() {
        let (mut slider, counts) = observed(DragConfirmConfig::default());
        slider.pointer_down(0.0, ms(0));
        slider.pointer_move(60.0, ms(50));
        assert!((slider.velocity_px_per_sec() - 1200.0).abs() < 1e-3);
        slider.pointer_up(60.0, ms(50));
        assert_eq!(slider.phase(), DragPhase::Loading);
        assert_eq!(counts.lock().unwrap().confirm, 1);
    }

    #[test]
    fn test_late_release_at_last_position_keeps_flick() {
        let (mut slider, counts) = observed(DragConfirmConfig::default());
        slider.pointer_down(0.0, ms(0));
        slider.pointer_move(60.0, ms(50));
        slider.pointer_up(60.0, ms(58));
        assert_eq!(slider.phase(), DragPhase::Loading);
        assert_eq!(counts.lock().unwrap().confirm, 1);

        // Same sequence through the event path
        let (mut slider, _) = observed(DragConfirmConfig::default());
        slider.handle_event(&InputEvent::pointer_down(100, 0.0, 0.0, PointerKind::Touch));
        slider.handle_event(&InputEvent::pointer_move(150, 60.0, 0.0, PointerKind::Touch));
        slider.handle_event(&InputEvent::pointer_up(158, 60.0, 0.0, PointerKind::Touch));
        assert_eq!(slider.phase(), DragPhase::Loading);
    }

    #[test]
    fn test_session_spans_every_active_phase() {
        let (mut slider, _) = observed(DragConfirmConfig::default());
        let consistent = |slider: &DragConfirm| slider.is_active() == slider.session().is_some();

        assert!(consistent(&slider));
        slider.pointer_down(0.0, ms(0));
        slider.pointer_move(80.0, ms(1_000));
        assert!(consistent(&slider));

        slider.pointer_up(80.0, ms(1_500));
        assert_eq!(slider.phase(), DragPhase::SnappingBack);
        assert!(slider.session().is_some());
        assert!(consistent(&slider));

        slider.advance(ms(5_000));
        assert_eq!(slider.phase(), DragPhase::Idle);
        assert!(slider.session().is_none());
        assert!(consistent(&slider));

        slider.pointer_down(0.0, ms(6_000));
        slider.pointer_move(190.0, ms(7_000));
        slider.pointer_up(190.0, ms(7_500));
        assert_eq!(slider.phase(), DragPhase::Loading);
        assert!(consistent(&slider));
        slider.settle(Ok::<(), ()>(())).unwrap();
        assert!(!slider.is_active());
        assert!(consistent(&slider));
    }

    #[test]
    fn test_velocity_complete_can_be_disabled() {
        let (mut slider, counts) = observed(DragConfirmConfig {
            enable_velocity_complete: false,
            ..Default::default()
        });
        slider.pointer_down(0.0, ms(0));
        slider.pointer_move(60.0, ms(50));
        slider.pointer_up(60.0, ms(50));
        assert_eq!(slider.phase(), DragPhase::SnappingBack);
        assert_eq!(counts.lock().unwrap().cancel, 1);
    }

    #[test]
    fn test_half_plus_flick() {
        let (mut slider, _) = observed(DragConfirmConfig::default());
        slider.pointer_down(0.0, ms(0));
        slider.pointer_move(100.0, ms(1_000));
        slider.pointer_move(110.0, ms(1_020));
        slider.pointer_up(110.0, ms(1_020));
        assert_eq!(slider.phase(), DragPhase::Loading);
    }

    #[test]
    fn test_milestones_fire_once_per_attempt() {
        let actuator = RecordingActuator::new();
        let (slider, _) = observed(DragConfirmConfig::default());
        let mut slider = slider.with_haptics(HapticDispatcher::new(actuator.clone()));

        slider.pointer_down(0.0, ms(0));
        slider.pointer_move(120.0, ms(1_000));
        slider.pointer_move(40.0, ms(2_000));
        slider.pointer_move(130.0, ms(3_000));
        assert_eq!(slider.snapshot().milestones_fired.as_slice(), &[0.5]);
        slider.pointer_move(60.0, ms(4_000));
        slider.pointer_up(60.0, ms(4_100));
        assert!(slider.snapshot().milestones_fired.is_empty());
        slider.advance(ms(8_000));

        slider.pointer_down(0.0, ms(9_000));
        slider.pointer_move(120.0, ms(10_000));
        assert_eq!(actuator.played(), vec![vec![10], vec![10]]);
    }

    #[test]
    fn test_overscroll_clamps_public_progress() {
        let actuator = RecordingActuator::new();
        let (slider, _) = observed(DragConfirmConfig::default());
        let mut slider = slider.with_haptics(HapticDispatcher::new(actuator.clone()));

        slider.pointer_down(0.0, ms(0));
        slider.pointer_move(250.0, ms(2_000));
        assert!(slider.position() > 200.0);
        assert_eq!(slider.progress(), 1.0);
        assert_eq!(actuator.played(), vec![vec![10], vec![20], vec![30]]);
    }

    #[test]
    fn test_underscroll_resists() {
        let (mut slider, _) = observed(DragConfirmConfig::default());
        slider.pointer_down(50.0, ms(0));
        slider.pointer_move(0.0, ms(500));
        assert_eq!(slider.position(), -10.0);
        assert_eq!(slider.progress(), 0.0);
    }

    #[test]
    fn test_confirmed_ignores_input_until_reset() {
        let (mut slider, _) = observed(DragConfirmConfig::default());
        slider.pointer_down(0.0, ms(0));
        slider.pointer_move(190.0, ms(1_000));
        slider.pointer_up(190.0, ms(1_000));
        slider.settle(Ok::<(), ()>(())).unwrap();

        let down = InputEvent::pointer_down(2_000, 0.0, 0.0, PointerKind::Mouse);
        assert_eq!(slider.handle_event(&down), EventResponse::Ignored);
        assert!(slider.is_confirmed());

        slider.reset();
        assert_eq!(slider.handle_event(&down), EventResponse::CapturePointer);
    }

    #[test]
    fn test_failed_confirm_leaves_loading() {
        let (mut slider, counts) = observed(DragConfirmConfig::default());
        slider.pointer_down(0.0, ms(0));
        slider.pointer_move(190.0, ms(1_000));
        slider.pointer_up(190.0, ms(1_000));

        assert_eq!(slider.settle(Err("declined")), Err("declined"));
        assert_eq!(slider.phase(), DragPhase::SnappingBack);
        slider.advance(ms(5_000));
        assert_eq!(slider.phase(), DragPhase::Idle);
        assert_eq!(counts.lock().unwrap().error, 1);
    }

    #[test]
    fn test_confirm_with_future() {
        let (mut slider, counts) = observed(DragConfirmConfig::default());
        slider.pointer_down(0.0, ms(0));
        slider.pointer_move(190.0, ms(1_000));
        slider.pointer_up(190.0, ms(1_000));

        let result = pollster::block_on(slider.confirm_with(async { Ok::<(), String>(()) }));
        assert!(result.is_ok());
        assert!(slider.is_confirmed());
        assert_eq!(counts.lock().unwrap().complete, 1);
    }

    #[test]
    fn test_rejected_future_propagates_error() {
        let (mut slider, _) = observed(DragConfirmConfig::default());
        slider.pointer_down(0.0, ms(0));
        slider.pointer_move(190.0, ms(1_000));
        slider.pointer_up(190.0, ms(1_000));

        let result = pollster::block_on(
            slider.confirm_with(async { Err::<(), String>("network".to_string()) }),
        );
        assert_eq!(result, Err("network".to_string()));
        assert!(!slider.is_loading());
    }

    #[test]
    fn test_dropped_confirm_future_leaves_loading() {
        let (mut slider, counts) = observed(DragConfirmConfig::default());
        slider.pointer_down(0.0, ms(0));
        slider.pointer_move(190.0, ms(1_000));
        slider.pointer_up(190.0, ms(1_000));

        drop(slider.confirm_with(std::future::pending::<std::result::Result<(), ()>>()));
        assert!(!slider.is_loading());
        assert_eq!(counts.lock().unwrap().error, 1);
    }

    #[test]
    fn test_reduced_motion_hold() {
        let (mut slider, counts) =
            observed(DragConfirmConfig::default().reduced_motion(1_500));

        slider.pointer_down(0.0, ms(0));
        assert_eq!(slider.phase(), DragPhase::Holding);
        slider.advance(ms(750));
        assert!(slider.progress() > 0.45 && slider.progress() < 0.5);

        slider.pointer_up(0.0, ms(750));
        assert_eq!(slider.phase(), DragPhase::Idle);
        assert_eq!(slider.progress(), 0.0);
        assert_eq!(counts.lock().unwrap().cancel, 1);

        slider.pointer_down(0.0, ms(1_000));
        slider.advance(ms(2_500));
        assert_eq!(slider.phase(), DragPhase::Loading);
        assert_eq!(slider.progress(), 1.0);
        assert_eq!(counts.lock().unwrap().confirm, 1);
    }

    #[test]
    fn test_keyboard_hold() {
        let (mut slider, counts) =
            observed(DragConfirmConfig::default().reduced_motion(1_000));
        let down = InputEvent::key_down(0, KeyCode::Space);
        assert_eq!(slider.handle_event(&down), EventResponse::PreventDefault);
        assert_eq!(
            slider.handle_event(&InputEvent::key_up(400, KeyCode::Space)),
            EventResponse::Handled
        );
        assert_eq!(counts.lock().unwrap().cancel, 1);

        slider.handle_event(&InputEvent::key_down(500, KeyCode::Enter));
        slider.advance(ms(1_500));
        assert!(slider.is_loading());
    }

    #[test]
    fn test_reset_clears_pending_work() {
        let (mut slider, counts) =
            observed(DragConfirmConfig::default().reduced_motion(1_500));
        slider.pointer_down(0.0, ms(0));
        slider.advance(ms(100));
        slider.reset();

        assert!(slider.next_deadline().is_none());
        slider.advance(ms(60_000));
        assert_eq!(slider.phase(), DragPhase::Idle);
        assert_eq!(counts.lock().unwrap().confirm, 0);
    }

    #[test]
    fn test_config_validation() {
        assert!(DragConfirmConfig::default().validate().is_ok());
        let bad = DragConfirmConfig {
            threshold: 1.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let cramped = DragConfirmConfig::default().geometry(TrackGeometry::new(40.0, 48.0, 0.0));
        assert!(cramped.validate().is_err());
    }
}
