//! Long-press recognizer
//!
//! A staged press: `Idle → Pressing → Preview → Ready → Revealed`.
//!
//! Two observers share one start timestamp: a completion timer due exactly
//! `threshold_ms` after the press began, and a frame loop that publishes
//! progress and walks the intermediate stages. The scheduler fires the timer
//! before any frame due at the same instant, so progress reaches 1 exactly
//! when the stage flips to `Revealed`.
//!
//! Movement beyond `cancel_on_move_distance` cancels a pointer press; a
//! keyboard press (Enter/Space) has no coordinates and is never cancelled by
//! movement. Invalid calls, such as starting while already pressing, are
//! ignored.

use gestura_animation::Easing;
use gestura_core::error::{ensure_positive, GestureError, Result};
use gestura_core::events::{EventResponse, InputEvent, InputKind, Point, PointerKind};
use gestura_core::haptics::{HapticDispatcher, HapticIntensity, HapticPattern};
use gestura_core::scheduler::{Due, Scheduler};
use gestura_core::session::{GestureSession, InputOrigin};
use gestura_core::time::{Timestamp, FRAME_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::recognizer::{emit, emit_with, Callback, Recognizer, ValueCallback};

/// Progressive feedback stages of a press
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Idle,
    Pressing,
    Preview,
    Ready,
    Revealed,
}

/// Long-press configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongPressConfig {
    /// Hold duration until completion
    pub threshold_ms: u64,
    /// Pointer travel (px) that cancels the press
    pub cancel_on_move_distance: f32,
    /// Walk through preview/ready stages while pressing
    pub enable_stages: bool,
    pub preview_delay_ms: u64,
    pub ready_delay_ms: u64,
    pub enable_haptics: bool,
    pub disabled: bool,
    /// Curve applied to `eased_progress` in snapshots
    pub progress_easing: Easing,
    pub frame_interval_ms: u64,
}

impl Default for LongPressConfig {
    fn default() -> Self {
        Self {
            threshold_ms: 500,
            cancel_on_move_distance: 10.0,
            enable_stages: true,
            preview_delay_ms: 200,
            ready_delay_ms: 400,
            enable_haptics: true,
            disabled: false,
            progress_easing: Easing::Linear,
            frame_interval_ms: FRAME_INTERVAL_MS,
        }
    }
}

impl LongPressConfig {
    pub fn new(threshold_ms: u64) -> Self {
        Self {
            threshold_ms,
            ..Default::default()
        }
    }

    pub fn stages(mut self, preview_delay_ms: u64, ready_delay_ms: u64) -> Self {
        self.enable_stages = true;
        self.preview_delay_ms = preview_delay_ms;
        self.ready_delay_ms = ready_delay_ms;
        self
    }

    pub fn without_stages(mut self) -> Self {
        self.enable_stages = false;
        self
    }

    pub fn cancel_distance(mut self, px: f32) -> Self {
        self.cancel_on_move_distance = px;
        self
    }

    pub fn haptics(mut self, enabled: bool) -> Self {
        self.enable_haptics = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.threshold_ms == 0 {
            return Err(GestureError::invalid("threshold_ms", "must be > 0"));
        }
        ensure_positive("cancel_on_move_distance", self.cancel_on_move_distance)?;
        if self.enable_stages {
            if self.preview_delay_ms > self.ready_delay_ms {
                return Err(GestureError::invalid(
                    "preview_delay_ms",
                    "must not exceed ready_delay_ms",
                ));
            }
            if self.ready_delay_ms > self.threshold_ms {
                return Err(GestureError::invalid(
                    "ready_delay_ms",
                    "must not exceed threshold_ms",
                ));
            }
        }
        Ok(())
    }
}

/// Read-only view for renderers
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LongPressSnapshot {
    pub stage: Stage,
    pub progress: f32,
    pub eased_progress: f32,
    pub is_pressing: bool,
    pub is_complete: bool,
    pub is_keyboard: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PressTimer {
    Complete,
}

pub struct LongPress {
    config: LongPressConfig,
    session: Option<GestureSession>,
    stage: Stage,
    progress: f32,
    is_pressing: bool,
    is_complete: bool,
    scheduler: Scheduler<PressTimer>,
    haptics: HapticDispatcher,
    on_start: Option<Callback>,
    on_progress: Option<ValueCallback<f32>>,
    on_stage_change: Option<ValueCallback<Stage>>,
    on_preview: Option<Callback>,
    on_ready: Option<Callback>,
    on_complete: Option<Callback>,
    on_cancel: Option<Callback>,
}

impl LongPress {
    pub fn new(config: LongPressConfig) -> Self {
        let scheduler = Scheduler::with_frame_interval(config.frame_interval_ms);
        Self {
            config,
            session: None,
            stage: Stage::Idle,
            progress: 0.0,
            is_pressing: false,
            is_complete: false,
            scheduler,
            haptics: HapticDispatcher::unsupported(),
            on_start: None,
            on_progress: None,
            on_stage_change: None,
            on_preview: None,
            on_ready: None,
            on_complete: None,
            on_cancel: None,
        }
    }

    pub fn with_haptics(mut self, haptics: HapticDispatcher) -> Self {
        self.haptics = haptics;
        self
    }

    pub fn on_start<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_start = Some(Box::new(callback));
        self
    }

    pub fn on_progress<F: FnMut(f32) + Send + 'static>(mut self, callback: F) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn on_stage_change<F: FnMut(Stage) + Send + 'static>(mut self, callback: F) -> Self {
        self.on_stage_change = Some(Box::new(callback));
        self
    }

    pub fn on_preview<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_preview = Some(Box::new(callback));
        self
    }

    pub fn on_ready<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_ready = Some(Box::new(callback));
        self
    }

    pub fn on_complete<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn on_cancel<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_cancel = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &LongPressConfig {
        &self.config
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
        if disabled {
            self.cancel();
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_pressing(&self) -> bool {
        self.is_pressing
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn snapshot(&self) -> LongPressSnapshot {
        LongPressSnapshot {
            stage: self.stage,
            progress: self.progress,
            eased_progress: self.config.progress_easing.apply(self.progress),
            is_pressing: self.is_pressing,
            is_complete: self.is_complete,
            is_keyboard: self.session.map_or(false, |s| s.is_keyboard()),
        }
    }

    /// Begin a press. Ignored while disabled or already pressing.
    pub fn start(&mut self, x: f32, y: f32, is_keyboard: bool, now: Timestamp) -> bool {
        let origin = if is_keyboard {
            InputOrigin::Keyboard
        } else {
            InputOrigin::Pointer(PointerKind::Mouse)
        };
        self.begin(GestureSession::new(Point::new(x, y), now, origin))
    }

    fn begin(&mut self, session: GestureSession) -> bool {
        self.advance(session.start_time);
        if self.config.disabled || self.is_pressing {
            return false;
        }

        let now = session.start_time;
        self.scheduler.clear();
        self.session = Some(session);
        self.progress = 0.0;
        self.is_pressing = true;
        self.is_complete = false;

        self.scheduler
            .schedule(now + self.config.threshold_ms.max(1), PressTimer::Complete);
        self.scheduler.request_frames(now);

        debug!(origin = ?session.origin, at = %now, "long press started");
        self.set_stage(Stage::Pressing);
        emit(&mut self.on_start);
        true
    }

    /// Pointer movement. Cancels a pointer press that strays too far.
    pub fn move_to(&mut self, x: f32, y: f32, now: Timestamp) {
        self.advance(now);
        if !self.is_pressing || self.is_complete {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.is_keyboard() {
            return;
        }

        let position = Point::new(x, y);
        session.update(position, now);
        let distance = session.distance_from_start(position);
        if distance > self.config.cancel_on_move_distance {
            debug!(distance, "long press moved beyond tolerance");
            self.cancel();
        }
    }

    /// Release. Early release cancels; after completion the result is kept.
    pub fn end(&mut self, now: Timestamp) {
        self.advance(now);
        if !self.is_pressing {
            return;
        }
        if self.is_complete {
            self.is_pressing = false;
            return;
        }
        self.cancel();
    }

    /// Abort an unfinished press. Returns true if a press was cancelled.
    pub fn cancel(&mut self) -> bool {
        if !self.is_pressing || self.is_complete {
            return false;
        }

        self.scheduler.clear();
        self.session = None;
        self.is_pressing = false;
        self.progress = 0.0;
        debug!("long press cancelled");
        self.set_stage(Stage::Idle);
        emit(&mut self.on_cancel);
        true
    }

    fn set_stage(&mut self, stage: Stage) {
        if self.stage == stage {
            return;
        }
        self.stage = stage;
        emit_with(&mut self.on_stage_change, stage);
    }

    fn fire_haptic(&self, pattern: HapticPattern) {
        if self.config.enable_haptics {
            self.haptics.fire_pattern(&pattern);
        }
    }

    fn on_frame(&mut self, at: Timestamp) {
        let Some(session) = self.session else {
            self.scheduler.stop_frames();
            return;
        };

        let elapsed = session.elapsed(at);
        let threshold = self.config.threshold_ms.max(1);
        let progress = (elapsed as f32 / threshold as f32).clamp(0.0, 1.0);
        if progress > self.progress {
            self.progress = progress;
            emit_with(&mut self.on_progress, progress);
        }

        if self.config.enable_stages {
            if self.stage == Stage::Pressing && elapsed >= self.config.preview_delay_ms {
                self.set_stage(Stage::Preview);
                self.fire_haptic(HapticIntensity::Light.pattern());
                emit(&mut self.on_preview);
            }
            if matches!(self.stage, Stage::Pressing | Stage::Preview)
                && elapsed >= self.config.ready_delay_ms
            {
                self.set_stage(Stage::Ready);
                self.fire_haptic(HapticIntensity::Medium.pattern());
                emit(&mut self.on_ready);
            }
        }

        if self.progress >= 1.0 {
            self.scheduler.stop_frames();
        }
    }

    fn complete(&mut self, at: Timestamp) {
        self.scheduler.stop_frames();
        self.is_complete = true;
        if self.progress < 1.0 {
            self.progress = 1.0;
            emit_with(&mut self.on_progress, 1.0);
        }
        debug!(at = %at, "long press complete");
        self.set_stage(Stage::Revealed);
        self.fire_haptic(HapticPattern::success());
        emit(&mut self.on_complete);
    }
}

impl Recognizer for LongPress {
    fn handle_event(&mut self, event: &InputEvent) -> EventResponse {
        let now = event.timestamp;
        match event.kind {
            InputKind::PointerDown { position, pointer } => {
                if self.begin(GestureSession::pointer(position, now, pointer)) {
                    EventResponse::Handled
                } else {
                    EventResponse::Ignored
                }
            }
            InputKind::PointerMove { position, .. } => {
                let active = self.is_pressing;
                self.move_to(position.x, position.y, now);
                if active {
                    EventResponse::Handled
                } else {
                    EventResponse::Ignored
                }
            }
            InputKind::PointerUp { .. } => {
                let active = self.is_pressing;
                self.end(now);
                if active {
                    EventResponse::Handled
                } else {
                    EventResponse::Ignored
                }
            }
            InputKind::PointerCancel | InputKind::PointerLeave => {
                self.advance(now);
                if self.cancel() {
                    EventResponse::Handled
                } else {
                    EventResponse::Ignored
                }
            }
            InputKind::KeyDown { key, repeat } if key.is_activation() => {
                if repeat {
                    // Swallow auto-repeat of the key holding the press
                    self.advance(now);
                    return if self.is_pressing {
                        EventResponse::PreventDefault
                    } else {
                        EventResponse::Ignored
                    };
                }
                if self.begin(GestureSession::keyboard(now)) {
                    EventResponse::PreventDefault
                } else {
                    EventResponse::Ignored
                }
            }
            InputKind::KeyUp { key } if key.is_activation() => {
                let keyboard_press = self.session.map_or(false, |s| s.is_keyboard());
                if !keyboard_press {
                    self.advance(now);
                    return EventResponse::Ignored;
                }
                self.end(now);
                EventResponse::Handled
            }
            InputKind::ContextMenu => {
                self.advance(now);
                if self.is_pressing {
                    EventResponse::PreventDefault
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
        while let Some((at, due)) = self.scheduler.pop_due(now) {
            match due {
                Due::Timer(PressTimer::Complete) => self.complete(at),
                Due::Frame => self.on_frame(at),
            }
        }
    }

    fn reset(&mut self) {
        self.scheduler.clear();
        self.session = None;
        self.stage = Stage::Idle;
        self.progress = 0.0;
        self.is_pressing = false;
        self.is_complete = false;
    }

    fn is_active(&self) -> bool {
        self.session.is_some()
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

    #[derive(Default)]
    struct Counts {
        complete: u32,
        cancel: u32,
        stages: Vec<Stage>,
        progress: Vec<f32>,
    }

    fn observed(config: LongPressConfig) -> (LongPress, Arc<Mutex<Counts>>) {
        let counts = Arc::new(Mutex::new(Counts::default()));
        let (c1, c2, c3, c4) = (
            counts.clone(),
            counts.clone(),
            counts.clone(),
            counts.clone(),
        );
        let press = LongPress::new(config)
            .on_complete(move || c1.lock().unwrap().complete += 1)
            .on_cancel(move || c2.lock().unwrap().cancel += 1)
            .on_stage_change(move |s| c3.lock().unwrap().stages.push(s))
            .on_progress(move |p| c4.lock().unwrap().progress.push(p));
        (press, counts)
    }

    #[test]
    fn test_early_release_cancels() {
        let (mut press, counts) = observed(LongPressConfig::default());
        assert!(press.start(0.0, 0.0, false, ms(0)));
        press.advance(ms(300));
        assert_eq!(press.stage(), Stage::Preview);

        press.end(ms(350));
        assert_eq!(press.stage(), Stage::Idle);
        assert_eq!(press.progress(), 0.0);
        assert!(!press.is_active());

        press.advance(ms(5_000));
        let counts = counts.lock().unwrap();
        assert_eq!(counts.complete, 0);
        assert_eq!(counts.cancel, 1);
    }

    #[test]
    fn test_hold_to_threshold_completes_once() {
        let (mut press, counts) = observed(LongPressConfig::default());
        press.start(0.0, 0.0, false, ms(1_000));
        press.advance(ms(1_500));

        assert_eq!(press.stage(), Stage::Revealed);
        assert_eq!(press.progress(), 1.0);
        assert!(press.is_complete());
        assert!(press.is_pressing());

        press.advance(ms(9_000));
        press.end(ms(9_000));
        assert!(!press.is_pressing());
        assert_eq!(press.stage(), Stage::Revealed);

        let counts = counts.lock().unwrap();
        assert_eq!(counts.complete, 1);
        assert_eq!(counts.cancel, 0);
        assert_eq!(
            counts.stages,
            vec![Stage::Pressing, Stage::Preview, Stage::Ready, Stage::Revealed]
        );
    }

    #[test]
    fn test_progress_strictly_increases_and_freezes() {
        let (mut press, counts) = observed(LongPressConfig::default());
        press.start(0.0, 0.0, false, ms(0));
        for t in (0..=700).step_by(5) {
            press.advance(ms(t));
        }

        let counts = counts.lock().unwrap();
        assert!(counts.progress.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(counts.progress.last().copied(), Some(1.0));
        assert!(counts.progress[..counts.progress.len() - 1]
            .iter()
            .all(|p| *p < 1.0));
    }

    #[test]
    fn test_movement_cancels_pointer_press() {
        let (mut press, counts) = observed(LongPressConfig::default());
        press.start(100.0, 100.0, false, ms(0));
        press.move_to(106.0, 106.0, ms(100));
        assert!(press.is_pressing());

        press.move_to(108.0, 108.0, ms(450));
        assert!(!press.is_pressing());
        assert_eq!(press.stage(), Stage::Idle);
        assert_eq!(counts.lock().unwrap().cancel, 1);
    }

    #[test]
    fn test_keyboard_press_ignores_movement() {
        let (mut press, counts) = observed(LongPressConfig::default());
        press.start(0.0, 0.0, true, ms(0));
        press.move_to(500.0, 500.0, ms(100));
        assert!(press.is_pressing());

        press.advance(ms(500));
        assert_eq!(press.stage(), Stage::Revealed);
        assert_eq!(counts.lock().unwrap().complete, 1);
    }

    #[test]
    fn test_start_while_pressing_is_ignored() {
        let (mut press, _) = observed(LongPressConfig::default());
        assert!(press.start(0.0, 0.0, false, ms(0)));
        press.advance(ms(300));
        assert!(!press.start(0.0, 0.0, false, ms(300)));
        // The original deadline still holds
        press.advance(ms(500));
        assert!(press.is_complete());
    }

    #[test]
    fn test_disabled_ignores_start() {
        let (mut press, _) = observed(LongPressConfig {
            disabled: true,
            ..Default::default()
        });
        assert!(!press.start(0.0, 0.0, false, ms(0)));
        assert!(!press.is_active());
        assert!(press.next_deadline().is_none());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let (mut press, counts) = observed(LongPressConfig::default());
        assert!(!press.cancel());
        press.start(0.0, 0.0, false, ms(0));
        assert!(press.cancel());
        assert!(!press.cancel());
        assert_eq!(counts.lock().unwrap().cancel, 1);
    }

    #[test]
    fn test_stages_disabled() {
        let (mut press, counts) = observed(LongPressConfig::default().without_stages());
        press.start(0.0, 0.0, false, ms(0));
        press.advance(ms(450));
        assert_eq!(press.stage(), Stage::Pressing);
        press.advance(ms(500));
        assert_eq!(
            counts.lock().unwrap().stages,
            vec![Stage::Pressing, Stage::Revealed]
        );
    }

    #[test]
    fn test_reset_leaves_nothing_scheduled() {
        let (mut press, counts) = observed(LongPressConfig::default());
        press.start(0.0, 0.0, false, ms(0));
        press.advance(ms(100));
        press.reset();

        assert!(press.next_deadline().is_none());
        press.advance(ms(10_000));
        assert_eq!(press.stage(), Stage::Idle);
        let counts = counts.lock().unwrap();
        assert_eq!(counts.complete, 0);
        assert_eq!(counts.cancel, 0);
    }

    #[test]
    fn test_staged_haptics() {
        let actuator = RecordingActuator::new();
        let mut press = LongPress::new(LongPressConfig::default())
            .with_haptics(HapticDispatcher::new(actuator.clone()));
        press.start(0.0, 0.0, false, ms(0));
        press.advance(ms(600));
        assert_eq!(actuator.played(), vec![vec![10], vec![20], vec![10, 50, 20]]);
    }

    #[test]
    fn test_keyboard_events_and_context_menu() {
        let (mut press, counts) = observed(LongPressConfig::default());

        let down = InputEvent::key_down(0, KeyCode::Enter);
        assert_eq!(press.handle_event(&down), EventResponse::PreventDefault);
        assert!(press.snapshot().is_keyboard);

        let repeat = InputEvent::new(
            50,
            InputKind::KeyDown {
                key: KeyCode::Enter,
                repeat: true,
            },
        );
        assert_eq!(press.handle_event(&repeat), EventResponse::PreventDefault);

        let menu = InputEvent::new(60, InputKind::ContextMenu);
        assert_eq!(press.handle_event(&menu), EventResponse::PreventDefault);

        assert_eq!(
            press.handle_event(&InputEvent::key_up(200, KeyCode::Enter)),
            EventResponse::Handled
        );
        assert_eq!(counts.lock().unwrap().cancel, 1);
        assert_eq!(press.handle_event(&menu), EventResponse::Ignored);
    }

    #[test]
    fn test_pointer_event_flow() {
        let (mut press, counts) = observed(LongPressConfig::default());
        press.handle_event(&InputEvent::pointer_down(0, 10.0, 10.0, PointerKind::Touch));
        press.handle_event(&InputEvent::pointer_move(100, 12.0, 11.0, PointerKind::Touch));
        press.handle_event(&InputEvent::pointer_up(520, 12.0, 11.0, PointerKind::Touch));

        assert_eq!(press.stage(), Stage::Revealed);
        assert!(!press.is_pressing());
        assert_eq!(counts.lock().unwrap().complete, 1);
    }

    #[test]
    fn test_config_validation() {
        assert!(LongPressConfig::default().validate().is_ok());
        assert!(LongPressConfig::new(0).validate().is_err());
        assert!(LongPressConfig::default().stages(450, 400).validate().is_err());
        assert!(LongPressConfig::new(300).validate().is_err());
        assert!(LongPressConfig::new(300).without_stages().validate().is_ok());
    }
}
