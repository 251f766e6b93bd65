//! Scripted replay through a recognizer
//!
//! Each step advances virtual time to its timestamp, one deadline at a time
//! so every callback is stamped with the instant it actually fired, and is
//! then applied. After the last step time runs on to the script's `until`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use clap::ValueEnum;
use gestura_core::{
    EventResponse, HapticActuator, HapticDispatcher, InputEvent, InputKind, Timestamp,
};
use gestura_recognizers::{
    DragConfirm, HoverIntent, LongPress, LongPressReveal, Recognizer, Stage, Swipe, SwipeOutcome,
};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::GesturaConfig;
use crate::script::{ControlAction, ReplayScript, Step};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognizerKind {
    LongPress,
    Swipe,
    HoverIntent,
    DragConfirm,
    Reveal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub at: u64,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplayReport {
    pub recognizer: RecognizerKind,
    pub until: u64,
    pub entries: Vec<TimelineEntry>,
    pub final_state: String,
}

impl ReplayReport {
    /// Entries whose event name matches
    pub fn events_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TimelineEntry> {
        self.entries.iter().filter(move |e| e.event == name)
    }

    pub fn render(&self) -> String {
        let mut out = format!("replay: {:?} until {}ms\n", self.recognizer, self.until);
        for entry in &self.entries {
            match &entry.detail {
                Some(detail) => {
                    out.push_str(&format!("{:>8}ms  {:<18} {}\n", entry.at, entry.event, detail))
                }
                None => out.push_str(&format!("{:>8}ms  {}\n", entry.at, entry.event)),
            }
        }
        out.push_str(&format!("final: {}\n", self.final_state));
        out
    }
}

/// Shared log that callbacks write into, stamped with the replay clock
#[derive(Clone, Default)]
struct Timeline {
    clock: Arc<AtomicU64>,
    entries: Arc<Mutex<Vec<TimelineEntry>>>,
}

impl Timeline {
    fn set_time(&self, at: Timestamp) {
        self.clock.store(at.as_millis(), Ordering::SeqCst);
    }

    fn record(&self, event: &str, detail: Option<String>) {
        let at = self.clock.load(Ordering::SeqCst);
        self.entries.lock().push(TimelineEntry {
            at,
            event: event.to_string(),
            detail,
        });
    }

    fn hook(&self, event: &'static str) -> impl FnMut() + Send + 'static {
        let timeline = self.clone();
        move || timeline.record(event, None)
    }

    fn hook_value<T: std::fmt::Debug + 'static>(
        &self,
        event: &'static str,
    ) -> impl FnMut(T) + Send + 'static {
        let timeline = self.clone();
        move |value| timeline.record(event, Some(format!("{value:?}")))
    }

    fn take(&self) -> Vec<TimelineEntry> {
        std::mem::take(&mut *self.entries.lock())
    }
}

/// Haptic actuator that writes pulses into the timeline
struct TimelineActuator(Timeline);

impl HapticActuator for TimelineActuator {
    fn vibrate(&self, pulses: &[u32]) -> bool {
        self.0.record("haptic", Some(format!("{pulses:?}")));
        true
    }
}

enum Driver {
    LongPress(LongPress),
    Swipe(Swipe),
    HoverIntent(HoverIntent),
    DragConfirm(DragConfirm),
    Reveal(LongPressReveal),
}

impl Driver {
    fn build(kind: RecognizerKind, config: &GesturaConfig, timeline: &Timeline) -> Self {
        let haptics = if config.replay.haptics {
            HapticDispatcher::new(Arc::new(TimelineActuator(timeline.clone())))
        } else {
            HapticDispatcher::unsupported()
        };
        let progress = config.replay.record_progress;

        match kind {
            RecognizerKind::LongPress => {
                let mut press = LongPress::new(config.long_press.clone())
                    .with_haptics(haptics)
                    .on_start(timeline.hook("start"))
                    .on_stage_change(timeline.hook_value::<Stage>("stage"))
                    .on_complete(timeline.hook("complete"))
                    .on_cancel(timeline.hook("cancel"));
                if progress {
                    press = press.on_progress(timeline.hook_value::<f32>("progress"));
                }
                Driver::LongPress(press)
            }
            RecognizerKind::Swipe => Driver::Swipe(
                Swipe::new(config.swipe.clone())
                    .on_swipe_start(timeline.hook("swipe_start"))
                    .on_swipe(timeline.hook_value::<SwipeOutcome>("swipe"))
                    .on_swipe_left(timeline.hook("swipe_left"))
                    .on_swipe_right(timeline.hook("swipe_right"))
                    .on_swipe_up(timeline.hook("swipe_up"))
                    .on_swipe_down(timeline.hook("swipe_down"))
                    .on_swipe_end(timeline.hook_value::<SwipeOutcome>("swipe_end")),
            ),
            RecognizerKind::HoverIntent => Driver::HoverIntent(
                HoverIntent::new(config.hover_intent.clone())
                    .on_open(timeline.hook("open"))
                    .on_close(timeline.hook("close")),
            ),
            RecognizerKind::DragConfirm => {
                let mut slider = DragConfirm::new(config.drag_confirm.clone())
                    .with_haptics(haptics)
                    .on_slide_start(timeline.hook("slide_start"))
                    .on_slide_end(timeline.hook("slide_end"))
                    .on_confirm(timeline.hook("confirm"))
                    .on_complete(timeline.hook("complete"))
                    .on_cancel(timeline.hook("cancel"))
                    .on_error(timeline.hook("error"));
                if progress {
                    slider = slider.on_progress_change(timeline.hook_value::<f32>("progress"));
                }
                Driver::DragConfirm(slider)
            }
            RecognizerKind::Reveal => {
                let stage = timeline.hook_value::<Stage>("stage");
                let cancel = timeline.hook("cancel");
                Driver::Reveal(
                    LongPressReveal::new(config.reveal.clone())
                        .with_haptics(haptics)
                        .map_press(|press| press.on_stage_change(stage).on_cancel(cancel))
                        .on_reveal(timeline.hook("reveal"))
                        .on_dismiss(timeline.hook("dismiss")),
                )
            }
        }
    }

    fn recognizer(&mut self) -> &mut dyn Recognizer {
        match self {
            Driver::LongPress(r) => r,
            Driver::Swipe(r) => r,
            Driver::HoverIntent(r) => r,
            Driver::DragConfirm(r) => r,
            Driver::Reveal(r) => r,
        }
    }

    fn control(&mut self, action: &ControlAction, at: Timestamp) -> bool {
        match (self, action) {
            (Driver::DragConfirm(slider), ControlAction::Settle { ok }) => {
                let result = if *ok { Ok(()) } else { Err(()) };
                let _ = slider.settle(result);
                true
            }
            (Driver::Reveal(reveal), ControlAction::Dismiss) => reveal.dismiss(),
            (Driver::HoverIntent(hover), ControlAction::Dismiss) => {
                hover.dismiss(at);
                true
            }
            (Driver::HoverIntent(hover), ControlAction::ContentEnter) => {
                hover.content_enter(at);
                true
            }
            (Driver::HoverIntent(hover), ControlAction::ContentLeave) => {
                hover.content_leave(at);
                true
            }
            (Driver::HoverIntent(hover), ControlAction::ContentFocus) => {
                hover.content_focus(at);
                true
            }
            (Driver::HoverIntent(hover), ControlAction::ContentBlur) => {
                hover.content_blur(at);
                true
            }
            (driver, ControlAction::Reset) => {
                driver.recognizer().reset();
                true
            }
            (_, ControlAction::Advance) => true,
            (_, action) => {
                warn!(?action, "control step does not apply to this recognizer");
                false
            }
        }
    }

    fn final_state(&self) -> String {
        match self {
            Driver::LongPress(r) => format!("{:?}", r.snapshot()),
            Driver::Swipe(r) => format!("{:?}", r.snapshot()),
            Driver::HoverIntent(r) => format!("{:?}", r.snapshot()),
            Driver::DragConfirm(r) => format!("{:?}", r.snapshot()),
            Driver::Reveal(r) => format!("{:?}", r.snapshot()),
        }
    }
}

fn kind_name(kind: &InputKind) -> &'static str {
    match kind {
        InputKind::PointerDown { .. } => "pointer_down",
        InputKind::PointerMove { .. } => "pointer_move",
        InputKind::PointerUp { .. } => "pointer_up",
        InputKind::PointerCancel => "pointer_cancel",
        InputKind::PointerEnter { .. } => "pointer_enter",
        InputKind::PointerLeave => "pointer_leave",
        InputKind::KeyDown { .. } => "key_down",
        InputKind::KeyUp { .. } => "key_up",
        InputKind::Focus => "focus",
        InputKind::Blur => "blur",
        InputKind::ContextMenu => "context_menu",
    }
}

/// Run deadlines one at a time up to `target`, stamping the timeline with
/// each
fn advance_to(recognizer: &mut dyn Recognizer, timeline: &Timeline, target: Timestamp) {
    while let Some(deadline) = recognizer.next_deadline() {
        if deadline > target {
            break;
        }
        timeline.set_time(deadline);
        recognizer.advance(deadline);
    }
    timeline.set_time(target);
    recognizer.advance(target);
}

/// Replay `script` through a freshly built recognizer
pub fn run(kind: RecognizerKind, config: &GesturaConfig, script: &ReplayScript) -> ReplayReport {
    let timeline = Timeline::default();
    let mut driver = Driver::build(kind, config, &timeline);
    info!(?kind, steps = script.steps.len(), "replay started");

    for step in &script.steps {
        let at = step.timestamp();
        advance_to(driver.recognizer(), &timeline, at);

        match step {
            Step::Input(event) => apply_input(&mut driver, &timeline, event),
            Step::Control(control) => {
                if driver.control(&control.action, at) {
                    debug!(action = ?control.action, at = %at, "control step applied");
                }
            }
        }
    }

    let until = script
        .until
        .unwrap_or_else(|| script.last_timestamp() + config.replay.tail_ms);
    advance_to(driver.recognizer(), &timeline, until);

    ReplayReport {
        recognizer: kind,
        until: until.as_millis(),
        entries: timeline.take(),
        final_state: driver.final_state(),
    }
}

fn apply_input(driver: &mut Driver, timeline: &Timeline, event: &InputEvent) {
    let response = driver.recognizer().handle_event(event);
    if response != EventResponse::Ignored {
        timeline.record(kind_name(&event.kind), Some(format!("{response:?}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ControlStep;
    use gestura_core::{KeyCode, PointerKind};

    /// Replay `steps` with default configuration up to `until`
    fn replay(kind: RecognizerKind, steps: Vec<Step>, until: u64) -> ReplayReport {
        let script = ReplayScript {
            until: Some(Timestamp::from_millis(until)),
            steps,
        };
        run(kind, &GesturaConfig::default(), &script)
    }

    #[test]
    fn test_callbacks_are_stamped_at_their_deadline() {
        let steps = vec![Step::Input(InputEvent::pointer_down(0, 0.0, 0.0, PointerKind::Touch))];
        let report = replay(RecognizerKind::LongPress, steps, 2_000);

        let complete: Vec<_> = report.events_named("complete").collect();
        assert_eq!(complete.len(), 1);
        assert_eq!(complete[0].at, 500);

        let haptics: Vec<_> = report.events_named("haptic").map(|e| e.at).collect();
        assert_eq!(haptics, vec![208, 400, 500]);
    }

    #[test]
    fn test_settle_step_confirms() {
        let steps = vec![
            Step::Input(InputEvent::pointer_down(0, 0.0, 0.0, PointerKind::Mouse)),
            Step::Input(InputEvent::pointer_move(1_000, 230.0, 0.0, PointerKind::Mouse)),
            Step::Input(InputEvent::pointer_up(1_000, 230.0, 0.0, PointerKind::Mouse)),
            Step::Control(ControlStep {
                timestamp: Timestamp::from_millis(1_200),
                action: ControlAction::Settle { ok: true },
            }),
        ];
        let report = replay(RecognizerKind::DragConfirm, steps, 2_000);

        assert_eq!(report.events_named("confirm").count(), 1);
        let complete: Vec<_> = report.events_named("complete").collect();
        assert_eq!(complete[0].at, 1_200);
        assert!(report.final_state.contains("Confirmed"));
    }

    #[test]
    fn test_reveal_auto_dismiss_in_timeline() {
        let steps = vec![
            Step::Input(InputEvent::key_down(100, KeyCode::Space)),
            Step::Input(InputEvent::key_up(800, KeyCode::Space)),
        ];
        let report = replay(RecognizerKind::Reveal, steps, 5_000);

        let reveal: Vec<_> = report.events_named("reveal").collect();
        let dismiss: Vec<_> = report.events_named("dismiss").collect();
        assert_eq!(reveal[0].at, 600);
        assert_eq!(dismiss[0].at, 3_600);
    }

    #[test]
    fn test_inapplicable_control_is_skipped() {
        let steps = vec![Step::Control(ControlStep {
            timestamp: Timestamp::from_millis(10),
            action: ControlAction::Settle { ok: true },
        })];
        let report = replay(RecognizerKind::Swipe, steps, 100);
        assert!(report.entries.is_empty());
        assert!(report.render().contains("final:"));
    }
}
