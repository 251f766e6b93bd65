//! Cooperative scheduler
//!
//! Owns every timer and the animation-frame loop of one recognizer. Nothing
//! runs on its own: the recognizer drains due work with [`Scheduler::pop_due`]
//! whenever the host advances virtual time, so a cleared scheduler can never
//! deliver a late callback.

use crate::time::{Timestamp, FRAME_INTERVAL_MS};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

/// A unit of work that became due
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Due<K> {
    /// A timer of the given kind fired
    Timer(K),
    /// An animation frame is due
    Frame,
}

struct Timer<K> {
    deadline: Timestamp,
    /// Re-arm interval for repeating timers
    interval: Option<u64>,
    /// Scheduling order, breaks ties between equal deadlines
    seq: u64,
    kind: K,
}

struct FrameLoop {
    next: Timestamp,
}

/// Timers plus an optional frame loop, all measured in virtual time
pub struct Scheduler<K> {
    timers: SlotMap<TimerId, Timer<K>>,
    frames: Option<FrameLoop>,
    frame_interval: u64,
    next_seq: u64,
}

impl<K: Copy> Scheduler<K> {
    pub fn new() -> Self {
        Self::with_frame_interval(FRAME_INTERVAL_MS)
    }

    pub fn with_frame_interval(frame_interval: u64) -> Self {
        Self {
            timers: SlotMap::with_key(),
            frames: None,
            frame_interval: frame_interval.max(1),
            next_seq: 0,
        }
    }

    pub fn frame_interval(&self) -> u64 {
        self.frame_interval
    }

    /// Schedule a one-shot timer
    pub fn schedule(&mut self, deadline: Timestamp, kind: K) -> TimerId {
        self.insert(deadline, None, kind)
    }

    /// Schedule a timer that fires at `first` and then every `interval` ms
    pub fn schedule_repeating(&mut self, first: Timestamp, interval: u64, kind: K) -> TimerId {
        self.insert(first, Some(interval.max(1)), kind)
    }

    fn insert(&mut self, deadline: Timestamp, interval: Option<u64>, kind: K) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.insert(Timer {
            deadline,
            interval,
            seq,
            kind,
        })
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(id).is_some()
    }

    /// Cancel a timer held in an option slot, leaving the slot empty
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerId>) {
        if let Some(id) = slot.take() {
            self.cancel(id);
        }
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Start the frame loop; the first frame is due one interval after `now`.
    /// A running loop keeps its cadence.
    pub fn request_frames(&mut self, now: Timestamp) {
        if self.frames.is_none() {
            self.frames = Some(FrameLoop {
                next: now + self.frame_interval,
            });
        }
    }

    pub fn stop_frames(&mut self) {
        self.frames = None;
    }

    pub fn frames_running(&self) -> bool {
        self.frames.is_some()
    }

    /// Cancel every timer and stop the frame loop
    pub fn clear(&mut self) {
        if !self.is_idle() {
            tracing::trace!(timers = self.timers.len(), "scheduler cleared");
        }
        self.timers.clear();
        self.frames = None;
    }

    /// True when no timer is pending and no frame loop is running
    pub fn is_idle(&self) -> bool {
        self.timers.is_empty() && self.frames.is_none()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Earliest instant at which work becomes due
    pub fn next_deadline(&self) -> Option<Timestamp> {
        let timer = self.timers.values().map(|t| t.deadline).min();
        let frame = self.frames.as_ref().map(|f| f.next);
        match (timer, frame) {
            (Some(t), Some(f)) => Some(t.min(f)),
            (t, f) => t.or(f),
        }
    }

    /// Remove and return the earliest work due at or before `now`.
    ///
    /// Timers win ties against a frame due at the same instant, and equal
    /// deadlines fire in scheduling order. Repeating timers are re-armed
    /// before being returned, the frame loop advances by one interval.
    pub fn pop_due(&mut self, now: Timestamp) -> Option<(Timestamp, Due<K>)> {
        let timer = self
            .timers
            .iter()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(_, t)| (t.deadline, t.seq))
            .map(|(id, t)| (id, t.deadline));

        let frame = self
            .frames
            .as_ref()
            .map(|f| f.next)
            .filter(|next| *next <= now);

        match (timer, frame) {
            (Some((id, deadline)), frame) if frame.map_or(true, |f| deadline <= f) => {
                Some((deadline, Due::Timer(self.fire(id))))
            }
            (_, Some(at)) => {
                if let Some(frames) = self.frames.as_mut() {
                    frames.next = at + self.frame_interval;
                }
                Some((at, Due::Frame))
            }
            _ => None,
        }
    }

    fn fire(&mut self, id: TimerId) -> K {
        let seq = self.next_seq;
        let timer = &mut self.timers[id];
        let kind = timer.kind;
        match timer.interval {
            Some(interval) => {
                timer.deadline += interval;
                timer.seq = seq;
                self.next_seq += 1;
            }
            None => {
                self.timers.remove(id);
            }
        }
        kind
    }
}

impl<K: Copy> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
