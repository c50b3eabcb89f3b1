// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

pub trait Scheduler {
    fn request(&mut self, now: Instant) -> FrameId;
    fn cancel(&mut self, id: FrameId);
    fn poll(&mut self, now: Instant) -> Option<FrameId>;
    fn next_deadline(&self) -> Option<Instant>;
}

// Fixed-tick scheduler. Late ticks are not replayed; the cadence restarts from now.
#[derive(Debug)]
pub struct TickScheduler {
    period: Duration,
    next_tick: Option<Instant>,
    next_id: u64,
    pending: Option<(FrameId, Instant)>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_tick: None,
            next_id: 0,
            pending: None,
        }
    }

    pub fn with_fps(fps: f64) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / fps.max(1.0)))
    }
}

impl Scheduler for TickScheduler {
    fn request(&mut self, now: Instant) -> FrameId {
        self.next_id = self.next_id.wrapping_add(1);
        let id = FrameId(self.next_id);
        let due = match self.next_tick {
            Some(t) if t > now => t,
            _ => now,
        };
        self.pending = Some((id, due));
        id
    }

    fn cancel(&mut self, id: FrameId) {
        if self.pending.is_some_and(|(p, _)| p == id) {
            self.pending = None;
        }
    }

    fn poll(&mut self, now: Instant) -> Option<FrameId> {
        let (id, due) = self.pending?;
        if now < due {
            return None;
        }
        self.pending = None;
        let mut next = due + self.period;
        if now > next {
            next = now;
        }
        self.next_tick = Some(next);
        Some(id)
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, due)| due)
    }
}

// Sooner of two optional wake-ups.
pub fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visibility {
    pub intersecting: bool,
    pub ratio: f32,
}

impl Visibility {
    pub const SHOWN: Visibility = Visibility {
        intersecting: true,
        ratio: 1.0,
    };
    pub const HIDDEN: Visibility = Visibility {
        intersecting: false,
        ratio: 0.0,
    };

    pub fn passes(&self, threshold: f32) -> bool {
        self.intersecting && self.ratio >= threshold
    }
}

pub const VISIBILITY_THRESHOLD: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    Running,
    Paused,
}

// Keeps at most one frame callback pending, and none while hidden or held.
#[derive(Debug)]
pub struct FrameGate<S> {
    scheduler: S,
    pending: Option<FrameId>,
    running: bool,
    visible: bool,
    held: bool,
    threshold: f32,
}

impl<S: Scheduler> FrameGate<S> {
    pub fn start(scheduler: S, threshold: f32, now: Instant) -> Self {
        let mut gate = Self {
            scheduler,
            pending: None,
            running: true,
            visible: true,
            held: false,
            threshold,
        };
        gate.pending = Some(gate.scheduler.request(now));
        gate
    }

    pub fn state(&self) -> GateState {
        if self.running {
            GateState::Running
        } else {
            GateState::Paused
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    #[cfg(test)]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn observe(&mut self, seen: Visibility, now: Instant) -> Option<GateState> {
        self.visible = seen.passes(self.threshold);
        self.settle(now)
    }

    pub fn set_held(&mut self, held: bool, now: Instant) -> Option<GateState> {
        self.held = held;
        self.settle(now)
    }

    fn settle(&mut self, now: Instant) -> Option<GateState> {
        let want = self.visible && !self.held;
        if want == self.running {
            return None;
        }
        self.running = want;
        if want {
            if self.pending.is_none() {
                self.pending = Some(self.scheduler.request(now));
            }
        } else if let Some(id) = self.pending.take() {
            self.scheduler.cancel(id);
        }
        debug!(state = ?self.state(), "frame gate transition");
        Some(self.state())
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.scheduler.poll(now) {
            Some(id) if self.pending == Some(id) => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn frame_done(&mut self, now: Instant) {
        if self.running && self.pending.is_none() {
            self.pending = Some(self.scheduler.request(now));
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        if self.pending.is_some() {
            self.scheduler.next_deadline()
        } else {
            None
        }
    }
}
