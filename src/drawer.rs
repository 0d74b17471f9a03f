//! Drawer Animator
//!
//! Two committed states, Closed and Open. `set_open` commits the new state
//! immediately; the slide between offsets is a transient interpolation
//! computed from the clock, so cancelling it never leaves state behind.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawerState {
    #[default]
    Closed,
    Open,
}

impl DrawerState {
    pub fn from_open(open: bool) -> Self {
        if open {
            DrawerState::Open
        } else {
            DrawerState::Closed
        }
    }

    pub fn is_open(self) -> bool {
        self == DrawerState::Open
    }

    /// Resting offset: 0.0 fully closed, 1.0 fully open
    pub fn offset(self) -> f32 {
        match self {
            DrawerState::Closed => 0.0,
            DrawerState::Open => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: f32,
    to: f32,
    started: Instant,
}

#[derive(Debug)]
pub struct DrawerAnimator {
    state: DrawerState,
    duration: Duration,
    transition: Option<Transition>,
}

impl DrawerAnimator {
    pub fn new(duration: Duration) -> Self {
        Self {
            state: DrawerState::Closed,
            duration,
            transition: None,
        }
    }

    pub fn state(&self) -> DrawerState {
        self.state
    }

    /// Commit a new target and start sliding toward it.
    ///
    /// Returns false (and leaves any animation alone) when already there.
    /// A transition in flight is replaced, starting from wherever it is now.
    pub fn set_open(&mut self, open: bool, now: Instant) -> bool {
        let target = DrawerState::from_open(open);
        if target == self.state {
            return false;
        }

        let from = self.offset_at(now);
        if self.transition.is_some() {
            debug!("Retargeting drawer mid-slide at offset {:.2}", from);
        }
        self.state = target;
        self.transition = Some(Transition {
            from,
            to: target.offset(),
            started: now,
        });
        debug!("Drawer -> {:?}", target);
        true
    }

    pub fn offset_at(&self, now: Instant) -> f32 {
        let Some(t) = self.transition else {
            return self.state.offset();
        };
        let elapsed = now.saturating_duration_since(t.started);
        if elapsed >= self.duration {
            return t.to;
        }
        let progress = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        t.from + (t.to - t.from) * progress
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.deadline().map(|end| now < end).unwrap_or(false)
    }

    /// When the running transition reaches its target
    pub fn deadline(&self) -> Option<Instant> {
        self.transition.map(|t| t.started + self.duration)
    }

    /// Retire a finished transition. Returns true if one just finished.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(end) if now >= end => {
                self.transition = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any transition in flight and rest at the committed state
    pub fn cancel(&mut self) {
        if self.transition.take().is_some() {
            debug!("Drawer animation cancelled at {:?}", self.state);
        }
    }
}
