//! Debounce gates: Idle → Counting → Idle.
//! A gate never runs its own timer; the owner polls it against a `Clock`,
//! so tick/expiry handling stays on the owner's thread.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

/// Time source for gates. Injected so tests can step time by hand.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Which concern a gate rate-limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GateKind {
    Human,
    Animal,
    Focus,
    Torch,
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateKind::Human => write!(f, "human"),
            GateKind::Animal => write!(f, "animal"),
            GateKind::Focus => write!(f, "focus"),
            GateKind::Torch => write!(f, "torch"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Counting { deadline: Instant, next_tick: Instant },
}

/// Something the owner must react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    Tick { gate: GateKind, remaining: Duration },
    Expired { gate: GateKind },
}

pub struct DebounceGate {
    kind: GateKind,
    duration: Duration,
    tick_interval: Duration,
    state: GateState,
}

impl DebounceGate {
    pub fn new(kind: GateKind, duration: Duration, tick_interval: Duration) -> Self {
        Self {
            kind,
            duration,
            tick_interval,
            state: GateState::Idle,
        }
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    #[inline]
    pub fn is_counting(&self) -> bool {
        matches!(self.state, GateState::Counting { .. })
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == GateState::Idle
    }

    /// Begin counting. A no-op returning `None` if already counting;
    /// otherwise returns the immediate first tick.
    pub fn start(&mut self, now: Instant) -> Option<GateEvent> {
        if self.is_counting() {
            debug!(gate = %self.kind, "gate_start_ignored");
            return None;
        }
        self.state = GateState::Counting {
            deadline: now + self.duration,
            next_tick: now + self.tick_interval,
        };
        info!(gate = %self.kind, duration_ms = self.duration.as_millis() as u64, "gate_started");
        Some(GateEvent::Tick {
            gate: self.kind,
            remaining: self.duration,
        })
    }

    /// Return to Idle without an expiry. Returns whether it was counting.
    pub fn cancel(&mut self) -> bool {
        let was_counting = self.is_counting();
        self.state = GateState::Idle;
        if was_counting {
            info!(gate = %self.kind, "gate_cancelled");
        }
        was_counting
    }

    /// Advance against `now`. Ticks missed between polls coalesce into one.
    pub fn poll(&mut self, now: Instant) -> Option<GateEvent> {
        let GateState::Counting { deadline, next_tick } = self.state else {
            return None;
        };
        if now >= deadline {
            self.state = GateState::Idle;
            info!(gate = %self.kind, "gate_expired");
            return Some(GateEvent::Expired { gate: self.kind });
        }
        if now >= next_tick {
            self.state = GateState::Counting {
                deadline,
                next_tick: now + self.tick_interval,
            };
            return Some(GateEvent::Tick {
                gate: self.kind,
                remaining: deadline - now,
            });
        }
        None
    }

    /// Time left on the countdown, zero when idle.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.state {
            GateState::Idle => Duration::ZERO,
            GateState::Counting { deadline, .. } => deadline.saturating_duration_since(now),
        }
    }
}
