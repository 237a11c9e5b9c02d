//! Ambient-light smoother. The accept-band is anchored to the first sample
//! after the window was last empty; anything outside it resets the window
//! and is dropped.

use std::collections::VecDeque;

use serde::Serialize;

use crate::config::LuminosityConfig;

/// Discretized ambient light level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LightState {
    Unknown,
    LessLight,
    AdequateLight,
    ExcessLight,
}

impl std::fmt::Display for LightState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LightState::Unknown => write!(f, "Unknown"),
            LightState::LessLight => write!(f, "LessLight"),
            LightState::AdequateLight => write!(f, "AdequateLight"),
            LightState::ExcessLight => write!(f, "ExcessLight"),
        }
    }
}

impl LightState {
    /// Classify an averaged luma value.
    pub fn classify(avg: i64) -> Self {
        match avg {
            i64::MIN..=0 => LightState::Unknown,
            1..=120 => LightState::LessLight,
            121..=125 => LightState::AdequateLight,
            _ => LightState::ExcessLight,
        }
    }
}

/// Largest value a luma sample can take.
pub const MAX_LUMA: i64 = 255;

/// Integer mean of a luma plane (one byte per pixel). 0 for an empty plane.
pub fn mean_luma(plane: &[u8]) -> i64 {
    if plane.is_empty() {
        return 0;
    }
    let sum: u64 = plane.iter().map(|&p| u64::from(p)).sum();
    (sum / plane.len() as u64) as i64
}

pub struct LuminosityWindow {
    queue: VecDeque<i64>,
    above_par: i64,
    below_par: i64,
    band: i64,
    considered: usize,
}

impl LuminosityWindow {
    pub fn new(config: &LuminosityConfig) -> Self {
        Self {
            queue: VecDeque::with_capacity(config.considered),
            above_par: 0,
            below_par: 0,
            band: config.band,
            considered: config.considered,
        }
    }

    /// Returns whether the sample was kept.
    pub fn enqueue(&mut self, sample: i64) -> bool {
        if self.queue.is_empty() {
            self.above_par = sample.saturating_add(self.band);
            self.below_par = sample.saturating_sub(self.band).max(0);
        }
        if (self.below_par..=self.above_par).contains(&sample) {
            self.queue.push_front(sample);
            true
        } else {
            self.above_par = 0;
            self.below_par = 0;
            self.queue.clear();
            false
        }
    }

    /// Sums at most `considered` of the newest samples but divides by the
    /// full occupancy.
    pub fn average(&self) -> LightState {
        let sum: i64 = self.queue.iter().take(self.considered).sum();
        if sum == 0 || self.queue.is_empty() {
            return LightState::Unknown;
        }
        LightState::classify(sum / self.queue.len() as i64)
    }

    pub fn peek(&self) -> Option<i64> {
        self.queue.front().copied()
    }

    /// Current accept-band as `(below_par, above_par)`.
    pub fn band(&self) -> (i64, i64) {
        (self.below_par, self.above_par)
    }

    /// Drop the oldest sample.
    pub fn dequeue(&mut self) {
        self.queue.pop_back();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
