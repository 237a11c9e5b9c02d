//! Score-gated sliding window over one classifier's per-frame labels.
//! Most-recent-first. A sub-threshold score or a label change resets it;
//! capacity is only enforced by an explicit `trim()`.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::{ClassifierKind, WindowConfig};

/// Upper bound of every accepted score band.
pub const MAX_SCORE: i32 = 100;

/// Axis-aligned detector box in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}

/// Opaque payload carried alongside a label. The core never inspects the
/// frame handle; it only hands it back to collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aux {
    /// Handle of the camera frame the label was computed on.
    pub frame_id: u64,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub category_index: Option<u32>,
}

impl Aux {
    pub fn frame(frame_id: u64) -> Self {
        Self {
            frame_id,
            ..Self::default()
        }
    }

    pub fn with_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }
}

/// One scored label from a classifier or detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub label: String,
    /// Confidence in percent. Values outside 0..=100 are never admitted.
    pub score: i32,
    #[serde(default)]
    pub aux: Aux,
}

impl Observation {
    pub fn new(label: impl Into<String>, score: i32, aux: Aux) -> Self {
        Self {
            label: label.into(),
            score,
            aux,
        }
    }
}

/// Outcome of a single `enqueue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Same label as the current head; appended.
    Appended,
    /// Label differed from the head; window cleared, then appended.
    Restarted,
    /// Score outside the band; window emptied, nothing inserted.
    Rejected,
}

pub struct ScoreGatedWindow {
    kind: ClassifierKind,
    config: WindowConfig,
    queue: VecDeque<Observation>,
}

impl ScoreGatedWindow {
    pub fn new(kind: ClassifierKind, config: WindowConfig) -> Self {
        Self {
            kind,
            config,
            queue: VecDeque::with_capacity(config.capacity),
        }
    }

    pub fn kind(&self) -> ClassifierKind {
        self.kind
    }

    pub fn config(&self) -> WindowConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Push `obs` to the front, clearing first on a label change. A score
    /// outside `[min_score_threshold, 100]` empties the window instead.
    pub fn enqueue(&mut self, obs: Observation) -> Admission {
        let restarted = match self.queue.front() {
            Some(head) if head.label != obs.label => {
                self.queue.clear();
                true
            }
            _ => false,
        };

        let min = i32::from(self.config.min_score_threshold);
        if !(min..=MAX_SCORE).contains(&obs.score) {
            self.queue.clear();
            return Admission::Rejected;
        }

        self.queue.push_front(obs);
        if restarted {
            Admission::Restarted
        } else {
            Admission::Appended
        }
    }

    /// Most recently admitted observation.
    pub fn peek(&self) -> Option<&Observation> {
        self.queue.front()
    }

    /// Integer mean over every stored score, 0 when empty.
    pub fn average(&self) -> i64 {
        if self.queue.is_empty() {
            return 0;
        }
        let sum: i64 = self.queue.iter().map(|o| i64::from(o.score)).sum();
        if sum == 0 {
            return 0;
        }
        sum / self.queue.len() as i64
    }

    /// Drop the oldest element once occupancy has reached capacity.
    pub fn trim(&mut self) {
        if self.queue.len() >= self.config.capacity {
            self.queue.pop_back();
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Occupancy and mean confidence both meet the kind's bounds.
    pub fn is_settled(&self) -> bool {
        self.queue.len() >= self.config.capacity
            && self.average() >= i64::from(self.config.min_score_threshold)
    }

    /// The head observation, if the window has settled.
    pub fn settled(&self) -> Option<&Observation> {
        if self.is_settled() {
            self.peek()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(label: &str, score: i32) -> Observation {
        Observation::new(label, score, Aux::default())
    }

    fn furniture() -> ScoreGatedWindow {
        ScoreGatedWindow::new(ClassifierKind::Furniture, WindowConfig::new(50, 6))
    }

    #[test]
    fn average_covers_every_stored_score() {
        let mut w = furniture();
        let scores = [95, 92, 90, 93, 91, 94, 60, 55];
        for (i, &s) in scores.iter().enumerate() {
            assert_eq!(w.enqueue(obs("chair", s)), Admission::Appended);
            let expected: i64 = scores[..=i].iter().map(|&v| v as i64).sum::<i64>() / (i as i64 + 1);
            assert_eq!(w.average(), expected);
            assert_eq!(w.peek().unwrap().score, s);
        }
        // no implicit trim
        assert_eq!(w.len(), scores.len());
    }

    #[test]
    fn below_threshold_empties_window() {
        let mut w = furniture();
        for _ in 0..5 {
            w.enqueue(obs("chair", 90));
        }
        assert_eq!(w.enqueue(obs("chair", 49)), Admission::Rejected);
        assert!(w.is_empty());
        assert_eq!(w.average(), 0);
        assert!(w.peek().is_none());
    }

    #[test]
    fn score_above_hundred_is_rejected() {
        let mut w = furniture();
        w.enqueue(obs("chair", 90));
        assert_eq!(w.enqueue(obs("chair", 101)), Admission::Rejected);
        assert!(w.is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut w = furniture();
        assert_eq!(w.enqueue(obs("chair", 50)), Admission::Appended);
        assert_eq!(w.enqueue(obs("chair", 100)), Admission::Appended);
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn label_change_restarts_with_one_element() {
        let mut w = furniture();
        for _ in 0..4 {
            w.enqueue(obs("chair", 90));
        }
        assert_eq!(w.enqueue(obs("sofa", 80)), Admission::Restarted);
        assert_eq!(w.len(), 1);
        assert_eq!(w.peek().unwrap().label, "sofa");
        assert_eq!(w.average(), 80);
    }

    #[test]
    fn trim_removes_oldest_only_at_capacity() {
        let mut w = ScoreGatedWindow::new(ClassifierKind::Posture, WindowConfig::new(80, 3));
        w.enqueue(obs("sitting", 81));
        w.enqueue(obs("sitting", 82));
        w.trim();
        assert_eq!(w.len(), 2);
        w.enqueue(obs("sitting", 99));
        w.trim();
        assert_eq!(w.len(), 2);
        // oldest (81) went, head is still the newest
        assert_eq!(w.average(), (82 + 99) / 2);
        assert_eq!(w.peek().unwrap().score, 99);
    }

    #[test]
    fn trim_on_empty_is_harmless() {
        let mut w = furniture();
        w.trim();
        w.trim();
        assert!(w.is_empty());
    }

    #[test]
    fn settles_on_sixth_chair() {
        let mut w = furniture();
        for (i, s) in [95, 92, 90, 93, 91, 94].into_iter().enumerate() {
            w.enqueue(obs("chair", s));
            assert_eq!(w.is_settled(), i == 5);
        }
        assert_eq!(w.settled().unwrap().label, "chair");
        assert_eq!(w.settled().unwrap().score, 94);
    }

    #[test]
    fn short_window_does_not_settle() {
        let mut w = ScoreGatedWindow::new(ClassifierKind::Animal, WindowConfig::new(82, 2));
        w.enqueue(obs("cat", 100));
        assert!(!w.is_settled());
        assert!(w.settled().is_none());
        w.enqueue(obs("cat", 82));
        assert!(w.is_settled());
    }

    #[test]
    fn box_area() {
        let b = BoundingBox::new(10.0, 20.0, 410.0, 270.0);
        assert_eq!(b.width(), 400.0);
        assert_eq!(b.height(), 250.0);
        assert_eq!(b.area(), 100_000.0);
    }
}
