//! Latency percentiles per named metric, and a camera frame-rate estimate.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

/// Latency samples kept per metric; older ones fall out of the percentiles.
const SAMPLES_KEPT: usize = 1024;

/// Open measurement; `finish` records the elapsed microseconds.
pub struct Span {
    metric: &'static str,
    started: Instant,
    registry: Arc<MetricsRegistry>,
}

impl Span {
    pub fn finish(self) -> f64 {
        let us = self.started.elapsed().as_micros() as f64;
        self.registry.record(self.metric, us);
        us
    }
}

#[derive(Default)]
struct Samples {
    recent: VecDeque<f64>,
    total: u64,
}

impl Samples {
    fn push(&mut self, us: f64) {
        if self.recent.len() == SAMPLES_KEPT {
            self.recent.pop_front();
        }
        self.recent.push_back(us);
        self.total += 1;
    }

    fn summarize(&self) -> MetricSummary {
        let mut sorted: Vec<f64> = self.recent.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        let rank = |q: f64| match sorted.len() {
            0 => 0.0,
            n => sorted[(q * (n - 1) as f64).round() as usize],
        };
        MetricSummary {
            p50_us: rank(0.50),
            p95_us: rank(0.95),
            p99_us: rank(0.99),
            samples: sorted.len(),
            count: self.total,
        }
    }
}

/// Per-metric latency samples, shared between the worker and dispatch threads.
#[derive(Default)]
pub struct MetricsRegistry {
    metrics: Mutex<HashMap<&'static str, Samples>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, metric: &'static str, us: f64) {
        self.metrics.lock().entry(metric).or_default().push(us);
        tracing::trace!(metric, us, "metric_recorded");
    }

    pub fn span(self: &Arc<Self>, metric: &'static str) -> Span {
        Span {
            metric,
            started: Instant::now(),
            registry: Arc::clone(self),
        }
    }

    /// Percentiles over the kept samples plus the all-time count, by metric.
    pub fn summary(&self) -> HashMap<String, MetricSummary> {
        self.metrics
            .lock()
            .iter()
            .map(|(&metric, samples)| (metric.to_string(), samples.summarize()))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
    pub p50_us: f64,
    pub p95_us: f64,
    pub p99_us: f64,
    /// Samples the percentiles were taken over.
    pub samples: usize,
    /// Everything ever recorded.
    pub count: u64,
}

/// Well-known metric names.
pub mod metric_names {
    /// One frame through the fusion pipeline.
    pub const FRAME_FUSED: &str = "t_frame_fused";
    /// Time an input waited in the worker channel.
    pub const QUEUE_WAIT_INPUT: &str = "queue_wait_input";
    /// One event handed to the sink.
    pub const DISPATCH: &str = "t_dispatch";
}

/// Frames-per-second estimate over the most recent frame timestamps.
pub struct FrameRateMeter {
    stamps: VecDeque<Instant>,
    window: usize,
}

impl FrameRateMeter {
    pub const DEFAULT_WINDOW: usize = 8;

    pub fn new(window: usize) -> Self {
        Self {
            stamps: VecDeque::with_capacity(window),
            window: window.max(2),
        }
    }

    /// Record a frame arrival and return the current estimate.
    pub fn mark(&mut self, at: Instant) -> Option<f64> {
        self.stamps.push_front(at);
        while self.stamps.len() >= self.window {
            self.stamps.pop_back();
        }
        self.fps()
    }

    /// `None` until two distinct timestamps are held.
    pub fn fps(&self) -> Option<f64> {
        let newest = self.stamps.front()?;
        let oldest = self.stamps.back()?;
        let span = newest.saturating_duration_since(*oldest).as_secs_f64();
        if span <= 0.0 {
            return None;
        }
        Some(self.stamps.len() as f64 / span)
    }
}

impl Default for FrameRateMeter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn summary_percentiles() {
        let registry = MetricsRegistry::new();
        for v in 1..=100 {
            registry.record(metric_names::FRAME_FUSED, v as f64);
        }
        let summary = registry.summary();
        let fused = &summary[metric_names::FRAME_FUSED];
        assert_eq!(fused.count, 100);
        assert_eq!(fused.samples, 100);
        assert_eq!(fused.p50_us, 51.0);
        assert_eq!(fused.p99_us, 99.0);
        assert!(!summary.contains_key(metric_names::DISPATCH));
    }

    #[test]
    fn old_samples_fall_out_but_still_count() {
        let registry = MetricsRegistry::new();
        for _ in 0..SAMPLES_KEPT {
            registry.record(metric_names::DISPATCH, 1_000.0);
        }
        for _ in 0..SAMPLES_KEPT {
            registry.record(metric_names::DISPATCH, 5.0);
        }
        let dispatch = &registry.summary()[metric_names::DISPATCH];
        assert_eq!(dispatch.count, 2 * SAMPLES_KEPT as u64);
        assert_eq!(dispatch.samples, SAMPLES_KEPT);
        assert_eq!(dispatch.p99_us, 5.0);
    }

    #[test]
    fn span_records_on_finish() {
        let registry = Arc::new(MetricsRegistry::new());
        let span = registry.span(metric_names::FRAME_FUSED);
        assert!(registry.summary().is_empty());
        span.finish();
        assert_eq!(registry.summary()[metric_names::FRAME_FUSED].count, 1);
    }

    #[test]
    fn frame_rate_from_steady_stream() {
        let mut meter = FrameRateMeter::default();
        let t0 = Instant::now();
        assert_eq!(meter.mark(t0), None);
        let mut last = None;
        for i in 1..20 {
            last = meter.mark(t0 + Duration::from_millis(100 * i));
        }
        // 7 stamps spanning 600ms
        let fps = last.unwrap();
        assert!((fps - 7.0 / 0.6).abs() < 1e-6, "fps = {fps}");
    }
}
