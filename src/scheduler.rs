//! Fusion runtime: one worker thread owns the pipeline, one dispatch thread
//! forwards events to the sink.
//! Inputs arrive on an unbounded crossbeam channel (producers never block).
//! The worker wakes at least every poll interval to run gate ticks/expiries,
//! so timer handling is serialized with frame fusion.
//! Events leave through a second channel, preserving emission order.
//! Shutdown closes the input side first, so everything already queued is
//! still fused; the cancellation token is the hard stop.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel as cb;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::{ClassifierKind, ConfigError, FusionConfig};
use crate::event::{EventSink, FusionEvent};
use crate::fusion::{Frame, FusionPipeline};
use crate::gate::Clock;
use crate::metrics::{metric_names, FrameRateMeter, MetricsRegistry};
use crate::queue::{LightState, Observation};

/// Work for the fusion worker.
#[derive(Debug)]
pub enum FusionInput {
    Frame {
        frame: Frame,
        enqueued_at: Instant,
    },
    Luminosity {
        sample: i64,
        enqueued_at: Instant,
    },
    Observations {
        kind: ClassifierKind,
        batch: Vec<Observation>,
        enqueued_at: Instant,
    },
    BackgroundQuery {
        batch: Vec<Observation>,
    },
}

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Spawn(std::io::Error),
    /// The worker has stopped; input was not accepted.
    Closed,
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::Config(e) => write!(f, "invalid configuration: {e}"),
            RuntimeError::Spawn(e) => write!(f, "failed to spawn thread: {e}"),
            RuntimeError::Closed => write!(f, "fusion runtime stopped"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(e: ConfigError) -> Self {
        RuntimeError::Config(e)
    }
}

/// Running fusion core. Dropping it stops and joins both threads.
pub struct FusionHandle {
    input_tx: Option<cb::Sender<FusionInput>>,
    cancel: CancellationToken,
    light_rx: watch::Receiver<Option<LightState>>,
    metrics: Arc<MetricsRegistry>,
    worker: Option<JoinHandle<()>>,
    dispatcher: Option<JoinHandle<()>>,
}

impl FusionHandle {
    /// Validate `config`, then start the worker and dispatch threads.
    pub fn start(
        config: FusionConfig,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
        metrics: Arc<MetricsRegistry>,
    ) -> Result<Self, RuntimeError> {
        let pipeline = FusionPipeline::new(config)?;
        let (input_tx, input_rx) = cb::unbounded();
        let (event_tx, event_rx) = cb::unbounded();
        let (light_tx, light_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let dispatcher = {
            let metrics = Arc::clone(&metrics);
            std::thread::Builder::new()
                .name("fusion-dispatch".into())
                .spawn(move || run_dispatch_loop(event_rx, sink, metrics))
                .map_err(RuntimeError::Spawn)?
        };

        let worker = {
            let cancel = cancel.clone();
            let metrics = Arc::clone(&metrics);
            std::thread::Builder::new()
                .name("fusion-worker".into())
                .spawn(move || {
                    run_worker_loop(pipeline, input_rx, event_tx, light_tx, clock, cancel, metrics)
                })
                .map_err(RuntimeError::Spawn)?
        };

        info!("fusion runtime started");
        Ok(Self {
            input_tx: Some(input_tx),
            cancel,
            light_rx,
            metrics,
            worker: Some(worker),
            dispatcher: Some(dispatcher),
        })
    }

    fn send(&self, input: FusionInput) -> Result<(), RuntimeError> {
        if self.cancel.is_cancelled() {
            return Err(RuntimeError::Closed);
        }
        let tx = self.input_tx.as_ref().ok_or(RuntimeError::Closed)?;
        tx.send(input).map_err(|_| RuntimeError::Closed)
    }

    pub fn submit_frame(&self, frame: Frame) -> Result<(), RuntimeError> {
        self.send(FusionInput::Frame {
            frame,
            enqueued_at: Instant::now(),
        })
    }

    pub fn submit(&self, kind: ClassifierKind, observation: Observation) -> Result<(), RuntimeError> {
        self.submit_batch(kind, vec![observation])
    }

    pub fn submit_batch(
        &self,
        kind: ClassifierKind,
        batch: Vec<Observation>,
    ) -> Result<(), RuntimeError> {
        self.send(FusionInput::Observations {
            kind,
            batch,
            enqueued_at: Instant::now(),
        })
    }

    pub fn submit_luminosity(&self, sample: i64) -> Result<(), RuntimeError> {
        self.send(FusionInput::Luminosity {
            sample,
            enqueued_at: Instant::now(),
        })
    }

    pub fn query_background(&self, batch: Vec<Observation>) -> Result<(), RuntimeError> {
        self.send(FusionInput::BackgroundQuery { batch })
    }

    /// Latest classified light level, `None` before the first sample.
    pub fn subscribe_light(&self) -> watch::Receiver<Option<LightState>> {
        self.light_rx.clone()
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Hard stop: both threads exit without fusing queued input.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Fuse everything already submitted, dispatch its events, then wait
    /// for both threads to finish.
    pub fn shutdown(mut self) {
        self.join();
    }

    fn join(&mut self) {
        // worker sees Disconnected once the queue is empty
        drop(self.input_tx.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("fusion worker panicked");
            }
        }
        if let Some(dispatcher) = self.dispatcher.take() {
            if dispatcher.join().is_err() {
                error!("fusion dispatcher panicked");
            }
        }
        self.cancel.cancel();
    }
}

impl Drop for FusionHandle {
    fn drop(&mut self) {
        self.join();
    }
}

fn run_worker_loop(
    mut pipeline: FusionPipeline,
    rx: cb::Receiver<FusionInput>,
    event_tx: cb::Sender<FusionEvent>,
    light_tx: watch::Sender<Option<LightState>>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
    metrics: Arc<MetricsRegistry>,
) {
    let poll_interval = pipeline.config().poll_interval();
    let mut frame_rate = FrameRateMeter::default();
    info!(poll_ms = poll_interval.as_millis() as u64, "fusion worker loop started");

    loop {
        if cancel.is_cancelled() {
            info!("fusion worker loop stopping");
            break;
        }

        match rx.recv_timeout(poll_interval) {
            Ok(input) => handle_input(&mut pipeline, input, &*clock, &metrics, &mut frame_rate),
            Err(cb::RecvTimeoutError::Timeout) => {}
            Err(cb::RecvTimeoutError::Disconnected) => {
                info!("input channel closed and drained, exiting worker loop");
                break;
            }
        }

        pipeline.poll_gates(clock.now());

        for event in pipeline.drain_events() {
            if event_tx.send(event).is_err() {
                error!("dispatch channel closed");
                return;
            }
        }

        let light = pipeline.state().light;
        light_tx.send_if_modified(|current| {
            if *current != light {
                *current = light;
                true
            } else {
                false
            }
        });
    }
}

fn handle_input(
    pipeline: &mut FusionPipeline,
    input: FusionInput,
    clock: &dyn Clock,
    metrics: &Arc<MetricsRegistry>,
    frame_rate: &mut FrameRateMeter,
) {
    match input {
        FusionInput::Frame { frame, enqueued_at } => {
            metrics.record(
                metric_names::QUEUE_WAIT_INPUT,
                enqueued_at.elapsed().as_micros() as f64,
            );
            if let Some(fps) = frame_rate.mark(enqueued_at) {
                debug!(fps, "frame_rate");
            }
            let span = metrics.span(metric_names::FRAME_FUSED);
            pipeline.process_frame(frame, clock.now());
            span.finish();
        }
        FusionInput::Luminosity { sample, enqueued_at } => {
            metrics.record(
                metric_names::QUEUE_WAIT_INPUT,
                enqueued_at.elapsed().as_micros() as f64,
            );
            let now = clock.now();
            pipeline.begin_frame(now);
            pipeline.submit_luminosity(sample, now);
        }
        FusionInput::Observations {
            kind,
            batch,
            enqueued_at,
        } => {
            metrics.record(
                metric_names::QUEUE_WAIT_INPUT,
                enqueued_at.elapsed().as_micros() as f64,
            );
            pipeline.submit_batch(kind, batch, clock.now());
        }
        FusionInput::BackgroundQuery { batch } => pipeline.query_background(&batch),
    }
}

fn run_dispatch_loop(
    rx: cb::Receiver<FusionEvent>,
    sink: Arc<dyn EventSink>,
    metrics: Arc<MetricsRegistry>,
) {
    info!("fusion dispatch loop started");
    for event in rx.iter() {
        let start = Instant::now();
        sink.dispatch(&event);
        metrics.record(metric_names::DISPATCH, start.elapsed().as_micros() as f64);
    }
    info!("event channel closed, exiting dispatch loop");
}
