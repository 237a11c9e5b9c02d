//! Vigil: temporal fusion of per-frame vision classifier output.
//! Smooths noisy labels into settled decisions, classifies ambient light and
//! rate-limits narration, torch and focus through debounce gates.
//! Main library: module tree plus the stdin/stdout harness behind `run()`.

pub mod config;
pub mod event;
pub mod fusion;
pub mod gate;
pub mod metrics;
pub mod queue;
pub mod scheduler;

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{info, warn};

use config::FusionConfig;
use event::{EventSink, FusionEvent};
use fusion::Frame;
use gate::SystemClock;
use metrics::MetricsRegistry;
use queue::{Aux, Observation};
use scheduler::FusionHandle;

/// One line of harness input.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputLine {
    Query { query_background: Vec<Observation> },
    Frame(Frame),
}

/// Writes each event as one JSON line.
struct JsonLinesSink<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    fn write(&self, event: &FusionEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "event serialization failed");
                return;
            }
        };
        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            warn!(error = %e, "event write failed");
        }
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn on_narration(&self, text: &str) {
        self.write(&FusionEvent::Narration {
            text: text.to_string(),
        });
    }

    fn on_torch(&self, enabled: bool) {
        self.write(&FusionEvent::Torch { enabled });
    }

    fn on_focus_requested(&self) {
        self.write(&FusionEvent::FocusRequested);
    }

    fn on_human_presence(&self, aux: &Aux) {
        self.write(&FusionEvent::HumanPresence { aux: aux.clone() });
    }

    fn dispatch(&self, event: &FusionEvent) {
        self.write(event);
    }
}

/// Run the harness: frames as JSON lines on stdin, events as JSON lines on
/// stdout, logs on stderr.
///
/// `VIGIL_CONFIG` names an optional JSON config override; `VIGIL_LINGER_MS`
/// keeps the runtime alive after end of input so pending gates can expire;
/// `VIGIL_LOG_FORMAT=json` switches log output to JSON.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vigil=debug")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true);
    if std::env::var("VIGIL_LOG_FORMAT").is_ok_and(|f| f == "json") {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("vigil starting");

    let config = match std::env::var("VIGIL_CONFIG") {
        Ok(path) => FusionConfig::load_from_file(Path::new(&path))?,
        Err(_) => FusionConfig::default(),
    };
    let linger = std::env::var("VIGIL_LINGER_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::ZERO);

    let metrics = Arc::new(MetricsRegistry::new());
    let sink: Arc<dyn EventSink> = Arc::new(JsonLinesSink {
        out: Mutex::new(std::io::stdout()),
    });
    let handle = FusionHandle::start(config, Arc::new(SystemClock), sink, Arc::clone(&metrics))?;

    let stdin = std::io::stdin();
    for (lineno, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<InputLine>(&line) {
            Ok(InputLine::Frame(frame)) => handle.submit_frame(frame)?,
            Ok(InputLine::Query { query_background }) => handle.query_background(query_background)?,
            Err(e) => warn!(line = lineno + 1, error = %e, "skipping malformed input line"),
        }
    }

    if !linger.is_zero() {
        info!(linger_ms = linger.as_millis() as u64, "input finished, lingering");
        std::thread::sleep(linger);
    }
    handle.shutdown();

    let summary = serde_json::to_string(&metrics.summary())?;
    info!(metrics = %summary, "vigil stopped");
    Ok(())
}
