//! Values flowing out of the fusion core: settled decisions (internal) and
//! the closed set of outbound events, plus the sink trait that receives them.

use crossbeam_channel as cb;
use serde::Serialize;
use tracing::info;

use crate::config::ClassifierKind;
use crate::queue::{Aux, ScoreGatedWindow};

/// A window's head observation at the moment it settled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub kind: ClassifierKind,
    pub label: String,
    pub confidence: i32,
    pub aux: Aux,
}

impl Decision {
    /// Snapshot the head of `window` if it has settled.
    pub fn from_window(window: &ScoreGatedWindow) -> Option<Self> {
        window.settled().map(|obs| Decision {
            kind: window.kind(),
            label: obs.label.clone(),
            confidence: obs.score,
            aux: obs.aux.clone(),
        })
    }
}

/// Outbound events, in the order the pipeline emitted them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FusionEvent {
    /// Sentence ready for speech synthesis.
    Narration { text: String },
    Torch { enabled: bool },
    FocusRequested,
    /// Ask the secondary detectors to run on this frame.
    HumanPresence { aux: Aux },
}

/// Receiver of outbound events (speech, torch, focus, secondary inference).
/// Calls are fire-and-forget; the core never retries.
pub trait EventSink: Send + Sync {
    fn on_narration(&self, text: &str);
    fn on_torch(&self, enabled: bool);
    fn on_focus_requested(&self);
    fn on_human_presence(&self, aux: &Aux);

    fn dispatch(&self, event: &FusionEvent) {
        match event {
            FusionEvent::Narration { text } => self.on_narration(text),
            FusionEvent::Torch { enabled } => self.on_torch(*enabled),
            FusionEvent::FocusRequested => self.on_focus_requested(),
            FusionEvent::HumanPresence { aux } => self.on_human_presence(aux),
        }
    }
}

/// Sink that only logs. Stands in when no collaborator is attached.
pub struct LogSink;

impl EventSink for LogSink {
    fn on_narration(&self, text: &str) {
        info!(text, "narration");
    }

    fn on_torch(&self, enabled: bool) {
        info!(enabled, "torch");
    }

    fn on_focus_requested(&self) {
        info!("focus_requested");
    }

    fn on_human_presence(&self, aux: &Aux) {
        info!(frame_id = aux.frame_id, "human_presence");
    }
}

/// Forwards every event, unchanged, into a channel.
pub struct ChannelSink {
    tx: cb::Sender<FusionEvent>,
}

impl ChannelSink {
    pub fn new(tx: cb::Sender<FusionEvent>) -> Self {
        Self { tx }
    }

    /// A sink plus the receiving end.
    pub fn pair() -> (Self, cb::Receiver<FusionEvent>) {
        let (tx, rx) = cb::unbounded();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn on_narration(&self, text: &str) {
        let _ = self.tx.send(FusionEvent::Narration {
            text: text.to_string(),
        });
    }

    fn on_torch(&self, enabled: bool) {
        let _ = self.tx.send(FusionEvent::Torch { enabled });
    }

    fn on_focus_requested(&self) {
        let _ = self.tx.send(FusionEvent::FocusRequested);
    }

    fn on_human_presence(&self, aux: &Aux) {
        let _ = self.tx.send(FusionEvent::HumanPresence { aux: aux.clone() });
    }

    fn dispatch(&self, event: &FusionEvent) {
        let _ = self.tx.send(event.clone());
    }
}
