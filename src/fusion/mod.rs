//! Fusion pipeline: routes per-frame classifier output through the windows,
//! applies branch priority, drives the four gates and queues outbound events.
//!
//! Order within a frame: gates polled → focus cycle → luminosity →
//! HumanAnimal → (route) → Furniture / AmbientColor or Animal →
//! HumanAttribute → Posture.
//! Single writer: owned by one thread, every method takes `&mut self`.

pub mod narration;
pub mod state;

use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{ClassifierKind, ConfigError, FusionConfig};
use crate::event::{Decision, FusionEvent};
use crate::gate::{DebounceGate, GateEvent, GateKind};
use crate::queue::{
    Admission, LightState, LuminosityWindow, Observation, ScoreGatedWindow, MAX_LUMA,
};

use narration::{Proximity, HUMAN_ANNOUNCEMENT};
pub use state::{Cycle, FusionState, GateFlags, Held, Route};

/// Label of the primary classifier that selects the human cascade.
pub const HUMAN_LABEL: &str = "human";

/// Everything the inference side produced for one camera frame. Missing
/// or empty lists mean "no result this frame".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Frame {
    pub luminosity: Option<i64>,
    pub human_animal: Vec<Observation>,
    pub furniture: Vec<Observation>,
    pub ambient_color: Vec<Observation>,
    pub animal: Vec<Observation>,
    pub human_attribute: Vec<Observation>,
    pub posture: Vec<Observation>,
}

struct Gates {
    human: DebounceGate,
    animal: DebounceGate,
    focus: DebounceGate,
    torch: DebounceGate,
}

impl Gates {
    fn get_mut(&mut self, kind: GateKind) -> &mut DebounceGate {
        match kind {
            GateKind::Human => &mut self.human,
            GateKind::Animal => &mut self.animal,
            GateKind::Focus => &mut self.focus,
            GateKind::Torch => &mut self.torch,
        }
    }
}

pub struct FusionPipeline {
    config: FusionConfig,
    windows: Vec<ScoreGatedWindow>,
    luminosity: LuminosityWindow,
    gates: Gates,
    state: FusionState,
    outbox: Vec<FusionEvent>,
}

impl FusionPipeline {
    /// Build all windows and gates. An invalid table is fatal.
    pub fn new(config: FusionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let windows = ClassifierKind::ALL
            .iter()
            .map(|&kind| ScoreGatedWindow::new(kind, config.window(kind)))
            .collect();
        let tick = config.gates.tick();
        let gates = Gates {
            human: DebounceGate::new(GateKind::Human, config.gates.human(), tick),
            animal: DebounceGate::new(GateKind::Animal, config.gates.animal(), tick),
            focus: DebounceGate::new(GateKind::Focus, config.gates.focus(), tick),
            torch: DebounceGate::new(GateKind::Torch, config.gates.torch(), tick),
        };
        Ok(Self {
            luminosity: LuminosityWindow::new(&config.luminosity),
            config,
            windows,
            gates,
            state: FusionState::new(),
            outbox: Vec::new(),
        })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn state(&self) -> &FusionState {
        &self.state
    }

    pub fn window(&self, kind: ClassifierKind) -> &ScoreGatedWindow {
        &self.windows[kind.index()]
    }

    pub fn luminosity(&self) -> &LuminosityWindow {
        &self.luminosity
    }

    pub fn gate(&self, kind: GateKind) -> &DebounceGate {
        match kind {
            GateKind::Human => &self.gates.human,
            GateKind::Animal => &self.gates.animal,
            GateKind::Focus => &self.gates.focus,
            GateKind::Torch => &self.gates.torch,
        }
    }

    /// Take every event queued since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<FusionEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Fuse one whole frame in the fixed evaluation order.
    pub fn process_frame(&mut self, frame: Frame, now: Instant) {
        self.begin_frame(now);
        // a frame without a primary result routes nothing
        self.state.reset_route();
        if let Some(sample) = frame.luminosity {
            self.submit_luminosity(sample, now);
        }
        self.submit_batch(ClassifierKind::HumanAnimal, frame.human_animal, now);
        self.submit_batch(ClassifierKind::Furniture, frame.furniture, now);
        self.submit_batch(ClassifierKind::AmbientColor, frame.ambient_color, now);
        self.submit_batch(ClassifierKind::Animal, frame.animal, now);
        self.submit_batch(ClassifierKind::HumanAttribute, frame.human_attribute, now);
        self.submit_batch(ClassifierKind::Posture, frame.posture, now);
    }

    /// Poll gates, then run the focus cycle: at most one focus request per
    /// focus-gate period.
    pub fn begin_frame(&mut self, now: Instant) {
        self.poll_gates(now);
        if self.state.flags.focus_armed {
            self.emit(FusionEvent::FocusRequested);
            self.start_gate(GateKind::Focus, now);
        }
    }

    /// Feed one luminosity sample. `LessLight` holds the torch on; every
    /// other state leaves the torch alone. Samples outside `0..=255` are
    /// dropped and the current level is returned unchanged.
    pub fn submit_luminosity(&mut self, sample: i64, now: Instant) -> LightState {
        if !(0..=MAX_LUMA).contains(&sample) {
            warn!(sample, "luminosity_out_of_range");
            return self.luminosity.average();
        }
        if !self.luminosity.enqueue(sample) {
            debug!(sample, "luminosity_band_reset");
        }
        let light = self.luminosity.average();
        if self.state.light != Some(light) {
            info!(light = %light, "light_state_changed");
        }
        self.state.light = Some(light);
        if light == LightState::LessLight {
            self.start_gate(GateKind::Torch, now);
        }
        light
    }

    pub fn submit(&mut self, kind: ClassifierKind, obs: Observation, now: Instant) -> Option<Decision> {
        self.submit_batch(kind, vec![obs], now)
    }

    /// Enqueue one frame's ranked categories for `kind`, then check settle
    /// once. Secondary kinds off the current route are ignored.
    pub fn submit_batch(
        &mut self,
        kind: ClassifierKind,
        batch: Vec<Observation>,
        now: Instant,
    ) -> Option<Decision> {
        if batch.is_empty() {
            return None;
        }
        if kind == ClassifierKind::HumanAnimal {
            self.state.reset_route();
        } else if !self.accepts(kind) {
            debug!(kind = %kind, "off_route_skipped");
            return None;
        }

        let window = &mut self.windows[kind.index()];
        for obs in batch {
            match window.enqueue(obs) {
                Admission::Appended => {}
                Admission::Restarted => debug!(kind = %kind, "window_cleared_label_change"),
                Admission::Rejected => debug!(kind = %kind, "window_cleared_below_threshold"),
            }
        }
        let decision = Decision::from_window(window)?;
        debug!(
            kind = %kind,
            label = %decision.label,
            confidence = decision.confidence,
            occupancy = window.len(),
            "window_settled"
        );
        self.apply(&decision, now);
        Some(decision)
    }

    /// Optionally enforce capacity on one window.
    pub fn trim(&mut self, kind: ClassifierKind) {
        self.windows[kind.index()].trim();
    }

    /// Answer an explicit "where can I sit" request with every furniture
    /// category the classifier returned, best first.
    pub fn query_background(&mut self, batch: &[Observation]) {
        for obs in batch {
            self.emit(FusionEvent::Narration {
                text: narration::seat_narration(&obs.label),
            });
        }
    }

    /// Advance every gate against `now` and apply ticks and expiries.
    pub fn poll_gates(&mut self, now: Instant) {
        for kind in [GateKind::Human, GateKind::Animal, GateKind::Focus, GateKind::Torch] {
            if let Some(event) = self.gates.get_mut(kind).poll(now) {
                self.on_gate_event(event);
            }
        }
    }

    fn accepts(&self, kind: ClassifierKind) -> bool {
        match kind {
            ClassifierKind::HumanAnimal => true,
            ClassifierKind::Furniture => self.state.route == Some(Route::Human),
            ClassifierKind::AmbientColor => {
                self.state.route == Some(Route::Human) && !self.state.furniture_settled
            }
            ClassifierKind::Animal => self.state.route == Some(Route::Animal),
            // requested through a human-presence event, may land on later frames
            ClassifierKind::HumanAttribute | ClassifierKind::Posture => {
                self.state.flags.human_counting
            }
        }
    }

    fn apply(&mut self, decision: &Decision, now: Instant) {
        match decision.kind {
            ClassifierKind::HumanAnimal => self.on_primary(decision, now),
            ClassifierKind::Furniture => {
                self.state.furniture_settled = true;
                self.on_background(decision);
            }
            ClassifierKind::AmbientColor => self.on_background(decision),
            ClassifierKind::Animal => self.on_animal(decision, now),
            ClassifierKind::HumanAttribute => self.on_human_attribute(decision),
            ClassifierKind::Posture => {
                let held = Held::new(decision.label.as_str(), decision.aux.bounding_box);
                if self.state.accept_posture(held) {
                    info!(posture = %decision.label, "posture_accepted");
                }
            }
        }
    }

    fn on_primary(&mut self, decision: &Decision, now: Instant) {
        if decision.label != HUMAN_LABEL {
            self.state.route = Some(Route::Animal);
            return;
        }
        self.state.route = Some(Route::Human);
        self.emit(FusionEvent::HumanPresence {
            aux: decision.aux.clone(),
        });
        if !self.state.flags.human_counting {
            self.emit(FusionEvent::Narration {
                text: HUMAN_ANNOUNCEMENT.to_string(),
            });
            self.start_gate(GateKind::Human, now);
        }
    }

    fn on_background(&mut self, decision: &Decision) {
        if self.state.accept_background(&decision.label) {
            info!(kind = %decision.kind, background = %decision.label, "background_accepted");
        }
    }

    fn on_human_attribute(&mut self, decision: &Decision) {
        let held = Held::new(decision.label.as_str(), decision.aux.bounding_box);
        if !self.state.accept_human(held) {
            return;
        }
        info!(human = %decision.label, "human_attribute_accepted");
        if self.state.cycle_complete() {
            let summary = self.cycle_summary(&self.state.cycle);
            self.emit(FusionEvent::Narration {
                text: narration::summary_narration(&summary, None),
            });
            self.state.mark_narrated();
        }
    }

    fn on_animal(&mut self, decision: &Decision, now: Instant) {
        if !self.state.accept_animal(&decision.label) {
            return;
        }
        self.cancel_gate(GateKind::Animal);
        info!(animal = %decision.label, "animal_accepted");
        self.emit(FusionEvent::Narration {
            text: narration::animal_narration(&decision.label),
        });
        self.start_gate(GateKind::Animal, now);
    }

    fn on_gate_event(&mut self, event: GateEvent) {
        let torch_was_on = self.state.flags.torch_on;
        self.state.flags.apply(event);
        match event {
            GateEvent::Tick {
                gate: GateKind::Torch,
                ..
            } if !torch_was_on => self.emit(FusionEvent::Torch { enabled: true }),
            GateEvent::Tick { .. } => {}
            GateEvent::Expired { gate } => match gate {
                GateKind::Human => self.finish_human_cycle(),
                GateKind::Animal => self.state.previous_animal = None,
                GateKind::Focus => {}
                GateKind::Torch => self.emit(FusionEvent::Torch { enabled: false }),
            },
        }
    }

    fn finish_human_cycle(&mut self) {
        let cycle = self.state.take_cycle();
        let summary = self.cycle_summary(&cycle);
        let proximity = cycle
            .posture
            .as_ref()
            .and_then(|p| p.bounding_box)
            .map(|bb| Proximity::from_area(bb.area(), self.config.proximity_area));
        let text = narration::summary_narration(&summary, proximity);
        info!(text = %text, "human_cycle_finished");
        self.emit(FusionEvent::Narration { text });
    }

    fn cycle_summary(&self, cycle: &Cycle) -> narration::Summary {
        narration::compose_summary(
            cycle.human.as_ref().map(|h| h.label.as_str()),
            cycle.posture.as_ref().map(|p| p.label.as_str()),
            cycle.background.as_deref(),
        )
    }

    fn start_gate(&mut self, kind: GateKind, now: Instant) {
        if let Some(event) = self.gates.get_mut(kind).start(now) {
            self.on_gate_event(event);
        }
    }

    fn cancel_gate(&mut self, kind: GateKind) {
        if self.gates.get_mut(kind).cancel() {
            self.state.flags.reset(kind);
        }
    }

    fn emit(&mut self, event: FusionEvent) {
        debug!(event = ?event, "event_queued");
        self.outbox.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{Clock, ManualClock};
    use crate::queue::{Aux, BoundingBox};
    use std::time::Duration;

    fn pipeline() -> (FusionPipeline, ManualClock) {
        (FusionPipeline::new(FusionConfig::default()).unwrap(), ManualClock::new())
    }

    fn obs(label: &str, score: i32) -> Observation {
        Observation::new(label, score, Aux::frame(7))
    }

    fn narrations(events: &[FusionEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                FusionEvent::Narration { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Settle the primary window on `label` (capacity 4).
    fn settle_primary(p: &mut FusionPipeline, clock: &ManualClock, label: &str) -> Option<Decision> {
        let mut last = None;
        for _ in 0..4 {
            last = p.submit(ClassifierKind::HumanAnimal, obs(label, 95), clock.now());
        }
        last
    }

    #[test]
    fn invalid_config_is_fatal() {
        let mut config = FusionConfig::default();
        config.windows.human_animal.capacity = 0;
        assert!(FusionPipeline::new(config).is_err());
    }

    #[test]
    fn furniture_settles_on_sixth_chair() {
        let (mut p, clock) = pipeline();
        settle_primary(&mut p, &clock, "human");
        let now = clock.now();
        let mut decisions = Vec::new();
        for s in [95, 92, 90, 93, 91, 94] {
            decisions.push(p.submit(ClassifierKind::Furniture, obs("chair", s), now));
        }
        assert!(decisions[..5].iter().all(Option::is_none));
        let d = decisions[5].clone().unwrap();
        assert_eq!(d.kind, ClassifierKind::Furniture);
        assert_eq!(d.label, "chair");
        assert_eq!(p.state().cycle.background.as_deref(), Some("chair"));
    }

    #[test]
    fn human_settle_announces_once_and_requests_detection() {
        let (mut p, clock) = pipeline();
        settle_primary(&mut p, &clock, "human");
        p.submit(ClassifierKind::HumanAnimal, obs("human", 95), clock.now());
        let events = p.drain_events();
        let presence = events
            .iter()
            .filter(|e| matches!(e, FusionEvent::HumanPresence { .. }))
            .count();
        assert_eq!(presence, 2);
        assert_eq!(narrations(&events), vec![HUMAN_ANNOUNCEMENT.to_string()]);
        assert!(p.gate(GateKind::Human).is_counting());
    }

    #[test]
    fn secondary_off_route_is_ignored() {
        let (mut p, clock) = pipeline();
        // primary not settled: nothing routes
        assert!(p.submit(ClassifierKind::Furniture, obs("chair", 95), clock.now()).is_none());
        assert!(p.window(ClassifierKind::Furniture).is_empty());

        settle_primary(&mut p, &clock, "dog");
        assert_eq!(p.state().route, Some(Route::Animal));
        p.submit(ClassifierKind::Furniture, obs("chair", 95), clock.now());
        assert!(p.window(ClassifierKind::Furniture).is_empty());
    }

    #[test]
    fn empty_batch_is_no_decision() {
        let (mut p, clock) = pipeline();
        settle_primary(&mut p, &clock, "human");
        assert!(p.submit_batch(ClassifierKind::Furniture, Vec::new(), clock.now()).is_none());
        assert_eq!(p.state().route, Some(Route::Human));
    }

    #[test]
    fn furniture_outranks_ambient_color() {
        let (mut p, clock) = pipeline();
        settle_primary(&mut p, &clock, "human");
        let now = clock.now();
        for _ in 0..5 {
            p.submit(ClassifierKind::Furniture, obs("sofa", 90), now);
        }
        for _ in 0..4 {
            p.submit(ClassifierKind::AmbientColor, obs("white wall", 95), now);
        }
        // both would settle on this frame; furniture wins and ambient is skipped
        let frame = Frame {
            human_animal: vec![obs("human", 95)],
            furniture: vec![obs("sofa", 90)],
            ambient_color: vec![obs("white wall", 95)],
            ..Frame::default()
        };
        p.process_frame(frame, now);
        assert_eq!(p.state().cycle.background.as_deref(), Some("sofa"));
        assert_eq!(p.window(ClassifierKind::AmbientColor).len(), 4);
    }

    #[test]
    fn ambient_color_fills_in_when_furniture_unsettled() {
        let (mut p, clock) = pipeline();
        let now = clock.now();
        // primary settles on frame 4, ambient needs five more routed frames
        for _ in 0..8 {
            let frame = Frame {
                human_animal: vec![obs("human", 95)],
                furniture: vec![obs("sofa", 20)],
                ambient_color: vec![obs("white wall", 95)],
                ..Frame::default()
            };
            p.process_frame(frame, now);
        }
        assert!(p.window(ClassifierKind::Furniture).is_empty());
        assert_eq!(p.state().cycle.background.as_deref(), Some("white wall"));
    }

    #[test]
    fn human_cycle_composes_on_expiry() {
        let (mut p, clock) = pipeline();
        settle_primary(&mut p, &clock, "human");
        let now = clock.now();
        for _ in 0..6 {
            p.submit(ClassifierKind::Furniture, obs("chair", 90), now);
        }
        let far = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        for _ in 0..5 {
            p.submit(
                ClassifierKind::Posture,
                Observation::new("sitting", 90, Aux::frame(7).with_box(far)),
                now,
            );
        }
        p.drain_events();
        for _ in 0..4 {
            p.submit(ClassifierKind::HumanAttribute, obs("man", 70), now);
        }
        // all three held: narrated straight away
        assert_eq!(
            narrations(&p.drain_events()),
            vec!["There is a man sitting on a chair".to_string()]
        );
        assert_eq!(p.state().previous.background.as_deref(), Some("chair"));

        clock.advance(Duration::from_secs(20));
        p.poll_gates(clock.now());
        assert_eq!(
            narrations(&p.drain_events()),
            vec!["There is a man sitting on a chair. The object is faraway".to_string()]
        );
        assert_eq!(p.state().cycle, Cycle::default());
        assert!(!p.state().flags.human_counting);
    }

    #[test]
    fn empty_cycle_reports_no_information() {
        let (mut p, clock) = pipeline();
        settle_primary(&mut p, &clock, "human");
        p.drain_events();
        clock.advance(Duration::from_secs(20));
        p.poll_gates(clock.now());
        assert_eq!(
            narrations(&p.drain_events()),
            vec!["no information found, trying again".to_string()]
        );
    }

    #[test]
    fn attribute_latch_holds_first_label() {
        let (mut p, clock) = pipeline();
        settle_primary(&mut p, &clock, "human");
        let now = clock.now();
        for _ in 0..4 {
            p.submit(ClassifierKind::HumanAttribute, obs("man", 70), now);
        }
        for _ in 0..4 {
            p.submit(ClassifierKind::HumanAttribute, obs("woman", 70), now);
        }
        assert_eq!(p.state().cycle.human.as_ref().unwrap().label, "man");
    }

    #[test]
    fn human_details_ignored_outside_human_cycle() {
        let (mut p, clock) = pipeline();
        let now = clock.now();
        // no cycle running yet
        for _ in 0..4 {
            p.submit(ClassifierKind::HumanAttribute, obs("man", 70), now);
        }
        assert!(p.window(ClassifierKind::HumanAttribute).is_empty());

        settle_primary(&mut p, &clock, "dog");
        assert_eq!(p.state().route, Some(Route::Animal));
        for _ in 0..4 {
            p.submit(ClassifierKind::HumanAttribute, obs("man", 70), now);
        }
        for _ in 0..5 {
            p.submit(ClassifierKind::Posture, obs("sitting", 90), now);
        }
        assert_eq!(p.state().cycle, Cycle::default());
        assert!(p.window(ClassifierKind::Posture).is_empty());
    }

    #[test]
    fn human_details_arrive_after_primary_frame() {
        let (mut p, clock) = pipeline();
        settle_primary(&mut p, &clock, "human");
        // later frame without a primary result: the cycle is still open
        p.process_frame(Frame::default(), clock.now());
        for _ in 0..5 {
            p.submit(ClassifierKind::Posture, obs("standing", 90), clock.now());
        }
        assert_eq!(p.state().cycle.posture.as_ref().unwrap().label, "standing");
    }

    #[test]
    fn out_of_range_luminosity_is_dropped() {
        let (mut p, clock) = pipeline();
        p.submit_luminosity(122, clock.now());
        assert_eq!(p.submit_luminosity(i64::MAX, clock.now()), LightState::AdequateLight);
        assert_eq!(p.submit_luminosity(-1, clock.now()), LightState::AdequateLight);
        assert_eq!(p.luminosity().len(), 1);
        assert_eq!(p.luminosity().band(), (97, 147));
    }

    #[test]
    fn frame_rejects_unknown_fields() {
        let frame: Frame =
            serde_json::from_str(r#"{"luminosity": 80, "posture": []}"#).unwrap();
        assert_eq!(frame.luminosity, Some(80));
        assert!(serde_json::from_str::<Frame>(r#"{"lumnosity": 80}"#).is_err());
    }

    #[test]
    fn animal_narrated_once_per_gate() {
        let (mut p, clock) = pipeline();
        settle_primary(&mut p, &clock, "animal");
        let now = clock.now();
        for _ in 0..5 {
            p.submit(ClassifierKind::Animal, obs("elephant", 90), now);
        }
        for _ in 0..5 {
            p.submit(ClassifierKind::Animal, obs("cat", 90), now);
        }
        assert_eq!(
            narrations(&p.drain_events()),
            vec!["There is an elephant Nearby".to_string()]
        );
        assert_eq!(p.state().previous_animal.as_deref(), Some("elephant"));

        clock.advance(Duration::from_secs(20));
        p.poll_gates(clock.now());
        assert!(p.state().previous_animal.is_none());

        settle_primary(&mut p, &clock, "animal");
        p.submit(ClassifierKind::Animal, obs("cat", 90), clock.now());
        assert_eq!(
            narrations(&p.drain_events()),
            vec!["There is a cat Nearby".to_string()]
        );
    }

    #[test]
    fn less_light_holds_torch_then_releases() {
        let (mut p, clock) = pipeline();
        assert_eq!(p.submit_luminosity(50, clock.now()), LightState::LessLight);
        assert_eq!(p.drain_events(), vec![FusionEvent::Torch { enabled: true }]);

        clock.advance(Duration::from_secs(1));
        p.poll_gates(clock.now());
        p.submit_luminosity(50, clock.now());
        // ticks keep it on without repeating the event
        assert!(p.drain_events().is_empty());

        clock.advance(Duration::from_secs(59));
        p.poll_gates(clock.now());
        assert_eq!(p.drain_events(), vec![FusionEvent::Torch { enabled: false }]);
    }

    #[test]
    fn bright_light_leaves_torch_alone() {
        let (mut p, clock) = pipeline();
        p.submit_luminosity(50, clock.now());
        p.drain_events();
        // out-of-band sample is dropped and empties the window
        assert_eq!(p.submit_luminosity(200, clock.now()), LightState::Unknown);
        assert_eq!(p.submit_luminosity(200, clock.now()), LightState::ExcessLight);
        assert!(p.drain_events().is_empty());
        assert!(p.state().flags.torch_on);
    }

    #[test]
    fn focus_throttled_to_gate_period() {
        let (mut p, clock) = pipeline();
        let mut requests = 0;
        for _ in 0..10 {
            p.begin_frame(clock.now());
            requests += p
                .drain_events()
                .iter()
                .filter(|e| **e == FusionEvent::FocusRequested)
                .count();
            clock.advance(Duration::from_secs(1));
        }
        // t=0 and t=5
        assert_eq!(requests, 2);
    }

    #[test]
    fn query_background_narrates_each_category() {
        let (mut p, _clock) = pipeline();
        p.query_background(&[obs("chair", 40), obs("bench", 30)]);
        assert_eq!(
            narrations(&p.drain_events()),
            vec![
                "There is a chair to sit".to_string(),
                "There is a bench to sit".to_string()
            ]
        );
    }
}
