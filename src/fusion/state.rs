//! Cross-branch state held by the pipeline: per-cycle values, the previous
//! values they were narrated as, and flags mirroring each gate.

use serde::Serialize;

use crate::gate::{GateEvent, GateKind};
use crate::queue::{BoundingBox, LightState};

/// A detector label held for the current narration cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Held {
    pub label: String,
    pub bounding_box: Option<BoundingBox>,
}

impl Held {
    pub fn new(label: impl Into<String>, bounding_box: Option<BoundingBox>) -> Self {
        Self {
            label: label.into(),
            bounding_box,
        }
    }
}

/// Which secondary cascade the last primary decision selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Route {
    Human,
    Animal,
}

/// Booleans mirroring the gates. Written only from gate ticks, expiries
/// and cancels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateFlags {
    pub human_counting: bool,
    pub animal_counting: bool,
    pub focus_armed: bool,
    pub torch_on: bool,
}

impl Default for GateFlags {
    fn default() -> Self {
        Self {
            human_counting: false,
            animal_counting: false,
            focus_armed: true,
            torch_on: false,
        }
    }
}

impl GateFlags {
    pub fn apply(&mut self, event: GateEvent) {
        match event {
            GateEvent::Tick { gate, .. } => match gate {
                GateKind::Human => self.human_counting = true,
                GateKind::Animal => self.animal_counting = true,
                GateKind::Focus => self.focus_armed = false,
                GateKind::Torch => self.torch_on = true,
            },
            GateEvent::Expired { gate } => self.reset(gate),
        }
    }

    /// Idle value for `gate`, used on expiry and cancel alike.
    pub fn reset(&mut self, gate: GateKind) {
        match gate {
            GateKind::Human => self.human_counting = false,
            GateKind::Animal => self.animal_counting = false,
            GateKind::Focus => self.focus_armed = true,
            GateKind::Torch => self.torch_on = false,
        }
    }
}

/// Values collected during one human-narration cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cycle {
    pub human: Option<Held>,
    pub posture: Option<Held>,
    pub background: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FusionState {
    pub cycle: Cycle,
    pub previous: Cycle,
    /// Animal narrated in the current animal gate, if any.
    pub previous_animal: Option<String>,
    pub flags: GateFlags,
    pub route: Option<Route>,
    /// Furniture settled in the current frame; ambient color is skipped.
    pub furniture_settled: bool,
    pub light: Option<LightState>,
}

impl FusionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// First attribute of a cycle wins.
    pub fn accept_human(&mut self, held: Held) -> bool {
        if self.cycle.human.is_some() {
            return false;
        }
        self.cycle.human = Some(held);
        true
    }

    pub fn accept_posture(&mut self, held: Held) -> bool {
        if self.cycle.posture.is_some() {
            return false;
        }
        self.cycle.posture = Some(held);
        true
    }

    pub fn accept_background(&mut self, label: &str) -> bool {
        if self.cycle.background.is_some() {
            return false;
        }
        self.cycle.background = Some(label.to_string());
        true
    }

    /// An animal is accepted only when none is pending.
    pub fn accept_animal(&mut self, label: &str) -> bool {
        if self.previous_animal.is_some() || self.flags.animal_counting {
            return false;
        }
        self.previous_animal = Some(label.to_string());
        true
    }

    /// Whether the cycle holds everything a full sentence needs.
    pub fn cycle_complete(&self) -> bool {
        self.cycle.human.is_some() && self.cycle.posture.is_some() && self.cycle.background.is_some()
    }

    /// Remember what was just narrated.
    pub fn mark_narrated(&mut self) {
        self.previous = self.cycle.clone();
    }

    /// Empty the cycle, returning what it held.
    pub fn take_cycle(&mut self) -> Cycle {
        std::mem::take(&mut self.cycle)
    }

    /// Start of a frame's primary routing.
    pub fn reset_route(&mut self) {
        self.route = None;
        self.furniture_settled = false;
    }
}
