//! Classification queues: per-kind score-gated windows and the luminosity
//! window. Pure data structures, no timing and no I/O.

pub mod luminosity;
pub mod window;

pub use luminosity::{mean_luma, LightState, LuminosityWindow, MAX_LUMA};
pub use window::{Admission, Aux, BoundingBox, Observation, ScoreGatedWindow};
