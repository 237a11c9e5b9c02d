//! Static fusion configuration: per-classifier window table, gate durations,
//! luminosity band constants. Defaults are the build-time table; a JSON file
//! may override any subset of it. Read-only once a pipeline is built.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The fixed set of classifiers whose outputs are smoothed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    HumanAnimal,
    Furniture,
    AmbientColor,
    Animal,
    HumanAttribute,
    Posture,
}

impl ClassifierKind {
    pub const ALL: [ClassifierKind; 6] = [
        ClassifierKind::HumanAnimal,
        ClassifierKind::Furniture,
        ClassifierKind::AmbientColor,
        ClassifierKind::Animal,
        ClassifierKind::HumanAttribute,
        ClassifierKind::Posture,
    ];

    /// Dense index, used to key per-kind arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ClassifierKind::HumanAnimal => 0,
            ClassifierKind::Furniture => 1,
            ClassifierKind::AmbientColor => 2,
            ClassifierKind::Animal => 3,
            ClassifierKind::HumanAttribute => 4,
            ClassifierKind::Posture => 5,
        }
    }
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierKind::HumanAnimal => write!(f, "HumanAnimal"),
            ClassifierKind::Furniture => write!(f, "Furniture"),
            ClassifierKind::AmbientColor => write!(f, "AmbientColor"),
            ClassifierKind::Animal => write!(f, "Animal"),
            ClassifierKind::HumanAttribute => write!(f, "HumanAttribute"),
            ClassifierKind::Posture => write!(f, "Posture"),
        }
    }
}

/// Admission threshold and nominal capacity of one score-gated window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Inclusive lower bound of the accepted score band `[min, 100]`.
    pub min_score_threshold: u8,
    /// Occupancy required to settle, and the trim bound.
    pub capacity: usize,
}

impl WindowConfig {
    pub const fn new(min_score_threshold: u8, capacity: usize) -> Self {
        Self {
            min_score_threshold,
            capacity,
        }
    }
}

/// Per-kind window table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowTable {
    pub human_animal: WindowConfig,
    pub furniture: WindowConfig,
    pub ambient_color: WindowConfig,
    pub animal: WindowConfig,
    pub human_attribute: WindowConfig,
    pub posture: WindowConfig,
}

impl Default for WindowTable {
    fn default() -> Self {
        Self {
            human_animal: WindowConfig::new(82, 4),
            furniture: WindowConfig::new(50, 6),
            ambient_color: WindowConfig::new(88, 5),
            animal: WindowConfig::new(82, 5),
            human_attribute: WindowConfig::new(60, 4),
            posture: WindowConfig::new(80, 5),
        }
    }
}

impl WindowTable {
    pub fn get(&self, kind: ClassifierKind) -> WindowConfig {
        match kind {
            ClassifierKind::HumanAnimal => self.human_animal,
            ClassifierKind::Furniture => self.furniture,
            ClassifierKind::AmbientColor => self.ambient_color,
            ClassifierKind::Animal => self.animal,
            ClassifierKind::HumanAttribute => self.human_attribute,
            ClassifierKind::Posture => self.posture,
        }
    }
}

/// Durations of the four debounce gates, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateDurations {
    pub human_ms: u64,
    pub animal_ms: u64,
    pub focus_ms: u64,
    pub torch_ms: u64,
    /// Interval between periodic ticks of a counting gate.
    pub tick_ms: u64,
}

impl Default for GateDurations {
    fn default() -> Self {
        Self {
            human_ms: 20_000,
            animal_ms: 20_000,
            focus_ms: 5_000,
            torch_ms: 60_000,
            tick_ms: 1_000,
        }
    }
}

impl GateDurations {
    pub fn human(&self) -> Duration {
        Duration::from_millis(self.human_ms)
    }

    pub fn animal(&self) -> Duration {
        Duration::from_millis(self.animal_ms)
    }

    pub fn focus(&self) -> Duration {
        Duration::from_millis(self.focus_ms)
    }

    pub fn torch(&self) -> Duration {
        Duration::from_millis(self.torch_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Accept-band and averaging constants for the luminosity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LuminosityConfig {
    /// Half-width of the accept-band around the anchor sample.
    pub band: i64,
    /// Most-recent samples summed by `average()`.
    pub considered: usize,
}

impl Default for LuminosityConfig {
    fn default() -> Self {
        Self {
            band: 25,
            considered: 10,
        }
    }
}

/// Complete fusion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub windows: WindowTable,
    pub gates: GateDurations,
    pub luminosity: LuminosityConfig,
    /// Posture box area (px²) at or above which the subject is "nearby".
    pub proximity_area: f32,
    /// How often the worker wakes to poll gates when no input arrives.
    pub poll_interval_ms: u64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            windows: WindowTable::default(),
            gates: GateDurations::default(),
            luminosity: LuminosityConfig::default(),
            proximity_area: 100_000.0,
            poll_interval_ms: 100,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidCapacity { kind: ClassifierKind },
    InvalidThreshold { kind: ClassifierKind, value: u8 },
    InvalidDuration { gate: &'static str },
    InvalidLuminosity(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config IO error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::InvalidCapacity { kind } => {
                write!(f, "{kind}: capacity must be > 0")
            }
            ConfigError::InvalidThreshold { kind, value } => {
                write!(f, "{kind}: threshold {value} outside 0..=100")
            }
            ConfigError::InvalidDuration { gate } => {
                write!(f, "{gate} gate: duration must be > 0")
            }
            ConfigError::InvalidLuminosity(msg) => write!(f, "luminosity: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl FusionConfig {
    /// Load a JSON override. Missing fields keep their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: FusionConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn window(&self, kind: ClassifierKind) -> WindowConfig {
        self.windows.get(kind)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject tables that would make a settle condition unreachable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in ClassifierKind::ALL {
            let w = self.window(kind);
            if w.capacity == 0 {
                return Err(ConfigError::InvalidCapacity { kind });
            }
            if w.min_score_threshold > 100 {
                return Err(ConfigError::InvalidThreshold {
                    kind,
                    value: w.min_score_threshold,
                });
            }
        }
        let gates = [
            ("human", self.gates.human_ms),
            ("animal", self.gates.animal_ms),
            ("focus", self.gates.focus_ms),
            ("torch", self.gates.torch_ms),
            ("tick", self.gates.tick_ms),
        ];
        for (gate, ms) in gates {
            if ms == 0 {
                return Err(ConfigError::InvalidDuration { gate });
            }
        }
        if self.luminosity.considered == 0 {
            return Err(ConfigError::InvalidLuminosity("considered must be > 0"));
        }
        if self.luminosity.band < 0 {
            return Err(ConfigError::InvalidLuminosity("band must be >= 0"));
        }
        Ok(())
    }
}
