//! Sentence composition for spoken narration.

use serde::Serialize;

pub const NO_INFORMATION: &str = "no information found, trying again";
pub const HUMAN_ANNOUNCEMENT: &str = "There is a human Nearby. Summary will be provided in short";

/// What a human-narration cycle found out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Described(String),
    NoInformation,
}

impl Summary {
    pub fn sentence(&self) -> &str {
        match self {
            Summary::Described(s) => s,
            Summary::NoInformation => NO_INFORMATION,
        }
    }
}

/// Precedence: all three, human+posture, human, background, nothing.
pub fn compose_summary(
    human: Option<&str>,
    posture: Option<&str>,
    background: Option<&str>,
) -> Summary {
    match (human, posture, background) {
        (Some(h), Some(p), Some(b)) => Summary::Described(format!("a {h} {p} on a {b}")),
        (Some(h), Some(p), None) => Summary::Described(format!("a {h}, {p}")),
        (Some(h), _, _) => Summary::Described(format!("a {h} nearby")),
        (None, _, Some(b)) => Summary::Described(format!("a {b} nearby")),
        (None, _, None) => Summary::NoInformation,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Proximity {
    Nearby,
    Faraway,
}

impl Proximity {
    pub fn from_area(area: f32, nearby_area: f32) -> Self {
        if area >= nearby_area {
            Proximity::Nearby
        } else {
            Proximity::Faraway
        }
    }
}

impl std::fmt::Display for Proximity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Proximity::Nearby => write!(f, "nearby"),
            Proximity::Faraway => write!(f, "faraway"),
        }
    }
}

/// Spoken form of a cycle summary, with an optional proximity remark.
pub fn summary_narration(summary: &Summary, proximity: Option<Proximity>) -> String {
    let base = match summary {
        Summary::Described(s) => format!("There is {s}"),
        Summary::NoInformation => NO_INFORMATION.to_string(),
    };
    match proximity {
        Some(p) => format!("{base}. The object is {p}"),
        None => base,
    }
}

/// Indefinite article by leading vowel letter.
pub fn article(label: &str) -> &'static str {
    match label.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

pub fn animal_narration(label: &str) -> String {
    format!("There is {} {label} Nearby", article(label))
}

/// Reply to an on-demand background query.
pub fn seat_narration(label: &str) -> String {
    format!("There is a {label} to sit")
}
