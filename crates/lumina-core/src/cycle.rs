//! # Cycle Domain
//!
//! The tracker's vocabulary: which mode the app is in, the four phases of
//! a standard cycle, and the fixed symptom catalogue users log from.
//!
//! ## Phases (standard 28-day cycle)
//!
//! ```text
//! day  1 ─────  5  Menstruation
//! day  6 ───── 13  Follicular
//! day 14 ───── 16  Ovulation
//! day 17 ───── 28  Luteal
//! ```
//!
//! Cycles longer than 28 days extend the luteal phase. Day numbers past
//! the cycle length wrap into the next cycle.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Cycle length assumed when the user has not configured one.
pub const DEFAULT_CYCLE_LENGTH: u32 = 28;

/// Mood reported to a partner when nothing has been logged.
const BALANCED_MOOD: &str = "Balanced";

// ─── App Mode ────────────────────────────────────────────────────────

/// Which tracker the user is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppMode {
    /// Menstrual-cycle tracking.
    #[default]
    Cycle,
    /// Pregnancy companion.
    Pregnancy,
}

impl AppMode {
    /// The other mode.
    pub fn toggle(self) -> Self {
        match self {
            Self::Cycle => Self::Pregnancy,
            Self::Pregnancy => Self::Cycle,
        }
    }

    /// User-facing label for the mode switch.
    pub fn label(self) -> &'static str {
        match self {
            Self::Cycle => "Cycle",
            Self::Pregnancy => "Blossom",
        }
    }

    /// Wire name (`CYCLE`, `PREGNANCY`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cycle => "CYCLE",
            Self::Pregnancy => "PREGNANCY",
        }
    }
}

impl std::fmt::Display for AppMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CYCLE" => Ok(Self::Cycle),
            "PREGNANCY" => Ok(Self::Pregnancy),
            _ => Err(ValidationError::UnknownMode(s.to_string())),
        }
    }
}

// ─── Phases ──────────────────────────────────────────────────────────

/// A named span of cycle days with its dial colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CyclePhase {
    /// Display name.
    pub name: &'static str,
    /// Dial colour as `#RRGGBB`.
    pub color: &'static str,
    /// First day of the phase (1-based, inclusive).
    pub start_day: u32,
    /// Last day of the phase (inclusive).
    pub end_day: u32,
}

/// The four phases of a standard cycle, in order.
pub static CYCLE_PHASES: [CyclePhase; 4] = [
    CyclePhase {
        name: "Menstruation",
        color: "#FFB7C5",
        start_day: 1,
        end_day: 5,
    },
    CyclePhase {
        name: "Follicular",
        color: "#E0BBE4",
        start_day: 6,
        end_day: 13,
    },
    CyclePhase {
        name: "Ovulation",
        color: "#FDF2C6",
        start_day: 14,
        end_day: 16,
    },
    CyclePhase {
        name: "Luteal",
        color: "#D4F0F0",
        start_day: 17,
        end_day: 28,
    },
];

impl CyclePhase {
    /// Phase for `day` in a cycle of `cycle_length` days.
    ///
    /// Returns `None` for day 0 or a zero-length cycle.
    pub fn for_day(day: u32, cycle_length: u32) -> Option<&'static CyclePhase> {
        if day == 0 || cycle_length == 0 {
            return None;
        }
        let day_in_cycle = (day - 1) % cycle_length + 1;
        CYCLE_PHASES
            .iter()
            .find(|p| (p.start_day..=p.end_day).contains(&day_in_cycle))
            .or_else(|| CYCLE_PHASES.last())
    }

    /// Dial arc for this phase as `(start, end)` degrees, 0° at the top.
    pub fn arc_degrees(&self, cycle_length: u32) -> (f64, f64) {
        let len = f64::from(cycle_length.max(1));
        (
            f64::from(self.start_day) / len * 360.0,
            f64::from(self.end_day) / len * 360.0,
        )
    }
}

/// Validate that `day` lies within a cycle of `cycle_length` days.
pub fn validate_cycle_day(day: u32, cycle_length: u32) -> Result<u32, ValidationError> {
    if cycle_length == 0 {
        return Err(ValidationError::EmptyCycle);
    }
    if day == 0 || day > cycle_length {
        return Err(ValidationError::CycleDayOutOfRange { day, cycle_length });
    }
    Ok(day)
}

// ─── Symptoms ────────────────────────────────────────────────────────

/// An entry in the symptom catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Symptom {
    /// Stable id stored in cycle entries.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Emoji shown in the symptom garden.
    pub icon: &'static str,
    /// Intensity 1..=5.
    pub intensity: u8,
}

/// Every symptom a user can log.
pub static SYMPTOMS: [Symptom; 8] = [
    Symptom {
        id: "calm",
        name: "Calm",
        icon: "🌿",
        intensity: 1,
    },
    Symptom {
        id: "energetic",
        name: "Energetic",
        icon: "⚡",
        intensity: 1,
    },
    Symptom {
        id: "creative",
        name: "Creative",
        icon: "✨",
        intensity: 1,
    },
    Symptom {
        id: "bloated",
        name: "Bloated",
        icon: "💧",
        intensity: 1,
    },
    Symptom {
        id: "cravings",
        name: "Cravings",
        icon: "🍫",
        intensity: 1,
    },
    Symptom {
        id: "cramps",
        name: "Cramps",
        icon: "🔥",
        intensity: 1,
    },
    Symptom {
        id: "sensitive",
        name: "Sensitive",
        icon: "🌙",
        intensity: 1,
    },
    Symptom {
        id: "fatigue",
        name: "Fatigue",
        icon: "💤",
        intensity: 1,
    },
];

impl Symptom {
    /// Look up a catalogue entry by id.
    pub fn by_id(id: &str) -> Option<&'static Symptom> {
        SYMPTOMS.iter().find(|s| s.id == id)
    }
}

/// The symptoms logged for one day, in the order they were logged.
///
/// A symptom appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymptomLog {
    entries: Vec<&'static Symptom>,
}

impl SymptomLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from ids read back from storage.
    ///
    /// Ids no longer in the catalogue are dropped.
    pub fn from_stored_ids<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut log = Self::new();
        for id in ids {
            // Unknown ids are the only possible error here.
            let _ = log.log(id);
        }
        log
    }

    /// Log a symptom. Returns `false` if it was already logged.
    pub fn log(&mut self, id: &str) -> Result<bool, ValidationError> {
        let symptom = Symptom::by_id(id).ok_or_else(|| ValidationError::UnknownSymptom(id.to_string()))?;
        if self.entries.iter().any(|s| s.id == symptom.id) {
            return Ok(false);
        }
        self.entries.push(symptom);
        Ok(true)
    }

    /// Remove a symptom. Returns `false` if it was not logged.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|s| s.id != id);
        self.entries.len() != before
    }

    /// Ids in logging order, as stored remotely.
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|s| s.id.to_string()).collect()
    }

    /// Display names in logging order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|s| s.name).collect()
    }

    /// The mood shown to a partner: the first logged symptom, or "Balanced".
    pub fn headline_mood(&self) -> &'static str {
        self.entries.first().map_or(BALANCED_MOOD, |s| s.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Symptom> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
