//! # Validation Errors
//!
//! Validation failures for the foundational types, built with `thiserror`.
//! Subsystem crates (guardian, store client, sage) define their own enums;
//! the CLI surfaces these through `anyhow`.

use thiserror::Error;

/// Validation errors for domain primitives.
///
/// Each variant carries the rejected input so a caller can show it back
/// to the user without re-deriving it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identifier is not a UUID.
    #[error("invalid {kind} identifier: \"{value}\" (expected a UUID)")]
    InvalidIdentifier {
        /// Which identifier namespace was being parsed.
        kind: &'static str,
        /// The string that failed to parse.
        value: String,
    },

    /// Timestamp string is not valid UTC RFC 3339.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Calendar date is not `YYYY-MM-DD`.
    #[error("invalid calendar date: \"{0}\" (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// Cycle day outside `1..=cycle_length`.
    #[error("cycle day {day} is outside 1..={cycle_length}")]
    CycleDayOutOfRange {
        /// The rejected day.
        day: u32,
        /// The cycle length it was checked against.
        cycle_length: u32,
    },

    /// Cycle length of zero.
    #[error("cycle length must be at least 1 day")]
    EmptyCycle,

    /// Symptom id not present in the catalogue.
    #[error("unknown symptom: \"{0}\"")]
    UnknownSymptom(String),

    /// App mode string is neither `CYCLE` nor `PREGNANCY`.
    #[error("unknown app mode: \"{0}\" (expected CYCLE or PREGNANCY)")]
    UnknownMode(String),
}
