//! # lumina-core — Foundational Types for Lumina
//!
//! Leaf crate of the workspace. The store client, the Sage, and the CLI build on it;
//! it depends on nothing internal.
//!
//! ## Contents
//!
//! - **Identifiers** (`identity.rs`): `UserId`, `CycleEntryId`,
//!   `ChatMessageId`, `ContactId`. No bare UUIDs cross crate boundaries.
//!
//! - **Timestamps** (`temporal.rs`): UTC-only `Timestamp` with seconds
//!   precision, plus the calendar-day helpers used to key cycle entries.
//!
//! - **Chat** (`chat.rs`): `ChatRole` and `ChatTurn`, the shape of
//!   conversation history stored remotely and replayed to the Sage.
//!
//! - **Cycle domain** (`cycle.rs`): `AppMode`, the four cycle phases and
//!   the symptom catalogue shared by the store client and the Sage prompts.
//!
//! - **Errors** (`error.rs`): `ValidationError`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lumina-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod chat;
pub mod cycle;
pub mod error;
pub mod identity;
pub mod temporal;

pub use chat::{ChatRole, ChatTurn};
pub use cycle::{
    validate_cycle_day, AppMode, CyclePhase, Symptom, SymptomLog, CYCLE_PHASES, DEFAULT_CYCLE_LENGTH,
    SYMPTOMS,
};
pub use error::ValidationError;
pub use identity::{ChatMessageId, ContactId, CycleEntryId, UserId};
pub use temporal::{CalendarDate, Timestamp};
