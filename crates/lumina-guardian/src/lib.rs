//! # lumina-guardian — Personal-Safety Sessions
//!
//! Guardian mode lets a user share live location with a trusted partner
//! while walking, hide the map behind a privacy curtain, and hold an SOS
//! control that calls emergency services unless released within three
//! seconds.
//!
//! ## Modules
//!
//! - **Session** (`session.rs`): the state machine
//!   `Idle → Tracking → SosCountdown → SosActive → Tracking`, driven by
//!   explicit ticks and generation-stamped tokens.
//!
//! - **Location** (`location.rs`): the provider trait and the scoped
//!   [`LocationSubscription`] whose drop releases the device watch.
//!
//! - **Dialer** (`dialer.rs`): the fire-and-forget emergency call.
//!
//! - **Service** (`service.rs`): a tokio task that owns the session and
//!   turns the 1 s countdown and 5 s revert into real timers.
//!
//! - **Config** (`config.rs`): emergency number, countdown, and delays.
//!
//! ## Ownership
//!
//! The session is only ever mutated through [`Guardian`]. The service
//! gives out cloneable handles that send commands; nothing else holds a
//! mutable reference.

pub mod config;
pub mod dialer;
pub mod location;
pub mod service;
pub mod session;

pub use config::{GuardianConfig, DEFAULT_EMERGENCY_NUMBER, DEFAULT_PARTNER_NAME};
pub use dialer::{tel_uri, EmergencyDialer, MockDialer, TelUriDialer};
pub use location::{
    LocationError, LocationEvent, LocationFeed, LocationProvider, LocationSubscription,
    MockLocationProvider, Position,
};
pub use service::{spawn, GuardianHandle};
pub use session::{
    CountdownToken, Guardian, GuardianError, RevertToken, SafetyStatus, Session, TickOutcome,
};
