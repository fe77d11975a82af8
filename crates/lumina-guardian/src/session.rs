//! # Guardian Session State Machine
//!
//! Tracks one user's personal-safety session: the consent gate, the live
//! location subscription, the privacy curtain, and the SOS escalation.
//!
//! ## States
//!
//! ```text
//!            grant_consent() / start_walk()
//!   Idle ─────────────────────────────────────▶ Tracking ◀──────────────┐
//!    ▲                                          │   ▲                   │
//!    │              end_walk()                  │   │ cancel_sos()      │ revert (5s)
//!    └──────────────────────────────────────────┤   │                   │
//!                                  begin_sos()  ▼   │                   │
//!                                          SosCountdown ──3rd tick──▶ SosActive
//! ```
//!
//! ## Invariants
//!
//! - Entering `Idle` clears the last known location and releases the
//!   location subscription.
//! - `partner_notified` is true exactly in `Tracking` and `SosActive`.
//! - The countdown restarts from its configured start on every entry to
//!   `SosCountdown`.
//! - Consent, once granted, is never withdrawn.
//!
//! ## Timers
//!
//! The session owns no clock. `begin_sos()` returns a [`CountdownToken`]
//! and escalation returns a [`RevertToken`]; each carries the generation
//! it was issued under. Cancelling, restarting, or ending the walk bumps
//! the generation, so any tick or revert still in flight is ignored.
//! The async driver in `service.rs` feeds ticks from real timers; tests
//! feed them by hand.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GuardianConfig;
use crate::dialer::EmergencyDialer;
use crate::location::{LocationError, LocationEvent, LocationProvider, LocationSubscription, Position};

// ─── Status ──────────────────────────────────────────────────────────

/// Where a guardian session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyStatus {
    /// No walk in progress.
    Idle,
    /// Walk in progress, location broadcast to the partner.
    Tracking,
    /// SOS requested, counting down to the emergency call.
    SosCountdown,
    /// Emergency call dispatched.
    SosActive,
}

impl SafetyStatus {
    /// Whether a walk (and its location subscription) is live.
    pub fn is_walk_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Whether the partner is considered to be watching in this state.
    pub fn partner_watching(&self) -> bool {
        matches!(self, Self::Tracking | Self::SosActive)
    }
}

impl std::fmt::Display for SafetyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "IDLE",
            Self::Tracking => "TRACKING",
            Self::SosCountdown => "SOS_COUNTDOWN",
            Self::SosActive => "SOS_ACTIVE",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors surfaced by guardian operations.
///
/// Timer and idempotent no-op cases are not errors; they return quietly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardianError {
    /// Tracking was requested before the user consented to location sharing.
    #[error("location sharing requires consent")]
    ConsentRequired,

    /// The operation is not available from the current state.
    #[error("invalid guardian transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: SafetyStatus,
        /// Attempted target state.
        to: SafetyStatus,
    },

    /// The device could not start location tracking.
    #[error("location tracking unavailable: {0}")]
    Location(#[from] LocationError),

    /// The async driver has stopped.
    #[error("guardian service has shut down")]
    ServiceClosed,
}

// ─── Tokens ──────────────────────────────────────────────────────────

/// Stamp for the ticks of one countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownToken {
    generation: u64,
}

/// Stamp for the automatic return to tracking after a dispatched SOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevertToken {
    generation: u64,
}

/// Result of feeding a countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown decremented; this many seconds remain.
    Counting {
        /// Seconds left on the countdown.
        remaining: u32,
    },
    /// Countdown reached zero; the emergency call was dispatched.
    Escalated(RevertToken),
    /// Tick belongs to a cancelled or superseded countdown and was ignored.
    Stale,
}

// ─── Session ─────────────────────────────────────────────────────────

/// Read-only view of a guardian session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    status: SafetyStatus,
    has_consented: bool,
    privacy_mode: bool,
    last_known_location: Option<Position>,
    countdown_remaining: u32,
    partner_notified: bool,
}

impl Session {
    fn initial(countdown_start: u32) -> Self {
        Self {
            status: SafetyStatus::Idle,
            has_consented: false,
            privacy_mode: false,
            last_known_location: None,
            countdown_remaining: countdown_start,
            partner_notified: false,
        }
    }

    pub fn status(&self) -> SafetyStatus {
        self.status
    }

    pub fn has_consented(&self) -> bool {
        self.has_consented
    }

    /// Whether the privacy curtain hides the map on this device.
    pub fn privacy_mode(&self) -> bool {
        self.privacy_mode
    }

    pub fn last_known_location(&self) -> Option<Position> {
        self.last_known_location
    }

    /// Seconds left on the countdown. Only meaningful in `SosCountdown`.
    pub fn countdown_remaining(&self) -> u32 {
        self.countdown_remaining
    }

    pub fn partner_notified(&self) -> bool {
        self.partner_notified
    }

    /// Whether the consent disclosure should be shown instead of the walk view.
    pub fn needs_disclosure(&self) -> bool {
        !self.has_consented && self.status == SafetyStatus::Idle
    }
}

// ─── Guardian ────────────────────────────────────────────────────────

/// Owner of a guardian session and the collaborators it drives.
pub struct Guardian<P, D> {
    config: GuardianConfig,
    provider: P,
    dialer: D,
    session: Session,
    subscription: Option<LocationSubscription>,
    generation: u64,
}

impl<P, D> Guardian<P, D>
where
    P: LocationProvider,
    D: EmergencyDialer,
{
    /// New session in `Idle`, without consent.
    pub fn new(config: GuardianConfig, provider: P, dialer: D) -> Self {
        let config = config.normalized();
        let session = Session::initial(config.countdown_start);
        Self {
            config,
            provider,
            dialer,
            session,
            subscription: None,
            generation: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &GuardianConfig {
        &self.config
    }

    /// Record consent and start the walk (IDLE → TRACKING).
    ///
    /// Consent stays granted even if the device then refuses to track.
    pub fn grant_consent(&mut self) -> Result<(), GuardianError> {
        if !self.session.has_consented {
            tracing::info!("guardian location consent granted");
            self.session.has_consented = true;
        }
        if self.session.status.is_walk_active() {
            return Ok(());
        }
        self.start_tracking()
    }

    /// Start a walk with consent already on record (IDLE → TRACKING).
    ///
    /// No-op while a walk is live.
    pub fn start_walk(&mut self) -> Result<(), GuardianError> {
        if self.session.status.is_walk_active() {
            return Ok(());
        }
        if !self.session.has_consented {
            return Err(GuardianError::ConsentRequired);
        }
        self.start_tracking()
    }

    /// End the walk from any live state (→ IDLE).
    ///
    /// Releases the location subscription and invalidates any pending
    /// countdown tick or revert. No-op when already idle.
    pub fn end_walk(&mut self) {
        if !self.session.status.is_walk_active() {
            return;
        }
        self.generation += 1;
        self.release_subscription();
        self.transition(SafetyStatus::Idle, "walk ended");
    }

    /// Arm the SOS countdown (TRACKING → SOS_COUNTDOWN).
    ///
    /// From `SosCountdown` the countdown restarts and the previous token
    /// goes stale.
    pub fn begin_sos(&mut self) -> Result<CountdownToken, GuardianError> {
        match self.session.status {
            SafetyStatus::Tracking | SafetyStatus::SosCountdown => {}
            from => {
                return Err(GuardianError::InvalidTransition {
                    from,
                    to: SafetyStatus::SosCountdown,
                })
            }
        }
        self.generation += 1;
        self.transition(SafetyStatus::SosCountdown, "sos countdown armed");
        Ok(CountdownToken {
            generation: self.generation,
        })
    }

    /// Feed one countdown tick.
    ///
    /// The tick that would take the countdown from 1 to 0 dispatches the
    /// emergency call and moves to `SosActive`; with a start of 3 that is
    /// the third tick.
    pub fn tick(&mut self, token: CountdownToken) -> TickOutcome {
        if self.session.status != SafetyStatus::SosCountdown || token.generation != self.generation {
            tracing::debug!("ignoring stale countdown tick");
            return TickOutcome::Stale;
        }
        if self.session.countdown_remaining > 1 {
            self.session.countdown_remaining -= 1;
            tracing::debug!(remaining = self.session.countdown_remaining, "sos countdown tick");
            return TickOutcome::Counting {
                remaining: self.session.countdown_remaining,
            };
        }

        self.generation += 1;
        self.transition(SafetyStatus::SosActive, "countdown elapsed");
        self.dialer.dial(&self.config.emergency_number);
        TickOutcome::Escalated(RevertToken {
            generation: self.generation,
        })
    }

    /// Abort the countdown (SOS_COUNTDOWN → TRACKING, or IDLE without consent).
    ///
    /// Returns `false` and changes nothing outside `SosCountdown`.
    pub fn cancel_sos(&mut self) -> bool {
        if self.session.status != SafetyStatus::SosCountdown {
            return false;
        }
        self.generation += 1;
        if self.session.has_consented {
            self.transition(SafetyStatus::Tracking, "sos cancelled");
        } else {
            self.release_subscription();
            self.transition(SafetyStatus::Idle, "sos cancelled without consent");
        }
        true
    }

    /// Return to tracking after a dispatched SOS (SOS_ACTIVE → TRACKING).
    ///
    /// Returns `false` if the token is stale or the session already moved on.
    pub fn revert_after_sos(&mut self, token: RevertToken) -> bool {
        if self.session.status != SafetyStatus::SosActive || token.generation != self.generation {
            return false;
        }
        self.transition(SafetyStatus::Tracking, "sos dispatch window elapsed");
        true
    }

    /// Flip the privacy curtain. Returns the new setting.
    pub fn toggle_privacy(&mut self) -> bool {
        self.set_privacy(!self.session.privacy_mode);
        self.session.privacy_mode
    }

    pub fn set_privacy(&mut self, enabled: bool) {
        if self.session.privacy_mode != enabled {
            tracing::info!(enabled, "guardian privacy curtain changed");
        }
        self.session.privacy_mode = enabled;
    }

    /// Apply one event from the location subscription.
    ///
    /// Provider errors are logged and the last fix is kept. Events with
    /// no live walk are dropped.
    pub fn apply_location(&mut self, event: LocationEvent) {
        if self.subscription.is_none() {
            tracing::debug!("dropping location event outside a walk");
            return;
        }
        match event {
            LocationEvent::Fix(position) => self.session.last_known_location = Some(position),
            LocationEvent::Error(reason) => {
                tracing::warn!(%reason, "location provider error; keeping last fix");
            }
        }
    }

    /// Apply every event already queued on the subscription. Returns how many.
    pub fn poll_location(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.subscription.as_mut().and_then(LocationSubscription::try_next) {
            self.apply_location(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next event from the live subscription.
    ///
    /// Never resolves while no walk is live.
    pub async fn next_location_event(&mut self) -> LocationEvent {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.next_event().await,
            None => std::future::pending().await,
        }
    }

    fn start_tracking(&mut self) -> Result<(), GuardianError> {
        let subscription = self.provider.subscribe().map_err(|e| {
            tracing::error!(error = %e, "cannot start guardian walk");
            GuardianError::Location(e)
        })?;
        self.session.last_known_location = None;
        self.subscription = Some(subscription);
        self.transition(SafetyStatus::Tracking, "walk started");
        Ok(())
    }

    fn release_subscription(&mut self) {
        if self.subscription.take().is_some() {
            tracing::debug!("location subscription released");
        }
    }

    /// Single point of status change; keeps the derived fields consistent.
    fn transition(&mut self, to: SafetyStatus, reason: &'static str) {
        let from = self.session.status;
        if to == SafetyStatus::Idle {
            self.session.last_known_location = None;
        }
        self.session.countdown_remaining = match to {
            SafetyStatus::SosActive => 0,
            _ => self.config.countdown_start,
        };
        self.session.partner_notified = to.partner_watching();
        self.session.status = to;
        tracing::info!(%from, %to, reason, "guardian transition");
    }
}

impl<P, D> std::fmt::Debug for Guardian<P, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guardian")
            .field("session", &self.session)
            .field("subscribed", &self.subscription.is_some())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialer::MockDialer;
    use crate::location::MockLocationProvider;
    use proptest::prelude::*;

    type TestGuardian = Guardian<MockLocationProvider, MockDialer>;

    fn guardian() -> (TestGuardian, MockLocationProvider, MockDialer) {
        let provider = MockLocationProvider::new();
        let dialer = MockDialer::new();
        let g = Guardian::new(GuardianConfig::default(), provider.clone(), dialer.clone());
        (g, provider, dialer)
    }

    fn tracking() -> (TestGuardian, MockLocationProvider, MockDialer) {
        let (mut g, p, d) = guardian();
        g.grant_consent().unwrap();
        (g, p, d)
    }

    fn here() -> Position {
        Position::new(48.8566, 2.3522, 12.0)
    }

    // ── Consent and walks ────────────────────────────────────────────

    #[test]
    fn new_session_is_idle_without_consent() {
        let (g, _, _) = guardian();
        let s = g.session();
        assert_eq!(s.status(), SafetyStatus::Idle);
        assert!(!s.has_consented());
        assert!(!s.partner_notified());
        assert!(s.last_known_location().is_none());
        assert_eq!(s.countdown_remaining(), 3);
        assert!(s.needs_disclosure());
    }

    #[test]
    fn consent_starts_tracking_and_notifies_partner() {
        let (g, provider, _) = tracking();
        assert_eq!(g.session().status(), SafetyStatus::Tracking);
        assert!(g.session().has_consented());
        assert!(g.session().partner_notified());
        assert!(provider.is_watching());
    }

    #[test]
    fn start_walk_requires_consent() {
        let (mut g, provider, _) = guardian();
        assert_eq!(g.start_walk(), Err(GuardianError::ConsentRequired));
        assert_eq!(g.session().status(), SafetyStatus::Idle);
        assert_eq!(provider.subscribe_count(), 0);
    }

    #[test]
    fn start_walk_while_tracking_is_noop() {
        let (mut g, provider, _) = tracking();
        g.start_walk().unwrap();
        assert_eq!(g.session().status(), SafetyStatus::Tracking);
        assert_eq!(provider.subscribe_count(), 1);
    }

    #[test]
    fn end_walk_releases_subscription_and_clears_location() {
        let (mut g, provider, _) = tracking();
        provider.push_fix(here());
        assert_eq!(g.poll_location(), 1);
        assert_eq!(g.session().last_known_location(), Some(here()));

        g.end_walk();
        assert_eq!(g.session().status(), SafetyStatus::Idle);
        assert!(g.session().last_known_location().is_none());
        assert!(!g.session().partner_notified());
        assert!(!provider.is_watching());
        assert_eq!(provider.release_count(), 1);
    }

    #[test]
    fn consent_survives_end_walk() {
        let (mut g, _, _) = tracking();
        g.end_walk();
        assert!(g.session().has_consented());
        assert!(!g.session().needs_disclosure());
        g.start_walk().unwrap();
        assert_eq!(g.session().status(), SafetyStatus::Tracking);
    }

    #[test]
    fn no_fix_is_delivered_after_end_walk() {
        let (mut g, provider, _) = tracking();
        g.end_walk();
        assert!(!provider.push_fix(here()));
        assert_eq!(g.poll_location(), 0);
        assert!(g.session().last_known_location().is_none());
    }

    #[test]
    fn new_walk_starts_without_previous_fix() {
        let (mut g, provider, _) = tracking();
        provider.push_fix(here());
        g.poll_location();
        g.end_walk();
        g.start_walk().unwrap();
        assert!(g.session().last_known_location().is_none());
    }

    #[test]
    fn unsupported_device_stays_idle_but_keeps_consent() {
        let mut g = Guardian::new(
            GuardianConfig::default(),
            MockLocationProvider::unsupported(),
            MockDialer::new(),
        );
        let err = g.grant_consent().unwrap_err();
        assert_eq!(err, GuardianError::Location(LocationError::Unsupported));
        assert_eq!(g.session().status(), SafetyStatus::Idle);
        assert!(g.session().has_consented());
        assert!(!g.session().partner_notified());
    }

    // ── Location errors ──────────────────────────────────────────────

    #[test]
    fn provider_error_keeps_last_fix_and_status() {
        let (mut g, provider, _) = tracking();
        provider.push_fix(here());
        provider.push_error("signal lost");
        assert_eq!(g.poll_location(), 2);
        assert_eq!(g.session().status(), SafetyStatus::Tracking);
        assert_eq!(g.session().last_known_location(), Some(here()));
    }

    #[test]
    fn location_events_outside_a_walk_are_dropped() {
        let (mut g, _, _) = guardian();
        g.apply_location(LocationEvent::Fix(here()));
        assert!(g.session().last_known_location().is_none());
    }

    // ── SOS countdown ────────────────────────────────────────────────

    #[test]
    fn begin_sos_arms_countdown_from_three() {
        let (mut g, _, _) = tracking();
        g.begin_sos().unwrap();
        assert_eq!(g.session().status(), SafetyStatus::SosCountdown);
        assert_eq!(g.session().countdown_remaining(), 3);
        assert!(!g.session().partner_notified());
    }

    #[test]
    fn begin_sos_from_idle_is_rejected() {
        let (mut g, _, _) = guardian();
        assert_eq!(
            g.begin_sos(),
            Err(GuardianError::InvalidTransition {
                from: SafetyStatus::Idle,
                to: SafetyStatus::SosCountdown,
            })
        );
    }

    #[test]
    fn third_tick_dispatches_exactly_once() {
        let (mut g, _, dialer) = tracking();
        let token = g.begin_sos().unwrap();
        assert_eq!(g.tick(token), TickOutcome::Counting { remaining: 2 });
        assert_eq!(g.tick(token), TickOutcome::Counting { remaining: 1 });
        assert!(matches!(g.tick(token), TickOutcome::Escalated(_)));
        assert_eq!(g.session().status(), SafetyStatus::SosActive);
        assert!(g.session().partner_notified());
        assert_eq!(dialer.calls(), vec!["112"]);

        assert_eq!(g.tick(token), TickOutcome::Stale);
        assert_eq!(dialer.call_count(), 1);
    }

    #[test]
    fn cancel_before_third_tick_prevents_dispatch() {
        let (mut g, _, dialer) = tracking();
        let token = g.begin_sos().unwrap();
        g.tick(token);
        g.tick(token);
        assert!(g.cancel_sos());

        let s = g.session();
        assert_eq!(s.status(), SafetyStatus::Tracking);
        assert_eq!(s.countdown_remaining(), 3);
        assert!(s.partner_notified());

        assert_eq!(g.tick(token), TickOutcome::Stale);
        assert_eq!(dialer.call_count(), 0);
    }

    #[test]
    fn cancel_outside_countdown_is_noop() {
        let (mut g, _, _) = tracking();
        let before = g.session().clone();
        assert!(!g.cancel_sos());
        assert_eq!(*g.session(), before);

        let (mut idle, _, _) = guardian();
        let before = idle.session().clone();
        assert!(!idle.cancel_sos());
        assert_eq!(*idle.session(), before);
    }

    #[test]
    fn cancel_while_sos_active_keeps_revert_pending() {
        let (mut g, _, dialer) = tracking();
        let token = g.begin_sos().unwrap();
        g.tick(token);
        g.tick(token);
        let TickOutcome::Escalated(revert) = g.tick(token) else {
            panic!("expected escalation");
        };
        let before = g.session().clone();
        assert!(!g.cancel_sos());
        assert_eq!(*g.session(), before);
        assert_eq!(g.session().status(), SafetyStatus::SosActive);
        assert_eq!(dialer.call_count(), 1);
        assert!(g.revert_after_sos(revert));
        assert_eq!(g.session().status(), SafetyStatus::Tracking);
    }

    #[test]
    fn restarting_countdown_invalidates_previous_token() {
        let (mut g, _, dialer) = tracking();
        let first = g.begin_sos().unwrap();
        g.tick(first);
        let second = g.begin_sos().unwrap();
        assert_eq!(g.session().countdown_remaining(), 3);
        assert_eq!(g.tick(first), TickOutcome::Stale);
        assert_eq!(g.tick(second), TickOutcome::Counting { remaining: 2 });
        assert_eq!(dialer.call_count(), 0);
    }

    #[test]
    fn revert_returns_to_tracking() {
        let (mut g, _, _) = tracking();
        let token = g.begin_sos().unwrap();
        g.tick(token);
        g.tick(token);
        let TickOutcome::Escalated(revert) = g.tick(token) else {
            panic!("expected escalation");
        };
        assert!(g.revert_after_sos(revert));
        assert_eq!(g.session().status(), SafetyStatus::Tracking);
        assert!(!g.revert_after_sos(revert));
    }

    #[test]
    fn end_walk_during_sos_invalidates_revert() {
        let (mut g, provider, _) = tracking();
        let token = g.begin_sos().unwrap();
        g.tick(token);
        g.tick(token);
        let TickOutcome::Escalated(revert) = g.tick(token) else {
            panic!("expected escalation");
        };
        g.end_walk();
        assert!(!g.revert_after_sos(revert));
        assert_eq!(g.session().status(), SafetyStatus::Idle);
        assert!(!provider.is_watching());
    }

    #[test]
    fn end_walk_during_countdown_stops_ticks() {
        let (mut g, _, dialer) = tracking();
        let token = g.begin_sos().unwrap();
        g.end_walk();
        assert_eq!(g.tick(token), TickOutcome::Stale);
        assert_eq!(g.tick(token), TickOutcome::Stale);
        assert_eq!(g.tick(token), TickOutcome::Stale);
        assert_eq!(dialer.call_count(), 0);
    }

    #[test]
    fn location_keeps_updating_through_sos() {
        let (mut g, provider, _) = tracking();
        g.begin_sos().unwrap();
        provider.push_fix(here());
        g.poll_location();
        assert_eq!(g.session().last_known_location(), Some(here()));
    }

    #[test]
    fn custom_countdown_start() {
        let config = GuardianConfig {
            countdown_start: 1,
            emergency_number: "911".into(),
            ..GuardianConfig::default()
        };
        let dialer = MockDialer::new();
        let mut g = Guardian::new(config, MockLocationProvider::new(), dialer.clone());
        g.grant_consent().unwrap();
        let token = g.begin_sos().unwrap();
        assert!(matches!(g.tick(token), TickOutcome::Escalated(_)));
        assert_eq!(dialer.calls(), vec!["911"]);
    }

    // ── Privacy ──────────────────────────────────────────────────────

    #[test]
    fn privacy_toggle_is_independent_of_status() {
        let (mut g, _, _) = tracking();
        assert!(g.toggle_privacy());
        assert_eq!(g.session().status(), SafetyStatus::Tracking);
        assert!(g.session().partner_notified());
        assert!(!g.toggle_privacy());
    }

    // ── Display / serialization ──────────────────────────────────────

    #[test]
    fn status_display() {
        assert_eq!(SafetyStatus::Idle.to_string(), "IDLE");
        assert_eq!(SafetyStatus::Tracking.to_string(), "TRACKING");
        assert_eq!(SafetyStatus::SosCountdown.to_string(), "SOS_COUNTDOWN");
        assert_eq!(SafetyStatus::SosActive.to_string(), "SOS_ACTIVE");
    }

    #[test]
    fn session_serializes_status_in_wire_form() {
        let (g, _, _) = tracking();
        let json = serde_json::to_value(g.session()).unwrap();
        assert_eq!(json["status"], "TRACKING");
        assert_eq!(json["partner_notified"], true);
    }

    // ── Properties ───────────────────────────────────────────────────

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Start,
        End,
        Privacy,
        Fix,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Start), Just(Op::End), Just(Op::Privacy), Just(Op::Fix)]
    }

    proptest! {
        #[test]
        fn walks_alternate_and_privacy_is_orthogonal(ops in proptest::collection::vec(op(), 0..64)) {
            let (mut g, provider, _) = tracking();
            for op in ops {
                let before = g.session().clone();
                match op {
                    Op::Start => {
                        g.start_walk().unwrap();
                        prop_assert_eq!(g.session().status(), SafetyStatus::Tracking);
                    }
                    Op::End => {
                        g.end_walk();
                        prop_assert_eq!(g.session().status(), SafetyStatus::Idle);
                        prop_assert!(g.session().last_known_location().is_none());
                        prop_assert!(!provider.is_watching());
                    }
                    Op::Privacy => {
                        g.toggle_privacy();
                        prop_assert_eq!(g.session().status(), before.status());
                        prop_assert_eq!(g.session().partner_notified(), before.partner_notified());
                        prop_assert_eq!(g.session().last_known_location(), before.last_known_location());
                    }
                    Op::Fix => {
                        provider.push_fix(here());
                        g.poll_location();
                    }
                }
                prop_assert_eq!(
                    g.session().partner_notified(),
                    g.session().status().partner_watching()
                );
            }
        }
    }
}
