//! # Location Provider
//!
//! A provider hands out [`LocationSubscription`]s: lazy, non-restartable
//! streams of [`LocationEvent`]s. The subscription is the scoped resource
//! of a walk. Dropping it closes the stream and runs the provider's
//! release hook exactly once, so no fix can arrive after the owner lets go.
//!
//! ```text
//! provider ──LocationFeed──▶ channel ──▶ LocationSubscription ──▶ Guardian
//!    ▲                                          │
//!    └────────────── release hook ◀── drop ─────┘
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// A single position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Radius of the 68% confidence circle, in metres.
    pub accuracy_m: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, accuracy_m: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m,
        }
    }
}

/// What a live subscription delivers.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    /// A new position fix.
    Fix(Position),
    /// The provider lost signal or permission mid-walk. The stream stays open.
    Error(String),
}

/// Why a subscription could not be opened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// The device has no geolocation capability.
    #[error("geolocation is not supported by this device")]
    Unsupported,

    /// The user or OS refused location access.
    #[error("location permission denied: {0}")]
    PermissionDenied(String),
}

/// Source of live position fixes.
pub trait LocationProvider: Send {
    /// Begin watching the device position.
    fn subscribe(&self) -> Result<LocationSubscription, LocationError>;
}

// ─── Subscription ────────────────────────────────────────────────────

/// Producer half of a subscription, held by the provider.
#[derive(Debug, Clone)]
pub struct LocationFeed {
    tx: mpsc::UnboundedSender<LocationEvent>,
}

impl LocationFeed {
    /// Deliver a fix. Returns `false` once the subscription has been released.
    pub fn fix(&self, position: Position) -> bool {
        self.tx.send(LocationEvent::Fix(position)).is_ok()
    }

    /// Report a provider error. Returns `false` once the subscription has been released.
    pub fn error(&self, reason: impl Into<String>) -> bool {
        self.tx.send(LocationEvent::Error(reason.into())).is_ok()
    }

    /// Whether the consuming side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Consumer half of a subscription, owned by the session for one walk.
pub struct LocationSubscription {
    events: mpsc::UnboundedReceiver<LocationEvent>,
    release: Option<ReleaseHook>,
    exhausted: bool,
}

impl LocationSubscription {
    /// Create a connected feed/subscription pair.
    ///
    /// `on_release` runs once, when the subscription is dropped.
    pub fn channel<F>(on_release: F) -> (LocationFeed, Self)
    where
        F: FnOnce() + Send + 'static,
    {
        let (tx, events) = mpsc::unbounded_channel();
        (
            LocationFeed { tx },
            Self {
                events,
                release: Some(Box::new(on_release)),
                exhausted: false,
            },
        )
    }

    /// Next event, if one is already queued.
    pub fn try_next(&mut self) -> Option<LocationEvent> {
        self.events.try_recv().ok()
    }

    /// Wait for the next event.
    ///
    /// If every feed is dropped the stream never yields again; the last
    /// fix the owner holds stays authoritative.
    pub async fn next_event(&mut self) -> LocationEvent {
        if !self.exhausted {
            if let Some(event) = self.events.recv().await {
                return event;
            }
            self.exhausted = true;
            tracing::warn!("location feed closed by provider; holding last fix");
        }
        std::future::pending().await
    }
}

impl Drop for LocationSubscription {
    fn drop(&mut self) {
        self.events.close();
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for LocationSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationSubscription")
            .field("exhausted", &self.exhausted)
            .field("released", &self.release.is_none())
            .finish()
    }
}

// ─── Mock Provider ───────────────────────────────────────────────────

/// In-process location provider for development and tests.
///
/// Clones share state, so a test can keep one handle to push fixes while
/// the guardian owns another.
#[derive(Debug, Clone)]
pub struct MockLocationProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Debug)]
struct MockState {
    availability: Result<(), LocationError>,
    live: Option<(u64, LocationFeed)>,
    next_id: u64,
    subscribes: usize,
    releases: usize,
}

impl MockLocationProvider {
    /// A provider on a device with working geolocation.
    pub fn new() -> Self {
        Self::with_availability(Ok(()))
    }

    /// A provider on a device without geolocation.
    pub fn unsupported() -> Self {
        Self::with_availability(Err(LocationError::Unsupported))
    }

    /// A provider whose permission prompt is refused.
    pub fn denied(reason: &str) -> Self {
        Self::with_availability(Err(LocationError::PermissionDenied(reason.to_string())))
    }

    fn with_availability(availability: Result<(), LocationError>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState {
                availability,
                live: None,
                next_id: 0,
                subscribes: 0,
                releases: 0,
            })),
        }
    }

    /// Push a fix to the live subscription. Returns `false` if nobody is watching.
    pub fn push_fix(&self, position: Position) -> bool {
        self.inner
            .lock()
            .live
            .as_ref()
            .is_some_and(|(_, feed)| feed.fix(position))
    }

    /// Push a provider error to the live subscription.
    pub fn push_error(&self, reason: &str) -> bool {
        self.inner
            .lock()
            .live
            .as_ref()
            .is_some_and(|(_, feed)| feed.error(reason))
    }

    /// Drop the provider's feed, as a provider that stops reporting would.
    pub fn close_feed(&self) {
        self.inner.lock().live = None;
    }

    /// Whether a subscription is currently open.
    pub fn is_watching(&self) -> bool {
        self.inner
            .lock()
            .live
            .as_ref()
            .is_some_and(|(_, feed)| !feed.is_closed())
    }

    /// Subscriptions opened so far.
    pub fn subscribe_count(&self) -> usize {
        self.inner.lock().subscribes
    }

    /// Subscriptions released so far.
    pub fn release_count(&self) -> usize {
        self.inner.lock().releases
    }
}

impl Default for MockLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationProvider for MockLocationProvider {
    fn subscribe(&self) -> Result<LocationSubscription, LocationError> {
        let mut state = self.inner.lock();
        state.availability.clone()?;

        let id = state.next_id;
        state.next_id += 1;
        state.subscribes += 1;

        let shared = Arc::clone(&self.inner);
        let (feed, subscription) = LocationSubscription::channel(move || {
            let mut state = shared.lock();
            state.releases += 1;
            if state.live.as_ref().is_some_and(|(live_id, _)| *live_id == id) {
                state.live = None;
            }
        });
        state.live = Some((id, feed));
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here() -> Position {
        Position::new(52.52, 13.405, 8.0)
    }

    #[test]
    fn feed_delivers_in_order() {
        let (feed, mut sub) = LocationSubscription::channel(|| {});
        assert!(feed.fix(here()));
        assert!(feed.error("signal lost"));
        assert_eq!(sub.try_next(), Some(LocationEvent::Fix(here())));
        assert_eq!(sub.try_next(), Some(LocationEvent::Error("signal lost".into())));
        assert_eq!(sub.try_next(), None);
    }

    #[test]
    fn drop_runs_release_once_and_closes_feed() {
        let released = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&released);
        let (feed, sub) = LocationSubscription::channel(move || *counter.lock() += 1);
        drop(sub);
        assert_eq!(*released.lock(), 1);
        assert!(feed.is_closed());
        assert!(!feed.fix(here()));
    }

    #[test]
    fn mock_tracks_subscribe_and_release() {
        let provider = MockLocationProvider::new();
        let sub = provider.subscribe().unwrap();
        assert!(provider.is_watching());
        assert!(provider.push_fix(here()));
        drop(sub);
        assert!(!provider.is_watching());
        assert!(!provider.push_fix(here()));
        assert_eq!(provider.subscribe_count(), 1);
        assert_eq!(provider.release_count(), 1);
    }

    #[test]
    fn stale_release_does_not_clear_newer_subscription() {
        let provider = MockLocationProvider::new();
        let first = provider.subscribe().unwrap();
        let _second = provider.subscribe().unwrap();
        drop(first);
        assert!(provider.is_watching());
    }

    #[test]
    fn unsupported_and_denied_devices_refuse() {
        assert_eq!(
            MockLocationProvider::unsupported().subscribe().unwrap_err(),
            LocationError::Unsupported
        );
        assert!(matches!(
            MockLocationProvider::denied("user said no").subscribe(),
            Err(LocationError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn next_event_waits_for_feed() {
        let provider = MockLocationProvider::new();
        let mut sub = provider.subscribe().unwrap();
        provider.push_fix(here());
        assert_eq!(sub.next_event().await, LocationEvent::Fix(here()));
    }
}
