//! # Guardian Service
//!
//! Async driver that owns a [`Guardian`] on a single task and feeds it
//! from three sources: user commands, the countdown/revert timers, and
//! the location subscription.
//!
//! ## Ordering
//!
//! The task polls commands first. A `cancel_sos` or `end_walk` that is
//! queued when a tick comes due is applied before the tick, and the
//! handler drops the timer itself, so the next loop iteration has no
//! countdown left to poll. A tick that still slips through carries a
//! stale generation and is ignored by the session.
//!
//! ## Teardown
//!
//! When every [`GuardianHandle`] is dropped the command channel closes,
//! the task returns, and the guardian (with its location subscription)
//! is dropped.

use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior, Sleep};

use crate::dialer::EmergencyDialer;
use crate::location::LocationProvider;
use crate::session::{CountdownToken, Guardian, GuardianError, RevertToken, Session, TickOutcome};

/// Commands buffered before senders wait.
const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy)]
enum Command {
    GrantConsent,
    StartWalk,
    EndWalk,
    BeginSos,
    CancelSos,
    TogglePrivacy,
    SetPrivacy(bool),
    Snapshot,
}

struct Request {
    command: Command,
    reply: oneshot::Sender<Result<Session, GuardianError>>,
}

/// Cloneable handle to a running guardian service.
///
/// Every method returns the session as it stood right after the command
/// was applied.
#[derive(Debug, Clone)]
pub struct GuardianHandle {
    requests: mpsc::Sender<Request>,
    updates: watch::Receiver<Session>,
}

impl GuardianHandle {
    pub async fn grant_consent(&self) -> Result<Session, GuardianError> {
        self.send(Command::GrantConsent).await
    }

    pub async fn start_walk(&self) -> Result<Session, GuardianError> {
        self.send(Command::StartWalk).await
    }

    pub async fn end_walk(&self) -> Result<Session, GuardianError> {
        self.send(Command::EndWalk).await
    }

    /// Arm the SOS countdown. Ticks begin one interval from now.
    pub async fn begin_sos(&self) -> Result<Session, GuardianError> {
        self.send(Command::BeginSos).await
    }

    pub async fn cancel_sos(&self) -> Result<Session, GuardianError> {
        self.send(Command::CancelSos).await
    }

    pub async fn toggle_privacy(&self) -> Result<Session, GuardianError> {
        self.send(Command::TogglePrivacy).await
    }

    pub async fn set_privacy(&self, enabled: bool) -> Result<Session, GuardianError> {
        self.send(Command::SetPrivacy(enabled)).await
    }

    /// Current session, after everything queued ahead of this call.
    pub async fn snapshot(&self) -> Result<Session, GuardianError> {
        self.send(Command::Snapshot).await
    }

    /// Receiver that sees every session change, including timer-driven ones.
    pub fn updates(&self) -> watch::Receiver<Session> {
        self.updates.clone()
    }

    async fn send(&self, command: Command) -> Result<Session, GuardianError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request { command, reply })
            .await
            .map_err(|_| GuardianError::ServiceClosed)?;
        response.await.map_err(|_| GuardianError::ServiceClosed)?
    }
}

/// Spawn the driver task for `guardian` on the current runtime.
pub fn spawn<P, D>(guardian: Guardian<P, D>) -> (GuardianHandle, JoinHandle<()>)
where
    P: LocationProvider + 'static,
    D: EmergencyDialer + 'static,
{
    let (requests, inbox) = mpsc::channel(COMMAND_BUFFER);
    let (publisher, updates) = watch::channel(guardian.session().clone());
    let task = tokio::spawn(run(guardian, inbox, publisher));
    (GuardianHandle { requests, updates }, task)
}

// ─── Timers ──────────────────────────────────────────────────────────

struct Countdown {
    token: CountdownToken,
    interval: Interval,
}

impl Countdown {
    fn start(token: CountdownToken, every: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + every, every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { token, interval }
    }
}

struct PendingRevert {
    token: RevertToken,
    sleep: Pin<Box<Sleep>>,
}

async fn next_tick(countdown: &mut Option<Countdown>) -> CountdownToken {
    match countdown {
        Some(c) => {
            c.interval.tick().await;
            c.token
        }
        None => std::future::pending().await,
    }
}

async fn revert_due(revert: &mut Option<PendingRevert>) -> RevertToken {
    match revert {
        Some(r) => {
            r.sleep.as_mut().await;
            r.token
        }
        None => std::future::pending().await,
    }
}

// ─── Event loop ──────────────────────────────────────────────────────

async fn run<P, D>(
    mut guardian: Guardian<P, D>,
    mut inbox: mpsc::Receiver<Request>,
    publisher: watch::Sender<Session>,
) where
    P: LocationProvider,
    D: EmergencyDialer,
{
    let tick_every = guardian.config().tick_interval;
    let revert_after = guardian.config().sos_revert_after;
    let mut countdown: Option<Countdown> = None;
    let mut revert: Option<PendingRevert> = None;

    tracing::debug!("guardian service started");
    loop {
        tokio::select! {
            biased;

            request = inbox.recv() => {
                let Some(Request { command, reply }) = request else {
                    break;
                };
                let result = apply(&mut guardian, command, &mut countdown, &mut revert, tick_every);
                // The caller may have stopped waiting; the command still took effect.
                let _ = reply.send(result);
            }

            token = next_tick(&mut countdown) => {
                match guardian.tick(token) {
                    TickOutcome::Counting { .. } => {}
                    TickOutcome::Escalated(token) => {
                        countdown = None;
                        revert = Some(PendingRevert {
                            token,
                            sleep: Box::pin(time::sleep(revert_after)),
                        });
                    }
                    TickOutcome::Stale => countdown = None,
                }
            }

            token = revert_due(&mut revert) => {
                revert = None;
                guardian.revert_after_sos(token);
            }

            event = guardian.next_location_event() => {
                guardian.apply_location(event);
            }
        }

        publisher.send_if_modified(|published| {
            if *published == *guardian.session() {
                return false;
            }
            *published = guardian.session().clone();
            true
        });
    }
    tracing::debug!("guardian service stopped; releasing session");
}

fn apply<P, D>(
    guardian: &mut Guardian<P, D>,
    command: Command,
    countdown: &mut Option<Countdown>,
    revert: &mut Option<PendingRevert>,
    tick_every: Duration,
) -> Result<Session, GuardianError>
where
    P: LocationProvider,
    D: EmergencyDialer,
{
    match command {
        Command::GrantConsent => guardian.grant_consent()?,
        Command::StartWalk => guardian.start_walk()?,
        Command::EndWalk => {
            guardian.end_walk();
            *countdown = None;
            *revert = None;
        }
        Command::BeginSos => {
            let token = guardian.begin_sos()?;
            *countdown = Some(Countdown::start(token, tick_every));
        }
        Command::CancelSos => {
            if guardian.cancel_sos() {
                *countdown = None;
            }
        }
        Command::TogglePrivacy => {
            guardian.toggle_privacy();
        }
        Command::SetPrivacy(enabled) => guardian.set_privacy(enabled),
        Command::Snapshot => {}
    }
    Ok(guardian.session().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuardianConfig;
    use crate::dialer::MockDialer;
    use crate::location::MockLocationProvider;
    use crate::session::SafetyStatus;

    #[tokio::test(start_paused = true)]
    async fn snapshot_reflects_commands() {
        let guardian = Guardian::new(
            GuardianConfig::default(),
            MockLocationProvider::new(),
            MockDialer::new(),
        );
        let (handle, _task) = spawn(guardian);
        let s = handle.grant_consent().await.unwrap();
        assert_eq!(s.status(), SafetyStatus::Tracking);
        let s = handle.toggle_privacy().await.unwrap();
        assert!(s.privacy_mode());
        assert_eq!(handle.snapshot().await.unwrap(), s);
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_returned_to_caller() {
        let guardian = Guardian::new(
            GuardianConfig::default(),
            MockLocationProvider::new(),
            MockDialer::new(),
        );
        let (handle, _task) = spawn(guardian);
        assert_eq!(handle.start_walk().await, Err(GuardianError::ConsentRequired));
        assert!(matches!(
            handle.begin_sos().await,
            Err(GuardianError::InvalidTransition { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handles_stops_service() {
        let provider = MockLocationProvider::new();
        let guardian = Guardian::new(GuardianConfig::default(), provider.clone(), MockDialer::new());
        let (handle, task) = spawn(guardian);
        handle.grant_consent().await.unwrap();
        assert!(provider.is_watching());

        drop(handle);
        task.await.unwrap();
        assert!(!provider.is_watching());
        assert_eq!(provider.release_count(), 1);
    }
}
