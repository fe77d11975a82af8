//! # Guardian Subcommand
//!
//! `lumina guardian simulate` runs one walk against an in-process location
//! feed: consent, a few fixes, an SOS press, and then either a cancel after
//! N ticks or the full escalation and auto-revert. The emergency call is
//! printed as a `tel:` URI instead of being placed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use parking_lot::Mutex;
use tokio::sync::watch;

use lumina_guardian::{
    spawn, Guardian, GuardianConfig, MockLocationProvider, Position, SafetyStatus, Session,
    TelUriDialer,
};

/// Start of the simulated route.
const ROUTE_ORIGIN: (f64, f64) = (52.520_008, 13.404_954);
/// Roughly ten metres of latitude per fix.
const ROUTE_STEP_DEG: f64 = 0.000_09;

/// Arguments for the `lumina guardian` subcommand.
#[derive(Args, Debug)]
pub struct GuardianArgs {
    #[command(subcommand)]
    pub command: GuardianCommand,
}

#[derive(Subcommand, Debug)]
pub enum GuardianCommand {
    /// Simulate a walk and an SOS press.
    Simulate {
        /// Release the SOS control after this many ticks. Omit to let the
        /// countdown reach zero.
        #[arg(long)]
        cancel_after_ticks: Option<u32>,
        /// Location fixes to feed before pressing SOS.
        #[arg(long, default_value_t = 3)]
        fixes: u32,
        /// Countdown tick length in milliseconds. The auto-revert waits five ticks.
        #[arg(long, default_value_t = 1000)]
        tick_ms: u64,
        /// Number to dial instead of the configured emergency number.
        #[arg(long)]
        emergency_number: Option<String>,
    },
}

/// Inputs for [`simulate`].
#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub cancel_after_ticks: Option<u32>,
    pub fixes: u32,
    pub tick: Duration,
    pub emergency_number: Option<String>,
}

/// What happened during a simulated walk.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Every distinct status the session passed through, in order.
    pub statuses: Vec<SafetyStatus>,
    /// `tel:` URIs handed to the dialer.
    pub dialed: Vec<String>,
    /// Session just before the walk ended.
    pub before_end: Session,
    /// Session after the walk ended.
    pub after_end: Session,
}

pub async fn run_guardian(args: &GuardianArgs) -> Result<u8> {
    match &args.command {
        GuardianCommand::Simulate {
            cancel_after_ticks,
            fixes,
            tick_ms,
            emergency_number,
        } => {
            let report = simulate(SimulateOptions {
                cancel_after_ticks: *cancel_after_ticks,
                fixes: *fixes,
                tick: Duration::from_millis((*tick_ms).max(1)),
                emergency_number: emergency_number.clone(),
            })
            .await?;
            print_report(&report);
            Ok(0)
        }
    }
}

/// Fix number `i` along a straight walk north from the route origin.
pub fn simulated_fix(i: u32) -> Position {
    Position::new(
        ROUTE_ORIGIN.0 + f64::from(i) * ROUTE_STEP_DEG,
        ROUTE_ORIGIN.1,
        5.0 + f64::from(i % 3),
    )
}

/// Run one walk end to end.
pub async fn simulate(opts: SimulateOptions) -> Result<SimulationReport> {
    let mut config = GuardianConfig::from_env();
    if let Some(number) = opts.emergency_number {
        config.emergency_number = number;
    }
    config.tick_interval = opts.tick;
    config.sos_revert_after = opts.tick * 5;
    let countdown_start = config.countdown_start.max(1);
    let partner = config.partner_name.clone();

    let dialed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&dialed);
    let dialer = TelUriDialer::new(move |uri: &str| {
        println!("  >> opening {uri}");
        sink.lock().push(uri.to_string());
    });
    let provider = MockLocationProvider::new();
    let (handle, task) = spawn(Guardian::new(config, provider.clone(), dialer));
    let recorder = tokio::spawn(record_statuses(handle.updates(), partner));
    let mut updates = handle.updates();

    handle.grant_consent().await.context("starting the walk")?;
    for i in 0..opts.fixes {
        provider.push_fix(simulated_fix(i));
        tokio::time::sleep(opts.tick / 10).await;
    }

    handle.begin_sos().await.context("pressing SOS")?;
    match opts.cancel_after_ticks {
        Some(ticks) if ticks < countdown_start => {
            let target = countdown_start - ticks;
            updates
                .wait_for(|s| {
                    s.status() != SafetyStatus::SosCountdown || s.countdown_remaining() <= target
                })
                .await
                .context("guardian service stopped")?;
            handle.cancel_sos().await.context("releasing SOS")?;
        }
        _ => {
            updates
                .wait_for(|s| s.status() == SafetyStatus::SosActive)
                .await
                .context("guardian service stopped")?;
            updates
                .wait_for(|s| s.status() == SafetyStatus::Tracking)
                .await
                .context("guardian service stopped")?;
        }
    }

    let before_end = handle.snapshot().await?;
    let after_end = handle.end_walk().await?;
    drop(updates);
    drop(handle);
    task.await.context("guardian task panicked")?;
    let statuses = recorder.await.context("status recorder panicked")?;

    let dialed = dialed.lock().clone();
    Ok(SimulationReport {
        statuses,
        dialed,
        before_end,
        after_end,
    })
}

async fn record_statuses(mut updates: watch::Receiver<Session>, partner: String) -> Vec<SafetyStatus> {
    let mut seen = vec![updates.borrow_and_update().status()];
    while updates.changed().await.is_ok() {
        let session = updates.borrow_and_update().clone();
        match session.status() {
            SafetyStatus::SosCountdown => {
                println!("  SOS in {}...", session.countdown_remaining());
            }
            SafetyStatus::Tracking => {
                if let Some(fix) = session.last_known_location() {
                    println!(
                        "  {partner} sees you at {:.5}, {:.5} (±{:.0} m)",
                        fix.latitude, fix.longitude, fix.accuracy_m
                    );
                }
            }
            _ => {}
        }
        if seen.last() != Some(&session.status()) {
            println!("[{}]", session.status());
            seen.push(session.status());
        }
    }
    seen
}

fn print_report(report: &SimulationReport) {
    let path: Vec<String> = report.statuses.iter().map(ToString::to_string).collect();
    println!();
    println!("path:   {}", path.join(" -> "));
    if report.dialed.is_empty() {
        println!("dialed: nothing");
    } else {
        println!("dialed: {}", report.dialed.join(", "));
    }
    println!("ended:  {}", report.after_end.status());
}
