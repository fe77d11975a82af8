//! Guardian configuration.
//!
//! Defaults match the shipped product: dial `112`, count down from 3 in
//! one-second ticks, fall back to tracking 5 seconds after the call is
//! dispatched. Override the number and partner label via environment
//! variables.

use std::time::Duration;

/// Number dialled when a countdown elapses.
pub const DEFAULT_EMERGENCY_NUMBER: &str = "112";

/// Label shown for the contact who is watching the walk.
pub const DEFAULT_PARTNER_NAME: &str = "Partner";

const DEFAULT_COUNTDOWN_START: u32 = 3;
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_SOS_REVERT_AFTER: Duration = Duration::from_secs(5);

/// Timing and dispatch settings for a guardian session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardianConfig {
    /// Number handed to the emergency dialer.
    pub emergency_number: String,
    /// Value the countdown starts from. Clamped to at least 1.
    pub countdown_start: u32,
    /// Time between countdown ticks.
    pub tick_interval: Duration,
    /// Delay after dispatch before the session drops back to tracking.
    pub sos_revert_after: Duration,
    /// Display name of the watching contact.
    pub partner_name: String,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            emergency_number: DEFAULT_EMERGENCY_NUMBER.to_string(),
            countdown_start: DEFAULT_COUNTDOWN_START,
            tick_interval: DEFAULT_TICK_INTERVAL,
            sos_revert_after: DEFAULT_SOS_REVERT_AFTER,
            partner_name: DEFAULT_PARTNER_NAME.to_string(),
        }
    }
}

impl GuardianConfig {
    /// Defaults, overridden by environment variables where set.
    ///
    /// Variables:
    /// - `LUMINA_EMERGENCY_NUMBER` (default: `112`)
    /// - `LUMINA_PARTNER_NAME` (default: `Partner`)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(number) = non_empty_env("LUMINA_EMERGENCY_NUMBER") {
            config.emergency_number = number;
        }
        if let Some(name) = non_empty_env("LUMINA_PARTNER_NAME") {
            config.partner_name = name;
        }
        config
    }

    /// Clamp values that would stall or panic the timer driver.
    pub(crate) fn normalized(mut self) -> Self {
        self.countdown_start = self.countdown_start.max(1);
        if self.tick_interval.is_zero() {
            self.tick_interval = DEFAULT_TICK_INTERVAL;
        }
        self
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
