//! Emergency dialer side effect.
//!
//! Dispatch is fire-and-forget: the session never learns whether the
//! call connected, and it drops back to tracking on its own timer.

use std::sync::Arc;

use parking_lot::Mutex;

/// Places a call to an emergency number.
pub trait EmergencyDialer: Send {
    fn dial(&self, number: &str);
}

/// Build the `tel:` URI for a number, dropping spaces and dashes.
pub fn tel_uri(number: &str) -> String {
    let digits: String = number
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '*' | '#'))
        .collect();
    format!("tel:{digits}")
}

/// Dialer that hands a `tel:` URI to an opener, the way a browser or
/// OS intent would.
pub struct TelUriDialer<F> {
    open: F,
}

impl<F> TelUriDialer<F>
where
    F: Fn(&str) + Send,
{
    pub fn new(open: F) -> Self {
        Self { open }
    }
}

impl<F> EmergencyDialer for TelUriDialer<F>
where
    F: Fn(&str) + Send,
{
    fn dial(&self, number: &str) {
        let uri = tel_uri(number);
        tracing::warn!(%uri, "dispatching emergency call");
        (self.open)(&uri);
    }
}

impl<F> std::fmt::Debug for TelUriDialer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelUriDialer").finish_non_exhaustive()
    }
}

/// Dialer that records every number it was asked to call.
#[derive(Debug, Clone, Default)]
pub struct MockDialer {
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockDialer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Numbers dialled, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl EmergencyDialer for MockDialer {
    fn dial(&self, number: &str) {
        self.calls.lock().push(number.to_string());
    }
}
