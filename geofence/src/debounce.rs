//! Per-zone containment debouncing.
//!
//! Raw containment samples are noisy near a zone boundary. Each zone keeps a
//! [`ZoneDebounceState`] that only confirms a containment state once it has
//! been observed continuously for the zone's verification time.
//!
//! # State Machine
//!
//! ```text
//!            raw differs from pending (or first sample)
//!   ┌─────────────────────────────────────────────────────┐
//!   │                                                     ▼
//!   │   pending = raw, pending_since = now        ┌───────────────┐
//!   └──────────────────────────────────────────── │   Dwelling    │
//!                                                 └───────┬───────┘
//!                      raw == pending AND elapsed >= verification
//!                                                         ▼
//!                                                 ┌───────────────┐
//!                                                 │   Confirmed   │ (every tick while stable)
//!                                                 └───────────────┘
//! ```
//!
//! With a verification time of zero every sample is confirmed immediately.

use serde::{Deserialize, Serialize};

/// Containment state of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneState {
    /// No state observed since initialization.
    #[default]
    Unknown,
    /// The fix is inside the zone.
    Inside,
    /// The fix is outside the zone.
    Outside,
}

impl ZoneState {
    /// State corresponding to a raw containment sample.
    pub fn from_outside(outside: bool) -> Self {
        if outside {
            ZoneState::Outside
        } else {
            ZoneState::Inside
        }
    }
}

impl std::fmt::Display for ZoneState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneState::Unknown => write!(f, "unknown"),
            ZoneState::Inside => write!(f, "inside"),
            ZoneState::Outside => write!(f, "outside"),
        }
    }
}

/// Debounce record for a single zone.
///
/// Only the engine mutates this record; callers get read-only views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneDebounceState {
    /// Last confirmed containment state.
    pub(crate) confirmed: ZoneState,
    /// State currently dwelling towards confirmation.
    pub(crate) pending: ZoneState,
    /// Clock reading (milliseconds) when `pending` was last (re)started.
    pub(crate) pending_since: Option<u64>,
}

impl ZoneDebounceState {
    /// A fresh record: nothing confirmed, nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last confirmed containment state.
    pub fn confirmed(&self) -> ZoneState {
        self.confirmed
    }

    /// State currently dwelling towards confirmation.
    pub fn pending(&self) -> ZoneState {
        self.pending
    }

    /// When the pending state started dwelling, if ever.
    pub fn pending_since(&self) -> Option<u64> {
        self.pending_since
    }

    /// Feed one raw containment sample and report whether it is confirmed.
    ///
    /// Any sample that disagrees with the pending state restarts the dwell
    /// timer on the new state. Elapsed time uses wrapping arithmetic so a
    /// clock that wraps around does not stall confirmation.
    ///
    /// # Arguments
    ///
    /// * `outside` - Raw containment sample
    /// * `verification_secs` - Required dwell time (0 confirms immediately)
    /// * `now_ms` - Current monotonic clock reading in milliseconds
    ///
    /// # Returns
    ///
    /// `true` if the sample's state has held for the full verification time.
    pub fn is_event_confirmed(&mut self, outside: bool, verification_secs: u32, now_ms: u64) -> bool {
        let raw = ZoneState::from_outside(outside);
        let stable = self.pending == raw || verification_secs == 0;

        let since = match (self.pending_since, stable) {
            (Some(since), true) => since,
            _ => {
                self.pending = raw;
                self.pending_since = Some(now_ms);
                now_ms
            }
        };

        let required_ms = u64::from(verification_secs) * 1000;
        stable && now_ms.wrapping_sub(since) >= required_ms
    }

    /// Record a confirmed state, returning the previously confirmed one.
    pub(crate) fn confirm(&mut self, state: ZoneState) -> ZoneState {
        std::mem::replace(&mut self.confirmed, state)
    }
}
