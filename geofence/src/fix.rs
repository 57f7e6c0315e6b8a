//! Position fixes supplied by the positioning subsystem.
//!
//! The engine keeps only the most recent fix. Positioning code that runs in a
//! different context from the evaluation loop (a receiver callback, say) can
//! hold a [`FixHandle`] and publish into the same slot without touching the
//! engine itself.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::geodesy::Coordinate;

/// A single reported position.
///
/// Range validity of latitude/longitude is the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Fix {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Horizontal accuracy estimate in meters
    pub horizontal_accuracy: f64,
    /// Horizontal dilution of precision (higher is worse)
    pub hdop: f64,
    /// Fix time as reported by the receiver (seconds since the Unix epoch)
    pub timestamp: i64,
}

impl Fix {
    /// Create a fix at a position with perfect quality figures.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            ..Self::default()
        }
    }

    /// Set the HDOP figure.
    pub fn with_hdop(mut self, hdop: f64) -> Self {
        self.hdop = hdop;
        self
    }

    /// Set the horizontal accuracy estimate.
    pub fn with_accuracy(mut self, horizontal_accuracy: f64) -> Self {
        self.horizontal_accuracy = horizontal_accuracy;
        self
    }

    /// Set the receiver timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The position of this fix.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Cloneable handle to the engine's retained fix.
///
/// Every clone refers to the same slot. `set` replaces the whole fix at once,
/// so a tick never observes a half-written position.
#[derive(Debug, Clone, Default)]
pub struct FixHandle {
    slot: Arc<Mutex<Fix>>,
}

impl FixHandle {
    /// Create a handle holding the default fix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the retained fix.
    pub fn set(&self, fix: Fix) {
        *self.slot.lock() = fix;
    }

    /// Copy of the retained fix.
    pub fn get(&self) -> Fix {
        *self.slot.lock()
    }
}
