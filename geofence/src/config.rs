//! Engine configuration.
//!
//! `GeofenceConfig` fixes the size of the zone registry and the engine-wide
//! limits at creation time. Individual zones are configured afterwards through
//! [`Geofence::configure`](crate::Geofence::configure).

use serde::{Deserialize, Serialize};

use crate::zone::{DEFAULT_MAX_HDOP, DEFAULT_MAX_POLYGON_VERTICES};

/// Configuration for a [`Geofence`](crate::Geofence) engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeofenceConfig {
    /// Number of zone slots. Fixed for the life of the engine.
    pub zone_count: usize,

    /// Fixes with an HDOP above this value are reported as poor location
    /// and not evaluated.
    pub max_hdop: f64,

    /// Upper bound on the number of vertices a polygonal zone may store.
    pub max_polygon_vertices: usize,
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            zone_count: 0,
            max_hdop: DEFAULT_MAX_HDOP,
            max_polygon_vertices: DEFAULT_MAX_POLYGON_VERTICES,
        }
    }
}

impl GeofenceConfig {
    /// Create a configuration with `zone_count` slots and default limits.
    pub fn new(zone_count: usize) -> Self {
        Self {
            zone_count,
            ..Self::default()
        }
    }

    /// Set the quality threshold. The sign is discarded.
    pub fn with_max_hdop(mut self, max_hdop: f64) -> Self {
        self.max_hdop = max_hdop.abs();
        self
    }

    /// Set the polygon vertex limit.
    pub fn with_max_polygon_vertices(mut self, max: usize) -> Self {
        self.max_polygon_vertices = max;
        self
    }
}
