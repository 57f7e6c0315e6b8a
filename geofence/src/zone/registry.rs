//! Fixed-size zone registry and its paired debounce state store.

use crate::debounce::ZoneDebounceState;
use crate::error::{GeofenceError, Result};

use super::model::{ZoneInfo, DEFAULT_MAX_POLYGON_VERTICES};

/// Default maximum HDOP accepted by the quality gate.
pub const DEFAULT_MAX_HDOP: f64 = 7.5;

/// Indexed zone storage.
///
/// Holds `zone_count` zone configurations and the same number of debounce
/// records. Both vectors are created together and never resized, so index `i`
/// always refers to the same zone and the same record.
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<ZoneInfo>,
    states: Vec<ZoneDebounceState>,
    max_hdop: f64,
    max_polygon_vertices: usize,
}

impl ZoneRegistry {
    /// Create a registry of `zone_count` default (disabled) zones.
    pub fn new(zone_count: usize) -> Self {
        Self {
            zones: vec![ZoneInfo::default(); zone_count],
            states: vec![ZoneDebounceState::new(); zone_count],
            max_hdop: DEFAULT_MAX_HDOP,
            max_polygon_vertices: DEFAULT_MAX_POLYGON_VERTICES,
        }
    }

    /// Set the upper bound on stored polygon vertices.
    pub fn with_max_polygon_vertices(mut self, max: usize) -> Self {
        self.max_polygon_vertices = max;
        self
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Returns true if the registry holds no zones.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Upper bound on stored polygon vertices.
    pub fn max_polygon_vertices(&self) -> usize {
        self.max_polygon_vertices
    }

    /// Maximum HDOP accepted by the quality gate.
    pub fn max_hdop(&self) -> f64 {
        self.max_hdop
    }

    /// Set the quality threshold. The sign is discarded.
    pub fn set_max_hdop(&mut self, max_hdop: f64) {
        self.max_hdop = max_hdop.abs();
    }

    /// Zone configuration at `index`.
    pub fn get(&self, index: usize) -> Result<&ZoneInfo> {
        self.zones.get(index).ok_or(GeofenceError::IndexOutOfRange {
            index,
            count: self.zones.len(),
        })
    }

    /// Mutable zone configuration at `index`.
    ///
    /// Edits made through this reference are not validated; a zone left with
    /// a degenerate geometry simply never contains a fix.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut ZoneInfo> {
        let count = self.zones.len();
        self.zones
            .get_mut(index)
            .ok_or(GeofenceError::IndexOutOfRange { index, count })
    }

    /// Replace the zone at `index`.
    ///
    /// Enabled zones are validated first; on rejection the stored zone is left
    /// as it was. Disabled zones are stored as given. The zone's debounce
    /// record is never touched.
    pub fn configure(&mut self, index: usize, zone: ZoneInfo) -> Result<()> {
        let max_vertices = self.max_polygon_vertices;
        let slot = self.get_mut(index)?;

        if zone.enabled {
            zone.validate(max_vertices)
                .map_err(|source| GeofenceError::InvalidConfiguration { index, source })?;
        }

        *slot = zone;
        Ok(())
    }

    /// Debounce record of the zone at `index`.
    pub fn state(&self, index: usize) -> Result<&ZoneDebounceState> {
        self.states.get(index).ok_or(GeofenceError::IndexOutOfRange {
            index,
            count: self.states.len(),
        })
    }

    /// Returns true if at least one zone is enabled.
    pub fn any_enabled(&self) -> bool {
        self.zones.iter().any(|zone| zone.enabled)
    }

    /// Iterate over every zone configuration in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ZoneInfo)> {
        self.zones.iter().enumerate()
    }

    /// Reset every debounce record to its initial state.
    pub(crate) fn reset_states(&mut self) {
        self.states.fill(ZoneDebounceState::new());
    }

    /// Iterate over zones paired with their mutable debounce records.
    pub(crate) fn entries_mut(
        &mut self,
    ) -> impl Iterator<Item = (usize, &ZoneInfo, &mut ZoneDebounceState)> {
        self.zones
            .iter()
            .zip(self.states.iter_mut())
            .enumerate()
            .map(|(index, (zone, state))| (index, zone, state))
    }
}
