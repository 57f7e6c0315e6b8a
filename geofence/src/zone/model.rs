//! Zone configuration types.
//!
//! A zone is a geometry (circle or polygon) plus the flags that decide which
//! events it reports and how long a new containment state must hold before it
//! is confirmed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::GeofenceEventKind;
use crate::geodesy::{enabled_vertex_count, Coordinate};

/// Default upper bound on the number of polygon vertices a zone may hold.
pub const DEFAULT_MAX_POLYGON_VERTICES: usize = 10;

/// Minimum enabled vertices for a polygon to enclose any area.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Reasons a zone configuration is rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ZoneError {
    /// Circular zone radius is zero, negative or not finite.
    #[error("circular zone radius must be positive, got {0}")]
    NonPositiveRadius(f64),

    /// Polygonal zone has fewer than three enabled vertices.
    #[error("polygonal zone needs at least 3 enabled vertices, got {enabled}")]
    TooFewVertices { enabled: usize },

    /// Polygonal zone exceeds the configured vertex limit.
    #[error("polygonal zone has {count} vertices (max: {max})")]
    TooManyVertices { count: usize, max: usize },
}

/// A single polygon vertex.
///
/// Disabled vertices are kept in the zone but skipped by containment tests,
/// letting a caller reshape a polygon without rebuilding it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolygonVertex {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Whether this vertex participates in containment
    pub enabled: bool,
}

impl PolygonVertex {
    /// Create an enabled vertex.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            enabled: true,
        }
    }

    /// Create a disabled vertex.
    pub fn disabled(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            enabled: false,
        }
    }
}

/// Zone shape tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneShape {
    /// Centre point plus radius.
    Circular,
    /// Ordered vertex list.
    Polygonal,
}

impl std::fmt::Display for ZoneShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneShape::Circular => write!(f, "circular"),
            ZoneShape::Polygonal => write!(f, "polygonal"),
        }
    }
}

/// Zone geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneGeometry {
    /// Everything within `radius_m` meters of `center` is inside.
    Circle { center: Coordinate, radius_m: f64 },
    /// Even-odd interior of the enabled vertices is inside.
    Polygon { vertices: Vec<PolygonVertex> },
}

impl Default for ZoneGeometry {
    fn default() -> Self {
        ZoneGeometry::Circle {
            center: Coordinate::default(),
            radius_m: 0.0,
        }
    }
}

impl ZoneGeometry {
    /// The shape tag of this geometry.
    pub fn shape(&self) -> ZoneShape {
        match self {
            ZoneGeometry::Circle { .. } => ZoneShape::Circular,
            ZoneGeometry::Polygon { .. } => ZoneShape::Polygonal,
        }
    }
}

/// Configuration of a single zone.
///
/// The default zone is a disabled zero-radius circle at (0, 0) reporting no
/// events with no verification delay.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoneInfo {
    /// Zone geometry
    pub geometry: ZoneGeometry,
    /// Disabled zones are skipped entirely during evaluation
    pub enabled: bool,
    /// Report `Inside` on every confirmed inside tick
    pub report_inside: bool,
    /// Report `Outside` on every confirmed outside tick
    pub report_outside: bool,
    /// Report `Enter` when the confirmed state flips outside -> inside
    pub report_enter: bool,
    /// Report `Exit` when the confirmed state flips inside -> outside
    pub report_exit: bool,
    /// How long a new containment state must hold before it is confirmed
    pub verification_secs: u32,
}

impl ZoneInfo {
    /// Create an enabled circular zone with no events selected.
    pub fn circular(center: Coordinate, radius_m: f64) -> Self {
        Self {
            geometry: ZoneGeometry::Circle { center, radius_m },
            enabled: true,
            ..Self::default()
        }
    }

    /// Create an enabled polygonal zone with no events selected.
    pub fn polygonal(vertices: Vec<PolygonVertex>) -> Self {
        Self {
            geometry: ZoneGeometry::Polygon { vertices },
            enabled: true,
            ..Self::default()
        }
    }

    /// Set whether the zone is evaluated.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Select the event kinds this zone reports.
    ///
    /// `PoorLocation` is reported for every enabled zone regardless of
    /// selection and is ignored here.
    pub fn reporting(mut self, kinds: &[GeofenceEventKind]) -> Self {
        for kind in kinds {
            match kind {
                GeofenceEventKind::Inside => self.report_inside = true,
                GeofenceEventKind::Outside => self.report_outside = true,
                GeofenceEventKind::Enter => self.report_enter = true,
                GeofenceEventKind::Exit => self.report_exit = true,
                GeofenceEventKind::PoorLocation => {}
            }
        }
        self
    }

    /// Set the dwell time required before a transition is confirmed.
    pub fn with_verification_secs(mut self, secs: u32) -> Self {
        self.verification_secs = secs;
        self
    }

    /// The shape tag of this zone.
    pub fn shape(&self) -> ZoneShape {
        self.geometry.shape()
    }

    /// Mutable access to the polygon vertices, if this is a polygonal zone.
    pub fn vertices_mut(&mut self) -> Option<&mut Vec<PolygonVertex>> {
        match &mut self.geometry {
            ZoneGeometry::Polygon { vertices } => Some(vertices),
            ZoneGeometry::Circle { .. } => None,
        }
    }

    /// Check the geometry for configurations that can never contain a fix.
    ///
    /// # Arguments
    ///
    /// * `max_vertices` - Upper bound on stored polygon vertices
    pub fn validate(&self, max_vertices: usize) -> Result<(), ZoneError> {
        match &self.geometry {
            ZoneGeometry::Circle { radius_m, .. } => {
                // Written so NaN fails the check too
                if !(*radius_m > 0.0 && radius_m.is_finite()) {
                    return Err(ZoneError::NonPositiveRadius(*radius_m));
                }
            }
            ZoneGeometry::Polygon { vertices } => {
                if vertices.len() > max_vertices {
                    return Err(ZoneError::TooManyVertices {
                        count: vertices.len(),
                        max: max_vertices,
                    });
                }
                let enabled = enabled_vertex_count(vertices);
                if enabled < MIN_POLYGON_VERTICES {
                    return Err(ZoneError::TooFewVertices { enabled });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_zone() {
        let zone = ZoneInfo::default();
        assert!(!zone.enabled);
        assert!(!zone.report_inside);
        assert!(!zone.report_outside);
        assert!(!zone.report_enter);
        assert!(!zone.report_exit);
        assert_eq!(zone.verification_secs, 0);
        assert_eq!(zone.shape(), ZoneShape::Circular);
        assert_eq!(
            zone.geometry,
            ZoneGeometry::Circle {
                center: Coordinate::new(0.0, 0.0),
                radius_m: 0.0
            }
        );
    }

    #[test]
    fn test_builder_sets_flags() {
        let zone = ZoneInfo::circular(Coordinate::new(37.76887, -122.48248), 2700.0)
            .reporting(&[GeofenceEventKind::Inside, GeofenceEventKind::Exit])
            .with_verification_secs(3);

        assert!(zone.enabled);
        assert!(zone.report_inside);
        assert!(zone.report_exit);
        assert!(!zone.report_outside);
        assert!(!zone.report_enter);
        assert_eq!(zone.verification_secs, 3);
    }

    #[test]
    fn test_validate_circle_radius() {
        let center = Coordinate::new(0.0, 0.0);
        assert!(ZoneInfo::circular(center, 10.0).validate(10).is_ok());
        assert_eq!(
            ZoneInfo::circular(center, 0.0).validate(10),
            Err(ZoneError::NonPositiveRadius(0.0))
        );
        assert!(ZoneInfo::circular(center, -5.0).validate(10).is_err());
        assert!(ZoneInfo::circular(center, f64::NAN).validate(10).is_err());
        assert!(ZoneInfo::circular(center, f64::INFINITY).validate(10).is_err());
    }

    #[test]
    fn test_validate_polygon_enabled_vertex_count() {
        let mut zone = ZoneInfo::polygonal(vec![
            PolygonVertex::new(0.0, 0.0),
            PolygonVertex::new(1.0, 0.0),
            PolygonVertex::new(1.0, 1.0),
        ]);
        assert!(zone.validate(10).is_ok());

        if let Some(vertices) = zone.vertices_mut() {
            vertices[1].enabled = false;
        }
        assert_eq!(
            zone.validate(10),
            Err(ZoneError::TooFewVertices { enabled: 2 })
        );
    }

    #[test]
    fn test_validate_polygon_vertex_limit() {
        let vertices = (0..12)
            .map(|i| PolygonVertex::new(i as f64, (i * i) as f64))
            .collect();
        let zone = ZoneInfo::polygonal(vertices);
        assert_eq!(
            zone.validate(DEFAULT_MAX_POLYGON_VERTICES),
            Err(ZoneError::TooManyVertices { count: 12, max: 10 })
        );
        assert!(zone.validate(12).is_ok());
    }

    #[test]
    fn test_vertices_mut_on_circle_is_none() {
        let mut zone = ZoneInfo::circular(Coordinate::new(0.0, 0.0), 1.0);
        assert!(zone.vertices_mut().is_none());
    }

    #[test]
    fn test_zone_error_display() {
        let err = ZoneError::TooManyVertices { count: 12, max: 10 };
        assert_eq!(err.to_string(), "polygonal zone has 12 vertices (max: 10)");
    }

    #[test]
    fn test_zone_serializes_with_snake_case_geometry() {
        let zone = ZoneInfo::circular(Coordinate::new(1.0, 2.0), 50.0);
        let json = serde_json::to_string(&zone).unwrap();
        assert!(json.contains("\"circle\""), "got {}", json);
        let back: ZoneInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, zone);
    }
}
