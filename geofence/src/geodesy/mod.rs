//! Geodesy module
//!
//! Pure functions for the two containment tests the engine needs: great-circle
//! distance between two coordinates (for circular zones) and even-odd
//! point-in-polygon containment (for polygonal zones).
//!
//! Polygon containment works in plain latitude/longitude space. Polygons that
//! straddle the antimeridian are handled by shifting negative longitudes by
//! 360° before the ray cast. Polygons enclosing a geographic pole are not
//! supported.

use serde::{Deserialize, Serialize};

use crate::zone::PolygonVertex;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Longitude span (degrees) above which a polygon is assumed to cross the
/// antimeridian.
pub const DATELINE_SPAN_DEG: f64 = 180.0;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90.0 to 90.0)
    pub latitude: f64,
    /// Longitude in degrees (-180.0 to 180.0)
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Great-circle distance between two coordinates in meters (haversine).
///
/// # Arguments
///
/// * `from` - Start coordinate
/// * `to` - End coordinate
///
/// # Returns
///
/// Distance in meters. Non-finite input yields a non-finite result.
#[inline]
pub fn distance_meters(from: Coordinate, to: Coordinate) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();
    let from_lat = from.latitude.to_radians();
    let to_lat = to.latitude.to_radians();

    let half_lat = (d_lat * 0.5).sin();
    let half_lon = (d_lon * 0.5).sin();
    let h = half_lat * half_lat + half_lon * half_lon * from_lat.cos() * to_lat.cos();

    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt()) * 1000.0
}

/// Number of vertices that participate in containment.
pub fn enabled_vertex_count(vertices: &[PolygonVertex]) -> usize {
    vertices.iter().filter(|v| v.enabled).count()
}

/// Longitude offset to apply to negative longitudes of a polygon.
///
/// Returns `360.0` when the enabled vertices span more than 180° of
/// longitude (the polygon crosses the antimeridian), otherwise `0.0`.
/// Disabled vertices never influence the result.
pub fn dateline_offset(vertices: &[PolygonVertex]) -> f64 {
    let mut enabled = vertices.iter().filter(|v| v.enabled);
    let Some(first) = enabled.next() else {
        return 0.0;
    };

    let (min, max) = enabled.fold((first.longitude, first.longitude), |(min, max), v| {
        (min.min(v.longitude), max.max(v.longitude))
    });

    if (max - min).abs() > DATELINE_SPAN_DEG {
        360.0
    } else {
        0.0
    }
}

/// Even-odd ray-casting containment test over the enabled vertices.
///
/// Edges run between consecutive enabled vertices, closing from the last back
/// to the first. An edge counts as a crossing when the query latitude lies
/// between its endpoint latitudes (exactly one endpoint at or above the query
/// latitude) and the query longitude is east of the edge at that latitude.
///
/// A polygon with no enabled vertices contains nothing.
pub fn point_in_polygon(vertices: &[PolygonVertex], point: Coordinate) -> bool {
    let offset = dateline_offset(vertices);
    let shift = |lon: f64| if lon < 0.0 { lon + offset } else { lon };

    let enabled: Vec<Coordinate> = vertices
        .iter()
        .filter(|v| v.enabled)
        .map(|v| Coordinate::new(v.latitude, shift(v.longitude)))
        .collect();

    let Some(&last) = enabled.last() else {
        return false;
    };

    let lat = point.latitude;
    let lon = shift(point.longitude);

    let mut odd = false;
    let mut prev = last;
    for &curr in &enabled {
        let straddles = (curr.latitude < lat && prev.latitude >= lat)
            || (prev.latitude < lat && curr.latitude >= lat);

        if straddles {
            let edge_lon = prev.longitude
                + (curr.longitude - prev.longitude) * (lat - prev.latitude)
                    / (curr.latitude - prev.latitude);
            if lon > edge_lon {
                odd = !odd;
            }
        }
        prev = curr;
    }

    odd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(points: &[(f64, f64)]) -> Vec<PolygonVertex> {
        points
            .iter()
            .map(|&(lat, lon)| PolygonVertex::new(lat, lon))
            .collect()
    }

    fn golden_gate_park() -> Vec<PolygonVertex> {
        polygon(&[
            (37.771531, -122.511040),
            (37.764150, -122.510452),
            (37.766465, -122.453018),
            (37.774911, -122.454279),
        ])
    }

    fn dateline_quad() -> Vec<PolygonVertex> {
        polygon(&[
            (7.870459, 175.459385),
            (4.504215, 175.459385),
            (4.790698, -176.611013),
            (10.058798, -176.248620),
        ])
    }

    #[test]
    fn test_distance_zero_for_same_point() {
        let p = Coordinate::new(37.76887, -122.48248);
        assert_eq!(distance_meters(p, p), 0.0);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        // One degree of latitude is ~111.19 km on a 6371 km sphere
        let d = distance_meters(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 111_194.9).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_distance_golden_gate_picnic_area() {
        let center = Coordinate::new(37.76887, -122.48248);
        let elk_glen = Coordinate::new(37.76705, -122.48593);
        let d = distance_meters(center, elk_glen);
        assert!(d > 300.0 && d < 450.0, "Elk Glen should be ~0.36 km away, got {}", d);
    }

    #[test]
    fn test_distance_across_antimeridian_is_short() {
        let west = Coordinate::new(0.0, 179.9);
        let east = Coordinate::new(0.0, -179.9);
        let d = distance_meters(west, east);
        assert!(d < 23_000.0, "0.2° at the equator should be ~22 km, got {}", d);
    }

    #[test]
    fn test_point_inside_golden_gate_park() {
        assert!(point_in_polygon(
            &golden_gate_park(),
            Coordinate::new(37.76705, -122.48593)
        ));
    }

    #[test]
    fn test_points_outside_golden_gate_park() {
        let park = golden_gate_park();
        for (lat, lon) in [
            (37.68821, -122.47201), // Daly City
            (37.74316, -122.47725), // Taraval
            (37.76298, -122.45638), // UCSF
        ] {
            assert!(
                !point_in_polygon(&park, Coordinate::new(lat, lon)),
                "({}, {}) should be outside",
                lat,
                lon
            );
        }
    }

    #[test]
    fn test_dateline_offset_detection() {
        assert_eq!(dateline_offset(&dateline_quad()), 360.0);
        assert_eq!(dateline_offset(&golden_gate_park()), 0.0);
        assert_eq!(dateline_offset(&[]), 0.0);
    }

    #[test]
    fn test_dateline_offset_ignores_disabled_vertices() {
        let mut park = golden_gate_park();
        park.push(PolygonVertex::disabled(37.77, 170.0));
        assert_eq!(dateline_offset(&park), 0.0);
    }

    #[test]
    fn test_point_just_east_of_dateline_is_inside() {
        assert!(point_in_polygon(
            &dateline_quad(),
            Coordinate::new(6.721186, -179.28955)
        ));
    }

    #[test]
    fn test_point_west_of_dateline_polygon_is_outside() {
        assert!(!point_in_polygon(
            &dateline_quad(),
            Coordinate::new(6.7, 170.0)
        ));
    }

    #[test]
    fn test_southern_hemisphere_polygon() {
        let manaus = polygon(&[
            (-2.992267, -60.130649),
            (-3.152658, -60.124700),
            (-3.155628, -59.919461),
            (-3.027912, -59.901614),
        ]);
        assert!(point_in_polygon(&manaus, Coordinate::new(-3.072765, -59.99389)));
    }

    #[test]
    fn test_equator_crossing_polygon() {
        let amazon = polygon(&[
            (0.287359, -65.374218),
            (-0.762855, -65.382897),
            (-0.635478, -64.320909),
            (0.265387, -64.307176),
        ]);
        assert!(point_in_polygon(&amazon, Coordinate::new(-0.440480, -64.598314)));
    }

    #[test]
    fn test_disabled_vertex_reshapes_polygon() {
        let mut twin_peaks = polygon(&[
            (37.74911, -122.45690),
            (37.75149, -122.44779),
            (37.75494, -122.44662),
            (37.75524, -122.45275),
        ]);
        let mailbox = Coordinate::new(37.75402, -122.44960);
        assert!(point_in_polygon(&twin_peaks, mailbox));

        twin_peaks[2].enabled = false;
        assert_eq!(enabled_vertex_count(&twin_peaks), 3);
        assert!(!point_in_polygon(&twin_peaks, mailbox));
    }

    #[test]
    fn test_no_enabled_vertices_is_outside() {
        assert!(!point_in_polygon(&[], Coordinate::new(0.0, 0.0)));

        let all_disabled = vec![
            PolygonVertex::disabled(1.0, 1.0),
            PolygonVertex::disabled(-1.0, 1.0),
            PolygonVertex::disabled(-1.0, -1.0),
        ];
        assert!(!point_in_polygon(&all_disabled, Coordinate::new(0.0, 0.0)));
    }

    #[test]
    fn test_nan_point_is_outside() {
        let park = golden_gate_park();
        assert!(!point_in_polygon(&park, Coordinate::new(f64::NAN, -122.48)));
        assert!(!point_in_polygon(&park, Coordinate::new(37.767, f64::NAN)));
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_distance_symmetric_and_non_negative(
                lat1 in -90.0..90.0_f64,
                lon1 in -180.0..180.0_f64,
                lat2 in -90.0..90.0_f64,
                lon2 in -180.0..180.0_f64
            ) {
                let a = Coordinate::new(lat1, lon1);
                let b = Coordinate::new(lat2, lon2);
                let ab = distance_meters(a, b);
                let ba = distance_meters(b, a);

                prop_assert!(ab >= 0.0);
                prop_assert!((ab - ba).abs() < 1e-6, "asymmetric: {} vs {}", ab, ba);
                // Never more than half the circumference
                prop_assert!(ab <= std::f64::consts::PI * EARTH_RADIUS_KM * 1000.0 + 1.0);
            }

            #[test]
            fn test_dateline_square_matches_shifted_square(
                lat in -4.5..4.5_f64,
                east_of_seam in 0.01..4.99_f64
            ) {
                // A 10°×10° square centred on the antimeridian, and the same
                // square shifted to be centred on 0° longitude.
                let straddling = polygon(&[
                    (5.0, 175.0), (-5.0, 175.0), (-5.0, -175.0), (5.0, -175.0),
                ]);
                let shifted = polygon(&[
                    (5.0, -5.0), (-5.0, -5.0), (-5.0, 5.0), (5.0, 5.0),
                ]);

                let seam_point = Coordinate::new(lat, -180.0 + east_of_seam);
                let shifted_point = Coordinate::new(lat, east_of_seam);

                prop_assert_eq!(
                    point_in_polygon(&straddling, seam_point),
                    point_in_polygon(&shifted, shifted_point)
                );
                prop_assert!(point_in_polygon(&straddling, seam_point));
            }

            #[test]
            fn test_points_beyond_polygon_latitudes_are_outside(
                lat in 38.0..89.0_f64,
                lon in -180.0..180.0_f64
            ) {
                prop_assert!(!point_in_polygon(&golden_gate_park(), Coordinate::new(lat, lon)));
            }
        }
    }
}
