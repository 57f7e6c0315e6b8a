//! List the configured zones.

use geofence::{geodesy::enabled_vertex_count, ManualClock, ZoneGeometry, ZoneInfo};

use crate::config::ZoneFile;
use crate::error::CliError;

/// Run the zones command.
pub fn run(zones: &ZoneFile) -> Result<(), CliError> {
    for line in listing(zones)? {
        println!("{}", line);
    }
    Ok(())
}

/// Listing of the zones as the engine holds them.
///
/// The zones are loaded into an engine first, so a file the engine would
/// reject fails here too.
pub fn listing(zones: &ZoneFile) -> Result<Vec<String>, CliError> {
    let geofence = zones.build_engine(ManualClock::new(0))?;
    let registry = geofence.zones();
    if registry.is_empty() {
        return Ok(vec!["No zones configured.".to_string()]);
    }

    let mut lines = vec![format!(
        "Maximum HDOP: {}  polygon vertex limit: {}",
        registry.max_hdop(),
        registry.max_polygon_vertices()
    )];
    lines.extend(registry.iter().map(|(index, zone)| describe(index, zone)));
    Ok(lines)
}

/// One-line description of a zone.
pub fn describe(index: usize, zone: &ZoneInfo) -> String {
    let geometry = match &zone.geometry {
        ZoneGeometry::Circle { center, radius_m } => {
            format!("circle {} r={} m", center, radius_m)
        }
        ZoneGeometry::Polygon { vertices } => format!(
            "polygon {}/{} vertices enabled",
            enabled_vertex_count(vertices),
            vertices.len()
        ),
    };

    let mut events: Vec<&str> = Vec::new();
    if zone.report_inside {
        events.push("inside");
    }
    if zone.report_outside {
        events.push("outside");
    }
    if zone.report_enter {
        events.push("enter");
    }
    if zone.report_exit {
        events.push("exit");
    }
    let events = if events.is_empty() {
        "-".to_string()
    } else {
        events.join(",")
    };

    format!(
        "zone {:<3} {:<8} {}  events={}  verify={}s",
        index,
        if zone.enabled { "enabled" } else { "disabled" },
        geometry,
        events,
        zone.verification_secs
    )
}
