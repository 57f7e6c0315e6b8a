//! Zone file loading.
//!
//! Zones are described in an INI file:
//!
//! ```ini
//! [geofence]
//! max_hdop = 5.0
//!
//! [zone.0]
//! shape = circular
//! center = 37.76887,-122.48248
//! radius = 2700
//! events = inside,enter,exit
//! verification_secs = 3
//!
//! [zone.1]
//! shape = polygonal
//! enabled = false
//! vertices = 37.77,-122.51; 37.76,-122.51; !37.765,-122.48; 37.77,-122.45
//! ```
//!
//! A vertex prefixed with `!` is stored disabled. The registry holds one slot
//! per index up to the highest `zone.N` section; indices without a section
//! stay disabled. Each section may appear once, and zone indices stop at
//! [`MAX_ZONE_INDEX`].

use std::path::{Path, PathBuf};

use geofence::{
    Clock, Coordinate, Geofence, GeofenceConfig, GeofenceEventKind, PolygonVertex, ZoneGeometry,
    ZoneInfo,
};
use ini::{Ini, Properties};

use crate::error::CliError;

/// Directory under the platform config dir holding the zone file.
pub const CONFIG_DIR_NAME: &str = "geofence";

/// Zone file name.
pub const ZONE_FILE_NAME: &str = "zones.ini";

/// Highest accepted `[zone.N]` index.
pub const MAX_ZONE_INDEX: usize = 255;

const ENGINE_SECTION: &str = "geofence";
const ZONE_SECTION_PREFIX: &str = "zone.";

/// Default zone file location (`<config dir>/geofence/zones.ini`).
pub fn default_zone_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(ZONE_FILE_NAME))
}

/// Parsed zone file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneFile {
    /// Quality threshold override
    pub max_hdop: Option<f64>,
    /// Polygon vertex limit override
    pub max_polygon_vertices: Option<usize>,
    /// Zones by index
    pub zones: Vec<ZoneInfo>,
}

impl ZoneFile {
    /// Load the zone file for this invocation.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used if present and an empty zone set otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        match default_zone_file_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            Some(path) => {
                tracing::debug!(path = %path.display(), "No zone file, starting with no zones");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Load and parse a zone file from disk.
    pub fn load_from_file(path: &Path) -> Result<Self, CliError> {
        let ini = Ini::load_from_file(path).map_err(|source| CliError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        let file = Self::from_ini(&ini)?;
        tracing::info!(path = %path.display(), zones = file.zones.len(), "Loaded zone file");
        Ok(file)
    }

    /// Parse zone file contents.
    pub fn load_from_str(contents: &str) -> Result<Self, CliError> {
        let ini = Ini::load_from_str(contents).map_err(|e| CliError::Config(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, CliError> {
        let mut file = ZoneFile::default();
        let mut sections: Vec<(usize, &Properties)> = Vec::new();
        let mut engine_section_seen = false;

        for (name, properties) in ini.iter() {
            match name {
                None if properties.is_empty() => {}
                None => {
                    return Err(CliError::Config(
                        "keys must appear inside a [geofence] or [zone.N] section".to_string(),
                    ))
                }
                Some(ENGINE_SECTION) => {
                    if engine_section_seen {
                        return Err(duplicate_section(ENGINE_SECTION));
                    }
                    engine_section_seen = true;
                    file.apply_engine_section(properties)?;
                }
                Some(section) => {
                    let index = section
                        .strip_prefix(ZONE_SECTION_PREFIX)
                        .and_then(|n| n.trim().parse::<usize>().ok())
                        .ok_or_else(|| {
                            CliError::Config(format!("unknown section [{}]", section))
                        })?;
                    if index > MAX_ZONE_INDEX {
                        return Err(CliError::Config(format!(
                            "[{}] zone index exceeds the maximum of {}",
                            section, MAX_ZONE_INDEX
                        )));
                    }
                    if sections.iter().any(|(seen, _)| *seen == index) {
                        return Err(duplicate_section(section));
                    }
                    sections.push((index, properties));
                }
            }
        }

        let zone_count = sections.iter().map(|(i, _)| i + 1).max().unwrap_or(0);
        file.zones = vec![ZoneInfo::default(); zone_count];
        for (index, properties) in sections {
            file.zones[index] = parse_zone(index, properties)?;
        }

        Ok(file)
    }

    fn apply_engine_section(&mut self, properties: &Properties) -> Result<(), CliError> {
        for (key, value) in properties.iter() {
            match key {
                "max_hdop" => self.max_hdop = Some(parse_number(ENGINE_SECTION, key, value)?),
                "max_polygon_vertices" => {
                    self.max_polygon_vertices = Some(parse_number(ENGINE_SECTION, key, value)?)
                }
                _ => return Err(unknown_key(ENGINE_SECTION, key)),
            }
        }
        Ok(())
    }

    /// Engine configuration sized for this file.
    pub fn engine_config(&self) -> GeofenceConfig {
        let mut config = GeofenceConfig::new(self.zones.len());
        if let Some(max_hdop) = self.max_hdop {
            config = config.with_max_hdop(max_hdop);
        }
        if let Some(max) = self.max_polygon_vertices {
            config = config.with_max_polygon_vertices(max);
        }
        config
    }

    /// Build an engine with every zone from this file configured.
    pub fn build_engine<C: Clock>(&self, clock: C) -> Result<Geofence<C>, CliError> {
        let mut geofence = Geofence::with_clock(self.engine_config(), clock);
        for (index, zone) in self.zones.iter().enumerate() {
            geofence.configure(index, zone.clone())?;
        }
        Ok(geofence)
    }

    /// Longest verification time of any enabled zone, in milliseconds.
    pub fn max_verification_ms(&self) -> u64 {
        self.zones
            .iter()
            .filter(|zone| zone.enabled)
            .map(|zone| u64::from(zone.verification_secs) * 1000)
            .max()
            .unwrap_or(0)
    }
}

fn parse_zone(index: usize, properties: &Properties) -> Result<ZoneInfo, CliError> {
    let section = format!("{}{}", ZONE_SECTION_PREFIX, index);
    let mut shape: Option<String> = None;
    let mut center: Option<Coordinate> = None;
    let mut radius: Option<f64> = None;
    let mut vertices: Option<Vec<PolygonVertex>> = None;
    let mut zone = ZoneInfo {
        enabled: true,
        ..ZoneInfo::default()
    };

    for (key, value) in properties.iter() {
        match key {
            "shape" => shape = Some(value.trim().to_ascii_lowercase()),
            "enabled" => zone.enabled = parse_bool(&section, key, value)?,
            "center" => center = Some(parse_coordinate(&section, key, value)?),
            "radius" => radius = Some(parse_number(&section, key, value)?),
            "vertices" => vertices = Some(parse_vertices(&section, key, value)?),
            "events" => {
                let kinds = parse_events(&section, key, value)?;
                zone = zone.reporting(&kinds);
            }
            "verification_secs" => zone.verification_secs = parse_number(&section, key, value)?,
            _ => return Err(unknown_key(&section, key)),
        }
    }

    zone.geometry = match shape.as_deref().unwrap_or("circular") {
        "circular" | "circle" => ZoneGeometry::Circle {
            center: center.ok_or_else(|| missing_key(&section, "center"))?,
            radius_m: radius.ok_or_else(|| missing_key(&section, "radius"))?,
        },
        "polygonal" | "polygon" => ZoneGeometry::Polygon {
            vertices: vertices.ok_or_else(|| missing_key(&section, "vertices"))?,
        },
        other => {
            return Err(CliError::Config(format!(
                "[{}] shape: expected circular or polygonal, got '{}'",
                section, other
            )))
        }
    };

    Ok(zone)
}

fn parse_number<T: std::str::FromStr>(
    section: &str,
    key: &str,
    value: &str,
) -> Result<T, CliError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid_value(section, key, value, "a number"))
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, CliError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid_value(section, key, value, "true or false")),
    }
}

fn parse_coordinate(section: &str, key: &str, value: &str) -> Result<Coordinate, CliError> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| invalid_value(section, key, value, "'latitude,longitude'"))?;
    Ok(Coordinate::new(
        parse_number(section, key, lat)?,
        parse_number(section, key, lon)?,
    ))
}

fn parse_vertices(
    section: &str,
    key: &str,
    value: &str,
) -> Result<Vec<PolygonVertex>, CliError> {
    value
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (enabled, point) = match entry.strip_prefix('!') {
                Some(rest) => (false, rest),
                None => (true, entry),
            };
            let coordinate = parse_coordinate(section, key, point)?;
            Ok(PolygonVertex {
                latitude: coordinate.latitude,
                longitude: coordinate.longitude,
                enabled,
            })
        })
        .collect()
}

fn parse_events(
    section: &str,
    key: &str,
    value: &str,
) -> Result<Vec<GeofenceEventKind>, CliError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| match name.parse::<GeofenceEventKind>() {
            Ok(GeofenceEventKind::PoorLocation) | Err(_) => Err(invalid_value(
                section,
                key,
                name,
                "inside, outside, enter or exit",
            )),
            Ok(kind) => Ok(kind),
        })
        .collect()
}

fn invalid_value(section: &str, key: &str, value: &str, expected: &str) -> CliError {
    CliError::Config(format!(
        "[{}] {}: expected {}, got '{}'",
        section,
        key,
        expected,
        value.trim()
    ))
}

fn missing_key(section: &str, key: &str) -> CliError {
    CliError::Config(format!("[{}] missing required key '{}'", section, key))
}

fn unknown_key(section: &str, key: &str) -> CliError {
    CliError::Config(format!("[{}] unknown key '{}'", section, key))
}

fn duplicate_section(section: &str) -> CliError {
    CliError::Config(format!("[{}] section appears more than once", section))
}
