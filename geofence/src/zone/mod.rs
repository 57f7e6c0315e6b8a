//! Zone definitions and the indexed zone registry.
//!
//! Zones are addressed by a stable index fixed at engine creation. They are
//! never removed, only reconfigured. Each zone is paired with exactly one
//! debounce record in the registry's state store.

mod model;
mod registry;

pub use model::{
    PolygonVertex, ZoneError, ZoneGeometry, ZoneInfo, ZoneShape, DEFAULT_MAX_POLYGON_VERTICES,
    MIN_POLYGON_VERTICES,
};
pub use registry::{ZoneRegistry, DEFAULT_MAX_HDOP};
