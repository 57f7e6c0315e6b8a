//! Geofence - zone evaluation and event debounce engine
//!
//! This library decides whether a moving position fix is inside or outside a
//! set of configured zones (circles and polygons, including polygons that
//! cross the antimeridian) and turns the noisy raw containment samples into
//! debounced, quality-gated events delivered to registered observers.
//!
//! # Overview
//!
//! ```text
//! positioning ──set_fix──► Geofence ──tick──► zones ──► debounce ──► observers
//! ```
//!
//! - [`geodesy`] - great-circle distance and point-in-polygon
//! - [`zone`] - zone definitions and the indexed registry
//! - [`debounce`] - per-zone verification state machine
//! - [`engine`] - the [`Geofence`] engine and its tick loop
//! - [`observer`] - event observers and ordered, failure-isolated fan-out
//!
//! The library emits `tracing` events and never installs a subscriber.

pub mod clock;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod event;
pub mod fix;
pub mod geodesy;
pub mod observer;
pub mod zone;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::GeofenceConfig;
pub use debounce::{ZoneDebounceState, ZoneState};
pub use engine::{Geofence, TickSummary};
pub use error::{GeofenceError, Result};
pub use event::{GeofenceEvent, GeofenceEventKind};
pub use fix::{Fix, FixHandle};
pub use geodesy::{distance_meters, point_in_polygon, Coordinate};
pub use observer::{
    DispatchReport, GeofenceObserver, LoggingObserver, ObserverResult, RecordingObserver,
    SharedGeofenceObserver, SubscriptionId,
};
pub use zone::{PolygonVertex, ZoneError, ZoneGeometry, ZoneInfo, ZoneShape};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
