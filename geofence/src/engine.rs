//! The geofence evaluation engine.
//!
//! [`Geofence`] owns the zone registry, the observer list, the retained fix
//! and a clock. Each call to [`Geofence::tick`] evaluates every enabled zone
//! against the retained fix and delivers the resulting events.
//!
//! # Tick Pipeline
//!
//! ```text
//! for each enabled zone, in index order:
//!
//!   hdop > max_hdop ──yes──► PoorLocation (debounce untouched)
//!         │ no
//!         ▼
//!   raw containment (circle distance / polygon ray cast)
//!         │
//!         ▼
//!   debounce ──not confirmed──► nothing
//!         │ confirmed
//!         ▼
//!   Outside / Inside   (level, every confirmed tick)
//!   Exit / Enter       (edge, confirmed state flipped)
//! ```
//!
//! Events for a zone are delivered to every observer before the next zone is
//! evaluated.
//!
//! # Concurrency
//!
//! `tick` takes `&mut self`; callers serialize ticks. Fixes may be published
//! from another thread through a [`FixHandle`] obtained from
//! [`Geofence::fix_handle`].

use crate::clock::{Clock, MonotonicClock};
use crate::config::GeofenceConfig;
use crate::debounce::{ZoneDebounceState, ZoneState};
use crate::error::Result;
use crate::event::{GeofenceEvent, GeofenceEventKind};
use crate::fix::{Fix, FixHandle};
use crate::geodesy::{distance_meters, point_in_polygon, Coordinate};
use crate::observer::{
    DispatchReport, GeofenceObserver, ObserverList, SharedGeofenceObserver, SubscriptionId,
};
use crate::zone::{ZoneGeometry, ZoneInfo, ZoneRegistry};

/// Counters describing one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Enabled zones visited (including gated ones).
    pub zones_evaluated: usize,
    /// Zones skipped by the quality gate.
    pub poor_location: usize,
    /// Events produced, each counted once regardless of observer count.
    pub events_emitted: usize,
    /// Observer deliveries that returned an error or panicked.
    pub listener_failures: usize,
}

impl TickSummary {
    fn record(&mut self, report: DispatchReport) {
        self.events_emitted += 1;
        self.listener_failures += report.failed;
    }
}

impl std::fmt::Display for TickSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} zones, {} events ({} poor location, {} listener failures)",
            self.zones_evaluated, self.events_emitted, self.poor_location, self.listener_failures
        )
    }
}

/// Zone evaluation and event debounce engine.
///
/// # Example
///
/// ```ignore
/// use geofence::{Coordinate, Fix, Geofence, GeofenceConfig, GeofenceEventKind, ZoneInfo};
///
/// let mut geofence = Geofence::new(GeofenceConfig::new(1));
/// geofence.configure(
///     0,
///     ZoneInfo::circular(Coordinate::new(37.76887, -122.48248), 2700.0)
///         .reporting(&[GeofenceEventKind::Inside]),
/// )?;
/// geofence.subscribe(geofence::LoggingObserver);
///
/// geofence.set_fix(Fix::new(37.76705, -122.48593).with_hdop(1.0));
/// let summary = geofence.tick();
/// assert_eq!(summary.events_emitted, 1);
/// ```
#[derive(Debug)]
pub struct Geofence<C: Clock = MonotonicClock> {
    registry: ZoneRegistry,
    observers: ObserverList,
    fix: FixHandle,
    clock: C,
}

impl Geofence {
    /// Create an engine driven by the process monotonic clock.
    pub fn new(config: GeofenceConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> Geofence<C> {
    /// Create an engine driven by the given clock.
    pub fn with_clock(config: GeofenceConfig, clock: C) -> Self {
        let mut registry = ZoneRegistry::new(config.zone_count)
            .with_max_polygon_vertices(config.max_polygon_vertices);
        registry.set_max_hdop(config.max_hdop);

        Self {
            registry,
            observers: ObserverList::new(),
            fix: FixHandle::new(),
            clock,
        }
    }

    /// Reset every zone's debounce record.
    ///
    /// Zone configurations, observers and the retained fix are kept.
    pub fn init(&mut self) {
        self.registry.reset_states();
        tracing::debug!(zones = self.registry.len(), "Geofence debounce state reset");
    }

    // ========================================================================
    // Zone registry
    // ========================================================================

    /// Replace the configuration of the zone at `index`.
    ///
    /// Enabled zones are validated; a rejected zone leaves the previous
    /// configuration in place. The zone's debounce record is not reset.
    pub fn configure(&mut self, index: usize, zone: ZoneInfo) -> Result<()> {
        let shape = zone.shape();
        let enabled = zone.enabled;

        match self.registry.configure(index, zone) {
            Ok(()) => {
                tracing::info!(zone = index, %shape, enabled, "Geofence zone configured");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(zone = index, error = %e, "Geofence zone rejected");
                Err(e)
            }
        }
    }

    /// Configuration of the zone at `index`.
    pub fn zone(&self, index: usize) -> Result<&ZoneInfo> {
        self.registry.get(index)
    }

    /// Mutable configuration of the zone at `index`.
    ///
    /// Field edits are not validated.
    pub fn zone_mut(&mut self, index: usize) -> Result<&mut ZoneInfo> {
        self.registry.get_mut(index)
    }

    /// Debounce record of the zone at `index`.
    pub fn debounce_state(&self, index: usize) -> Result<&ZoneDebounceState> {
        self.registry.state(index)
    }

    /// The zone registry.
    pub fn zones(&self) -> &ZoneRegistry {
        &self.registry
    }

    /// Number of zone slots.
    pub fn zone_count(&self) -> usize {
        self.registry.len()
    }

    /// Returns true if at least one zone is enabled.
    pub fn any_enabled(&self) -> bool {
        self.registry.any_enabled()
    }

    /// Set the maximum HDOP accepted by the quality gate. The sign is discarded.
    pub fn set_max_hdop(&mut self, max_hdop: f64) {
        self.registry.set_max_hdop(max_hdop);
        tracing::info!(max_hdop = self.registry.max_hdop(), "Geofence quality threshold set");
    }

    /// Maximum HDOP accepted by the quality gate.
    pub fn max_hdop(&self) -> f64 {
        self.registry.max_hdop()
    }

    // ========================================================================
    // Fix
    // ========================================================================

    /// Overwrite the retained fix. Nothing is evaluated until the next tick.
    pub fn set_fix(&self, fix: Fix) {
        self.fix.set(fix);
    }

    /// Copy of the retained fix.
    pub fn fix(&self) -> Fix {
        self.fix.get()
    }

    /// Handle for publishing fixes from another context.
    pub fn fix_handle(&self) -> FixHandle {
        self.fix.clone()
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Append an observer. Observers are called in subscription order.
    pub fn subscribe<O>(&mut self, observer: O) -> SubscriptionId
    where
        O: GeofenceObserver + 'static,
    {
        self.observers.subscribe(observer)
    }

    /// Append an observer the caller keeps a handle to.
    pub fn subscribe_shared(&mut self, observer: SharedGeofenceObserver) -> SubscriptionId {
        self.observers.subscribe_shared(observer)
    }

    /// Remove an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Number of subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Evaluate every enabled zone against the retained fix.
    ///
    /// Never fails: degenerate zones evaluate as outside and observer
    /// failures are logged, counted and otherwise ignored.
    pub fn tick(&mut self) -> TickSummary {
        let fix = self.fix.get();
        let position = fix.coordinate();
        let now_ms = self.clock.now_millis();
        let max_hdop = self.registry.max_hdop();
        let observers = &self.observers;
        let mut summary = TickSummary::default();

        for (index, zone, state) in self.registry.entries_mut() {
            if !zone.enabled {
                continue;
            }
            summary.zones_evaluated += 1;

            if fix.hdop > max_hdop {
                tracing::trace!(zone = index, hdop = fix.hdop, max_hdop, "Geofence fix gated");
                summary.poor_location += 1;
                summary.record(
                    observers.dispatch(&GeofenceEvent::new(index, GeofenceEventKind::PoorLocation)),
                );
                continue;
            }

            let outside = is_outside(&zone.geometry, position);
            if !state.is_event_confirmed(outside, zone.verification_secs, now_ms) {
                continue;
            }

            let confirmed = ZoneState::from_outside(outside);
            let (level, edge, edge_from) = if outside {
                (
                    zone.report_outside.then_some(GeofenceEventKind::Outside),
                    zone.report_exit.then_some(GeofenceEventKind::Exit),
                    ZoneState::Inside,
                )
            } else {
                (
                    zone.report_inside.then_some(GeofenceEventKind::Inside),
                    zone.report_enter.then_some(GeofenceEventKind::Enter),
                    ZoneState::Outside,
                )
            };

            let previous = state.confirm(confirmed);
            if previous != confirmed {
                tracing::debug!(zone = index, from = %previous, to = %confirmed, "Geofence zone transition");
            }

            if let Some(kind) = level {
                summary.record(observers.dispatch(&GeofenceEvent::new(index, kind)));
            }
            if let Some(kind) = edge.filter(|_| previous == edge_from) {
                summary.record(observers.dispatch(&GeofenceEvent::new(index, kind)));
            }
        }

        tracing::debug!(
            zones = summary.zones_evaluated,
            events = summary.events_emitted,
            poor_location = summary.poor_location,
            failures = summary.listener_failures,
            "Geofence tick complete"
        );

        summary
    }
}

/// Raw containment sample: `true` when the position is outside the geometry.
///
/// Comparisons involving NaN evaluate false, so a non-finite distance counts
/// as inside a circle and a non-finite position is outside every polygon.
fn is_outside(geometry: &ZoneGeometry, position: Coordinate) -> bool {
    match geometry {
        ZoneGeometry::Circle { center, radius_m } => distance_meters(*center, position) > *radius_m,
        ZoneGeometry::Polygon { vertices } => !point_in_polygon(vertices, position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::observer::RecordingObserver;
    use crate::zone::PolygonVertex;
    use std::sync::Arc;

    const GOLDEN_GATE_PARK: Coordinate = Coordinate {
        latitude: 37.76887,
        longitude: -122.48248,
    };

    fn engine(zones: usize) -> (Geofence<ManualClock>, ManualClock, Arc<RecordingObserver>) {
        let clock = ManualClock::new(0);
        let mut geofence = Geofence::with_clock(GeofenceConfig::new(zones), clock.clone());
        let recorder = Arc::new(RecordingObserver::new());
        geofence.subscribe_shared(recorder.clone());
        (geofence, clock, recorder)
    }

    fn park(kinds: &[GeofenceEventKind]) -> ZoneInfo {
        ZoneInfo::circular(GOLDEN_GATE_PARK, 2700.0).reporting(kinds)
    }

    #[test]
    fn test_inside_on_first_tick() {
        let (mut geofence, _clock, recorder) = engine(1);
        geofence.configure(0, park(&[GeofenceEventKind::Inside])).unwrap();
        geofence.set_fix(Fix::new(37.76705, -122.48593));

        let summary = geofence.tick();

        assert_eq!(summary.zones_evaluated, 1);
        assert_eq!(summary.events_emitted, 1);
        assert_eq!(
            recorder.events(),
            vec![GeofenceEvent::new(0, GeofenceEventKind::Inside)]
        );
    }

    #[test]
    fn test_level_event_precedes_edge_event() {
        let (mut geofence, _clock, recorder) = engine(1);
        geofence
            .configure(
                0,
                park(&[
                    GeofenceEventKind::Inside,
                    GeofenceEventKind::Outside,
                    GeofenceEventKind::Enter,
                    GeofenceEventKind::Exit,
                ]),
            )
            .unwrap();

        geofence.set_fix(Fix::new(37.74316, -122.47725));
        geofence.tick();
        geofence.set_fix(Fix::new(37.76298, -122.45638));
        geofence.tick();
        geofence.set_fix(Fix::new(37.74316, -122.47725));
        geofence.tick();

        let kinds: Vec<_> = recorder.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                GeofenceEventKind::Outside,
                GeofenceEventKind::Inside,
                GeofenceEventKind::Enter,
                GeofenceEventKind::Outside,
                GeofenceEventKind::Exit,
            ]
        );
    }

    #[test]
    fn test_no_edge_event_from_unknown() {
        let (mut geofence, _clock, recorder) = engine(1);
        geofence
            .configure(0, park(&[GeofenceEventKind::Enter, GeofenceEventKind::Exit]))
            .unwrap();
        geofence.set_fix(Fix::new(37.76705, -122.48593));

        geofence.tick();

        assert!(recorder.is_empty(), "first confirmation is not a transition");
        assert_eq!(
            geofence.debounce_state(0).unwrap().confirmed(),
            ZoneState::Inside
        );
    }

    #[test]
    fn test_poor_location_skips_debounce() {
        let (mut geofence, _clock, recorder) = engine(1);
        geofence.configure(0, park(&[GeofenceEventKind::Inside])).unwrap();
        geofence.set_fix(Fix::new(37.76705, -122.48593).with_hdop(9.0));

        let summary = geofence.tick();

        assert_eq!(summary.poor_location, 1);
        assert_eq!(
            recorder.events(),
            vec![GeofenceEvent::new(0, GeofenceEventKind::PoorLocation)]
        );
        assert_eq!(geofence.debounce_state(0).unwrap(), &ZoneDebounceState::new());
    }

    #[test]
    fn test_hdop_equal_to_threshold_passes() {
        let (mut geofence, _clock, recorder) = engine(1);
        geofence.configure(0, park(&[GeofenceEventKind::Inside])).unwrap();
        geofence.set_fix(Fix::new(37.76705, -122.48593).with_hdop(7.5));

        geofence.tick();
        assert_eq!(recorder.count(GeofenceEventKind::Inside), 1);
    }

    #[test]
    fn test_verification_delays_confirmation() {
        let (mut geofence, clock, recorder) = engine(1);
        geofence
            .configure(
                0,
                park(&[GeofenceEventKind::Outside]).with_verification_secs(3),
            )
            .unwrap();
        geofence.set_fix(Fix::new(-37.76887, 122.48248));

        geofence.tick();
        clock.advance(2_000);
        geofence.tick();
        assert!(recorder.is_empty());

        clock.advance(3_000);
        geofence.tick();
        assert_eq!(recorder.count(GeofenceEventKind::Outside), 1);
    }

    #[test]
    fn test_degenerate_polygon_is_outside() {
        let (mut geofence, _clock, recorder) = engine(1);
        let mut zone = ZoneInfo::polygonal(vec![
            PolygonVertex::new(37.0, -123.0),
            PolygonVertex::new(38.0, -123.0),
            PolygonVertex::new(38.0, -122.0),
        ])
        .reporting(&[GeofenceEventKind::Outside]);
        geofence.configure(0, zone.clone()).unwrap();

        // Disable every vertex after configuration
        if let Some(vertices) = zone.vertices_mut() {
            vertices.iter_mut().for_each(|v| v.enabled = false);
        }
        *geofence.zone_mut(0).unwrap() = zone;
        geofence.set_fix(Fix::new(37.5, -122.5));

        geofence.tick();
        assert_eq!(recorder.count(GeofenceEventKind::Outside), 1);
    }

    #[test]
    fn test_init_resets_debounce_only() {
        let (mut geofence, _clock, recorder) = engine(1);
        geofence.configure(0, park(&[GeofenceEventKind::Inside])).unwrap();
        geofence.set_fix(Fix::new(37.76705, -122.48593));
        geofence.tick();

        geofence.init();

        assert_eq!(geofence.debounce_state(0).unwrap(), &ZoneDebounceState::new());
        assert!(geofence.zone(0).unwrap().enabled);
        assert_eq!(geofence.observer_count(), 1);
        assert_eq!(geofence.fix(), Fix::new(37.76705, -122.48593));
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_fix_handle_publishes_into_engine() {
        let (mut geofence, _clock, recorder) = engine(1);
        geofence.configure(0, park(&[GeofenceEventKind::Inside])).unwrap();

        let handle = geofence.fix_handle();
        handle.set(Fix::new(37.76705, -122.48593));

        geofence.tick();
        assert_eq!(recorder.count(GeofenceEventKind::Inside), 1);
    }

    #[test]
    fn test_config_threshold_is_applied() {
        let geofence = Geofence::with_clock(
            GeofenceConfig::new(1).with_max_hdop(5.0),
            ManualClock::default(),
        );
        assert_eq!(geofence.max_hdop(), 5.0);
        assert_eq!(geofence.zone_count(), 1);
        assert!(!geofence.any_enabled());
    }

    #[test]
    fn test_summary_display() {
        let summary = TickSummary {
            zones_evaluated: 2,
            poor_location: 1,
            events_emitted: 3,
            listener_failures: 0,
        };
        assert_eq!(
            summary.to_string(),
            "2 zones, 3 events (1 poor location, 0 listener failures)"
        );
    }
}
