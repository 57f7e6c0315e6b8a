//! Event observers and synchronous fan-out.
//!
//! Observers are invoked in subscription order, on the caller's thread, as
//! each event is produced. A failing observer (error return or panic) is
//! logged and counted but never stops delivery to the remaining observers or
//! the evaluation of later zones.

use std::error::Error;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::{GeofenceEvent, GeofenceEventKind};

/// Result returned by an observer for a single delivery.
pub type ObserverResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Receives geofence events.
///
/// Implemented for any `Fn(&GeofenceEvent) -> ObserverResult` closure, so
/// simple hosts can subscribe a closure directly.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so the engine can be moved into, or
/// shared behind a mutex with, the host's control loop.
///
/// # Example
///
/// ```ignore
/// use geofence::{Geofence, GeofenceConfig, GeofenceEvent, ObserverResult};
///
/// let mut geofence = Geofence::new(GeofenceConfig::new(2));
/// geofence.subscribe(|event: &GeofenceEvent| -> ObserverResult {
///     println!("{}", event);
///     Ok(())
/// });
/// ```
pub trait GeofenceObserver: Send + Sync {
    /// Handle one event.
    fn on_event(&self, event: &GeofenceEvent) -> ObserverResult;
}

impl<F> GeofenceObserver for F
where
    F: Fn(&GeofenceEvent) -> ObserverResult + Send + Sync,
{
    fn on_event(&self, event: &GeofenceEvent) -> ObserverResult {
        self(event)
    }
}

/// Shared observer handle.
pub type SharedGeofenceObserver = Arc<dyn GeofenceObserver>;

/// Identifier returned by [`ObserverList::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of delivering one event to every observer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Observers that handled the event successfully.
    pub delivered: usize,
    /// Observers that returned an error or panicked.
    pub failed: usize,
}

/// Ordered list of observers.
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<(SubscriptionId, SharedGeofenceObserver)>,
    next_id: u64,
}

impl ObserverList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observer. Always succeeds.
    pub fn subscribe<O>(&mut self, observer: O) -> SubscriptionId
    where
        O: GeofenceObserver + 'static,
    {
        self.subscribe_shared(Arc::new(observer))
    }

    /// Append an observer the caller keeps a handle to.
    pub fn subscribe_shared(&mut self, observer: SharedGeofenceObserver) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Remove an observer, keeping the order of the rest.
    ///
    /// Returns `false` if the id is not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Number of subscribed observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns true if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver an event to every observer in subscription order.
    pub fn dispatch(&self, event: &GeofenceEvent) -> DispatchReport {
        let mut report = DispatchReport::default();

        for (id, observer) in &self.observers {
            match panic::catch_unwind(AssertUnwindSafe(|| observer.on_event(event))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(error)) => {
                    report.failed += 1;
                    tracing::warn!(
                        subscription = %id,
                        zone = event.zone_index,
                        kind = %event.kind,
                        error = %error,
                        "Geofence observer returned an error"
                    );
                }
                Err(payload) => {
                    report.failed += 1;
                    tracing::warn!(
                        subscription = %id,
                        zone = event.zone_index,
                        kind = %event.kind,
                        error = panic_message(payload.as_ref()),
                        "Geofence observer panicked"
                    );
                }
            }
        }

        report
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("subscribed", &self.observers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Observer that logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl GeofenceObserver for LoggingObserver {
    fn on_event(&self, event: &GeofenceEvent) -> ObserverResult {
        match event.kind {
            GeofenceEventKind::PoorLocation => tracing::debug!(
                zone = event.zone_index,
                "Geofence {}",
                event.kind.description()
            ),
            _ => tracing::info!(
                zone = event.zone_index,
                kind = %event.kind,
                transition = event.kind.is_transition(),
                "Geofence {}",
                event.kind.description()
            ),
        }
        Ok(())
    }
}

/// Observer that records every event in memory.
///
/// Useful for hosts that poll rather than react, and for tests.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<GeofenceEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event recorded so far.
    pub fn events(&self) -> Vec<GeofenceEvent> {
        self.events.lock().clone()
    }

    /// Remove and return every event recorded so far.
    pub fn take(&self) -> Vec<GeofenceEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of recorded events of the given kind.
    pub fn count(&self, kind: GeofenceEventKind) -> usize {
        self.events.lock().iter().filter(|e| e.kind == kind).count()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl GeofenceObserver for RecordingObserver {
    fn on_event(&self, event: &GeofenceEvent) -> ObserverResult {
        self.events.lock().push(*event);
        Ok(())
    }
}
