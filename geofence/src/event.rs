//! Geofence events delivered to observers.

use serde::{Deserialize, Serialize};

/// Kind of geofence event.
///
/// `Inside` and `Outside` are level-triggered: they fire on every tick the
/// confirmed state holds. `Enter` and `Exit` are edge-triggered: they fire
/// only on the tick where the confirmed state flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeofenceEventKind {
    /// The current fix failed the HDOP quality gate; the zone was not evaluated.
    PoorLocation,
    /// The fix is confirmed inside the zone.
    Inside,
    /// The fix is confirmed outside the zone.
    Outside,
    /// The confirmed state changed from outside to inside.
    Enter,
    /// The confirmed state changed from inside to outside.
    Exit,
}

impl GeofenceEventKind {
    /// Every event kind, in declaration order.
    pub const ALL: [GeofenceEventKind; 5] = [
        GeofenceEventKind::PoorLocation,
        GeofenceEventKind::Inside,
        GeofenceEventKind::Outside,
        GeofenceEventKind::Enter,
        GeofenceEventKind::Exit,
    ];

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            GeofenceEventKind::PoorLocation => "location quality too poor to evaluate",
            GeofenceEventKind::Inside => "inside geofence",
            GeofenceEventKind::Outside => "outside geofence",
            GeofenceEventKind::Enter => "entered geofence",
            GeofenceEventKind::Exit => "exited geofence",
        }
    }

    /// Returns true for the edge-triggered kinds.
    pub fn is_transition(&self) -> bool {
        matches!(self, GeofenceEventKind::Enter | GeofenceEventKind::Exit)
    }
}

impl std::fmt::Display for GeofenceEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeofenceEventKind::PoorLocation => write!(f, "poor_location"),
            GeofenceEventKind::Inside => write!(f, "inside"),
            GeofenceEventKind::Outside => write!(f, "outside"),
            GeofenceEventKind::Enter => write!(f, "enter"),
            GeofenceEventKind::Exit => write!(f, "exit"),
        }
    }
}

impl std::str::FromStr for GeofenceEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "poor_location" => Ok(GeofenceEventKind::PoorLocation),
            "inside" => Ok(GeofenceEventKind::Inside),
            "outside" => Ok(GeofenceEventKind::Outside),
            "enter" => Ok(GeofenceEventKind::Enter),
            "exit" => Ok(GeofenceEventKind::Exit),
            other => Err(format!("unknown event kind '{}'", other)),
        }
    }
}

/// An event for one zone, produced during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeofenceEvent {
    /// Registry index of the zone
    pub zone_index: usize,
    /// What happened
    pub kind: GeofenceEventKind,
}

impl GeofenceEvent {
    /// Create a new event.
    pub fn new(zone_index: usize, kind: GeofenceEventKind) -> Self {
        Self { zone_index, kind }
    }
}

impl std::fmt::Display for GeofenceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "zone {}: {}", self.zone_index, self.kind)
    }
}
