//! Simulated tracker loop.
//!
//! Two overlapping circles in Golden Gate Park are watched while the fix
//! alternates between a point inside both and a point on the other side of
//! the world. One tick runs per simulated second.

use std::sync::Arc;
use std::time::Duration;

use geofence::{
    Coordinate, Fix, GeofenceEventKind, LoggingObserver, ManualClock, RecordingObserver, ZoneInfo,
};

use super::common::format_summary;
use crate::config::ZoneFile;
use crate::error::CliError;

const GOLDEN_GATE_PARK: Coordinate = Coordinate {
    latitude: 37.76887,
    longitude: -122.48248,
};
const POLO_FIELD: Coordinate = Coordinate {
    latitude: 37.76825,
    longitude: -122.49245,
};
const DEMO_RADIUS_M: f64 = 2700.0;

/// Elk Glen picnic area, inside both demo zones.
const INSIDE_FIX: (f64, f64) = (37.76705, -122.48593);
/// Antipode of the park, outside everything.
const OUTSIDE_FIX: (f64, f64) = (-37.76887, 122.48248);

const TICK_MS: u64 = 1000;

/// Arguments for `geofence demo`.
#[derive(Debug, Clone, clap::Args)]
pub struct DemoArgs {
    /// Number of ticks to run
    #[arg(long, default_value_t = 60)]
    pub ticks: u64,

    /// Seconds between fix changes
    #[arg(long, default_value_t = 10)]
    pub period: u64,

    /// Sleep one second between ticks
    #[arg(long)]
    pub realtime: bool,
}

/// Zones used by the demo when the zone file enables none.
pub fn demo_zones() -> ZoneFile {
    let reporting = [
        GeofenceEventKind::Inside,
        GeofenceEventKind::Enter,
        GeofenceEventKind::Exit,
    ];
    ZoneFile {
        zones: vec![
            ZoneInfo::circular(GOLDEN_GATE_PARK, DEMO_RADIUS_M).reporting(&reporting),
            ZoneInfo::circular(POLO_FIELD, DEMO_RADIUS_M).reporting(&reporting),
        ],
        ..ZoneFile::default()
    }
}

/// Run the demo loop.
pub fn run(zones: &ZoneFile, args: DemoArgs) -> Result<(), CliError> {
    let zones = if zones.zones.iter().any(|zone| zone.enabled) {
        zones.clone()
    } else {
        demo_zones()
    };

    let recorder = simulate(&zones, &args)?;

    println!("Demo finished after {} ticks:", args.ticks);
    for kind in GeofenceEventKind::ALL {
        println!("  {:<14} {}", kind.to_string(), recorder.count(kind));
    }
    Ok(())
}

fn simulate(zones: &ZoneFile, args: &DemoArgs) -> Result<Arc<RecordingObserver>, CliError> {
    let clock = ManualClock::new(0);
    let mut geofence = zones.build_engine(clock.clone())?;
    geofence.subscribe(LoggingObserver);
    let recorder = Arc::new(RecordingObserver::new());
    geofence.subscribe_shared(recorder.clone());

    let period = args.period.max(1);
    tracing::info!(
        zones = geofence.zone_count(),
        ticks = args.ticks,
        period_secs = period,
        "Starting geofence demo"
    );

    for second in 0..args.ticks {
        let (lat, lon) = if (second / period) % 2 == 0 {
            OUTSIDE_FIX
        } else {
            INSIDE_FIX
        };
        geofence.set_fix(Fix::new(lat, lon).with_hdop(1.0).with_timestamp(second as i64));

        let summary = geofence.tick();
        tracing::debug!("{}", format_summary("tick", &summary));

        clock.advance(TICK_MS);
        if args.realtime {
            std::thread::sleep(Duration::from_millis(TICK_MS));
        }
    }

    Ok(recorder)
}
