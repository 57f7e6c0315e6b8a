//! Evaluate the configured zones against a single fix.

use std::sync::Arc;

use geofence::{Clock, Fix, ManualClock, RecordingObserver};

use super::common::{format_summary, EventRecord, OutputFormat};
use crate::config::ZoneFile;
use crate::error::CliError;

/// Arguments for `geofence check`.
#[derive(Debug, Clone, clap::Args)]
pub struct CheckArgs {
    /// Latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Horizontal dilution of precision of the fix
    #[arg(long, default_value_t = 1.0)]
    pub hdop: f64,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Run the check command.
///
/// The fix is treated as held for the longest verification time of any
/// enabled zone, so the printed events are the steady state for that fix.
pub fn run(zones: &ZoneFile, args: CheckArgs) -> Result<(), CliError> {
    let lines = evaluate(zones, &args)?;
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

fn evaluate(zones: &ZoneFile, args: &CheckArgs) -> Result<Vec<String>, CliError> {
    if zones.zones.iter().all(|zone| !zone.enabled) {
        tracing::warn!("No enabled zones configured; nothing to check");
    }

    let clock = ManualClock::new(0);
    let mut geofence = zones.build_engine(clock.clone())?;
    let recorder = Arc::new(RecordingObserver::new());
    geofence.subscribe_shared(recorder.clone());
    geofence.set_fix(Fix::new(args.lat, args.lon).with_hdop(args.hdop));

    let dwell_ms = zones.max_verification_ms();
    let mut summary = geofence.tick();
    if dwell_ms > 0 {
        // Only the settled tick is reported
        recorder.take();
        clock.advance(dwell_ms);
        summary = geofence.tick();
    }

    let offset_ms = clock.now_millis();
    let mut lines = recorder
        .take()
        .into_iter()
        .map(|event| EventRecord { offset_ms, event }.render(args.format))
        .collect::<Result<Vec<_>, _>>()?;

    if args.format == OutputFormat::Text {
        lines.push(format_summary("check", &summary));
    }
    Ok(lines)
}
