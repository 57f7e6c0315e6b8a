//! Replay a recorded fix trace through the engine.
//!
//! A trace is a CSV-like text file, one fix per line:
//!
//! ```text
//! # offset_ms,latitude,longitude[,hdop[,horizontal_accuracy]]
//! 0,37.76705,-122.48593,1.2
//! 1000,37.76710,-122.48601,1.1,4.5
//! ```
//!
//! Offsets are milliseconds on the engine clock and must not decrease. Blank
//! lines and lines starting with `#` are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use geofence::{Fix, ManualClock, RecordingObserver, TickSummary};

use super::common::{format_summary, EventRecord, OutputFormat};
use crate::config::ZoneFile;
use crate::error::CliError;

/// HDOP assumed when a trace line omits it.
pub const DEFAULT_TRACE_HDOP: f64 = 1.0;

/// Arguments for `geofence replay`.
#[derive(Debug, Clone, clap::Args)]
pub struct ReplayArgs {
    /// Fix trace file
    pub track: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// One line of a fix trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    /// Engine clock reading for this fix
    pub offset_ms: u64,
    /// The fix
    pub fix: Fix,
}

/// Run the replay command.
pub fn run(zones: &ZoneFile, args: ReplayArgs) -> Result<(), CliError> {
    let file = File::open(&args.track)?;
    let trace = parse_trace(BufReader::new(file))?;
    tracing::info!(
        track = %args.track.display(),
        fixes = trace.len(),
        "Replaying fix trace"
    );

    let (records, totals) = replay(zones, &trace)?;
    for record in &records {
        println!("{}", record.render(args.format)?);
    }
    if args.format == OutputFormat::Text {
        println!("{}", format_summary("replay", &totals));
    }
    Ok(())
}

/// Parse a fix trace.
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<TracePoint>, CliError> {
    let mut trace: Vec<TracePoint> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let content = line.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        let point = parse_trace_line(content).map_err(|message| CliError::Track {
            line: line_number,
            message,
        })?;

        if let Some(previous) = trace.last() {
            if point.offset_ms < previous.offset_ms {
                return Err(CliError::Track {
                    line: line_number,
                    message: format!(
                        "offset {} ms is earlier than the previous {} ms",
                        point.offset_ms, previous.offset_ms
                    ),
                });
            }
        }
        trace.push(point);
    }

    Ok(trace)
}

fn parse_trace_line(content: &str) -> Result<TracePoint, String> {
    let fields: Vec<&str> = content.split(',').map(str::trim).collect();
    if !(3..=5).contains(&fields.len()) {
        return Err(format!(
            "expected 3 to 5 fields (offset_ms,latitude,longitude[,hdop[,accuracy]]), got {}",
            fields.len()
        ));
    }

    let offset_ms = fields[0]
        .parse::<u64>()
        .map_err(|_| format!("invalid offset '{}'", fields[0]))?;
    let number = |name: &str, value: &str| {
        value
            .parse::<f64>()
            .map_err(|_| format!("invalid {} '{}'", name, value))
    };

    let mut fix = Fix::new(number("latitude", fields[1])?, number("longitude", fields[2])?)
        .with_hdop(DEFAULT_TRACE_HDOP);
    if let Some(hdop) = fields.get(3).copied() {
        fix = fix.with_hdop(number("hdop", hdop)?);
    }
    if let Some(accuracy) = fields.get(4).copied() {
        fix = fix.with_accuracy(number("accuracy", accuracy)?);
    }

    Ok(TracePoint { offset_ms, fix })
}

/// Run a trace through an engine built from `zones`.
///
/// Returns every event with the offset of the tick that produced it, and the
/// summed tick counters.
pub fn replay(
    zones: &ZoneFile,
    trace: &[TracePoint],
) -> Result<(Vec<EventRecord>, TickSummary), CliError> {
    let clock = ManualClock::new(0);
    let mut geofence = zones.build_engine(clock.clone())?;
    let recorder = Arc::new(RecordingObserver::new());
    geofence.subscribe_shared(recorder.clone());

    let mut records = Vec::new();
    let mut totals = TickSummary::default();

    for point in trace {
        clock.set(point.offset_ms);
        geofence.set_fix(point.fix);
        let summary = geofence.tick();

        totals.zones_evaluated += summary.zones_evaluated;
        totals.poor_location += summary.poor_location;
        totals.events_emitted += summary.events_emitted;
        totals.listener_failures += summary.listener_failures;

        records.extend(recorder.take().into_iter().map(|event| EventRecord {
            offset_ms: point.offset_ms,
            event,
        }));
    }

    Ok((records, totals))
}
