//! Common types and utilities shared across CLI commands.

use clap::ValueEnum;
use geofence::{GeofenceEvent, TickSummary};
use serde::Serialize;

use crate::error::CliError;

/// Event output format for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One human-readable line per event
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// An event stamped with the clock reading it was produced at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventRecord {
    /// Clock reading in milliseconds
    pub offset_ms: u64,
    /// The event
    #[serde(flatten)]
    pub event: GeofenceEvent,
}

impl EventRecord {
    /// Render this record in the given format.
    pub fn render(&self, format: OutputFormat) -> Result<String, CliError> {
        match format {
            OutputFormat::Text => Ok(format!(
                "{:>10} ms  zone {:<3} {:<14} {}",
                self.offset_ms,
                self.event.zone_index,
                self.event.kind.to_string(),
                self.event.kind.description()
            )),
            OutputFormat::Json => Ok(serde_json::to_string(self)?),
        }
    }
}

/// One-line tick summary for text output.
pub fn format_summary(label: &str, summary: &TickSummary) -> String {
    format!("{}: {}", label, summary)
}
