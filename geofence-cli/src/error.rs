//! CLI error types.

use std::fmt;
use std::path::PathBuf;

use geofence::GeofenceError;

/// Errors surfaced by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Zone file could not be read or parsed.
    ConfigFile { path: PathBuf, source: ini::Error },

    /// Zone file parsed but holds an invalid value.
    Config(String),

    /// Engine rejected a zone or index.
    Geofence(GeofenceError),

    /// Fix trace could not be parsed.
    Track { line: usize, message: String },

    /// I/O error reading input.
    Io(std::io::Error),

    /// Failed to serialize output.
    Serialize(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::ConfigFile { path, source } => {
                write!(f, "Failed to load zone file {}: {}", path.display(), source)
            }
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Geofence(e) => write!(f, "Geofence error: {}", e),
            CliError::Track { line, message } => {
                write!(f, "Invalid fix trace at line {}: {}", line, message)
            }
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::Serialize(e) => write!(f, "Failed to serialize output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile { source, .. } => Some(source),
            CliError::Geofence(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Serialize(e) => Some(e),
            CliError::Config(_) | CliError::Track { .. } => None,
        }
    }
}

impl From<GeofenceError> for CliError {
    fn from(e: GeofenceError) -> Self {
        CliError::Geofence(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialize(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_config_error_display() {
        let err = CliError::Config("zone.x: bad index".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("bad index"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_from_geofence_error() {
        let err: CliError = GeofenceError::IndexOutOfRange { index: 3, count: 2 }.into();
        assert!(matches!(err, CliError::Geofence(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_track_error_display() {
        let err = CliError::Track {
            line: 7,
            message: "expected latitude".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid fix trace at line 7: expected latitude"
        );
    }
}
