//! Error types for the geofence engine.

use thiserror::Error;

use crate::zone::ZoneError;

/// Errors returned by the registry and configuration API.
///
/// `tick()` never returns an error: degenerate zones evaluate as outside and
/// observer failures are isolated and counted.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeofenceError {
    /// Zone index past the end of the registry.
    #[error("zone index {index} out of range (zone count: {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// Zone rejected by `configure()`.
    #[error("invalid configuration for zone {index}: {source}")]
    InvalidConfiguration {
        index: usize,
        #[source]
        source: ZoneError,
    },
}

/// Result alias for geofence operations.
pub type Result<T> = std::result::Result<T, GeofenceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_index_out_of_range_display() {
        let err = GeofenceError::IndexOutOfRange { index: 4, count: 4 };
        assert_eq!(err.to_string(), "zone index 4 out of range (zone count: 4)");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_invalid_configuration_has_source() {
        let err = GeofenceError::InvalidConfiguration {
            index: 1,
            source: ZoneError::TooFewVertices { enabled: 2 },
        };
        assert!(err.to_string().starts_with("invalid configuration for zone 1"));
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("polygonal zone needs at least 3 enabled vertices, got 2".to_string())
        );
    }
}
