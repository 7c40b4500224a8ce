//! Unified error handling for the route-colors library.
//!
//! The coloring path itself is infallible. Errors only come from the map
//! surface (duplicate or missing ids) and from decoding collaborator payloads.

use std::fmt;

/// Unified error type for route-colors operations.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteColorError {
    /// A source with this id is already registered on the map surface
    DuplicateSource { id: String },
    /// A layer with this id is already registered on the map surface
    DuplicateLayer { id: String },
    /// A layer was registered against a source that does not exist
    MissingSource { layer_id: String, source_id: String },
    /// No source with this id exists
    SourceNotFound { id: String },
    /// No layer with this id exists
    LayerNotFound { id: String },
    /// A device attribute or preference had an unusable value
    InvalidAttribute { key: String, message: String },
    /// JSON encoding/decoding failed
    Serialization { message: String },
}

impl fmt::Display for RouteColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteColorError::DuplicateSource { id } => {
                write!(f, "Source '{}' already exists", id)
            }
            RouteColorError::DuplicateLayer { id } => {
                write!(f, "Layer '{}' already exists", id)
            }
            RouteColorError::MissingSource {
                layer_id,
                source_id,
            } => {
                write!(
                    f,
                    "Layer '{}' references missing source '{}'",
                    layer_id, source_id
                )
            }
            RouteColorError::SourceNotFound { id } => {
                write!(f, "Source '{}' not found", id)
            }
            RouteColorError::LayerNotFound { id } => {
                write!(f, "Layer '{}' not found", id)
            }
            RouteColorError::InvalidAttribute { key, message } => {
                write!(f, "Invalid attribute '{}': {}", key, message)
            }
            RouteColorError::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for RouteColorError {}

impl From<serde_json::Error> for RouteColorError {
    fn from(err: serde_json::Error) -> Self {
        RouteColorError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type alias for route-colors operations.
pub type Result<T> = std::result::Result<T, RouteColorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RouteColorError::MissingSource {
            layer_id: "route-1-line".to_string(),
            source_id: "route-1".to_string(),
        };
        assert!(err.to_string().contains("route-1-line"));
        assert!(err.to_string().contains("missing source 'route-1'"));
    }

    #[test]
    fn test_from_serde_error() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: RouteColorError = parse.unwrap_err().into();
        assert!(matches!(err, RouteColorError::Serialization { .. }));
    }
}
