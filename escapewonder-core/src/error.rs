//! Error types for configuration and rendering.

use thiserror::Error;

/// A decimal bound string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed decimal {input:?}: {reason}")]
pub struct ParseError {
    pub input: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Rejection of a request or zoom before any rendering starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("could not parse {field}: {source}")]
    Parse {
        field: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("invalid plane bounds: {0}")]
    InvalidBounds(String),

    #[error("invalid zoom bounds: {0}")]
    InvalidZoom(String),

    #[error("malformed descriptor: {0}")]
    Descriptor(String),
}

impl ConfigError {
    pub fn field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the request field at fault, when there is one.
    pub fn field_name(&self) -> Option<&'static str> {
        match self {
            Self::InvalidField { field, .. } | Self::Parse { field, .. } => Some(*field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Descriptor(err.to_string())
    }
}

/// Failure of a render. No partial image accompanies any of these.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot allocate a {width}x{height} pixel buffer")]
    Allocation { width: u32, height: u32 },

    #[error("pixel ({x}, {y}) was written by two regions")]
    PartitionOverlap { x: u32, y: u32 },

    #[error("pixel ({x}, {y}) was never written")]
    PartitionGap { x: u32, y: u32 },

    #[error("pixel ({x}, {y}) lies outside the image")]
    OutOfBounds { x: u32, y: u32 },

    #[error("render worker {0} panicked")]
    WorkerPanicked(usize),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_name_their_field() {
        let err = ConfigError::field("jobs", "must be at least 1");
        assert_eq!(err.field_name(), Some("jobs"));
        assert_eq!(err.to_string(), "invalid jobs: must be at least 1");
    }

    #[test]
    fn parse_errors_keep_the_input() {
        let err = ConfigError::Parse {
            field: "real_min",
            source: ParseError::new("1.2.3", "invalid digit"),
        };
        assert_eq!(err.field_name(), Some("real_min"));
        assert!(err.to_string().contains("1.2.3"));
    }

    #[test]
    fn render_error_wraps_config_error() {
        let err: RenderError = ConfigError::InvalidBounds("real_min >= real_max".into()).into();
        assert!(matches!(err, RenderError::Config(ConfigError::InvalidBounds(_))));
    }
}
