//! Error types for relingest

use crate::planner::PlanError;
use crate::sqldom::RenderError;
use crate::transformer::TransformError;

/// Errors raised while building datasets, strategies and generators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A builder was finished without all of its required attributes
    #[error("Cannot build {kind}, some of required attributes are not set [{}]", .attributes.join(", "))]
    MissingAttributes {
        kind: &'static str,
        attributes: Vec<&'static str>,
    },
    #[error("Duplicate field [{0}] in schema definition")]
    DuplicateField(String),
    #[error("Invalid data split range [{lower}, {upper}]: lower bound exceeds upper bound")]
    InvalidDataSplitRange { lower: i64, upper: i64 },
}

impl BuildError {
    pub(crate) fn missing(kind: &'static str, attributes: Vec<&'static str>) -> Self {
        BuildError::MissingAttributes { kind, attributes }
    }
}

/// Errors that can occur while parsing an ingest configuration
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// IO error reading file
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    /// YAML deserialization error
    #[error("Invalid YAML: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },
    /// The YAML was well-formed but described an incomplete strategy
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Any failure surfaced by the crate's top-level entry points
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attributes_message() {
        let err = BuildError::missing("NontemporalDelta", vec!["digestField"]);
        assert_eq!(
            err.to_string(),
            "Cannot build NontemporalDelta, some of required attributes are not set [digestField]"
        );
    }

    #[test]
    fn test_transparent_wrapping_keeps_text() {
        let err: Error = BuildError::missing("DateTimeAuditing", vec!["dateTimeField"]).into();
        assert_eq!(
            err.to_string(),
            "Cannot build DateTimeAuditing, some of required attributes are not set [dateTimeField]"
        );
    }
}
