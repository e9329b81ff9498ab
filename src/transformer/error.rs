//! Transformer errors

use crate::sink::Capability;
use crate::sqldom::RenderError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// A generator entry point the sink cannot serve
    #[error("{0} not supported!")]
    Unsupported(&'static str),
    #[error("Capability {capability} not supported by {sink} sink")]
    MissingCapability {
        capability: Capability,
        sink: &'static str,
    },
    #[error("Staging field [{field}] of type {staging_type} is not compatible with main field type {main_type}")]
    IncompatibleType {
        field: String,
        staging_type: String,
        main_type: String,
    },
    #[error("Sub-select used as a dataset must have an alias")]
    UnaliasedSubQuery,
    #[error(transparent)]
    Render(#[from] RenderError),
}
