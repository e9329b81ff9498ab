//! Render errors
//!
//! These indicate a malformed SQL tree, i.e. a bug in a lowering function
//! rather than a caller mistake.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Table is mandatory for {0}")]
    MissingTable(&'static str),
    #[error("Columns list is mandatory for {0}")]
    MissingColumns(&'static str),
    #[error("Values list size must match columns list size for {0}")]
    SizeMismatch(&'static str),
}
