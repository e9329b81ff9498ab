//! Transformer (verb module)
//!
//! Lowers a [`LogicalPlan`](crate::plan::LogicalPlan) into SQL-DOM statements
//! through a sink, applies case conversion, and renders the result.

mod error;
mod optimizer;
mod transform;

pub use error::TransformError;
pub use optimizer::CaseOptimizer;
pub use transform::{RenderedPlan, SqlDomPlan, Transformer};
