//! SQL generator (verb module)
//!
//! Ties the planner, a sink and the transformer together behind
//! [`RelationalGenerator`], and packages the rendered SQL as
//! [`GeneratorResult`].

mod clock;
mod generate;
mod result;

pub use clock::{Clock, FixedClock, IncrementalClock, SystemClock};
pub use generate::{RelationalGenerator, RelationalGeneratorBuilder};
pub use result::GeneratorResult;
