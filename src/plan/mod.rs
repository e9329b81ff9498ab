//! Logical plan types (noun module)
//!
//! A dialect-agnostic description of the operations an ingest run performs.

mod expr;
mod node;
mod phase;

pub use expr::{
    ArithmeticOperator, Case, Condition, FieldValue, Function, FunctionName, OrderedValue, Value,
    WindowFunction, WindowFunctionName,
};
pub use node::{
    Alter, AlterKind, Create, Delete, Drop, Insert, Merge, Modifier, Operation, Pair, Quantifier,
    Selection, Show, ShowKind, Truncate, Update,
};
pub use phase::{LogicalPlan, StatisticName};
