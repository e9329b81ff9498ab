//! SQL syntax tree (noun module)
//!
//! Dialect-level statements produced by lowering and rendered to text.

mod error;
mod expr;
mod statement;

pub use error::RenderError;
pub use expr::{Column, ComparisonOperator, RenderContext, SqlCondition, SqlValue, Table, TableLike};
pub use statement::{
    AlterOperation, AlterTable, ColumnDef, CreateTable, DeleteStatement, DropTable,
    InsertStatement, MergeStatement, SelectStatement, ShowCommand, ShowObject, Statement,
    TruncateTable, UpdateStatement,
};
