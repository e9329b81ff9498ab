//! Dialect registry (verb module)
//!
//! A [`RelationalSink`] describes one SQL dialect: what it can do, how it
//! quotes and names things, and how each logical operation is lowered into
//! the [`sqldom`](crate::sqldom) tree. Every lowering method has a default
//! in [`ansi`]; vendor sinks override only what differs.

pub mod ansi;
mod h2;
mod memsql;
mod snowflake;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::{DataType, Dataset, DatasetDefinition, Field};
use crate::plan::{
    Alter, Condition, Create, Delete, Drop, FunctionName, Insert, Merge, Selection, Show, Truncate,
    Update, Value, WindowFunctionName,
};
use crate::sqldom::{
    ColumnDef, RenderContext, SelectStatement, SqlCondition, SqlValue, Statement, Table, TableLike,
};
use crate::transformer::{CaseOptimizer, TransformError};

pub use ansi::AnsiSink;
pub use h2::H2Sink;
pub use memsql::MemSqlSink;
pub use snowflake::SnowflakeSink;

/// Optional features a dialect may support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Native `MERGE INTO`
    Merge,
    AddColumn,
    ImplicitDataTypeConversion,
    /// A select-list alias may be referenced from `HAVING`
    AliasInHaving,
    DryRun,
    BulkLoad,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Merge => "MERGE",
            Capability::AddColumn => "ADD_COLUMN",
            Capability::ImplicitDataTypeConversion => "IMPLICIT_DATA_TYPE_CONVERSION",
            Capability::AliasInHaving => "ALIAS_IN_HAVING",
            Capability::DryRun => "DRY_RUN",
            Capability::BulkLoad => "BULK_LOAD",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier case folding applied after lowering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseConversion {
    #[default]
    None,
    ToUpper,
    ToLower,
}

/// One SQL dialect.
///
/// Implementations are stateless unit structs shared by reference.
pub trait RelationalSink: Send + Sync {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> &'static [Capability];

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    fn quote_identifier(&self) -> &'static str {
        "\""
    }

    fn render_context(&self) -> RenderContext {
        RenderContext::new(self.quote_identifier())
    }

    // -- types ----------------------------------------------------------------

    /// Column type as written in DDL
    fn type_name(&self, data_type: &DataType) -> String {
        ansi::type_name(data_type)
    }

    /// Base type names that may be stored into a column of `target` type
    fn implicit_type_widening(&self, _target: &DataType) -> &'static [&'static str] {
        &[]
    }

    /// Whether staging values of type `staging` can be written to a main
    /// column of type `main`
    fn is_type_compatible(&self, staging: &DataType, main: &DataType) -> bool {
        staging.name() == main.name()
            || (self.supports(Capability::ImplicitDataTypeConversion)
                && self.implicit_type_widening(main).contains(&staging.name()))
    }

    fn case_optimizer(&self, conversion: CaseConversion) -> Option<CaseOptimizer> {
        match conversion {
            CaseConversion::None => None,
            CaseConversion::ToUpper => Some(CaseOptimizer::UpperCase),
            CaseConversion::ToLower => Some(CaseOptimizer::LowerCase),
        }
    }

    fn function_name(&self, function: FunctionName) -> &'static str {
        ansi::function_name(function)
    }

    fn window_function_name(&self, function: WindowFunctionName) -> &'static str {
        ansi::window_function_name(function)
    }

    // -- operations -----------------------------------------------------------

    fn lower_create(&self, create: &Create) -> Result<Statement, TransformError> {
        Ok(Statement::CreateTable(ansi::create_table(self, create)))
    }

    fn lower_drop(&self, drop: &Drop) -> Result<Statement, TransformError> {
        Ok(ansi::lower_drop(drop))
    }

    fn lower_insert(&self, insert: &Insert) -> Result<Statement, TransformError> {
        ansi::lower_insert(self, insert)
    }

    fn lower_update(&self, update: &Update) -> Result<Statement, TransformError> {
        ansi::lower_update(self, update)
    }

    fn lower_delete(&self, delete: &Delete) -> Result<Statement, TransformError> {
        ansi::lower_delete(self, delete)
    }

    /// A merge lowers to one statement on sinks with native `MERGE`, and to
    /// an update/insert/delete sequence otherwise
    fn lower_merge(&self, merge: &Merge) -> Result<Vec<Statement>, TransformError> {
        if self.supports(Capability::Merge) {
            Ok(vec![ansi::lower_native_merge(self, merge)?])
        } else {
            ansi::lower_merge_as_statements(self, merge)
        }
    }

    fn lower_alter(&self, alter: &Alter) -> Result<Statement, TransformError> {
        Ok(ansi::lower_alter(self, alter))
    }

    fn lower_truncate(&self, truncate: &Truncate) -> Result<Statement, TransformError> {
        Ok(ansi::lower_truncate(truncate))
    }

    fn lower_show(&self, show: &Show) -> Result<Statement, TransformError> {
        Ok(Statement::Show(ansi::show_command(show)))
    }

    // -- building blocks ------------------------------------------------------

    fn lower_selection(&self, selection: &Selection) -> Result<SelectStatement, TransformError> {
        ansi::lower_selection(self, selection)
    }

    fn lower_table(&self, dataset: &DatasetDefinition) -> Table {
        ansi::lower_table(dataset)
    }

    fn lower_dataset(&self, dataset: &Dataset) -> Result<TableLike, TransformError> {
        ansi::lower_dataset(self, dataset)
    }

    fn lower_condition(&self, condition: &Condition) -> Result<SqlCondition, TransformError> {
        ansi::lower_condition(self, condition)
    }

    fn lower_value(&self, value: &Value) -> Result<SqlValue, TransformError> {
        ansi::lower_value(self, value)
    }

    fn lower_field(&self, field: &Field) -> ColumnDef {
        ansi::lower_field(self, field)
    }
}

impl fmt::Debug for dyn RelationalSink + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationalSink").field("name", &self.name()).finish()
    }
}
