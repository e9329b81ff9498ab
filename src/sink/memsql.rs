//! MemSQL (SingleStore) dialect
//!
//! No `MERGE`; merges fall back to the update-join / insert / delete
//! sequence from [`ansi::lower_merge_as_statements`]. Tables are created as
//! reference tables.

use crate::dataset::DataType;
use crate::plan::Create;
use crate::sqldom::Statement;
use crate::transformer::TransformError;

use super::{ansi, Capability, RelationalSink};

#[derive(Debug, Clone, Copy, Default)]
pub struct MemSqlSink;

impl RelationalSink for MemSqlSink {
    fn name(&self) -> &'static str {
        "MemSQL"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::AddColumn, Capability::ImplicitDataTypeConversion]
    }

    fn quote_identifier(&self) -> &'static str {
        "`"
    }

    fn type_name(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::String => "TEXT".to_string(),
            DataType::Variant => "JSON".to_string(),
            other => ansi::type_name(other),
        }
    }

    fn implicit_type_widening(&self, target: &DataType) -> &'static [&'static str] {
        match target {
            DataType::Decimal { .. } => &["TINYINT", "SMALLINT", "INTEGER", "BIGINT", "FLOAT", "DOUBLE"],
            DataType::Double => &["TINYINT", "SMALLINT", "INTEGER", "FLOAT"],
            DataType::BigInt => &["TINYINT", "SMALLINT", "INTEGER"],
            DataType::Integer => &["TINYINT", "SMALLINT"],
            DataType::Varchar(_) | DataType::Text => &["CHAR", "VARCHAR", "STRING"],
            DataType::DateTime => &["DATE"],
            _ => &[],
        }
    }

    fn lower_create(&self, create: &Create) -> Result<Statement, TransformError> {
        let mut table = ansi::create_table(self, create);
        table.reference = true;
        Ok(Statement::CreateTable(table))
    }
}
