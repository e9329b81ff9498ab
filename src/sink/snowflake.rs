//! Snowflake dialect

use crate::dataset::DataType;
use crate::plan::Show;
use crate::sqldom::Statement;
use crate::transformer::TransformError;

use super::{ansi, Capability, RelationalSink};

#[derive(Debug, Clone, Copy, Default)]
pub struct SnowflakeSink;

impl RelationalSink for SnowflakeSink {
    fn name(&self) -> &'static str {
        "Snowflake"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[
            Capability::Merge,
            Capability::AddColumn,
            Capability::ImplicitDataTypeConversion,
            Capability::DryRun,
        ]
    }

    fn type_name(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::DateTime => "TIMESTAMP".to_string(),
            DataType::Json => "VARIANT".to_string(),
            DataType::String | DataType::Text => "VARCHAR".to_string(),
            other => ansi::type_name(other),
        }
    }

    fn implicit_type_widening(&self, target: &DataType) -> &'static [&'static str] {
        match target {
            DataType::Decimal { .. } => &[
                "TINYINT", "SMALLINT", "INTEGER", "BIGINT", "FLOAT", "DOUBLE", "REAL", "NUMERIC",
            ],
            DataType::Double => &["TINYINT", "SMALLINT", "INTEGER", "FLOAT", "REAL"],
            DataType::BigInt => &["TINYINT", "SMALLINT", "INTEGER"],
            DataType::Varchar(_) => &["CHAR", "STRING", "TEXT"],
            DataType::Timestamp => &["DATETIME"],
            DataType::Json => &["VARIANT"],
            _ => &[],
        }
    }

    /// `SHOW TABLES LIKE 'main' IN "mydb"`
    fn lower_show(&self, show: &Show) -> Result<Statement, TransformError> {
        let mut command = ansi::show_command(show);
        command.scope_keyword = "IN";
        command.like_before_scope = true;
        Ok(Statement::Show(command))
    }
}
