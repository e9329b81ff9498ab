//! H2 dialect

use crate::dataset::DataType;

use super::{ansi, Capability, RelationalSink};

/// H2, mostly used for local testing
#[derive(Debug, Clone, Copy, Default)]
pub struct H2Sink;

impl RelationalSink for H2Sink {
    fn name(&self) -> &'static str {
        "H2"
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
            DataType::String | DataType::Text => "VARCHAR".to_string(),
            DataType::Variant => "JSON".to_string(),
            other => ansi::type_name(other),
        }
    }

    fn implicit_type_widening(&self, target: &DataType) -> &'static [&'static str] {
        match target {
            DataType::Decimal { .. } => &[
                "TINYINT", "SMALLINT", "INTEGER", "BIGINT", "FLOAT", "DOUBLE", "REAL", "NUMERIC",
            ],
            DataType::Double => &["TINYINT", "SMALLINT", "INTEGER", "FLOAT", "REAL"],
            DataType::Real => &["TINYINT", "SMALLINT", "INTEGER", "FLOAT", "DOUBLE"],
            DataType::BigInt => &["TINYINT", "SMALLINT", "INTEGER"],
            DataType::Integer => &["TINYINT", "SMALLINT"],
            DataType::SmallInt => &["TINYINT"],
            DataType::Varchar(_) => &["CHAR", "STRING"],
            DataType::Timestamp => &["DATETIME"],
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widening() {
        let sink = H2Sink;
        assert!(sink.is_type_compatible(&DataType::SmallInt, &DataType::Integer));
        assert!(sink.is_type_compatible(&DataType::Char(Some(4)), &DataType::Varchar(Some(64))));
        assert!(sink.is_type_compatible(
            &DataType::Integer,
            &DataType::Decimal { precision: 10, scale: 2 }
        ));
        assert!(!sink.is_type_compatible(&DataType::Double, &DataType::Integer));
        assert!(!sink.is_type_compatible(&DataType::Date, &DataType::Timestamp));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(H2Sink.type_name(&DataType::DateTime), "TIMESTAMP");
        assert_eq!(H2Sink.type_name(&DataType::Varchar(Some(64))), "VARCHAR(64)");
    }
}
