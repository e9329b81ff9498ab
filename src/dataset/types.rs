//! Logical data types for dataset fields

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Column types understood by the planner and the sinks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    /// Fixed-point decimal with precision and scale
    Decimal { precision: u8, scale: u8 },
    /// Variable-length string with optional length
    Varchar(Option<u32>),
    /// Fixed-length string with optional length
    Char(Option<u32>),
    String,
    Text,
    Boolean,
    Date,
    Time,
    Timestamp,
    DateTime,
    Json,
    Variant,
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Varchar(None)
    }
}

impl DataType {
    /// Type name without length/precision parameters.
    ///
    /// Type-widening tables are keyed on this name, so `VARCHAR(10)` and
    /// `VARCHAR` compare as the same family.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::TinyInt => "TINYINT",
            DataType::SmallInt => "SMALLINT",
            DataType::Integer => "INTEGER",
            DataType::BigInt => "BIGINT",
            DataType::Float => "FLOAT",
            DataType::Real => "REAL",
            DataType::Double => "DOUBLE",
            DataType::Decimal { .. } => "DECIMAL",
            DataType::Varchar(_) => "VARCHAR",
            DataType::Char(_) => "CHAR",
            DataType::String => "STRING",
            DataType::Text => "TEXT",
            DataType::Boolean => "BOOLEAN",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::Timestamp => "TIMESTAMP",
            DataType::DateTime => "DATETIME",
            DataType::Json => "JSON",
            DataType::Variant => "VARIANT",
        }
    }

    /// Check if this is a numeric type (integer, floating point or decimal)
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::TinyInt
                | DataType::SmallInt
                | DataType::Integer
                | DataType::BigInt
                | DataType::Float
                | DataType::Real
                | DataType::Double
                | DataType::Decimal { .. }
        )
    }

    /// Check if this is a temporal type
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            DataType::Date | DataType::Time | DataType::Timestamp | DataType::DateTime
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Decimal { precision, scale } => write!(f, "DECIMAL({},{})", precision, scale),
            DataType::Varchar(Some(len)) => write!(f, "VARCHAR({})", len),
            DataType::Char(Some(len)) => write!(f, "CHAR({})", len),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Error when parsing a data type string
#[derive(Debug, Clone, thiserror::Error)]
#[error("Invalid data type '{input}': {message}")]
pub struct ParseDataTypeError {
    pub input: String,
    pub message: String,
}

impl ParseDataTypeError {
    fn new(input: &str, message: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            message: message.into(),
        }
    }
}

impl FromStr for DataType {
    type Err = ParseDataTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();

        if let Some((base, args)) = split_params(&lower) {
            return match base {
                "decimal" | "numeric" => parse_decimal(s, args),
                "varchar" => parse_length(s, args).map(|n| DataType::Varchar(Some(n))),
                "char" => parse_length(s, args).map(|n| DataType::Char(Some(n))),
                _ => Err(ParseDataTypeError::new(s, "type does not take parameters")),
            };
        }

        match lower.as_str() {
            "tinyint" => Ok(DataType::TinyInt),
            "smallint" => Ok(DataType::SmallInt),
            "int" | "integer" => Ok(DataType::Integer),
            "bigint" | "long" => Ok(DataType::BigInt),
            "float" => Ok(DataType::Float),
            "real" => Ok(DataType::Real),
            "double" => Ok(DataType::Double),
            "decimal" | "numeric" => Ok(DataType::Decimal { precision: 38, scale: 0 }),
            "varchar" => Ok(DataType::Varchar(None)),
            "char" => Ok(DataType::Char(None)),
            "string" => Ok(DataType::String),
            "text" => Ok(DataType::Text),
            "bool" | "boolean" => Ok(DataType::Boolean),
            "date" => Ok(DataType::Date),
            "time" => Ok(DataType::Time),
            "timestamp" => Ok(DataType::Timestamp),
            "datetime" => Ok(DataType::DateTime),
            "json" => Ok(DataType::Json),
            "variant" => Ok(DataType::Variant),
            _ => Err(ParseDataTypeError::new(s, "unknown type")),
        }
    }
}

/// Split `"varchar(10)"` into `("varchar", "10")`
fn split_params(s: &str) -> Option<(&str, &str)> {
    let open = s.find('(')?;
    if !s.ends_with(')') {
        return None;
    }
    Some((s[..open].trim(), &s[open + 1..s.len() - 1]))
}

fn parse_length(input: &str, args: &str) -> Result<u32, ParseDataTypeError> {
    match args.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(ParseDataTypeError::new(input, "length must be a positive integer")),
        Ok(n) => Ok(n),
    }
}

fn parse_decimal(input: &str, args: &str) -> Result<DataType, ParseDataTypeError> {
    let parts: Vec<&str> = args.split(',').map(|p| p.trim()).collect();

    if parts.len() != 2 {
        return Err(ParseDataTypeError::new(
            input,
            "decimal requires precision and scale, e.g., decimal(10, 2)",
        ));
    }

    let precision: u8 = parts[0]
        .parse()
        .map_err(|_| ParseDataTypeError::new(input, "invalid precision"))?;
    let scale: u8 = parts[1]
        .parse()
        .map_err(|_| ParseDataTypeError::new(input, "invalid scale"))?;

    if precision == 0 || precision > 38 {
        return Err(ParseDataTypeError::new(input, "precision must be between 1 and 38"));
    }
    if scale > precision {
        return Err(ParseDataTypeError::new(input, "scale cannot exceed precision"));
    }

    Ok(DataType::Decimal { precision, scale })
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DataType::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for DataType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
