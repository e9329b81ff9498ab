//! Batch metadata bookkeeping
//!
//! Every run appends one row to the metadata table: the main table name,
//! the next batch id for that table, start and end timestamps, and status.

use crate::dataset::{DataType, DatasetDefinition, Field, SchemaDefinition};
use crate::error::BuildError;
use crate::plan::{Condition, FunctionName, Insert, Operation, Selection, Value};

use super::context::PlanContext;

pub const METADATA_TABLE: &str = "batch_metadata";

const TABLE_NAME: &str = "table_name";
const BATCH_START: &str = "batch_start_ts_utc";
const BATCH_END: &str = "batch_end_ts_utc";
const BATCH_STATUS: &str = "batch_status";
const TABLE_BATCH_ID: &str = "table_batch_id";

const STATUS_DONE: &str = "DONE";

/// The default metadata table definition
pub fn metadata_dataset() -> Result<DatasetDefinition, BuildError> {
    let schema = SchemaDefinition::new(vec![
        Field::new(TABLE_NAME, DataType::Varchar(Some(255))),
        Field::new(BATCH_START, DataType::DateTime),
        Field::new(BATCH_END, DataType::DateTime),
        Field::new(BATCH_STATUS, DataType::Varchar(Some(32))),
        Field::new(TABLE_BATCH_ID, DataType::Integer),
    ])?;
    Ok(DatasetDefinition::new(METADATA_TABLE, schema).with_alias(METADATA_TABLE))
}

pub(super) fn plan_metadata_ingest(ctx: &PlanContext, metadata: &DatasetDefinition) -> Operation {
    let alias = metadata.alias.as_deref().unwrap_or(METADATA_TABLE);
    let table_name = ctx.main.name.clone();

    let next_batch_id = Selection::new(vec![Value::function(
        FunctionName::Coalesce,
        vec![
            Value::function(FunctionName::Max, vec![Value::field(alias, TABLE_BATCH_ID)]),
            Value::Integer(0),
        ],
    )
    .plus(Value::Integer(1))])
    .source(metadata.clone())
    .filter(Condition::Equals(
        Value::function(FunctionName::Upper, vec![Value::field(alias, TABLE_NAME)]),
        Value::string(table_name.to_uppercase()),
    ));

    Operation::Insert(Insert {
        target: metadata.clone(),
        fields: [TABLE_NAME, TABLE_BATCH_ID, BATCH_START, BATCH_END, BATCH_STATUS]
            .iter()
            .map(|f| f.to_string())
            .collect(),
        source: Selection::new(vec![
            Value::string(table_name),
            Value::Select(Box::new(next_batch_id)),
            ctx.batch_start_value(),
            Value::function(FunctionName::CurrentTimestamp, vec![]),
            Value::string(STATUS_DONE),
        ]),
    })
}
