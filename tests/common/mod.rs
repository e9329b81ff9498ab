//! Shared test utilities for integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use relingest::{
    parser, DataType, DatasetDefinition, Datasets, Field, FixedClock, IngestMode, IngestSpec,
    RelationalGenerator, RelationalSink, SchemaDefinition,
};

/// Load a test fixture from the tests/test_data directory
pub fn load_fixture(name: &str) -> IngestSpec {
    let path = format!("tests/test_data/{}", name);
    parser::parse_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

/// Batch clock pinned to 2000-01-01 00:00:00
pub fn clock() -> FixedClock {
    let ts = NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid timestamp");
    FixedClock::at(ts)
}

pub const BATCH_START: &str = "'2000-01-01 00:00:00.000000'";

// =============================================================================
// Datasets
// =============================================================================

/// id and name form the primary key
pub fn base_fields() -> Vec<Field> {
    vec![
        Field::new("id", DataType::Integer).primary_key(),
        Field::new("name", DataType::Varchar(None)).primary_key(),
        Field::new("amount", DataType::Double),
        Field::new("biz_date", DataType::Date),
        Field::new("digest", DataType::Varchar(None)),
    ]
}

pub fn main_table() -> DatasetDefinition {
    let schema = SchemaDefinition::new(base_fields()).expect("valid schema");
    DatasetDefinition::new("main", schema).with_database("mydb")
}

/// Staging with the base fields followed by `extra`
pub fn staging_table(extra: Vec<Field>) -> DatasetDefinition {
    let mut fields = base_fields();
    fields.extend(extra);
    let schema = SchemaDefinition::new(fields).expect("valid schema");
    DatasetDefinition::new("staging", schema).with_database("mydb")
}

pub fn datasets() -> Datasets {
    Datasets::of(main_table(), staging_table(Vec::new()))
}

pub fn datasets_with_staging(extra: Vec<Field>) -> Datasets {
    Datasets::of(main_table(), staging_table(extra))
}

pub fn delete_indicator() -> Field {
    Field::new("delete_indicator", DataType::Varchar(None))
}

pub fn data_split() -> Field {
    Field::new("data_split", DataType::BigInt)
}

/// Generator on the fixed clock with default options
pub fn generator(mode: impl Into<IngestMode>, sink: impl RelationalSink + 'static) -> RelationalGenerator {
    RelationalGenerator::builder()
        .ingest_mode(mode)
        .relational_sink(sink)
        .execution_timestamp_clock(clock())
        .build()
        .expect("generator should build")
}

// =============================================================================
// Expected SQL shared by the H2 tests
// =============================================================================

pub const CREATE_MAIN: &str = "CREATE TABLE IF NOT EXISTS \"mydb\".\"main\"(\"id\" INTEGER NOT NULL,\"name\" VARCHAR NOT NULL,\"amount\" DOUBLE,\"biz_date\" DATE,\"digest\" VARCHAR,PRIMARY KEY (\"id\", \"name\"))";

pub const CREATE_STAGING: &str = "CREATE TABLE IF NOT EXISTS \"mydb\".\"staging\"(\"id\" INTEGER NOT NULL,\"name\" VARCHAR NOT NULL,\"amount\" DOUBLE,\"biz_date\" DATE,\"digest\" VARCHAR,PRIMARY KEY (\"id\", \"name\"))";

pub const CREATE_METADATA: &str = "CREATE TABLE IF NOT EXISTS \"batch_metadata\"(\"table_name\" VARCHAR(255),\"batch_start_ts_utc\" TIMESTAMP,\"batch_end_ts_utc\" TIMESTAMP,\"batch_status\" VARCHAR(32),\"table_batch_id\" INTEGER)";

pub const DROP_STAGING: &str = "DROP TABLE IF EXISTS \"mydb\".\"staging\" CASCADE";

pub const METADATA_INGEST: &str = "INSERT INTO \"batch_metadata\" (\"table_name\", \"table_batch_id\", \"batch_start_ts_utc\", \"batch_end_ts_utc\", \"batch_status\") \
(SELECT 'main',(SELECT COALESCE(MAX(batch_metadata.\"table_batch_id\"),0)+1 FROM \"batch_metadata\" as batch_metadata WHERE UPPER(batch_metadata.\"table_name\") = 'MAIN'),\
'2000-01-01 00:00:00.000000',CURRENT_TIMESTAMP(),'DONE')";

pub const DATA_COLUMNS: &str = "(\"id\", \"name\", \"amount\", \"biz_date\", \"digest\")";

pub const STAGE_VALUES: &str = "stage.\"id\",stage.\"name\",stage.\"amount\",stage.\"biz_date\",stage.\"digest\"";

pub const PK_MATCH: &str = "(sink.\"id\" = stage.\"id\") AND (sink.\"name\" = stage.\"name\")";

pub const UPDATE_PAIRS: &str = "sink.\"id\" = stage.\"id\",sink.\"name\" = stage.\"name\",sink.\"amount\" = stage.\"amount\",sink.\"biz_date\" = stage.\"biz_date\",sink.\"digest\" = stage.\"digest\"";
