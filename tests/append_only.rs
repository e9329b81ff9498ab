//! Integration tests for append-only ingest
//!
//! Insert-only loads with the three deduplication strategies, with and
//! without date-time auditing.

mod common;

use common::*;
use relingest::{
    AnsiSink, AppendOnly, DataSplitRange, DateTimeAuditing, DeduplicationStrategy, H2Sink,
    RelationalGenerator, StatisticName,
};

fn auditing() -> DateTimeAuditing {
    DateTimeAuditing::builder()
        .date_time_field("batch_update_time")
        .build()
        .unwrap()
}

fn audited(dedup: DeduplicationStrategy) -> AppendOnly {
    AppendOnly::builder()
        .digest_field("digest")
        .deduplication_strategy(dedup)
        .auditing_strategy(auditing())
        .build()
        .unwrap()
}

/// Main gains the audit column as part of the key
const CREATE_AUDITED_MAIN: &str = "CREATE TABLE IF NOT EXISTS \"mydb\".\"main\"(\"id\" INTEGER NOT NULL,\"name\" VARCHAR NOT NULL,\"amount\" DOUBLE,\"biz_date\" DATE,\"digest\" VARCHAR,\"batch_update_time\" TIMESTAMP NOT NULL,PRIMARY KEY (\"id\", \"name\", \"batch_update_time\"))";

const ROW_MATCH: &str = "((sink.\"id\" = stage.\"id\") AND (sink.\"name\" = stage.\"name\")) AND (sink.\"digest\" = stage.\"digest\")";

#[test]
fn test_allow_duplicates_no_auditing() {
    let mode = AppendOnly::builder().build().unwrap();
    let result = generator(mode, H2Sink).generate_operations(&datasets()).unwrap();

    assert_eq!(result.pre_actions_sql, vec![CREATE_MAIN, CREATE_STAGING, CREATE_METADATA]);
    assert!(result.initialize_load_sql.is_empty());
    assert_eq!(
        result.ingest_sql,
        vec![format!(
            "INSERT INTO \"mydb\".\"main\" {DATA_COLUMNS} (SELECT {STAGE_VALUES} FROM \"mydb\".\"staging\" as stage)"
        )]
    );
    assert_eq!(result.post_actions_sql, vec![DROP_STAGING]);
    assert_eq!(result.metadata_ingest_sql, vec![METADATA_INGEST]);
    assert!(result.statistics_sql.is_empty());
    assert!(result.data_split.is_none());
}

#[test]
fn test_fail_on_duplicates_with_auditing() {
    let result = generator(audited(DeduplicationStrategy::FailOnDuplicates), H2Sink)
        .generate_operations(&datasets())
        .unwrap();

    assert_eq!(result.pre_actions_sql[0], CREATE_AUDITED_MAIN);
    assert_eq!(
        result.initialize_load_sql,
        vec![
            format!(
                "SELECT {STAGE_VALUES},COUNT(*) as \"duplicateCount\" FROM \"mydb\".\"staging\" as stage \
                 GROUP BY stage.\"id\", stage.\"name\", stage.\"amount\", stage.\"biz_date\", stage.\"digest\" \
                 HAVING COUNT(*) > 1"
            ),
            format!(
                "SELECT COUNT(*) as \"existingRecordCount\" FROM \"mydb\".\"staging\" as stage \
                 WHERE EXISTS (SELECT * FROM \"mydb\".\"main\" as sink WHERE {ROW_MATCH})"
            ),
        ]
    );
    assert_eq!(
        result.ingest_sql,
        vec![format!(
            "INSERT INTO \"mydb\".\"main\" (\"id\", \"name\", \"amount\", \"biz_date\", \"digest\", \"batch_update_time\") \
             (SELECT {STAGE_VALUES},{BATCH_START} FROM \"mydb\".\"staging\" as stage)"
        )]
    );
}

#[test]
fn test_duplicate_check_uses_alias_when_sink_allows() {
    let result = generator(audited(DeduplicationStrategy::FailOnDuplicates), AnsiSink)
        .generate_operations(&datasets())
        .unwrap();
    assert!(result.initialize_load_sql[0].ends_with("HAVING \"duplicateCount\" > 1"));
}

#[test]
fn test_filter_duplicates_with_auditing() {
    let result = generator(audited(DeduplicationStrategy::FilterDuplicates), H2Sink)
        .generate_operations(&datasets())
        .unwrap();

    assert!(result.initialize_load_sql.is_empty());
    assert_eq!(
        result.ingest_sql,
        vec![format!(
            "INSERT INTO \"mydb\".\"main\" (\"id\", \"name\", \"amount\", \"biz_date\", \"digest\", \"batch_update_time\") \
             (SELECT DISTINCT {STAGE_VALUES},{BATCH_START} FROM \"mydb\".\"staging\" as stage \
             WHERE NOT (EXISTS (SELECT * FROM \"mydb\".\"main\" as sink WHERE {ROW_MATCH})))"
        )]
    );
}

#[test]
fn test_filter_duplicates_without_keys_compares_every_field() {
    let fields = vec![
        relingest::Field::new("id", relingest::DataType::Integer),
        relingest::Field::new("amount", relingest::DataType::Double),
    ];
    let schema = relingest::SchemaDefinition::new(fields).unwrap();
    let datasets = relingest::Datasets::of(
        relingest::DatasetDefinition::new("main", schema.clone()),
        relingest::DatasetDefinition::new("staging", schema),
    );
    let mode = AppendOnly::builder()
        .deduplication_strategy(DeduplicationStrategy::FilterDuplicates)
        .build()
        .unwrap();

    let result = generator(mode, H2Sink).generate_operations(&datasets).unwrap();
    assert!(result.ingest_sql[0].ends_with(
        "WHERE NOT (EXISTS (SELECT * FROM \"main\" as sink WHERE (sink.\"id\" = stage.\"id\") AND (sink.\"amount\" = stage.\"amount\"))))"
    ));
}

#[test]
fn test_statistics_with_auditing() {
    let generator = RelationalGenerator::builder()
        .ingest_mode(audited(DeduplicationStrategy::AllowDuplicates))
        .relational_sink(H2Sink)
        .execution_timestamp_clock(clock())
        .collect_statistics(true)
        .build()
        .unwrap();
    let stats = generator.generate_operations(&datasets()).unwrap().statistics_sql;

    assert_eq!(stats.len(), 5);
    assert_eq!(
        stats[&StatisticName::IncomingRecordCount],
        "SELECT COUNT(*) as \"incomingRecordCount\" FROM \"mydb\".\"staging\" as stage"
    );
    assert_eq!(
        stats[&StatisticName::RowsInserted],
        format!("SELECT COUNT(*) as \"rowsInserted\" FROM \"mydb\".\"main\" as sink WHERE sink.\"batch_update_time\" = {BATCH_START}")
    );
    assert_eq!(stats[&StatisticName::RowsUpdated], "SELECT 0 as \"rowsUpdated\"");
    assert_eq!(stats[&StatisticName::RowsDeleted], "SELECT 0 as \"rowsDeleted\"");
    assert_eq!(stats[&StatisticName::RowsWithErrors], "SELECT 0 as \"rowsWithErrors\"");
}

#[test]
fn test_filter_duplicates_without_auditing_rejects_data_splits() {
    let mode = AppendOnly::builder()
        .digest_field("digest")
        .deduplication_strategy(DeduplicationStrategy::FilterDuplicates)
        .data_split_field("data_split")
        .build()
        .unwrap();
    let ranges = [DataSplitRange::new(1, 1).unwrap()];

    let err = generator(mode, H2Sink)
        .generate_operations_with_data_splits(&datasets_with_staging(vec![data_split()]), &ranges)
        .unwrap_err();
    assert_eq!(err.to_string(), "DataSplits not supported for NoAuditing mode");
}

#[test]
fn test_missing_digest_field() {
    let mode = AppendOnly::builder().digest_field("checksum").build().unwrap();
    let err = generator(mode, H2Sink).generate_operations(&datasets()).unwrap_err();
    assert_eq!(err.to_string(), "Field [checksum] not found in main dataset");
}

#[test]
fn test_existing_staging_is_truncated() {
    let generator = RelationalGenerator::builder()
        .ingest_mode(AppendOnly::builder().build().unwrap())
        .relational_sink(H2Sink)
        .execution_timestamp_clock(clock())
        .create_staging_dataset(false)
        .build()
        .unwrap();
    let result = generator.generate_operations(&datasets()).unwrap();

    assert_eq!(result.pre_actions_sql, vec![CREATE_MAIN, CREATE_METADATA]);
    assert_eq!(result.post_actions_sql, vec!["TRUNCATE TABLE \"mydb\".\"staging\""]);
}

#[test]
fn test_no_cleanup_keeps_staging() {
    let generator = RelationalGenerator::builder()
        .ingest_mode(AppendOnly::builder().build().unwrap())
        .relational_sink(H2Sink)
        .execution_timestamp_clock(clock())
        .cleanup_staging_data(false)
        .build()
        .unwrap();
    let result = generator.generate_operations(&datasets()).unwrap();
    assert!(result.post_actions_sql.is_empty());
}

#[test]
fn test_repeated_generation_is_identical() {
    let generator = RelationalGenerator::builder()
        .ingest_mode(audited(DeduplicationStrategy::FailOnDuplicates))
        .relational_sink(H2Sink)
        .execution_timestamp_clock(clock())
        .collect_statistics(true)
        .build()
        .unwrap();

    let first = generator.generate_operations(&datasets()).unwrap();
    let second = generator.generate_operations(&datasets()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.all_sql(), second.all_sql());
}
