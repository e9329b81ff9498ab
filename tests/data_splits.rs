//! Integration tests for data-split ingest
//!
//! One result per range, each reading only its slice of staging.

mod common;

use chrono::{Duration, NaiveDate};
use common::*;
use relingest::{
    AppendOnly, DataSplitRange, DateTimeAuditing, DeduplicationStrategy, H2Sink, IncrementalClock,
    NontemporalDelta, RelationalGenerator, StatisticName,
};

fn ranges() -> Vec<DataSplitRange> {
    vec![DataSplitRange::new(1, 1).unwrap(), DataSplitRange::new(2, 3).unwrap()]
}

fn split_filter(lower: i64, upper: i64) -> String {
    format!("(stage.\"data_split\" >= {lower}) AND (stage.\"data_split\" <= {upper})")
}

#[test]
fn test_delta_merges_each_split() {
    let mode = NontemporalDelta::builder()
        .digest_field("digest")
        .data_split_field("data_split")
        .build()
        .unwrap();
    let results = generator(mode, H2Sink)
        .generate_operations_with_data_splits(&datasets_with_staging(vec![data_split()]), &ranges())
        .unwrap();

    assert_eq!(results.len(), 2);
    for (result, (lower, upper)) in results.iter().zip([(1, 1), (2, 3)]) {
        assert_eq!(result.data_split, Some(DataSplitRange::new(lower, upper).unwrap()));
        assert_eq!(
            result.ingest_sql,
            vec![format!(
                "MERGE INTO \"mydb\".\"main\" as sink \
                 USING (SELECT * FROM \"mydb\".\"staging\" as stage WHERE {}) as stage ON {PK_MATCH} \
                 WHEN MATCHED AND sink.\"digest\" <> stage.\"digest\" THEN UPDATE SET {UPDATE_PAIRS} \
                 WHEN NOT MATCHED THEN INSERT {DATA_COLUMNS} VALUES ({STAGE_VALUES})",
                split_filter(lower, upper)
            )]
        );
    }
}

#[test]
fn test_append_only_filters_each_split() {
    let mode = AppendOnly::builder()
        .digest_field("digest")
        .deduplication_strategy(DeduplicationStrategy::FailOnDuplicates)
        .auditing_strategy(
            DateTimeAuditing::builder()
                .date_time_field("batch_update_time")
                .build()
                .unwrap(),
        )
        .data_split_field("data_split")
        .build()
        .unwrap();
    let generator = RelationalGenerator::builder()
        .ingest_mode(mode)
        .relational_sink(H2Sink)
        .execution_timestamp_clock(clock())
        .collect_statistics(true)
        .build()
        .unwrap();
    let results = generator
        .generate_operations_with_data_splits(&datasets_with_staging(vec![data_split()]), &ranges())
        .unwrap();

    let second = &results[1];
    assert_eq!(
        second.ingest_sql,
        vec![format!(
            "INSERT INTO \"mydb\".\"main\" (\"id\", \"name\", \"amount\", \"biz_date\", \"digest\", \"batch_update_time\") \
             (SELECT {STAGE_VALUES},{BATCH_START} FROM \"mydb\".\"staging\" as stage WHERE {})",
            split_filter(2, 3)
        )]
    );
    assert!(second.initialize_load_sql[0].contains(&format!("WHERE {} GROUP BY", split_filter(2, 3))));
    assert_eq!(
        second.statistics_sql[&StatisticName::IncomingRecordCount],
        format!(
            "SELECT COUNT(*) as \"incomingRecordCount\" FROM \"mydb\".\"staging\" as stage WHERE {}",
            split_filter(2, 3)
        )
    );
}

#[test]
fn test_no_ranges_no_results() {
    let mode = NontemporalDelta::builder().digest_field("digest").build().unwrap();
    let results = generator(mode, H2Sink)
        .generate_operations_with_data_splits(&datasets(), &[])
        .unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_ranges_need_split_field() {
    let mode = NontemporalDelta::builder().digest_field("digest").build().unwrap();
    let err = generator(mode, H2Sink)
        .generate_operations_with_data_splits(&datasets(), &ranges())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Data split field must be specified when data split ranges are supplied"
    );
}

#[test]
fn test_split_field_must_exist_in_staging() {
    let mode = NontemporalDelta::builder()
        .digest_field("digest")
        .data_split_field("data_split")
        .build()
        .unwrap();
    let err = generator(mode, H2Sink)
        .generate_operations_with_data_splits(&datasets(), &ranges())
        .unwrap_err();
    assert_eq!(err.to_string(), "Field [data_split] not found in staging dataset");
}

#[test]
fn test_each_split_is_its_own_batch() {
    let mode = AppendOnly::builder()
        .digest_field("digest")
        .deduplication_strategy(DeduplicationStrategy::FilterDuplicates)
        .auditing_strategy(
            DateTimeAuditing::builder()
                .date_time_field("batch_update_time")
                .build()
                .unwrap(),
        )
        .data_split_field("data_split")
        .build()
        .unwrap();
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let generator = RelationalGenerator::builder()
        .ingest_mode(mode)
        .relational_sink(H2Sink)
        .execution_timestamp_clock(IncrementalClock::at(start, Duration::seconds(1)))
        .collect_statistics(true)
        .build()
        .unwrap();
    let ranges = [DataSplitRange::new(1, 1).unwrap(), DataSplitRange::new(2, 2).unwrap()];
    let results = generator
        .generate_operations_with_data_splits(&datasets_with_staging(vec![data_split()]), &ranges)
        .unwrap();

    let rows_inserted: Vec<&str> = results
        .iter()
        .map(|r| r.statistics_sql[&StatisticName::RowsInserted].as_str())
        .collect();
    assert_eq!(
        rows_inserted,
        vec![
            "SELECT COUNT(*) as \"rowsInserted\" FROM \"mydb\".\"main\" as sink \
             WHERE sink.\"batch_update_time\" = '2000-01-01 00:00:00.000000'",
            "SELECT COUNT(*) as \"rowsInserted\" FROM \"mydb\".\"main\" as sink \
             WHERE sink.\"batch_update_time\" = '2000-01-01 00:00:01.000000'",
        ]
    );
    assert!(results[1].ingest_sql[0].contains(",'2000-01-01 00:00:01.000000' FROM"));
    assert!(results[1].metadata_ingest_sql[0].contains("'2000-01-01 00:00:01.000000',CURRENT_TIMESTAMP()"));
}
