//! Integration tests for non-temporal snapshot ingest

mod common;

use common::*;
use relingest::{
    DataSplitRange, H2Sink, NontemporalSnapshot, RelationalGenerator, SnowflakeSink, StatisticName,
};

#[test]
fn test_snapshot_deletes_then_merges() {
    let result = generator(NontemporalSnapshot::default(), H2Sink)
        .generate_operations(&datasets())
        .unwrap();

    assert_eq!(result.pre_actions_sql, vec![CREATE_MAIN, CREATE_STAGING, CREATE_METADATA]);
    assert_eq!(
        result.ingest_sql,
        vec![
            format!(
                "DELETE FROM \"mydb\".\"main\" as sink WHERE NOT (EXISTS \
                 (SELECT * FROM \"mydb\".\"staging\" as stage WHERE {PK_MATCH}))"
            ),
            format!(
                "MERGE INTO \"mydb\".\"main\" as sink USING \"mydb\".\"staging\" as stage ON {PK_MATCH} \
                 WHEN MATCHED THEN UPDATE SET {UPDATE_PAIRS} \
                 WHEN NOT MATCHED THEN INSERT {DATA_COLUMNS} VALUES ({STAGE_VALUES})"
            ),
        ]
    );
    assert_eq!(result.post_actions_sql, vec![DROP_STAGING]);
    assert_eq!(result.metadata_ingest_sql, vec![METADATA_INGEST]);
}

#[test]
fn test_snapshot_rejects_data_splits() {
    let ranges = [DataSplitRange::new(1, 2).unwrap()];
    let err = generator(NontemporalSnapshot::default(), H2Sink)
        .generate_operations_with_data_splits(&datasets(), &ranges)
        .unwrap_err();
    assert_eq!(err.to_string(), "DataSplits not supported for NontemporalSnapshot mode");
}

#[test]
fn test_snapshot_statistics() {
    let generator = RelationalGenerator::builder()
        .ingest_mode(NontemporalSnapshot::default())
        .relational_sink(SnowflakeSink)
        .execution_timestamp_clock(clock())
        .collect_statistics(true)
        .build()
        .unwrap();
    let stats = generator.generate_operations(&datasets()).unwrap().statistics_sql;

    let names: Vec<StatisticName> = stats.keys().copied().collect();
    assert_eq!(names, vec![StatisticName::IncomingRecordCount, StatisticName::RowsWithErrors]);
}

#[test]
fn test_snapshot_on_derived_staging_needs_cleanup_off() {
    let staging = relingest::DerivedDataset {
        base: staging_table(Vec::new()),
        filters: vec![relingest::dataset::DatasetFilter::new(
            "amount",
            relingest::dataset::FilterOperator::Gt,
            relingest::dataset::FilterValue::Integer(0),
        )],
    };
    let datasets = relingest::Datasets::of(main_table(), staging);

    let err = generator(NontemporalSnapshot::default(), H2Sink)
        .generate_operations(&datasets)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "cleanupStagingData cannot be turned on when using DerivedDataset or FilteredDataset"
    );

    let generator = RelationalGenerator::builder()
        .ingest_mode(NontemporalSnapshot::default())
        .relational_sink(H2Sink)
        .execution_timestamp_clock(clock())
        .cleanup_staging_data(false)
        .build()
        .unwrap();
    let result = generator.generate_operations(&datasets).unwrap();

    // derived staging is read, never created
    assert_eq!(result.pre_actions_sql, vec![CREATE_MAIN, CREATE_METADATA]);
    assert!(result.ingest_sql[1].contains(
        "USING (SELECT * FROM \"mydb\".\"staging\" as stage WHERE stage.\"amount\" > 0) as stage"
    ));
}
