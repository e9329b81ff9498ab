//! Row-count statistics
//!
//! Only counts that can be derived from the tables after the run are
//! planned; the rest are omitted rather than guessed.

use std::collections::BTreeMap;

use crate::ingest::{AuditingStrategy, DeduplicationStrategy, IngestMode};
use crate::plan::{Condition, Selection, StatisticName, Value};

use super::context::PlanContext;

pub(super) fn plan_statistics(
    ctx: &PlanContext,
    mode: &IngestMode,
) -> BTreeMap<StatisticName, Selection> {
    let mut stats = BTreeMap::new();
    stats.insert(StatisticName::IncomingRecordCount, incoming_record_count(ctx));
    stats.insert(StatisticName::RowsWithErrors, constant(StatisticName::RowsWithErrors, 0));

    match mode {
        IngestMode::AppendOnly(append) => {
            match (&append.auditing_strategy, append.deduplication_strategy) {
                (AuditingStrategy::DateTimeAuditing(auditing), _) => {
                    stats.insert(StatisticName::RowsInserted, stamped_rows(ctx, &auditing.date_time_field));
                }
                (AuditingStrategy::NoAuditing, DeduplicationStrategy::AllowDuplicates) => {
                    stats.insert(
                        StatisticName::RowsInserted,
                        count_staging(ctx, StatisticName::RowsInserted, None),
                    );
                }
                (AuditingStrategy::NoAuditing, _) => {}
            }
            stats.insert(StatisticName::RowsUpdated, constant(StatisticName::RowsUpdated, 0));
            stats.insert(StatisticName::RowsDeleted, constant(StatisticName::RowsDeleted, 0));
        }
        IngestMode::NontemporalDelta(delta) => {
            let deleted = match &delta.delete_indicator {
                Some(indicator) => {
                    let flagged = Condition::In(
                        ctx.staging_field(&indicator.field),
                        indicator.values.iter().map(|v| Value::string(v.clone())).collect(),
                    );
                    count_staging(ctx, StatisticName::RowsDeleted, Some(flagged))
                }
                None => constant(StatisticName::RowsDeleted, 0),
            };
            stats.insert(StatisticName::RowsDeleted, deleted);
        }
        IngestMode::NontemporalSnapshot(_) => {}
    }
    stats
}

fn incoming_record_count(ctx: &PlanContext) -> Selection {
    count_staging(ctx, StatisticName::IncomingRecordCount, None)
}

fn count_staging(ctx: &PlanContext, name: StatisticName, condition: Option<Condition>) -> Selection {
    let filters: Vec<Condition> = ctx.data_split_filter().into_iter().chain(condition).collect();
    Selection::new(vec![Value::count_all().with_alias(name.as_str())])
        .source(ctx.staging.clone())
        .filter_opt((!filters.is_empty()).then(|| Condition::all(filters)))
}

/// Main rows carrying this batch's audit timestamp
fn stamped_rows(ctx: &PlanContext, audit_field: &str) -> Selection {
    Selection::new(vec![Value::count_all().with_alias(StatisticName::RowsInserted.as_str())])
        .source(ctx.main.clone())
        .filter(Condition::Equals(ctx.main_field(audit_field), ctx.batch_start_value()))
}

/// `SELECT <value> as "<name>"`
fn constant(name: StatisticName, value: i64) -> Selection {
    Selection::new(vec![Value::Integer(value).with_alias(name.as_str())])
}
