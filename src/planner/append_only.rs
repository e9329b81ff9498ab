//! Append-only ingest

use crate::ingest::{AppendOnly, DeduplicationStrategy};
use crate::plan::{Condition, FieldValue, Insert, Operation, Selection, Value};

use super::context::PlanContext;

pub(super) const DUPLICATE_COUNT: &str = "duplicateCount";
pub(super) const EXISTING_RECORD_COUNT: &str = "existingRecordCount";

/// One `INSERT INTO main (..) (SELECT .. FROM staging ..)`
pub(super) fn plan_ingest(ctx: &PlanContext, mode: &AppendOnly) -> Vec<Operation> {
    let mut filters: Vec<Condition> = ctx.data_split_filter().into_iter().collect();
    let mut source = Selection::new(ctx.insert_values()).source(ctx.staging.clone());

    if mode.deduplication_strategy == DeduplicationStrategy::FilterDuplicates {
        filters.push(not_in_main(ctx));
        source = source.distinct();
    }
    if !filters.is_empty() {
        source = source.filter(Condition::all(filters));
    }

    vec![Operation::Insert(Insert {
        target: ctx.main.clone(),
        fields: ctx.insert_fields(),
        source,
    })]
}

/// `NOT (EXISTS (SELECT * FROM main as sink WHERE <row match>))`
fn not_in_main(ctx: &PlanContext) -> Condition {
    Condition::exists(Selection::all_from(ctx.main.clone()).filter(ctx.row_match())).negate()
}

/// Checks run before the insert when duplicates must fail the batch.
///
/// The first returns every duplicated row group within staging, the second
/// counts staging rows already present in main.
pub(super) fn plan_initialize_load(
    ctx: &PlanContext,
    mode: &AppendOnly,
    alias_in_having: bool,
) -> Vec<Operation> {
    if mode.deduplication_strategy != DeduplicationStrategy::FailOnDuplicates {
        return Vec::new();
    }

    let group_by: Vec<Value> = ctx
        .data_fields
        .iter()
        .map(|f| ctx.staging_field(&f.name))
        .collect();
    let mut fields = group_by.clone();
    fields.push(Value::count_all().with_alias(DUPLICATE_COUNT));

    let count = if alias_in_having {
        Value::Field(FieldValue::unqualified(DUPLICATE_COUNT))
    } else {
        Value::count_all()
    };

    let within_batch = Selection::new(fields)
        .source(ctx.staging.clone())
        .filter_opt(ctx.data_split_filter())
        .group_by(group_by)
        .having(Condition::GreaterThan(count, Value::Integer(1)));

    let already_loaded = Selection::new(vec![Value::count_all().with_alias(EXISTING_RECORD_COUNT)])
        .source(ctx.staging.clone())
        .filter(Condition::all(
            ctx.data_split_filter()
                .into_iter()
                .chain(Some(Condition::exists(
                    Selection::all_from(ctx.main.clone()).filter(ctx.row_match()),
                )))
                .collect(),
        ));

    vec![Operation::Select(within_batch), Operation::Select(already_loaded)]
}
